//! Minimal GraphQL-over-HTTP client

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{ExplorerError, Result};

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// POSTs `{query, variables}` and unwraps `data.<field>`
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `query` and deserialize the top-level `field` of the response data.
    /// A `null` field deserializes as whatever `T` makes of `null` (e.g. `None`).
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<T> {
        debug!(field, %variables, "graphql request");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?;
        let body: GraphQlResponse = response.json().await?;
        unwrap_field(body, field)
    }
}

fn unwrap_field<T: DeserializeOwned>(body: GraphQlResponse, field: &str) -> Result<T> {
    if !body.errors.is_empty() {
        let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
        return Err(ExplorerError::Graphql(messages.join("; ")));
    }
    let mut data = body
        .data
        .ok_or_else(|| ExplorerError::Graphql("response carried no data".to_string()))?;
    let value = data
        .get_mut(field)
        .map(Value::take)
        .unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}
