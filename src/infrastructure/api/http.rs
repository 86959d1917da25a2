//! HTTP implementation of [`ExplorerApi`]: GraphQL for accounts and lists, REST for blocks, tokens and balances

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use super::graphql::GraphQlClient;
use super::queries::{
    self, RawAsset, RawBridged, RawDeployTx, RawLog, RawNftTransfer, RawPage, RawTransfer, RawTx,
};
use super::ExplorerApi;
use crate::domain::entity::value_as_display;
use crate::domain::format::{scale_decimal, CKB_DECIMALS};
use crate::domain::list::{
    AssetRow, BridgedRow, ContractInfo, EventRow, NftTransferRow, TransferRow, TxRow,
};
use crate::domain::{AccountLookup, Cursor, ExplorerError, Fields, ListFilter, ListPage, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Base URLs of the explorer backend
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub graphql: String,
    pub api: String,
}

pub struct HttpExplorerApi {
    http: reqwest::Client,
    graphql: GraphQlClient,
    api_base: String,
}

impl HttpExplorerApi {
    pub fn new(endpoints: &ApiEndpoints) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gwscope/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            graphql: GraphQlClient::new(http.clone(), endpoints.graphql.clone()),
            http,
            api_base: endpoints.api.trim_end_matches('/').to_string(),
        })
    }

    async fn get_rest(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.api_base, path);
        debug!(%url, "rest request");
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.api+json, application/json")
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ExplorerError::NotFound);
        }
        let body: Value = response.error_for_status()?.json().await?;
        Ok(unwrap_json_api(body))
    }

    async fn rest_entity(&self, path: &str) -> Result<Fields> {
        match self.get_rest(path).await? {
            Value::Object(fields) if !fields.is_empty() => Ok(fields),
            Value::Object(_) | Value::Null => Err(ExplorerError::NotFound),
            other => Err(ExplorerError::Upstream(format!(
                "expected an object from {path}, got {other}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl ExplorerApi for HttpExplorerApi {
    async fn account(&self, lookup: &AccountLookup) -> Result<Option<Fields>> {
        self.graphql
            .query(queries::ACCOUNT, queries::account_input(lookup), "account")
            .await
    }

    async fn balance(&self, eth_address: &str) -> Result<String> {
        let body = self.get_rest(&format!("accounts/{eth_address}")).await?;
        parse_balance(&body)
    }

    async fn deployer(&self, deployment_tx_hash: &str) -> Result<Option<String>> {
        let tx: Option<RawDeployTx> = self
            .graphql
            .query(
                queries::DEPLOYER,
                queries::single_input("transaction_hash", deployment_tx_hash),
                "transaction",
            )
            .await?;
        Ok(tx.and_then(RawDeployTx::deployer))
    }

    async fn block(&self, id: &str) -> Result<Fields> {
        self.rest_entity(&format!("blocks/{id}")).await
    }

    async fn token(&self, id: &str) -> Result<Fields> {
        self.rest_entity(&format!("udts/{id}")).await
    }

    async fn transactions(&self, filter: &ListFilter, cursor: &Cursor) -> Result<ListPage<TxRow>> {
        let page: Option<RawPage<RawTx>> = self
            .graphql
            .query(
                queries::TRANSACTIONS,
                queries::cursor_input(filter, cursor),
                "transactions",
            )
            .await?;
        Ok(page_or_empty(page))
    }

    async fn transfers(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u32,
    ) -> Result<ListPage<TransferRow>> {
        let page: Option<RawPage<RawTransfer>> = self
            .graphql
            .query(
                queries::TRANSFERS,
                queries::page_input(filter, page, page_size),
                "token_transfers",
            )
            .await?;
        Ok(page_or_empty(page))
    }

    async fn bridged_records(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u32,
    ) -> Result<ListPage<BridgedRow>> {
        let page: Option<RawPage<RawBridged>> = self
            .graphql
            .query(
                queries::BRIDGED,
                queries::page_input(filter, page, page_size),
                "deposit_withdrawal_histories",
            )
            .await?;
        Ok(page_or_empty(page))
    }

    async fn assets(&self, filter: &ListFilter) -> Result<ListPage<AssetRow>> {
        let rows: Option<Vec<RawAsset>> = self
            .graphql
            .query(queries::ASSETS, queries::assets_input(filter), "account_udts")
            .await?;
        Ok(ListPage::single(
            rows.unwrap_or_default().into_iter().map(AssetRow::from).collect(),
        ))
    }

    async fn contract(&self, address: &str) -> Result<Option<ContractInfo>> {
        self.graphql
            .query(
                queries::CONTRACT,
                queries::single_input("contract_address", address),
                "smart_contract",
            )
            .await
    }

    async fn events(&self, filter: &ListFilter, cursor: &Cursor) -> Result<ListPage<EventRow>> {
        let page: Option<RawPage<RawLog>> = self
            .graphql
            .query(queries::EVENTS, queries::cursor_input(filter, cursor), "logs")
            .await?;
        Ok(page_or_empty(page))
    }

    async fn nft_transfers(
        &self,
        filter: &ListFilter,
        cursor: &Cursor,
    ) -> Result<ListPage<NftTransferRow>> {
        let page: Option<RawPage<RawNftTransfer>> = self
            .graphql
            .query(
                queries::NFT_TRANSFERS,
                queries::cursor_input(filter, cursor),
                "erc721_token_transfers",
            )
            .await?;
        Ok(page_or_empty(page))
    }

    async fn verify_contract(&self, address: &str) -> Result<Option<ContractInfo>> {
        let info: Option<ContractInfo> = self
            .graphql
            .query(
                queries::VERIFY,
                queries::verify_input(address),
                "verify_and_update_from_sourcify",
            )
            .await?;
        let verified = info.filter(|c| matches!(&c.abi, Some(Value::Array(items)) if !items.is_empty()));
        if verified.is_none() {
            warn!(address, "sourcify returned no abi");
        }
        Ok(verified)
    }
}

fn page_or_empty<Raw, Row: From<Raw>>(page: Option<RawPage<Raw>>) -> ListPage<Row> {
    match page {
        Some(page) => page.convert(Row::from),
        None => ListPage::single(Vec::new()),
    }
}

/// Strip a JSON:API `{data: {attributes: {...}}}` envelope if present
fn unwrap_json_api(mut body: Value) -> Value {
    let Some(data) = body.get_mut("data").map(Value::take) else {
        return body;
    };
    match data {
        Value::Object(mut data) => match data.remove("attributes") {
            Some(attributes) => attributes,
            None => Value::Object(data),
        },
        other => other,
    }
}

/// `{ckb: "12.5"}` to an integer string in the smallest unit
fn parse_balance(body: &Value) -> Result<String> {
    let ckb = body
        .get("ckb")
        .and_then(value_as_display)
        .ok_or_else(|| ExplorerError::Upstream("balance response carried no ckb field".into()))?;
    scale_decimal(&ckb, CKB_DECIMALS)
        .ok_or_else(|| ExplorerError::Upstream(format!("balance '{ckb}' is not a decimal")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_json_api() {
        assert_eq!(
            unwrap_json_api(json!({"data": {"id": "1", "type": "block", "attributes": {"number": 1}}})),
            json!({"number": 1})
        );
        assert_eq!(unwrap_json_api(json!({"data": {"number": 2}})), json!({"number": 2}));
        assert_eq!(unwrap_json_api(json!({"number": 3})), json!({"number": 3}));
        assert_eq!(unwrap_json_api(json!({"data": null})), json!(null));
    }

    #[test]
    fn test_parse_balance() {
        assert_eq!(
            parse_balance(&json!({"ckb": "1.5"})).unwrap(),
            "1500000000000000000"
        );
        assert_eq!(parse_balance(&json!({"ckb": 2})).unwrap(), "2000000000000000000");
        assert!(parse_balance(&json!({"eth": "1"})).is_err());
        assert!(parse_balance(&json!({"ckb": "n/a"})).is_err());
    }

    #[test]
    fn test_new_trims_base() {
        let api = HttpExplorerApi::new(&ApiEndpoints {
            graphql: "http://localhost:4001/graphql".into(),
            api: "http://localhost:4001/api/".into(),
        })
        .unwrap();
        assert_eq!(api.api_base, "http://localhost:4001/api");
        assert_eq!(api.graphql.endpoint(), "http://localhost:4001/graphql");
    }
}
