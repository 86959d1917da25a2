//! Pagination cursor: opaque before/after tokens plus a limit

use serde::Serialize;
use url::form_urlencoded;

use super::error::{ExplorerError, Result};

/// A page request against a cursor-paged list.
///
/// `before` and `after` are mutually exclusive; the constructors are the only
/// way to set them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Cursor {
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl Cursor {
    /// First page
    pub fn first(limit: Option<u32>) -> Self {
        Self {
            before: None,
            after: None,
            limit,
        }
    }

    /// Entries before the given token
    pub fn before(token: impl Into<String>, limit: Option<u32>) -> Self {
        Self {
            before: Some(token.into()),
            after: None,
            limit,
        }
    }

    /// Entries after the given token
    pub fn after(token: impl Into<String>, limit: Option<u32>) -> Self {
        Self {
            before: None,
            after: Some(token.into()),
            limit,
        }
    }

    pub fn before_token(&self) -> Option<&str> {
        self.before.as_deref()
    }

    pub fn after_token(&self) -> Option<&str> {
        self.after.as_deref()
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn is_first(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Query pairs in a stable order: before, after, limit
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(before) = &self.before {
            pairs.push(("before", before.clone()));
        }
        if let Some(after) = &self.after {
            pairs.push(("after", after.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Build a cursor from decoded query pairs, ignoring unrelated keys
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut before = None;
        let mut after = None;
        let mut limit = None;
        for (key, value) in pairs {
            match key {
                "before" if !value.is_empty() => before = Some(value.to_string()),
                "after" if !value.is_empty() => after = Some(value.to_string()),
                "limit" if !value.is_empty() => {
                    let parsed = value.parse::<u32>().map_err(|_| {
                        ExplorerError::InvalidCursor(format!("limit '{value}' is not a number"))
                    })?;
                    if parsed == 0 {
                        return Err(ExplorerError::InvalidCursor("limit must be positive".into()));
                    }
                    limit = Some(parsed);
                }
                _ => {}
            }
        }

        match (before, after) {
            (Some(_), Some(_)) => Err(ExplorerError::InvalidCursor(
                "before and after are mutually exclusive".into(),
            )),
            (Some(before), None) => Ok(Cursor::before(before, limit)),
            (None, Some(after)) => Ok(Cursor::after(after, limit)),
            (None, None) => Ok(Cursor::first(limit)),
        }
    }

    /// Encode as a URL query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    /// Decode from a URL query string (with or without the leading `?`)
    pub fn from_query_string(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Cursor::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_round_trip() {
        let cursors = [
            Cursor::first(None),
            Cursor::first(Some(30)),
            Cursor::before("10", None),
            Cursor::after("g3QAAAABZAAKYmxvY2tfaGFzaG0=", Some(10)),
            Cursor::before("a b&c=d", Some(5)),
        ];
        for cursor in cursors {
            let encoded = cursor.to_query_string();
            let decoded = Cursor::from_query_string(&encoded).unwrap();
            assert_eq!(decoded, cursor, "round trip of {encoded}");
        }
    }

    #[test]
    fn test_before_and_after_rejected() {
        let err = Cursor::from_query_string("before=1&after=2").unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidCursor(_)));
    }

    #[test]
    fn test_bad_limit_rejected() {
        assert!(Cursor::from_query_string("limit=ten").is_err());
        assert!(Cursor::from_query_string("limit=0").is_err());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let cursor = Cursor::from_query_string("?before=&after=5&tab=erc20").unwrap();
        assert_eq!(cursor, Cursor::after("5", None));
    }

    #[test]
    fn test_serializes_as_graphql_variables() {
        let value = serde_json::to_value(Cursor::after("abc", Some(10))).unwrap();
        assert_eq!(value, serde_json::json!({"after": "abc", "limit": 10}));
    }
}
