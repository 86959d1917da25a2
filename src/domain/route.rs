//! Page routes: `/account/:id`, `/block/:id`, `/token/:id` plus query parameters

use std::fmt;

use url::form_urlencoded;

use super::cursor::Cursor;
use super::error::{ExplorerError, Result};
use super::tab::{PageKind, Tab};

/// A parsed detail-page route.
///
/// `tab` and `page` are kept raw so the page loader can turn bad values into
/// redirects instead of parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: PageKind,
    pub id: String,
    pub tab: Option<String>,
    pub cursor: Cursor,
    pub page: Option<i64>,
    pub block_from: Option<u64>,
    pub block_to: Option<u64>,
    /// Narrows NFT activity to one item of the collection
    pub token_id: Option<u64>,
}

impl Route {
    pub fn new(kind: PageKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            tab: None,
            cursor: Cursor::default(),
            page: None,
            block_from: None,
            block_to: None,
            token_id: None,
        }
    }

    pub fn account(id: impl Into<String>) -> Self {
        Self::new(PageKind::Account, id)
    }

    pub fn block(id: impl Into<String>) -> Self {
        Self::new(PageKind::Block, id)
    }

    pub fn token(id: impl Into<String>) -> Self {
        Self::new(PageKind::Token, id)
    }

    /// Parse `/kind/id?query`. A leading locale segment (`/en-US/block/1`) and
    /// a scheme/host prefix are tolerated.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let without_origin = match trimmed.find("://") {
            Some(idx) => {
                let rest = &trimmed[idx + 3..];
                rest.find('/').map(|slash| &rest[slash..]).unwrap_or("/")
            }
            None => trimmed,
        };
        let (path, query) = match without_origin.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_origin, ""),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (kind_segment, id) = match segments.as_slice() {
            [kind, id] => (*kind, *id),
            [_locale, kind, id] => (*kind, *id),
            _ => return Err(ExplorerError::InvalidRoute(input.to_string())),
        };
        let kind = PageKind::from_segment(kind_segment)
            .ok_or_else(|| ExplorerError::InvalidRoute(input.to_string()))?;

        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let cursor = Cursor::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let mut route = Route::new(kind, id);
        route.cursor = cursor;
        for (key, value) in &pairs {
            match key.as_str() {
                "tab" => route.tab = Some(value.clone()),
                "page" => {
                    let page = value.parse::<i64>().map_err(|_| {
                        ExplorerError::InvalidRoute(format!("page '{value}' is not a number"))
                    })?;
                    route.page = Some(page);
                }
                "block_from" => route.block_from = parse_block_bound(value)?,
                "block_to" => route.block_to = parse_block_bound(value)?,
                "token_id" => {
                    route.token_id = value.parse::<u64>().map(Some).map_err(|_| {
                        ExplorerError::InvalidRoute(format!("token_id '{value}' is not a number"))
                    })?
                }
                _ => {}
            }
        }
        Ok(route)
    }

    /// The tab to display. `None` when the `tab` parameter names no tab of this page.
    pub fn active_tab(&self) -> Option<Tab> {
        match &self.tab {
            Some(raw) => self.kind.parse_tab(raw),
            None => Some(self.kind.default_tab()),
        }
    }

    /// Same entity, different tab; pagination is reset
    pub fn with_tab(&self, tab: Tab) -> Self {
        Self {
            tab: Some(tab.tag().to_string()),
            cursor: Cursor::first(self.cursor.limit()),
            page: None,
            ..self.clone()
        }
    }

    pub fn with_default_tab(&self) -> Self {
        Self {
            tab: None,
            ..self.clone()
        }
    }

    pub fn with_cursor(&self, cursor: Cursor) -> Self {
        Self {
            cursor,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: Option<i64>) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn with_block_range(&self, from: Option<u64>, to: Option<u64>) -> Self {
        Self {
            block_from: from,
            block_to: to,
            cursor: Cursor::first(self.cursor.limit()),
            ..self.clone()
        }
    }

    /// NFT activity narrowed to `token_id`; the cursor restarts
    pub fn with_token_id(&self, token_id: Option<u64>) -> Self {
        Self {
            tab: Some(Tab::Activity.tag().to_string()),
            token_id,
            cursor: Cursor::first(self.cursor.limit()),
            ..self.clone()
        }
    }

    /// Two routes pointing at the same entity page
    pub fn same_entity(&self, other: &Route) -> bool {
        self.kind == other.kind && self.id.eq_ignore_ascii_case(&other.id)
    }

    pub fn to_path(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(tab) = &self.tab {
            serializer.append_pair("tab", tab);
        }
        serializer.extend_pairs(self.cursor.query_pairs());
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(from) = self.block_from {
            serializer.append_pair("block_from", &from.to_string());
        }
        if let Some(to) = self.block_to {
            serializer.append_pair("block_to", &to.to_string());
        }
        if let Some(token_id) = self.token_id {
            serializer.append_pair("token_id", &token_id.to_string());
        }
        let query = serializer.finish();

        if query.is_empty() {
            format!("/{}/{}", self.kind.path_segment(), self.id)
        } else {
            format!("/{}/{}?{}", self.kind.path_segment(), self.id, query)
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn parse_block_bound(value: &str) -> Result<Option<u64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ExplorerError::InvalidRoute(format!("block bound '{value}' is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_routes() {
        let route = Route::parse("/block/42").unwrap();
        assert_eq!(route.kind, PageKind::Block);
        assert_eq!(route.id, "42");
        assert_eq!(route.active_tab(), Some(Tab::Transactions));

        let route = Route::parse("token/3?tab=bridged&page=2").unwrap();
        assert_eq!(route.kind, PageKind::Token);
        assert_eq!(route.active_tab(), Some(Tab::Bridged));
        assert_eq!(route.page, Some(2));
    }

    #[test]
    fn test_parse_locale_and_origin() {
        let route =
            Route::parse("https://v1.gwscan.com/en-US/account/0xabc?tab=events&after=9").unwrap();
        assert_eq!(route.kind, PageKind::Account);
        assert_eq!(route.id, "0xabc");
        assert_eq!(route.active_tab(), Some(Tab::Events));
        assert_eq!(route.cursor, Cursor::after("9", None));
    }

    #[test]
    fn test_unknown_tab_is_kept_raw() {
        let route = Route::parse("/token/1?tab=events").unwrap();
        assert_eq!(route.tab.as_deref(), Some("events"));
        assert_eq!(route.active_tab(), None);
    }

    #[test]
    fn test_invalid_routes() {
        assert!(Route::parse("/tx/0x1").is_err());
        assert!(Route::parse("/block").is_err());
        assert!(Route::parse("/block/1?page=abc").is_err());
        assert!(Route::parse("/block/1?before=a&after=b").is_err());
    }

    #[test]
    fn test_path_round_trip() {
        let route = Route::account("0xabc")
            .with_tab(Tab::Transactions)
            .with_block_range(Some(10), Some(20))
            .with_cursor(Cursor::before("tok en", Some(25)));
        let parsed = Route::parse(&route.to_path()).unwrap();
        assert_eq!(parsed, route);
    }

    #[test]
    fn test_token_id_param() {
        let route = Route::parse("/token/0xc0?tab=activity&token_id=42").unwrap();
        assert_eq!(route.token_id, Some(42));
        assert_eq!(route.active_tab(), Some(Tab::Activity));
        assert_eq!(Route::parse(&route.to_path()).unwrap(), route);
        assert!(Route::parse("/token/0xc0?token_id=x").is_err());

        let narrowed = Route::parse("/token/0xc0?after=abc").unwrap().with_token_id(Some(7));
        assert_eq!(narrowed.to_path(), "/token/0xc0?tab=activity&token_id=7");
    }

    #[test]
    fn test_with_tab_resets_paging() {
        let route = Route::parse("/account/0x1?tab=erc20&page=3").unwrap();
        let next = route.with_tab(Tab::Bridged);
        assert_eq!(next.page, None);
        assert_eq!(next.to_path(), "/account/0x1?tab=bridged");
    }
}
