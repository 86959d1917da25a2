//! Query orchestration: which fetch a page issues, under which key, and which
//! response is allowed to land.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::format::is_eth_address;
use crate::domain::{
    AccountLookup, AccountSubtype, Cursor, EntityState, Fields, ListData, ListFilter, ListKind,
    ListRequest, PageKind, Paging, Result, Route, Tab,
};
use crate::infrastructure::api::{fetch_list, ExplorerApi};

/// Identifying parameter a list fetch cannot be issued without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Eth address, falling back to script hash
    AccountId,
    EthAddress,
    BlockHash,
    BlockNumber,
    TokenAddress,
    TokenId,
    /// Collection contract plus the route's optional token id
    NftContract,
}

/// One row of the fetch table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSpec {
    pub page: PageKind,
    pub tab: Tab,
    pub list: ListKind,
    pub requires: Param,
    pub paging: Paging,
}

const fn row(page: PageKind, tab: Tab, list: ListKind, requires: Param, paging: Paging) -> FetchSpec {
    FetchSpec {
        page,
        tab,
        list,
        requires,
        paging,
    }
}

pub const FETCH_TABLE: &[FetchSpec] = &[
    row(PageKind::Account, Tab::Transactions, ListKind::Transactions, Param::AccountId, Paging::Cursor),
    row(PageKind::Account, Tab::Erc20, ListKind::Transfers, Param::EthAddress, Paging::Number),
    row(PageKind::Account, Tab::Bridged, ListKind::Bridged, Param::EthAddress, Paging::Number),
    row(PageKind::Account, Tab::Assets, ListKind::Assets, Param::AccountId, Paging::None),
    row(PageKind::Account, Tab::Contract, ListKind::Contract, Param::EthAddress, Paging::None),
    row(PageKind::Account, Tab::Events, ListKind::Events, Param::EthAddress, Paging::Cursor),
    row(PageKind::Block, Tab::Transactions, ListKind::Transactions, Param::BlockHash, Paging::Cursor),
    row(PageKind::Block, Tab::Bridged, ListKind::Bridged, Param::BlockNumber, Paging::Number),
    row(PageKind::Token, Tab::Transfers, ListKind::Transfers, Param::TokenAddress, Paging::Number),
    row(PageKind::Token, Tab::Activity, ListKind::NftTransfers, Param::NftContract, Paging::Cursor),
    row(PageKind::Token, Tab::Bridged, ListKind::Bridged, Param::TokenId, Paging::Number),
];

pub fn spec_for(page: PageKind, tab: Tab) -> Option<&'static FetchSpec> {
    FETCH_TABLE.iter().find(|spec| spec.page == page && spec.tab == tab)
}

/// Tabs shown for this entity, in display order
pub fn visible_tabs(entity: &EntityState) -> Vec<Tab> {
    let kind = entity.kind();
    if kind == PageKind::Token {
        let nft = entity.token().is_some_and(|token| token.is_nft());
        return kind
            .tabs()
            .iter()
            .copied()
            .filter(|tab| *tab != Tab::Activity || nft)
            .collect();
    }
    if kind != PageKind::Account {
        return kind.tabs().to_vec();
    }
    let subtype = entity
        .account()
        .map(|account| account.subtype())
        .unwrap_or(AccountSubtype::Other(Default::default()));
    kind.tabs()
        .iter()
        .copied()
        .filter(|tab| match (subtype, tab) {
            (_, Tab::Transactions) => true,
            (AccountSubtype::Other(_), _) => false,
            (_, Tab::Erc20 | Tab::Bridged | Tab::Assets) => true,
            (AccountSubtype::Contract { has_abi }, Tab::Contract | Tab::Events) => has_abi,
            _ => false,
        })
        .collect()
}

/// Resolve the one list fetch the route needs, or `None` when it must be suppressed
pub fn plan(entity: &EntityState, route: &Route, page_size: u32) -> Option<ListRequest> {
    let tab = route.active_tab()?;
    if !visible_tabs(entity).contains(&tab) {
        return None;
    }
    let spec = spec_for(entity.kind(), tab)?;
    let mut filter = required_filter(entity, spec.requires)?;
    if spec.requires == Param::NftContract {
        filter.token_id = route.token_id;
    }
    if spec.list == ListKind::Transactions && entity.kind() == PageKind::Account {
        filter.start_block_number = route.block_from;
        filter.end_block_number = route.block_to;
    }

    let (cursor, page) = match spec.paging {
        Paging::Cursor => {
            let limit = route.cursor.limit().or(Some(page_size));
            (route.cursor.clone().with_limit(limit), None)
        }
        Paging::Number => {
            let page = route.page.filter(|p| *p > 0).unwrap_or(1) as u64;
            (Cursor::default(), Some(page))
        }
        Paging::None => (Cursor::default(), None),
    };

    Some(ListRequest {
        kind: spec.list,
        filter,
        cursor,
        page,
        page_size,
    })
}

fn required_filter(entity: &EntityState, param: Param) -> Option<ListFilter> {
    let mut filter = ListFilter::default();
    match param {
        Param::AccountId => {
            let id = entity.identifier()?;
            if is_eth_address(&id) {
                filter.address = Some(id);
            } else {
                filter.script_hash = Some(id);
            }
        }
        Param::EthAddress => {
            filter.address = Some(entity.str_field("eth_address")?.to_string());
        }
        Param::BlockHash => filter.block_hash = Some(entity.str_field("hash")?.to_string()),
        Param::BlockNumber => filter.block_number = Some(entity.u64_field("number")?),
        Param::TokenAddress => {
            let token = entity.token()?;
            filter.udt_address = Some(token.short_address.filter(|s| !s.is_empty())?);
        }
        Param::TokenId => filter.udt_id = Some(entity.identifier()?),
        Param::NftContract => {
            let token = entity.token()?;
            filter.token_contract_address_hash =
                Some(token.short_address.filter(|s| !s.is_empty())?);
        }
    }
    Some(filter)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Overview,
    Balance,
    List(ListKind),
}

/// Cache and identity key for one query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    pub entity_id: String,
    pub cursor: Cursor,
    pub page: Option<u64>,
    pub block_range: (Option<u64>, Option<u64>),
    pub token_id: Option<u64>,
}

impl QueryKey {
    pub fn overview(entity_id: impl Into<String>) -> Self {
        Self::plain(QueryKind::Overview, entity_id.into())
    }

    pub fn balance(entity_id: impl Into<String>) -> Self {
        Self::plain(QueryKind::Balance, entity_id.into())
    }

    pub fn list(entity_id: impl Into<String>, request: &ListRequest) -> Self {
        Self {
            kind: QueryKind::List(request.kind),
            entity_id: entity_id.into(),
            cursor: request.cursor.clone(),
            page: request.page,
            block_range: (
                request.filter.start_block_number,
                request.filter.end_block_number,
            ),
            token_id: request.filter.token_id,
        }
    }

    fn plain(kind: QueryKind, entity_id: String) -> Self {
        Self {
            kind,
            entity_id,
            cursor: Cursor::default(),
            page: None,
            block_range: (None, None),
            token_id: None,
        }
    }
}

/// What the runtime must fetch for a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Overview(AccountLookup),
    Balance(String),
    List(ListRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Overview(Option<Fields>),
    Balance(String),
    List(ListData),
}

/// Fetch outcome as it crosses back to the UI thread
pub type QueryResult = std::result::Result<QueryValue, String>;

/// A fetch the page wants issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand {
    pub key: QueryKey,
    pub request: FetchRequest,
}

/// Run one fetch against the backend. A failed balance lookup reads as zero.
pub async fn execute(api: &dyn ExplorerApi, request: &FetchRequest) -> Result<QueryValue> {
    match request {
        FetchRequest::Overview(lookup) => Ok(QueryValue::Overview(api.account(lookup).await?)),
        FetchRequest::Balance(address) => match api.balance(address).await {
            Ok(balance) => Ok(QueryValue::Balance(balance)),
            Err(err) => {
                warn!(%address, error = %err, "balance lookup failed");
                Ok(QueryValue::Balance("0".to_string()))
            }
        },
        FetchRequest::List(list) => Ok(QueryValue::List(fetch_list(api, list).await?)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: QueryValue,
    stored_at: Instant,
}

/// Successful results by key, served until they are `stale_after` old
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    stale_after: Duration,
    stats: CacheStats,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_after,
            stats: CacheStats::default(),
        }
    }

    /// Fresh value for `key`. A stale entry is dropped on the way out.
    pub fn get(&mut self, key: &QueryKey, now: Instant) -> Option<&QueryValue> {
        let fresh = self.entries.get(key).map(|entry| self.is_fresh(entry, now));
        if fresh == Some(false) {
            self.entries.remove(key);
        }
        if fresh == Some(true) {
            self.stats.hits += 1;
            self.entries.get(key).map(|entry| &entry.value)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Store `value`, pruning every entry that has gone stale
    pub fn insert(&mut self, key: QueryKey, value: QueryValue, now: Instant) {
        let stale_after = self.stale_after;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) < stale_after);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.stale_after
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotStatus {
    Idle,
    Loading,
    Ready(ListData),
    Failed(String),
}

/// The list body of a page. Only the response for the last-issued key may land.
#[derive(Debug, Clone)]
pub struct ListSlot {
    active: Option<QueryKey>,
    request: Option<ListRequest>,
    status: SlotStatus,
}

impl Default for ListSlot {
    fn default() -> Self {
        Self {
            active: None,
            request: None,
            status: SlotStatus::Idle,
        }
    }
}

impl ListSlot {
    pub fn active_key(&self) -> Option<&QueryKey> {
        self.active.as_ref()
    }

    pub fn request(&self) -> Option<&ListRequest> {
        self.request.as_ref()
    }

    pub fn status(&self) -> &SlotStatus {
        &self.status
    }

    pub fn data(&self) -> Option<&ListData> {
        match &self.status {
            SlotStatus::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SlotStatus::Loading
    }

    /// Mark `key` as the one outstanding request
    pub fn begin(&mut self, key: QueryKey, request: ListRequest) {
        self.active = Some(key);
        self.request = Some(request);
        self.status = SlotStatus::Loading;
    }

    /// Land a response. Returns `false` and leaves the slot untouched when
    /// `key` is no longer the active one.
    pub fn commit(&mut self, key: &QueryKey, result: std::result::Result<ListData, String>) -> bool {
        if self.active.as_ref() != Some(key) {
            debug!(?key, "dropping stale list response");
            return false;
        }
        self.status = match result {
            Ok(data) => SlotStatus::Ready(data),
            Err(message) => SlotStatus::Failed(message),
        };
        true
    }

    /// Nothing to show for this tab
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListPage;
    use serde_json::{json, Value};

    fn entity(kind: PageKind, value: Value) -> EntityState {
        match value {
            Value::Object(map) => EntityState::new(kind, map),
            _ => panic!("expected object"),
        }
    }

    fn user() -> EntityState {
        entity(
            PageKind::Account,
            json!({"type": "ETH_USER", "eth_address": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"}),
        )
    }

    fn contract(abi: Value) -> EntityState {
        entity(
            PageKind::Account,
            json!({
                "type": "POLYJUICE_CONTRACT",
                "eth_address": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
                "smart_contract": {"abi": abi}
            }),
        )
    }

    #[test]
    fn test_table_covers_every_tab() {
        for kind in [PageKind::Account, PageKind::Block, PageKind::Token] {
            for tab in kind.tabs() {
                assert!(spec_for(kind, *tab).is_some(), "{kind} {tab}");
            }
        }
        assert!(spec_for(PageKind::Token, Tab::Events).is_none());
    }

    #[test]
    fn test_visible_tabs_by_subtype() {
        assert_eq!(
            visible_tabs(&user()),
            vec![Tab::Transactions, Tab::Erc20, Tab::Bridged, Tab::Assets]
        );
        assert_eq!(visible_tabs(&contract(json!(null))), visible_tabs(&user()));
        assert_eq!(
            visible_tabs(&contract(json!([{"type": "event", "name": "E", "inputs": [], "anonymous": false}]))),
            PageKind::Account.tabs().to_vec()
        );
        let creator = entity(PageKind::Account, json!({"type": "POLYJUICE_CREATOR", "script_hash": "0x1"}));
        assert_eq!(visible_tabs(&creator), vec![Tab::Transactions]);

        let block = entity(PageKind::Block, json!({"number": 1}));
        assert_eq!(visible_tabs(&block), vec![Tab::Transactions, Tab::Bridged]);
    }

    #[test]
    fn test_events_suppressed_for_plain_user() {
        let route = Route::parse("/account/0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed?tab=events").unwrap();
        assert_eq!(plan(&user(), &route, 10), None);
    }

    #[test]
    fn test_missing_param_suppresses_fetch() {
        let by_hash = entity(
            PageKind::Account,
            json!({"type": "ETH_USER", "script_hash": format!("0x{}", "22".repeat(32))}),
        );
        let route = Route::parse("/account/x?tab=erc20").unwrap();
        assert_eq!(plan(&by_hash, &route, 10), None);

        let route = Route::parse("/account/x?tab=assets").unwrap();
        let request = plan(&by_hash, &route, 10).unwrap();
        assert!(request.filter.script_hash.is_some());
        assert_eq!(request.filter.address, None);
    }

    #[test]
    fn test_plan_paging_modes() {
        let route = Route::parse(
            "/account/0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed?before=10&block_from=5&block_to=9",
        )
        .unwrap();
        let request = plan(&user(), &route, 25).unwrap();
        assert_eq!(request.kind, ListKind::Transactions);
        assert_eq!(request.cursor, Cursor::before("10", Some(25)));
        assert_eq!(request.filter.start_block_number, Some(5));
        assert_eq!(request.filter.end_block_number, Some(9));
        assert_eq!(request.page, None);

        let route = Route::parse("/account/0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed?tab=erc20&page=3").unwrap();
        let request = plan(&user(), &route, 10).unwrap();
        assert_eq!(request.kind, ListKind::Transfers);
        assert_eq!(request.page, Some(3));
        assert!(request.cursor.is_first());

        let token = entity(PageKind::Token, json!({"id": 4, "short_address": "0xdead"}));
        let request = plan(&token, &Route::token("4"), 10).unwrap();
        assert_eq!(request.filter.udt_address.as_deref(), Some("0xdead"));
        assert_eq!(request.page, Some(1));

        let request = plan(&token, &Route::token("4").with_tab(Tab::Bridged), 10).unwrap();
        assert_eq!(request.filter.udt_id.as_deref(), Some("4"));
    }

    #[test]
    fn test_nft_activity_tab() {
        let erc20 = entity(PageKind::Token, json!({"id": 4, "short_address": "0xdead", "eth_type": "ERC20"}));
        assert_eq!(visible_tabs(&erc20), vec![Tab::Transfers, Tab::Bridged]);
        let route = Route::parse("/token/4?tab=activity").unwrap();
        assert_eq!(plan(&erc20, &route, 10), None);

        let nft = entity(PageKind::Token, json!({"id": 5, "short_address": "0xc0", "eth_type": "ERC721"}));
        assert_eq!(visible_tabs(&nft), PageKind::Token.tabs().to_vec());

        let route = Route::parse("/token/5?tab=activity&token_id=42&after=a1").unwrap();
        let request = plan(&nft, &route, 10).unwrap();
        assert_eq!(request.kind, ListKind::NftTransfers);
        assert_eq!(request.filter.token_contract_address_hash.as_deref(), Some("0xc0"));
        assert_eq!(request.filter.token_id, Some(42));
        assert_eq!(request.cursor, Cursor::after("a1", Some(10)));
        assert_eq!(request.page, None);
    }

    #[test]
    fn test_block_fetches() {
        let block = entity(PageKind::Block, json!({"number": 7, "hash": "0xbeef"}));
        let request = plan(&block, &Route::block("7"), 10).unwrap();
        assert_eq!(request.filter.block_hash.as_deref(), Some("0xbeef"));

        let request = plan(&block, &Route::block("7").with_tab(Tab::Bridged), 10).unwrap();
        assert_eq!(request.filter.block_number, Some(7));
    }

    fn tx_page(hash: &str) -> ListData {
        ListData::Transactions(ListPage::single(vec![crate::domain::list::TxRow {
            hash: hash.to_string(),
            block_number: None,
            timestamp: Value::Null,
            from: None,
            to: None,
            method: None,
            status: None,
            succeeded: None,
        }]))
    }

    #[test]
    fn test_stale_cursor_response_is_dropped() {
        let route = Route::parse("/account/0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let before = plan(&user(), &route.with_cursor(Cursor::before("10", None)), 10).unwrap();
        let after = plan(&user(), &route.with_cursor(Cursor::after("5", None)), 10).unwrap();
        let before_key = QueryKey::list("0xabc", &before);
        let after_key = QueryKey::list("0xabc", &after);
        assert_ne!(before_key, after_key);

        let mut slot = ListSlot::default();
        slot.begin(before_key.clone(), before);
        slot.begin(after_key.clone(), after);

        assert!(slot.commit(&after_key, Ok(tx_page("after"))));
        assert!(!slot.commit(&before_key, Ok(tx_page("before"))));
        assert_eq!(slot.data(), Some(&tx_page("after")));
    }

    #[test]
    fn test_failure_lands_as_failed() {
        let request = plan(&user(), &Route::account("0x1"), 10).unwrap();
        let key = QueryKey::list("0x1", &request);
        let mut slot = ListSlot::default();
        slot.begin(key.clone(), request);
        assert!(slot.is_loading());
        assert!(slot.commit(&key, Err("timeout".into())));
        assert_eq!(slot.status(), &SlotStatus::Failed("timeout".into()));
    }

    #[test]
    fn test_cache_staleness() {
        let mut cache = QueryCache::new(Duration::from_secs(10));
        let key = QueryKey::balance("0x1");
        let start = Instant::now();
        cache.insert(key.clone(), QueryValue::Balance("5".into()), start);

        assert_eq!(
            cache.get(&key, start + Duration::from_secs(9)),
            Some(&QueryValue::Balance("5".into()))
        );
        assert_eq!(cache.get(&key, start + Duration::from_secs(10)), None);
        assert_eq!(cache.get(&QueryKey::overview("0x1"), start), None);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });

        cache.invalidate();
        assert_eq!(cache.get(&key, start), None);
    }

    #[test]
    fn test_cache_drops_stale_entries() {
        let mut cache = QueryCache::new(Duration::from_secs(10));
        let start = Instant::now();
        cache.insert(QueryKey::balance("0x1"), QueryValue::Balance("1".into()), start);
        cache.insert(QueryKey::balance("0x2"), QueryValue::Balance("2".into()), start);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.get(&QueryKey::balance("0x1"), start + Duration::from_secs(11)), None);
        assert_eq!(cache.len(), 1);

        let later = start + Duration::from_secs(12);
        cache.insert(QueryKey::balance("0x3"), QueryValue::Balance("3".into()), later);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&QueryKey::balance("0x3"), later).is_some());
    }

    #[test]
    fn test_token_id_is_part_of_list_key() {
        let nft = entity(PageKind::Token, json!({"id": 5, "short_address": "0xc0", "eth_type": "ERC721"}));
        let all = plan(&nft, &Route::parse("/token/5?tab=activity").unwrap(), 10).unwrap();
        let one = plan(&nft, &Route::parse("/token/5?tab=activity&token_id=1").unwrap(), 10).unwrap();
        assert_ne!(QueryKey::list("5", &all), QueryKey::list("5", &one));
    }
}
