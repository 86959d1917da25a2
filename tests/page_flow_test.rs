//! Page load and session flow against an in-memory explorer backend

use std::sync::Mutex;
use std::time::Instant;

use serde_json::{json, Value};

use gwscope::domain::list::{
    AssetRow, BridgedRow, ContractInfo, EventRow, NftTransferRow, TransferRow, TxRow,
};
use gwscope::domain::{
    AccountLookup, Cursor, ExplorerError, Fields, ListData, ListFilter, ListPage, PageMetadata,
    Result, Route, Tab,
};
use gwscope::infrastructure::ExplorerApi;
use gwscope::session::live::LiveMessage;
use gwscope::session::page::{load_page, PageOutcome};
use gwscope::session::query::{QueryKey, QueryValue, SlotStatus};
use gwscope::session::{PageSession, SessionSettings};

const USER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const BLOCK_HASH: &str = "0x4f4b8f6cbbbbbd1d1d36d5c3e1e8f0c0f1a1a6a1f0e4f4d5b8f6c4a9f3b6e7d2";

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn tx(hash: &str) -> TxRow {
    TxRow {
        hash: hash.to_string(),
        block_number: Some(1),
        timestamp: Value::Null,
        from: Some(USER.to_string()),
        to: None,
        method: None,
        status: Some("COMMITTED".to_string()),
        succeeded: Some(true),
    }
}

/// Backend double that records which fetches were issued
#[derive(Default)]
struct MockApi {
    account: Option<Fields>,
    block: Option<Fields>,
    token: Option<Fields>,
    balance_fails: bool,
    transfer_total: u64,
    backend_down: bool,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    fn user() -> Self {
        Self {
            account: Some(fields(json!({"type": "ETH_USER", "eth_address": USER}))),
            ..Default::default()
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn called(&self, call: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == call)
    }
}

#[async_trait::async_trait]
impl ExplorerApi for MockApi {
    async fn account(&self, _: &AccountLookup) -> Result<Option<Fields>> {
        self.record("account");
        if self.backend_down {
            return Err(ExplorerError::Upstream("503 Service Unavailable".into()));
        }
        Ok(self.account.clone())
    }

    async fn balance(&self, _: &str) -> Result<String> {
        self.record("balance");
        if self.balance_fails {
            return Err(ExplorerError::Upstream("rpc timeout".into()));
        }
        Ok("2000000000000000000".to_string())
    }

    async fn deployer(&self, _: &str) -> Result<Option<String>> {
        self.record("deployer");
        Ok(None)
    }

    async fn block(&self, _: &str) -> Result<Fields> {
        self.record("block");
        self.block.clone().ok_or(ExplorerError::NotFound)
    }

    async fn token(&self, _: &str) -> Result<Fields> {
        self.record("token");
        self.token.clone().ok_or(ExplorerError::NotFound)
    }

    async fn transactions(&self, _: &ListFilter, _: &Cursor) -> Result<ListPage<TxRow>> {
        self.record("transactions");
        Ok(ListPage::single(vec![tx("0xaa"), tx("0xbb")]))
    }

    async fn transfers(
        &self,
        _: &ListFilter,
        _: u64,
        _: u32,
    ) -> Result<ListPage<TransferRow>> {
        self.record("transfers");
        Ok(ListPage {
            entries: Vec::new(),
            metadata: PageMetadata {
                total_count: self.transfer_total,
                before: None,
                after: None,
            },
        })
    }

    async fn bridged_records(
        &self,
        _: &ListFilter,
        _: u64,
        _: u32,
    ) -> Result<ListPage<BridgedRow>> {
        self.record("bridged");
        Ok(ListPage::single(Vec::new()))
    }

    async fn assets(&self, _: &ListFilter) -> Result<ListPage<AssetRow>> {
        self.record("assets");
        Ok(ListPage::single(Vec::new()))
    }

    async fn contract(&self, _: &str) -> Result<Option<ContractInfo>> {
        self.record("contract");
        Ok(None)
    }

    async fn events(&self, _: &ListFilter, _: &Cursor) -> Result<ListPage<EventRow>> {
        self.record("events");
        Ok(ListPage::single(Vec::new()))
    }

    async fn nft_transfers(&self, _: &ListFilter, _: &Cursor) -> Result<ListPage<NftTransferRow>> {
        self.record("nft_transfers");
        Ok(ListPage::single(Vec::new()))
    }

    async fn verify_contract(&self, _: &str) -> Result<Option<ContractInfo>> {
        self.record("verify");
        Ok(None)
    }
}

fn route(path: &str) -> Route {
    Route::parse(path).unwrap()
}

#[tokio::test]
async fn test_user_account_loads_transactions_by_default() {
    let api = MockApi::user();
    let outcome = load_page(&api, &route(&format!("/account/{USER}")), 10).await;

    let PageOutcome::Ready(page) = outcome else {
        panic!("expected ready page, got {:?}", outcome);
    };
    assert_eq!(page.balance.as_deref(), Some("2000000000000000000"));
    assert!(matches!(page.list, Some((_, ListData::Transactions(_)))));
    assert!(api.called("transactions"));
}

#[tokio::test]
async fn test_events_tab_on_plain_user_redirects_without_fetching() {
    let api = MockApi::user();
    let outcome = load_page(&api, &route(&format!("/account/{USER}?tab=events")), 10).await;

    match outcome {
        PageOutcome::Redirect { to, .. } => {
            assert_eq!(to.tab, None);
            assert_eq!(to.active_tab(), Some(Tab::Transactions));
        }
        other => panic!("expected redirect, got {:?}", other),
    }
    assert!(!api.called("events"));
}

#[tokio::test]
async fn test_unknown_tab_redirects_to_default() {
    let api = MockApi::user();
    let outcome = load_page(&api, &route(&format!("/account/{USER}?tab=nonsense")), 10).await;

    assert!(matches!(outcome, PageOutcome::Redirect { ref to, .. } if to.tab.is_none()));
    assert!(!api.called("account"));
}

#[tokio::test]
async fn test_page_zero_redirects_to_first_page() {
    let api = MockApi::user();
    let outcome = load_page(
        &api,
        &route(&format!("/account/{USER}?tab=erc20&page=0")),
        10,
    )
    .await;

    match outcome {
        PageOutcome::Redirect { to, .. } => {
            assert_eq!(to.page, None);
            assert_eq!(to.active_tab(), Some(Tab::Erc20));
        }
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_page_past_the_end_redirects_to_last_page() {
    let api = MockApi {
        transfer_total: 25,
        ..MockApi::user()
    };
    let outcome = load_page(
        &api,
        &route(&format!("/account/{USER}?tab=erc20&page=9")),
        10,
    )
    .await;

    match outcome {
        PageOutcome::Redirect { to, .. } => assert_eq!(to.page, Some(3)),
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_nft_collection_loads_activity_for_one_item() {
    let api = MockApi {
        token: Some(fields(json!({
            "id": 80,
            "name": "Kitties",
            "eth_type": "ERC721",
            "contract_address_hash": "0xc0ffee",
        }))),
        ..Default::default()
    };
    let outcome = load_page(&api, &route("/token/80?tab=activity&token_id=7"), 10).await;

    let PageOutcome::Ready(page) = outcome else {
        panic!("expected ready page, got {:?}", outcome);
    };
    let Some((request, ListData::NftTransfers(_))) = page.list else {
        panic!("expected nft activity");
    };
    assert_eq!(request.filter.token_contract_address_hash.as_deref(), Some("0xc0ffee"));
    assert_eq!(request.filter.token_id, Some(7));
    assert!(api.called("nft_transfers"));

    let fungible = MockApi {
        token: Some(fields(json!({"id": 1, "eth_type": "ERC20", "contract_address_hash": "0xaa"}))),
        ..Default::default()
    };
    let outcome = load_page(&fungible, &route("/token/1?tab=activity"), 10).await;
    assert!(matches!(outcome, PageOutcome::Redirect { ref to, .. } if to.tab.is_none()));
    assert!(!fungible.called("nft_transfers"));
}

#[tokio::test]
async fn test_missing_entities_and_backend_errors() {
    let api = MockApi::default();
    assert_eq!(
        load_page(&api, &route(&format!("/account/{USER}")), 10).await,
        PageOutcome::NotFound
    );
    assert_eq!(
        load_page(&api, &route("/block/12"), 10).await,
        PageOutcome::NotFound
    );

    let down = MockApi {
        backend_down: true,
        ..MockApi::user()
    };
    assert!(matches!(
        load_page(&down, &route(&format!("/account/{USER}")), 10).await,
        PageOutcome::Failed(_)
    ));
}

#[tokio::test]
async fn test_balance_failure_reads_zero() {
    let api = MockApi {
        balance_fails: true,
        ..MockApi::user()
    };
    let outcome = load_page(&api, &route(&format!("/account/{USER}")), 10).await;

    let PageOutcome::Ready(page) = outcome else {
        panic!("expected ready page, got {:?}", outcome);
    };
    assert_eq!(page.balance.as_deref(), Some("0"));
}

#[tokio::test]
async fn test_block_live_patch_merges_into_session() {
    let api = MockApi {
        block: Some(fields(json!({
            "hash": BLOCK_HASH,
            "number": 12,
            "finalize_state": "COMMITTED",
            "tx_count": 2,
        }))),
        ..Default::default()
    };
    let PageOutcome::Ready(page) = load_page(&api, &route("/block/12"), 10).await else {
        panic!("expected ready page");
    };

    let mut session = PageSession::new(*page, SessionSettings::default(), Instant::now());
    session.sync_subscription();
    let before = session.revision();

    let patched = session.apply_live(
        "blocks:12",
        LiveMessage::Partial(fields(json!({"finalize_state": "FINALIZED", "tx_count": null}))),
    );
    assert!(patched);
    assert!(session.revision() > before);
    assert_eq!(session.entity().str_field("finalize_state"), Some("FINALIZED"));
    assert_eq!(session.entity().u64_field("tx_count"), Some(2));

    assert!(!session.apply_live("blocks:13", LiveMessage::Snapshot(Fields::new())));
    assert_eq!(session.entity().u64_field("number"), Some(12));
}

#[tokio::test]
async fn test_stale_list_response_is_dropped() {
    let api = MockApi::user();
    let PageOutcome::Ready(page) = load_page(&api, &route(&format!("/account/{USER}")), 10).await
    else {
        panic!("expected ready page");
    };
    let now = Instant::now();
    let mut session = PageSession::new(*page, SessionSettings::default(), now);
    let base = session.route().clone();

    assert!(session.set_route(base.with_tab(Tab::Erc20)));
    let erc20 = session.plan_fetches(now);
    assert_eq!(erc20.len(), 1);

    assert!(session.set_route(base.with_tab(Tab::Bridged)));
    let bridged = session.plan_fetches(now);
    assert_eq!(bridged.len(), 1);

    let stale_key: QueryKey = erc20[0].key.clone();
    session.apply_result(
        &stale_key,
        Ok(QueryValue::List(ListData::Transfers(ListPage::single(Vec::new())))),
        now,
    );
    assert_eq!(session.list().status(), &SlotStatus::Loading);

    session.apply_result(
        &bridged[0].key,
        Ok(QueryValue::List(ListData::Bridged(ListPage::single(Vec::new())))),
        now,
    );
    assert!(matches!(
        session.list().data(),
        Some(ListData::Bridged(_))
    ));
}
