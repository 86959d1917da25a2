//! Render composer: a pure projection of page state into what the terminal draws

use alloy_json_abi::JsonAbi;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::query::{visible_tabs, ListSlot, SlotStatus};
use crate::domain::entity::{value_as_display, value_as_u64, AccountType};
use crate::domain::format::{
    block_status, format_datetime, format_int, format_units, time_distance, truncate_middle,
    CKB_DECIMALS,
};
use crate::domain::list::{
    AssetRow, BridgedRow, ContractInfo, EventRow, NftTransferRow, TransferRow, TxRow,
};
use crate::domain::{
    AccountSubtype, EntityState, ListData, ListPage, ListRequest, PageKind, PageMetadata, Paging,
    Route, Tab,
};

const ADDRESS_CHARS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Opens another explorer page
    Link { text: String, route: Route },
    /// Points outside the explorer (L1 explorer, token site)
    External { text: String, url: String },
    Loading,
    /// Empty or failed to load
    Placeholder,
    /// Not anchored on L1 yet
    Pending,
}

impl FieldValue {
    /// Plain text for clipboard and export
    pub fn text(&self) -> &str {
        match self {
            FieldValue::Text(text)
            | FieldValue::Link { text, .. }
            | FieldValue::External { text, .. } => text,
            FieldValue::Loading => "loading...",
            FieldValue::Placeholder => "-",
            FieldValue::Pending => "pending",
        }
    }

    fn or_placeholder(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.is_empty() => FieldValue::Text(text),
            _ => FieldValue::Placeholder,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub label: &'static str,
    pub value: FieldValue,
}

impl FieldView {
    fn new(label: &'static str, value: FieldValue) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub tab: Tab,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub total_count: u64,
    pub page: Option<u64>,
    pub last_page: Option<u64>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(paging: Paging, request: &ListRequest, metadata: &PageMetadata) -> Self {
        match paging {
            Paging::Cursor => Self {
                total_count: metadata.total_count,
                page: None,
                last_page: None,
                has_prev: metadata.before.is_some(),
                has_next: metadata.after.is_some(),
            },
            Paging::Number => {
                let page = request.page.unwrap_or(1);
                let last = metadata.last_page(request.page_size);
                Self {
                    total_count: metadata.total_count,
                    page: Some(page),
                    last_page: Some(last),
                    has_prev: page > 1,
                    has_next: page < last,
                }
            }
            Paging::None => Self {
                total_count: metadata.total_count,
                page: None,
                last_page: None,
                has_prev: false,
                has_next: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub cells: Vec<String>,
    pub link: Option<Route>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<&'static str>,
    pub rows: Vec<RowView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractView {
    pub name: Option<String>,
    pub compiler: Option<String>,
    pub verified: bool,
    pub functions: Vec<String>,
    pub events: Vec<String>,
    pub abi_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListBody {
    Empty,
    Loading,
    Failed(String),
    Table(TableView),
    Contract(ContractView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub title: String,
    pub fields: Vec<FieldView>,
    pub tabs: Vec<TabView>,
    pub body: ListBody,
}

/// Everything the composer reads
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub entity: &'a EntityState,
    pub route: &'a Route,
    pub list: &'a ListSlot,
    pub overview_loading: bool,
    pub balance: Option<&'a str>,
    pub balance_loading: bool,
    pub deployer: Option<&'a str>,
    pub ckb_explorer: &'a str,
    pub now: DateTime<Utc>,
}

pub fn compose(input: &RenderInput<'_>) -> PageView {
    let entity = input.entity;
    let visible = visible_tabs(entity);
    let active = input.route.active_tab().filter(|tab| visible.contains(tab));
    let tabs = visible
        .iter()
        .map(|tab| TabView {
            tab: *tab,
            active: Some(*tab) == active,
        })
        .collect();

    let (title, fields) = match entity.kind() {
        PageKind::Account => account_fields(input),
        PageKind::Block => block_fields(input),
        PageKind::Token => token_fields(input),
    };

    let body = match active {
        Some(tab) => list_body(input, tab),
        None => ListBody::Empty,
    };

    PageView {
        title,
        fields,
        tabs,
        body,
    }
}

fn account_fields(input: &RenderInput<'_>) -> (String, Vec<FieldView>) {
    let account = input.entity.account().unwrap_or_default();
    let id = account.id().unwrap_or("-").to_string();
    let title = format!("{} {}", account.account_type.title(), id);
    let loading = |present: bool| input.overview_loading && !present;

    let mut fields = vec![FieldView::new(
        "Type",
        FieldValue::Text(account.account_type.title().to_string()),
    )];
    fields.push(FieldView::new(
        "Eth Address",
        FieldValue::or_placeholder(account.eth_address.clone()),
    ));
    fields.push(FieldView::new(
        "Script Hash",
        FieldValue::or_placeholder(account.script_hash.clone()),
    ));

    let balance = match input.balance {
        Some(raw) => FieldValue::or_placeholder(
            format_units(raw, CKB_DECIMALS).map(|ckb| format!("{ckb} CKB")),
        ),
        None if input.balance_loading => FieldValue::Loading,
        None => FieldValue::Placeholder,
    };
    fields.push(FieldView::new("Balance", balance));

    let tx_count = if loading(account.transaction_count.is_some()) {
        FieldValue::Loading
    } else {
        FieldValue::or_placeholder(account.transaction_count.map(format_int))
    };
    fields.push(FieldView::new("Transactions", tx_count));
    fields.push(FieldView::new(
        "Nonce",
        FieldValue::or_placeholder(account.nonce.map(|n| n.to_string())),
    ));

    if let AccountSubtype::Contract { has_abi } = account.subtype() {
        let contract = account.smart_contract.clone().unwrap_or_default();
        fields.push(FieldView::new(
            "Contract",
            FieldValue::or_placeholder(contract.name.clone()),
        ));
        fields.push(FieldView::new(
            "Verified",
            FieldValue::Text(if has_abi { "yes" } else { "no" }.to_string()),
        ));
        fields.push(FieldView::new(
            "Deployer",
            match input.deployer {
                Some(deployer) => FieldValue::Link {
                    text: truncate_middle(deployer, ADDRESS_CHARS),
                    route: Route::account(deployer),
                },
                None => FieldValue::Placeholder,
            },
        ));
        fields.push(FieldView::new(
            "Deployment Tx",
            FieldValue::or_placeholder(
                contract
                    .deployment_tx_hash
                    .as_deref()
                    .map(|hash| truncate_middle(hash, ADDRESS_CHARS)),
            ),
        ));
    }

    if account.account_type == AccountType::Udt {
        let udt = account.udt.clone().unwrap_or_default();
        let value = match udt.id.as_ref().and_then(value_as_display) {
            Some(udt_id) => FieldValue::Link {
                text: udt.name.clone().or(udt.symbol.clone()).unwrap_or_else(|| udt_id.clone()),
                route: Route::token(udt_id),
            },
            None => FieldValue::Placeholder,
        };
        fields.push(FieldView::new("Token", value));
    }

    (title, fields)
}

fn block_fields(input: &RenderInput<'_>) -> (String, Vec<FieldView>) {
    let block = input.entity.block().unwrap_or_default();
    let title = match block.number {
        Some(number) => format!("Block #{}", format_int(number)),
        None => "Block".to_string(),
    };

    let timestamp = match (
        format_datetime(&block.timestamp),
        time_distance(&block.timestamp, input.now),
    ) {
        (Some(at), Some(age)) => FieldValue::Text(format!("{at} ({age})")),
        (at, _) => FieldValue::or_placeholder(at),
    };

    let l1_block = match block.l1_block {
        Some(number) => FieldValue::External {
            text: format_int(number),
            url: format!("{}/block/{}", input.ckb_explorer.trim_end_matches('/'), number),
        },
        None => FieldValue::Pending,
    };
    let l1_tx = match block.tx_hash.as_deref().filter(|h| !h.is_empty()) {
        Some(hash) => FieldValue::External {
            text: truncate_middle(hash, ADDRESS_CHARS),
            url: format!("{}/transaction/{}", input.ckb_explorer.trim_end_matches('/'), hash),
        },
        None => FieldValue::Pending,
    };
    let aggregator = match block.aggregator.as_deref().filter(|a| !a.is_empty()) {
        Some(address) => FieldValue::Link {
            text: truncate_middle(address, ADDRESS_CHARS),
            route: Route::account(address),
        },
        None => FieldValue::Placeholder,
    };

    let fields = vec![
        FieldView::new("Hash", FieldValue::or_placeholder(block.hash.clone())),
        FieldView::new("Number", FieldValue::or_placeholder(block.number.map(format_int))),
        FieldView::new("Timestamp", timestamp),
        FieldView::new(
            "Status",
            FieldValue::Text(block_status(block.finalize_state.as_deref()).to_string()),
        ),
        FieldView::new("L1 Block", l1_block),
        FieldView::new("L1 Tx Hash", l1_tx),
        FieldView::new("Transactions", FieldValue::or_placeholder(block.tx_count.map(format_int))),
        FieldView::new("Aggregator", aggregator),
    ];
    (title, fields)
}

fn token_fields(input: &RenderInput<'_>) -> (String, Vec<FieldView>) {
    let token = input.entity.token().unwrap_or_default();
    let display_name = token
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .or(token.symbol.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "-".to_string());
    let title = format!("Token {display_name}");

    let contract = match token.short_address.as_deref().filter(|a| !a.is_empty()) {
        Some(address) => FieldValue::Link {
            text: truncate_middle(address, ADDRESS_CHARS),
            route: Route::account(address),
        },
        None => FieldValue::Placeholder,
    };
    let site = match token.official_site.as_deref().filter(|s| !s.is_empty()) {
        Some(url) => FieldValue::External {
            text: url.to_string(),
            url: url.to_string(),
        },
        None => FieldValue::Placeholder,
    };
    let count = |value: &Value| FieldValue::or_placeholder(value_as_u64(value).map(format_int));

    let fields = vec![
        FieldView::new("Name", FieldValue::or_placeholder(token.name.clone())),
        FieldView::new("Symbol", FieldValue::or_placeholder(token.symbol.clone())),
        FieldView::new(
            "Decimal",
            FieldValue::or_placeholder(token.decimal.map(|d| d.to_string())),
        ),
        FieldView::new("Type", FieldValue::or_placeholder(token.token_type.clone())),
        FieldView::new("Contract", contract),
        FieldView::new("Supply", FieldValue::or_placeholder(value_as_display(&token.supply))),
        FieldView::new("Holders", count(&token.holder_count)),
        FieldView::new("Transfers", count(&token.transfer_count)),
        FieldView::new("Official Site", site),
        FieldView::new("Description", FieldValue::or_placeholder(token.description.clone())),
    ];
    (title, fields)
}

fn list_body(input: &RenderInput<'_>, tab: Tab) -> ListBody {
    match input.list.status() {
        SlotStatus::Idle => ListBody::Empty,
        SlotStatus::Loading => ListBody::Loading,
        SlotStatus::Failed(message) => ListBody::Failed(message.clone()),
        SlotStatus::Ready(ListData::Contract(info)) => {
            ListBody::Contract(contract_view(input.entity, info.as_ref()))
        }
        SlotStatus::Ready(data) => {
            let Some(request) = input.list.request() else {
                return ListBody::Empty;
            };
            let paging = super::query::spec_for(input.entity.kind(), tab)
                .map(|spec| spec.paging)
                .unwrap_or(Paging::None);
            ListBody::Table(table_view(data, request, paging, input.now))
        }
    }
}

/// Columns and rows for a fetched list
pub fn table_view(
    data: &ListData,
    request: &ListRequest,
    paging: Paging,
    now: DateTime<Utc>,
) -> TableView {
    let (columns, rows, metadata): (Vec<&'static str>, Vec<RowView>, PageMetadata) = match data {
        ListData::Transactions(page) => (
            vec!["Hash", "Block", "Age", "From", "To", "Method", "Status"],
            rows(page, |row| tx_row(row, now)),
            page.metadata.clone(),
        ),
        ListData::Transfers(page) => (
            vec!["Tx Hash", "Block", "Age", "From", "To", "Amount"],
            rows(page, |row| transfer_row(row, now)),
            page.metadata.clone(),
        ),
        ListData::Bridged(page) => (
            vec!["Type", "Value", "Account", "L1 Tx", "Block", "Age"],
            rows(page, |row| bridged_row(row, now)),
            page.metadata.clone(),
        ),
        ListData::Assets(page) => (
            vec!["Asset", "Symbol", "Type", "Balance"],
            rows(page, asset_row),
            page.metadata.clone(),
        ),
        ListData::Events(page) => (
            vec!["Tx Hash", "Block", "Log", "Topic", "Data"],
            rows(page, event_row),
            page.metadata.clone(),
        ),
        ListData::NftTransfers(page) => (
            vec!["Tx Hash", "Method", "Block", "Age", "From", "To", "Token ID", "Status"],
            rows(page, |row| nft_transfer_row(row, now)),
            page.metadata.clone(),
        ),
        ListData::Contract(_) => (Vec::new(), Vec::new(), PageMetadata::default()),
    };
    TableView {
        columns,
        rows,
        pagination: Pagination::new(paging, request, &metadata),
    }
}

fn rows<T>(page: &ListPage<T>, f: impl Fn(&T) -> RowView) -> Vec<RowView> {
    page.entries.iter().map(f).collect()
}

fn short(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map(|v| truncate_middle(v, ADDRESS_CHARS))
        .unwrap_or_else(|| "-".to_string())
}

fn block_cell(number: Option<u64>) -> String {
    number.map(format_int).unwrap_or_else(|| "-".to_string())
}

fn age_cell(timestamp: &Value, now: DateTime<Utc>) -> String {
    time_distance(timestamp, now).unwrap_or_else(|| "-".to_string())
}

fn tx_row(row: &TxRow, now: DateTime<Utc>) -> RowView {
    let status = match row.succeeded {
        Some(false) => "failed".to_string(),
        _ => block_status(row.status.as_deref()).to_string(),
    };
    RowView {
        cells: vec![
            short(Some(row.hash.as_str())),
            block_cell(row.block_number),
            age_cell(&row.timestamp, now),
            short(row.from.as_deref()),
            short(row.to.as_deref()),
            row.method.clone().unwrap_or_else(|| "-".to_string()),
            status,
        ],
        link: row.block_number.map(|n| Route::block(n.to_string())),
    }
}

fn transfer_row(row: &TransferRow, now: DateTime<Utc>) -> RowView {
    let amount = match (&row.amount, &row.symbol) {
        (Some(amount), Some(symbol)) => format!("{amount} {symbol}"),
        (Some(amount), None) => amount.clone(),
        _ => "-".to_string(),
    };
    RowView {
        cells: vec![
            short(Some(row.tx_hash.as_str())),
            block_cell(row.block_number),
            age_cell(&row.timestamp, now),
            short(row.from.as_deref()),
            short(row.to.as_deref()),
            amount,
        ],
        link: row.block_number.map(|n| Route::block(n.to_string())),
    }
}

fn nft_transfer_row(row: &NftTransferRow, now: DateTime<Utc>) -> RowView {
    let status = match row.succeeded {
        Some(false) => "failed".to_string(),
        _ => block_status(row.status.as_deref()).to_string(),
    };
    RowView {
        cells: vec![
            short(Some(row.tx_hash.as_str())),
            row.method.clone().unwrap_or_else(|| "-".to_string()),
            block_cell(row.block_number),
            age_cell(&row.timestamp, now),
            short(row.from.as_deref()),
            short(row.to.as_deref()),
            row.token_id.clone().unwrap_or_else(|| "-".to_string()),
            status,
        ],
        link: row.block_number.map(|n| Route::block(n.to_string())),
    }
}

fn bridged_row(row: &BridgedRow, now: DateTime<Utc>) -> RowView {
    let value = match (&row.value, &row.symbol) {
        (Some(value), Some(symbol)) => format!("{value} {symbol}"),
        (Some(value), None) => value.clone(),
        _ => "-".to_string(),
    };
    let link = match row.owner.as_deref().filter(|o| !o.is_empty()) {
        Some(owner) => Some(Route::account(owner)),
        None => row.block_number.map(|n| Route::block(n.to_string())),
    };
    RowView {
        cells: vec![
            row.direction.clone().unwrap_or_else(|| "-".to_string()),
            value,
            short(row.owner.as_deref()),
            short(row.layer1_tx_hash.as_deref()),
            block_cell(row.block_number),
            age_cell(&row.timestamp, now),
        ],
        link,
    }
}

fn asset_row(row: &AssetRow) -> RowView {
    let balance = match (&row.value, row.decimal) {
        (Some(value), Some(decimal)) => format_units(value, decimal).unwrap_or_else(|| value.clone()),
        (Some(value), None) => value.clone(),
        _ => "-".to_string(),
    };
    RowView {
        cells: vec![
            row.name.clone().unwrap_or_else(|| "-".to_string()),
            row.symbol.clone().unwrap_or_else(|| "-".to_string()),
            row.token_type.clone().unwrap_or_else(|| "-".to_string()),
            balance,
        ],
        link: row.udt_id.clone().map(Route::token),
    }
}

fn event_row(row: &EventRow) -> RowView {
    RowView {
        cells: vec![
            short(row.tx_hash.as_deref()),
            block_cell(row.block_number),
            row.log_index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string()),
            short(row.topics.first().map(String::as_str)),
            short(row.data.as_deref()),
        ],
        link: row.block_number.map(|n| Route::block(n.to_string())),
    }
}

/// Contract tab body: fetched info first, the account's own contract record as fallback
pub fn contract_view(entity: &EntityState, info: Option<&ContractInfo>) -> ContractView {
    let fallback = entity
        .account()
        .and_then(|account| account.smart_contract)
        .unwrap_or_default();

    let name = info.and_then(|i| i.name.clone()).or(fallback.name.clone());
    let compiler = info
        .and_then(|i| i.compiler_version.clone())
        .or(fallback.compiler_version.clone());
    let abi = info
        .and_then(|i| i.abi.clone())
        .filter(|abi| !abi.is_null())
        .or(fallback.abi.clone())
        .filter(|abi| !abi.is_null());

    let mut view = ContractView {
        name,
        compiler,
        verified: false,
        functions: Vec::new(),
        events: Vec::new(),
        abi_error: None,
    };
    let Some(abi) = abi else {
        return view;
    };
    match serde_json::from_value::<JsonAbi>(abi) {
        Ok(parsed) => {
            view.verified = true;
            view.functions = parsed.functions().map(|f| f.signature()).collect();
            view.events = parsed.events().map(|e| e.signature()).collect();
        }
        Err(err) => view.abi_error = Some(err.to_string()),
    }
    view
}
