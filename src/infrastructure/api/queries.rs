//! GraphQL documents and the raw response shapes they return

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::entity::value_as_display;
use crate::domain::format::format_units;
use crate::domain::list::{AssetRow, BridgedRow, EventRow, NftTransferRow, TransferRow, TxRow};
use crate::domain::{AccountLookup, Cursor, ListFilter, ListPage, PageMetadata};

pub const ACCOUNT: &str = r#"
query account($input: AccountInput!) {
  account(input: $input) {
    type
    eth_address
    script_hash
    nonce
    transaction_count
    smart_contract { id name abi compiler_version deployment_tx_hash }
    udt { id name symbol eth_type official_site description icon }
  }
}"#;

pub const DEPLOYER: &str = r#"
query deployer($input: TransactionInput!) {
  transaction(input: $input) { from_account { eth_address } }
}"#;

pub const TRANSACTIONS: &str = r#"
query transactions($input: TransactionsInput) {
  transactions(input: $input) {
    entries {
      hash
      block_number
      timestamp
      method_name
      from_account { eth_address script_hash }
      to_account { eth_address script_hash }
      polyjuice { status }
      block { status }
    }
    metadata { total_count before after }
  }
}"#;

pub const TRANSFERS: &str = r#"
query transfers($input: TokenTransfersInput) {
  token_transfers(input: $input) {
    entries {
      transaction_hash
      block_number
      timestamp
      from_address
      to_address
      amount
      log_index
      udt { symbol decimal }
    }
    metadata { total_count before after }
  }
}"#;

pub const NFT_TRANSFERS: &str = r#"
query nft_transfers($input: Erc721TokenTransfersInput) {
  erc721_token_transfers(input: $input) {
    entries {
      transaction { eth_hash method_name }
      block { number timestamp status }
      polyjuice { status }
      from_address
      to_address
      token_id
      log_index
    }
    metadata { total_count before after }
  }
}"#;

pub const BRIDGED: &str = r#"
query bridged($input: DepositWithdrawalHistoriesInput) {
  deposit_withdrawal_histories(input: $input) {
    entries {
      type
      value
      eth_address
      script_hash
      layer1_tx_hash
      block_number
      timestamp
      udt { symbol }
    }
    metadata { total_count before after }
  }
}"#;

pub const ASSETS: &str = r#"
query assets($input: AccountUdtsInput!) {
  account_udts(input: $input) {
    value
    udt { id name symbol decimal type }
  }
}"#;

pub const CONTRACT: &str = r#"
query contract($input: SmartContractInput!) {
  smart_contract(input: $input) {
    name
    compiler_version
    compiler_file_format
    abi
    contract_source_code
    deployment_tx_hash
  }
}"#;

pub const EVENTS: &str = r#"
query events($input: LogsInput) {
  logs(input: $input) {
    entries { transaction_hash block_number index topic0 topic1 topic2 topic3 data }
    metadata { total_count before after }
  }
}"#;

pub const VERIFY: &str = r#"
mutation verify($address: HashAddress!) {
  verify_and_update_from_sourcify(input: { address: $address }) {
    abi
  }
}"#;

pub fn verify_input(address: &str) -> Value {
    serde_json::json!({ "address": address })
}

pub fn account_input(lookup: &AccountLookup) -> Value {
    let mut input = Map::new();
    match lookup {
        AccountLookup::Address(address) => input.insert("address".into(), address.clone().into()),
        AccountLookup::ScriptHash(hash) => input.insert("script_hash".into(), hash.clone().into()),
    };
    wrap(input)
}

/// `{input: {...filter, before?, after?, limit?}}`
pub fn cursor_input(filter: &ListFilter, cursor: &Cursor) -> Value {
    let mut input = filter_map(filter);
    for (key, value) in cursor.query_pairs() {
        let value = match key {
            "limit" => value.parse::<u64>().map(Value::from).unwrap_or(Value::Null),
            _ => Value::String(value),
        };
        input.insert(key.to_string(), value);
    }
    wrap(input)
}

/// `{input: {...filter, page, page_size}}`
pub fn page_input(filter: &ListFilter, page: u64, page_size: u32) -> Value {
    let mut input = filter_map(filter);
    input.insert("page".into(), page.into());
    input.insert("page_size".into(), page_size.into());
    wrap(input)
}

pub fn assets_input(filter: &ListFilter) -> Value {
    let mut input = Map::new();
    if let Some(address) = &filter.address {
        input.insert("address_hashes".into(), Value::Array(vec![address.clone().into()]));
    } else if let Some(hash) = &filter.script_hash {
        input.insert("script_hashes".into(), Value::Array(vec![hash.clone().into()]));
    }
    wrap(input)
}

pub fn single_input(key: &str, value: &str) -> Value {
    let mut input = Map::new();
    input.insert(key.to_string(), value.into());
    wrap(input)
}

fn filter_map(filter: &ListFilter) -> Map<String, Value> {
    match serde_json::to_value(filter) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn wrap(input: Map<String, Value>) -> Value {
    let mut root = Map::new();
    root.insert("input".into(), Value::Object(input));
    Value::Object(root)
}

#[derive(Debug, Deserialize)]
pub struct RawPage<T> {
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
    #[serde(default)]
    pub metadata: PageMetadata,
}

impl<T> RawPage<T> {
    pub fn convert<R>(self, f: impl FnMut(T) -> R) -> ListPage<R> {
        ListPage {
            entries: self.entries.into_iter().map(f).collect(),
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAccountRef {
    #[serde(default)]
    eth_address: Option<String>,
    #[serde(default)]
    script_hash: Option<String>,
}

impl RawAccountRef {
    fn into_id(self) -> Option<String> {
        self.eth_address
            .filter(|s| !s.is_empty())
            .or(self.script_hash.filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
pub struct RawDeployTx {
    #[serde(default)]
    pub from_account: Option<RawAccountRef>,
}

impl RawDeployTx {
    pub fn deployer(self) -> Option<String> {
        self.from_account.and_then(RawAccountRef::into_id)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawStatus {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTx {
    hash: String,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    method_name: Option<String>,
    #[serde(default)]
    from_account: Option<RawAccountRef>,
    #[serde(default)]
    to_account: Option<RawAccountRef>,
    #[serde(default)]
    polyjuice: Option<RawStatus>,
    #[serde(default)]
    block: Option<RawStatus>,
}

impl From<RawTx> for TxRow {
    fn from(raw: RawTx) -> Self {
        let succeeded = raw
            .polyjuice
            .and_then(|p| p.status)
            .map(|s| s.eq_ignore_ascii_case("succeeded"));
        TxRow {
            hash: raw.hash,
            block_number: raw.block_number,
            timestamp: raw.timestamp,
            from: raw.from_account.and_then(RawAccountRef::into_id),
            to: raw.to_account.and_then(RawAccountRef::into_id),
            method: raw.method_name,
            status: raw.block.and_then(|b| b.status),
            succeeded,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawUdtRef {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    decimal: Option<u8>,
    #[serde(rename = "type", default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTransfer {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    from_address: Option<String>,
    #[serde(default)]
    to_address: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    log_index: Option<u64>,
    #[serde(default)]
    udt: Option<RawUdtRef>,
}

impl From<RawTransfer> for TransferRow {
    fn from(raw: RawTransfer) -> Self {
        let udt = raw.udt.unwrap_or_default();
        let amount = match (raw.amount, udt.decimal) {
            (Some(amount), Some(decimal)) => Some(format_units(&amount, decimal).unwrap_or(amount)),
            (amount, _) => amount,
        };
        TransferRow {
            tx_hash: raw.transaction_hash,
            block_number: raw.block_number,
            timestamp: raw.timestamp,
            from: raw.from_address,
            to: raw.to_address,
            amount,
            symbol: udt.symbol,
            log_index: raw.log_index,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawBridged {
    #[serde(rename = "type", default)]
    direction: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    eth_address: Option<String>,
    #[serde(default)]
    script_hash: Option<String>,
    #[serde(default)]
    layer1_tx_hash: Option<String>,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    udt: Option<RawUdtRef>,
}

impl From<RawBridged> for BridgedRow {
    fn from(raw: RawBridged) -> Self {
        let owner = RawAccountRef {
            eth_address: raw.eth_address,
            script_hash: raw.script_hash,
        }
        .into_id();
        BridgedRow {
            direction: raw.direction.map(|d| d.to_ascii_lowercase()),
            value: raw.value.as_ref().and_then(value_as_display),
            symbol: raw.udt.and_then(|u| u.symbol),
            owner,
            layer1_tx_hash: raw.layer1_tx_hash,
            block_number: raw.block_number,
            timestamp: raw.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawAsset {
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    udt: Option<RawUdtRef>,
}

impl From<RawAsset> for AssetRow {
    fn from(raw: RawAsset) -> Self {
        let udt = raw.udt.unwrap_or_default();
        AssetRow {
            udt_id: udt.id.as_ref().and_then(value_as_display),
            name: udt.name,
            symbol: udt.symbol,
            value: raw.value.as_ref().and_then(value_as_display),
            decimal: udt.decimal,
            token_type: udt.token_type,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawNftTx {
    #[serde(default)]
    eth_hash: Option<String>,
    #[serde(default)]
    method_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNftBlock {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawNftTransfer {
    #[serde(default)]
    transaction: Option<RawNftTx>,
    #[serde(default)]
    block: Option<RawNftBlock>,
    #[serde(default)]
    polyjuice: Option<RawStatus>,
    #[serde(default)]
    from_address: Option<String>,
    #[serde(default)]
    to_address: Option<String>,
    #[serde(default)]
    token_id: Option<Value>,
    #[serde(default)]
    log_index: Option<u64>,
}

impl From<RawNftTransfer> for NftTransferRow {
    fn from(raw: RawNftTransfer) -> Self {
        let tx = raw.transaction.unwrap_or_default();
        let block = raw.block.unwrap_or_default();
        let succeeded = raw
            .polyjuice
            .and_then(|p| p.status)
            .map(|s| s.eq_ignore_ascii_case("succeeded"));
        NftTransferRow {
            tx_hash: tx.eth_hash.unwrap_or_default(),
            method: tx.method_name,
            block_number: block.number,
            timestamp: block.timestamp,
            status: block.status,
            succeeded,
            from: raw.from_address,
            to: raw.to_address,
            token_id: raw.token_id.as_ref().and_then(value_as_display),
            log_index: raw.log_index,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawLog {
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    index: Option<u64>,
    #[serde(default)]
    topic0: Option<String>,
    #[serde(default)]
    topic1: Option<String>,
    #[serde(default)]
    topic2: Option<String>,
    #[serde(default)]
    topic3: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl From<RawLog> for EventRow {
    fn from(raw: RawLog) -> Self {
        let topics = [raw.topic0, raw.topic1, raw.topic2, raw.topic3]
            .into_iter()
            .flatten()
            .collect();
        EventRow {
            tx_hash: raw.transaction_hash,
            block_number: raw.block_number,
            log_index: raw.index,
            topics,
            data: raw.data,
        }
    }
}
