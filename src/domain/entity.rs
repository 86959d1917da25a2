//! Displayed entities (account, block, token) as open field maps with typed read views

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::format::is_eth_address;
use super::tab::PageKind;

/// Raw entity fields as received from the backend
pub type Fields = Map<String, Value>;

/// The entity shown on a detail page.
///
/// Fields are kept as an open JSON map so that fields unknown to this crate
/// survive merges and snapshots untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    kind: PageKind,
    fields: Fields,
}

impl EntityState {
    pub fn new(kind: PageKind, fields: Fields) -> Self {
        Self { kind, fields }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn u64_field(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(value_as_u64)
    }

    /// The identifier used in routes and channel topics
    pub fn identifier(&self) -> Option<String> {
        match self.kind {
            PageKind::Account => self
                .str_field("eth_address")
                .or_else(|| self.str_field("script_hash"))
                .map(str::to_string),
            PageKind::Block => self.u64_field("number").map(|n| n.to_string()),
            PageKind::Token => self.get("id").and_then(value_as_display),
        }
    }

    pub fn account(&self) -> Option<AccountView> {
        self.view(PageKind::Account)
    }

    pub fn block(&self) -> Option<BlockView> {
        self.view(PageKind::Block)
    }

    pub fn token(&self) -> Option<TokenView> {
        self.view(PageKind::Token)
    }

    fn view<T: for<'de> Deserialize<'de>>(&self, kind: PageKind) -> Option<T> {
        if self.kind != kind {
            return None;
        }
        serde_json::from_value(Value::Object(self.fields.clone())).ok()
    }
}

/// How an account is looked up: by eth address or by script hash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountLookup {
    Address(String),
    ScriptHash(String),
}

impl AccountLookup {
    pub fn from_id(id: &str) -> Self {
        if is_eth_address(id) {
            AccountLookup::Address(id.to_string())
        } else {
            AccountLookup::ScriptHash(id.to_string())
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AccountLookup::Address(id) | AccountLookup::ScriptHash(id) => id,
        }
    }
}

/// Account types reported by the GraphQL backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    MetaContract,
    Udt,
    EthUser,
    PolyjuiceCreator,
    PolyjuiceContract,
    EthAddrReg,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AccountType {
    pub fn title(&self) -> &'static str {
        match self {
            AccountType::MetaContract => "Meta Contract",
            AccountType::Udt => "UDT",
            AccountType::EthUser => "User",
            AccountType::PolyjuiceCreator => "Polyjuice Creator",
            AccountType::PolyjuiceContract => "Smart Contract",
            AccountType::EthAddrReg => "Eth Address Registry",
            AccountType::Unknown => "Account",
        }
    }
}

/// What kind of account decides which tabs apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSubtype {
    PlainUser,
    Contract { has_abi: bool },
    Other(AccountType),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmartContract {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abi: Option<Value>,
    #[serde(default)]
    pub compiler_version: Option<String>,
    #[serde(default)]
    pub deployment_tx_hash: Option<String>,
}

impl SmartContract {
    /// An ABI counts only when it is a non-empty array
    pub fn has_abi(&self) -> bool {
        matches!(&self.abi, Some(Value::Array(items)) if !items.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UdtRef {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub eth_type: Option<String>,
    #[serde(default)]
    pub official_site: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountView {
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub eth_address: Option<String>,
    #[serde(default)]
    pub script_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub nonce: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub transaction_count: Option<u64>,
    #[serde(default)]
    pub smart_contract: Option<SmartContract>,
    #[serde(default)]
    pub udt: Option<UdtRef>,
}

impl AccountView {
    pub fn subtype(&self) -> AccountSubtype {
        match self.account_type {
            AccountType::EthUser => AccountSubtype::PlainUser,
            AccountType::PolyjuiceContract => AccountSubtype::Contract {
                has_abi: self
                    .smart_contract
                    .as_ref()
                    .map(SmartContract::has_abi)
                    .unwrap_or(false),
            },
            other => AccountSubtype::Other(other),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.eth_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.script_hash.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockView {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub number: Option<u64>,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub l1_block: Option<u64>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub finalize_state: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tx_count: Option<u64>,
    #[serde(default, alias = "miner_hash")]
    pub aggregator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenView {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub decimal: Option<u64>,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    /// ERC20 or ERC721
    #[serde(default)]
    pub eth_type: Option<String>,
    #[serde(default, alias = "contract_address_hash")]
    pub short_address: Option<String>,
    #[serde(default)]
    pub official_site: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub supply: Value,
    #[serde(default)]
    pub holder_count: Value,
    #[serde(default)]
    pub transfer_count: Value,
    #[serde(default)]
    pub icon: Option<String>,
}

impl TokenView {
    pub fn is_nft(&self) -> bool {
        self.eth_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("erc721"))
    }
}

/// Numbers arrive either as JSON numbers or numeric strings
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Plain display text for scalar values; empty strings and nulls are `None`
pub fn value_as_display(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_u64(&value))
}
