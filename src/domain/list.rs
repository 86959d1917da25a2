//! List fetch shapes: filters, requests, page envelopes and row types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cursor::Cursor;

/// The registered list-fetch functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListKind {
    Transactions,
    Transfers,
    Bridged,
    Assets,
    Contract,
    Events,
    NftTransfers,
}

impl ListKind {
    pub fn name(&self) -> &'static str {
        match self {
            ListKind::Transactions => "transactions",
            ListKind::Transfers => "transfers",
            ListKind::Bridged => "bridged",
            ListKind::Assets => "assets",
            ListKind::Contract => "contract",
            ListKind::Events => "events",
            ListKind::NftTransfers => "nft_transfers",
        }
    }
}

/// How a list is paged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// Opaque before/after tokens
    Cursor,
    /// 1-based page numbers
    Number,
    /// Single page
    None,
}

/// Identifying parameters for a list fetch; unset fields are left out of the variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udt_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_block_number: Option<u64>,
    /// ERC-721 collection contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_contract_address_hash: Option<String>,
    /// Single item of an ERC-721 collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u64>,
}

/// One list fetch, fully resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListRequest {
    pub kind: ListKind,
    pub filter: ListFilter,
    pub cursor: Cursor,
    pub page: Option<u64>,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

impl PageMetadata {
    /// Last 1-based page for number-paged lists (at least 1)
    pub fn last_page(&self, page_size: u32) -> u64 {
        let size = u64::from(page_size.max(1));
        self.total_count.div_ceil(size).max(1)
    }
}

/// `{ entries, metadata }` envelope shared by every list fetch
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
    #[serde(default)]
    pub metadata: PageMetadata,
}

impl<T> ListPage<T> {
    pub fn single(entries: Vec<T>) -> Self {
        let total_count = entries.len() as u64;
        Self {
            entries,
            metadata: PageMetadata {
                total_count,
                before: None,
                after: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TxRow {
    pub hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub succeeded: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferRow {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub log_index: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BridgedRow {
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub layer1_tx_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssetRow {
    #[serde(default)]
    pub udt_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub decimal: Option<u8>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventRow {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// One ERC-721 transfer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NftTransferRow {
    pub tx_hash: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub succeeded: Option<bool>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub log_index: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContractInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub compiler_version: Option<String>,
    #[serde(default)]
    pub compiler_file_format: Option<String>,
    #[serde(default)]
    pub abi: Option<Value>,
    #[serde(default)]
    pub contract_source_code: Option<String>,
    #[serde(default)]
    pub deployment_tx_hash: Option<String>,
}

/// A fetched list, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum ListData {
    Transactions(ListPage<TxRow>),
    Transfers(ListPage<TransferRow>),
    Bridged(ListPage<BridgedRow>),
    Assets(ListPage<AssetRow>),
    Contract(Option<ContractInfo>),
    Events(ListPage<EventRow>),
    NftTransfers(ListPage<NftTransferRow>),
}

impl ListData {
    pub fn kind(&self) -> ListKind {
        match self {
            ListData::Transactions(_) => ListKind::Transactions,
            ListData::Transfers(_) => ListKind::Transfers,
            ListData::Bridged(_) => ListKind::Bridged,
            ListData::Assets(_) => ListKind::Assets,
            ListData::Contract(_) => ListKind::Contract,
            ListData::Events(_) => ListKind::Events,
            ListData::NftTransfers(_) => ListKind::NftTransfers,
        }
    }

    pub fn metadata(&self) -> Option<&PageMetadata> {
        match self {
            ListData::Transactions(page) => Some(&page.metadata),
            ListData::Transfers(page) => Some(&page.metadata),
            ListData::Bridged(page) => Some(&page.metadata),
            ListData::Assets(page) => Some(&page.metadata),
            ListData::Events(page) => Some(&page.metadata),
            ListData::NftTransfers(page) => Some(&page.metadata),
            ListData::Contract(_) => None,
        }
    }
}
