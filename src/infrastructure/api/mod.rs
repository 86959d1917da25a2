//! Explorer backend API: the fetch trait and its HTTP implementation
//!
//! Everything the pages read from the backend goes through [`ExplorerApi`].
//! The production implementation talks GraphQL and REST; tests plug in an
//! in-memory double.

mod graphql;
mod http;
mod queries;

pub use graphql::GraphQlClient;
pub use http::{ApiEndpoints, HttpExplorerApi};

use crate::domain::list::{
    AssetRow, BridgedRow, ContractInfo, EventRow, NftTransferRow, TransferRow, TxRow,
};
use crate::domain::{
    AccountLookup, Cursor, Fields, ListData, ListFilter, ListKind, ListPage, ListRequest, Result,
};

/// Abstract explorer backend
#[async_trait::async_trait]
pub trait ExplorerApi: Send + Sync + 'static {
    /// Account overview; `None` when no such account exists
    async fn account(&self, lookup: &AccountLookup) -> Result<Option<Fields>>;

    /// CKB balance in the smallest unit (already scaled by 10^18)
    async fn balance(&self, eth_address: &str) -> Result<String>;

    /// Address that sent the contract deployment transaction
    async fn deployer(&self, deployment_tx_hash: &str) -> Result<Option<String>>;

    /// Block by number or hash
    async fn block(&self, id: &str) -> Result<Fields>;

    /// Token (UDT) by id or contract address
    async fn token(&self, id: &str) -> Result<Fields>;

    async fn transactions(&self, filter: &ListFilter, cursor: &Cursor) -> Result<ListPage<TxRow>>;

    async fn transfers(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u32,
    ) -> Result<ListPage<TransferRow>>;

    async fn bridged_records(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u32,
    ) -> Result<ListPage<BridgedRow>>;

    async fn assets(&self, filter: &ListFilter) -> Result<ListPage<AssetRow>>;

    async fn contract(&self, address: &str) -> Result<Option<ContractInfo>>;

    async fn events(&self, filter: &ListFilter, cursor: &Cursor) -> Result<ListPage<EventRow>>;

    /// ERC-721 transfers of a collection, optionally narrowed to one token id
    async fn nft_transfers(
        &self,
        filter: &ListFilter,
        cursor: &Cursor,
    ) -> Result<ListPage<NftTransferRow>>;

    /// Ask the backend to pull verified sources from Sourcify.
    /// Returns the contract info when verification produced an ABI.
    async fn verify_contract(&self, address: &str) -> Result<Option<ContractInfo>>;
}

/// Dispatch a resolved list request to the matching fetch function
pub async fn fetch_list(api: &dyn ExplorerApi, request: &ListRequest) -> Result<ListData> {
    let page = request.page.unwrap_or(1);
    let data = match request.kind {
        ListKind::Transactions => {
            ListData::Transactions(api.transactions(&request.filter, &request.cursor).await?)
        }
        ListKind::Transfers => ListData::Transfers(
            api.transfers(&request.filter, page, request.page_size).await?,
        ),
        ListKind::Bridged => ListData::Bridged(
            api.bridged_records(&request.filter, page, request.page_size)
                .await?,
        ),
        ListKind::Assets => ListData::Assets(api.assets(&request.filter).await?),
        ListKind::Contract => {
            let address = request.filter.address.as_deref().unwrap_or_default();
            ListData::Contract(api.contract(address).await?)
        }
        ListKind::Events => ListData::Events(api.events(&request.filter, &request.cursor).await?),
        ListKind::NftTransfers => ListData::NftTransfers(
            api.nft_transfers(&request.filter, &request.cursor).await?,
        ),
    };
    Ok(data)
}
