//! Narrow contract over the protocol data provider.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{ApiAccount, ApiMarket, ApiRiskParam, BlockRef, MarketIndexMap};

/// Read-only view of protocol state as served by an external data provider.
///
/// Account queries are paginated and terminate on the first empty page (see
/// [`crate::fetch_all_pages`]); all queries are pinned to a reference block
/// so the stores observe a consistent point in time.
#[async_trait]
pub trait ProtocolDataClient: Send + Sync {
    /// Latest block the provider has indexed.
    async fn fetch_reference_block(&self) -> Result<BlockRef, ApiError>;

    /// All markets with risk metadata, prices and interest indexes.
    async fn fetch_markets(&self, block: u64) -> Result<Vec<ApiMarket>, ApiError>;

    /// Protocol-wide risk parameters.
    async fn fetch_risk_params(&self, block: u64) -> Result<ApiRiskParam, ApiError>;

    /// One page of accounts the provider reports as liquidatable.
    async fn fetch_liquidatable_accounts(
        &self,
        indexes: &MarketIndexMap,
        block: u64,
        page: usize,
    ) -> Result<Vec<ApiAccount>, ApiError>;

    /// One page of accounts holding at least one expiring borrow.
    async fn fetch_expirable_accounts(
        &self,
        indexes: &MarketIndexMap,
        block: u64,
        page: usize,
    ) -> Result<Vec<ApiAccount>, ApiError>;
}
