//! Settlement dispatch contract.
//!
//! The engine decides *when* and *with what parameters* to settle; this
//! trait is the narrow seam to the external system that actually closes
//! positions. Submission is hash-confirmed only: the engine never waits for
//! inclusion, duplicate protection lives in the dedup cache.

use alloy::primitives::{Address, B256, I256, U256};
use async_trait::async_trait;

use liquidator_api::{AccountId, MarketId};

use crate::error::SettlementError;
use crate::gas::PriceTerms;

/// Handle of a submitted settlement transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle(pub B256);

/// Preference-order liquidation: the settlement system picks the specific
/// markets to close from the ordered preference lists.
#[derive(Debug, Clone)]
pub struct LiquidationDispatch {
    /// Wallet receiving the liquidated assets.
    pub liquidator_owner: Address,
    /// Sub-account of the liquidator wallet to settle into.
    pub liquidator_number: U256,
    /// The position being closed.
    pub liquid_account: AccountId,
    /// Minimum collateralization to leave the position at, 1e18-scaled.
    pub min_collateralization: U256,
    /// Minimum overhead value worth acting on, in base units.
    pub min_overhead_value: U256,
    /// Owed markets in preference order.
    pub owed_preferences: Vec<MarketId>,
    /// Collateral markets in preference order.
    pub collateral_preferences: Vec<MarketId>,
    pub gas: PriceTerms,
}

/// Auto-sell liquidation: the engine picked the owed/held pair and the
/// token path through the bridge token; the settlement system sells the
/// seized collateral along that path.
#[derive(Debug, Clone)]
pub struct SaleDispatch {
    pub liquidator_owner: Address,
    pub liquidator_number: U256,
    pub liquid_account: AccountId,
    pub owed_market: MarketId,
    pub held_market: MarketId,
    /// Held token, optionally the bridge token, then the owed token.
    pub token_path: Vec<Address>,
    /// Expiry timestamp when settling an expired borrow, `None` for a
    /// plain undercollateralization liquidation.
    pub expiry: Option<u64>,
    /// Floor on the owed-token sale output, in base units.
    pub min_owed_output: U256,
    /// Whether the settlement must revert if the collateral sale fails.
    pub revert_on_fail_to_sell: bool,
    pub gas: PriceTerms,
}

/// One expired borrow inside an expiry batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredMarket {
    pub market_id: MarketId,
    pub expires_at: u64,
}

/// Expiry settlement batching every balance of the position that is past
/// its delay into a single call. The wei/price/premium vectors are aligned
/// with `collateral_preferences`.
#[derive(Debug, Clone)]
pub struct ExpiryDispatch {
    pub liquidator_owner: Address,
    pub liquidator_number: U256,
    pub liquid_account: AccountId,
    /// Markets actually past their expiry delay; never empty.
    pub expired_markets: Vec<ExpiredMarket>,
    /// Reference block timestamp the expiry checks were made against.
    pub block_timestamp: u64,
    /// Account balance per preference market (zero where absent).
    pub weis: Vec<I256>,
    /// Oracle price per preference market.
    pub prices: Vec<U256>,
    /// Liquidation reward premium per preference market.
    pub reward_premiums: Vec<U256>,
    pub collateral_preferences: Vec<MarketId>,
    pub gas: PriceTerms,
}

/// External settlement system.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Authoritative liquidatability check, consulted immediately before a
    /// liquidation dispatch. The engine trusts this over its own math.
    async fn is_account_liquidatable(
        &self,
        account: &AccountId,
        block: u64,
    ) -> Result<bool, SettlementError>;

    async fn liquidate(&self, params: LiquidationDispatch) -> Result<TxHandle, SettlementError>;

    async fn liquidate_with_sale(&self, params: SaleDispatch)
        -> Result<TxHandle, SettlementError>;

    async fn settle_expirations(
        &self,
        params: ExpiryDispatch,
    ) -> Result<TxHandle, SettlementError>;
}
