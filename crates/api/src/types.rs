//! API data model shared by the stores and the engine.
//!
//! All monetary quantities are fixed-point integers: balances (`par`, `wei`)
//! are signed `I256`, prices / premiums / ratios are `U256` scaled by 1e18.

use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::{Address, I256, U256};

/// Protocol market identifier.
///
/// Balance maps are keyed by `MarketId`; `BTreeMap` ordering gives the
/// deterministic ascending-id iteration the engine relies on when picking
/// the first borrowed / first held balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketId(pub u64);

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for MarketId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Position identity: owner wallet plus sub-account number.
///
/// Used as the dedup-cache key and as log context for every per-account
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId {
    pub owner: Address,
    pub number: U256,
}

impl AccountId {
    pub fn new(owner: Address, number: U256) -> Self {
        Self { owner, number }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.owner, self.number)
    }
}

/// One per-market balance of an account.
#[derive(Debug, Clone)]
pub struct ApiBalance {
    pub market_id: MarketId,
    pub token_address: Address,
    /// Raw protocol unit, before index scaling. Negative = borrowed.
    pub par: I256,
    /// Index-adjusted amount. Negative = borrowed, positive = supplied.
    pub wei: I256,
    /// Expiration timestamp of a timed borrow. `None` means the balance
    /// never expires (a zero timestamp is normalized to `None` on decode).
    pub expires_at: Option<u64>,
    /// The expiry contract this obligation is registered with.
    pub expiry_ref: Option<Address>,
}

impl ApiBalance {
    /// Whether this balance is a borrow (owed to the protocol).
    pub fn is_borrow(&self) -> bool {
        self.wei.is_negative()
    }

    /// Whether this balance is supplied collateral.
    pub fn is_supply(&self) -> bool {
        self.wei.is_positive()
    }
}

/// Read-only snapshot of one on-protocol position.
#[derive(Debug, Clone)]
pub struct ApiAccount {
    pub id: AccountId,
    pub balances: BTreeMap<MarketId, ApiBalance>,
}

impl ApiAccount {
    pub fn owner(&self) -> Address {
        self.id.owner
    }

    pub fn number(&self) -> U256 {
        self.id.number
    }

    /// First borrowed balance in ascending market-id order.
    pub fn first_borrow(&self) -> Option<&ApiBalance> {
        self.balances.values().find(|b| b.is_borrow())
    }

    /// First supplied balance in ascending market-id order.
    pub fn first_supply(&self) -> Option<&ApiBalance> {
        self.balances.values().find(|b| b.is_supply())
    }

    /// Market ids with negative `par` (borrow side of the position).
    pub fn borrow_markets(&self) -> Vec<MarketId> {
        self.balances
            .values()
            .filter(|b| b.par.is_negative())
            .map(|b| b.market_id)
            .collect()
    }

    /// Market ids with positive `par` (collateral side of the position).
    pub fn supply_markets(&self) -> Vec<MarketId> {
        self.balances
            .values()
            .filter(|b| b.par.is_positive())
            .map(|b| b.market_id)
            .collect()
    }
}

/// Market metadata at the reference block.
#[derive(Debug, Clone)]
pub struct ApiMarket {
    pub id: MarketId,
    pub token_address: Address,
    /// Oracle price in base units.
    pub oracle_price: U256,
    /// Per-market margin premium, 1e18-scaled (0 = no premium).
    pub margin_premium: U256,
    /// Per-market liquidation reward premium, 1e18-scaled.
    pub liquidation_reward_premium: U256,
    /// Borrow interest index, 1e18-scaled.
    pub borrow_index: U256,
    /// Supply interest index, 1e18-scaled.
    pub supply_index: U256,
}

/// Borrow/supply interest indexes used to derive `wei` from `par`.
#[derive(Debug, Clone, Copy)]
pub struct MarketIndex {
    pub borrow: U256,
    pub supply: U256,
}

/// Index context for account queries, keyed by market.
pub type MarketIndexMap = BTreeMap<MarketId, MarketIndex>;

/// Protocol-wide risk parameters.
#[derive(Debug, Clone)]
pub struct ApiRiskParam {
    /// The margin contract these parameters were read from.
    pub margin_contract: Address,
    /// Minimum collateralization ratio, 1e18-scaled (e.g. 1.15e18).
    pub liquidation_ratio: U256,
    /// Liquidation reward multiplier, 1e18-scaled (e.g. 1.05e18).
    pub liquidation_reward: U256,
}

/// Reference block used to keep the three data sources consistent and to
/// evaluate expirations.
#[derive(Debug, Clone, Copy)]
pub struct BlockRef {
    pub number: u64,
    pub timestamp: u64,
}
