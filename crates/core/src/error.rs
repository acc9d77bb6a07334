//! Engine error taxonomy.
//!
//! Every variant carries the position identity so per-account failures can
//! be logged and isolated without aborting sibling settlements.

use liquidator_api::{AccountId, MarketId};
use liquidator_chain::SettlementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A supposedly liquidatable account has no borrowed balance.
    #[error("account {account} was selected for liquidation but has no borrows")]
    NoBorrows { account: AccountId },

    /// A supposedly liquidatable account has no collateral to seize.
    #[error("account {account} was selected for liquidation but has no collateral")]
    NoCollateral { account: AccountId },

    /// A supposedly expirable account has no balance past its expiry delay.
    #[error("account {account} was selected for expiry but has no expired balance")]
    NothingExpired { account: AccountId },

    /// A referenced market is missing from the market snapshot.
    #[error("account {account}: no market metadata for market {market}")]
    UnknownMarket {
        account: AccountId,
        market: MarketId,
    },

    /// An expiring balance is registered with an unexpected expiry contract.
    #[error("account {account}: market {market} uses an unexpected expiry contract")]
    ExpiryRefMismatch {
        account: AccountId,
        market: MarketId,
    },

    /// The settlement call itself failed.
    #[error("settlement dispatch failed for {account}: {source}")]
    Dispatch {
        account: AccountId,
        #[source]
        source: SettlementError,
    },
}
