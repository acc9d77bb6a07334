//! Settlement layer for the liquidation bot.
//!
//! This crate provides:
//! - The `SettlementClient` trait and typed dispatch parameters for the
//!   preference-order, collateral-sale and expiry-batch strategies
//! - Gas price terms (legacy and fee-market) with external quote sources
//! - A nonce-caching transaction sender
//! - Alloy contract bindings targeting the protocol's settlement proxies

mod contracts;
mod error;
pub mod gas;
mod sender;
mod settlement;

pub use contracts::{MarginProtocol, ProxyAddresses};
pub use error::SettlementError;
pub use gas::{GasPriceSource, GasQuote, PriceTerms};
pub use sender::TransactionSender;
pub use settlement::{
    ExpiredMarket, ExpiryDispatch, LiquidationDispatch, SaleDispatch, SettlementClient, TxHandle,
};
