//! Polling stores.
//!
//! Each store refreshes on its own interval and publishes an immutable
//! snapshot that is replaced atomically; readers never observe a partial
//! update, and a failed refresh keeps the previous snapshot in place.

mod account;
mod gas_price;
mod market;
mod poll;
mod risk_params;

pub use account::{AccountSnapshot, AccountStore};
pub use gas_price::GasPriceStore;
pub use market::{MarketSnapshot, MarketStore};
pub use risk_params::RiskParamsStore;
