//! Data-provider layer for the liquidation bot.
//!
//! This crate provides:
//! - The API data model: accounts, per-market balances, markets, risk params
//! - Cursor pagination over large result sets
//! - The `ProtocolDataClient` trait and its GraphQL subgraph implementation

mod client;
pub mod decimal;
mod error;
mod pageable;
mod subgraph;
mod types;

pub use client::ProtocolDataClient;
pub use error::ApiError;
pub use pageable::fetch_all_pages;
pub use subgraph::{index_map, SubgraphClient};
pub use types::{
    AccountId, ApiAccount, ApiBalance, ApiMarket, ApiRiskParam, BlockRef, MarketId, MarketIndex,
    MarketIndexMap,
};
