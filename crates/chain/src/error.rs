//! Error type for settlement dispatch.

use alloy::primitives::B256;
use thiserror::Error;

/// Failure while submitting or preparing a settlement transaction.
///
/// These are per-position: the engine logs them with the account identity
/// and moves on to the next candidate. The dedup cache entry is not rolled
/// back; retry happens only after the TTL elapses.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// RPC transport or submission failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transaction was mined but reverted.
    #[error("transaction reverted: {0}")]
    Reverted(B256),

    /// The signing key could not be loaded or used.
    #[error("signer error: {0}")]
    Signer(String),
}
