//! Transaction signing and submission.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use tracing::{debug, info, warn};

use crate::error::SettlementError;
use crate::gas::PriceTerms;

/// Gas limit covering the largest settlement shape (a full expiry batch).
const DEFAULT_GAS_LIMIT: u64 = 4_000_000;

/// Signs and submits settlement transactions.
///
/// The nonce is cached locally and bumped atomically per submission; it is
/// resynced from the chain whenever a submission fails.
pub struct TransactionSender {
    rpc_url: String,
    wallet: EthereumWallet,
    pub address: Address,
    chain_id: u64,
    nonce: AtomicU64,
    gas_limit: u64,
}

impl TransactionSender {
    pub async fn new(
        private_key: &str,
        rpc_url: &str,
        chain_id: u64,
    ) -> Result<Self, SettlementError> {
        let key = private_key.trim_start_matches("0x");
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| SettlementError::Signer(format!("invalid private key: {e}")))?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .on_http(parse_url(rpc_url)?);
        let initial_nonce = provider
            .get_transaction_count(address)
            .await
            .map_err(|e| SettlementError::Transport(e.to_string()))?;

        info!(
            address = %address,
            chain_id,
            initial_nonce,
            "transaction sender initialized"
        );

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            wallet,
            address,
            chain_id,
            nonce: AtomicU64::new(initial_nonce),
            gas_limit: DEFAULT_GAS_LIMIT,
        })
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Submit a transaction and return its hash without waiting for a
    /// receipt (hash-level confirmation).
    pub async fn send(
        &self,
        to: Address,
        calldata: Bytes,
        gas: &PriceTerms,
    ) -> Result<B256, SettlementError> {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);

        let mut tx = TransactionRequest::default()
            .with_to(to)
            .with_input(calldata)
            .with_nonce(nonce)
            .with_gas_limit(self.gas_limit)
            .with_chain_id(self.chain_id);
        gas.apply_to(&mut tx);

        debug!(
            to = %to,
            nonce,
            gas_price = gas.effective_gas_price(),
            "submitting settlement transaction"
        );

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(parse_url(&self.rpc_url)?);

        match provider.send_transaction(tx).await {
            Ok(pending) => {
                let hash = *pending.tx_hash();
                info!(tx_hash = %hash, nonce, "settlement transaction submitted");
                Ok(hash)
            }
            Err(e) => {
                // The local nonce may now be ahead of the chain.
                self.sync_nonce().await;
                Err(SettlementError::Transport(e.to_string()))
            }
        }
    }

    /// RPC endpoint for read-only contract calls.
    pub fn parse_rpc_url(&self) -> Result<reqwest::Url, SettlementError> {
        parse_url(&self.rpc_url)
    }

    /// Resync the cached nonce from the chain.
    pub async fn sync_nonce(&self) {
        let Ok(url) = parse_url(&self.rpc_url) else {
            return;
        };
        let provider = ProviderBuilder::new().on_http(url);
        match provider.get_transaction_count(self.address).await {
            Ok(chain_nonce) => {
                self.nonce.store(chain_nonce, Ordering::SeqCst);
                debug!(nonce = chain_nonce, "nonce synced from chain");
            }
            Err(e) => {
                warn!(error = %e, "failed to sync nonce from chain");
            }
        }
    }

    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }
}

fn parse_url(raw: &str) -> Result<reqwest::Url, SettlementError> {
    raw.parse()
        .map_err(|e| SettlementError::Transport(format!("invalid rpc url {raw:?}: {e}")))
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}
