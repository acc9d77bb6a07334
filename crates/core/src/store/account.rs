//! Candidate account store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use liquidator_api::{fetch_all_pages, AccountId, ApiAccount, ApiError, ProtocolDataClient};

use super::market::MarketStore;
use super::poll::spawn_refresh_loop;

/// Candidate sets as of the last refresh. Before the first refresh both
/// sets are empty.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    /// Accounts the provider reports as liquidatable.
    pub liquidatable: Vec<ApiAccount>,
    /// Accounts holding at least one expiring borrow, minus any that also
    /// appear in the liquidatable set (liquidation takes priority).
    pub expirable: Vec<ApiAccount>,
}

/// Holds the current liquidatable and expirable candidate sets.
pub struct AccountStore {
    client: Arc<dyn ProtocolDataClient>,
    market_store: Arc<MarketStore>,
    snapshot: RwLock<Arc<AccountSnapshot>>,
}

impl AccountStore {
    pub fn new(client: Arc<dyn ProtocolDataClient>, market_store: Arc<MarketStore>) -> Self {
        Self {
            client,
            market_store,
            snapshot: RwLock::new(Arc::new(AccountSnapshot::default())),
        }
    }

    pub fn snapshot(&self) -> Arc<AccountSnapshot> {
        self.snapshot.read().clone()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        // Account queries need the market store's index context; until its
        // first refresh lands there is nothing useful to fetch.
        let Some(market) = self.market_store.snapshot() else {
            debug!("market snapshot not ready, skipping account refresh");
            return Ok(());
        };
        let block = market.block.number;

        let (liquidatable, expirable) = tokio::try_join!(
            fetch_all_pages(|page| {
                self.client
                    .fetch_liquidatable_accounts(&market.indexes, block, page)
            }),
            fetch_all_pages(|page| {
                self.client
                    .fetch_expirable_accounts(&market.indexes, block, page)
            }),
        )?;

        // An account must never sit in both sets; liquidation wins.
        let liquidatable_ids: HashSet<AccountId> =
            liquidatable.iter().map(|a| a.id).collect();
        let expirable: Vec<ApiAccount> = expirable
            .into_iter()
            .filter(|a| !liquidatable_ids.contains(&a.id))
            .collect();

        info!(
            liquidatable = liquidatable.len(),
            expirable = expirable.len(),
            block,
            "accounts updated"
        );

        *self.snapshot.write() = Arc::new(AccountSnapshot {
            liquidatable,
            expirable,
        });
        Ok(())
    }

    pub fn spawn(
        self: &Arc<Self>,
        every: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        spawn_refresh_loop("account", every, shutdown, move || {
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        })
    }
}
