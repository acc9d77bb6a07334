//! Market metadata store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use liquidator_api::{
    index_map, ApiError, ApiMarket, BlockRef, MarketId, MarketIndexMap, ProtocolDataClient,
};

use super::poll::spawn_refresh_loop;

/// Point-in-time view of every market at a reference block.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub markets: BTreeMap<MarketId, ApiMarket>,
    pub indexes: MarketIndexMap,
    pub block: BlockRef,
}

/// Holds the latest market snapshot; the reference block recorded here is
/// what the other stores and the engine pin their queries to.
pub struct MarketStore {
    client: Arc<dyn ProtocolDataClient>,
    snapshot: RwLock<Option<Arc<MarketSnapshot>>>,
}

impl MarketStore {
    pub fn new(client: Arc<dyn ProtocolDataClient>) -> Self {
        Self {
            client,
            snapshot: RwLock::new(None),
        }
    }

    /// Latest snapshot; `None` until the first successful refresh.
    pub fn snapshot(&self) -> Option<Arc<MarketSnapshot>> {
        self.snapshot.read().clone()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        let block = self.client.fetch_reference_block().await?;
        let markets = self.client.fetch_markets(block.number).await?;

        let indexes = index_map(&markets);
        let markets: BTreeMap<_, _> = markets.into_iter().map(|m| (m.id, m)).collect();

        debug!(
            block = block.number,
            markets = markets.len(),
            "markets updated"
        );

        *self.snapshot.write() = Some(Arc::new(MarketSnapshot {
            markets,
            indexes,
            block,
        }));
        Ok(())
    }

    pub fn spawn(
        self: &Arc<Self>,
        every: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        spawn_refresh_loop("market", every, shutdown, move || {
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        })
    }
}
