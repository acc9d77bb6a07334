//! Protocol risk parameter store.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use liquidator_api::{ApiError, ApiRiskParam, ProtocolDataClient};

use super::market::MarketStore;
use super::poll::spawn_refresh_loop;

/// Holds the protocol-wide liquidation ratio and reward.
pub struct RiskParamsStore {
    client: Arc<dyn ProtocolDataClient>,
    market_store: Arc<MarketStore>,
    snapshot: RwLock<Option<Arc<ApiRiskParam>>>,
}

impl RiskParamsStore {
    pub fn new(client: Arc<dyn ProtocolDataClient>, market_store: Arc<MarketStore>) -> Self {
        Self {
            client,
            market_store,
            snapshot: RwLock::new(None),
        }
    }

    /// Latest risk params; `None` until the first successful refresh. The
    /// engine skips its cycle while this is `None`.
    pub fn current(&self) -> Option<Arc<ApiRiskParam>> {
        self.snapshot.read().clone()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(market) = self.market_store.snapshot() else {
            debug!("market snapshot not ready, skipping risk params refresh");
            return Ok(());
        };

        let params = self.client.fetch_risk_params(market.block.number).await?;
        debug!(
            liquidation_ratio = %params.liquidation_ratio,
            liquidation_reward = %params.liquidation_reward,
            "risk params updated"
        );

        *self.snapshot.write() = Some(Arc::new(params));
        Ok(())
    }

    pub fn spawn(
        self: &Arc<Self>,
        every: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        spawn_refresh_loop("risk-params", every, shutdown, move || {
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        })
    }
}
