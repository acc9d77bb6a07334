//! Liquidation orchestration.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::DateTime;
use tokio::sync::watch;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{error, info, warn};

use liquidator_api::{AccountId, ApiAccount};
use liquidator_chain::SettlementClient;

use crate::config::LiquidatorConfig;
use crate::dedup::LiquidationStore;
use crate::health::{is_collateralized, is_expired};
use crate::store::{AccountStore, GasPriceStore, MarketStore, RiskParamsStore};
use crate::strategy;

/// Per-cycle candidate selection and settlement dispatch.
///
/// Reads the latest store snapshots, filters candidates through the dedup
/// cache and the risk evaluators, resolves the liquidation/expiry priority,
/// marks every selected account in flight, and dispatches settlement calls
/// with pacing between them. Every per-account failure is logged and
/// isolated.
pub struct LiquidationEngine {
    account_store: Arc<AccountStore>,
    market_store: Arc<MarketStore>,
    risk_params_store: Arc<RiskParamsStore>,
    gas_price_store: Arc<GasPriceStore>,
    dedup: Arc<LiquidationStore>,
    settlement: Arc<dyn SettlementClient>,
    config: Arc<LiquidatorConfig>,
}

impl LiquidationEngine {
    pub fn new(
        account_store: Arc<AccountStore>,
        market_store: Arc<MarketStore>,
        risk_params_store: Arc<RiskParamsStore>,
        gas_price_store: Arc<GasPriceStore>,
        dedup: Arc<LiquidationStore>,
        settlement: Arc<dyn SettlementClient>,
        config: Arc<LiquidatorConfig>,
    ) -> Self {
        Self {
            account_store,
            market_store,
            risk_params_store,
            gas_price_store,
            dedup,
            settlement,
            config,
        }
    }

    /// Run settlement cycles until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("starting liquidation engine");

        // Give the stores one market interval to take their first snapshots.
        sleep(self.config.polling.market_interval).await;

        let mut ticker = interval(self.config.polling.liquidate_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.liquidate_eligible_accounts().await;
                }
                _ = shutdown.changed() => {
                    info!("liquidation engine stopped");
                    break;
                }
            }
        }
    }

    /// One selection-and-dispatch cycle.
    pub async fn liquidate_eligible_accounts(&self) {
        let Some(market) = self.market_store.snapshot() else {
            info!("market snapshot not ready, skipping cycle");
            return;
        };
        // Recoverable: skip this cycle, the store keeps polling.
        let Some(risk_params) = self.risk_params_store.current() else {
            error!("no risk params available");
            return;
        };

        let block = market.block;
        let accounts = self.account_store.snapshot();
        let cfg = &self.config.dispatch;

        let expirable: Vec<ApiAccount> = if cfg.expirations_enabled {
            accounts
                .expirable
                .iter()
                .filter(|a| !self.dedup.contains(&a.id))
                .filter(|a| {
                    a.balances.values().any(|b| {
                        b.is_borrow()
                            && is_expired(b.expires_at, block.timestamp, cfg.expiry_delay_secs)
                    })
                })
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let liquidatable: Vec<ApiAccount> = if cfg.liquidations_enabled {
            accounts
                .liquidatable
                .iter()
                .filter(|a| !self.dedup.contains(&a.id))
                .filter(|a| match is_collateralized(a, &market.markets, &risk_params) {
                    Ok(collateralized) => !collateralized,
                    Err(error) => {
                        warn!(
                            account = %a.id,
                            stage = "evaluate",
                            error = %error,
                            "skipping account with inconsistent market data"
                        );
                        false
                    }
                })
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        // An account qualifying for both goes through liquidation only.
        let liquidatable_ids: HashSet<AccountId> =
            liquidatable.iter().map(|a| a.id).collect();
        let expirable: Vec<ApiAccount> = expirable
            .into_iter()
            .filter(|a| !liquidatable_ids.contains(&a.id))
            .collect();

        if liquidatable.is_empty() && expirable.is_empty() {
            info!("no accounts to liquidate");
            return;
        }

        info!(
            liquidatable = liquidatable.len(),
            expirable = expirable.len(),
            block = block.number,
            block_time = %DateTime::from_timestamp(block.timestamp as i64, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            "dispatching settlements"
        );

        // Mark in flight before any dispatch; a slow settlement call must
        // not be re-selected by the next cycle.
        for account in liquidatable.iter().chain(expirable.iter()) {
            self.dedup.add(&account.id);
        }

        let gas = self.gas_price_store.current();

        for account in &liquidatable {
            match strategy::liquidate_account(
                self.settlement.as_ref(),
                &self.config,
                account,
                block,
                gas.clone(),
            )
            .await
            {
                Ok(Some(tx)) => {
                    info!(account = %account.id, tx_hash = %tx.0, "liquidation dispatched");
                }
                Ok(None) => {}
                Err(error) => {
                    error!(
                        account = %account.id,
                        stage = "liquidate",
                        error = %error,
                        "failed to liquidate account"
                    );
                }
            }
            sleep(cfg.sequential_delay).await;
        }

        for account in &expirable {
            match strategy::settle_expired_account(
                self.settlement.as_ref(),
                &self.config,
                account,
                &market.markets,
                block,
                gas.clone(),
            )
            .await
            {
                Ok(tx) => {
                    info!(account = %account.id, tx_hash = %tx.0, "expiry settlement dispatched");
                }
                Err(error) => {
                    error!(
                        account = %account.id,
                        stage = "expire",
                        error = %error,
                        "failed to settle expired account"
                    );
                }
            }
            sleep(cfg.sequential_delay).await;
        }
    }
}
