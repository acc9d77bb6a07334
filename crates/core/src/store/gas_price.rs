//! Gas price store.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use liquidator_chain::gas::{quote_unit_wei, shape_fast_quote};
use liquidator_chain::{GasPriceSource, GasQuote, PriceTerms};

use crate::config::GasConfig;

use super::poll::spawn_refresh_loop;

/// Holds the gas price terms applied to settlement transactions.
///
/// Seeded from the configured initial price so dispatch works before the
/// first quote arrives; a failed refresh keeps the last quote.
pub struct GasPriceStore {
    source: Arc<dyn GasPriceSource>,
    terms: RwLock<PriceTerms>,
    multiplier: f64,
    addition_wei: u128,
    unit_wei: u128,
}

impl GasPriceStore {
    pub fn new(source: Arc<dyn GasPriceSource>, gas: &GasConfig, network_id: u64) -> Self {
        Self {
            source,
            terms: RwLock::new(PriceTerms::Legacy {
                gas_price: gas.initial_price_wei,
            }),
            multiplier: gas.multiplier,
            addition_wei: gas.addition_wei,
            unit_wei: quote_unit_wei(network_id),
        }
    }

    /// Current terms for the next dispatch.
    pub fn current(&self) -> PriceTerms {
        self.terms.read().clone()
    }

    pub async fn refresh(&self) -> anyhow::Result<()> {
        let quote = self.source.fetch_quote().await?;

        let next = match quote {
            GasQuote::Fast { price } => PriceTerms::Legacy {
                gas_price: shape_fast_quote(price, self.unit_wei, self.multiplier, self.addition_wei),
            },
            GasQuote::FeeMarket {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => PriceTerms::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            },
        };

        info!(
            source = self.source.source_name(),
            gas_price = next.effective_gas_price(),
            "gas price updated"
        );

        *self.terms.write() = next;
        Ok(())
    }

    pub fn spawn(
        self: &Arc<Self>,
        every: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        spawn_refresh_loop("gas-price", every, shutdown, move || {
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakySource {
        fail: AtomicBool,
    }

    #[async_trait]
    impl GasPriceSource for FlakySource {
        async fn fetch_quote(&self) -> anyhow::Result<GasQuote> {
            if self.fail.load(Ordering::SeqCst) {
                Err(anyhow!("provider down"))
            } else {
                Ok(GasQuote::Fast { price: 40.0 })
            }
        }

        fn source_name(&self) -> &'static str {
            "flaky"
        }
    }

    fn gas_config() -> GasConfig {
        GasConfig {
            initial_price_wei: 30_000_000_000,
            multiplier: 1.5,
            addition_wei: 1_000_000_000,
            request_timeout: Duration::from_secs(10),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn serves_initial_price_then_shaped_quote() {
        let source = Arc::new(FlakySource {
            fail: AtomicBool::new(false),
        });
        let store = GasPriceStore::new(source, &gas_config(), 137);

        assert_eq!(
            store.current(),
            PriceTerms::Legacy {
                gas_price: 30_000_000_000
            }
        );

        store.refresh().await.unwrap();
        // 40 gwei * 1.5 + 1 gwei addition
        assert_eq!(
            store.current(),
            PriceTerms::Legacy {
                gas_price: 61_000_000_000
            }
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_last_quote() {
        let source = Arc::new(FlakySource {
            fail: AtomicBool::new(false),
        });
        let store = GasPriceStore::new(source.clone(), &gas_config(), 137);

        store.refresh().await.unwrap();
        let before = store.current();

        source.fail.store(true, Ordering::SeqCst);
        assert!(store.refresh().await.is_err());
        assert_eq!(store.current(), before);
    }
}
