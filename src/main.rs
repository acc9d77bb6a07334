//! Margin-protocol liquidation bot.
//!
//! Polls protocol state from an external data provider, re-verifies
//! undercollateralized and expired positions client-side, and drives the
//! protocol's settlement proxies to close them, at most once per position
//! within the dedup window.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liquidator_api::SubgraphClient;
use liquidator_chain::{gas, MarginProtocol, ProxyAddresses, TransactionSender};
use liquidator_core::{
    AccountStore, GasPriceStore, LiquidationEngine, LiquidationStore, LiquidatorConfig,
    MarketStore, RiskParamsStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,liquidator_core=debug")),
        )
        .init();

    // Any configuration problem is fatal before a single loop starts.
    let config = Arc::new(LiquidatorConfig::from_env().context("invalid configuration")?);
    config.log_config();

    info!(network_id = config.endpoints.network_id, "starting liquidator");

    run(config).await
}

async fn run(config: Arc<LiquidatorConfig>) -> Result<()> {
    // Data provider.
    let data_client = Arc::new(
        SubgraphClient::new(
            config.endpoints.subgraph_url.clone(),
            Duration::from_secs(30),
        )
        .context("building subgraph client")?,
    );

    // Settlement path.
    let sender = Arc::new(
        TransactionSender::new(
            &config.wallet.private_key,
            &config.endpoints.node_url,
            config.endpoints.network_id,
        )
        .await
        .context("initializing transaction sender")?,
    );
    if sender.address != config.wallet.address {
        bail!(
            "wallet private key resolves to {}, configured address is {}",
            sender.address,
            config.wallet.address
        );
    }
    info!(address = %sender.address, "loaded liquidator account");

    let settlement = Arc::new(MarginProtocol::new(
        ProxyAddresses {
            margin: config.contracts.margin,
            liquidator_proxy: config.contracts.liquidator_proxy,
            amm_liquidator_proxy: config.contracts.amm_liquidator_proxy,
            expiry_proxy: config.contracts.expiry_proxy,
        },
        sender,
    ));

    // Gas price source for this network.
    let gas_source: Arc<dyn liquidator_chain::GasPriceSource> = Arc::from(
        gas::source_for_network(
            config.endpoints.network_id,
            config.gas.api_key.clone(),
            config.gas.request_timeout,
        )
        .context("selecting gas price source")?,
    );

    // Stores.
    let market_store = Arc::new(MarketStore::new(data_client.clone()));
    let account_store = Arc::new(AccountStore::new(data_client.clone(), market_store.clone()));
    let risk_params_store = Arc::new(RiskParamsStore::new(data_client, market_store.clone()));
    let gas_price_store = Arc::new(GasPriceStore::new(
        gas_source,
        &config.gas,
        config.endpoints.network_id,
    ));
    let dedup = Arc::new(LiquidationStore::new(config.dispatch.dedup_ttl));

    let engine = Arc::new(LiquidationEngine::new(
        account_store.clone(),
        market_store.clone(),
        risk_params_store.clone(),
        gas_price_store.clone(),
        dedup,
        settlement,
        config.clone(),
    ));

    // Spawn the polling loops; each runs until the shutdown signal.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let mut handles = vec![
        market_store.spawn(config.polling.market_interval, shutdown_rx.clone()),
        account_store.spawn(config.polling.account_interval, shutdown_rx.clone()),
        risk_params_store.spawn(config.polling.risk_params_interval, shutdown_rx.clone()),
        gas_price_store.spawn(config.polling.gas_price_interval, shutdown_rx.clone()),
    ];

    if config.dispatch.liquidations_enabled || config.dispatch.expirations_enabled {
        let engine = engine.clone();
        let engine_shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            engine.run(engine_shutdown).await;
        }));
    } else {
        info!("liquidations and expirations both disabled, running stores only");
    }

    info!("all components started");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    let _ = shutdown_tx.send(true);
    for handle in handles {
        let _ = handle.await;
    }

    info!("liquidator stopped");
    Ok(())
}
