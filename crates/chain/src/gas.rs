//! Gas price terms and external quote sources.
//!
//! Quotes come in two shapes: a legacy single price ("fast" lane from a gas
//! station API) or EIP-1559 fee-market terms. The gas price store shapes
//! legacy quotes with the configured multiplier and addition before they
//! reach a transaction.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use alloy::rpc::types::TransactionRequest;

/// Well-known network ids with dedicated gas quote endpoints.
pub mod network_ids {
    pub const ETHEREUM: u64 = 1;
    pub const RINKEBY: u64 = 4;
    pub const POLYGON: u64 = 137;
    pub const MUMBAI: u64 = 80001;
}

/// Gas pricing terms applied to outgoing settlement transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceTerms {
    /// Legacy single gas price, in wei.
    Legacy { gas_price: u128 },
    /// EIP-1559 fee-market terms, in wei.
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl PriceTerms {
    /// Apply these terms to a transaction request.
    pub fn apply_to(&self, tx: &mut TransactionRequest) {
        match self {
            PriceTerms::Legacy { gas_price } => {
                tx.gas_price = Some(*gas_price);
            }
            PriceTerms::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                tx.max_fee_per_gas = Some(*max_fee_per_gas);
                tx.max_priority_fee_per_gas = Some(*max_priority_fee_per_gas);
            }
        }
    }

    /// Effective price for logging and estimation.
    pub fn effective_gas_price(&self) -> u128 {
        match self {
            PriceTerms::Legacy { gas_price } => *gas_price,
            PriceTerms::Eip1559 {
                max_fee_per_gas, ..
            } => *max_fee_per_gas,
        }
    }
}

/// Raw quote as served by a gas price source, before shaping.
#[derive(Debug, Clone, PartialEq)]
pub enum GasQuote {
    /// Legacy "fast" price in the source's own unit (see [`quote_unit_wei`]).
    Fast { price: f64 },
    /// Fee-market terms already in wei.
    FeeMarket {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

/// External source of gas price quotes.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    async fn fetch_quote(&self) -> Result<GasQuote>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}

/// Wei value of one unit of a legacy "fast" quote.
///
/// The Ethereum endpoint reports prices as gwei * 10, so one quote unit is
/// 1e8 wei there; everywhere else a unit is one gwei.
pub fn quote_unit_wei(network_id: u64) -> u128 {
    if network_id == network_ids::ETHEREUM {
        100_000_000
    } else {
        1_000_000_000
    }
}

/// Shape a legacy quote into a gas price in wei:
/// `round(price * multiplier * unit) + addition`.
pub fn shape_fast_quote(price: f64, unit_wei: u128, multiplier: f64, addition_wei: u128) -> u128 {
    let scaled = (price * multiplier * unit_wei as f64).round();
    (scaled.max(0.0) as u128).saturating_add(addition_wei)
}

/// Pick the quote source for a network, mirroring the per-network endpoints
/// the protocol has historically used.
pub fn source_for_network(
    network_id: u64,
    api_key: Option<String>,
    timeout: Duration,
) -> Result<Box<dyn GasPriceSource>> {
    match network_id {
        network_ids::ETHEREUM | network_ids::RINKEBY => {
            let api_key = api_key.ok_or_else(|| {
                anyhow!("fee-market gas source requires an API key on network {network_id}")
            })?;
            Ok(Box::new(BlockPricesSource::new(
                "https://api.blocknative.com/gasprices/blockprices",
                api_key,
                timeout,
            )?))
        }
        network_ids::POLYGON => Ok(Box::new(GasStationSource::new(
            "https://gasstation-mainnet.matic.network/",
            timeout,
        )?)),
        network_ids::MUMBAI => Ok(Box::new(GasStationSource::new(
            "https://gasstation-mumbai.matic.today/",
            timeout,
        )?)),
        other => Err(anyhow!("no gas price source for network id {other}")),
    }
}

/// Gas-station style source serving a legacy `{ "fast": <price> }` quote.
#[derive(Debug, Clone)]
pub struct GasStationSource {
    client: reqwest::Client,
    url: String,
}

impl GasStationSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl GasPriceSource for GasStationSource {
    async fn fetch_quote(&self) -> Result<GasQuote> {
        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fast = match body.get("fast") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| anyhow!("gas station response carried no usable fast price"))?;

        debug!(fast, "gas station quote");
        Ok(GasQuote::Fast { price: fast })
    }

    fn source_name(&self) -> &'static str {
        "gas-station"
    }
}

/// Fee-market source serving block-price estimates (gwei floats).
#[derive(Debug, Clone)]
pub struct BlockPricesSource {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl BlockPricesSource {
    pub fn new(url: impl Into<String>, api_key: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl GasPriceSource for BlockPricesSource {
    async fn fetch_quote(&self) -> Result<GasQuote> {
        const GWEI: f64 = 1e9;

        let body: Value = self
            .client
            .get(&self.url)
            .header("Authorization", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let estimate = body
            .pointer("/blockPrices/0/estimatedPrices/0")
            .ok_or_else(|| anyhow!("block prices response carried no estimates"))?;

        let max_fee = estimate
            .get("maxFeePerGas")
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("block prices estimate missing maxFeePerGas"))?;
        let priority_fee = estimate
            .get("maxPriorityFeePerGas")
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("block prices estimate missing maxPriorityFeePerGas"))?;

        Ok(GasQuote::FeeMarket {
            max_fee_per_gas: (max_fee * GWEI).round() as u128,
            max_priority_fee_per_gas: (priority_fee * GWEI).round() as u128,
        })
    }

    fn source_name(&self) -> &'static str {
        "block-prices"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_terms_apply_gas_price_only() {
        let mut tx = TransactionRequest::default();
        PriceTerms::Legacy {
            gas_price: 2_000_000_000,
        }
        .apply_to(&mut tx);

        assert_eq!(tx.gas_price, Some(2_000_000_000));
        assert_eq!(tx.max_fee_per_gas, None);
    }

    #[test]
    fn fee_market_terms_apply_both_fees() {
        let mut tx = TransactionRequest::default();
        PriceTerms::Eip1559 {
            max_fee_per_gas: 50_000_000_000,
            max_priority_fee_per_gas: 2_000_000_000,
        }
        .apply_to(&mut tx);

        assert_eq!(tx.gas_price, None);
        assert_eq!(tx.max_fee_per_gas, Some(50_000_000_000));
        assert_eq!(tx.max_priority_fee_per_gas, Some(2_000_000_000));
    }

    #[test]
    fn fast_quote_shaping_applies_multiplier_then_addition() {
        // 30 gwei fast, 1.5x multiplier, 1 gwei addition
        let wei = shape_fast_quote(30.0, 1_000_000_000, 1.5, 1_000_000_000);
        assert_eq!(wei, 46_000_000_000);

        // Ethereum unit quirk: quotes are gwei * 10
        let wei = shape_fast_quote(300.0, quote_unit_wei(network_ids::ETHEREUM), 1.0, 0);
        assert_eq!(wei, 30_000_000_000);
    }

    #[test]
    fn unknown_network_has_no_source() {
        assert!(source_for_network(42161, None, Duration::from_secs(10)).is_err());
    }

    #[test]
    fn fee_market_source_requires_api_key() {
        assert!(
            source_for_network(network_ids::ETHEREUM, None, Duration::from_secs(10)).is_err()
        );
    }
}
