//! Bot configuration.
//!
//! All options come from the environment, are validated once at startup,
//! and travel as one explicit object passed into each component. Any
//! missing or malformed option is fatal: the process must not start with a
//! partial configuration.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use liquidator_api::decimal::{parse_unsigned_decimal_scaled, BASE};
use liquidator_api::MarketId;

/// Environment variable names.
pub mod keys {
    pub const ACCOUNT_POLL_INTERVAL_MS: &str = "ACCOUNT_POLL_INTERVAL_MS";
    pub const MARKET_POLL_INTERVAL_MS: &str = "MARKET_POLL_INTERVAL_MS";
    pub const RISK_PARAMS_POLL_INTERVAL_MS: &str = "RISK_PARAMS_POLL_INTERVAL_MS";
    pub const GAS_PRICE_POLL_INTERVAL_MS: &str = "GAS_PRICE_POLL_INTERVAL_MS";
    pub const LIQUIDATE_POLL_INTERVAL_MS: &str = "LIQUIDATE_POLL_INTERVAL_MS";
    pub const SEQUENTIAL_TRANSACTION_DELAY_MS: &str = "SEQUENTIAL_TRANSACTION_DELAY_MS";
    pub const LIQUIDATION_KEY_EXPIRATION_SECONDS: &str = "LIQUIDATION_KEY_EXPIRATION_SECONDS";
    pub const EXPIRED_ACCOUNT_DELAY_SECONDS: &str = "EXPIRED_ACCOUNT_DELAY_SECONDS";
    pub const LIQUIDATIONS_ENABLED: &str = "LIQUIDATIONS_ENABLED";
    pub const EXPIRATIONS_ENABLED: &str = "EXPIRATIONS_ENABLED";
    pub const AUTO_SELL_COLLATERAL: &str = "AUTO_SELL_COLLATERAL";
    pub const REVERT_ON_FAIL_TO_SELL_COLLATERAL: &str = "REVERT_ON_FAIL_TO_SELL_COLLATERAL";
    pub const OWED_PREFERENCES: &str = "OWED_PREFERENCES";
    pub const COLLATERAL_PREFERENCES: &str = "COLLATERAL_PREFERENCES";
    pub const BRIDGE_TOKEN_ADDRESS: &str = "BRIDGE_TOKEN_ADDRESS";
    pub const MIN_ACCOUNT_COLLATERALIZATION: &str = "MIN_ACCOUNT_COLLATERALIZATION";
    pub const MIN_OVERHEAD_VALUE: &str = "MIN_OVERHEAD_VALUE";
    pub const MIN_OWED_OUTPUT_AMOUNT_DISCOUNT: &str = "MIN_OWED_OUTPUT_AMOUNT_DISCOUNT";
    pub const ACCOUNT_WALLET_ADDRESS: &str = "ACCOUNT_WALLET_ADDRESS";
    pub const ACCOUNT_WALLET_PRIVATE_KEY: &str = "ACCOUNT_WALLET_PRIVATE_KEY";
    pub const LIQUIDATOR_ACCOUNT_NUMBER: &str = "LIQUIDATOR_ACCOUNT_NUMBER";
    pub const SUBGRAPH_URL: &str = "SUBGRAPH_URL";
    pub const ETHEREUM_NODE_URL: &str = "ETHEREUM_NODE_URL";
    pub const NETWORK_ID: &str = "NETWORK_ID";
    pub const INITIAL_GAS_PRICE_WEI: &str = "INITIAL_GAS_PRICE_WEI";
    pub const GAS_PRICE_MULTIPLIER: &str = "GAS_PRICE_MULTIPLIER";
    pub const GAS_PRICE_ADDITION: &str = "GAS_PRICE_ADDITION";
    pub const GAS_REQUEST_TIMEOUT_MS: &str = "GAS_REQUEST_TIMEOUT_MS";
    pub const GAS_REQUEST_API_KEY: &str = "GAS_REQUEST_API_KEY";
    pub const MARGIN_CONTRACT_ADDRESS: &str = "MARGIN_CONTRACT_ADDRESS";
    pub const LIQUIDATOR_PROXY_ADDRESS: &str = "LIQUIDATOR_PROXY_ADDRESS";
    pub const AMM_LIQUIDATOR_PROXY_ADDRESS: &str = "AMM_LIQUIDATOR_PROXY_ADDRESS";
    pub const EXPIRY_PROXY_ADDRESS: &str = "EXPIRY_PROXY_ADDRESS";
    pub const EXPIRY_CONTRACT_ADDRESS: &str = "EXPIRY_CONTRACT_ADDRESS";
}

/// Fatal configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not provided")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{key} is invalid. Must be >= {min} {unit}")]
    BelowMinimum {
        key: &'static str,
        min: u64,
        unit: &'static str,
    },
}

/// Store refresh and engine cycle timing.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub account_interval: Duration,
    pub market_interval: Duration,
    pub risk_params_interval: Duration,
    pub gas_price_interval: Duration,
    pub liquidate_interval: Duration,
}

/// Candidate selection and settlement parameters.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Pacing delay between successive settlement dispatches.
    pub sequential_delay: Duration,
    /// Dedup cache entry lifetime.
    pub dedup_ttl: Duration,
    /// Grace period past a balance's nominal expiration.
    pub expiry_delay_secs: u64,
    pub liquidations_enabled: bool,
    pub expirations_enabled: bool,
    pub auto_sell: bool,
    pub revert_on_fail_to_sell: bool,
    /// Owed markets in preference order (preference-order strategy).
    pub owed_preferences: Vec<MarketId>,
    /// Collateral markets in preference order.
    pub collateral_preferences: Vec<MarketId>,
    /// Intermediate token for auto-sell paths.
    pub bridge_token: Address,
    /// Minimum collateralization to leave behind, 1e18-scaled.
    pub min_collateralization: U256,
    /// Minimum overhead value worth settling, base units.
    pub min_overhead_value: U256,
    /// Sale output discount, 1e18-scaled, in [0, 1).
    pub min_owed_output_discount: U256,
}

/// Liquidator identity.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub address: Address,
    pub private_key: String,
    pub account_number: U256,
}

/// External endpoints.
#[derive(Debug, Clone)]
pub struct EndpointsConfig {
    pub subgraph_url: String,
    pub node_url: String,
    pub network_id: u64,
}

/// Gas price handling.
#[derive(Debug, Clone)]
pub struct GasConfig {
    pub initial_price_wei: u128,
    pub multiplier: f64,
    pub addition_wei: u128,
    pub request_timeout: Duration,
    pub api_key: Option<String>,
}

/// Deployed contract addresses.
#[derive(Debug, Clone)]
pub struct ContractsConfig {
    pub margin: Address,
    pub liquidator_proxy: Address,
    pub amm_liquidator_proxy: Address,
    pub expiry_proxy: Address,
    /// Expiry contract that timed obligations must be registered with.
    pub expiry: Address,
}

/// Complete bot configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct LiquidatorConfig {
    pub polling: PollingConfig,
    pub dispatch: DispatchConfig,
    pub wallet: WalletConfig,
    pub endpoints: EndpointsConfig,
    pub gas: GasConfig,
    pub contracts: ContractsConfig,
}

impl LiquidatorConfig {
    /// Read and validate configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read and validate configuration from an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let polling = PollingConfig {
            account_interval: env.duration_ms(keys::ACCOUNT_POLL_INTERVAL_MS, 1000)?,
            market_interval: env.duration_ms(keys::MARKET_POLL_INTERVAL_MS, 1000)?,
            risk_params_interval: env.duration_ms(keys::RISK_PARAMS_POLL_INTERVAL_MS, 1000)?,
            gas_price_interval: env.duration_ms(keys::GAS_PRICE_POLL_INTERVAL_MS, 1000)?,
            liquidate_interval: env.duration_ms(keys::LIQUIDATE_POLL_INTERVAL_MS, 1000)?,
        };

        let discount = env.wad_decimal(keys::MIN_OWED_OUTPUT_AMOUNT_DISCOUNT)?;
        if discount >= BASE {
            return Err(ConfigError::Invalid {
                key: keys::MIN_OWED_OUTPUT_AMOUNT_DISCOUNT,
                reason: "must lie in [0, 1)".to_string(),
            });
        }

        let dispatch = DispatchConfig {
            sequential_delay: env.duration_ms(keys::SEQUENTIAL_TRANSACTION_DELAY_MS, 10)?,
            dedup_ttl: Duration::from_secs(env.u64(keys::LIQUIDATION_KEY_EXPIRATION_SECONDS)?),
            expiry_delay_secs: env.u64(keys::EXPIRED_ACCOUNT_DELAY_SECONDS)?,
            liquidations_enabled: env.boolean(keys::LIQUIDATIONS_ENABLED)?,
            expirations_enabled: env.boolean(keys::EXPIRATIONS_ENABLED)?,
            auto_sell: env.boolean(keys::AUTO_SELL_COLLATERAL)?,
            revert_on_fail_to_sell: env.boolean(keys::REVERT_ON_FAIL_TO_SELL_COLLATERAL)?,
            owed_preferences: env.market_list(keys::OWED_PREFERENCES)?,
            collateral_preferences: env.market_list(keys::COLLATERAL_PREFERENCES)?,
            bridge_token: env.address(keys::BRIDGE_TOKEN_ADDRESS)?,
            min_collateralization: env.wad_decimal(keys::MIN_ACCOUNT_COLLATERALIZATION)?,
            min_overhead_value: env.u256(keys::MIN_OVERHEAD_VALUE)?,
            min_owed_output_discount: discount,
        };

        let wallet = WalletConfig {
            address: env.address(keys::ACCOUNT_WALLET_ADDRESS)?,
            private_key: env.private_key(keys::ACCOUNT_WALLET_PRIVATE_KEY)?,
            account_number: env.u256(keys::LIQUIDATOR_ACCOUNT_NUMBER)?,
        };

        let endpoints = EndpointsConfig {
            subgraph_url: env.required(keys::SUBGRAPH_URL)?,
            node_url: env.required(keys::ETHEREUM_NODE_URL)?,
            network_id: env.u64(keys::NETWORK_ID)?,
        };

        let gas = GasConfig {
            initial_price_wei: env.u128(keys::INITIAL_GAS_PRICE_WEI)?,
            multiplier: env.f64(keys::GAS_PRICE_MULTIPLIER)?,
            addition_wei: env.u128(keys::GAS_PRICE_ADDITION)?,
            request_timeout: env.duration_ms(keys::GAS_REQUEST_TIMEOUT_MS, 1)?,
            api_key: env.optional(keys::GAS_REQUEST_API_KEY),
        };

        let contracts = ContractsConfig {
            margin: env.address(keys::MARGIN_CONTRACT_ADDRESS)?,
            liquidator_proxy: env.address(keys::LIQUIDATOR_PROXY_ADDRESS)?,
            amm_liquidator_proxy: env.address(keys::AMM_LIQUIDATOR_PROXY_ADDRESS)?,
            expiry_proxy: env.address(keys::EXPIRY_PROXY_ADDRESS)?,
            expiry: env.address(keys::EXPIRY_CONTRACT_ADDRESS)?,
        };

        Ok(Self {
            polling,
            dispatch,
            wallet,
            endpoints,
            gas,
            contracts,
        })
    }

    /// Log the effective configuration at startup.
    pub fn log_config(&self) {
        tracing::info!(
            account_ms = self.polling.account_interval.as_millis() as u64,
            market_ms = self.polling.market_interval.as_millis() as u64,
            risk_params_ms = self.polling.risk_params_interval.as_millis() as u64,
            gas_price_ms = self.polling.gas_price_interval.as_millis() as u64,
            liquidate_ms = self.polling.liquidate_interval.as_millis() as u64,
            "poll intervals"
        );
        tracing::info!(
            liquidations = self.dispatch.liquidations_enabled,
            expirations = self.dispatch.expirations_enabled,
            auto_sell = self.dispatch.auto_sell,
            dedup_ttl_secs = self.dispatch.dedup_ttl.as_secs(),
            expiry_delay_secs = self.dispatch.expiry_delay_secs,
            pacing_ms = self.dispatch.sequential_delay.as_millis() as u64,
            "dispatch parameters"
        );
        tracing::info!(
            wallet = %self.wallet.address,
            network_id = self.endpoints.network_id,
            "liquidator identity"
        );
    }
}

/// Typed accessors over a raw string lookup.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn optional(&self, key: &'static str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn duration_ms(&self, key: &'static str, min_ms: u64) -> Result<Duration, ConfigError> {
        let value = self.u64(key)?;
        if value < min_ms {
            return Err(ConfigError::BelowMinimum {
                key,
                min: min_ms,
                unit: "milliseconds",
            });
        }
        Ok(Duration::from_millis(value))
    }

    fn u64(&self, key: &'static str) -> Result<u64, ConfigError> {
        self.required(key)?
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("not a whole number: {e}"),
            })
    }

    fn u128(&self, key: &'static str) -> Result<u128, ConfigError> {
        self.required(key)?
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("not a whole number: {e}"),
            })
    }

    fn f64(&self, key: &'static str) -> Result<f64, ConfigError> {
        let value: f64 = self
            .required(key)?
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("not a number: {e}"),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Invalid {
                key,
                reason: "must be a finite non-negative number".to_string(),
            });
        }
        Ok(value)
    }

    fn u256(&self, key: &'static str) -> Result<U256, ConfigError> {
        let raw = self.required(key)?;
        U256::from_str_radix(&raw, 10).map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("not a whole number: {e}"),
        })
    }

    fn wad_decimal(&self, key: &'static str) -> Result<U256, ConfigError> {
        let raw = self.required(key)?;
        parse_unsigned_decimal_scaled(&raw, 18).map_err(|reason| ConfigError::Invalid { key, reason })
    }

    fn boolean(&self, key: &'static str) -> Result<bool, ConfigError> {
        match self.required(key)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ConfigError::Invalid {
                key,
                reason: format!("expected \"true\" or \"false\", got {other:?}"),
            }),
        }
    }

    fn address(&self, key: &'static str) -> Result<Address, ConfigError> {
        let raw = self.required(key)?;
        let address: Address = raw.parse().map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("not an address: {e}"),
        })?;
        if address.is_zero() {
            return Err(ConfigError::Invalid {
                key,
                reason: "must not be the zero address".to_string(),
            });
        }
        Ok(address)
    }

    fn private_key(&self, key: &'static str) -> Result<String, ConfigError> {
        let raw = self.required(key)?;
        let hex = raw.strip_prefix("0x").unwrap_or(&raw);
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid {
                key,
                reason: "must be a 32-byte hex key".to_string(),
            });
        }
        Ok(raw)
    }

    fn market_list(&self, key: &'static str) -> Result<Vec<MarketId>, ConfigError> {
        let raw = self.required(key)?;
        let markets = raw
            .split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u64>()
                    .map(MarketId)
                    .map_err(|e| ConfigError::Invalid {
                        key,
                        reason: format!("bad market id {part:?}: {e}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if markets.is_empty() {
            return Err(ConfigError::Invalid {
                key,
                reason: "must list at least one market id".to_string(),
            });
        }
        Ok(markets)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// A complete, valid configuration map for tests to start from.
    pub(crate) fn base_map() -> HashMap<&'static str, String> {
        let mut map = HashMap::new();
        map.insert(keys::ACCOUNT_POLL_INTERVAL_MS, "1000".to_string());
        map.insert(keys::MARKET_POLL_INTERVAL_MS, "1000".to_string());
        map.insert(keys::RISK_PARAMS_POLL_INTERVAL_MS, "1000".to_string());
        map.insert(keys::GAS_PRICE_POLL_INTERVAL_MS, "1000".to_string());
        map.insert(keys::LIQUIDATE_POLL_INTERVAL_MS, "5000".to_string());
        map.insert(keys::SEQUENTIAL_TRANSACTION_DELAY_MS, "10".to_string());
        map.insert(keys::LIQUIDATION_KEY_EXPIRATION_SECONDS, "300".to_string());
        map.insert(keys::EXPIRED_ACCOUNT_DELAY_SECONDS, "300".to_string());
        map.insert(keys::LIQUIDATIONS_ENABLED, "true".to_string());
        map.insert(keys::EXPIRATIONS_ENABLED, "true".to_string());
        map.insert(keys::AUTO_SELL_COLLATERAL, "false".to_string());
        map.insert(keys::REVERT_ON_FAIL_TO_SELL_COLLATERAL, "false".to_string());
        map.insert(keys::OWED_PREFERENCES, "1, 0, 2, 3".to_string());
        map.insert(keys::COLLATERAL_PREFERENCES, "0, 1, 2, 3".to_string());
        map.insert(
            keys::BRIDGE_TOKEN_ADDRESS,
            "0x1010101010101010101010101010101010101010".to_string(),
        );
        map.insert(keys::MIN_ACCOUNT_COLLATERALIZATION, "1.25".to_string());
        map.insert(keys::MIN_OVERHEAD_VALUE, "100000000000000000000".to_string());
        map.insert(keys::MIN_OWED_OUTPUT_AMOUNT_DISCOUNT, "0.05".to_string());
        map.insert(
            keys::ACCOUNT_WALLET_ADDRESS,
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
        );
        map.insert(
            keys::ACCOUNT_WALLET_PRIVATE_KEY,
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        );
        map.insert(keys::LIQUIDATOR_ACCOUNT_NUMBER, "0".to_string());
        map.insert(keys::SUBGRAPH_URL, "http://localhost:8000/subgraph".to_string());
        map.insert(keys::ETHEREUM_NODE_URL, "http://localhost:8545".to_string());
        map.insert(keys::NETWORK_ID, "137".to_string());
        map.insert(keys::INITIAL_GAS_PRICE_WEI, "30000000000".to_string());
        map.insert(keys::GAS_PRICE_MULTIPLIER, "1.0".to_string());
        map.insert(keys::GAS_PRICE_ADDITION, "0".to_string());
        map.insert(keys::GAS_REQUEST_TIMEOUT_MS, "10000".to_string());
        map.insert(
            keys::MARGIN_CONTRACT_ADDRESS,
            "0x2020202020202020202020202020202020202020".to_string(),
        );
        map.insert(
            keys::LIQUIDATOR_PROXY_ADDRESS,
            "0x3030303030303030303030303030303030303030".to_string(),
        );
        map.insert(
            keys::AMM_LIQUIDATOR_PROXY_ADDRESS,
            "0x4040404040404040404040404040404040404040".to_string(),
        );
        map.insert(
            keys::EXPIRY_PROXY_ADDRESS,
            "0x5050505050505050505050505050505050505050".to_string(),
        );
        map.insert(
            keys::EXPIRY_CONTRACT_ADDRESS,
            "0x6060606060606060606060606060606060606060".to_string(),
        );
        map
    }

    pub(crate) fn from_map(map: &HashMap<&'static str, String>) -> Result<LiquidatorConfig, ConfigError> {
        LiquidatorConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn complete_configuration_parses() {
        let config = from_map(&base_map()).unwrap();
        assert_eq!(config.polling.account_interval, Duration::from_secs(1));
        assert_eq!(
            config.dispatch.owed_preferences,
            vec![MarketId(1), MarketId(0), MarketId(2), MarketId(3)]
        );
        assert_eq!(
            config.dispatch.min_collateralization,
            U256::from(1_250_000_000_000_000_000u128)
        );
        assert_eq!(
            config.dispatch.min_owed_output_discount,
            U256::from(50_000_000_000_000_000u128)
        );
        assert_eq!(config.dispatch.dedup_ttl, Duration::from_secs(300));
        assert!(config.gas.api_key.is_none());
    }

    #[test]
    fn poll_interval_below_minimum_is_fatal() {
        let mut map = base_map();
        map.insert(keys::ACCOUNT_POLL_INTERVAL_MS, "999".to_string());
        assert!(matches!(
            from_map(&map),
            Err(ConfigError::BelowMinimum { min: 1000, .. })
        ));
    }

    #[test]
    fn pacing_delay_below_minimum_is_fatal() {
        let mut map = base_map();
        map.insert(keys::SEQUENTIAL_TRANSACTION_DELAY_MS, "5".to_string());
        assert!(matches!(
            from_map(&map),
            Err(ConfigError::BelowMinimum { min: 10, .. })
        ));
    }

    #[test]
    fn discount_must_stay_below_one() {
        let mut map = base_map();
        map.insert(keys::MIN_OWED_OUTPUT_AMOUNT_DISCOUNT, "1".to_string());
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));

        map.insert(keys::MIN_OWED_OUTPUT_AMOUNT_DISCOUNT, "0.999".to_string());
        assert!(from_map(&map).is_ok());

        map.insert(keys::MIN_OWED_OUTPUT_AMOUNT_DISCOUNT, "-0.1".to_string());
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let mut map = base_map();
        map.remove(keys::BRIDGE_TOKEN_ADDRESS);
        assert!(matches!(
            from_map(&map),
            Err(ConfigError::Missing(keys::BRIDGE_TOKEN_ADDRESS))
        ));
    }

    #[test]
    fn preference_lists_must_be_non_empty_market_ids() {
        let mut map = base_map();
        map.insert(keys::OWED_PREFERENCES, " , ".to_string());
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));

        map.insert(keys::OWED_PREFERENCES, "1,zzz".to_string());
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn booleans_are_strict() {
        let mut map = base_map();
        map.insert(keys::AUTO_SELL_COLLATERAL, "TRUE".to_string());
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_address_is_rejected() {
        let mut map = base_map();
        map.insert(
            keys::BRIDGE_TOKEN_ADDRESS,
            "0x0000000000000000000000000000000000000000".to_string(),
        );
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn private_key_shape_is_checked() {
        let mut map = base_map();
        map.insert(keys::ACCOUNT_WALLET_PRIVATE_KEY, "0xdeadbeef".to_string());
        assert!(matches!(from_map(&map), Err(ConfigError::Invalid { .. })));
    }
}
