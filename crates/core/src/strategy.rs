//! Settlement strategy selection and parameter construction.
//!
//! Two mutually exclusive strategies, chosen by configuration: the
//! preference-order strategy defers market selection to the settlement
//! system, the auto-sell strategy picks the owed/held pair itself and
//! routes the seized collateral through the bridge token.

use std::collections::BTreeMap;

use alloy::primitives::{Address, I256, U256};
use tracing::info;

use liquidator_api::{ApiAccount, ApiBalance, ApiMarket, BlockRef, MarketId};
use liquidator_chain::{
    ExpiredMarket, ExpiryDispatch, LiquidationDispatch, PriceTerms, SaleDispatch,
    SettlementClient, TxHandle,
};

use crate::config::LiquidatorConfig;
use crate::error::EngineError;
use crate::health::is_expired;
use crate::math;

/// Liquidate an undercollateralized account.
///
/// The authoritative on-protocol check runs first and wins over locally
/// computed state: a `false` answer skips the account without error.
pub(crate) async fn liquidate_account(
    settlement: &dyn SettlementClient,
    config: &LiquidatorConfig,
    account: &ApiAccount,
    block: BlockRef,
    gas: PriceTerms,
) -> Result<Option<TxHandle>, EngineError> {
    info!(account = %account.id, "starting account liquidation");

    let liquidatable = settlement
        .is_account_liquidatable(&account.id, block.number)
        .await
        .map_err(|source| EngineError::Dispatch {
            account: account.id,
            source,
        })?;
    if !liquidatable {
        info!(account = %account.id, "account is not liquidatable");
        return Ok(None);
    }

    if account.borrow_markets().is_empty() {
        return Err(EngineError::NoBorrows {
            account: account.id,
        });
    }
    if account.supply_markets().is_empty() {
        return Err(EngineError::NoCollateral {
            account: account.id,
        });
    }

    let cfg = &config.dispatch;
    let dispatched = if cfg.auto_sell {
        let owed = account.first_borrow().ok_or(EngineError::NoBorrows {
            account: account.id,
        })?;
        let held = account.first_supply().ok_or(EngineError::NoCollateral {
            account: account.id,
        })?;

        settlement
            .liquidate_with_sale(SaleDispatch {
                liquidator_owner: config.wallet.address,
                liquidator_number: config.wallet.account_number,
                liquid_account: account.id,
                owed_market: owed.market_id,
                held_market: held.market_id,
                token_path: token_path(held.token_address, owed.token_address, cfg.bridge_token),
                expiry: None,
                min_owed_output: min_owed_output(owed.wei, cfg.min_owed_output_discount),
                revert_on_fail_to_sell: cfg.revert_on_fail_to_sell,
                gas,
            })
            .await
    } else {
        settlement
            .liquidate(LiquidationDispatch {
                liquidator_owner: config.wallet.address,
                liquidator_number: config.wallet.account_number,
                liquid_account: account.id,
                min_collateralization: cfg.min_collateralization,
                min_overhead_value: cfg.min_overhead_value,
                owed_preferences: cfg.owed_preferences.clone(),
                collateral_preferences: cfg.collateral_preferences.clone(),
                gas,
            })
            .await
    };

    dispatched
        .map(Some)
        .map_err(|source| EngineError::Dispatch {
            account: account.id,
            source,
        })
}

/// Close the expired balances of an account.
///
/// Under the preference-order strategy every balance past its delay is
/// batched into one settlement call; under auto-sell the first expired
/// borrow is settled against the first held balance.
pub(crate) async fn settle_expired_account(
    settlement: &dyn SettlementClient,
    config: &LiquidatorConfig,
    account: &ApiAccount,
    markets: &BTreeMap<MarketId, ApiMarket>,
    block: BlockRef,
    gas: PriceTerms,
) -> Result<TxHandle, EngineError> {
    info!(account = %account.id, "starting account expiry settlement");

    let cfg = &config.dispatch;
    let dispatched = if cfg.auto_sell {
        let owed = first_expired_borrow(account, block.timestamp, cfg.expiry_delay_secs).ok_or(
            EngineError::NothingExpired {
                account: account.id,
            },
        )?;
        let Some(expires_at) = owed.expires_at else {
            return Err(EngineError::NothingExpired {
                account: account.id,
            });
        };
        if owed.expiry_ref != Some(config.contracts.expiry) {
            return Err(EngineError::ExpiryRefMismatch {
                account: account.id,
                market: owed.market_id,
            });
        }
        let held = account.first_supply().ok_or(EngineError::NoCollateral {
            account: account.id,
        })?;

        settlement
            .liquidate_with_sale(SaleDispatch {
                liquidator_owner: config.wallet.address,
                liquidator_number: config.wallet.account_number,
                liquid_account: account.id,
                owed_market: owed.market_id,
                held_market: held.market_id,
                token_path: token_path(held.token_address, owed.token_address, cfg.bridge_token),
                expiry: Some(expires_at),
                min_owed_output: min_owed_output(owed.wei, cfg.min_owed_output_discount),
                revert_on_fail_to_sell: cfg.revert_on_fail_to_sell,
                gas,
            })
            .await
    } else {
        // Per-market context for every configured preference market, in
        // preference order.
        let mut weis = Vec::with_capacity(cfg.collateral_preferences.len());
        let mut prices = Vec::with_capacity(cfg.collateral_preferences.len());
        let mut reward_premiums = Vec::with_capacity(cfg.collateral_preferences.len());
        for market_id in &cfg.collateral_preferences {
            let market = markets.get(market_id).ok_or(EngineError::UnknownMarket {
                account: account.id,
                market: *market_id,
            })?;
            weis.push(
                account
                    .balances
                    .get(market_id)
                    .map(|b| b.wei)
                    .unwrap_or(I256::ZERO),
            );
            prices.push(market.oracle_price);
            reward_premiums.push(market.liquidation_reward_premium);
        }

        let expired_markets: Vec<ExpiredMarket> = account
            .balances
            .values()
            .filter(|b| b.par.is_negative())
            .filter(|b| is_expired(b.expires_at, block.timestamp, cfg.expiry_delay_secs))
            .map(|b| ExpiredMarket {
                market_id: b.market_id,
                // is_expired only passes on a present, non-zero timestamp
                expires_at: b.expires_at.unwrap_or_default(),
            })
            .collect();

        if expired_markets.is_empty() {
            return Err(EngineError::NothingExpired {
                account: account.id,
            });
        }

        settlement
            .settle_expirations(ExpiryDispatch {
                liquidator_owner: config.wallet.address,
                liquidator_number: config.wallet.account_number,
                liquid_account: account.id,
                expired_markets,
                block_timestamp: block.timestamp,
                weis,
                prices,
                reward_premiums,
                collateral_preferences: cfg.collateral_preferences.clone(),
                gas,
            })
            .await
    };

    dispatched.map_err(|source| EngineError::Dispatch {
        account: account.id,
        source,
    })
}

fn first_expired_borrow(
    account: &ApiAccount,
    block_timestamp: u64,
    delay_secs: u64,
) -> Option<&ApiBalance> {
    account
        .balances
        .values()
        .find(|b| b.is_borrow() && is_expired(b.expires_at, block_timestamp, delay_secs))
}

/// Sale path from held token to owed token, hopping through the bridge
/// token unless either endpoint already is the bridge.
fn token_path(held: Address, owed: Address, bridge: Address) -> Vec<Address> {
    if held == bridge || owed == bridge {
        vec![held, owed]
    } else {
        vec![held, bridge, owed]
    }
}

/// Floor of `|owed_wei| * (1 - discount)`.
fn min_owed_output(owed_wei: I256, discount: U256) -> U256 {
    math::discounted_floor(owed_wei.unsigned_abs(), discount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_collapses_when_an_endpoint_is_the_bridge() {
        let held = Address::repeat_byte(1);
        let owed = Address::repeat_byte(2);
        let bridge = Address::repeat_byte(3);

        assert_eq!(token_path(held, owed, bridge), vec![held, bridge, owed]);
        assert_eq!(token_path(held, owed, held), vec![held, owed]);
        assert_eq!(token_path(held, owed, owed), vec![held, owed]);
    }

    #[test]
    fn min_owed_output_uses_absolute_wei() {
        let discount = U256::from(50_000_000_000_000_000u128); // 0.05
        let owed = I256::try_from(-31_147i64).unwrap();
        assert_eq!(min_owed_output(owed, discount), U256::from(29_589u64));
    }
}
