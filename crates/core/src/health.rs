//! Collateralization and expiry evaluation.

use std::collections::BTreeMap;

use alloy::primitives::I256;

use liquidator_api::{ApiAccount, ApiMarket, ApiRiskParam, MarketId};

use crate::error::EngineError;
use crate::math;

/// Whether an account is safely collateralized against the protocol's
/// liquidation ratio.
///
/// Each balance is valued at its market's oracle price; borrows are
/// weighted up by the per-market margin premium, supplies weighted down by
/// the same premium, all intermediate results floored. The final ratio
/// `floor(supply_total * base / |borrow_total|)` is compared against
/// `liquidation_ratio`; an account sitting exactly on the ratio is still
/// safe.
///
/// An account with no borrow value is degenerate (it should never be
/// offered to this check) and is reported as safe so it can never be
/// selected for liquidation.
pub fn is_collateralized(
    account: &ApiAccount,
    markets: &BTreeMap<MarketId, ApiMarket>,
    risk_params: &ApiRiskParam,
) -> Result<bool, EngineError> {
    let mut borrow_total = I256::ZERO;
    let mut supply_total = I256::ZERO;

    for balance in account.balances.values() {
        let market = markets
            .get(&balance.market_id)
            .ok_or(EngineError::UnknownMarket {
                account: account.id,
                market: balance.market_id,
            })?;

        let value = balance.wei * I256::from_raw(market.oracle_price);
        if balance.wei.is_negative() {
            borrow_total += math::scale_up_floor(value, market.margin_premium);
        } else {
            supply_total += math::scale_down_floor(value, market.margin_premium);
        }
    }

    if borrow_total.is_zero() {
        return Ok(true);
    }

    let ratio = math::collateralization_ratio(supply_total, borrow_total);
    Ok(ratio >= risk_params.liquidation_ratio)
}

/// Whether a timed obligation is past its grace delay at the reference
/// block: `expires_at + delay <= block_timestamp`. An absent (or zero,
/// normalized to absent) expiration never expires.
pub fn is_expired(expires_at: Option<u64>, block_timestamp: u64, delay_secs: u64) -> bool {
    match expires_at {
        Some(expires_at) if expires_at != 0 => {
            expires_at.saturating_add(delay_secs) <= block_timestamp
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use liquidator_api::{AccountId, ApiBalance};
    use std::collections::BTreeMap;

    fn market(id: u64, price: u128, premium: u128) -> ApiMarket {
        ApiMarket {
            id: MarketId(id),
            token_address: Address::repeat_byte(0x10 + id as u8),
            oracle_price: U256::from(price),
            margin_premium: U256::from(premium),
            liquidation_reward_premium: U256::ZERO,
            borrow_index: math::BASE,
            supply_index: math::BASE,
        }
    }

    fn account(balances: Vec<(u64, i128)>) -> ApiAccount {
        let balances = balances
            .into_iter()
            .map(|(id, wei)| {
                let wei = I256::try_from(wei).unwrap();
                (
                    MarketId(id),
                    ApiBalance {
                        market_id: MarketId(id),
                        token_address: Address::repeat_byte(0x10 + id as u8),
                        par: wei,
                        wei,
                        expires_at: None,
                        expiry_ref: None,
                    },
                )
            })
            .collect();
        ApiAccount {
            id: AccountId::new(Address::repeat_byte(0xAA), U256::ZERO),
            balances,
        }
    }

    fn risk(ratio: U256) -> ApiRiskParam {
        ApiRiskParam {
            margin_contract: Address::ZERO,
            liquidation_ratio: ratio,
            liquidation_reward: U256::from(1_050_000_000_000_000_000u128),
        }
    }

    const PRICE: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn ratio_exactly_on_threshold_is_safe() {
        // supply 200, borrow -100, unit price, no premium: ratio = 2.0
        let markets: BTreeMap<_, _> = [market(0, PRICE, 0), market(1, PRICE, 0)]
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let account = account(vec![(0, 200), (1, -100)]);

        let two = U256::from(2_000_000_000_000_000_000u128);
        assert!(is_collateralized(&account, &markets, &risk(two)).unwrap());

        // One unit above the computed ratio tips it into liquidatable.
        assert!(!is_collateralized(&account, &markets, &risk(two + U256::from(1u8))).unwrap());
    }

    #[test]
    fn margin_premium_requires_more_collateral() {
        // Without premium the account sits exactly at 2.0; a premium on the
        // borrow market weights the debt up and drops it below threshold.
        let two = U256::from(2_000_000_000_000_000_000u128);
        let premium = 100_000_000_000_000_000u128; // 0.1

        let markets: BTreeMap<_, _> = [market(0, PRICE, 0), market(1, PRICE, premium)]
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let account = account(vec![(0, 200), (1, -100)]);

        assert!(!is_collateralized(&account, &markets, &risk(two)).unwrap());
    }

    #[test]
    fn no_borrows_reads_as_safe() {
        let markets: BTreeMap<_, _> = [market(0, PRICE, 0)]
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let account = account(vec![(0, 200)]);
        assert!(is_collateralized(&account, &markets, &risk(U256::from(1u8))).unwrap());
    }

    #[test]
    fn missing_market_is_an_inconsistency() {
        let markets = BTreeMap::new();
        let account = account(vec![(0, -100)]);
        let err = is_collateralized(&account, &markets, &risk(U256::ZERO)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownMarket { .. }));
    }

    #[test]
    fn expiry_respects_the_grace_delay() {
        assert!(is_expired(Some(1000), 1300, 300));
        assert!(!is_expired(Some(1001), 1300, 300));
        assert!(is_expired(Some(1000), 1301, 300));
    }

    #[test]
    fn absent_or_zero_expiration_never_expires() {
        assert!(!is_expired(None, u64::MAX, 0));
        assert!(!is_expired(Some(0), u64::MAX, 0));
    }
}
