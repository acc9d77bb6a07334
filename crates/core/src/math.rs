//! Signed fixed-point arithmetic for risk evaluation.
//!
//! All rounding in the collateralization path is floor (toward negative
//! infinity), biasing conservatively against the liquidator. `I256`
//! division truncates toward zero, so the helpers here correct the
//! quotient explicitly.

use alloy::primitives::{I256, U256};

pub use liquidator_api::decimal::BASE;

/// `BASE` as a signed value.
pub const BASE_SIGNED: I256 = I256::from_raw(BASE);

/// Floor division: rounds toward negative infinity for mixed-sign operands.
#[inline]
pub fn floor_div(a: I256, b: I256) -> I256 {
    let q = a / b;
    let r = a % b;
    if !r.is_zero() && (a.is_negative() != b.is_negative()) {
        q - I256::ONE
    } else {
        q
    }
}

fn signed(value: U256) -> I256 {
    // Premiums and prices are protocol-bounded far below i256::MAX.
    I256::try_from(value).unwrap_or(I256::MAX)
}

/// Weight a borrow value up by its market premium:
/// `floor(value * (base + premium) / base)`.
#[inline]
pub fn scale_up_floor(value: I256, premium: U256) -> I256 {
    floor_div(value * (BASE_SIGNED + signed(premium)), BASE_SIGNED)
}

/// Weight a supply value down by its market premium:
/// `floor(value * base / (base + premium))`.
#[inline]
pub fn scale_down_floor(value: I256, premium: U256) -> I256 {
    floor_div(value * BASE_SIGNED, BASE_SIGNED + signed(premium))
}

/// Collateralization ratio: `floor(supply_total * base / |borrow_total|)`,
/// 1e18-scaled. `borrow_total` must be non-zero and `supply_total`
/// non-negative (guaranteed by construction in the evaluator).
#[inline]
pub fn collateralization_ratio(supply_total: I256, borrow_total: I256) -> U256 {
    (supply_total.unsigned_abs() * BASE) / borrow_total.unsigned_abs()
}

/// Apply a sale discount: `floor(amount * (base - discount) / base)`.
/// `discount` is 1e18-scaled and validated to lie in `[0, base)` at
/// configuration time.
#[inline]
pub fn discounted_floor(amount: U256, discount: U256) -> U256 {
    (amount * (BASE - discount)) / BASE
}
