//! Fixed-point decoding helpers for provider responses.
//!
//! The subgraph serves decimal strings ("1.15", "-0.000021"); the protocol
//! works in scaled integers. These helpers convert between the two and
//! apply interest indexes with the protocol's half-up rounding.

use alloy::primitives::{I256, U256};

/// 1e18 scaling base shared by prices, premiums, ratios and indexes.
pub const BASE: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// Parse a signed decimal string into an integer scaled by `10^decimals`.
///
/// Fractional digits beyond `decimals` are dropped (the provider never
/// serves more precision than the token carries).
pub fn parse_decimal_scaled(value: &str, decimals: u32) -> Result<I256, String> {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(format!("empty decimal value {value:?}"));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(format!("non-numeric decimal value {value:?}"));
    }

    let mut frac: String = frac_part.chars().take(decimals as usize).collect();
    while frac.len() < decimals as usize {
        frac.push('0');
    }

    let combined = format!("{int_part}{frac}");
    let magnitude = U256::from_str_radix(combined.trim_start_matches('0'), 10)
        .or_else(|e| {
            if combined.chars().all(|c| c == '0') {
                Ok(U256::ZERO)
            } else {
                Err(e)
            }
        })
        .map_err(|e| format!("decimal {value:?} out of range: {e}"))?;

    let signed =
        I256::try_from(magnitude).map_err(|_| format!("decimal {value:?} overflows i256"))?;
    Ok(if negative { -signed } else { signed })
}

/// Parse an unsigned decimal string into an integer scaled by `10^decimals`.
pub fn parse_unsigned_decimal_scaled(value: &str, decimals: u32) -> Result<U256, String> {
    let signed = parse_decimal_scaled(value, decimals)?;
    if signed.is_negative() {
        return Err(format!("expected unsigned decimal, got {value:?}"));
    }
    Ok(signed.unsigned_abs())
}

/// Signed division rounding half away from zero.
fn div_round_half_up(a: I256, b: I256) -> I256 {
    let q = a / b;
    let r = a % b;
    if r.unsigned_abs() * U256::from(2u8) >= b.unsigned_abs() {
        if a.is_negative() == b.is_negative() {
            q + I256::ONE
        } else {
            q - I256::ONE
        }
    } else {
        q
    }
}

/// Index-adjust a `par` amount: `par * index / 1e18`, rounded half up.
pub fn apply_index(par: I256, index: U256) -> I256 {
    // Interest indexes are protocol-bounded far below i256::MAX.
    let index = I256::try_from(index).unwrap_or(I256::MAX);
    div_round_half_up(par * index, I256::from_raw(BASE))
}
