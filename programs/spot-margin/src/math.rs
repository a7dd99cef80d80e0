use alloy_primitives::U256;
use anchor_lang::prelude::*;

use crate::{constants::WAD, error::MarginError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rounding {
    Floor,
    Ceiling,
}

/// Full-precision multiply-then-divide with configurable rounding.
///
/// Computes: (value × numerator) / denominator
/// The product is widened to 256 bits so it can never overflow; only the
/// final quotient is narrowed back, and a quotient above `u128::MAX` is an error.
pub fn mul_div(value: u128, numerator: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    require!(denominator > 0, MarginError::DivisionByZero);

    let product = U256::from(value) * U256::from(numerator);
    let denom = U256::from(denominator);

    let mut quotient = product / denom;
    if rounding == Rounding::Ceiling && !(product % denom).is_zero() {
        quotient += U256::from(1u8);
    }

    u128::try_from(quotient).map_err(|_| error!(MarginError::MathOverflow))
}

/// Multiply two WAD values: (a × b) / WAD
pub fn wad_mul(a: u128, b: u128, rounding: Rounding) -> Result<u128> {
    mul_div(a, b, WAD, rounding)
}

/// Divide two WAD values: (a × WAD) / b
pub fn wad_div(a: u128, b: u128, rounding: Rounding) -> Result<u128> {
    mul_div(a, WAD, b, rounding)
}

/// Convert pool shares into the token amounts they represent.
///
/// Formula: amount_i = shares × reserve_i / idle_shares
///
/// Floor when the pool pays out, ceiling when the pool is paid.
pub fn shares_to_amounts(
    shares: u128,
    reserve0: u128,
    reserve1: u128,
    idle_shares: u128,
    rounding: Rounding,
) -> Result<(u128, u128)> {
    if shares == 0 {
        return Ok((0, 0));
    }
    require!(idle_shares > 0, MarginError::InsufficientLiquidity);

    let amount0 = mul_div(shares, reserve0, idle_shares, rounding)?;
    let amount1 = mul_div(shares, reserve1, idle_shares, rounding)?;
    Ok((amount0, amount1))
}

/// Value of a token pair in token1 units, `price` being token1 per token0 (WAD).
pub fn value_in_token1(amount0: u128, amount1: u128, price: u128, rounding: Rounding) -> Result<u128> {
    wad_mul(amount0, price, rounding)?
        .checked_add(amount1)
        .ok_or(MarginError::MathOverflow.into())
}
