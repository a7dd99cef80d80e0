use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_BORROW_RATE_PER_SECOND, WAD},
    error::MarginError,
    interfaces::InterestRateStrategy,
    math::{mul_div, wad_mul, Rounding},
    state::LiquidityPoolAccount,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccrualOutcome {
    pub elapsed: u64,
    pub utilization: u128,
    pub rate_per_second: u128,
    pub previous_multiplier: u128,
    pub interest_multiplier: u128,
    pub interest_shares: u128,
    pub protocol_fee_shares: u128,
}

/// Advance the pool's interest multiplier and fee accumulator to `now`.
///
/// Interest is linear per second between calls:
///   multiplier' = multiplier × (1 + rate × elapsed)
/// and is compounded only at each call. Accrued interest is added to both
/// `rented_shares` and `total_shares`, so idle share value does not move.
///
/// Returns `None` when no time has passed. On error the pool is untouched.
pub fn accrue_interest(
    pool: &mut LiquidityPoolAccount,
    rates: &dyn InterestRateStrategy,
    protocol_fee_percentage: u128,
    now: u64,
) -> Result<Option<AccrualOutcome>> {
    if now <= pool.last_accrual_timestamp {
        return Ok(None);
    }
    require!(protocol_fee_percentage <= WAD, MarginError::InvalidParameter);

    let elapsed = now - pool.last_accrual_timestamp;
    let utilization = pool.utilization()?;
    let rate_per_second = rates
        .borrow_rate(&pool.pool, utilization)?
        .min(MAX_BORROW_RATE_PER_SECOND);

    let growth = rate_per_second
        .checked_mul(elapsed as u128)
        .ok_or(MarginError::MathOverflow)?;
    let factor = WAD.checked_add(growth).ok_or(MarginError::MathOverflow)?;

    let previous_multiplier = pool.interest_multiplier;
    let interest_multiplier = wad_mul(previous_multiplier, factor, Rounding::Floor)?;

    let interest_shares = mul_div(
        pool.rented_shares,
        interest_multiplier - previous_multiplier,
        previous_multiplier,
        Rounding::Floor,
    )?;
    let protocol_fee_shares = wad_mul(interest_shares, protocol_fee_percentage, Rounding::Floor)?;

    let rented_shares = pool
        .rented_shares
        .checked_add(interest_shares)
        .ok_or(MarginError::MathOverflow)?;
    let total_shares = pool
        .total_shares
        .checked_add(interest_shares)
        .ok_or(MarginError::MathOverflow)?;
    let accumulated_fee_shares = pool
        .accumulated_fee_shares
        .checked_add(protocol_fee_shares)
        .ok_or(MarginError::MathOverflow)?;

    pool.interest_multiplier = interest_multiplier;
    pool.rented_shares = rented_shares;
    pool.total_shares = total_shares;
    pool.accumulated_fee_shares = accumulated_fee_shares;
    pool.last_accrual_timestamp = now;

    Ok(Some(AccrualOutcome {
        elapsed,
        utilization,
        rate_per_second,
        previous_multiplier,
        interest_multiplier,
        interest_shares,
        protocol_fee_shares,
    }))
}
