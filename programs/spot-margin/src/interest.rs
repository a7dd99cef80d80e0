use anchor_lang::prelude::*;

use crate::{
    constants::*,
    error::MarginError,
    interfaces::InterestRateStrategy,
    math::{wad_div, wad_mul, Rounding},
};

/// Dual-slope borrow curve with annual rates in WAD.
///
/// - At or below the kink: base_rate + (utilization / optimal) × slope1
/// - Above the kink: base_rate + slope1 + ((utilization - optimal) / (1 - optimal)) × slope2
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct KinkedRateModel {
    pub base_rate: u128,
    pub slope1: u128,
    pub slope2: u128,
    pub optimal_utilization: u128,
    pub max_utilization: u128,
}

impl Default for KinkedRateModel {
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_BASE_RATE,
            slope1: DEFAULT_SLOPE1,
            slope2: DEFAULT_SLOPE2,
            optimal_utilization: DEFAULT_OPTIMAL_UTILIZATION,
            max_utilization: DEFAULT_MAX_UTILIZATION,
        }
    }
}

impl KinkedRateModel {
    /// Annualized borrow rate (WAD) at `utilization`.
    pub fn annual_rate(&self, utilization: u128) -> Result<u128> {
        let utilization = utilization.min(WAD);

        if utilization <= self.optimal_utilization {
            let ratio = wad_div(utilization, self.optimal_utilization, Rounding::Floor)?;
            let variable = wad_mul(ratio, self.slope1, Rounding::Floor)?;
            return self
                .base_rate
                .checked_add(variable)
                .ok_or(MarginError::MathOverflow.into());
        }

        let excess = utilization - self.optimal_utilization;
        let remaining = WAD - self.optimal_utilization;
        let ratio = wad_div(excess, remaining, Rounding::Floor)?;
        let variable = wad_mul(ratio, self.slope2, Rounding::Floor)?;
        self.base_rate
            .checked_add(self.slope1)
            .ok_or(MarginError::MathOverflow)?
            .checked_add(variable)
            .ok_or(MarginError::MathOverflow.into())
    }
}

impl InterestRateStrategy for KinkedRateModel {
    fn borrow_rate(&self, _pool: &Pubkey, utilization: u128) -> Result<u128> {
        let per_second = self.annual_rate(utilization)? / SECONDS_PER_YEAR;
        Ok(per_second.min(MAX_BORROW_RATE_PER_SECOND))
    }

    fn max_utilization_rate(&self) -> u128 {
        self.max_utilization
    }

    fn validate(&self) -> Result<()> {
        require!(
            self.optimal_utilization > 0 && self.optimal_utilization < WAD,
            MarginError::InvalidParameter
        );
        require!(
            self.max_utilization > 0 && self.max_utilization <= MAX_UTILIZATION_CEILING,
            MarginError::InvalidParameter
        );
        Ok(())
    }
}
