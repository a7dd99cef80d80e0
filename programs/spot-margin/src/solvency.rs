use anchor_lang::prelude::*;

use crate::{
    math::{value_in_token1, wad_div, Rounding},
    state::{LiquidityPoolAccount, Vault},
};

/// Loan-to-value of a vault (WAD).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ltv {
    Finite(u128),
    /// Debt outstanding against zero collateral value
    Infinite,
}

impl Ltv {
    pub fn exceeds(&self, max_ltv: u128) -> bool {
        match self {
            Ltv::Finite(ratio) => *ratio > max_ltv,
            Ltv::Infinite => true,
        }
    }
}

/// Collateral and debt of a vault, both in token1 units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Valuation {
    pub collateral_value: u128,
    pub debt_value: u128,
    /// Current debt expressed in rented shares
    pub debt_rented_shares: u128,
}

impl Valuation {
    pub fn ltv(&self) -> Result<Ltv> {
        if self.debt_value == 0 {
            return Ok(Ltv::Finite(0));
        }
        if self.collateral_value == 0 {
            return Ok(Ltv::Infinite);
        }
        Ok(Ltv::Finite(wad_div(
            self.debt_value,
            self.collateral_value,
            Rounding::Ceiling,
        )?))
    }
}

/// Value a vault at `price` (token1 per token0, WAD).
///
/// Debt rounds up and collateral rounds down, so the pool never
/// overestimates a borrower's health.
pub fn value_vault(vault: &Vault, pool: &LiquidityPoolAccount, price: u128) -> Result<Valuation> {
    let collateral_value = value_in_token1(
        vault.collateral0,
        vault.collateral1,
        price,
        Rounding::Floor,
    )?;

    let debt_rented_shares = pool.debt_value(vault.debt_shares, Rounding::Ceiling)?;
    let debt_value = if debt_rented_shares == 0 {
        0
    } else {
        let (debt0, debt1) = pool.share_amounts(debt_rented_shares, Rounding::Ceiling)?;
        value_in_token1(debt0, debt1, price, Rounding::Ceiling)?
    };

    Ok(Valuation {
        collateral_value,
        debt_value,
        debt_rented_shares,
    })
}

pub fn compute_ltv(vault: &Vault, pool: &LiquidityPoolAccount, price: u128) -> Result<Ltv> {
    value_vault(vault, pool, price)?.ltv()
}
