use anchor_lang::prelude::*;

use crate::{
    constants::{POOL_SEED, VAULT_SEED, WAD},
    error::MarginError,
    math::{mul_div, shares_to_amounts, Rounding},
};

/// One side of the pool's token pair.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Asset {
    Token0,
    Token1,
}

/// Lending book for one AMM pool. Shared by every vault of that pool.
#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LiquidityPoolAccount {
    /// AMM pool this book lends shares of
    pub pool: Pubkey,
    /// LP shares tracked by the engine, idle plus rented
    pub total_shares: u128,
    /// Idle token0 backing the non-rented shares
    pub reserve0: u128,
    /// Idle token1 backing the non-rented shares
    pub reserve1: u128,
    /// Shares currently lent out, interest included
    pub rented_shares: u128,
    /// Cumulative interest index (WAD), starts at 1.0 and never decreases
    pub interest_multiplier: u128,
    /// Protocol cut of accrued interest awaiting reinvestment (rented-share units)
    pub accumulated_fee_shares: u128,
    pub last_accrual_timestamp: u64,
    /// Liquidation shortfall reported and still carried by vaults
    pub bad_debt_shares: u128,
    /// Debt removed from the book by write-off
    pub written_off_shares: u128,
    /// Reserved for future upgrades
    pub _reserved: [u8; 32],
}

impl LiquidityPoolAccount {
    pub const LEN: usize = 8 + // discriminator
        32 +  // pool
        16 +  // total_shares
        16 +  // reserve0
        16 +  // reserve1
        16 +  // rented_shares
        16 +  // interest_multiplier
        16 +  // accumulated_fee_shares
        8 +   // last_accrual_timestamp
        16 +  // bad_debt_shares
        16 +  // written_off_shares
        32; // _reserved

    pub const SEED_PREFIX: &'static [u8] = POOL_SEED;

    pub fn new(pool: Pubkey, total_shares: u128, reserve0: u128, reserve1: u128, now: u64) -> Self {
        Self {
            pool,
            total_shares,
            reserve0,
            reserve1,
            interest_multiplier: WAD,
            last_accrual_timestamp: now,
            ..Self::default()
        }
    }

    /// Shares still sitting in the pool, backing `reserve0`/`reserve1`.
    pub fn idle_shares(&self) -> Result<u128> {
        self.total_shares
            .checked_sub(self.rented_shares)
            .ok_or(MarginError::MathOverflow.into())
    }

    /// rented / total (WAD), zero for an empty pool.
    pub fn utilization(&self) -> Result<u128> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        mul_div(self.rented_shares, WAD, self.total_shares, Rounding::Floor)
    }

    /// Current rented-share value of normalized debt shares.
    pub fn debt_value(&self, debt_shares: u128, rounding: Rounding) -> Result<u128> {
        mul_div(debt_shares, self.interest_multiplier, WAD, rounding)
    }

    /// Normalized debt shares for a rented-share amount at the current multiplier.
    pub fn to_debt_shares(&self, shares: u128, rounding: Rounding) -> Result<u128> {
        mul_div(shares, WAD, self.interest_multiplier, rounding)
    }

    /// Token amounts represented by `shares` at the idle reserve ratio.
    pub fn share_amounts(&self, shares: u128, rounding: Rounding) -> Result<(u128, u128)> {
        shares_to_amounts(
            shares,
            self.reserve0,
            self.reserve1,
            self.idle_shares()?,
            rounding,
        )
    }

    /// Re-measure the shortfall `vault` carries and move the pool total with it.
    ///
    /// A vault carries bad debt while it owes shares and holds no collateral.
    /// Returns the vault's shortfall after the update.
    pub fn reconcile_bad_debt(&mut self, vault: &mut Vault) -> Result<u128> {
        let shortfall = if vault.has_debt() && !vault.has_collateral() {
            self.debt_value(vault.debt_shares, Rounding::Ceiling)?
        } else {
            0
        };
        self.bad_debt_shares = self
            .bad_debt_shares
            .saturating_sub(vault.bad_debt_shares)
            .checked_add(shortfall)
            .ok_or(MarginError::MathOverflow)?;
        vault.bad_debt_shares = shortfall;
        Ok(shortfall)
    }
}

/// Collateral and debt of one account in one pool.
#[account]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Vault {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub collateral0: u128,
    pub collateral1: u128,
    /// Debt normalized by the interest multiplier at borrow time
    pub debt_shares: u128,
    /// Shortfall this vault contributes to the pool's `bad_debt_shares`
    pub bad_debt_shares: u128,
    /// Reserved for future upgrades
    pub _reserved: [u8; 32],
}

impl Vault {
    pub const LEN: usize = 8 + // discriminator
        32 +  // owner
        32 +  // pool
        16 +  // collateral0
        16 +  // collateral1
        16 +  // debt_shares
        16 +  // bad_debt_shares
        32; // _reserved

    pub const SEED_PREFIX: &'static [u8] = VAULT_SEED;

    pub fn new(pool: Pubkey, owner: Pubkey) -> Self {
        Self {
            owner,
            pool,
            ..Self::default()
        }
    }

    pub fn collateral(&self, asset: Asset) -> u128 {
        match asset {
            Asset::Token0 => self.collateral0,
            Asset::Token1 => self.collateral1,
        }
    }

    pub fn credit(&mut self, asset: Asset, amount: u128) -> Result<()> {
        let balance = match asset {
            Asset::Token0 => &mut self.collateral0,
            Asset::Token1 => &mut self.collateral1,
        };
        *balance = balance
            .checked_add(amount)
            .ok_or(MarginError::MathOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, asset: Asset, amount: u128) -> Result<()> {
        let balance = match asset {
            Asset::Token0 => &mut self.collateral0,
            Asset::Token1 => &mut self.collateral1,
        };
        *balance = balance
            .checked_sub(amount)
            .ok_or(MarginError::InsufficientCollateral)?;
        Ok(())
    }

    pub fn has_debt(&self) -> bool {
        self.debt_shares > 0
    }

    pub fn has_collateral(&self) -> bool {
        self.collateral0 > 0 || self.collateral1 > 0
    }
}
