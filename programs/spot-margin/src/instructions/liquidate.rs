use anchor_lang::prelude::*;

use crate::{
    constants::WAD,
    engine::MarginEngine,
    error::MarginError,
    events::{BadDebtRecorded, VaultLiquidated},
    interfaces::Collaborators,
    math::{mul_div, value_in_token1, wad_div, wad_mul, Rounding},
    solvency::value_vault,
    state::{LiquidityPoolAccount, Vault},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub seized0: u128,
    pub seized1: u128,
    /// Rented shares removed from the book
    pub repaid_shares: u128,
    pub debt_shares_burned: u128,
    /// Debt left on a vault whose collateral ran out
    pub shortfall_shares: u128,
}

impl MarginEngine {
    /// Close out (part of) an under-water vault.
    ///
    /// `repay_shares` caps the debt taken over, in rented shares; `None`
    /// takes all of it. Collateral worth the repaid debt plus the
    /// liquidation bonus is seized and handed to protocol-owned liquidity.
    pub fn liquidate(
        &self,
        pool: Pubkey,
        owner: Pubkey,
        liquidator: Pubkey,
        repay_shares: Option<u128>,
        now: u64,
        cx: &mut Collaborators<'_>,
    ) -> Result<LiquidationOutcome> {
        let _lock = self.lock(pool)?;

        require!(!cx.policy.is_paused(&pool), MarginError::PoolPaused);
        self.require_liquidity_manager(&*cx.liquidity)?;

        let snapshot = self.snapshot(pool, Some(owner))?;
        let mut pool_account = snapshot.pool.clone();
        let mut vault = snapshot
            .vault
            .clone()
            .ok_or(MarginError::NotLiquidatable)?;

        self.accrue(&mut pool_account, cx.rates, cx.policy, now)?;

        let price = cx.oracle.price(&pool)?;
        let outcome = seize(
            &mut pool_account,
            &mut vault,
            price,
            cx.policy.max_ltv(&pool),
            cx.policy.liquidation_bonus(&pool),
            repay_shares,
        )?;

        self.commit(pool_account.clone(), Some(vault));

        if let Err(err) = cx.liquidity.deposit_into_protocol_owned_liquidity(
            &pool,
            outcome.seized0,
            outcome.seized1,
        ) {
            msg!("Protocol-owned liquidity deposit failed, restoring pool {}", pool);
            self.restore(snapshot);
            return Err(err);
        }

        msg!(
            "Liquidated vault {}: repaid {} shares, seized {}/{}",
            owner,
            outcome.repaid_shares,
            outcome.seized0,
            outcome.seized1
        );
        emit!(VaultLiquidated {
            pool,
            owner,
            liquidator,
            seized0: outcome.seized0,
            seized1: outcome.seized1,
            repaid_shares: outcome.repaid_shares,
            debt_shares_burned: outcome.debt_shares_burned,
        });

        if outcome.shortfall_shares > 0 {
            msg!(
                "Vault {} left {} shares of bad debt",
                owner,
                outcome.shortfall_shares
            );
            emit!(BadDebtRecorded {
                pool,
                owner,
                shortfall_shares: outcome.shortfall_shares,
                pool_bad_debt_shares: pool_account.bad_debt_shares,
            });
        }

        Ok(outcome)
    }
}

/// Liquidation bookkeeping on working copies; no external effects.
pub(crate) fn seize(
    pool: &mut LiquidityPoolAccount,
    vault: &mut Vault,
    price: u128,
    max_ltv: u128,
    liquidation_bonus: u128,
    repay_shares: Option<u128>,
) -> Result<LiquidationOutcome> {
    let valuation = value_vault(vault, pool, price)?;
    require!(
        valuation.ltv()?.exceeds(max_ltv),
        MarginError::NotLiquidatable
    );
    // Zero collateral with debt is a write-off, not a liquidation
    require!(vault.has_collateral(), MarginError::NotLiquidatable);

    let owed = valuation.debt_rented_shares;
    let target = repay_shares.unwrap_or(owed).min(owed);
    require!(target > 0, MarginError::InvalidParameter);

    let target_value = if target == owed {
        valuation.debt_value
    } else {
        let (debt0, debt1) = pool.share_amounts(target, Rounding::Ceiling)?;
        value_in_token1(debt0, debt1, price, Rounding::Ceiling)?
    };
    let bonus_factor = WAD
        .checked_add(liquidation_bonus)
        .ok_or(MarginError::MathOverflow)?;
    let seize_value = wad_mul(target_value, bonus_factor, Rounding::Ceiling)?;

    let (seized0, seized1, repaid) = if seize_value >= valuation.collateral_value {
        // Everything goes; only the part it covers comes off the debt
        let covered_value = wad_div(valuation.collateral_value, bonus_factor, Rounding::Floor)?;
        let repaid = if covered_value >= target_value {
            target
        } else {
            mul_div(target, covered_value, target_value, Rounding::Floor)?
        };
        (vault.collateral0, vault.collateral1, repaid)
    } else {
        let seized0 = mul_div(
            vault.collateral0,
            seize_value,
            valuation.collateral_value,
            Rounding::Floor,
        )?;
        let seized1 = mul_div(
            vault.collateral1,
            seize_value,
            valuation.collateral_value,
            Rounding::Floor,
        )?;
        (seized0, seized1, target)
    };

    let burned = if repaid == owed {
        vault.debt_shares
    } else {
        pool.to_debt_shares(repaid, Rounding::Floor)?
            .min(vault.debt_shares)
    };

    vault.collateral0 -= seized0;
    vault.collateral1 -= seized1;
    vault.debt_shares -= burned;

    let removed = repaid.min(pool.rented_shares);
    pool.rented_shares -= removed;
    pool.total_shares = pool
        .total_shares
        .checked_sub(removed)
        .ok_or(MarginError::MathOverflow)?;

    let shortfall_shares = pool.reconcile_bad_debt(vault)?;

    Ok(LiquidationOutcome {
        seized0,
        seized1,
        repaid_shares: repaid,
        debt_shares_burned: burned,
        shortfall_shares,
    })
}
