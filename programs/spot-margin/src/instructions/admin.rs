use anchor_lang::prelude::*;

use crate::{
    engine::MarginEngine,
    error::MarginError,
    events::{BadDebtWrittenOff, LiquidityManagerLinked, PoolInitialized},
    interfaces::{Collaborators, RiskPolicy},
    math::Rounding,
    state::LiquidityPoolAccount,
};

impl MarginEngine {
    /// Open a lending book for `pool`, seeded from the AMM's current reserves.
    pub fn initialize_pool(
        &self,
        pool: Pubkey,
        caller: Pubkey,
        now: u64,
        cx: &mut Collaborators<'_>,
    ) -> Result<()> {
        require!(cx.policy.is_admin(&caller), MarginError::NotAuthorized);
        cx.rates.validate()?;
        let _lock = self.lock(pool)?;

        require!(
            !self.store.borrow().pools.contains_key(&pool),
            MarginError::PoolAlreadyInitialized
        );

        let (reserve0, reserve1, total_shares) = cx.amm.reserves_and_shares(&pool)?;
        require!(total_shares > 0, MarginError::InvalidParameter);

        let account = LiquidityPoolAccount::new(pool, total_shares, reserve0, reserve1, now);
        self.commit(account, None);

        emit!(PoolInitialized {
            pool,
            authority: caller,
            total_shares,
            reserve0,
            reserve1,
        });

        Ok(())
    }

    /// Wire the collaborator that receives fee shares and seized collateral.
    pub fn link_liquidity_manager(
        &self,
        caller: Pubkey,
        manager: Pubkey,
        policy: &dyn RiskPolicy,
    ) -> Result<()> {
        require!(policy.is_admin(&caller), MarginError::NotAuthorized);

        let previous = self.store.borrow_mut().liquidity_manager.replace(manager);

        emit!(LiquidityManagerLinked { previous, manager });

        Ok(())
    }

    /// Remove the residual debt of a vault with no collateral left.
    ///
    /// Returns the rented shares taken off the book.
    pub fn write_off_bad_debt(
        &self,
        pool: Pubkey,
        owner: Pubkey,
        caller: Pubkey,
        now: u64,
        cx: &mut Collaborators<'_>,
    ) -> Result<u128> {
        require!(cx.policy.is_admin(&caller), MarginError::NotAuthorized);
        let _lock = self.lock(pool)?;

        let snapshot = self.snapshot(pool, Some(owner))?;
        let mut pool_account = snapshot.pool.clone();
        let mut vault = snapshot.vault.clone().ok_or(MarginError::NoBadDebt)?;
        require!(
            vault.has_debt() && !vault.has_collateral(),
            MarginError::NoBadDebt
        );

        self.accrue(&mut pool_account, cx.rates, cx.policy, now)?;

        let shares = pool_account.debt_value(vault.debt_shares, Rounding::Ceiling)?;
        let removed = shares.min(pool_account.rented_shares);
        pool_account.rented_shares -= removed;
        pool_account.total_shares = pool_account
            .total_shares
            .checked_sub(removed)
            .ok_or(MarginError::MathOverflow)?;
        pool_account.bad_debt_shares = pool_account
            .bad_debt_shares
            .saturating_sub(vault.bad_debt_shares);
        pool_account.written_off_shares = pool_account
            .written_off_shares
            .checked_add(shares)
            .ok_or(MarginError::MathOverflow)?;
        vault.debt_shares = 0;
        vault.bad_debt_shares = 0;

        let written_off_shares = pool_account.written_off_shares;
        self.commit(pool_account, Some(vault));

        msg!("Wrote off {} shares of bad debt for vault {}", shares, owner);
        emit!(BadDebtWrittenOff {
            pool,
            owner,
            shares,
            written_off_shares,
        });

        Ok(shares)
    }
}
