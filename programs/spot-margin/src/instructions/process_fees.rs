use anchor_lang::prelude::*;

use crate::{
    engine::MarginEngine, error::MarginError, events::InterestFeesProcessed,
    interfaces::Collaborators,
};

impl MarginEngine {
    /// Hand the pool's accumulated protocol fee shares to the liquidity manager.
    ///
    /// Returns true on success, including when there was nothing to hand over.
    pub fn trigger_interest_fee_processing(
        &self,
        pool: Pubkey,
        caller: Pubkey,
        now: u64,
        cx: &mut Collaborators<'_>,
    ) -> Result<bool> {
        require!(
            cx.policy.is_authorized_reinvestor(&caller),
            MarginError::NotAuthorized
        );
        self.require_liquidity_manager(&*cx.liquidity)?;

        let _lock = self.lock(pool)?;

        let snapshot = self.snapshot(pool, None)?;
        let mut pool_account = snapshot.pool.clone();
        self.accrue(&mut pool_account, cx.rates, cx.policy, now)?;

        let fee_shares = pool_account.accumulated_fee_shares;
        pool_account.accumulated_fee_shares = 0;
        self.commit(pool_account, None);

        if fee_shares > 0 {
            if let Err(err) = cx.liquidity.reinvest_fee_shares(&pool, fee_shares) {
                msg!("Fee reinvestment failed, restoring pool {}", pool);
                self.restore(snapshot);
                return Err(err);
            }
            msg!("Reinvested {} fee shares for pool {}", fee_shares, pool);
        }

        emit!(InterestFeesProcessed {
            pool,
            caller,
            fee_shares,
        });

        Ok(true)
    }
}
