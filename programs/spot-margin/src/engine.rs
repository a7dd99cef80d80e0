//! Pool and vault repository plus the per-pool call guard.
//!
//! Every state-changing entry point follows the same shape: take the pool
//! lock, snapshot, accrue, mutate a working copy, commit, then talk to
//! collaborators. A collaborator failure after commit restores the snapshot.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
};

use anchor_lang::prelude::*;

use crate::{
    accrual::{accrue_interest, AccrualOutcome},
    error::MarginError,
    events::InterestAccrued,
    interfaces::{InterestRateStrategy, LiquidityManager, RiskPolicy},
    state::{LiquidityPoolAccount, Vault},
};

#[derive(Debug, Default)]
pub(crate) struct MarginStore {
    pub pools: BTreeMap<Pubkey, LiquidityPoolAccount>,
    pub vaults: BTreeMap<(Pubkey, Pubkey), Vault>,
    pub liquidity_manager: Option<Pubkey>,
}

/// Pre-call copy of everything one entry point may touch.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub pool: LiquidityPoolAccount,
    pub vault_key: Option<(Pubkey, Pubkey)>,
    pub vault: Option<Vault>,
}

impl Snapshot {
    /// Working copy of the vault; a fresh zero vault if none is stored.
    pub fn working_vault(&self) -> Option<Vault> {
        self.vault_key.map(|(pool, owner)| {
            self.vault
                .clone()
                .unwrap_or_else(|| Vault::new(pool, owner))
        })
    }
}

/// Margin-lending engine over any number of AMM pools.
#[derive(Debug, Default)]
pub struct MarginEngine {
    pub(crate) store: RefCell<MarginStore>,
    locks: RefCell<BTreeSet<Pubkey>>,
}

/// Held for the duration of one entry point; releases the pool on drop.
#[must_use]
pub(crate) struct PoolLock<'a> {
    locks: &'a RefCell<BTreeSet<Pubkey>>,
    pool: Pubkey,
}

impl Drop for PoolLock<'_> {
    fn drop(&mut self) {
        self.locks.borrow_mut().remove(&self.pool);
    }
}

impl MarginEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self, pool: Pubkey) -> Result<PoolLock<'_>> {
        if !self.locks.borrow_mut().insert(pool) {
            msg!("Reentrant call rejected for pool {}", pool);
            return err!(MarginError::ReentrantCall);
        }
        Ok(PoolLock {
            locks: &self.locks,
            pool,
        })
    }

    pub fn is_locked(&self, pool: &Pubkey) -> bool {
        self.locks.borrow().contains(pool)
    }

    pub(crate) fn load_pool(&self, pool: &Pubkey) -> Result<LiquidityPoolAccount> {
        self.store
            .borrow()
            .pools
            .get(pool)
            .cloned()
            .ok_or(error!(MarginError::PoolNotInitialized))
    }

    pub(crate) fn snapshot(&self, pool: Pubkey, owner: Option<Pubkey>) -> Result<Snapshot> {
        let store = self.store.borrow();
        let pool_account = store
            .pools
            .get(&pool)
            .cloned()
            .ok_or(error!(MarginError::PoolNotInitialized))?;
        let vault_key = owner.map(|owner| (pool, owner));
        let vault = vault_key.and_then(|key| store.vaults.get(&key).cloned());

        Ok(Snapshot {
            pool: pool_account,
            vault_key,
            vault,
        })
    }

    pub(crate) fn commit(&self, pool: LiquidityPoolAccount, vault: Option<Vault>) {
        let mut store = self.store.borrow_mut();
        if let Some(vault) = vault {
            store.vaults.insert((vault.pool, vault.owner), vault);
        }
        store.pools.insert(pool.pool, pool);
    }

    pub(crate) fn restore(&self, snapshot: Snapshot) {
        let mut store = self.store.borrow_mut();
        if let Some(key) = snapshot.vault_key {
            match snapshot.vault {
                Some(vault) => store.vaults.insert(key, vault),
                None => store.vaults.remove(&key),
            };
        }
        store.pools.insert(snapshot.pool.pool, snapshot.pool);
    }

    /// Accrue `pool` to `now` and report it.
    pub(crate) fn accrue(
        &self,
        pool: &mut LiquidityPoolAccount,
        rates: &dyn InterestRateStrategy,
        policy: &dyn RiskPolicy,
        now: u64,
    ) -> Result<Option<AccrualOutcome>> {
        let fee_percentage = policy.protocol_fee_percentage(&pool.pool);
        let outcome = accrue_interest(pool, rates, fee_percentage, now)?;

        if let Some(outcome) = &outcome {
            msg!(
                "Accrued {} interest shares over {}s, multiplier {}",
                outcome.interest_shares,
                outcome.elapsed,
                outcome.interest_multiplier
            );
            emit!(InterestAccrued {
                pool: pool.pool,
                elapsed: outcome.elapsed,
                utilization: outcome.utilization,
                rate_per_second: outcome.rate_per_second,
                interest_multiplier: outcome.interest_multiplier,
                interest_shares: outcome.interest_shares,
                protocol_fee_shares: outcome.protocol_fee_shares,
            });
        }

        Ok(outcome)
    }

    /// The collaborator must be the manager linked by the admin.
    pub(crate) fn require_liquidity_manager(&self, manager: &dyn LiquidityManager) -> Result<()> {
        let linked = self
            .store
            .borrow()
            .liquidity_manager
            .ok_or(error!(MarginError::MarginContractNotSet))?;
        require_keys_eq!(linked, manager.key(), MarginError::MarginContractNotSet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: Pubkey = Pubkey::new_from_array([1; 32]);
    const OWNER: Pubkey = Pubkey::new_from_array([2; 32]);

    fn seeded() -> MarginEngine {
        let engine = MarginEngine::new();
        engine.commit(LiquidityPoolAccount::new(POOL, 100, 100, 100, 0), None);
        engine
    }

    #[test]
    fn test_lock_rejects_nested_entry_and_releases_on_drop() {
        let engine = MarginEngine::new();
        {
            let _guard = engine.lock(POOL).unwrap();
            assert!(engine.is_locked(&POOL));
            let err = engine.lock(POOL).err().unwrap();
            assert_eq!(err, error!(MarginError::ReentrantCall));
            // Other pools are independent
            assert!(engine.lock(OWNER).is_ok());
        }
        assert!(!engine.is_locked(&POOL));
        assert!(engine.lock(POOL).is_ok());
    }

    #[test]
    fn test_lock_released_on_error_path() {
        let engine = seeded();
        let attempt = || -> Result<()> {
            let _guard = engine.lock(POOL)?;
            err!(MarginError::NotSolvent)
        };
        assert!(attempt().is_err());
        assert!(!engine.is_locked(&POOL));
    }

    #[test]
    fn test_snapshot_requires_pool() {
        let engine = MarginEngine::new();
        let err = engine.snapshot(POOL, Some(OWNER)).unwrap_err();
        assert_eq!(err, error!(MarginError::PoolNotInitialized));
    }

    #[test]
    fn test_restore_removes_vault_created_after_snapshot() {
        let engine = seeded();
        let snapshot = engine.snapshot(POOL, Some(OWNER)).unwrap();
        assert!(snapshot.vault.is_none());

        let mut vault = snapshot.working_vault().unwrap();
        vault.collateral0 = 10;
        let mut pool = snapshot.pool.clone();
        pool.reserve0 = 1;
        engine.commit(pool, Some(vault));
        assert!(engine.store.borrow().vaults.contains_key(&(POOL, OWNER)));

        engine.restore(snapshot);
        let store = engine.store.borrow();
        assert!(!store.vaults.contains_key(&(POOL, OWNER)));
        assert_eq!(store.pools[&POOL].reserve0, 100);
    }
}
