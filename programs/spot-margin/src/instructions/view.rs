use anchor_lang::prelude::*;

use crate::{
    engine::MarginEngine,
    error::MarginError,
    interfaces::PriceOracle,
    math::Rounding,
    solvency::{compute_ltv, Ltv},
    state::{LiquidityPoolAccount, Vault},
};

// Views read committed state as of the last accrual.
impl MarginEngine {
    /// Vault of `owner` in `pool`; an untouched account reads as all zeros.
    pub fn get_vault(&self, pool: Pubkey, owner: Pubkey) -> Result<Vault> {
        let store = self.store.borrow();
        if !store.pools.contains_key(&pool) {
            return err!(MarginError::PoolNotInitialized);
        }
        Ok(store
            .vaults
            .get(&(pool, owner))
            .cloned()
            .unwrap_or_else(|| Vault::new(pool, owner)))
    }

    pub fn pool(&self, pool: Pubkey) -> Result<LiquidityPoolAccount> {
        self.load_pool(&pool)
    }

    pub fn interest_multiplier(&self, pool: Pubkey) -> Result<u128> {
        Ok(self.load_pool(&pool)?.interest_multiplier)
    }

    pub fn rented_liquidity(&self, pool: Pubkey) -> Result<u128> {
        Ok(self.load_pool(&pool)?.rented_shares)
    }

    pub fn accumulated_fees(&self, pool: Pubkey) -> Result<u128> {
        Ok(self.load_pool(&pool)?.accumulated_fee_shares)
    }

    pub fn liquidity_manager(&self) -> Option<Pubkey> {
        self.store.borrow().liquidity_manager
    }

    /// Outstanding debt of a vault in rented shares (ceiling)
    pub fn debt_value(&self, pool: Pubkey, owner: Pubkey) -> Result<u128> {
        let pool_account = self.load_pool(&pool)?;
        let vault = self.get_vault(pool, owner)?;
        pool_account.debt_value(vault.debt_shares, Rounding::Ceiling)
    }

    pub fn vault_ltv(&self, pool: Pubkey, owner: Pubkey, oracle: &dyn PriceOracle) -> Result<Ltv> {
        let pool_account = self.load_pool(&pool)?;
        let vault = self.get_vault(pool, owner)?;
        compute_ltv(&vault, &pool_account, oracle.price(&pool)?)
    }
}
