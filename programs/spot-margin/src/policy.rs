use anchor_lang::prelude::*;

use crate::{
    constants::*,
    error::MarginError,
    events::{AuthorityTransferred, PoolStatusChanged, ReinvestorUpdated, RiskParametersUpdated},
    interfaces::RiskPolicy,
};

/// Governance parameter block consulted by every entry point.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct MarginConfig {
    pub authority: Pubkey,
    /// Highest LTV a vault may hold after a batch (WAD)
    pub max_ltv: u128,
    /// Extra collateral seized on liquidation (WAD)
    pub liquidation_bonus: u128,
    /// Share of accrued interest kept by the protocol (WAD)
    pub protocol_fee_percentage: u128,
    pub reinvestors: Vec<Pubkey>,
    pub paused_pools: Vec<Pubkey>,
    pub emergency_pools: Vec<Pubkey>,
    pub bump: u8,
}

impl MarginConfig {
    pub const LEN: usize = 8 + // discriminator
        32 +  // authority
        16 +  // max_ltv
        16 +  // liquidation_bonus
        16 +  // protocol_fee_percentage
        4 + 32 * MAX_REINVESTORS +    // reinvestors
        4 + 32 * MAX_TRACKED_POOLS +  // paused_pools
        4 + 32 * MAX_TRACKED_POOLS +  // emergency_pools
        1; // bump

    pub const SEED_PREFIX: &'static [u8] = CONFIG_SEED;

    pub fn new(authority: Pubkey) -> Self {
        Self {
            authority,
            max_ltv: DEFAULT_MAX_LTV,
            liquidation_bonus: DEFAULT_LIQUIDATION_BONUS,
            protocol_fee_percentage: DEFAULT_PROTOCOL_FEE,
            reinvestors: Vec::new(),
            paused_pools: Vec::new(),
            emergency_pools: Vec::new(),
            bump: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.max_ltv > 0 && self.max_ltv <= WAD,
            MarginError::InvalidParameter
        );
        require!(
            self.liquidation_bonus <= MAX_LIQUIDATION_BONUS,
            MarginError::InvalidParameter
        );
        require!(
            self.protocol_fee_percentage <= WAD,
            MarginError::InvalidParameter
        );
        Ok(())
    }

    fn require_authority(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.authority, MarginError::NotAuthorized);
        Ok(())
    }

    fn emit_status(&self, pool: Pubkey) {
        emit!(PoolStatusChanged {
            pool,
            paused: self.paused_pools.contains(&pool),
            emergency: self.emergency_pools.contains(&pool),
        });
    }

    /// Stop batches and liquidations on `pool`.
    pub fn pause(&mut self, caller: &Pubkey, pool: Pubkey) -> Result<()> {
        self.require_authority(caller)?;
        require!(!self.paused_pools.contains(&pool), MarginError::PoolPaused);
        require!(
            self.paused_pools.len() < MAX_TRACKED_POOLS,
            MarginError::InvalidParameter
        );

        self.paused_pools.push(pool);
        self.emit_status(pool);
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Pubkey, pool: Pubkey) -> Result<()> {
        self.require_authority(caller)?;
        let index = self
            .paused_pools
            .iter()
            .position(|p| *p == pool)
            .ok_or(MarginError::InvalidParameter)?;

        self.paused_pools.swap_remove(index);
        self.emit_status(pool);
        Ok(())
    }

    /// Emergency mode stops batches but leaves liquidation open.
    pub fn set_emergency(&mut self, caller: &Pubkey, pool: Pubkey, active: bool) -> Result<()> {
        self.require_authority(caller)?;
        let index = self.emergency_pools.iter().position(|p| *p == pool);

        match (active, index) {
            (true, None) => {
                require!(
                    self.emergency_pools.len() < MAX_TRACKED_POOLS,
                    MarginError::InvalidParameter
                );
                self.emergency_pools.push(pool);
            }
            (false, Some(index)) => {
                self.emergency_pools.swap_remove(index);
            }
            _ => return err!(MarginError::InvalidParameter),
        }

        self.emit_status(pool);
        Ok(())
    }

    pub fn add_reinvestor(&mut self, caller: &Pubkey, reinvestor: Pubkey) -> Result<()> {
        self.require_authority(caller)?;
        require!(
            !self.reinvestors.contains(&reinvestor),
            MarginError::InvalidParameter
        );
        require!(
            self.reinvestors.len() < MAX_REINVESTORS,
            MarginError::InvalidParameter
        );

        self.reinvestors.push(reinvestor);

        emit!(ReinvestorUpdated {
            reinvestor,
            authorized: true,
        });
        Ok(())
    }

    pub fn remove_reinvestor(&mut self, caller: &Pubkey, reinvestor: Pubkey) -> Result<()> {
        self.require_authority(caller)?;
        let index = self
            .reinvestors
            .iter()
            .position(|r| *r == reinvestor)
            .ok_or(MarginError::InvalidParameter)?;

        self.reinvestors.swap_remove(index);

        emit!(ReinvestorUpdated {
            reinvestor,
            authorized: false,
        });
        Ok(())
    }

    pub fn transfer_authority(&mut self, caller: &Pubkey, new_authority: Pubkey) -> Result<()> {
        self.require_authority(caller)?;
        let previous_authority = self.authority;

        self.authority = new_authority;

        emit!(AuthorityTransferred {
            previous_authority,
            new_authority,
        });
        Ok(())
    }

    /// Replace the risk parameters; rejected as a whole if any is out of range.
    pub fn update_risk_params(
        &mut self,
        caller: &Pubkey,
        max_ltv: u128,
        liquidation_bonus: u128,
        protocol_fee_percentage: u128,
    ) -> Result<()> {
        self.require_authority(caller)?;

        let updated = Self {
            max_ltv,
            liquidation_bonus,
            protocol_fee_percentage,
            ..self.clone()
        };
        updated.validate()?;
        *self = updated;

        emit!(RiskParametersUpdated {
            max_ltv,
            liquidation_bonus,
            protocol_fee_percentage,
        });
        Ok(())
    }
}

impl RiskPolicy for MarginConfig {
    fn max_ltv(&self, _pool: &Pubkey) -> u128 {
        self.max_ltv
    }

    fn liquidation_bonus(&self, _pool: &Pubkey) -> u128 {
        self.liquidation_bonus
    }

    fn protocol_fee_percentage(&self, _pool: &Pubkey) -> u128 {
        self.protocol_fee_percentage
    }

    fn is_authorized_reinvestor(&self, caller: &Pubkey) -> bool {
        self.reinvestors.contains(caller)
    }

    fn is_paused(&self, pool: &Pubkey) -> bool {
        self.paused_pools.contains(pool)
    }

    fn is_emergency(&self, pool: &Pubkey) -> bool {
        self.emergency_pools.contains(pool)
    }

    fn is_admin(&self, caller: &Pubkey) -> bool {
        *caller == self.authority
    }
}
