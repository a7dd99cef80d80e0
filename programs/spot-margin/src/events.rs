use anchor_lang::prelude::*;

use crate::{interfaces::SwapDirection, state::Asset};

#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub total_shares: u128,
    pub reserve0: u128,
    pub reserve1: u128,
}

#[event]
pub struct InterestAccrued {
    pub pool: Pubkey,
    pub elapsed: u64,
    pub utilization: u128,
    pub rate_per_second: u128,
    pub interest_multiplier: u128,
    pub interest_shares: u128,
    pub protocol_fee_shares: u128,
}

#[event]
pub struct CollateralDeposited {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub asset: Asset,
    pub amount: u128,
}

#[event]
pub struct CollateralWithdrawn {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub recipient: Pubkey,
    pub asset: Asset,
    pub amount: u128,
}

#[event]
pub struct Borrowed {
    pub pool: Pubkey,
    pub owner: Pubkey,
    /// `None` when the proceeds stay in the vault
    pub recipient: Option<Pubkey>,
    pub shares: u128,
    pub debt_shares: u128,
    pub amount0: u128,
    pub amount1: u128,
}

#[event]
pub struct Repaid {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub shares: u128,
    pub debt_shares: u128,
    pub amount0: u128,
    pub amount1: u128,
    pub from_vault: bool,
}

#[event]
pub struct SwappedWithinVault {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub direction: SwapDirection,
    pub amount_in: u128,
    pub amount_out: u128,
}

#[event]
pub struct BatchExecuted {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub actions: u32,
    pub debt_shares: u128,
    pub collateral0: u128,
    pub collateral1: u128,
}

#[event]
pub struct VaultLiquidated {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub liquidator: Pubkey,
    pub seized0: u128,
    pub seized1: u128,
    pub repaid_shares: u128,
    pub debt_shares_burned: u128,
}

#[event]
pub struct BadDebtRecorded {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub shortfall_shares: u128,
    pub pool_bad_debt_shares: u128,
}

#[event]
pub struct BadDebtWrittenOff {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub shares: u128,
    pub written_off_shares: u128,
}

#[event]
pub struct InterestFeesProcessed {
    pub pool: Pubkey,
    pub caller: Pubkey,
    pub fee_shares: u128,
}

#[event]
pub struct PoolStatusChanged {
    pub pool: Pubkey,
    pub paused: bool,
    pub emergency: bool,
}

#[event]
pub struct ReinvestorUpdated {
    pub reinvestor: Pubkey,
    pub authorized: bool,
}

#[event]
pub struct AuthorityTransferred {
    pub previous_authority: Pubkey,
    pub new_authority: Pubkey,
}

#[event]
pub struct RiskParametersUpdated {
    pub max_ltv: u128,
    pub liquidation_bonus: u128,
    pub protocol_fee_percentage: u128,
}

#[event]
pub struct LiquidityManagerLinked {
    pub previous: Option<Pubkey>,
    pub manager: Pubkey,
}
