//! Collaborators the engine calls out to.
//!
//! Pool mechanics, pricing, governance and token movement live outside the
//! lending book; the engine only sees them through these traits.

use anchor_lang::prelude::*;

use crate::state::Asset;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    ZeroForOne,
    OneForZero,
}

impl SwapDirection {
    pub fn assets(&self) -> (Asset, Asset) {
        match self {
            SwapDirection::ZeroForOne => (Asset::Token0, Asset::Token1),
            SwapDirection::OneForZero => (Asset::Token1, Asset::Token0),
        }
    }
}

/// The shared AMM pool the engine lends shares of.
pub trait AmmPool {
    /// Output of a swap at the current pool state, without executing it.
    fn quote(&self, pool: &Pubkey, direction: SwapDirection, amount_in: u128) -> Result<u128>;

    /// Swap `amount_in` of the input side at the current pool price.
    fn swap(&mut self, pool: &Pubkey, direction: SwapDirection, amount_in: u128) -> Result<u128>;

    /// (reserve0, reserve1, total_shares)
    fn reserves_and_shares(&self, pool: &Pubkey) -> Result<(u128, u128, u128)>;
}

pub trait PriceOracle {
    /// token1 per token0, WAD.
    fn price(&self, pool: &Pubkey) -> Result<u128>;
}

/// Pluggable borrow-rate curve.
pub trait InterestRateStrategy {
    /// Per-second borrow rate (WAD) at `utilization` (WAD).
    fn borrow_rate(&self, pool: &Pubkey, utilization: u128) -> Result<u128>;

    /// Highest rented/total ratio a borrow may reach (WAD).
    fn max_utilization_rate(&self) -> u128;

    /// Reject parameters the engine cannot lend under.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Receives protocol-owned liquidity and fee shares for reinvestment.
pub trait LiquidityManager {
    /// Identity checked against the manager linked to the engine.
    fn key(&self) -> Pubkey;

    fn deposit_into_protocol_owned_liquidity(
        &mut self,
        pool: &Pubkey,
        amount0: u128,
        amount1: u128,
    ) -> Result<()>;

    fn reinvest_fee_shares(&mut self, pool: &Pubkey, shares: u128) -> Result<()>;
}

/// Governance parameters, all ratios in WAD.
pub trait RiskPolicy {
    fn max_ltv(&self, pool: &Pubkey) -> u128;
    fn liquidation_bonus(&self, pool: &Pubkey) -> u128;
    fn protocol_fee_percentage(&self, pool: &Pubkey) -> u128;
    fn is_authorized_reinvestor(&self, caller: &Pubkey) -> bool;
    fn is_paused(&self, pool: &Pubkey) -> bool;
    fn is_emergency(&self, pool: &Pubkey) -> bool;
    fn is_admin(&self, caller: &Pubkey) -> bool;
}

/// Moves tokens between external accounts and engine custody.
pub trait TokenGateway {
    fn pull(&mut self, asset: Asset, from: &Pubkey, amount: u128) -> Result<()>;
    fn push(&mut self, asset: Asset, to: &Pubkey, amount: u128) -> Result<()>;
}

/// Everything a state-changing entry point may call, borrowed for one call.
pub struct Collaborators<'a> {
    pub amm: &'a mut dyn AmmPool,
    pub oracle: &'a dyn PriceOracle,
    pub rates: &'a dyn InterestRateStrategy,
    pub policy: &'a dyn RiskPolicy,
    pub tokens: &'a mut dyn TokenGateway,
    pub liquidity: &'a mut dyn LiquidityManager,
}
