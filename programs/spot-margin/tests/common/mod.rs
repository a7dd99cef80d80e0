//! In-memory host for driving the engine: a constant-price AMM, a fixed
//! oracle, a ledger of external token balances and a recording liquidity
//! manager.

#![allow(dead_code)]

use std::{collections::BTreeMap, rc::Rc};

use anchor_lang::prelude::*;
use spot_margin::{
    constants::WAD,
    math::{mul_div, Rounding},
    AmmPool, Asset, BatchAction, BatchReceipt, Collaborators, KinkedRateModel, LiquidationOutcome,
    LiquidityManager, LiquidityPoolAccount, MarginConfig, MarginEngine, MarginError, PriceOracle,
    SwapDirection, TokenGateway, Vault,
};

pub const POOL: Pubkey = Pubkey::new_from_array([10; 32]);
pub const ADMIN: Pubkey = Pubkey::new_from_array([11; 32]);
pub const ALICE: Pubkey = Pubkey::new_from_array([12; 32]);
pub const BOB: Pubkey = Pubkey::new_from_array([13; 32]);
pub const REINVESTOR: Pubkey = Pubkey::new_from_array([14; 32]);
pub const MANAGER: Pubkey = Pubkey::new_from_array([15; 32]);
pub const LIQUIDATOR: Pubkey = Pubkey::new_from_array([16; 32]);

pub const START: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;
pub const INITIAL_SHARES: u128 = 1_000 * WAD;
pub const INITIAL_RESERVE: u128 = 1_000 * WAD;
pub const FUNDING: u128 = 10_000 * WAD;

pub fn side(asset: Asset) -> usize {
    match asset {
        Asset::Token0 => 0,
        Asset::Token1 => 1,
    }
}

/// Swaps at a fixed price with no fee.
///
/// `fill_delta` shifts executed swaps away from the quote, to model the
/// pool moving between booking and settlement.
#[derive(Debug)]
pub struct MockAmm {
    pub reserve0: u128,
    pub reserve1: u128,
    pub total_shares: u128,
    pub price: u128,
    pub fail_swaps: bool,
    pub fill_delta: i128,
    pub swaps: Vec<(SwapDirection, u128, u128)>,
}

impl Default for MockAmm {
    fn default() -> Self {
        Self {
            reserve0: INITIAL_RESERVE,
            reserve1: INITIAL_RESERVE,
            total_shares: INITIAL_SHARES,
            price: WAD,
            fail_swaps: false,
            fill_delta: 0,
            swaps: Vec::new(),
        }
    }
}

impl AmmPool for MockAmm {
    fn quote(&self, _pool: &Pubkey, direction: SwapDirection, amount_in: u128) -> Result<u128> {
        match direction {
            SwapDirection::ZeroForOne => mul_div(amount_in, self.price, WAD, Rounding::Floor),
            SwapDirection::OneForZero => mul_div(amount_in, WAD, self.price, Rounding::Floor),
        }
    }

    fn swap(&mut self, pool: &Pubkey, direction: SwapDirection, amount_in: u128) -> Result<u128> {
        require!(!self.fail_swaps, MarginError::InsufficientLiquidity);
        let quoted = self.quote(pool, direction, amount_in)?;
        let amount_out = if self.fill_delta >= 0 {
            quoted + self.fill_delta.unsigned_abs()
        } else {
            quoted.saturating_sub(self.fill_delta.unsigned_abs())
        };
        self.swaps.push((direction, amount_in, amount_out));
        Ok(amount_out)
    }

    fn reserves_and_shares(&self, _pool: &Pubkey) -> Result<(u128, u128, u128)> {
        Ok((self.reserve0, self.reserve1, self.total_shares))
    }
}

#[derive(Debug)]
pub struct MockOracle {
    pub price: u128,
}

impl PriceOracle for MockOracle {
    fn price(&self, _pool: &Pubkey) -> Result<u128> {
        Ok(self.price)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockTokens {
    pub balances: BTreeMap<(Pubkey, usize), u128>,
    pub pulled: [u128; 2],
    pub pushed: [u128; 2],
    pub fail_pushes: bool,
}

impl MockTokens {
    pub fn balance(&self, who: &Pubkey, asset: Asset) -> u128 {
        self.balances.get(&(*who, side(asset))).copied().unwrap_or(0)
    }

    pub fn fund(&mut self, who: Pubkey, asset: Asset, amount: u128) {
        *self.balances.entry((who, side(asset))).or_insert(0) += amount;
    }
}

impl TokenGateway for MockTokens {
    fn pull(&mut self, asset: Asset, from: &Pubkey, amount: u128) -> Result<()> {
        let balance = self.balances.entry((*from, side(asset))).or_insert(0);
        *balance = balance
            .checked_sub(amount)
            .ok_or(MarginError::TransferFailed)?;
        self.pulled[side(asset)] += amount;
        Ok(())
    }

    fn push(&mut self, asset: Asset, to: &Pubkey, amount: u128) -> Result<()> {
        require!(!self.fail_pushes, MarginError::TransferFailed);
        *self.balances.entry((*to, side(asset))).or_insert(0) += amount;
        self.pushed[side(asset)] += amount;
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockLiquidityManager {
    pub key: Pubkey,
    pub deposits: Vec<(u128, u128)>,
    pub reinvested: Vec<u128>,
    pub fail: bool,
}

impl Default for MockLiquidityManager {
    fn default() -> Self {
        Self {
            key: MANAGER,
            deposits: Vec::new(),
            reinvested: Vec::new(),
            fail: false,
        }
    }
}

impl LiquidityManager for MockLiquidityManager {
    fn key(&self) -> Pubkey {
        self.key
    }

    fn deposit_into_protocol_owned_liquidity(
        &mut self,
        _pool: &Pubkey,
        amount0: u128,
        amount1: u128,
    ) -> Result<()> {
        require!(!self.fail, MarginError::TransferFailed);
        self.deposits.push((amount0, amount1));
        Ok(())
    }

    fn reinvest_fee_shares(&mut self, _pool: &Pubkey, shares: u128) -> Result<()> {
        require!(!self.fail, MarginError::TransferFailed);
        self.reinvested.push(shares);
        Ok(())
    }
}

/// Every collaborator the engine needs, owned in one place.
#[derive(Debug)]
pub struct Mocks {
    pub amm: MockAmm,
    pub oracle: MockOracle,
    pub rates: KinkedRateModel,
    pub config: MarginConfig,
    pub tokens: MockTokens,
    pub liquidity: MockLiquidityManager,
}

impl Mocks {
    pub fn new() -> Self {
        let mut config = MarginConfig::new(ADMIN);
        config.reinvestors.push(REINVESTOR);
        Self {
            amm: MockAmm::default(),
            oracle: MockOracle { price: WAD },
            rates: KinkedRateModel::default(),
            config,
            tokens: MockTokens::default(),
            liquidity: MockLiquidityManager::default(),
        }
    }

    pub fn cx(&mut self) -> Collaborators<'_> {
        Collaborators {
            amm: &mut self.amm,
            oracle: &self.oracle,
            rates: &self.rates,
            policy: &self.config,
            tokens: &mut self.tokens,
            liquidity: &mut self.liquidity,
        }
    }
}

pub struct Host {
    pub engine: Rc<MarginEngine>,
    pub mocks: Mocks,
    pub now: u64,
}

impl Host {
    /// Pool initialized, liquidity manager not linked, nobody funded.
    pub fn bare() -> Self {
        let engine = Rc::new(MarginEngine::new());
        let mut mocks = Mocks::new();
        engine
            .initialize_pool(POOL, ADMIN, START, &mut mocks.cx())
            .unwrap();
        Self {
            engine,
            mocks,
            now: START,
        }
    }

    pub fn new() -> Self {
        let mut host = Self::bare();
        host.engine
            .link_liquidity_manager(ADMIN, MANAGER, &host.mocks.config)
            .unwrap();
        for who in [ALICE, BOB] {
            host.mocks.tokens.fund(who, Asset::Token0, FUNDING);
            host.mocks.tokens.fund(who, Asset::Token1, FUNDING);
        }
        host
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    pub fn set_price(&mut self, price: u128) {
        self.mocks.amm.price = price;
        self.mocks.oracle.price = price;
    }

    pub fn batch(&mut self, owner: Pubkey, actions: &[BatchAction]) -> Result<BatchReceipt> {
        let mut cx = self.mocks.cx();
        self.engine
            .execute_batch(POOL, owner, actions, self.now, &mut cx)
    }

    pub fn liquidate(&mut self, owner: Pubkey, repay_shares: Option<u128>) -> Result<LiquidationOutcome> {
        let mut cx = self.mocks.cx();
        self.engine
            .liquidate(POOL, owner, LIQUIDATOR, repay_shares, self.now, &mut cx)
    }

    pub fn trigger_fees(&mut self, caller: Pubkey) -> Result<bool> {
        let mut cx = self.mocks.cx();
        self.engine
            .trigger_interest_fee_processing(POOL, caller, self.now, &mut cx)
    }

    pub fn write_off(&mut self, owner: Pubkey, caller: Pubkey) -> Result<u128> {
        let mut cx = self.mocks.cx();
        self.engine
            .write_off_bad_debt(POOL, owner, caller, self.now, &mut cx)
    }

    pub fn pool(&self) -> LiquidityPoolAccount {
        self.engine.pool(POOL).unwrap()
    }

    pub fn vault(&self, owner: Pubkey) -> Vault {
        self.engine.get_vault(POOL, owner).unwrap()
    }

    /// Serialized pool and vault, for byte-level rollback checks.
    pub fn state_bytes(&self, owner: Pubkey) -> (Vec<u8>, Vec<u8>) {
        let mut pool = Vec::new();
        self.pool().try_serialize(&mut pool).unwrap();
        let mut vault = Vec::new();
        self.vault(owner).try_serialize(&mut vault).unwrap();
        (pool, vault)
    }
}

pub fn deposit(asset: Asset, amount: u128) -> BatchAction {
    BatchAction::DepositCollateral {
        asset,
        amount,
        deadline: None,
    }
}

pub fn withdraw(asset: Asset, amount: u128, recipient: Pubkey) -> BatchAction {
    BatchAction::WithdrawCollateral {
        asset,
        amount,
        recipient,
        deadline: None,
    }
}

pub fn borrow(shares: u128) -> BatchAction {
    BatchAction::Borrow {
        shares,
        recipient: None,
    }
}

pub fn borrow_to(shares: u128, recipient: Pubkey) -> BatchAction {
    BatchAction::Borrow {
        shares,
        recipient: Some(recipient),
    }
}

pub fn repay(shares: u128) -> BatchAction {
    BatchAction::Repay {
        shares,
        use_vault_balance: false,
    }
}

pub fn repay_from_vault(shares: u128) -> BatchAction {
    BatchAction::Repay {
        shares,
        use_vault_balance: true,
    }
}

pub fn swap(direction: SwapDirection, amount_in: u128, min_amount_out: u128) -> BatchAction {
    BatchAction::SwapWithinAccount {
        direction,
        amount_in,
        min_amount_out,
    }
}

/// Vault collateral plus idle reserves equals what came in minus what went out.
pub fn assert_conservation(host: &Host, owners: &[Pubkey], context: &str) {
    let pool = host.pool();
    let mut collateral = [0u128; 2];
    for owner in owners {
        let vault = host.vault(*owner);
        collateral[0] += vault.collateral0;
        collateral[1] += vault.collateral1;
    }
    let reserves = [pool.reserve0, pool.reserve1];

    for i in 0..2 {
        assert_eq!(
            collateral[i] + reserves[i],
            INITIAL_RESERVE + host.mocks.tokens.pulled[i] - host.mocks.tokens.pushed[i],
            "{}: conservation violated on token{}",
            context,
            i
        );
    }
}
