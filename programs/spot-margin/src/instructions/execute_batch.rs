use anchor_lang::prelude::*;

use crate::{
    accrual::AccrualOutcome,
    constants::{MAX_BATCH_ACTIONS, MAX_UTILIZATION_CEILING, WAD},
    engine::MarginEngine,
    error::MarginError,
    events::{
        BatchExecuted, Borrowed, CollateralDeposited, CollateralWithdrawn, Repaid,
        SwappedWithinVault,
    },
    interfaces::{Collaborators, SwapDirection},
    math::{mul_div, Rounding},
    settlement::Settlement,
    solvency::{compute_ltv, Ltv},
    state::{Asset, LiquidityPoolAccount, Vault},
};

/// One step of a margin batch. Steps run in order against shared state.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum BatchAction {
    DepositCollateral {
        asset: Asset,
        amount: u128,
        deadline: Option<u64>,
    },
    WithdrawCollateral {
        asset: Asset,
        amount: u128,
        recipient: Pubkey,
        deadline: Option<u64>,
    },
    /// Rent `shares` out of the pool; proceeds go to `recipient`, or stay
    /// in the vault as collateral when `None`.
    Borrow {
        shares: u128,
        recipient: Option<Pubkey>,
    },
    /// Return `shares` of current debt, capped at what is owed.
    Repay {
        shares: u128,
        use_vault_balance: bool,
    },
    SwapWithinAccount {
        direction: SwapDirection,
        amount_in: u128,
        min_amount_out: u128,
    },
}

/// What one action did, in the order it ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRecord {
    Deposited {
        asset: Asset,
        amount: u128,
    },
    Withdrawn {
        asset: Asset,
        amount: u128,
        recipient: Pubkey,
    },
    Borrowed {
        shares: u128,
        debt_shares: u128,
        amount0: u128,
        amount1: u128,
        recipient: Option<Pubkey>,
    },
    Repaid {
        shares: u128,
        debt_shares: u128,
        amount0: u128,
        amount1: u128,
        from_vault: bool,
    },
    Swapped {
        direction: SwapDirection,
        amount_in: u128,
        amount_out: u128,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReceipt {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub accrual: Option<AccrualOutcome>,
    pub actions: Vec<ActionRecord>,
    /// LTV of the vault as committed
    pub ltv: Ltv,
    pub settlement: Settlement,
}

impl MarginEngine {
    /// Apply `actions` to `owner`'s vault in `pool` as one all-or-nothing unit.
    ///
    /// Interest accrues once up front, and solvency is checked once at the
    /// end, so intermediate steps may sit above the LTV limit.
    pub fn execute_batch(
        &self,
        pool: Pubkey,
        owner: Pubkey,
        actions: &[BatchAction],
        now: u64,
        cx: &mut Collaborators<'_>,
    ) -> Result<BatchReceipt> {
        let _lock = self.lock(pool)?;

        require!(
            actions.len() <= MAX_BATCH_ACTIONS,
            MarginError::InvalidParameter
        );
        require!(!cx.policy.is_paused(&pool), MarginError::PoolPaused);
        require!(!cx.policy.is_emergency(&pool), MarginError::EmergencyMode);

        let snapshot = self.snapshot(pool, Some(owner))?;
        let mut pool_account = snapshot.pool.clone();
        let mut vault = snapshot
            .working_vault()
            .ok_or(MarginError::InvalidParameter)?;

        let accrual = self.accrue(&mut pool_account, cx.rates, cx.policy, now)?;

        let mut settlement = Settlement::default();
        let mut records = Vec::with_capacity(actions.len());
        for action in actions {
            let record = apply_action(
                &mut pool_account,
                &mut vault,
                action,
                now,
                cx,
                &mut settlement,
            )?;
            records.push(record);
        }

        pool_account.reconcile_bad_debt(&mut vault)?;

        let price = cx.oracle.price(&pool)?;
        let ltv = compute_ltv(&vault, &pool_account, price)?;
        if ltv.exceeds(cx.policy.max_ltv(&pool)) {
            msg!("Batch rejected: vault {} would be insolvent ({:?})", owner, ltv);
            return err!(MarginError::NotSolvent);
        }

        let mut committed = vault.clone();
        self.commit(pool_account.clone(), Some(vault));

        let fills = match settlement.execute(&pool, &mut *cx.tokens, &mut *cx.amm) {
            Ok(fills) => fills,
            Err(err) => {
                msg!("Batch settlement failed, restoring pool {}", pool);
                self.restore(snapshot);
                return Err(err);
            }
        };

        // Swaps were booked at their quote; anything filled above it belongs to the vault
        let surplus = settlement.swap_surplus(&fills);
        if surplus != (0, 0) {
            if let Err(err) = committed
                .credit(Asset::Token0, surplus.0)
                .and_then(|()| committed.credit(Asset::Token1, surplus.1))
            {
                self.restore(snapshot);
                return Err(err);
            }
            self.commit(pool_account, Some(committed.clone()));
        }

        for record in &records {
            emit_record(pool, owner, record);
        }
        emit!(BatchExecuted {
            pool,
            owner,
            actions: records.len() as u32,
            debt_shares: committed.debt_shares,
            collateral0: committed.collateral0,
            collateral1: committed.collateral1,
        });

        Ok(BatchReceipt {
            pool,
            owner,
            accrual,
            actions: records,
            ltv,
            settlement,
        })
    }
}

fn require_deadline(deadline: Option<u64>, now: u64) -> Result<()> {
    if let Some(deadline) = deadline {
        require!(now <= deadline, MarginError::DeadlineExceeded);
    }
    Ok(())
}

fn apply_action(
    pool: &mut LiquidityPoolAccount,
    vault: &mut Vault,
    action: &BatchAction,
    now: u64,
    cx: &Collaborators<'_>,
    settlement: &mut Settlement,
) -> Result<ActionRecord> {
    match *action {
        BatchAction::DepositCollateral {
            asset,
            amount,
            deadline,
        } => {
            require_deadline(deadline, now)?;
            vault.credit(asset, amount)?;
            settlement.pull(asset, vault.owner, amount);
            Ok(ActionRecord::Deposited { asset, amount })
        }
        BatchAction::WithdrawCollateral {
            asset,
            amount,
            recipient,
            deadline,
        } => {
            require_deadline(deadline, now)?;
            vault.debit(asset, amount)?;
            settlement.push(asset, recipient, amount);
            Ok(ActionRecord::Withdrawn {
                asset,
                amount,
                recipient,
            })
        }
        BatchAction::Borrow { shares, recipient } => {
            let max_utilization = cx.rates.max_utilization_rate();
            borrow(pool, vault, shares, recipient, max_utilization, settlement)
        }
        BatchAction::Repay {
            shares,
            use_vault_balance,
        } => repay(pool, vault, shares, use_vault_balance, settlement),
        BatchAction::SwapWithinAccount {
            direction,
            amount_in,
            min_amount_out,
        } => swap(vault, direction, amount_in, min_amount_out, cx, settlement),
    }
}

fn borrow(
    pool: &mut LiquidityPoolAccount,
    vault: &mut Vault,
    shares: u128,
    recipient: Option<Pubkey>,
    max_utilization: u128,
    settlement: &mut Settlement,
) -> Result<ActionRecord> {
    if shares == 0 {
        return Ok(ActionRecord::Borrowed {
            shares: 0,
            debt_shares: 0,
            amount0: 0,
            amount1: 0,
            recipient,
        });
    }
    require!(pool.total_shares > 0, MarginError::InsufficientLiquidity);
    // A borrow never drains the last idle share
    let max_utilization = max_utilization.min(MAX_UTILIZATION_CEILING);

    let rented_shares = pool
        .rented_shares
        .checked_add(shares)
        .ok_or(MarginError::MathOverflow)?;
    // rented / total <= max, exact in integers
    let utilization = mul_div(rented_shares, WAD, pool.total_shares, Rounding::Ceiling)?;
    require!(
        utilization <= max_utilization,
        MarginError::UtilizationExceeded
    );

    let (amount0, amount1) = pool.share_amounts(shares, Rounding::Floor)?;
    let debt_shares = pool.to_debt_shares(shares, Rounding::Ceiling)?;

    pool.reserve0 = pool
        .reserve0
        .checked_sub(amount0)
        .ok_or(MarginError::InsufficientLiquidity)?;
    pool.reserve1 = pool
        .reserve1
        .checked_sub(amount1)
        .ok_or(MarginError::InsufficientLiquidity)?;
    pool.rented_shares = rented_shares;
    vault.debt_shares = vault
        .debt_shares
        .checked_add(debt_shares)
        .ok_or(MarginError::MathOverflow)?;

    match recipient {
        Some(to) => {
            settlement.push(Asset::Token0, to, amount0);
            settlement.push(Asset::Token1, to, amount1);
        }
        None => {
            vault.credit(Asset::Token0, amount0)?;
            vault.credit(Asset::Token1, amount1)?;
        }
    }

    Ok(ActionRecord::Borrowed {
        shares,
        debt_shares,
        amount0,
        amount1,
        recipient,
    })
}

fn repay(
    pool: &mut LiquidityPoolAccount,
    vault: &mut Vault,
    shares: u128,
    use_vault_balance: bool,
    settlement: &mut Settlement,
) -> Result<ActionRecord> {
    if shares == 0 {
        return Ok(ActionRecord::Repaid {
            shares: 0,
            debt_shares: 0,
            amount0: 0,
            amount1: 0,
            from_vault: use_vault_balance,
        });
    }
    require!(vault.has_debt(), MarginError::RepayExceedsDebt);

    let owed = pool.debt_value(vault.debt_shares, Rounding::Ceiling)?;
    let repaid = shares.min(owed);
    let burned = if repaid == owed {
        vault.debt_shares
    } else {
        pool.to_debt_shares(repaid, Rounding::Floor)?
            .min(vault.debt_shares)
    };

    // Pool is paid, so round the token amounts up
    let (amount0, amount1) = pool.share_amounts(repaid, Rounding::Ceiling)?;

    if use_vault_balance {
        vault.debit(Asset::Token0, amount0)?;
        vault.debit(Asset::Token1, amount1)?;
    } else {
        settlement.pull(Asset::Token0, vault.owner, amount0);
        settlement.pull(Asset::Token1, vault.owner, amount1);
    }

    pool.reserve0 = pool
        .reserve0
        .checked_add(amount0)
        .ok_or(MarginError::MathOverflow)?;
    pool.reserve1 = pool
        .reserve1
        .checked_add(amount1)
        .ok_or(MarginError::MathOverflow)?;
    pool.rented_shares -= repaid.min(pool.rented_shares);
    vault.debt_shares -= burned;

    Ok(ActionRecord::Repaid {
        shares: repaid,
        debt_shares: burned,
        amount0,
        amount1,
        from_vault: use_vault_balance,
    })
}

/// Book a swap at the AMM's quote; the swap itself runs at settlement.
fn swap(
    vault: &mut Vault,
    direction: SwapDirection,
    amount_in: u128,
    min_amount_out: u128,
    cx: &Collaborators<'_>,
    settlement: &mut Settlement,
) -> Result<ActionRecord> {
    if amount_in == 0 {
        return Ok(ActionRecord::Swapped {
            direction,
            amount_in: 0,
            amount_out: 0,
        });
    }

    let (asset_in, asset_out) = direction.assets();
    vault.debit(asset_in, amount_in)?;

    let amount_out = cx.amm.quote(&vault.pool, direction, amount_in)?;
    require!(
        amount_out >= min_amount_out,
        MarginError::SlippageExceeded
    );
    vault.credit(asset_out, amount_out)?;
    settlement.swap(direction, amount_in, amount_out);

    Ok(ActionRecord::Swapped {
        direction,
        amount_in,
        amount_out,
    })
}

fn emit_record(pool: Pubkey, owner: Pubkey, record: &ActionRecord) {
    match *record {
        ActionRecord::Deposited { asset, amount } => emit!(CollateralDeposited {
            pool,
            owner,
            asset,
            amount,
        }),
        ActionRecord::Withdrawn {
            asset,
            amount,
            recipient,
        } => emit!(CollateralWithdrawn {
            pool,
            owner,
            recipient,
            asset,
            amount,
        }),
        ActionRecord::Borrowed {
            shares,
            debt_shares,
            amount0,
            amount1,
            recipient,
        } => emit!(Borrowed {
            pool,
            owner,
            recipient,
            shares,
            debt_shares,
            amount0,
            amount1,
        }),
        ActionRecord::Repaid {
            shares,
            debt_shares,
            amount0,
            amount1,
            from_vault,
        } => emit!(Repaid {
            pool,
            owner,
            shares,
            debt_shares,
            amount0,
            amount1,
            from_vault,
        }),
        ActionRecord::Swapped {
            direction,
            amount_in,
            amount_out,
        } => emit!(SwappedWithinVault {
            pool,
            owner,
            direction,
            amount_in,
            amount_out,
        }),
    }
}
