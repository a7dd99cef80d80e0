use anchor_lang::prelude::*;

use crate::{
    error::MarginError,
    interfaces::{AmmPool, SwapDirection, TokenGateway},
    state::Asset,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub asset: Asset,
    pub account: Pubkey,
    pub amount: u128,
}

/// A swap booked against the vault at `min_amount_out`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapOrder {
    pub direction: SwapDirection,
    pub amount_in: u128,
    pub min_amount_out: u128,
}

/// Token movements and swaps owed by a call, executed once its state is committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    pub pulls: Vec<Transfer>,
    pub swaps: Vec<SwapOrder>,
    pub pushes: Vec<Transfer>,
}

impl Settlement {
    pub fn pull(&mut self, asset: Asset, from: Pubkey, amount: u128) {
        if amount > 0 {
            self.pulls.push(Transfer {
                asset,
                account: from,
                amount,
            });
        }
    }

    pub fn push(&mut self, asset: Asset, to: Pubkey, amount: u128) {
        if amount > 0 {
            self.pushes.push(Transfer {
                asset,
                account: to,
                amount,
            });
        }
    }

    pub fn swap(&mut self, direction: SwapDirection, amount_in: u128, min_amount_out: u128) {
        if amount_in > 0 {
            self.swaps.push(SwapOrder {
                direction,
                amount_in,
                min_amount_out,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pulls.is_empty() && self.swaps.is_empty() && self.pushes.is_empty()
    }

    /// Pulls fund custody, swaps run against it, pushes pay out last.
    ///
    /// Returns the output of each swap in order. A fill below its booked
    /// minimum fails with `SlippageExceeded`.
    pub fn execute(
        &self,
        pool: &Pubkey,
        tokens: &mut dyn TokenGateway,
        amm: &mut dyn AmmPool,
    ) -> Result<Vec<u128>> {
        for transfer in &self.pulls {
            tokens.pull(transfer.asset, &transfer.account, transfer.amount)?;
        }

        let mut fills = Vec::with_capacity(self.swaps.len());
        for order in &self.swaps {
            let amount_out = amm.swap(pool, order.direction, order.amount_in)?;
            if amount_out < order.min_amount_out {
                msg!(
                    "Swap filled {} below booked {}",
                    amount_out,
                    order.min_amount_out
                );
                return err!(MarginError::SlippageExceeded);
            }
            fills.push(amount_out);
        }

        for transfer in &self.pushes {
            tokens.push(transfer.asset, &transfer.account, transfer.amount)?;
        }
        Ok(fills)
    }

    /// Output above the booked minimum, as (token0, token1).
    pub fn swap_surplus(&self, fills: &[u128]) -> (u128, u128) {
        let mut surplus = (0u128, 0u128);
        for (order, fill) in self.swaps.iter().zip(fills) {
            let extra = fill.saturating_sub(order.min_amount_out);
            match order.direction.assets().1 {
                Asset::Token0 => surplus.0 = surplus.0.saturating_add(extra),
                Asset::Token1 => surplus.1 = surplus.1.saturating_add(extra),
            }
        }
        surplus
    }
}
