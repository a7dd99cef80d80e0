//! Margin lending on AMM liquidity shares.
//!
//! Accounts deposit collateral into a per-pool vault, rent pool shares
//! against it, swap inside the vault and repay. Interest accrues on rented
//! shares through a per-pool multiplier; vaults above the LTV limit can be
//! liquidated into protocol-owned liquidity.

use anchor_lang::prelude::*;

pub mod accrual;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instructions;
pub mod interest;
pub mod interfaces;
pub mod math;
pub mod policy;
pub mod settlement;
pub mod solvency;
pub mod state;

pub use engine::MarginEngine;
pub use error::{ErrorKind, MarginError};
pub use instructions::{ActionRecord, BatchAction, BatchReceipt, LiquidationOutcome};
pub use interest::KinkedRateModel;
pub use interfaces::*;
pub use policy::MarginConfig;
pub use solvency::Ltv;
pub use state::{Asset, LiquidityPoolAccount, Vault};

declare_id!("DACpxEEo26WKMeFkepx3hR7KT29ZVsRQBDsduHKqqQRa");
