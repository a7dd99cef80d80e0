pub const POOL_SEED: &[u8] = b"margin_pool";
pub const VAULT_SEED: &[u8] = b"margin_vault";
pub const CONFIG_SEED: &[u8] = b"margin_config";

/// Fixed-point scale (1e18)
pub const WAD: u128 = 1_000_000_000_000_000_000;

pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 3600;

/// Hard ceiling on the per-second borrow rate (~1000% APR).
pub const MAX_BORROW_RATE_PER_SECOND: u128 = 10 * WAD / SECONDS_PER_YEAR;

// Interest rate model defaults (annual, WAD)
pub const DEFAULT_BASE_RATE: u128 = 20_000_000_000_000_000; // 2%
pub const DEFAULT_SLOPE1: u128 = 40_000_000_000_000_000; // 4%
pub const DEFAULT_SLOPE2: u128 = 750_000_000_000_000_000; // 75%
pub const DEFAULT_OPTIMAL_UTILIZATION: u128 = 800_000_000_000_000_000; // 80%
pub const DEFAULT_MAX_UTILIZATION: u128 = 950_000_000_000_000_000; // 95%
/// Borrows stop here whatever the strategy reports
pub const MAX_UTILIZATION_CEILING: u128 = 990_000_000_000_000_000; // 99%

// Risk defaults (WAD)
pub const DEFAULT_MAX_LTV: u128 = 800_000_000_000_000_000; // 80%
pub const DEFAULT_LIQUIDATION_BONUS: u128 = 50_000_000_000_000_000; // 5%
pub const DEFAULT_PROTOCOL_FEE: u128 = 100_000_000_000_000_000; // 10%

pub const MAX_LIQUIDATION_BONUS: u128 = WAD / 2;
pub const MAX_REINVESTORS: usize = 16;
pub const MAX_TRACKED_POOLS: usize = 32;
pub const MAX_BATCH_ACTIONS: usize = 32;
