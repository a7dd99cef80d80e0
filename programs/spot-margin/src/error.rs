use anchor_lang::prelude::*;

#[error_code]
pub enum MarginError {
    #[msg("Caller is not authorized for this operation")]
    NotAuthorized,

    #[msg("Pool is paused")]
    PoolPaused,

    #[msg("Pool is in emergency mode")]
    EmergencyMode,

    #[msg("Pool has not been initialized")]
    PoolNotInitialized,

    #[msg("Pool is already initialized")]
    PoolAlreadyInitialized,

    #[msg("Action deadline has passed")]
    DeadlineExceeded,

    #[msg("Insufficient collateral in vault")]
    InsufficientCollateral,

    #[msg("Repay amount exceeds outstanding debt")]
    RepayExceedsDebt,

    #[msg("Pool has no idle liquidity")]
    InsufficientLiquidity,

    #[msg("Borrow would exceed maximum utilization")]
    UtilizationExceeded,

    #[msg("Vault is not solvent")]
    NotSolvent,

    #[msg("Vault is not liquidatable")]
    NotLiquidatable,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("Margin engine is not linked to a liquidity manager")]
    MarginContractNotSet,

    #[msg("Reentrant call on a locked pool")]
    ReentrantCall,

    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    #[msg("Invalid parameter")]
    InvalidParameter,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Vault has no bad debt to write off")]
    NoBadDebt,
}

/// Failure classes a caller can branch on without matching every code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    StateGuard,
    InsufficientBalance,
    UtilizationExceeded,
    NotSolvent,
    NotLiquidatable,
    PrecisionOverflow,
    MisconfiguredCollaborator,
    InvalidInput,
    Reentrancy,
}

impl MarginError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarginError::NotAuthorized => ErrorKind::Authorization,
            MarginError::PoolPaused
            | MarginError::EmergencyMode
            | MarginError::PoolNotInitialized
            | MarginError::PoolAlreadyInitialized => ErrorKind::StateGuard,
            MarginError::InsufficientCollateral
            | MarginError::RepayExceedsDebt
            | MarginError::InsufficientLiquidity
            | MarginError::TransferFailed => ErrorKind::InsufficientBalance,
            MarginError::UtilizationExceeded => ErrorKind::UtilizationExceeded,
            MarginError::NotSolvent => ErrorKind::NotSolvent,
            MarginError::NotLiquidatable | MarginError::NoBadDebt => ErrorKind::NotLiquidatable,
            MarginError::MathOverflow | MarginError::DivisionByZero => {
                ErrorKind::PrecisionOverflow
            }
            MarginError::MarginContractNotSet => ErrorKind::MisconfiguredCollaborator,
            MarginError::ReentrantCall => ErrorKind::Reentrancy,
            MarginError::DeadlineExceeded
            | MarginError::SlippageExceeded
            | MarginError::InvalidParameter => ErrorKind::InvalidInput,
        }
    }
}
