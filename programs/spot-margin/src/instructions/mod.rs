pub mod admin;
pub mod execute_batch;
pub mod liquidate;
pub mod process_fees;
pub mod view;

pub use execute_batch::*;
pub use liquidate::*;
