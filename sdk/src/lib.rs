//! Swap planning SDK for a concentrated liquidity AMM with limit orders
//!
//! Turns a swap intent into a quote and the ordered instructions that
//! execute it:
//! - tick array window resolution, with zeroed stand-ins for missing arrays
//! - Token-2022 transfer fee resolution at the current epoch
//! - exact input and exact output quoting across range liquidity and
//!   resting limit orders
//! - token account preparation, the swap, and cleanup
//!
//! Signing and submission are left to the caller.
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod instructions;
pub mod prelude;
pub mod protocol;
pub mod quote;

pub use client::{swap_instructions, BaseClient, LedgerRpc, SwapPlanner};
pub use config::SdkConfig;
pub use crate::core::*;
pub use error::{SdkError, SdkResult};
pub use instructions::NativeMintWrapping;
