//! Prelude module for common imports
//!
//! Instruction data is borsh-encoded; everything else comes from solana-sdk.

pub use borsh::{BorshDeserialize, BorshSerialize};

pub use solana_sdk::{account::Account, instruction::Instruction, pubkey::Pubkey};
