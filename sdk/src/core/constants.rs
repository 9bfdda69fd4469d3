use crate::prelude::*;

/// Program ID of the concentrated liquidity AMM
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("fUSioN9YKKSa3CUC2YUc4tPkHJ5Y6XW1yz8y6F7qWz9");

/// SPL memo program, referenced by the swap instruction for Token-2022 memo transfers
pub const MEMO_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Get the program ID as a Pubkey
pub fn program_id() -> Pubkey {
    PROGRAM_ID
}

/// Seeds for common PDAs
pub mod seeds {
    pub const TICK_ARRAY: &[u8] = b"tick_array";
}

/// Number of tick slots per tick array account
pub const TICK_ARRAY_SIZE: usize = 88;

/// Number of tick arrays consulted by a single swap
pub const SWAP_TICK_ARRAY_COUNT: usize = 5;

/// Tick arrays referenced by the swap instruction's fixed account schema
pub const FIXED_TICK_ARRAY_COUNT: usize = 3;

/// Tick arrays appended after the fixed schema as supplemental accounts
pub const SUPPLEMENTAL_TICK_ARRAY_COUNT: usize = SWAP_TICK_ARRAY_COUNT - FIXED_TICK_ARRAY_COUNT;

/// Position of each tick array in the resolved window, in array-width offsets
/// from the array containing the current tick.
///
/// Slots 0..3 feed the swap instruction's `tick_array_0..2` accounts and slots
/// 3..5 are passed as supplemental tick arrays. Reordering this table changes
/// which liquidity the program consults.
pub const TICK_ARRAY_WINDOW_OFFSETS: [i32; SWAP_TICK_ARRAY_COUNT] = [0, 1, 2, -1, -2];

/// Tick bounds supported by the protocol
pub const MIN_TICK_INDEX: i32 = -443636;
pub const MAX_TICK_INDEX: i32 = 443636;

/// Denominator of the pool fee rate (hundredths of a basis point)
pub const FEE_RATE_MUL_VALUE: u32 = 1_000_000;

/// Denominator for basis point values
pub const BPS_DENOMINATOR: u16 = 10_000;

/// Default slippage tolerance (1%)
pub const DEFAULT_SLIPPAGE_TOLERANCE_BPS: u16 = 100;

/// Anchor account discriminators
pub const FUSION_POOL_DISCRIMINATOR: [u8; 8] = [0xfe, 0xcc, 0xcf, 0x62, 0x19, 0xb5, 0x1d, 0x43];
pub const TICK_ARRAY_DISCRIMINATOR: [u8; 8] = [0x45, 0x61, 0xbd, 0xbe, 0x6e, 0x07, 0x42, 0xbb];
