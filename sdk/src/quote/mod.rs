//! Off-chain swap quoting
//!
//! Quotes are computed purely from a pool snapshot, the tick array window and
//! the effective transfer fees, so identical inputs always produce identical
//! quotes.

pub mod limit_order;
pub mod swap;
pub mod tick_sequence;

pub use limit_order::get_limit_order_output_amount;
pub use swap::{compute_swap, swap_quote_by_input_token, swap_quote_by_output_token, SwapResult};
pub use tick_sequence::TickArraySequence;

use crate::core::{PoolState, SwapIntent, SwapQuote, TickArrayAccount, TransferFeeSchedule};
use crate::error::SdkResult;

/// Quote `intent` against the pool, dispatching on the swap mode
pub fn get_swap_quote(
    intent: &SwapIntent,
    pool: &PoolState,
    tick_arrays: &[TickArrayAccount],
    specified_is_token_a: bool,
    slippage_tolerance_bps: u16,
    transfer_fee_a: Option<TransferFeeSchedule>,
    transfer_fee_b: Option<TransferFeeSchedule>,
) -> SdkResult<SwapQuote> {
    let arrays = tick_arrays.iter().map(|account| &account.data);
    match *intent {
        SwapIntent::ExactIn { amount, .. } => swap_quote_by_input_token(
            amount,
            specified_is_token_a,
            slippage_tolerance_bps,
            pool,
            arrays,
            transfer_fee_a,
            transfer_fee_b,
        )
        .map(SwapQuote::ExactIn),
        SwapIntent::ExactOut { amount, .. } => swap_quote_by_output_token(
            amount,
            specified_is_token_a,
            slippage_tolerance_bps,
            pool,
            arrays,
            transfer_fee_a,
            transfer_fee_b,
        )
        .map(SwapQuote::ExactOut),
    }
}
