//! Swap simulation across the tick array window
//!
//! The engine walks initialized ticks in the swap direction. Between ticks
//! the trade runs against range liquidity. At every crossed tick the limit
//! orders resting there are filled at the tick price, then the tick's
//! liquidity delta is applied.

use orca_whirlpools_core::{
    sqrt_price_to_tick_index, tick_index_to_sqrt_price, try_apply_swap_fee,
    try_apply_transfer_fee, try_get_amount_delta_a, try_get_amount_delta_b,
    try_get_max_amount_with_slippage_tolerance, try_get_min_amount_with_slippage_tolerance,
    try_get_next_sqrt_price_from_a, try_get_next_sqrt_price_from_b, try_reverse_apply_swap_fee,
    try_reverse_apply_transfer_fee, TransferFee, MAX_SQRT_PRICE, MIN_SQRT_PRICE,
};

use super::limit_order::fill_limit_orders;
use super::tick_sequence::TickArraySequence;
use crate::core::{
    ExactInSwapQuote, ExactOutSwapQuote, PoolState, Tick, TickArray, TransferFeeSchedule,
};
use crate::error::{SdkError, SdkResult};

/// Amounts moved by a simulated swap, before transfer fees and slippage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapResult {
    pub token_a: u64,
    pub token_b: u64,
    pub fee_amount: u64,
    pub next_sqrt_price: u128,
}

fn transfer_fee(schedule: Option<TransferFeeSchedule>) -> TransferFee {
    schedule.map(TransferFee::from).unwrap_or_default()
}

fn overflow() -> SdkError {
    SdkError::quote("arithmetic overflow")
}

/// Quote a swap that spends exactly `token_in` of the specified token.
///
/// The input transfer fee is withheld before the tokens reach the pool and
/// the output transfer fee is withheld on the way out, so both reduce the
/// estimated output.
pub fn swap_quote_by_input_token<'a>(
    token_in: u64,
    specified_token_a: bool,
    slippage_tolerance_bps: u16,
    pool: &PoolState,
    tick_arrays: impl IntoIterator<Item = &'a TickArray>,
    transfer_fee_a: Option<TransferFeeSchedule>,
    transfer_fee_b: Option<TransferFeeSchedule>,
) -> SdkResult<ExactInSwapQuote> {
    let (fee_in, fee_out) = if specified_token_a {
        (transfer_fee(transfer_fee_a), transfer_fee(transfer_fee_b))
    } else {
        (transfer_fee(transfer_fee_b), transfer_fee(transfer_fee_a))
    };
    let token_in_after_fee =
        try_apply_transfer_fee(token_in.into(), fee_in).map_err(SdkError::quote)?;

    let tick_sequence = TickArraySequence::new(tick_arrays, pool.tick_spacing)?;
    let swap_result = compute_swap(
        token_in_after_fee,
        0,
        pool,
        &tick_sequence,
        specified_token_a,
        true,
    )?;

    let (token_in_swapped, token_est_out_before_fee) = if specified_token_a {
        (swap_result.token_a, swap_result.token_b)
    } else {
        (swap_result.token_b, swap_result.token_a)
    };

    let token_in =
        try_reverse_apply_transfer_fee(token_in_swapped, fee_in).map_err(SdkError::quote)?;
    let token_est_out =
        try_apply_transfer_fee(token_est_out_before_fee, fee_out).map_err(SdkError::quote)?;
    let token_min_out =
        try_get_min_amount_with_slippage_tolerance(token_est_out, slippage_tolerance_bps)
            .map_err(SdkError::quote)?;

    Ok(ExactInSwapQuote {
        token_in,
        token_est_out,
        token_min_out,
        trade_fee: swap_result.fee_amount,
        next_sqrt_price: swap_result.next_sqrt_price,
    })
}

/// Quote a swap that delivers exactly `token_out` of the specified token.
///
/// The output is grossed up by its transfer fee before simulating, and the
/// simulated input is grossed up by the input transfer fee.
pub fn swap_quote_by_output_token<'a>(
    token_out: u64,
    specified_token_a: bool,
    slippage_tolerance_bps: u16,
    pool: &PoolState,
    tick_arrays: impl IntoIterator<Item = &'a TickArray>,
    transfer_fee_a: Option<TransferFeeSchedule>,
    transfer_fee_b: Option<TransferFeeSchedule>,
) -> SdkResult<ExactOutSwapQuote> {
    let (fee_in, fee_out) = if specified_token_a {
        (transfer_fee(transfer_fee_b), transfer_fee(transfer_fee_a))
    } else {
        (transfer_fee(transfer_fee_a), transfer_fee(transfer_fee_b))
    };
    let token_out_before_fee =
        try_reverse_apply_transfer_fee(token_out, fee_out).map_err(SdkError::quote)?;

    let tick_sequence = TickArraySequence::new(tick_arrays, pool.tick_spacing)?;
    let swap_result = compute_swap(
        token_out_before_fee,
        0,
        pool,
        &tick_sequence,
        !specified_token_a,
        false,
    )?;

    let (token_out_swapped, token_est_in_before_fee) = if specified_token_a {
        (swap_result.token_a, swap_result.token_b)
    } else {
        (swap_result.token_b, swap_result.token_a)
    };

    let token_out =
        try_apply_transfer_fee(token_out_swapped, fee_out).map_err(SdkError::quote)?;
    let token_est_in = try_reverse_apply_transfer_fee(token_est_in_before_fee, fee_in)
        .map_err(SdkError::quote)?;
    let token_max_in =
        try_get_max_amount_with_slippage_tolerance(token_est_in, slippage_tolerance_bps)
            .map_err(SdkError::quote)?;

    Ok(ExactOutSwapQuote {
        token_out,
        token_est_in,
        token_max_in,
        trade_fee: swap_result.fee_amount,
        next_sqrt_price: swap_result.next_sqrt_price,
    })
}

/// Simulate a swap of `token_amount` against the pool.
///
/// A `sqrt_price_limit` of zero means the protocol bound in the swap
/// direction. The simulation fails if the window runs out of ticks before
/// the amount is consumed. Transfer fees and slippage are not applied here.
pub fn compute_swap(
    token_amount: u64,
    sqrt_price_limit: u128,
    pool: &PoolState,
    tick_sequence: &TickArraySequence<'_>,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<SwapResult> {
    let sqrt_price_limit = match sqrt_price_limit {
        0 if a_to_b => MIN_SQRT_PRICE,
        0 => MAX_SQRT_PRICE,
        limit => limit,
    };
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price_limit) {
        return Err(SdkError::quote("sqrt price limit out of bounds"));
    }
    if (a_to_b && sqrt_price_limit >= pool.sqrt_price)
        || (!a_to_b && sqrt_price_limit <= pool.sqrt_price)
    {
        return Err(SdkError::quote("sqrt price limit is on the wrong side of the pool price"));
    }
    if token_amount == 0 {
        return Err(SdkError::quote("zero tradable amount"));
    }

    let mut amount_remaining = token_amount;
    let mut amount_calculated = 0u64;
    let mut current_sqrt_price = pool.sqrt_price;
    let mut current_tick_index = pool.tick_current_index;
    let mut current_liquidity = pool.liquidity;
    let mut fee_amount = 0u64;

    while amount_remaining > 0 && sqrt_price_limit != current_sqrt_price {
        let (next_tick, next_tick_index) = if a_to_b {
            tick_sequence.prev_initialized_tick(current_tick_index)?
        } else {
            tick_sequence.next_initialized_tick(current_tick_index)?
        };
        let next_tick_sqrt_price: u128 = tick_index_to_sqrt_price(next_tick_index).into();
        let target_sqrt_price = if a_to_b {
            next_tick_sqrt_price.max(sqrt_price_limit)
        } else {
            next_tick_sqrt_price.min(sqrt_price_limit)
        };

        let step = compute_swap_step(
            amount_remaining,
            pool.fee_rate,
            current_liquidity,
            current_sqrt_price,
            target_sqrt_price,
            a_to_b,
            specified_input,
        )?;
        fee_amount = fee_amount.checked_add(step.fee_amount).ok_or_else(overflow)?;
        (amount_remaining, amount_calculated) = apply_amounts(
            amount_remaining,
            amount_calculated,
            step.amount_in,
            step.amount_out,
            step.fee_amount,
            specified_input,
        )?;

        if step.next_sqrt_price == next_tick_sqrt_price {
            let orders = fill_limit_orders(
                next_tick,
                next_tick_sqrt_price,
                a_to_b,
                specified_input,
                amount_remaining,
                pool.fee_rate,
            )?;
            fee_amount = fee_amount.checked_add(orders.fee_amount).ok_or_else(overflow)?;
            (amount_remaining, amount_calculated) = apply_amounts(
                amount_remaining,
                amount_calculated,
                orders.amount_in,
                orders.amount_out,
                orders.fee_amount,
                specified_input,
            )?;

            current_liquidity = next_liquidity(current_liquidity, next_tick, a_to_b)?;
            current_tick_index = if a_to_b {
                next_tick_index - 1
            } else {
                next_tick_index
            };
        } else if step.next_sqrt_price != current_sqrt_price {
            current_tick_index = sqrt_price_to_tick_index(step.next_sqrt_price.into());
        }

        current_sqrt_price = step.next_sqrt_price;
    }

    let swapped_amount = token_amount - amount_remaining;
    let (token_a, token_b) = if a_to_b == specified_input {
        (swapped_amount, amount_calculated)
    } else {
        (amount_calculated, swapped_amount)
    };

    Ok(SwapResult {
        token_a,
        token_b,
        fee_amount,
        next_sqrt_price: current_sqrt_price,
    })
}

fn apply_amounts(
    amount_remaining: u64,
    amount_calculated: u64,
    amount_in: u64,
    amount_out: u64,
    fee_amount: u64,
    specified_input: bool,
) -> SdkResult<(u64, u64)> {
    if specified_input {
        let remaining = amount_remaining
            .checked_sub(amount_in)
            .and_then(|value| value.checked_sub(fee_amount))
            .ok_or_else(overflow)?;
        let calculated = amount_calculated.checked_add(amount_out).ok_or_else(overflow)?;
        Ok((remaining, calculated))
    } else {
        let remaining = amount_remaining.checked_sub(amount_out).ok_or_else(overflow)?;
        let calculated = amount_calculated
            .checked_add(amount_in)
            .and_then(|value| value.checked_add(fee_amount))
            .ok_or_else(overflow)?;
        Ok((remaining, calculated))
    }
}

fn next_liquidity(current_liquidity: u128, next_tick: Option<&Tick>, a_to_b: bool) -> SdkResult<u128> {
    let liquidity_net = next_tick.map(|tick| tick.liquidity_net).unwrap_or(0);
    let delta = liquidity_net.unsigned_abs();
    // Crossing downward applies the negated net liquidity.
    let adds = (liquidity_net < 0) == a_to_b;
    let next = if adds {
        current_liquidity.checked_add(delta)
    } else {
        current_liquidity.checked_sub(delta)
    };
    next.ok_or_else(|| SdkError::quote("liquidity out of range while crossing tick"))
}

struct SwapStepQuote {
    amount_in: u64,
    amount_out: u64,
    next_sqrt_price: u128,
    fee_amount: u64,
}

fn compute_swap_step(
    amount_remaining: u64,
    fee_rate: u16,
    current_liquidity: u128,
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<SwapStepQuote> {
    // Only an overflowing fixed delta is recoverable; it means the target is out of reach.
    let initial_fixed_delta = amount_fixed_delta(
        current_sqrt_price,
        target_sqrt_price,
        current_liquidity,
        a_to_b,
        specified_input,
    );

    let amount_calculated = if specified_input {
        try_apply_swap_fee(amount_remaining.into(), fee_rate.into()).map_err(SdkError::quote)?
    } else {
        amount_remaining
    };

    let reaches_target = matches!(initial_fixed_delta, Ok(delta) if delta <= amount_calculated);
    let next_sqrt_price = if reaches_target {
        target_sqrt_price
    } else {
        next_sqrt_price(
            current_sqrt_price,
            current_liquidity,
            amount_calculated,
            a_to_b,
            specified_input,
        )?
    };
    let is_max_swap = next_sqrt_price == target_sqrt_price;

    let unfixed_delta = amount_unfixed_delta(
        current_sqrt_price,
        next_sqrt_price,
        current_liquidity,
        a_to_b,
        specified_input,
    )?;
    let fixed_delta = match initial_fixed_delta {
        Ok(delta) if is_max_swap => delta,
        _ => amount_fixed_delta(
            current_sqrt_price,
            next_sqrt_price,
            current_liquidity,
            a_to_b,
            specified_input,
        )?,
    };

    let (amount_in, mut amount_out) = if specified_input {
        (fixed_delta, unfixed_delta)
    } else {
        (unfixed_delta, fixed_delta)
    };
    if !specified_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if specified_input && !is_max_swap {
        amount_remaining.checked_sub(amount_in).ok_or_else(overflow)?
    } else {
        let pre_fee_amount =
            try_reverse_apply_swap_fee(amount_in.into(), fee_rate.into()).map_err(SdkError::quote)?;
        pre_fee_amount.checked_sub(amount_in).ok_or_else(overflow)?
    };

    Ok(SwapStepQuote {
        amount_in,
        amount_out,
        next_sqrt_price,
        fee_amount,
    })
}

fn amount_fixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<u64> {
    let delta = if a_to_b == specified_input {
        try_get_amount_delta_a(
            current_sqrt_price.into(),
            target_sqrt_price.into(),
            liquidity.into(),
            specified_input,
        )
    } else {
        try_get_amount_delta_b(
            current_sqrt_price.into(),
            target_sqrt_price.into(),
            liquidity.into(),
            specified_input,
        )
    };
    delta.map_err(SdkError::quote)
}

fn amount_unfixed_delta(
    current_sqrt_price: u128,
    target_sqrt_price: u128,
    liquidity: u128,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<u64> {
    let delta = if a_to_b == specified_input {
        try_get_amount_delta_b(
            current_sqrt_price.into(),
            target_sqrt_price.into(),
            liquidity.into(),
            !specified_input,
        )
    } else {
        try_get_amount_delta_a(
            current_sqrt_price.into(),
            target_sqrt_price.into(),
            liquidity.into(),
            !specified_input,
        )
    };
    delta.map_err(SdkError::quote)
}

fn next_sqrt_price(
    current_sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    a_to_b: bool,
    specified_input: bool,
) -> SdkResult<u128> {
    let price = if a_to_b == specified_input {
        try_get_next_sqrt_price_from_a(
            current_sqrt_price.into(),
            liquidity.into(),
            amount.into(),
            specified_input,
        )
    } else {
        try_get_next_sqrt_price_from_b(
            current_sqrt_price.into(),
            liquidity.into(),
            amount.into(),
            specified_input,
        )
    };
    price.map(Into::into).map_err(SdkError::quote)
}
