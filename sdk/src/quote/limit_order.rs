//! Limit orders resting on ticks
//!
//! Orders placed on a tick are filled at that tick's exact price when a swap
//! crosses it, before the range liquidity beyond the tick is touched.

use ethnum::U256;

use crate::core::{Tick, FEE_RATE_MUL_VALUE};
use crate::error::{SdkError, SdkResult};

fn to_u64(value: U256) -> SdkResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(SdkError::quote("amount exceeds u64"));
    }
    Ok(value.as_u128() as u64)
}

pub(crate) fn mul_div(value: u64, numerator: u128, denominator: u128, round_up: bool) -> SdkResult<u64> {
    if denominator == 0 {
        return Err(SdkError::quote("division by zero"));
    }
    let product = U256::from(value) * U256::from(numerator);
    let denominator = U256::from(denominator);
    let quotient = product / denominator;
    if round_up && product % denominator != U256::ZERO {
        to_u64(quotient + U256::ONE)
    } else {
        to_u64(quotient)
    }
}

/// Amount an order receives for `amount_in` of its input token at `sqrt_price`.
///
/// An A to B order is paid `amount_in * price` of token B, a B to A order is
/// paid `amount_in / price` of token A, where `price = sqrt_price^2 / 2^128`.
pub fn get_limit_order_output_amount(
    amount_in: u64,
    a_to_b_order: bool,
    sqrt_price: u128,
    round_up: bool,
) -> SdkResult<u64> {
    let price = U256::from(sqrt_price) * U256::from(sqrt_price);
    if price == U256::ZERO {
        return Err(SdkError::quote("zero sqrt price"));
    }

    if a_to_b_order {
        let numerator = price
            .checked_mul(U256::from(amount_in))
            .ok_or_else(|| SdkError::quote("arithmetic overflow"))?;
        let mut amount_out = numerator >> 128;
        if round_up && numerator & (U256::from(u128::MAX)) != U256::ZERO {
            amount_out += U256::ONE;
        }
        to_u64(amount_out)
    } else {
        let numerator = U256::from(amount_in) << 128;
        let mut amount_out = numerator / price;
        if round_up && numerator % price != U256::ZERO {
            amount_out += U256::ONE;
        }
        to_u64(amount_out)
    }
}

/// Amounts exchanged against the orders of one crossed tick
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct LimitSwapComputation {
    pub amount_in: u64,
    pub fee_amount: u64,
    pub amount_out: u64,
}

/// Fill as much of the orders resting on `tick` as `amount_remaining` allows.
///
/// A taker moving A to B consumes B to A orders and vice versa, so the order
/// side is the opposite of the swap direction.
pub(crate) fn fill_limit_orders(
    tick: Option<&Tick>,
    sqrt_price: u128,
    a_to_b: bool,
    specified_input: bool,
    amount_remaining: u64,
    fee_rate: u16,
) -> SdkResult<LimitSwapComputation> {
    let mut result = LimitSwapComputation::default();
    let Some(tick) = tick else {
        return Ok(result);
    };

    let fee_rate = fee_rate as u128;
    let fee_denominator = FEE_RATE_MUL_VALUE as u128;
    let orders_input = tick.fillable_orders_input();
    if orders_input == 0 {
        return Ok(result);
    }

    if specified_input {
        result.amount_in = get_limit_order_output_amount(orders_input, !a_to_b, sqrt_price, true)?;
        result.amount_out = orders_input;
        result.fee_amount =
            mul_div(result.amount_in, fee_rate, fee_denominator - fee_rate, true)?;

        let required = result
            .amount_in
            .checked_add(result.fee_amount)
            .ok_or_else(|| SdkError::quote("arithmetic overflow"))?;
        if amount_remaining < required {
            let available_in = result.amount_in;
            result.fee_amount = mul_div(amount_remaining, fee_rate, fee_denominator, true)?;
            result.amount_in = amount_remaining.saturating_sub(result.fee_amount);
            result.amount_out =
                mul_div(orders_input, result.amount_in as u128, available_in as u128, false)?;
        }
    } else {
        result.amount_out = orders_input.min(amount_remaining);
        result.amount_in =
            get_limit_order_output_amount(result.amount_out, !a_to_b, sqrt_price, true)?;
        result.fee_amount =
            mul_div(result.amount_in, fee_rate, fee_denominator - fee_rate, true)?;
    }

    Ok(result)
}
