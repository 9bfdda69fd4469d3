//! Tick array window resolution
//!
//! A swap may touch up to five tick arrays around the current tick. All five
//! addresses are derived locally and fetched in one batch; accounts that do
//! not exist yet are replaced by zeroed stand-ins so quoting and instruction
//! assembly can proceed.

use tracing::debug;

use super::base::LedgerRpc;
use crate::core::{
    PoolAccount, TickArray, TickArrayAccount, TickArraySource, SWAP_TICK_ARRAY_COUNT,
    TICK_ARRAY_WINDOW_OFFSETS,
};
use crate::error::{SdkError, SdkResult};
use crate::protocol::{get_tick_array_start_tick_index, PdaBuilder};

/// Start indices of the window in window order:
/// `[base, base + span, base + 2 * span, base - span, base - 2 * span]`
pub fn tick_array_window_start_indices(
    tick_current_index: i32,
    tick_spacing: u16,
) -> [i32; SWAP_TICK_ARRAY_COUNT] {
    let base = get_tick_array_start_tick_index(tick_current_index, tick_spacing);
    let span = tick_spacing as i32 * crate::core::TICK_ARRAY_SIZE as i32;
    TICK_ARRAY_WINDOW_OFFSETS.map(|offset| base + offset * span)
}

/// Resolve the five tick arrays a swap against `pool` may reference.
///
/// Never fails because an array is missing; missing arrays come back as
/// synthetic accounts owned by the pool's program.
pub async fn fetch_tick_arrays_or_default<R: LedgerRpc + ?Sized>(
    rpc: &R,
    pda: &PdaBuilder,
    pool: &PoolAccount,
) -> SdkResult<[TickArrayAccount; SWAP_TICK_ARRAY_COUNT]> {
    let start_indices =
        tick_array_window_start_indices(pool.data.tick_current_index, pool.data.tick_spacing);
    let addresses = start_indices.map(|start| pda.tick_array(&pool.address, start).0);

    let accounts = rpc.get_multiple_accounts(&addresses).await?;
    if accounts.len() != SWAP_TICK_ARRAY_COUNT {
        return Err(SdkError::Rpc(format!(
            "expected {} tick array accounts, got {}",
            SWAP_TICK_ARRAY_COUNT,
            accounts.len()
        )));
    }

    let mut window = Vec::with_capacity(SWAP_TICK_ARRAY_COUNT);
    for ((start, address), account) in start_indices.into_iter().zip(addresses).zip(accounts) {
        let resolved = match account {
            Some(account) => TickArrayAccount {
                address,
                owner: account.owner,
                data: TickArray::from_account_data(address, &account.data)?,
                source: TickArraySource::Materialized,
            },
            None => TickArrayAccount {
                address,
                owner: pool.owner,
                data: TickArray::uninitialized(pool.address, start),
                source: TickArraySource::Synthetic,
            },
        };
        window.push(resolved);
    }

    let synthetic = window.iter().filter(|array| array.is_synthetic()).count();
    debug!(
        pool = %pool.address,
        ?start_indices,
        synthetic,
        "resolved tick array window"
    );

    window
        .try_into()
        .map_err(|_| SdkError::Rpc("tick array window is incomplete".to_string()))
}
