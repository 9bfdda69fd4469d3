use serde::Serialize;

use crate::core::constants::*;
use crate::prelude::*;

/// Snapshot of a pool account taken at the start of a planning call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    pub bump: u8,
    pub version: u16,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    pub tick_spacing: u16,
    pub tick_spacing_seed: [u8; 2],
    /// Swap fee in hundredths of a basis point
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub clp_to_olp_reward_ratio: u16,
    pub order_protocol_fee_rate: u16,
    pub liquidity: u128,
    /// Q64.64 square root of the price of token A in token B
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,
    pub orders_total_amount_a: u64,
    pub orders_total_amount_b: u64,
    pub orders_filled_amount_a: u64,
    pub orders_filled_amount_b: u64,
    pub olp_fee_owed_a: u64,
    pub olp_fee_owed_b: u64,
}

impl PoolState {
    /// Width of one tick array in ticks
    pub fn tick_array_span(&self) -> i32 {
        self.tick_spacing as i32 * TICK_ARRAY_SIZE as i32
    }

    /// Returns `Some(true)` when `mint` is token A, `Some(false)` for token B
    /// and `None` when the mint is not traded by this pool.
    pub fn side_of(&self, mint: &Pubkey) -> Option<bool> {
        if *mint == self.token_mint_a {
            Some(true)
        } else if *mint == self.token_mint_b {
            Some(false)
        } else {
            None
        }
    }
}

/// Pool state together with the account it was read from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolAccount {
    pub address: Pubkey,
    /// Program owning the pool; synthetic tick arrays inherit it
    pub owner: Pubkey,
    pub data: PoolState,
}

/// A single tick slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub initialized: bool,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub age: u64,
    /// Input volume of orders resting on this tick that have not been touched
    pub open_orders_input: u64,
    pub part_filled_orders_input: u64,
    pub part_filled_orders_remaining_input: u64,
    pub fulfilled_a_to_b_orders_input: u64,
    pub fulfilled_b_to_a_orders_input: u64,
}

impl Tick {
    /// Order input still available to a taker crossing this tick
    pub fn fillable_orders_input(&self) -> u64 {
        self.open_orders_input
            .saturating_add(self.part_filled_orders_remaining_input)
    }
}

/// Fixed-size block of ticks stored as one account
///
/// Ticks live on the heap so a window of arrays stays small inside futures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: Box<[Tick; TICK_ARRAY_SIZE]>,
    pub fusion_pool: Pubkey,
}

impl TickArray {
    /// All slots zeroed and uninitialized
    pub fn uninitialized(fusion_pool: Pubkey, start_tick_index: i32) -> Self {
        Self {
            start_tick_index,
            ticks: Box::new([Tick::default(); TICK_ARRAY_SIZE]),
            fusion_pool,
        }
    }

    pub fn initialized_tick_count(&self) -> usize {
        self.ticks.iter().filter(|tick| tick.initialized).count()
    }
}

/// Where a window slot's data came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickArraySource {
    /// Decoded from an existing ledger account
    Materialized,
    /// Zeroed stand-in for an account that does not exist yet
    Synthetic,
}

/// Tick array plus the address the swap instruction must reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickArrayAccount {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub data: TickArray,
    pub source: TickArraySource,
}

impl TickArrayAccount {
    pub fn is_synthetic(&self) -> bool {
        self.source == TickArraySource::Synthetic
    }
}

/// Transfer fee charged by a Token-2022 mint at a given epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransferFeeSchedule {
    pub fee_bps: u16,
    pub max_fee: u64,
}

impl TransferFeeSchedule {
    pub fn new(fee_bps: u16, max_fee: u64) -> Self {
        Self { fee_bps, max_fee }
    }
}

impl From<TransferFeeSchedule> for orca_whirlpools_core::TransferFee {
    fn from(schedule: TransferFeeSchedule) -> Self {
        orca_whirlpools_core::TransferFee {
            fee_bps: schedule.fee_bps,
            max_fee: schedule.max_fee,
        }
    }
}

/// Whether the caller fixed the input or the output amount
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SwapMode {
    ExactIn,
    ExactOut,
}

/// What the caller wants to trade
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapIntent {
    /// Spend exactly `amount` of `mint`
    ExactIn { amount: u64, mint: Pubkey },
    /// Receive exactly `amount` of `mint`
    ExactOut { amount: u64, mint: Pubkey },
}

impl SwapIntent {
    pub fn exact_in(amount: u64, mint: Pubkey) -> Self {
        SwapIntent::ExactIn { amount, mint }
    }

    pub fn exact_out(amount: u64, mint: Pubkey) -> Self {
        SwapIntent::ExactOut { amount, mint }
    }

    /// The amount the caller fixed
    pub fn amount(&self) -> u64 {
        match self {
            SwapIntent::ExactIn { amount, .. } | SwapIntent::ExactOut { amount, .. } => *amount,
        }
    }

    /// The mint the fixed amount is denominated in
    pub fn mint(&self) -> Pubkey {
        match self {
            SwapIntent::ExactIn { mint, .. } | SwapIntent::ExactOut { mint, .. } => *mint,
        }
    }

    pub fn mode(&self) -> SwapMode {
        match self {
            SwapIntent::ExactIn { .. } => SwapMode::ExactIn,
            SwapIntent::ExactOut { .. } => SwapMode::ExactOut,
        }
    }

    pub fn is_exact_input(&self) -> bool {
        self.mode() == SwapMode::ExactIn
    }
}

/// Swap direction for concentrated liquidity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SwapDirection {
    /// Swapping token A for token B (price decreases)
    AToB,
    /// Swapping token B for token A (price increases)
    BToA,
}

impl SwapDirection {
    /// Exact input of A and exact output of B both move tokens A -> B.
    pub fn derive(specified_is_token_a: bool, is_exact_input: bool) -> Self {
        if specified_is_token_a == is_exact_input {
            SwapDirection::AToB
        } else {
            SwapDirection::BToA
        }
    }

    pub fn is_a_to_b(&self) -> bool {
        *self == SwapDirection::AToB
    }
}

/// Quote for a swap with a fixed input amount
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExactInSwapQuote {
    pub token_in: u64,
    pub token_est_out: u64,
    /// Slippage-adjusted minimum acceptable output
    pub token_min_out: u64,
    pub trade_fee: u64,
    pub next_sqrt_price: u128,
}

/// Quote for a swap with a fixed output amount
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExactOutSwapQuote {
    pub token_out: u64,
    pub token_est_in: u64,
    /// Slippage-adjusted maximum acceptable input
    pub token_max_in: u64,
    pub trade_fee: u64,
    pub next_sqrt_price: u128,
}

/// Quote tagged by the swap mode that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode")]
pub enum SwapQuote {
    ExactIn(ExactInSwapQuote),
    ExactOut(ExactOutSwapQuote),
}

impl SwapQuote {
    pub fn mode(&self) -> SwapMode {
        match self {
            SwapQuote::ExactIn(_) => SwapMode::ExactIn,
            SwapQuote::ExactOut(_) => SwapMode::ExactOut,
        }
    }

    /// Protective bound passed to the program as `other_amount_threshold`
    pub fn other_amount_threshold(&self) -> u64 {
        match self {
            SwapQuote::ExactIn(quote) => quote.token_min_out,
            SwapQuote::ExactOut(quote) => quote.token_max_in,
        }
    }

    /// Largest input the trade may consume, used to size token accounts
    pub fn max_input(&self) -> u64 {
        match self {
            SwapQuote::ExactIn(quote) => quote.token_in,
            SwapQuote::ExactOut(quote) => quote.token_max_in,
        }
    }

    pub fn trade_fee(&self) -> u64 {
        match self {
            SwapQuote::ExactIn(quote) => quote.trade_fee,
            SwapQuote::ExactOut(quote) => quote.trade_fee,
        }
    }

    pub fn next_sqrt_price(&self) -> u128 {
        match self {
            SwapQuote::ExactIn(quote) => quote.next_sqrt_price,
            SwapQuote::ExactOut(quote) => quote.next_sqrt_price,
        }
    }
}

/// Instructions and quote for executing a swap
#[derive(Clone, Debug, PartialEq)]
pub struct SwapPlan {
    /// Token account preparation, the swap, then cleanup
    pub instructions: Vec<Instruction>,
    pub quote: SwapQuote,
    pub direction: SwapDirection,
    /// Start indices of the tick array window, in window order
    pub tick_array_start_indices: [i32; SWAP_TICK_ARRAY_COUNT],
}

impl SwapPlan {
    pub fn a_to_b(&self) -> bool {
        self.direction.is_a_to_b()
    }
}
