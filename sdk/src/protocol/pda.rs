use crate::core::constants::*;
use crate::prelude::*;

/// Unified PDA builder for protocol addresses
#[derive(Clone, Copy, Debug)]
pub struct PdaBuilder {
    pub program_id: Pubkey,
}

impl PdaBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    /// Tick array seeds carry the start index as its decimal string.
    pub fn tick_array(&self, fusion_pool: &Pubkey, start_tick_index: i32) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                seeds::TICK_ARRAY,
                fusion_pool.as_ref(),
                start_tick_index.to_string().as_bytes(),
            ],
            &self.program_id,
        )
    }
}

impl Default for PdaBuilder {
    fn default() -> Self {
        Self::new(program_id())
    }
}

/// Convenience function for one-off tick array derivations
pub fn find_tick_array_address(fusion_pool: &Pubkey, start_tick_index: i32) -> (Pubkey, u8) {
    PdaBuilder::default().tick_array(fusion_pool, start_tick_index)
}

/// Start index of the tick array containing `tick_index`, rounding toward negative infinity
pub fn get_tick_array_start_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let span = tick_spacing as i32 * TICK_ARRAY_SIZE as i32;
    tick_index.div_euclid(span) * span
}
