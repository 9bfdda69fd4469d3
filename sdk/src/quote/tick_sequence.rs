//! Contiguous run of tick arrays walked by the quote engine

use crate::core::{Tick, TickArray, TICK_ARRAY_SIZE};
use crate::error::{SdkError, SdkResult};

const WINDOW_EXHAUSTED: &str = "swap exceeds the liquidity covered by the tick array window";

/// Tick arrays ordered by start index with no gaps between them
#[derive(Debug)]
pub struct TickArraySequence<'a> {
    tick_arrays: Vec<&'a TickArray>,
    tick_spacing: u16,
    start_index: i32,
    end_index: i32,
}

impl<'a> TickArraySequence<'a> {
    /// Sort and validate the arrays; duplicated start indices collapse to one entry
    pub fn new(
        tick_arrays: impl IntoIterator<Item = &'a TickArray>,
        tick_spacing: u16,
    ) -> SdkResult<Self> {
        if tick_spacing == 0 {
            return Err(SdkError::quote("tick spacing must be positive"));
        }
        let span = tick_spacing as i32 * TICK_ARRAY_SIZE as i32;

        let mut tick_arrays: Vec<&TickArray> = tick_arrays.into_iter().collect();
        tick_arrays.sort_by_key(|array| array.start_tick_index);
        tick_arrays.dedup_by_key(|array| array.start_tick_index);

        let (first, last) = match (tick_arrays.first(), tick_arrays.last()) {
            (Some(first), Some(last)) => (first.start_tick_index, last.start_tick_index),
            _ => return Err(SdkError::quote("no tick arrays to quote against")),
        };
        if tick_arrays
            .windows(2)
            .any(|pair| pair[1].start_tick_index != pair[0].start_tick_index + span)
        {
            return Err(SdkError::quote("tick arrays are not contiguous"));
        }

        Ok(Self {
            tick_arrays,
            tick_spacing,
            start_index: first,
            end_index: last + span - 1,
        })
    }

    /// First tick covered by the sequence
    pub fn start_index(&self) -> i32 {
        self.start_index
    }

    /// Last tick covered by the sequence
    pub fn end_index(&self) -> i32 {
        self.end_index
    }

    pub fn tick(&self, tick_index: i32) -> SdkResult<&'a Tick> {
        let spacing = self.tick_spacing as i32;
        if tick_index < self.start_index || tick_index > self.end_index {
            return Err(SdkError::quote(format!(
                "tick {} is outside the tick array window",
                tick_index
            )));
        }
        if tick_index % spacing != 0 {
            return Err(SdkError::quote(format!(
                "tick {} is not a multiple of the tick spacing",
                tick_index
            )));
        }
        let span = spacing * TICK_ARRAY_SIZE as i32;
        let array_index = ((tick_index - self.start_index) / span) as usize;
        let array = self.tick_arrays[array_index];
        let offset = ((tick_index - array.start_tick_index) / spacing) as usize;
        Ok(&array.ticks[offset])
    }

    /// Nearest initialized tick strictly above `tick_index`.
    ///
    /// Returns `(None, end_index)` when no initialized tick remains inside the
    /// window, and an error once the walk has already reached the window end.
    pub fn next_initialized_tick(&self, tick_index: i32) -> SdkResult<(Option<&'a Tick>, i32)> {
        if tick_index >= self.end_index {
            return Err(SdkError::quote(WINDOW_EXHAUSTED));
        }
        let spacing = self.tick_spacing as i32;
        let mut next_index = tick_index;
        loop {
            next_index = (next_index.div_euclid(spacing) + 1) * spacing;
            if next_index > self.end_index {
                return Ok((None, self.end_index));
            }
            let tick = self.tick(next_index)?;
            if tick.initialized {
                return Ok((Some(tick), next_index));
            }
        }
    }

    /// Nearest initialized tick at or below `tick_index`.
    ///
    /// Returns `(None, start_index)` when no initialized tick remains inside
    /// the window, and an error once the walk has left the window.
    pub fn prev_initialized_tick(&self, tick_index: i32) -> SdkResult<(Option<&'a Tick>, i32)> {
        if tick_index < self.start_index {
            return Err(SdkError::quote(WINDOW_EXHAUSTED));
        }
        let spacing = self.tick_spacing as i32;
        let mut prev_index = tick_index.div_euclid(spacing) * spacing;
        loop {
            if prev_index < self.start_index {
                return Ok((None, self.start_index));
            }
            let tick = self.tick(prev_index)?;
            if tick.initialized {
                return Ok((Some(tick), prev_index));
            }
            prev_index -= spacing;
        }
    }
}
