//! Buffer-level scheduling over a fixed pool of `b` slots.
//!
//! Each step looks at the pool and the smallest level `L` among Full buffers:
//! - one Empty slot: NEW into it at level `L`;
//! - two or more Empty slots: NEW into each at the base level (0 exact,
//!   1 sampled) until the input runs out;
//! - no Empty slot: COLLAPSE every Full buffer at level `L` into one at
//!   level `L + 1` (sampled mode then grows the rate).
//!
//! The levels form an implicit merge tree; only the pool is ever stored.

use crate::mrl::buffer::Buffer;
use crate::mrl::engine::{Engine, FillMode};
use crate::mrl::options::SummaryMode;
use crate::{MrlError, MrlResult};

/// What one [`Scheduler::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// NEW ran on this many slots.
    Filled(usize),
    /// COLLAPSE merged this many buffers at this level.
    Collapsed { level: u32, merged: usize },
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    pool: Vec<Buffer>,
    mode: SummaryMode,
    rate: u64,
    collapses: u64,
}

impl Scheduler {
    pub fn new(capacity: usize, buffer_count: usize, mode: SummaryMode) -> MrlResult<Self> {
        if capacity == 0 {
            return Err(MrlError::InvalidParameter {
                what: "capacity must be >= 1",
            });
        }
        if buffer_count < 2 {
            return Err(MrlError::InvalidParameter {
                what: "buffer count must be >= 2",
            });
        }
        let rate = match mode {
            SummaryMode::Exact => 1,
            SummaryMode::Sampled(policy) => {
                policy.validate()?;
                policy.initial_rate
            }
        };
        Ok(Self {
            pool: (0..buffer_count).map(|_| Buffer::new(capacity)).collect(),
            mode,
            rate,
            collapses: 0,
        })
    }

    /// Smallest level among Full buffers (`None` when nothing is Full).
    pub fn min_full_level(&self) -> Option<u32> {
        self.pool
            .iter()
            .filter(|b| b.is_full())
            .filter_map(|b| b.level())
            .min()
    }

    #[inline]
    fn fill_mode(&self) -> FillMode {
        match self.mode {
            SummaryMode::Exact => FillMode::Exact,
            SummaryMode::Sampled(_) => FillMode::Sampled { rate: self.rate },
        }
    }

    /// Drive `engine` until its input is exhausted, then seal any Partial
    /// buffer so the whole pool is ready for OUTPUT.
    pub fn run<I: Iterator<Item = f64>>(&mut self, engine: &mut Engine<I>) -> MrlResult<()> {
        while !engine.is_exhausted()? {
            self.step(engine)?;
        }
        for b in self.pool.iter_mut().filter(|b| !b.is_empty() && !b.is_full()) {
            engine.seal(b)?;
        }
        log::debug!(
            "scheduler done: {} collapses, levels {:?}, beta {:.6}",
            self.collapses,
            self.levels(),
            engine.beta()
        );
        Ok(())
    }

    /// One scheduling decision. Requires unconsumed input when any slot is
    /// Empty.
    pub fn step<I: Iterator<Item = f64>>(&mut self, engine: &mut Engine<I>) -> MrlResult<Step> {
        let empties: Vec<usize> = self
            .pool
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_empty())
            .map(|(i, _)| i)
            .collect();
        let floor = self.min_full_level();
        let mode = self.fill_mode();

        match empties.as_slice() {
            [] => self.collapse_level(engine, floor),
            [only] => {
                let level = floor.unwrap_or_else(|| self.mode.base_level());
                let slot = &mut self.pool[*only];
                engine.fill(slot, mode)?;
                slot.set_level(level);
                log::trace!("NEW slot {} at level {}", only, level);
                Ok(Step::Filled(1))
            }
            many => {
                let level = self.mode.base_level();
                let mut filled = 0;
                for &idx in many {
                    if filled > 0 && engine.is_exhausted()? {
                        break;
                    }
                    let slot = &mut self.pool[idx];
                    engine.fill(slot, mode)?;
                    slot.set_level(level);
                    filled += 1;
                }
                log::trace!("NEW {} slots at level {}", filled, level);
                Ok(Step::Filled(filled))
            }
        }
    }

    fn collapse_level<I: Iterator<Item = f64>>(
        &mut self,
        engine: &mut Engine<I>,
        floor: Option<u32>,
    ) -> MrlResult<Step> {
        let level = floor.ok_or(MrlError::PreconditionViolation {
            what: "no Empty slot and no Full buffer to collapse",
        })?;
        let mut members: Vec<&mut Buffer> = self
            .pool
            .iter_mut()
            .filter(|b| b.is_full() && b.level() == Some(level))
            .collect();
        let merged = members.len();
        engine.collapse(&mut members)?;
        members[0].set_level(level + 1);
        self.collapses += 1;

        if let SummaryMode::Sampled(policy) = self.mode {
            self.rate = policy.next_rate(self.rate);
        }
        log::debug!(
            "COLLAPSE {} buffers at level {} -> level {} (rate {})",
            merged,
            level,
            level + 1,
            self.rate
        );
        Ok(Step::Collapsed { level, merged })
    }

    #[inline]
    pub fn buffers(&self) -> &[Buffer] {
        &self.pool
    }

    /// Level of every slot, `None` for Empty ones.
    pub fn levels(&self) -> Vec<Option<u32>> {
        self.pool.iter().map(|b| b.level()).collect()
    }

    #[inline]
    pub fn mode(&self) -> SummaryMode {
        self.mode
    }

    /// Current sampling rate (1 in exact mode).
    #[inline]
    pub fn rate(&self) -> u64 {
        self.rate
    }

    #[inline]
    pub fn collapses(&self) -> u64 {
        self.collapses
    }
}
