//! Energy buffers and the fractional progress accumulator.
//!
//! Machines bank energy toward a recipe's cost a little each tick, capped by
//! their transfer rate. Banked progress is stored in Q64.64 fixed point so a
//! consumption boost that does not divide the spend evenly loses nothing
//! between ticks, and costs well past `i32::MAX` still bank exactly.

use crate::fixed::{Fixed64, Fixed128, wide_from_u64};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyBuffer {
    stored: u64,
    capacity: u64,
}

impl EnergyBuffer {
    pub fn new(capacity: u64) -> Self {
        Self {
            stored: 0,
            capacity,
        }
    }

    /// Add energy up to capacity. Returns the amount accepted.
    pub fn charge(&mut self, amount: u64) -> u64 {
        let accepted = amount.min(self.free_space());
        self.stored += accepted;
        accepted
    }

    /// Remove up to `amount`. Returns the amount removed.
    pub fn consume(&mut self, amount: u64) -> u64 {
        let removed = amount.min(self.stored);
        self.stored -= removed;
        removed
    }

    pub fn stored(&self) -> u64 {
        self.stored
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn free_space(&self) -> u64 {
        self.capacity.saturating_sub(self.stored)
    }

    pub fn is_empty(&self) -> bool {
        self.stored == 0
    }
}

/// Upgrade multipliers. `speed` scales the transfer rate, `consumption`
/// scales the energy paid per unit of progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boosts {
    pub speed: Fixed64,
    pub consumption: Fixed64,
}

impl Default for Boosts {
    fn default() -> Self {
        Self {
            speed: Fixed64::ONE,
            consumption: Fixed64::ONE,
        }
    }
}

impl Boosts {
    /// Energy a machine may draw this tick.
    pub fn effective_rate(&self, rate: u64) -> u64 {
        let speed = Fixed128::from_num(self.speed.max(Fixed64::ZERO));
        wide_from_u64(rate)
            .saturating_mul(speed)
            .saturating_to_num::<u64>()
            .max(1)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// How many batches a charging phase may bank energy for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePolicy {
    /// Stop charging once one batch is paid for.
    SingleBatch,
    /// Keep charging until every currently feasible batch is paid for.
    /// Completion still fires as soon as one batch is covered; this only
    /// raises how much may be banked.
    AllBatches,
}

/// The job a machine is charging toward this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge {
    pub cost: u64,
    pub max_batches: u32,
    pub policy: ChargePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    /// Nothing to do: no feasible batch, or nothing could be spent.
    Idle,
    Charged { spent: u64 },
    /// Enough was banked; run this many batches.
    Completed { batches: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    banked: Fixed128,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn banked(&self) -> Fixed128 {
        self.banked
    }

    pub fn reset(&mut self) {
        self.banked = Fixed128::ZERO;
    }

    /// Banked progress as a fraction of `cost`, clamped to `[0, 1]`.
    pub fn fraction(&self, cost: u64) -> Fixed64 {
        if cost == 0 {
            return Fixed64::ZERO;
        }
        let ratio = (self.banked / wide_from_u64(cost)).clamp(Fixed128::ZERO, Fixed128::ONE);
        Fixed64::saturating_from_num(ratio)
    }

    /// One tick of progress.
    ///
    /// When at least one batch is already paid for, completes
    /// `min(floor(banked / cost), max_batches)` batches and deducts them.
    /// Otherwise draws `min(stored, rate * speed, remaining * consumption)`
    /// from `buffer` and banks `spent / consumption`.
    pub fn advance(
        &mut self,
        charge: Charge,
        buffer: &mut EnergyBuffer,
        rate: u64,
        boosts: &Boosts,
    ) -> ProgressStep {
        if charge.max_batches == 0 {
            return ProgressStep::Idle;
        }
        let cost = wide_from_u64(charge.cost.max(1));

        if self.banked >= cost {
            let paid = (self.banked / cost).saturating_to_num::<u64>();
            let batches = paid.min(u64::from(charge.max_batches)) as u32;
            self.banked = self
                .banked
                .saturating_sub(cost.saturating_mul_int(i128::from(batches)));
            return ProgressStep::Completed { batches };
        }

        let target = match charge.policy {
            ChargePolicy::SingleBatch => 1,
            ChargePolicy::AllBatches => charge.max_batches,
        };
        let needed = cost
            .saturating_mul_int(i128::from(target))
            .saturating_sub(self.banked);
        let consumption = Fixed128::from_num(boosts.consumption.max(Fixed64::DELTA));
        let wanted = needed
            .saturating_mul(consumption)
            .saturating_ceil()
            .saturating_to_num::<u64>();
        let spend = buffer
            .stored()
            .min(boosts.effective_rate(rate))
            .min(wanted);
        let spent = buffer.consume(spend);
        if spent == 0 {
            return ProgressStep::Idle;
        }
        self.banked = self
            .banked
            .saturating_add(wide_from_u64(spent).saturating_div(consumption));
        ProgressStep::Charged { spent }
    }
}
