//! Machine inputs and outputs.
//!
//! A machine is driven by [`MachineEvent`]s and answers each one with a
//! list of [`Effect`]s describing what it changed. Effects are records for
//! the driver (logging, replay, UI). The machine's own state has already
//! been updated by the time they are returned.

use crate::craft::CraftReport;
use crate::fixed::Ticks;
use crate::id::{FluidType, ItemId, RecipeId};
use crate::item::ItemStack;
use crate::recipe::FluidRole;
use crate::status::MachineStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineEvent {
    Placed,
    Tick,
    /// The machine was removed; everything it holds is dropped.
    Broken,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Consumed { item: ItemId, amount: u32 },
    Produced { item: ItemId, amount: u32 },
    /// `tank` indexes the machine's tanks in declaration order.
    FluidChanged { tank: usize, fluid: FluidType, delta: i64 },
    EnergySpent { amount: u64 },
    Crafted { recipe: RecipeId, batches: u32 },
    StatusChanged { status: MachineStatus },
    ActivityChanged { active: bool },
    Dropped { stacks: Vec<ItemStack>, fluids: Vec<(FluidType, u64)> },
}

/// An effect stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub tick: Ticks,
    pub kind: EffectKind,
}

/// Collects the effects of one event.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    tick: Ticks,
    list: Vec<Effect>,
}

impl Effects {
    pub fn new(tick: Ticks) -> Self {
        Self {
            tick,
            list: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: EffectKind) {
        self.list.push(Effect {
            tick: self.tick,
            kind,
        });
    }

    /// Record everything a craft did.
    pub fn craft(&mut self, recipe: &RecipeId, report: &CraftReport, tank: usize) {
        if report.is_empty() {
            return;
        }
        for (item, amount) in &report.consumed {
            if *amount > 0 {
                self.push(EffectKind::Consumed {
                    item: item.clone(),
                    amount: *amount,
                });
            }
        }
        if let Some(delta) = &report.fluid
            && delta.amount > 0
        {
            let amount = i64::try_from(delta.amount).unwrap_or(i64::MAX);
            self.push(EffectKind::FluidChanged {
                tank,
                fluid: delta.fluid.clone(),
                delta: match delta.role {
                    FluidRole::Consumed => -amount,
                    FluidRole::Produced => amount,
                },
            });
        }
        for (item, amount) in &report.produced {
            self.push(EffectKind::Produced {
                item: item.clone(),
                amount: *amount,
            });
        }
        self.push(EffectKind::Crafted {
            recipe: recipe.clone(),
            batches: report.batches,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.list.iter()
    }

    pub fn into_vec(self) -> Vec<Effect> {
        self.list
    }
}
