//! Single-fluid tanks and the fluid containers (capsules, buckets) that
//! fill and drain them through an inventory slot.

use crate::id::{FluidType, ItemId};
use crate::item::{ItemSlots, ItemStack};
use crate::recipe::RecipeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LIQUIFIED_AETHERIUM: &str = "liquified_aetherium";
pub const WATER: &str = "water";
pub const CRYOFLUID: &str = "cryofluid";
pub const LAVA: &str = "lava";

// ---------------------------------------------------------------------------
// Tank
// ---------------------------------------------------------------------------

/// A single-fluid volumetric store with a capacity ceiling.
///
/// A general tank forgets its fluid type once drained. A dedicated tank
/// keeps its type and only ever accepts that fluid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidTank {
    fluid: Option<FluidType>,
    volume: u64,
    capacity: u64,
    dedicated: bool,
}

impl FluidTank {
    /// An empty tank that takes any fluid.
    pub fn new(capacity: u64) -> Self {
        Self {
            fluid: None,
            volume: 0,
            capacity,
            dedicated: false,
        }
    }

    /// An empty tank locked to one fluid.
    pub fn dedicated(fluid: impl Into<FluidType>, capacity: u64) -> Self {
        Self {
            fluid: Some(fluid.into()),
            volume: 0,
            capacity,
            dedicated: true,
        }
    }

    /// A general tank pre-filled with `volume` (clamped to capacity).
    pub fn filled(fluid: impl Into<FluidType>, volume: u64, capacity: u64) -> Self {
        let volume = volume.min(capacity);
        Self {
            fluid: (volume > 0).then(|| fluid.into()),
            volume,
            capacity,
            dedicated: false,
        }
    }

    pub fn fluid(&self) -> Option<&FluidType> {
        self.fluid.as_ref()
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn free_space(&self) -> u64 {
        self.capacity.saturating_sub(self.volume)
    }

    pub fn is_empty(&self) -> bool {
        self.volume == 0
    }

    /// True when the tank is typeless or already holds `fluid`.
    pub fn accepts(&self, fluid: &FluidType) -> bool {
        self.fluid.as_ref().is_none_or(|held| held == fluid)
    }

    /// Add up to the free space. Returns the amount added; zero when the
    /// tank holds another fluid.
    pub fn add(&mut self, fluid: &FluidType, amount: u64) -> u64 {
        if !self.accepts(fluid) {
            return 0;
        }
        let added = amount.min(self.free_space());
        if added > 0 {
            self.volume += added;
            self.fluid = Some(fluid.clone());
        }
        added
    }

    /// Remove up to `amount`. Returns the amount removed.
    pub fn consume(&mut self, amount: u64) -> u64 {
        let removed = amount.min(self.volume);
        self.volume -= removed;
        if self.volume == 0 && !self.dedicated {
            self.fluid = None;
        }
        removed
    }

    /// Change the capacity, spilling anything above it.
    pub fn set_capacity(&mut self, capacity: u64) {
        self.capacity = capacity;
        if self.volume > capacity {
            self.volume = capacity;
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// A filled container that empties into a tank, e.g. a lava bucket or a
/// fluid capsule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidContainer {
    pub item: ItemId,
    pub fluid: FluidType,
    pub amount: u64,
    /// Item left behind once drained. `None` consumes the container.
    pub empty: Option<ItemId>,
}

/// An empty container that a tank can fill, keyed by fluid type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillableContainer {
    pub item: ItemId,
    pub fills: BTreeMap<FluidType, ItemId>,
}

/// Registered containers, upserted by item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRegistry {
    filled: BTreeMap<ItemId, FluidContainer>,
    fillable: BTreeMap<ItemId, FillableContainer>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a filled container. Returns true when replaced.
    pub fn upsert_container(&mut self, container: FluidContainer) -> Result<bool, RecipeError> {
        if container.item.is_empty() || container.fluid.is_empty() {
            return Err(RecipeError::InvalidContainer {
                item: container.item,
                reason: "container needs an item id and a fluid type",
            });
        }
        if container.amount == 0 {
            return Err(RecipeError::InvalidContainer {
                item: container.item,
                reason: "container amount must be at least 1",
            });
        }
        Ok(self
            .filled
            .insert(container.item.clone(), container)
            .is_some())
    }

    /// Register or replace a fillable container. Returns true when replaced.
    pub fn upsert_fillable(&mut self, fillable: FillableContainer) -> Result<bool, RecipeError> {
        if fillable.item.is_empty() || fillable.fills.is_empty() {
            return Err(RecipeError::InvalidContainer {
                item: fillable.item,
                reason: "fillable container needs an item id and at least one fill",
            });
        }
        Ok(self
            .fillable
            .insert(fillable.item.clone(), fillable)
            .is_some())
    }

    pub fn container(&self, item: &ItemId) -> Option<&FluidContainer> {
        self.filled.get(item)
    }

    pub fn fillable(&self, item: &ItemId) -> Option<&FillableContainer> {
        self.fillable.get(item)
    }

    pub fn len(&self) -> usize {
        self.filled.len() + self.fillable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled.is_empty() && self.fillable.is_empty()
    }

    /// Empty one container from `slot` into `tank`.
    ///
    /// Nothing happens unless the whole container fits and the tank accepts
    /// its fluid. A container that leaves an empty item behind must be the
    /// only item in the slot. Returns the volume moved.
    pub fn drain_into<S: ItemSlots + ?Sized>(
        &self,
        slots: &mut S,
        slot: usize,
        tank: &mut FluidTank,
    ) -> Option<u64> {
        let stack = slots.slot(slot)?;
        let container = self.container(&stack.item)?;
        if !tank.accepts(&container.fluid) || tank.free_space() < container.amount {
            return None;
        }
        if container.empty.is_some() && stack.amount > 1 {
            return None;
        }
        let moved = tank.add(&container.fluid, container.amount);
        match &container.empty {
            Some(empty) => slots.set_slot(slot, Some(ItemStack::new(empty.clone(), 1))),
            None => {
                let _ = slots.take(slot, 1);
            }
        }
        Some(moved)
    }

    /// Fill one empty container in `slot` from `tank`.
    ///
    /// The fill volume is the registered amount of the filled item; the
    /// empty container must be the only item in the slot. Returns the
    /// volume moved.
    pub fn fill_from<S: ItemSlots + ?Sized>(
        &self,
        slots: &mut S,
        slot: usize,
        tank: &mut FluidTank,
    ) -> Option<u64> {
        let stack = slots.slot(slot)?;
        if stack.amount != 1 {
            return None;
        }
        let fillable = self.fillable(&stack.item)?;
        let fluid = tank.fluid()?;
        let filled_item = fillable.fills.get(fluid)?;
        let amount = self.container(filled_item)?.amount;
        if tank.volume() < amount {
            return None;
        }
        let filled_item = filled_item.clone();
        let moved = tank.consume(amount);
        slots.set_slot(slot, Some(ItemStack::new(filled_item, 1)));
        Some(moved)
    }
}
