use crate::id::ItemId;
use serde::{Deserialize, Serialize};

/// Stack size used when nothing more specific is known about an item.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// A stack of identical items in one inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub amount: u32,
    pub max_amount: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<ItemId>, amount: u32) -> Self {
        Self::with_max(item, amount, DEFAULT_MAX_STACK)
    }

    pub fn with_max(item: impl Into<ItemId>, amount: u32, max_amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
            max_amount,
        }
    }

    pub fn is(&self, item: &ItemId) -> bool {
        self.item == *item
    }

    /// Room left before the stack is full.
    pub fn space(&self) -> u32 {
        self.max_amount.saturating_sub(self.amount)
    }
}

/// How many batches of `per_batch` items still fit into `slot`.
///
/// An empty slot fits a default-sized stack; a slot holding another item
/// fits nothing. A zero `per_batch` never limits.
pub fn slot_capacity(slot: Option<&ItemStack>, item: &ItemId, per_batch: u32) -> u32 {
    if per_batch == 0 {
        return u32::MAX;
    }
    match slot {
        None => DEFAULT_MAX_STACK / per_batch,
        Some(stack) if stack.is(item) => stack.space() / per_batch,
        Some(_) => 0,
    }
}

// ---------------------------------------------------------------------------
// Slot access
// ---------------------------------------------------------------------------

/// Read/write access to indexed inventory slots.
///
/// Machines only read, decrement and increment stacks; `take` and `put`
/// are built on the two required accessors.
pub trait ItemSlots {
    fn slot(&self, index: usize) -> Option<&ItemStack>;

    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>);

    /// Remove up to `amount` items. Returns the amount actually removed.
    /// A stack drained to zero leaves the slot empty.
    #[must_use = "returns the quantity actually removed, which may be less than requested"]
    fn take(&mut self, index: usize, amount: u32) -> u32 {
        let Some(mut stack) = self.slot(index).cloned() else {
            return 0;
        };
        let removed = amount.min(stack.amount);
        stack.amount -= removed;
        self.set_slot(index, (stack.amount > 0).then_some(stack));
        removed
    }

    /// Add items to a slot. Returns the amount that didn't fit, which is
    /// everything when the slot holds a different item.
    #[must_use = "overflow count indicates items that did not fit"]
    fn put(&mut self, index: usize, item: &ItemId, amount: u32) -> u32 {
        if amount == 0 {
            return 0;
        }
        let mut stack = match self.slot(index) {
            None => ItemStack::new(item.clone(), 0),
            Some(existing) if existing.is(item) => existing.clone(),
            Some(_) => return amount,
        };
        let fit = amount.min(stack.space());
        if fit == 0 {
            return amount;
        }
        stack.amount += fit;
        self.set_slot(index, Some(stack));
        amount - fit
    }
}

impl ItemSlots for Vec<Option<ItemStack>> {
    fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.get(index).and_then(Option::as_ref)
    }

    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.get_mut(index) {
            *slot = stack;
        }
    }
}

/// A fixed-size machine inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Number of slots, occupied or not.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// True when no slot holds a stack.
    pub fn is_vacant(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Clone the stacks at `indices`, in order, for matching.
    pub fn stacks(&self, indices: &[usize]) -> Vec<Option<ItemStack>> {
        indices.iter().map(|&i| self.slot(i).cloned()).collect()
    }

    /// Iterate over occupied slots.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    /// Empty every slot, returning what was in them.
    pub fn drain(&mut self) -> Vec<ItemStack> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}

impl ItemSlots for Inventory {
    fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.slot(index)
    }

    fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        self.slots.set_slot(index, stack);
    }
}
