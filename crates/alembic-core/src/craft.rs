//! Applying a number of batches of a matched recipe to slots and a tank.

use crate::fluid::FluidTank;
use crate::id::{FluidType, ItemId};
use crate::item::ItemSlots;
use crate::matcher::required_totals;
use crate::recipe::{Byproduct, FluidRole, Recipe};
use crate::rng::SimRng;

/// Which inventory slots a craft reads and writes.
#[derive(Debug, Clone, Copy)]
pub struct CraftLayout<'a> {
    pub input: usize,
    /// Drawn from in order.
    pub catalysts: &'a [usize],
    pub output: Option<usize>,
    pub byproduct: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluidDelta {
    pub fluid: FluidType,
    pub amount: u64,
    pub role: FluidRole,
}

/// The mutations a craft performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CraftReport {
    pub batches: u32,
    pub consumed: Vec<(ItemId, u32)>,
    pub produced: Vec<(ItemId, u32)>,
    pub fluid: Option<FluidDelta>,
    /// Byproduct items rolled (already included in `produced` or `overflow`).
    pub byproduct: u32,
    /// Items with nowhere to go; the caller decides whether to drop them.
    pub overflow: Vec<(ItemId, u32)>,
}

impl CraftReport {
    pub fn is_empty(&self) -> bool {
        self.batches == 0
    }
}

/// Roll a byproduct once per batch: each success draws an amount, and the
/// successes are summed.
pub fn roll_byproduct(byproduct: &Byproduct, batches: u32, rng: &mut SimRng) -> u32 {
    let mut total = 0u32;
    for _ in 0..batches {
        if rng.chance(byproduct.chance) {
            total = total.saturating_add(byproduct.amount.sample(rng));
        }
    }
    total
}

/// Consume inputs, catalysts and fluid for `batches` batches and write the
/// outputs. Callers check [`max_batches`](crate::matcher::max_batches)
/// first; zero batches touches nothing, including the rng.
pub fn apply_batches<S: ItemSlots + ?Sized>(
    recipe: &Recipe,
    batches: u32,
    layout: &CraftLayout<'_>,
    slots: &mut S,
    tank: Option<&mut FluidTank>,
    rng: &mut SimRng,
) -> CraftReport {
    let mut report = CraftReport::default();
    if batches == 0 {
        return report;
    }
    report.batches = batches;

    let taken = slots.take(layout.input, recipe.input.amount.saturating_mul(batches));
    report.consumed.push((recipe.input.item.clone(), taken));

    for (item, per_batch) in required_totals(&recipe.catalysts) {
        let wanted = per_batch.saturating_mul(batches);
        let mut remaining = wanted;
        for &slot in layout.catalysts {
            if remaining == 0 {
                break;
            }
            if slots.slot(slot).is_some_and(|s| s.is(&item)) {
                remaining -= slots.take(slot, remaining);
            }
        }
        report.consumed.push((item, wanted - remaining));
    }

    if let (Some(spec), Some(tank)) = (&recipe.fluid, tank) {
        let volume = spec.amount.saturating_mul(u64::from(batches));
        let moved = match spec.role {
            FluidRole::Consumed => tank.consume(volume),
            FluidRole::Produced => tank.add(&spec.fluid, volume),
        };
        report.fluid = Some(FluidDelta {
            fluid: spec.fluid.clone(),
            amount: moved,
            role: spec.role,
        });
    }

    if let Some(output) = &recipe.output {
        let total = output.amount.saturating_mul(batches);
        deliver(slots, layout.output, &output.item, total, &mut report);
    }

    if let Some(byproduct) = &recipe.byproduct {
        let rolled = roll_byproduct(byproduct, batches, rng);
        report.byproduct = rolled;
        deliver(slots, layout.byproduct, &byproduct.item, rolled, &mut report);
    }

    report
}

fn deliver<S: ItemSlots + ?Sized>(
    slots: &mut S,
    slot: Option<usize>,
    item: &ItemId,
    amount: u32,
    report: &mut CraftReport,
) {
    if amount == 0 {
        return;
    }
    let overflow = match slot {
        Some(index) => slots.put(index, item, amount),
        None => amount,
    };
    if overflow < amount {
        report.produced.push((item.clone(), amount - overflow));
    }
    if overflow > 0 {
        report.overflow.push((item.clone(), overflow));
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Inventory, ItemStack};
    use crate::recipe::{Amount, Ingredient};
    use crate::test_utils::*;

    const CATALYSTS: [usize; 3] = [1, 2, 3];
    const LAYOUT: CraftLayout<'static> = CraftLayout {
        input: 0,
        catalysts: &CATALYSTS,
        output: Some(5),
        byproduct: Some(4),
    };

    fn weave() -> Recipe {
        Recipe::new("test:weave", Ingredient::new("test:base", 2), 100)
            .catalyst("test:a", 3)
            .consumes_fluid("lava", 250)
            .output("test:out", 1)
            .byproduct("test:dust", Amount::Exact(2), fixed(1.0))
    }

    fn loaded() -> Inventory {
        let mut inv = Inventory::new(6);
        inv.set_slot(0, Some(ItemStack::new("test:base", 7)));
        inv.set_slot(1, Some(ItemStack::new("test:a", 2)));
        inv.set_slot(3, Some(ItemStack::new("test:a", 10)));
        inv
    }

    #[test]
    fn zero_batches_is_a_no_op() {
        let mut inv = loaded();
        let before = inv.clone();
        let mut tank = FluidTank::filled("lava", 1000, 1000);
        let mut rng = SimRng::new(1);
        let report = apply_batches(&weave(), 0, &LAYOUT, &mut inv, Some(&mut tank), &mut rng);
        assert!(report.is_empty());
        assert_eq!(inv, before);
        assert_eq!(tank.volume(), 1000);
        assert_eq!(rng, SimRng::new(1));
    }

    #[test]
    fn applies_every_resource() {
        let mut inv = loaded();
        let mut tank = FluidTank::filled("lava", 1000, 1000);
        let mut rng = SimRng::new(1);
        let report = apply_batches(&weave(), 3, &LAYOUT, &mut inv, Some(&mut tank), &mut rng);

        assert_eq!(inv.slot(0).map(|s| s.amount), Some(1));
        // 9 catalysts drawn in slot order: 2 from slot 1, 7 from slot 3.
        assert!(inv.slot(1).is_none());
        assert_eq!(inv.slot(3).map(|s| s.amount), Some(3));
        assert_eq!(tank.volume(), 250);
        assert_eq!(inv.slot(5).map(|s| s.amount), Some(3));
        assert_eq!(inv.slot(4).map(|s| s.amount), Some(6));
        assert_eq!(report.byproduct, 6);
        assert!(report.overflow.is_empty());
        assert!(report.consumed.contains(&(ItemId::from("test:a"), 9)));
    }

    #[test]
    fn produced_fluid_sets_tank_type() {
        let recipe = Recipe::new("liq", Ingredient::new("utilitycraft:aetherium", 1), 9600)
            .produces_fluid("liquified_aetherium", 1000);
        let mut slots = slots(&[Some(("utilitycraft:aetherium", 3))]);
        let mut tank = FluidTank::new(5000);
        let layout = CraftLayout {
            input: 0,
            catalysts: &[],
            output: None,
            byproduct: None,
        };
        let report = apply_batches(&recipe, 3, &layout, &mut slots, Some(&mut tank), &mut SimRng::new(0));
        assert!(slots[0].is_none());
        assert_eq!(tank.volume(), 3000);
        assert_eq!(tank.fluid().map(|f| f.as_str()), Some("liquified_aetherium"));
        assert_eq!(report.fluid.map(|d| d.amount), Some(3000));
    }

    #[test]
    fn byproduct_without_slot_overflows() {
        let recipe = Recipe::new("r", Ingredient::new("test:base", 1), 10)
            .output("test:out", 1)
            .byproduct("test:dust", Amount::Exact(1), fixed(1.0));
        let mut slots = slots(&[Some(("test:base", 2)), None]);
        let layout = CraftLayout {
            input: 0,
            catalysts: &[],
            output: Some(1),
            byproduct: None,
        };
        let report = apply_batches(&recipe, 2, &layout, &mut slots, None, &mut SimRng::new(0));
        assert_eq!(report.overflow, vec![(ItemId::from("test:dust"), 2)]);
    }

    #[test]
    fn byproduct_rolls_stay_in_range() {
        let bp = Byproduct {
            item: "test:dust".into(),
            amount: Amount::Range { min: 1, max: 3 },
            chance: fixed(1.0),
        };
        let mut rng = SimRng::new(77);
        let total = roll_byproduct(&bp, 100, &mut rng);
        assert!((100..=300).contains(&total), "got {total}");

        let never = Byproduct {
            chance: fixed(0.0),
            ..bp
        };
        assert_eq!(roll_byproduct(&never, 100, &mut rng), 0);
    }
}
