//! Property-based tests for recipe matching and batch arithmetic.

use alembic_core::craft::{CraftLayout, apply_batches, roll_byproduct};
use alembic_core::fluid::{FluidTank, LIQUIFIED_AETHERIUM};
use alembic_core::item::{ItemSlots, ItemStack};
use alembic_core::matcher::{BatchInputs, batch_limits, catalysts_match, match_recipe, max_batches};
use alembic_core::recipe::{Amount, Byproduct, Ingredient, Recipe};
use alembic_core::rng::SimRng;
use alembic_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

const ITEMS: [&str; 4] = ["test:a", "test:b", "test:c", "test:d"];

fn arb_item() -> impl Strategy<Value = &'static str> {
    (0..ITEMS.len()).prop_map(|i| ITEMS[i])
}

fn arb_stack() -> impl Strategy<Value = Option<ItemStack>> {
    proptest::option::of((arb_item(), 1..=64u32).prop_map(|(item, n)| stack(item, n)))
}

fn arb_recipe() -> impl Strategy<Value = Recipe> {
    (
        arb_item(),
        1..=8u32,
        proptest::collection::vec((arb_item(), 1..=4u32), 0..=3),
        1..=8u32,
    )
        .prop_map(|(input, amount, catalysts, out)| {
            catalysts
                .into_iter()
                .fold(
                    Recipe::new("prop:r", Ingredient::new(input, amount), 100),
                    |r, (item, n)| r.catalyst(item, n),
                )
                .output("prop:out", out)
        })
}

const CATALYST_SLOTS: [usize; 3] = [1, 2, 3];
const LAYOUT: CraftLayout<'static> = CraftLayout {
    input: 0,
    catalysts: &CATALYST_SLOTS,
    output: Some(4),
    byproduct: None,
};

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// A matched recipe's input id equals the stack's id and the stack
    /// holds at least the input amount.
    #[test]
    fn match_implies_input_satisfied(
        recipes in proptest::collection::vec(arb_recipe(), 1..6),
        input in arb_stack(),
        catalysts in proptest::collection::vec(arb_stack(), 3),
    ) {
        if let Some(recipe) = match_recipe(&recipes, input.as_ref(), &catalysts, None) {
            let input = input.as_ref().unwrap();
            prop_assert_eq!(&input.item, &recipe.input.item);
            prop_assert!(input.amount >= recipe.input.amount);
            prop_assert!(catalysts_match(&recipe.catalysts, &catalysts));
        }
    }

    /// Adding a foreign catalyst type to a satisfied set breaks the match.
    #[test]
    fn extra_catalyst_type_never_matches(n in 1..=32u32, extra in 1..=32u32) {
        let required = vec![Ingredient::new("test:a", 2)];
        let exact = slots(&[Some(("test:a", n.max(2)))]);
        prop_assert!(catalysts_match(&required, &exact));
        let with_extra = slots(&[Some(("test:a", n.max(2))), Some(("test:b", extra))]);
        prop_assert!(!catalysts_match(&required, &with_extra));
        let short = slots(&[Some(("test:a", 1))]);
        prop_assert!(!catalysts_match(&required, &short));
    }

    /// The batch count equals the smallest per-resource ratio and never
    /// over-draws any resource.
    #[test]
    fn batches_are_the_minimum_ratio(
        have in 0..=64u32,
        per in 1..=8u32,
        fluid in 0..=4000u64,
        per_fluid in 1..=500u64,
        out_per in 1..=16u32,
    ) {
        let recipe = Recipe::new("prop:r", Ingredient::new("test:a", per), 10)
            .consumes_fluid("lava", per_fluid)
            .output("prop:out", out_per);
        let input = stack("test:a", have);
        let tank = FluidTank::filled("lava", fluid, 4000);
        let inputs = BatchInputs {
            input: Some(&input),
            tank: Some(&tank),
            ..BatchInputs::default()
        };
        let batches = max_batches(&recipe, &inputs);
        let expected = (have / per)
            .min((tank.volume() / per_fluid) as u32)
            .min(64 / out_per);
        prop_assert_eq!(batches, expected);
        prop_assert!(batches * per <= have);
        prop_assert!(u64::from(batches) * per_fluid <= tank.volume());
        prop_assert_eq!(batch_limits(&recipe, &inputs).batches(), batches);
    }

    /// Byproduct totals stay inside `[batches * min, batches * max]` for
    /// chance 1 and are zero for chance 0.
    #[test]
    fn byproduct_totals_are_bounded(seed in any::<u64>(), batches in 0..=200u32, lo in 0..=4u32, span in 0..=4u32) {
        let always = Byproduct {
            item: "test:dust".into(),
            amount: Amount::Range { min: lo, max: lo + span },
            chance: fixed(1.0),
        };
        let mut rng = SimRng::new(seed);
        let total = roll_byproduct(&always, batches, &mut rng);
        prop_assert!(total >= batches * lo);
        prop_assert!(total <= batches * (lo + span));

        let never = Byproduct { chance: fixed(0.0), ..always };
        prop_assert_eq!(roll_byproduct(&never, batches, &mut rng), 0);
    }

    /// Applying zero batches leaves slots, tank and rng untouched.
    #[test]
    fn zero_batches_mutate_nothing(
        recipe in arb_recipe(),
        contents in proptest::collection::vec(arb_stack(), 5),
        seed in any::<u64>(),
    ) {
        let mut inventory = contents.clone();
        let mut tank = FluidTank::filled("lava", 1000, 4000);
        let mut rng = SimRng::new(seed);
        let report = apply_batches(&recipe, 0, &LAYOUT, &mut inventory, Some(&mut tank), &mut rng);
        prop_assert!(report.is_empty());
        prop_assert_eq!(inventory, contents);
        prop_assert_eq!(tank.volume(), 1000);
        prop_assert_eq!(rng, SimRng::new(seed));
    }

    /// Running exactly `max_batches` never overflows output or underflows
    /// the input.
    #[test]
    fn applying_max_batches_fits(
        recipe in arb_recipe(),
        contents in proptest::collection::vec(arb_stack(), 5),
    ) {
        let mut inventory = contents;
        let batches = {
            let inputs = BatchInputs {
                input: inventory.slot(0),
                catalysts: &inventory[1..4],
                output: inventory.slot(4),
                ..BatchInputs::default()
            };
            max_batches(&recipe, &inputs)
        };
        let before = inventory.slot(0).map_or(0, |s| s.amount);
        let report = apply_batches(&recipe, batches, &LAYOUT, &mut inventory, None, &mut SimRng::new(0));
        prop_assert!(report.overflow.is_empty());
        let after = inventory.slot(0).map_or(0, |s| s.amount);
        prop_assert_eq!(before - after, batches * recipe.input.amount);
    }
}

// ===========================================================================
// Fixed scenarios
// ===========================================================================

#[test]
fn three_per_batch_input_with_fluid_and_output_caps_at_two() {
    let recipe = Recipe::new("prop:r", Ingredient::new("test:a", 3), 10)
        .consumes_fluid("lava", 40)
        .output("prop:out", 5);
    let input = stack("test:a", 10);
    let tank = FluidTank::filled("lava", 100, 1000);
    let inputs = BatchInputs {
        input: Some(&input),
        tank: Some(&tank),
        ..BatchInputs::default()
    };
    assert_eq!(max_batches(&recipe, &inputs), 2);
}

#[test]
fn liquifier_fills_tank_from_three_aetherium() {
    let recipe = liquify_aetherium();
    let mut inventory = slots(&[Some(("utilitycraft:aetherium", 3))]);
    let mut tank = FluidTank::new(5000);
    let batches = {
        let inputs = BatchInputs {
            input: inventory.slot(0),
            tank: Some(&tank),
            ..BatchInputs::default()
        };
        max_batches(&recipe, &inputs)
    };
    assert_eq!(batches, 3);

    let layout = CraftLayout {
        input: 0,
        catalysts: &[],
        output: None,
        byproduct: None,
    };
    apply_batches(&recipe, batches, &layout, &mut inventory, Some(&mut tank), &mut SimRng::new(1));
    assert!(inventory.slot(0).is_none());
    assert_eq!(tank.volume(), 3000);
    assert_eq!(tank.fluid().map(|f| f.as_str()), Some(LIQUIFIED_AETHERIUM));
}
