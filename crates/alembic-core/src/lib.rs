//! Alembic Core -- recipe matching and batch processing for tick-driven
//! crafting machines.
//!
//! A machine holds an item inventory, optionally a fluid tank, and an
//! energy buffer. Every tick it matches its inventory against a recipe
//! table, works out how many batches every resource allows, banks energy
//! toward the recipe's cost, and once paid for, applies the batches.
//!
//! # Tick Arithmetic
//!
//! 1. **Match** -- [`matcher::match_recipe`] finds the first recipe whose
//!    input, exact catalyst set and fluid all fit.
//! 2. **Bound** -- [`matcher::batch_limits`] computes one ratio per resource;
//!    the batch count is their minimum.
//! 3. **Charge** -- [`energy::Progress::advance`] draws energy at the
//!    machine's rate and banks fractional progress.
//! 4. **Apply** -- [`craft::apply_batches`] mutates slots and the tank and
//!    rolls byproducts with the machine's [`rng::SimRng`].
//!
//! Anything that stops a tick is a [`status::MachineStatus`], not an error.
//! Errors are reserved for malformed recipe definitions
//! ([`recipe::RecipeError`]) and snapshots ([`snapshot`]).
//!
//! # Key Types
//!
//! - [`recipe::Recipe`] -- Validated item recipe shared by four machines.
//! - [`registry::RecipeBook`] -- Upsert-by-id table in declaration order.
//! - [`registry::Catalog`] -- All recipe books plus fluid containers.
//! - [`item::ItemSlots`] -- Slot access the machines are written against.
//! - [`fluid::FluidTank`] -- Single-fluid volumetric store.
//! - [`sim::SimClock`] -- Explicit simulation time.
//! - [`fixed::Fixed64`] -- Q32.32 fixed point for boosts and chances;
//!   [`fixed::Fixed128`] banks progress.

pub mod cloning;
pub mod craft;
pub mod energy;
pub mod event;
pub mod fixed;
pub mod fluid;
pub mod id;
pub mod item;
pub mod matcher;
pub mod recipe;
pub mod registry;
pub mod rng;
pub mod sim;
pub mod snapshot;
pub mod status;
pub mod thermal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
