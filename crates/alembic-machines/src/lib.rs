//! Alembic Machines -- the six tick-driven processing machines and a
//! world that steps them.
//!
//! Every machine owns a [`MachineCore`] (27-slot inventory, energy buffer,
//! banked progress and status) plus whatever tanks it needs, and reacts to
//! three events: placed, tick and broken. A tick checks readiness in a
//! fixed order and reports the first failure as a status, or charges
//! toward the matched recipe and applies its batches once paid for.
//!
//! # Machines
//!
//! - [`weaver::Weaver`] -- Input plus exact catalyst set plus fluid; banks
//!   energy for every feasible batch.
//! - [`liquifier::Liquifier`] -- Items into fluid, one batch at a time.
//! - [`energizer::Energizer`] -- Two input channels, one output.
//! - [`residue::ResidueProcessor`] -- Residue into output and byproduct.
//! - [`cloner::Cloner`] -- Templates copied against a fluid and a large
//!   energy cost.
//! - [`cryo::CryoChamber`] -- Stabilizer, cooling grid and cryofluid
//!   generator sharing two tanks.
//!
//! [`machine::Machine`] wraps them in one enum; [`world::MachineWorld`]
//! owns placed machines, steps them against a shared clock and catalog,
//! and snapshots them.

pub mod cloner;
pub mod common;
pub mod cryo;
pub mod energizer;
pub mod liquifier;
pub mod machine;
pub mod residue;
pub mod weaver;
pub mod world;

pub use common::{MachineCore, MachineSettings, TickContext, Upgrades, format_fluid};
pub use machine::Machine;
pub use world::MachineWorld;
