//! A set of placed machines stepped together against one clock and one
//! catalog.

use crate::common::TickContext;
use crate::machine::Machine;
use alembic_core::event::{Effect, EffectKind, MachineEvent};
use alembic_core::id::FluidType;
use alembic_core::id::MachineId;
use alembic_core::registry::Catalog;
use alembic_core::sim::SimClock;
use alembic_core::snapshot::{DeserializeError, SerializeError, load_state, save_state};
use slotmap::SlotMap;

/// Owns every placed machine. Each [`step`](MachineWorld::step) ticks all
/// of them at the current clock, then advances the clock.
#[derive(Debug, Clone)]
pub struct MachineWorld {
    clock: SimClock,
    catalog: Catalog,
    machines: SlotMap<MachineId, Machine>,
    paused: bool,
}

impl MachineWorld {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            clock: SimClock::new(),
            catalog,
            machines: SlotMap::with_key(),
            paused: false,
        }
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Recipe and container changes apply from the next step on.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn get(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(id)
    }

    pub fn get_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MachineId, &Machine)> {
        self.machines.iter()
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    pub fn place(&mut self, machine: Machine) -> (MachineId, Vec<Effect>) {
        let ctx = TickContext::new(self.clock, &self.catalog);
        let id = self.machines.insert(machine);
        let effects = match self.machines.get_mut(id) {
            Some(machine) => machine.handle(MachineEvent::Placed, &ctx),
            None => Vec::new(),
        };
        log::debug!("placed {id:?} at tick {}", self.clock.tick());
        (id, effects)
    }

    /// Break a machine. The returned effects carry everything it dropped.
    pub fn remove(&mut self, id: MachineId) -> Option<Vec<Effect>> {
        let mut machine = self.machines.remove(id)?;
        let ctx = TickContext::new(self.clock, &self.catalog);
        log::debug!("removed {id:?} at tick {}", self.clock.tick());
        Some(machine.handle(MachineEvent::Broken, &ctx))
    }

    // -----------------------------------------------------------------------
    // External feeds
    // -----------------------------------------------------------------------

    /// Push energy into a machine's buffer. Returns the amount accepted.
    pub fn charge(&mut self, id: MachineId, amount: u64) -> u64 {
        self.machines
            .get_mut(id)
            .map_or(0, |m| m.core_mut().energy.charge(amount))
    }

    /// Pour fluid into one of a machine's tanks. Returns the amount
    /// accepted; zero for a missing machine or tank, or a fluid mismatch.
    pub fn fill(&mut self, id: MachineId, tank: usize, fluid: &FluidType, amount: u64) -> u64 {
        self.machines
            .get_mut(id)
            .and_then(|m| m.tank_mut(tank))
            .map_or(0, |t| t.add(fluid, amount))
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Tick every machine once, in placement order, then advance the
    /// clock. A paused world neither ticks nor advances.
    pub fn step(&mut self) -> Vec<(MachineId, Effect)> {
        if self.paused {
            return Vec::new();
        }
        let ctx = TickContext::new(self.clock, &self.catalog);
        let ticked = tick_all(&mut self.machines, &ctx);
        self.clock.advance();

        let effects: Vec<(MachineId, Effect)> = ticked
            .into_iter()
            .flat_map(|(id, effects)| effects.into_iter().map(move |e| (id, e)))
            .collect();
        log::trace!("tick {}: {} effect(s)", ctx.clock.tick(), effects.len());
        effects
    }

    /// Step `ticks` times and collect the crafts completed along the way.
    pub fn run(&mut self, ticks: u64) -> Vec<(MachineId, Effect)> {
        let mut crafted = Vec::new();
        for _ in 0..ticks {
            crafted.extend(
                self.step()
                    .into_iter()
                    .filter(|(_, e)| matches!(e.kind, EffectKind::Crafted { .. })),
            );
        }
        crafted
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Encode the clock and every machine. The catalog is not included.
    pub fn save(&self) -> Result<Vec<u8>, SerializeError> {
        save_state(&self.clock, &self.machines)
    }

    /// Restore a world saved by [`save`](MachineWorld::save) against
    /// `catalog`. Machine ids survive the round trip.
    pub fn load(catalog: Catalog, bytes: &[u8]) -> Result<Self, DeserializeError> {
        let (header, machines) = load_state::<SlotMap<MachineId, Machine>>(bytes)?;
        log::debug!(
            "loaded {} machine(s) at tick {}",
            machines.len(),
            header.tick
        );
        Ok(Self {
            clock: SimClock::at(header.tick),
            catalog,
            machines,
            paused: false,
        })
    }
}

#[cfg(not(feature = "parallel"))]
fn tick_all(
    machines: &mut SlotMap<MachineId, Machine>,
    ctx: &TickContext<'_>,
) -> Vec<(MachineId, Vec<Effect>)> {
    machines
        .iter_mut()
        .map(|(id, machine)| (id, machine.handle(MachineEvent::Tick, ctx)))
        .collect()
}

/// Steps machines on the rayon pool. Results keep placement order.
#[cfg(feature = "parallel")]
fn tick_all(
    machines: &mut SlotMap<MachineId, Machine>,
    ctx: &TickContext<'_>,
) -> Vec<(MachineId, Vec<Effect>)> {
    use rayon::prelude::*;

    let mut entries: Vec<(MachineId, &mut Machine)> = machines.iter_mut().collect();
    entries
        .par_iter_mut()
        .map(|(id, machine)| (*id, machine.handle(MachineEvent::Tick, ctx)))
        .collect()
}
