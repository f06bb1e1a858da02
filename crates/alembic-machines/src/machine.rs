//! The six machines behind one enum, driven by [`MachineEvent`]s.

use crate::cloner::Cloner;
use crate::common::{MachineCore, MachineSettings, TickContext};
use crate::cryo::CryoChamber;
use crate::energizer::Energizer;
use crate::liquifier::Liquifier;
use crate::residue::ResidueProcessor;
use crate::weaver::Weaver;
use alembic_core::event::{Effect, Effects, MachineEvent};
use alembic_core::fluid::FluidTank;
use alembic_core::registry::MachineKind;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Machine {
    Weaver(Weaver),
    Liquifier(Liquifier),
    Energizer(Energizer),
    Residue(ResidueProcessor),
    Cloner(Cloner),
    Cryo(CryoChamber),
}

impl Machine {
    /// A machine with its kind's default settings.
    pub fn new(kind: MachineKind) -> Self {
        Self::with_settings(kind, MachineSettings::for_kind(kind))
    }

    pub fn with_settings(kind: MachineKind, settings: MachineSettings) -> Self {
        match kind {
            MachineKind::Weaver => Machine::Weaver(Weaver::new(settings)),
            MachineKind::Liquifier => Machine::Liquifier(Liquifier::new(settings)),
            MachineKind::Energizer => Machine::Energizer(Energizer::new(settings)),
            MachineKind::ResidueProcessor => Machine::Residue(ResidueProcessor::new(settings)),
            MachineKind::Cloner => Machine::Cloner(Cloner::new(settings)),
            MachineKind::CryoChamber => Machine::Cryo(CryoChamber::new(settings)),
        }
    }

    pub fn kind(&self) -> MachineKind {
        match self {
            Machine::Weaver(_) => MachineKind::Weaver,
            Machine::Liquifier(_) => MachineKind::Liquifier,
            Machine::Energizer(_) => MachineKind::Energizer,
            Machine::Residue(_) => MachineKind::ResidueProcessor,
            Machine::Cloner(_) => MachineKind::Cloner,
            Machine::Cryo(_) => MachineKind::CryoChamber,
        }
    }

    pub fn core(&self) -> &MachineCore {
        match self {
            Machine::Weaver(m) => &m.core,
            Machine::Liquifier(m) => &m.core,
            Machine::Energizer(m) => &m.core,
            Machine::Residue(m) => &m.core,
            Machine::Cloner(m) => &m.core,
            Machine::Cryo(m) => &m.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut MachineCore {
        match self {
            Machine::Weaver(m) => &mut m.core,
            Machine::Liquifier(m) => &mut m.core,
            Machine::Energizer(m) => &mut m.core,
            Machine::Residue(m) => &mut m.core,
            Machine::Cloner(m) => &mut m.core,
            Machine::Cryo(m) => &mut m.core,
        }
    }

    pub fn status(&self) -> &MachineStatus {
        self.core().status()
    }

    /// A tank by index: the single tank for the weaver, liquifier and
    /// cloner; water (0) and cryofluid (1) for the cryo chamber.
    pub fn tank(&self, index: usize) -> Option<&FluidTank> {
        match (self, index) {
            (Machine::Weaver(m), 0) => Some(&m.tank),
            (Machine::Liquifier(m), 0) => Some(&m.tank),
            (Machine::Cloner(m), 0) => Some(&m.tank),
            (Machine::Cryo(m), 0) => Some(&m.water),
            (Machine::Cryo(m), 1) => Some(&m.cryofluid),
            _ => None,
        }
    }

    pub fn tank_mut(&mut self, index: usize) -> Option<&mut FluidTank> {
        match (self, index) {
            (Machine::Weaver(m), 0) => Some(&mut m.tank),
            (Machine::Liquifier(m), 0) => Some(&mut m.tank),
            (Machine::Cloner(m), 0) => Some(&mut m.tank),
            (Machine::Cryo(m), i) => m.tank_mut(i),
            _ => None,
        }
    }

    /// Apply one event and return what it changed.
    pub fn handle(&mut self, event: MachineEvent, ctx: &TickContext<'_>) -> Vec<Effect> {
        let mut effects = Effects::new(ctx.clock.tick());
        match event {
            MachineEvent::Placed => self.core().announce(&mut effects),
            MachineEvent::Tick => match self {
                Machine::Weaver(m) => m.tick(ctx, &mut effects),
                Machine::Liquifier(m) => m.tick(ctx, &mut effects),
                Machine::Energizer(m) => m.tick(ctx, &mut effects),
                Machine::Residue(m) => m.tick(ctx, &mut effects),
                Machine::Cloner(m) => m.tick(ctx, &mut effects),
                Machine::Cryo(m) => m.tick(ctx, &mut effects),
            },
            MachineEvent::Broken => match self {
                Machine::Weaver(m) => m.core.break_apart([&mut m.tank], &mut effects),
                Machine::Liquifier(m) => m.core.break_apart([&mut m.tank], &mut effects),
                Machine::Cloner(m) => m.core.break_apart([&mut m.tank], &mut effects),
                Machine::Energizer(m) => m.core.break_apart([], &mut effects),
                Machine::Residue(m) => m.core.break_apart([], &mut effects),
                Machine::Cryo(m) => m
                    .core
                    .break_apart([&mut m.water, &mut m.cryofluid], &mut effects),
            },
        }
        effects.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_core::event::EffectKind;
    use alembic_core::item::ItemSlots;
    use alembic_core::registry::Catalog;
    use alembic_core::sim::SimClock;
    use alembic_core::test_utils::*;

    #[test]
    fn kinds_round_trip() {
        for kind in [
            MachineKind::Weaver,
            MachineKind::Liquifier,
            MachineKind::Energizer,
            MachineKind::ResidueProcessor,
            MachineKind::Cloner,
            MachineKind::CryoChamber,
        ] {
            assert_eq!(Machine::new(kind).kind(), kind);
        }
    }

    #[test]
    fn placing_announces_idle() {
        let catalog = Catalog::new();
        let ctx = TickContext::new(SimClock::at(3), &catalog);
        let mut machine = Machine::new(MachineKind::Energizer);
        let effects = machine.handle(MachineEvent::Placed, &ctx);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].tick, 3);
        assert_eq!(
            effects[0].kind,
            EffectKind::StatusChanged {
                status: MachineStatus::Idle
            }
        );
    }

    #[test]
    fn breaking_the_cryo_chamber_drops_both_tanks() {
        let catalog = Catalog::new();
        let ctx = TickContext::new(SimClock::new(), &catalog);
        let mut machine = Machine::new(MachineKind::CryoChamber);
        if let Some(tank) = machine.tank_mut(0) {
            tank.add(&"water".into(), 300);
        }
        if let Some(tank) = machine.tank_mut(1) {
            tank.add(&"cryofluid".into(), 200);
        }
        machine
            .core_mut()
            .inventory
            .set_slot(3, Some(stack("minecraft:ice", 2)));

        let effects = machine.handle(MachineEvent::Broken, &ctx);
        let dropped = effects.iter().find_map(|e| match &e.kind {
            EffectKind::Dropped { stacks, fluids } => Some((stacks.clone(), fluids.clone())),
            _ => None,
        });
        assert_eq!(
            dropped,
            Some((
                vec![stack("minecraft:ice", 2)],
                vec![("water".into(), 300), ("cryofluid".into(), 200)]
            ))
        );
        assert_eq!(machine.tank(0).map(FluidTank::volume), Some(0));
        assert_eq!(
            machine.tank(1).and_then(FluidTank::fluid).map(|f| f.as_str()),
            Some("cryofluid")
        );
    }

    #[test]
    fn tick_dispatches_to_the_machine() {
        let catalog = small_catalog();
        let ctx = TickContext::new(SimClock::new(), &catalog);
        let mut machine = Machine::new(MachineKind::Liquifier);
        machine.core_mut().energy.charge(1000);
        machine
            .core_mut()
            .inventory
            .set_slot(3, Some(stack("utilitycraft:aetherium", 1)));
        machine.handle(MachineEvent::Tick, &ctx);
        assert_eq!(machine.status(), &MachineStatus::Running);
        assert!(machine.core().is_active());
    }
}
