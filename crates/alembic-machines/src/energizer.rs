//! Energizer: two input channels feeding one output slot.

use crate::common::{Job, MachineCore, MachineSettings, TickContext};
use alembic_core::craft::CraftLayout;
use alembic_core::energy::ChargePolicy;
use alembic_core::event::Effects;
use alembic_core::item::ItemSlots;
use alembic_core::matcher::{BatchInputs, batch_limits, match_items};
use alembic_core::recipe::Recipe;
use alembic_core::registry::RecipeBook;
use alembic_core::status::MachineStatus;
use serde::{Deserialize, Serialize};

pub const PRIMARY_SLOT: usize = 3;
pub const AUXILIARY_SLOT: usize = 4;
pub const OUTPUT_SLOT: usize = 19;

/// One of the two input slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Primary,
    Auxiliary,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Primary, Channel::Auxiliary];

    pub fn slot(self) -> usize {
        match self {
            Channel::Primary => PRIMARY_SLOT,
            Channel::Auxiliary => AUXILIARY_SLOT,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Channel::Primary => "Primary",
            Channel::Auxiliary => "Auxiliary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Energizer {
    pub core: MachineCore,
    channel: Option<Channel>,
}

impl Energizer {
    pub fn new(settings: MachineSettings) -> Self {
        Self {
            core: MachineCore::new(settings),
            channel: None,
        }
    }

    /// The channel picked on the last tick, if any slot held an item.
    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>, effects: &mut Effects) {
        let recipes = &ctx.catalog.recipes.energizer;
        self.channel = self.pick_channel(recipes);

        match self.check(recipes) {
            Ok((recipe, batches, channel)) => {
                let job = Job {
                    recipe,
                    batches,
                    policy: ChargePolicy::SingleBatch,
                    layout: CraftLayout {
                        input: channel.slot(),
                        catalysts: &[],
                        output: Some(OUTPUT_SLOT),
                        byproduct: None,
                    },
                };
                let rate = self.core.settings.rate;
                self.core.run(job, rate, None, effects);
            }
            Err(status) => self.core.report(status, effects),
        }
    }

    /// The first channel with a matching recipe, else the first occupied
    /// one.
    fn pick_channel(&self, recipes: &RecipeBook<Recipe>) -> Option<Channel> {
        let inv = &self.core.inventory;
        Channel::ALL
            .into_iter()
            .find(|c| match_items(recipes, inv.slot(c.slot()), &[]).is_some())
            .or_else(|| {
                Channel::ALL
                    .into_iter()
                    .find(|c| inv.slot(c.slot()).is_some())
            })
    }

    fn check<'r>(
        &self,
        recipes: &'r RecipeBook<Recipe>,
    ) -> Result<(&'r Recipe, u32, Channel), MachineStatus> {
        let inv = &self.core.inventory;
        if self.core.energy.is_empty() {
            return Err(MachineStatus::NoEnergy);
        }
        if recipes.is_empty() {
            return Err(MachineStatus::NoRecipes);
        }
        let channel = self.channel.ok_or(MachineStatus::NoInput)?;
        let input = inv.slot(channel.slot());
        let recipe = match_items(recipes, input, &[]).ok_or_else(|| {
            MachineStatus::ChannelInvalid {
                channel: channel.title().to_owned(),
            }
        })?;

        let output = inv.slot(OUTPUT_SLOT);
        if let (Some(out), Some(slot)) = (&recipe.output, output)
            && !slot.is(&out.item)
        {
            return Err(MachineStatus::OutputConflict);
        }

        let limits = batch_limits(
            recipe,
            &BatchInputs {
                input,
                output,
                ..BatchInputs::default()
            },
        );
        if limits.output == 0 {
            return Err(MachineStatus::OutputFull);
        }
        match limits.batches() {
            0 => Err(MachineStatus::MissingItems),
            batches => Ok((recipe, batches, channel)),
        }
    }
}
