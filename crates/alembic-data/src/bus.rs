//! Runtime recipe registration over `(channel, JSON payload)` messages.
//!
//! Recipe channels take an object mapping recipe id to recipe fields (the
//! key fills in a missing `id`) or an array of entries that carry their own
//! ids. Container channels take an array of containers or a single one.
//! Every entry is upserted on its own: a malformed entry is logged and
//! reported, and the rest of the payload still applies.

use crate::definitions::LoadReport;
use crate::normalize::{self, DefinitionError};
use crate::schema::{
    ClonerRecipeData, ContainerData, CryoRecipeData, FillableData, InfuserRecipeData,
    ItemRecipeData, LiquifierRecipeData, WeaverRecipeData,
};
use alembic_core::registry::{Catalog, Upsert};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    WeaverRecipe,
    InfuserRecipe,
    LiquifierRecipe,
    EnergizerRecipe,
    ResidueRecipe,
    ClonerRecipe,
    CryoRecipe,
    FluidContainer,
    FluidOutput,
}

impl Channel {
    pub const ALL: [Channel; 9] = [
        Channel::WeaverRecipe,
        Channel::InfuserRecipe,
        Channel::LiquifierRecipe,
        Channel::EnergizerRecipe,
        Channel::ResidueRecipe,
        Channel::ClonerRecipe,
        Channel::CryoRecipe,
        Channel::FluidContainer,
        Channel::FluidOutput,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::WeaverRecipe => "alembic:register_weaver_recipe",
            Channel::InfuserRecipe => "alembic:register_infuser_recipe",
            Channel::LiquifierRecipe => "alembic:register_liquifier_recipe",
            Channel::EnergizerRecipe => "alembic:register_energizer_recipe",
            Channel::ResidueRecipe => "alembic:register_residue_recipe",
            Channel::ClonerRecipe => "alembic:register_cloner_recipe",
            Channel::CryoRecipe => "alembic:register_cryo_recipe",
            Channel::FluidContainer => "alembic:register_fluid_container",
            Channel::FluidOutput => "alembic:register_fluid_output",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Errors and reports
// ---------------------------------------------------------------------------

/// The message as a whole could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),
    #[error("payload on {channel} is not valid JSON: {source}")]
    Json {
        channel: Channel,
        #[source]
        source: serde_json::Error,
    },
    #[error("payload on {channel} must be an object or an array")]
    Shape { channel: Channel },
}

/// Why a single entry was skipped.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("malformed entry: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] DefinitionError),
}

#[derive(Debug)]
pub struct Rejected {
    /// The entry's key or id, or its position when it has neither.
    pub entry: String,
    pub error: EntryError,
}

#[derive(Debug)]
pub struct BusReport {
    pub channel: Channel,
    pub applied: LoadReport,
    pub rejected: Vec<Rejected>,
}

impl BusReport {
    fn new(channel: Channel) -> Self {
        Self {
            channel,
            applied: LoadReport::default(),
            rejected: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Applying
// ---------------------------------------------------------------------------

type Entry = (Option<String>, Value);

fn keyed_entries(channel: Channel, value: Value) -> Result<Vec<Entry>, BusError> {
    match value {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (Some(k), v)).collect()),
        Value::Array(items) => Ok(items.into_iter().map(|v| (None, v)).collect()),
        _ => Err(BusError::Shape { channel }),
    }
}

fn listed_entries(channel: Channel, value: Value) -> Result<Vec<Entry>, BusError> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(|v| (None, v)).collect()),
        object @ Value::Object(_) => Ok(vec![(None, object)]),
        _ => Err(BusError::Shape { channel }),
    }
}

fn label(index: usize, key: Option<&str>, value: &Value) -> String {
    key.or_else(|| value.get("id").and_then(Value::as_str))
        .map_or_else(|| format!("#{index}"), str::to_owned)
}

fn each_entry<T, F>(report: &mut BusReport, entries: Vec<Entry>, mut install: F)
where
    T: DeserializeOwned,
    F: FnMut(Option<&str>, T) -> Result<Upsert, DefinitionError>,
{
    for (index, (key, value)) in entries.into_iter().enumerate() {
        let entry = label(index, key.as_deref(), &value);
        let outcome = serde_json::from_value::<T>(value)
            .map_err(EntryError::from)
            .and_then(|data| install(key.as_deref(), data).map_err(EntryError::from));
        match outcome {
            Ok(upsert) => report.applied.record(upsert),
            Err(error) => {
                log::warn!("{}: rejected '{entry}': {error}", report.channel);
                report.rejected.push(Rejected { entry, error });
            }
        }
    }
}

fn replaced(was_replaced: bool) -> Upsert {
    if was_replaced {
        Upsert::Replaced
    } else {
        Upsert::Inserted
    }
}

/// Apply one bus message to `catalog`.
pub fn apply_message(catalog: &mut Catalog, channel: &str, payload: &str) -> Result<BusReport, BusError> {
    let Some(channel) = Channel::from_name(channel) else {
        log::warn!("ignoring message on unknown channel '{channel}'");
        return Err(BusError::UnknownChannel(channel.to_owned()));
    };
    let value: Value =
        serde_json::from_str(payload).map_err(|source| BusError::Json { channel, source })?;
    apply_value(catalog, channel, value)
}

/// Apply an already parsed payload.
pub fn apply_value(catalog: &mut Catalog, channel: Channel, value: Value) -> Result<BusReport, BusError> {
    let mut report = BusReport::new(channel);
    let recipes = &mut catalog.recipes;
    let containers = &mut catalog.containers;

    match channel {
        Channel::WeaverRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: WeaverRecipeData| {
                Ok(recipes.weaver.upsert(normalize::weaver_recipe(key, data)?)?)
            });
        }
        Channel::InfuserRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: InfuserRecipeData| {
                let key = key.ok_or_else(|| DefinitionError::InfuserKey(String::new()))?;
                Ok(recipes.weaver.upsert(normalize::infuser_recipe(key, data)?)?)
            });
        }
        Channel::LiquifierRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: LiquifierRecipeData| {
                Ok(recipes.liquifier.upsert(normalize::liquifier_recipe(key, data)?)?)
            });
        }
        Channel::EnergizerRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: ItemRecipeData| {
                Ok(recipes.energizer.upsert(normalize::energizer_recipe(key, data)?)?)
            });
        }
        Channel::ResidueRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: ItemRecipeData| {
                Ok(recipes.residue.upsert(normalize::residue_recipe(key, data)?)?)
            });
        }
        Channel::ClonerRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: ClonerRecipeData| {
                Ok(recipes.cloner.upsert(normalize::clone_recipe(key, data)?)?)
            });
        }
        Channel::CryoRecipe => {
            each_entry(&mut report, keyed_entries(channel, value)?, |key, data: CryoRecipeData| {
                Ok(recipes.upsert_thermal(normalize::thermal_recipe(key, data)?)?)
            });
        }
        Channel::FluidContainer => {
            each_entry(&mut report, listed_entries(channel, value)?, |_, data: ContainerData| {
                Ok(replaced(containers.upsert_container(normalize::container(data))?))
            });
        }
        Channel::FluidOutput => {
            each_entry(&mut report, listed_entries(channel, value)?, |_, data: FillableData| {
                Ok(replaced(containers.upsert_fillable(normalize::fillable(data))?))
            });
        }
    }

    log::debug!(
        "{channel}: {} applied, {} rejected",
        report.applied.total(),
        report.rejected.len()
    );
    Ok(report)
}
