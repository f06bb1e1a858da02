//! A full set of raw definitions and how it is installed into a catalog.

use crate::loader::DataLoadError;
use crate::normalize::{self, DefinitionError};
use crate::schema::{
    ClonerRecipeData, ContainerData, CryoRecipeData, FillableData, InfuserRecipeData,
    ItemRecipeData, LiquifierRecipeData, WeaverRecipeData,
};
use alembic_core::registry::{Catalog, Upsert};
use std::collections::BTreeMap;

/// One file per table; TOML files hold the list under `toml_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Containers,
    Fillables,
    Weaver,
    Infuser,
    Liquifier,
    Energizer,
    Residue,
    Cloner,
    Cryo,
}

impl Table {
    /// Installation order.
    pub const ALL: [Table; 9] = [
        Table::Containers,
        Table::Fillables,
        Table::Weaver,
        Table::Infuser,
        Table::Liquifier,
        Table::Energizer,
        Table::Residue,
        Table::Cloner,
        Table::Cryo,
    ];

    pub fn base_name(self) -> &'static str {
        match self {
            Table::Containers => "containers",
            Table::Fillables => "fillables",
            Table::Weaver => "weaver",
            Table::Infuser => "infuser",
            Table::Liquifier => "liquifier",
            Table::Energizer => "energizer",
            Table::Residue => "residue",
            Table::Cloner => "cloner",
            Table::Cryo => "cryo",
        }
    }

    pub fn toml_key(self) -> &'static str {
        match self {
            Table::Containers => "containers",
            Table::Fillables => "fillables",
            _ => "recipes",
        }
    }
}

/// Counts of what an install changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    pub replaced: usize,
}

impl LoadReport {
    pub(crate) fn record(&mut self, outcome: Upsert) {
        match outcome {
            Upsert::Inserted => self.inserted += 1,
            Upsert::Replaced => self.replaced += 1,
        }
    }

    pub(crate) fn record_replaced(&mut self, replaced: bool) {
        self.record(if replaced { Upsert::Replaced } else { Upsert::Inserted });
    }

    pub fn total(&self) -> usize {
        self.inserted + self.replaced
    }
}

#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub containers: Vec<ContainerData>,
    pub fillables: Vec<FillableData>,
    pub weaver: Vec<WeaverRecipeData>,
    /// Keyed `"catalyst|input"`.
    pub infuser: BTreeMap<String, InfuserRecipeData>,
    pub liquifier: Vec<LiquifierRecipeData>,
    pub energizer: Vec<ItemRecipeData>,
    pub residue: Vec<ItemRecipeData>,
    pub cloner: Vec<ClonerRecipeData>,
    pub cryo: Vec<CryoRecipeData>,
}

fn context(table: Table) -> impl Fn(DefinitionError) -> DataLoadError {
    move |source| DataLoadError::Definition {
        table: table.base_name(),
        source,
    }
}

impl Definitions {
    /// Normalize and upsert every definition, stopping at the first bad one.
    pub fn install(self, catalog: &mut Catalog) -> Result<LoadReport, DataLoadError> {
        let mut report = LoadReport::default();

        for data in self.containers {
            let replaced = catalog
                .containers
                .upsert_container(normalize::container(data))
                .map_err(DefinitionError::from)
                .map_err(context(Table::Containers))?;
            report.record_replaced(replaced);
        }
        for data in self.fillables {
            let replaced = catalog
                .containers
                .upsert_fillable(normalize::fillable(data))
                .map_err(DefinitionError::from)
                .map_err(context(Table::Fillables))?;
            report.record_replaced(replaced);
        }

        let recipes = &mut catalog.recipes;
        let err = context(Table::Weaver);
        for data in self.weaver {
            let recipe = normalize::weaver_recipe(None, data).map_err(&err)?;
            report.record(recipes.weaver.upsert(recipe).map_err(|e| err(e.into()))?);
        }
        let err = context(Table::Infuser);
        for (key, data) in self.infuser {
            let recipe = normalize::infuser_recipe(&key, data).map_err(&err)?;
            report.record(recipes.weaver.upsert(recipe).map_err(|e| err(e.into()))?);
        }
        let err = context(Table::Liquifier);
        for data in self.liquifier {
            let recipe = normalize::liquifier_recipe(None, data).map_err(&err)?;
            report.record(recipes.liquifier.upsert(recipe).map_err(|e| err(e.into()))?);
        }
        let err = context(Table::Energizer);
        for data in self.energizer {
            let recipe = normalize::energizer_recipe(None, data).map_err(&err)?;
            report.record(recipes.energizer.upsert(recipe).map_err(|e| err(e.into()))?);
        }
        let err = context(Table::Residue);
        for data in self.residue {
            let recipe = normalize::residue_recipe(None, data).map_err(&err)?;
            report.record(recipes.residue.upsert(recipe).map_err(|e| err(e.into()))?);
        }
        let err = context(Table::Cloner);
        for data in self.cloner {
            let recipe = normalize::clone_recipe(None, data).map_err(&err)?;
            report.record(recipes.cloner.upsert(recipe).map_err(|e| err(e.into()))?);
        }
        let err = context(Table::Cryo);
        for data in self.cryo {
            let recipe = normalize::thermal_recipe(None, data).map_err(&err)?;
            report.record(recipes.upsert_thermal(recipe).map_err(|e| err(e.into()))?);
        }

        log::debug!(
            "installed {} definitions ({} replaced)",
            report.total(),
            report.replaced
        );
        Ok(report)
    }
}
