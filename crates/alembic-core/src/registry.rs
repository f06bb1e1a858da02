//! Recipe books keyed by id, one per machine kind.
//!
//! Books keep declaration order (matching is first-match-wins) and replace
//! an existing id in place, so a runtime override never reorders the table.

use crate::cloning::CloneRecipe;
use crate::fluid::ContainerRegistry;
use crate::id::RecipeId;
use crate::recipe::{Recipe, RecipeEntry, RecipeError};
use crate::thermal::{GeneratorConfig, ThermalCategory, ThermalRecipe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Outcome of [`RecipeBook::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

#[derive(Debug, Clone)]
pub struct RecipeBook<R> {
    entries: Vec<R>,
    index: HashMap<RecipeId, usize>,
}

impl<R> Default for RecipeBook<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: RecipeEntry> RecipeBook<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert, replacing any entry with the same id.
    pub fn upsert(&mut self, recipe: R) -> Result<Upsert, RecipeError> {
        recipe.validate()?;
        match self.index.get(recipe.id()) {
            Some(&slot) => {
                log::debug!("replacing recipe '{}'", recipe.id());
                self.entries[slot] = recipe;
                Ok(Upsert::Replaced)
            }
            None => {
                self.index.insert(recipe.id().clone(), self.entries.len());
                self.entries.push(recipe);
                Ok(Upsert::Inserted)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.index.get(id).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a, R> IntoIterator for &'a RecipeBook<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineKind {
    Weaver,
    Liquifier,
    Energizer,
    ResidueProcessor,
    Cloner,
    CryoChamber,
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MachineKind::Weaver => "Catalyst Weaver",
            MachineKind::Liquifier => "Liquifier",
            MachineKind::Energizer => "Energizer",
            MachineKind::ResidueProcessor => "Residue Processor",
            MachineKind::Cloner => "Cloner",
            MachineKind::CryoChamber => "Cryo Chamber",
        })
    }
}

/// Every machine's recipe tables.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    pub weaver: RecipeBook<Recipe>,
    pub liquifier: RecipeBook<Recipe>,
    pub energizer: RecipeBook<Recipe>,
    pub residue: RecipeBook<Recipe>,
    /// Clone templates. The generic cloner refuses these.
    pub cloner: RecipeBook<CloneRecipe>,
    pub stabilization: RecipeBook<ThermalRecipe>,
    pub cooling: RecipeBook<ThermalRecipe>,
    pub generator: GeneratorConfig,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item-recipe book for the machines that share [`Recipe`].
    pub fn book(&self, kind: MachineKind) -> Option<&RecipeBook<Recipe>> {
        match kind {
            MachineKind::Weaver => Some(&self.weaver),
            MachineKind::Liquifier => Some(&self.liquifier),
            MachineKind::Energizer => Some(&self.energizer),
            MachineKind::ResidueProcessor => Some(&self.residue),
            MachineKind::Cloner | MachineKind::CryoChamber => None,
        }
    }

    pub fn book_mut(&mut self, kind: MachineKind) -> Option<&mut RecipeBook<Recipe>> {
        match kind {
            MachineKind::Weaver => Some(&mut self.weaver),
            MachineKind::Liquifier => Some(&mut self.liquifier),
            MachineKind::Energizer => Some(&mut self.energizer),
            MachineKind::ResidueProcessor => Some(&mut self.residue),
            MachineKind::Cloner | MachineKind::CryoChamber => None,
        }
    }

    /// Route a cryo recipe to the book for its category.
    pub fn upsert_thermal(&mut self, recipe: ThermalRecipe) -> Result<Upsert, RecipeError> {
        match recipe.category {
            ThermalCategory::Stabilization => self.stabilization.upsert(recipe),
            ThermalCategory::Cooling => self.cooling.upsert(recipe),
        }
    }

    /// Number of recipes a machine kind can use.
    pub fn count(&self, kind: MachineKind) -> usize {
        match kind {
            MachineKind::Cloner => self.cloner.len(),
            MachineKind::CryoChamber => self.stabilization.len() + self.cooling.len(),
            other => self.book(other).map_or(0, RecipeBook::len),
        }
    }
}

/// Recipes plus fluid containers: everything a machine looks up.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub recipes: RecipeRegistry,
    pub containers: ContainerRegistry,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }
}
