//! Native recipe tables, embedded at compile time.

use crate::definitions::{Definitions, LoadReport, Table};
use crate::loader::{DataLoadError, Format, parse_list_str, parse_str};
use alembic_core::registry::Catalog;
use serde::de::DeserializeOwned;
use std::path::Path;

const CONTAINERS: &str = include_str!("../data/containers.ron");
const FILLABLES: &str = include_str!("../data/fillables.ron");
const WEAVER: &str = include_str!("../data/weaver.ron");
const INFUSER: &str = include_str!("../data/infuser.ron");
const LIQUIFIER: &str = include_str!("../data/liquifier.ron");
const ENERGIZER: &str = include_str!("../data/energizer.ron");
const RESIDUE: &str = include_str!("../data/residue.ron");
const CLONER: &str = include_str!("../data/cloner.ron");
const CRYO: &str = include_str!("../data/cryo.ron");

fn table<T: DeserializeOwned>(table: Table, content: &str) -> Result<Vec<T>, DataLoadError> {
    let file = format!("{}.ron", table.base_name());
    parse_list_str(Format::Ron, content, table.toml_key(), Path::new(&file))
}

/// Parse the embedded tables without installing them.
pub fn native_definitions() -> Result<Definitions, DataLoadError> {
    Ok(Definitions {
        containers: table(Table::Containers, CONTAINERS)?,
        fillables: table(Table::Fillables, FILLABLES)?,
        weaver: table(Table::Weaver, WEAVER)?,
        infuser: parse_str(Format::Ron, INFUSER, Path::new("infuser.ron"))?,
        liquifier: table(Table::Liquifier, LIQUIFIER)?,
        energizer: table(Table::Energizer, ENERGIZER)?,
        residue: table(Table::Residue, RESIDUE)?,
        cloner: table(Table::Cloner, CLONER)?,
        cryo: table(Table::Cryo, CRYO)?,
    })
}

/// Install the native tables into `catalog`.
pub fn install_native(catalog: &mut Catalog) -> Result<LoadReport, DataLoadError> {
    native_definitions()?.install(catalog)
}

/// A catalog holding only the native tables.
pub fn native_catalog() -> Result<Catalog, DataLoadError> {
    let mut catalog = Catalog::new();
    install_native(&mut catalog)?;
    Ok(catalog)
}
