//! Data directories: format detection (RON/JSON/TOML), file discovery, and
//! overlaying a directory of tables onto a catalog.

use crate::definitions::{Definitions, LoadReport, Table};
use crate::normalize::DefinitionError;
use alembic_core::registry::Catalog;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A definition parsed but could not become a valid recipe.
    #[error("invalid entry in {table} table: {source}")]
    Definition {
        table: &'static str,
        #[source]
        source: DefinitionError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml` or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(file: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: file.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Deserialize `content` as `format`. `file` only labels errors.
pub fn parse_str<T: DeserializeOwned>(
    format: Format,
    content: &str,
    file: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(file, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(file, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so TOML content holds
/// the list under `toml_key` (`[[recipes]]`).
pub fn parse_list_str<T: DeserializeOwned>(
    format: Format,
    content: &str,
    toml_key: &str,
    file: &Path,
) -> Result<Vec<T>, DataLoadError> {
    if format != Format::Toml {
        return parse_str(format, content, file);
    }
    let table: toml::Table = toml::from_str(content).map_err(|e| parse_error(file, e))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| parse_error(file, format!("missing key '{toml_key}' in TOML file")))?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(file, e))
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(format, &content, path)
}

/// Read a file holding a list; see [`parse_list_str`].
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_list_str(format, &content, toml_key, path)
}

// ===========================================================================
// Directories
// ===========================================================================

fn read_table<T: DeserializeOwned>(dir: &Path, table: Table) -> Result<Vec<T>, DataLoadError> {
    match find_data_file(dir, table.base_name())? {
        Some(path) => {
            log::debug!("reading {} table from {}", table.base_name(), path.display());
            deserialize_list(&path, table.toml_key())
        }
        None => Ok(Vec::new()),
    }
}

/// Read every table present in `dir` (missing tables are skipped).
pub fn read_dir(dir: &Path) -> Result<Definitions, DataLoadError> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("data directory {} not found", dir.display()),
        )
        .into());
    }
    let infuser = match find_data_file(dir, Table::Infuser.base_name())? {
        Some(path) => deserialize_file(&path)?,
        None => Default::default(),
    };
    Ok(Definitions {
        containers: read_table(dir, Table::Containers)?,
        fillables: read_table(dir, Table::Fillables)?,
        weaver: read_table(dir, Table::Weaver)?,
        infuser,
        liquifier: read_table(dir, Table::Liquifier)?,
        energizer: read_table(dir, Table::Energizer)?,
        residue: read_table(dir, Table::Residue)?,
        cloner: read_table(dir, Table::Cloner)?,
        cryo: read_table(dir, Table::Cryo)?,
    })
}

/// Overlay the tables in `dir` onto `catalog`, upserting by id. Fails on
/// the first unreadable file or invalid entry; entries installed before the
/// failure stay.
pub fn load_dir(catalog: &mut Catalog, dir: &Path) -> Result<LoadReport, DataLoadError> {
    read_dir(dir)?.install(catalog)
}

// ===========================================================================
// Tests
// ===========================================================================
