//! Alembic Data -- recipe definitions from native tables, data directories
//! and the runtime registration bus.
//!
//! All three sources share one schema ([`schema`]) and one set of
//! per-machine defaults ([`normalize`]). Native tables and directories fail
//! fast on the first bad entry; bus messages skip bad entries and report
//! them.

pub mod bus;
pub mod definitions;
pub mod loader;
pub mod native;
pub mod normalize;
pub mod schema;

pub use bus::{BusError, BusReport, Channel, apply_message};
pub use definitions::{Definitions, LoadReport, Table};
pub use loader::{DataLoadError, load_dir};
pub use native::{install_native, native_catalog};
pub use normalize::DefinitionError;
