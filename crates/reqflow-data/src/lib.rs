//! Data-driven component catalogs for Reqflow.
//!
//! A catalog file lists component kinds ("client", "web-server", ...) with
//! their capacity limits, extra attributes and upgrade levels. Files may be
//! RON, TOML or JSON; the format follows the extension.

pub mod catalog;
pub mod loader;
pub mod schema;

pub use catalog::{load_catalog, load_catalog_dir, Catalog, CatalogEntry};
pub use loader::DataLoadError;
