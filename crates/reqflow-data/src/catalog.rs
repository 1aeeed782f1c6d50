//! Resolved, validated component catalogs and node spawning.

use crate::loader::{deserialize_list, parse_list, require_data_file, DataLoadError, Format};
use crate::schema::ComponentData;
use reqflow_core::id::ComponentId;
use reqflow_core::node::Node;
use reqflow_core::routing::Router;
use reqflow_core::spec::{ComponentSpec, UpgradeTable};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

/// Base name of the catalog file inside a data directory.
pub const CATALOG_FILE: &str = "components";

/// TOML key holding the component array.
pub const TOML_KEY: &str = "components";

/// One component kind, ready to build nodes from.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub spec: ComponentSpec,
    pub upgrades: Option<UpgradeTable>,
}

/// Component kinds indexed by name, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    order: Vec<String>,
}

impl Catalog {
    /// Resolve and validate raw component data. `source` names the origin in
    /// error messages.
    pub fn from_data(data: Vec<ComponentData>, source: &Path) -> Result<Self, DataLoadError> {
        let mut catalog = Catalog::default();

        for component in data {
            if catalog.entries.contains_key(&component.name) {
                return Err(DataLoadError::DuplicateName {
                    file: source.to_path_buf(),
                    name: component.name,
                });
            }

            let upgrades = match &component.upgrades {
                Some(levels) => {
                    let mut table = UpgradeTable::new();
                    for level in levels {
                        if table.insert(level.level, level.to_override()).is_some() {
                            return Err(DataLoadError::DuplicateLevel {
                                file: source.to_path_buf(),
                                component: component.name.clone(),
                                level: level.level,
                            });
                        }
                    }
                    Some(table)
                }
                None => None,
            };

            let spec = component.base_spec();
            let checked = match &upgrades {
                Some(table) => spec.validate_with(table),
                None => spec.validate(),
            };
            checked.map_err(|source_err| DataLoadError::InvalidSpec {
                file: source.to_path_buf(),
                component: component.name.clone(),
                source: source_err,
            })?;

            debug!(
                component = %component.name,
                levels = upgrades.as_ref().map_or(0, UpgradeTable::len),
                "catalog entry resolved"
            );
            catalog.order.push(component.name.clone());
            catalog
                .entries
                .insert(component.name, CatalogEntry { spec, upgrades });
        }

        Ok(catalog)
    }

    /// Parse and resolve an in-memory catalog.
    pub fn parse(content: &str, format: Format) -> Result<Self, DataLoadError> {
        let source = Path::new("<memory>");
        let data = parse_list(content, format, TOML_KEY).map_err(|detail| DataLoadError::Parse {
            file: source.to_path_buf(),
            detail,
        })?;
        Self::from_data(data, source)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Component kind names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Build a node of kind `kind`, or `None` if the catalog has no such kind.
    pub fn spawn<R>(
        &self,
        kind: &str,
        id: ComponentId,
        name: impl Into<String>,
        router: Rc<dyn Router>,
    ) -> Option<Node<R>> {
        let entry = self.entries.get(kind)?;
        Some(Node::new(
            id,
            name,
            entry.spec.clone(),
            entry.upgrades.clone(),
            router,
        ))
    }
}

/// Load a catalog file. The format follows the extension.
pub fn load_catalog(path: &Path) -> Result<Catalog, DataLoadError> {
    let data: Vec<ComponentData> = deserialize_list(path, TOML_KEY)?;
    let catalog = Catalog::from_data(data, path)?;
    info!(file = %path.display(), kinds = catalog.len(), "component catalog loaded");
    Ok(catalog)
}

/// Load `components.{ron,toml,json}` from a data directory.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog, DataLoadError> {
    let path = require_data_file(dir, CATALOG_FILE)?;
    load_catalog(&path)
}
