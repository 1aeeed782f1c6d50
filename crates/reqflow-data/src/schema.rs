//! Serde data file structs for component catalogs.
//!
//! These structs define the on-disk format. They are deserialized from RON,
//! JSON or TOML files and then resolved into core types by the catalog.

use reqflow_core::id::ComponentRole;
use reqflow_core::spec::{ComponentSpec, SpecOverride};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A component kind in a catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData {
    pub name: String,
    #[serde(default)]
    pub role: ComponentRole,
    pub max_inputs: u32,
    pub max_outputs: u32,
    pub request_capacity: u32,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    /// Absent means the kind never upgrades and stays at level 0.
    #[serde(default)]
    pub upgrades: Option<Vec<LevelData>>,
}

impl ComponentData {
    pub fn base_spec(&self) -> ComponentSpec {
        ComponentSpec {
            role: self.role,
            max_inputs: self.max_inputs,
            max_outputs: self.max_outputs,
            request_capacity: self.request_capacity,
            attributes: self.attributes.clone(),
        }
    }
}

/// One upgrade level. Only the fields present are overridden.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    pub level: u32,
    #[serde(default)]
    pub role: Option<ComponentRole>,
    #[serde(default)]
    pub max_inputs: Option<u32>,
    #[serde(default)]
    pub max_outputs: Option<u32>,
    #[serde(default)]
    pub request_capacity: Option<u32>,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
}

impl LevelData {
    pub fn to_override(&self) -> SpecOverride {
        SpecOverride {
            role: self.role,
            max_inputs: self.max_inputs,
            max_outputs: self.max_outputs,
            request_capacity: self.request_capacity,
            attributes: self.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ron_defaults_role_and_attributes() {
        let data: ComponentData = ron::from_str(
            r#"(name: "cache", max_inputs: 1, max_outputs: 1, request_capacity: 6)"#,
        )
        .unwrap();
        assert_eq!(data.role, ComponentRole::Processor);
        assert!(data.attributes.is_empty());
        assert!(data.upgrades.is_none());
    }

    #[test]
    fn level_data_keeps_only_present_fields() {
        let level: LevelData =
            serde_json::from_str(r#"{"level": 2, "max_outputs": 3, "attributes": {"cost": 40}}"#)
                .unwrap();
        let patch = level.to_override();
        assert_eq!(patch.max_outputs, Some(3));
        assert_eq!(patch.max_inputs, None);
        assert_eq!(patch.attributes.get("cost"), Some(&40.0));
    }

    #[test]
    fn base_spec_copies_fields() {
        let data: ComponentData = serde_json::from_str(
            r#"{"name": "user", "role": "client", "max_inputs": 0, "max_outputs": 1,
                "request_capacity": 10, "attributes": {"rate": 0.5}}"#,
        )
        .unwrap();
        let spec = data.base_spec();
        assert_eq!(spec.role, ComponentRole::Client);
        assert_eq!(spec.request_capacity, 10);
        assert_eq!(spec.attribute("rate"), Some(0.5));
    }
}
