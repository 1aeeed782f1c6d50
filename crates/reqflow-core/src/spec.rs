//! Typed component specifications and per-level upgrade overrides.
//!
//! A [`ComponentSpec`] carries the capacity limits every node needs plus a
//! bag of numeric `attributes` for game-defined extras (cost, latency, ...).
//! An [`UpgradeTable`] maps levels (starting at 1) to [`SpecOverride`]s; the
//! effective spec at level N is the base spec overlaid with overrides
//! `1..=N` in ascending order, so later levels win.

use crate::id::ComponentRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors found while validating a specification bundle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    /// Upgrade tables are keyed from level 1; level 0 is the base spec.
    #[error("upgrade table contains an entry for level 0")]
    ZeroLevel,

    /// A node that can hold no requests can never take part in routing.
    #[error("request capacity resolves to 0 at level {level}")]
    ZeroCapacity { level: u32 },

    /// Connections already attached must still fit after an upgrade, so a
    /// level may never lower a connection ceiling.
    #[error("level {level} lowers the {direction} ceiling from {from} to {to}")]
    ShrinkingCeiling {
        level: u32,
        direction: &'static str,
        from: u32,
        to: u32,
    },

    /// Attribute values must be finite numbers.
    #[error("attribute '{name}' is not finite at level {level}")]
    NonFiniteAttribute { name: String, level: u32 },
}

// ---------------------------------------------------------------------------
// ComponentSpec
// ---------------------------------------------------------------------------

/// The effective specification of a component at some level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(default)]
    pub role: ComponentRole,
    /// Ceiling for inbound links.
    pub max_inputs: u32,
    /// Ceiling for outbound links.
    pub max_outputs: u32,
    /// Requests the node may hold at once.
    pub request_capacity: u32,
    /// Game-defined numeric extras. Opaque to the node.
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
}

impl ComponentSpec {
    pub fn new(
        role: ComponentRole,
        max_inputs: u32,
        max_outputs: u32,
        request_capacity: u32,
    ) -> Self {
        Self {
            role,
            max_inputs,
            max_outputs,
            request_capacity,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper for setting a single attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }

    /// Overlay `patch` onto this spec. Fields the override leaves unset keep
    /// their current value; attributes are merged key by key.
    pub fn apply(&mut self, patch: &SpecOverride) {
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(v) = patch.max_inputs {
            self.max_inputs = v;
        }
        if let Some(v) = patch.max_outputs {
            self.max_outputs = v;
        }
        if let Some(v) = patch.request_capacity {
            self.request_capacity = v;
        }
        for (name, value) in &patch.attributes {
            self.attributes.insert(name.clone(), *value);
        }
    }

    /// The effective spec after overlaying every override in `1..=level`.
    pub fn resolve_at(&self, table: &UpgradeTable, level: u32) -> ComponentSpec {
        let mut spec = self.clone();
        if level == 0 {
            return spec;
        }
        for (_, patch) in table.levels.range(1..=level) {
            spec.apply(patch);
        }
        spec
    }

    fn check(&self, level: u32) -> Result<(), SpecError> {
        if self.request_capacity == 0 {
            return Err(SpecError::ZeroCapacity { level });
        }
        if let Some((name, _)) = self.attributes.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SpecError::NonFiniteAttribute {
                name: name.clone(),
                level,
            });
        }
        Ok(())
    }

    /// Validate the base spec alone.
    pub fn validate(&self) -> Result<(), SpecError> {
        self.check(0)
    }

    /// Validate the base spec and the effective spec at every level the
    /// table defines. Connection ceilings may only stay or grow from one
    /// level to the next.
    pub fn validate_with(&self, table: &UpgradeTable) -> Result<(), SpecError> {
        table.validate()?;
        self.validate()?;
        let mut spec = self.clone();
        for (&level, patch) in &table.levels {
            let (prev_inputs, prev_outputs) = (spec.max_inputs, spec.max_outputs);
            spec.apply(patch);
            if spec.max_inputs < prev_inputs {
                return Err(SpecError::ShrinkingCeiling {
                    level,
                    direction: "input",
                    from: prev_inputs,
                    to: spec.max_inputs,
                });
            }
            if spec.max_outputs < prev_outputs {
                return Err(SpecError::ShrinkingCeiling {
                    level,
                    direction: "output",
                    from: prev_outputs,
                    to: spec.max_outputs,
                });
            }
            spec.check(level)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SpecOverride
// ---------------------------------------------------------------------------

/// A partial spec applied when a node reaches a given level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ComponentRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_inputs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_outputs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, f64>,
}

impl SpecOverride {
    pub fn max_inputs(mut self, v: u32) -> Self {
        self.max_inputs = Some(v);
        self
    }

    pub fn max_outputs(mut self, v: u32) -> Self {
        self.max_outputs = Some(v);
        self
    }

    pub fn request_capacity(mut self, v: u32) -> Self {
        self.request_capacity = Some(v);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// True if applying this override changes nothing.
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.max_inputs.is_none()
            && self.max_outputs.is_none()
            && self.request_capacity.is_none()
            && self.attributes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// UpgradeTable
// ---------------------------------------------------------------------------

/// Level-indexed overrides. Levels start at 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeTable {
    levels: BTreeMap<u32, SpecOverride>,
}

impl UpgradeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the override for `level`, returning the one it replaced.
    pub fn insert(&mut self, level: u32, patch: SpecOverride) -> Option<SpecOverride> {
        self.levels.insert(level, patch)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_level(mut self, level: u32, patch: SpecOverride) -> Self {
        self.levels.insert(level, patch);
        self
    }

    pub fn get(&self, level: u32) -> Option<&SpecOverride> {
        self.levels.get(&level)
    }

    /// Highest level with an entry, or 0 for an empty table.
    pub fn max_level(&self) -> u32 {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterate `(level, override)` pairs in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SpecOverride)> {
        self.levels.iter().map(|(&level, patch)| (level, patch))
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        if self.levels.contains_key(&0) {
            return Err(SpecError::ZeroLevel);
        }
        Ok(())
    }
}

impl FromIterator<(u32, SpecOverride)> for UpgradeTable {
    fn from_iter<I: IntoIterator<Item = (u32, SpecOverride)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}
