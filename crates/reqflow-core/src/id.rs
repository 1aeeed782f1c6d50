use serde::{Deserialize, Serialize};

/// Identifies a component in the network. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

/// The logical role of a component. Both roles run the same node logic; the
/// role only travels with the specification data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentRole {
    /// Originates requests and receives their responses.
    Client,
    /// Accepts requests, works on them and forwards them.
    #[default]
    Processor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_id_equality() {
        assert_eq!(ComponentId(3), ComponentId(3));
        assert_ne!(ComponentId(3), ComponentId(4));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ComponentId(0), "client");
        map.insert(ComponentId(1), "server");
        assert_eq!(map[&ComponentId(1)], "server");
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&ComponentRole::Client).unwrap();
        assert_eq!(json, "\"client\"");
        let back: ComponentRole = serde_json::from_str("\"processor\"").unwrap();
        assert_eq!(back, ComponentRole::Processor);
    }
}
