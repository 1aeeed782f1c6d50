//! Transmission resolvers: given a request's final destination, pick the
//! component a node should hand it to next.
//!
//! Nodes only store a resolver; the orchestrator consults it when moving a
//! request out of a node. Any `Fn(ComponentId) -> Option<ComponentId>`
//! closure is a [`Router`], so ad-hoc strategies need no new type.

use crate::id::ComponentId;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Router trait
// ---------------------------------------------------------------------------

/// Resolves the next hop toward `destination`, or `None` if the node cannot
/// forward there.
pub trait Router {
    fn next_hop(&self, destination: ComponentId) -> Option<ComponentId>;
}

impl<F> Router for F
where
    F: Fn(ComponentId) -> Option<ComponentId>,
{
    fn next_hop(&self, destination: ComponentId) -> Option<ComponentId> {
        self(destination)
    }
}

// ---------------------------------------------------------------------------
// Built-in strategies
// ---------------------------------------------------------------------------

/// Never forwards anything. Default for nodes that only terminate requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoute;

impl Router for NoRoute {
    fn next_hop(&self, _destination: ComponentId) -> Option<ComponentId> {
        None
    }
}

/// Hands every request straight to its destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl Router for Direct {
    fn next_hop(&self, destination: ComponentId) -> Option<ComponentId> {
        Some(destination)
    }
}

/// Explicit destination -> next-hop table with an optional fallback hop
/// (e.g. a load balancer every unknown destination goes through).
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<ComponentId, ComponentId>,
    fallback: Option<ComponentId>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, destination: ComponentId, via: ComponentId) -> Self {
        self.routes.insert(destination, via);
        self
    }

    pub fn fallback(mut self, via: ComponentId) -> Self {
        self.fallback = Some(via);
        self
    }

    pub fn insert(&mut self, destination: ComponentId, via: ComponentId) -> Option<ComponentId> {
        self.routes.insert(destination, via)
    }

    pub fn remove(&mut self, destination: ComponentId) -> Option<ComponentId> {
        self.routes.remove(&destination)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Router for RouteTable {
    fn next_hop(&self, destination: ComponentId) -> Option<ComponentId> {
        self.routes.get(&destination).copied().or(self.fallback)
    }
}
