//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in the
//! integration tests of this and downstream crates.

use crate::id::{ComponentId, ComponentRole};
use crate::node::Node;
use crate::request::Request;
use crate::routing::NoRoute;
use crate::spec::{ComponentSpec, SpecOverride, UpgradeTable};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ===========================================================================
// Request double
// ===========================================================================

/// Records every holder announced through [`Request::pending_processing`].
#[derive(Debug, Clone, Default)]
pub struct HolderLog(Rc<RefCell<Vec<ComponentId>>>);

impl HolderLog {
    pub fn holders(&self) -> Vec<ComponentId> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// A request handle that reports its holders to a shared [`HolderLog`].
#[derive(Clone)]
pub struct TestRequest {
    pub id: u32,
    log: HolderLog,
}

impl TestRequest {
    pub fn new(id: u32, log: &HolderLog) -> Self {
        Self {
            id,
            log: log.clone(),
        }
    }
}

impl fmt::Debug for TestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TestRequest").field(&self.id).finish()
    }
}

impl Request for TestRequest {
    fn pending_processing(&mut self, holder: &Node<Self>) {
        self.log.0.borrow_mut().push(holder.id());
    }
}

// ===========================================================================
// Spec constructors
// ===========================================================================

pub fn client_spec(max_outputs: u32, request_capacity: u32) -> ComponentSpec {
    ComponentSpec::new(ComponentRole::Client, 0, max_outputs, request_capacity)
}

pub fn processor_spec(max_inputs: u32, max_outputs: u32, request_capacity: u32) -> ComponentSpec {
    ComponentSpec::new(ComponentRole::Processor, max_inputs, max_outputs, request_capacity)
}

/// Three-level table over a base of (1 in, 1 out, capacity 2, cost 100):
///
/// | level | max_inputs | max_outputs | capacity | cost |
/// |-------|------------|-------------|----------|------|
/// | 1     | 2          | 1           | 4        | 100  |
/// | 2     | 4          | 1           | 4        | 250  |
/// | 3     | 4          | 3           | 8        | 250  |
pub fn tiered_upgrades() -> UpgradeTable {
    UpgradeTable::new()
        .with_level(1, SpecOverride::default().max_inputs(2).request_capacity(4))
        .with_level(2, SpecOverride::default().max_inputs(4).attribute("cost", 250.0))
        .with_level(3, SpecOverride::default().max_outputs(3).request_capacity(8))
}

pub fn tiered_base() -> ComponentSpec {
    processor_spec(1, 1, 2).with_attribute("cost", 100.0)
}

// ===========================================================================
// Node constructors
// ===========================================================================

/// A processor node with no upgrade table and no route.
pub fn plain_node(max_inputs: u32, max_outputs: u32, request_capacity: u32) -> Node<TestRequest> {
    Node::new(
        ComponentId(0),
        "plain",
        processor_spec(max_inputs, max_outputs, request_capacity),
        None,
        Rc::new(NoRoute),
    )
}

/// A processor node built from [`tiered_base`] and [`tiered_upgrades`].
pub fn tiered_node() -> Node<TestRequest> {
    Node::new(
        ComponentId(1),
        "tiered",
        tiered_base(),
        Some(tiered_upgrades()),
        Rc::new(NoRoute),
    )
}
