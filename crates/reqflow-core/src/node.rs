//! A single capacity-limited component in the request network.
//!
//! The node never walks the graph. The orchestrator calls
//! [`Node::enqueue`] on a destination, asks [`Node::router`] (or
//! [`Node::next_hop`]) where a departing request goes, and mutates the
//! occupancy and lifetime counters as its own processing loop sees fit.
//!
//! Capacity is enforced only at the connection level ([`Node::add_input`],
//! [`Node::add_output`]). Request admission is unchecked: callers consult
//! [`Node::is_available`] or [`Node::availability`] first.

use crate::id::ComponentId;
use crate::request::Request;
use crate::routing::Router;
use crate::spec::{ComponentSpec, UpgradeTable};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// One component in the network: a client or processor with connection
/// ceilings, an incoming and a returning request queue, lifetime counters, an
/// optional goal and an upgrade level. `R` is the request handle type the
/// orchestrator queues; the node never owns the request state behind it.
pub struct Node<R> {
    id: ComponentId,
    name: String,
    level: u32,

    /// Spec supplied at construction. Effective spec is rebuilt from it on
    /// hard reset.
    base: ComponentSpec,
    spec: ComponentSpec,
    upgrades: Option<UpgradeTable>,

    connected_inputs: u32,
    connected_outputs: u32,

    /// Authoritative occupancy counter for both availability checks.
    contained_requests: u32,

    num_transmitted: u64,
    num_received: u64,

    incoming: VecDeque<R>,
    returning: VecDeque<R>,

    goal: Option<u32>,
    goal_met: bool,

    router: Rc<dyn Router>,
}

impl<R> Node<R> {
    /// Build a node and immediately apply one upgrade step, so a node with an
    /// upgrade table starts at level 1 and one without stays at level 0.
    pub fn new(
        id: ComponentId,
        name: impl Into<String>,
        spec: ComponentSpec,
        upgrades: Option<UpgradeTable>,
        router: Rc<dyn Router>,
    ) -> Self {
        let mut node = Self {
            id,
            name: name.into(),
            level: 0,
            spec: spec.clone(),
            base: spec,
            upgrades,
            connected_inputs: 0,
            connected_outputs: 0,
            contained_requests: 0,
            num_transmitted: 0,
            num_received: 0,
            incoming: VecDeque::new(),
            returning: VecDeque::new(),
            goal: None,
            goal_met: false,
            router,
        };
        node.upgrade();
        node
    }

    // -----------------------------------------------------------------------
    // Identity and spec
    // -----------------------------------------------------------------------

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The effective spec at the current level.
    pub fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    pub fn base_spec(&self) -> &ComponentSpec {
        &self.base
    }

    pub fn upgrades(&self) -> Option<&UpgradeTable> {
        self.upgrades.as_ref()
    }

    pub fn max_inputs(&self) -> u32 {
        self.spec.max_inputs
    }

    pub fn max_outputs(&self) -> u32 {
        self.spec.max_outputs
    }

    pub fn request_capacity(&self) -> u32 {
        self.spec.request_capacity
    }

    // -----------------------------------------------------------------------
    // Upgrades
    // -----------------------------------------------------------------------

    /// Advance one level and overlay that level's override.
    ///
    /// A node without an upgrade table never moves. With a table the level
    /// always increments; past the last defined entry there is nothing to
    /// overlay and the spec stays as it was. Returns whether the level moved.
    pub fn upgrade(&mut self) -> bool {
        let Some(table) = &self.upgrades else {
            return false;
        };
        self.level += 1;
        match table.get(self.level) {
            Some(patch) => {
                self.spec.apply(patch);
                debug!(node = self.id.0, level = self.level, "upgraded");
            }
            None => {
                debug!(node = self.id.0, level = self.level, "upgraded past table, spec unchanged");
            }
        }
        true
    }

    /// True if the upgrade table defines an override for the next level.
    pub fn can_upgrade(&self) -> bool {
        self.upgrades
            .as_ref()
            .is_some_and(|table| table.get(self.level + 1).is_some())
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    pub fn connected_inputs(&self) -> u32 {
        self.connected_inputs
    }

    pub fn connected_outputs(&self) -> u32 {
        self.connected_outputs
    }

    pub fn has_available_input(&self) -> bool {
        self.connected_inputs < self.spec.max_inputs
    }

    pub fn has_available_output(&self) -> bool {
        self.connected_outputs < self.spec.max_outputs
    }

    /// Attach one inbound link if below `max_inputs`.
    pub fn add_input(&mut self) -> bool {
        if self.has_available_input() {
            self.connected_inputs += 1;
            return true;
        }
        trace!(node = self.id.0, max = self.spec.max_inputs, "input refused, at capacity");
        false
    }

    /// Attach one outbound link if below `max_outputs`.
    pub fn add_output(&mut self) -> bool {
        if self.has_available_output() {
            self.connected_outputs += 1;
            return true;
        }
        trace!(node = self.id.0, max = self.spec.max_outputs, "output refused, at capacity");
        false
    }

    /// Detach one inbound link. Saturates at zero.
    pub fn remove_input(&mut self) {
        self.connected_inputs = self.connected_inputs.saturating_sub(1);
    }

    /// Detach one outbound link. Saturates at zero.
    pub fn remove_output(&mut self) {
        self.connected_outputs = self.connected_outputs.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    pub fn contained_requests(&self) -> u32 {
        self.contained_requests
    }

    /// Headroom left: positive means room, zero or negative means full or
    /// over-full.
    pub fn availability(&self) -> i64 {
        i64::from(self.spec.request_capacity) - i64::from(self.contained_requests)
    }

    pub fn is_available(&self) -> bool {
        self.contained_requests < self.spec.request_capacity
    }

    /// Count one more request as held by this node. Not capacity checked.
    pub fn claim_slot(&mut self) {
        self.contained_requests = self.contained_requests.saturating_add(1);
    }

    /// Release one held request. Saturates at zero.
    pub fn release_slot(&mut self) {
        self.contained_requests = self.contained_requests.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Queues
    // -----------------------------------------------------------------------

    /// Oldest request waiting to be processed.
    pub fn dequeue(&mut self) -> Option<R> {
        self.incoming.pop_front()
    }

    /// Incoming requests in arrival order.
    pub fn incoming(&self) -> impl ExactSizeIterator<Item = &R> {
        self.incoming.iter()
    }

    pub fn incoming_len(&self) -> usize {
        self.incoming.len()
    }

    /// Remove and return every waiting request, oldest first.
    pub fn drain_incoming(&mut self) -> Vec<R> {
        self.incoming.drain(..).collect()
    }

    /// Queue a response travelling back through this node.
    pub fn push_returning(&mut self, request: R) {
        self.returning.push_back(request);
    }

    pub fn pop_returning(&mut self) -> Option<R> {
        self.returning.pop_front()
    }

    pub fn returning(&self) -> impl ExactSizeIterator<Item = &R> {
        self.returning.iter()
    }

    pub fn returning_len(&self) -> usize {
        self.returning.len()
    }

    // -----------------------------------------------------------------------
    // Lifetime counters
    // -----------------------------------------------------------------------

    pub fn num_transmitted(&self) -> u64 {
        self.num_transmitted
    }

    pub fn num_received(&self) -> u64 {
        self.num_received
    }

    pub fn record_transmitted(&mut self) {
        self.num_transmitted += 1;
    }

    pub fn record_received(&mut self) {
        self.num_received += 1;
    }

    // -----------------------------------------------------------------------
    // Goal
    // -----------------------------------------------------------------------

    /// Set a target request count and clear `goal_met`. The node never
    /// evaluates the goal itself.
    pub fn set_goal(&mut self, goal: u32) {
        self.goal = Some(goal);
        self.goal_met = false;
    }

    pub fn goal(&self) -> Option<u32> {
        self.goal
    }

    pub fn goal_met(&self) -> bool {
        self.goal_met
    }

    pub fn mark_goal_met(&mut self) {
        self.goal_met = true;
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    pub fn router(&self) -> &Rc<dyn Router> {
        &self.router
    }

    pub fn set_router(&mut self, router: Rc<dyn Router>) {
        self.router = router;
    }

    /// Shorthand for `node.router().next_hop(destination)`.
    pub fn next_hop(&self, destination: ComponentId) -> Option<ComponentId> {
        self.router.next_hop(destination)
    }

    // -----------------------------------------------------------------------
    // Resets
    // -----------------------------------------------------------------------

    /// Start a new round: zero the lifetime counters, clear the goal and drop
    /// waiting requests. Connections, level and returning responses stay.
    pub fn soft_reset(&mut self) {
        self.num_transmitted = 0;
        self.num_received = 0;
        self.goal = None;
        self.goal_met = false;
        self.incoming.clear();
        debug!(node = self.id.0, "soft reset");
    }

    /// Return to the freshly constructed state: soft reset, drop every
    /// connection, held request and returning response, rebuild the spec
    /// from the base and re-apply the first upgrade.
    pub fn hard_reset(&mut self) {
        self.soft_reset();
        self.connected_inputs = 0;
        self.connected_outputs = 0;
        self.contained_requests = 0;
        self.returning.clear();
        self.level = 0;
        self.spec = self.base.clone();
        self.upgrade();
        debug!(node = self.id.0, level = self.level, "hard reset");
    }
}

impl<R: Request> Node<R> {
    /// Notify `request` of its new holder and append it to the incoming
    /// queue.
    ///
    /// Precondition: the caller has checked [`is_available`](Self::is_available)
    /// or [`availability`](Self::availability). No capacity check happens
    /// here; enqueueing onto a full node still queues the request.
    pub fn enqueue(&mut self, mut request: R) {
        request.pending_processing(self);
        self.incoming.push_back(request);
        trace!(node = self.id.0, queued = self.incoming.len(), "request enqueued");
    }
}

impl<R: fmt::Debug> fmt::Debug for Node<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("level", &self.level)
            .field("spec", &self.spec)
            .field("connected_inputs", &self.connected_inputs)
            .field("connected_outputs", &self.connected_outputs)
            .field("contained_requests", &self.contained_requests)
            .field("num_transmitted", &self.num_transmitted)
            .field("num_received", &self.num_received)
            .field("incoming", &self.incoming)
            .field("returning", &self.returning)
            .field("goal", &self.goal)
            .field("goal_met", &self.goal_met)
            .finish_non_exhaustive()
    }
}
