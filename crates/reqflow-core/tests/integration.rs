//! End-to-end tests: a small orchestrator moving requests between nodes
//! using only the public node API.

use reqflow_core::id::{ComponentId, ComponentRole};
use reqflow_core::node::Node;
use reqflow_core::request::Request;
use reqflow_core::routing::{Direct, NoRoute, RouteTable, Router};
use reqflow_core::spec::{ComponentSpec, SpecOverride, UpgradeTable};
use std::cell::RefCell;
use std::rc::Rc;

// ===========================================================================
// Fixtures
// ===========================================================================

#[derive(Debug, Default)]
struct Trip {
    destination: u32,
    hops: Vec<ComponentId>,
}

/// Shared handle, the way a game keeps request state outside the nodes.
#[derive(Debug, Clone)]
struct Handle(Rc<RefCell<Trip>>);

impl Handle {
    fn to(destination: ComponentId) -> Self {
        Handle(Rc::new(RefCell::new(Trip {
            destination: destination.0,
            hops: Vec::new(),
        })))
    }

    fn destination(&self) -> ComponentId {
        ComponentId(self.0.borrow().destination)
    }

    fn hops(&self) -> Vec<ComponentId> {
        self.0.borrow().hops.clone()
    }
}

impl Request for Handle {
    fn pending_processing(&mut self, holder: &Node<Self>) {
        self.0.borrow_mut().hops.push(holder.id());
    }
}

/// Minimal orchestrator: nodes indexed by id, one forwarding pass per step.
struct Network {
    nodes: Vec<Node<Handle>>,
}

impl Network {
    fn node(&self, id: ComponentId) -> &Node<Handle> {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: ComponentId) -> &mut Node<Handle> {
        &mut self.nodes[id.0 as usize]
    }

    /// Forward the head of `from`'s incoming queue one hop. Returns false
    /// when nothing moved.
    fn forward(&mut self, from: ComponentId) -> bool {
        let Some(head) = self.node(from).incoming().next() else {
            return false;
        };
        let destination = head.destination();
        if destination == from {
            return false;
        }
        let Some(next) = self.node(from).next_hop(destination) else {
            return false;
        };
        if !self.node(next).is_available() {
            return false;
        }

        let Some(request) = self.node_mut(from).dequeue() else {
            return false;
        };
        let sender = self.node_mut(from);
        sender.release_slot();
        sender.record_transmitted();

        let receiver = self.node_mut(next);
        receiver.claim_slot();
        receiver.record_received();
        receiver.enqueue(request);
        true
    }
}

fn spec(role: ComponentRole, capacity: u32) -> ComponentSpec {
    ComponentSpec::new(role, 4, 4, capacity)
}

/// client(0) -> balancer(1) -> {server(2), server(3)}
fn three_tier() -> Network {
    let balancer_routes: Rc<dyn Router> = Rc::new(
        RouteTable::new()
            .route(ComponentId(2), ComponentId(2))
            .route(ComponentId(3), ComponentId(3)),
    );
    let to_balancer: Rc<dyn Router> = Rc::new(|_dest: ComponentId| Some(ComponentId(1)));

    Network {
        nodes: vec![
            Node::new(
                ComponentId(0),
                "client",
                spec(ComponentRole::Client, 8),
                None,
                to_balancer,
            ),
            Node::new(
                ComponentId(1),
                "balancer",
                spec(ComponentRole::Processor, 2),
                None,
                balancer_routes,
            ),
            Node::new(
                ComponentId(2),
                "server-a",
                spec(ComponentRole::Processor, 1),
                None,
                Rc::new(NoRoute),
            ),
            Node::new(
                ComponentId(3),
                "server-b",
                spec(ComponentRole::Processor, 1),
                None,
                Rc::new(NoRoute),
            ),
        ],
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn request_reaches_destination_through_balancer() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut net = three_tier();
    let request = Handle::to(ComponentId(3));

    net.node_mut(ComponentId(0)).claim_slot();
    net.node_mut(ComponentId(0)).enqueue(request.clone());

    assert!(net.forward(ComponentId(0)));
    assert!(net.forward(ComponentId(1)));
    assert!(!net.forward(ComponentId(3)));

    assert_eq!(request.hops(), vec![ComponentId(0), ComponentId(1), ComponentId(3)]);
    assert_eq!(net.node(ComponentId(3)).incoming_len(), 1);
    assert_eq!(net.node(ComponentId(3)).num_received(), 1);
    assert_eq!(net.node(ComponentId(1)).num_transmitted(), 1);
    assert_eq!(net.node(ComponentId(1)).contained_requests(), 0);
}

#[test]
fn full_server_backs_up_the_balancer() {
    let mut net = three_tier();
    for _ in 0..2 {
        net.node_mut(ComponentId(0)).enqueue(Handle::to(ComponentId(2)));
    }

    assert!(net.forward(ComponentId(0)));
    assert!(net.forward(ComponentId(1)));
    assert!(net.forward(ComponentId(0)));
    // server-a holds one request at capacity 1.
    assert!(!net.forward(ComponentId(1)));

    assert_eq!(net.node(ComponentId(1)).incoming_len(), 1);
    assert_eq!(net.node(ComponentId(2)).availability(), 0);
}

#[test]
fn rerouting_a_node_changes_next_hop() {
    let mut net = three_tier();
    net.node_mut(ComponentId(0)).set_router(Rc::new(Direct));
    net.node_mut(ComponentId(0)).enqueue(Handle::to(ComponentId(2)));

    assert!(net.forward(ComponentId(0)));
    assert_eq!(net.node(ComponentId(1)).incoming_len(), 0);
    assert_eq!(net.node(ComponentId(2)).incoming_len(), 1);
}

#[test]
fn goal_tracking_is_driven_by_the_orchestrator() {
    let mut net = three_tier();
    net.node_mut(ComponentId(2)).set_goal(2);

    for _ in 0..2 {
        net.node_mut(ComponentId(0)).enqueue(Handle::to(ComponentId(2)));
        assert!(net.forward(ComponentId(0)));
        assert!(net.forward(ComponentId(1)));
        // The server finishes the request right away.
        let server = net.node_mut(ComponentId(2));
        assert!(server.dequeue().is_some());
        server.release_slot();
        if server.goal().is_some_and(|g| server.num_received() >= u64::from(g)) {
            server.mark_goal_met();
        }
    }

    assert!(net.node(ComponentId(2)).goal_met());
    net.node_mut(ComponentId(2)).soft_reset();
    assert_eq!(net.node(ComponentId(2)).goal(), None);
}

#[test]
fn upgrade_then_level_restart() {
    let table = UpgradeTable::new()
        .with_level(1, SpecOverride::default())
        .with_level(2, SpecOverride::default().request_capacity(3).max_inputs(2));
    let mut node: Node<Handle> = Node::new(
        ComponentId(0),
        "db",
        ComponentSpec::new(ComponentRole::Processor, 1, 1, 1),
        Some(table),
        Rc::new(NoRoute),
    );

    assert!(node.add_input());
    assert!(!node.add_input());
    node.upgrade();
    assert!(node.add_input());
    node.claim_slot();
    node.claim_slot();
    assert!(node.is_available());

    node.hard_reset();
    assert_eq!(node.level(), 1);
    assert_eq!(node.request_capacity(), 1);
    assert_eq!(node.connected_inputs(), 0);
    assert!(node.is_available());
}
