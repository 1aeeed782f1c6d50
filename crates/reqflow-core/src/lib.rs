//! Reqflow Core -- the component kernel for request-routing network games.
//!
//! A network is made of capacity-limited components ("nodes") that accept,
//! queue, upgrade over time and forward discrete work units ("requests").
//! This crate models a single node. The surrounding orchestrator owns the
//! graph, drives the tick loop and decides where requests go; every node only
//! tracks its own connections, queues, counters and upgrade level.
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let mut node = Node::new(ComponentId(0), "web", spec, Some(upgrades), Rc::new(Direct));
//! assert_eq!(node.level(), 1);
//!
//! if node.add_input() && node.is_available() {
//!     node.enqueue(handle);
//! }
//!
//! node.soft_reset(); // new round, same layout
//! node.hard_reset(); // back to the freshly constructed state
//! ```
//!
//! # Key Types
//!
//! - [`node::Node`] -- Connection capacity, request queues, goal and upgrade
//!   state of one component.
//! - [`spec::ComponentSpec`] -- Typed capacity limits with game-defined extra
//!   attributes.
//! - [`spec::UpgradeTable`] -- Per-level partial overrides applied by
//!   [`node::Node::upgrade`].
//! - [`request::Request`] -- Notification hook called when a node takes a
//!   request.
//! - [`routing::Router`] -- Transmission resolver consulted by the
//!   orchestrator to pick the next hop.

pub mod id;
pub mod node;
pub mod request;
pub mod routing;
pub mod spec;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
