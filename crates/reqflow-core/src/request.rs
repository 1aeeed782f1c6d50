//! The contract a request must satisfy to be queued on a node.

use crate::node::Node;

/// A work unit travelling through the network.
///
/// Nodes store whatever value is passed to [`Node::enqueue`], so `Self` is
/// normally a cheap handle (an id, an `Rc`, a slot key) pointing at request
/// state that the orchestrator owns.
pub trait Request: Sized {
    /// Called exactly once per [`Node::enqueue`], before the request joins
    /// the node's incoming queue, to tell it which node now holds it.
    fn pending_processing(&mut self, holder: &Node<Self>);
}
