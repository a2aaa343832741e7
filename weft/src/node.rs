//! Node trait: read-only state in, partial update out.
//!
//! A node is a named unit of computation. It receives the current state as a
//! read-only borrow and returns a [`StateUpdate`] naming only the fields it
//! changes; the run loop merges the update using each field's declared policy.
//! Nodes must not mutate their input (the borrow enforces this); they may
//! perform external I/O (e.g. call a hosted model) as a side effect.

use async_trait::async_trait;

use crate::error::NodeError;
use crate::state::{State, StateUpdate};

/// A named step in a workflow graph.
///
/// **Interaction**: registered via `StateGraph::add_node`; run by
/// `CompiledGraph::invoke`, optionally through a
/// [`NodeMiddleware`](crate::graph::NodeMiddleware).
#[async_trait]
pub trait Node: Send + Sync {
    /// Display id of the node (e.g. "research", "triage").
    fn id(&self) -> &str;

    /// One step: read the current state, return a partial update.
    ///
    /// Errors propagate unmodified to the `invoke` caller; the engine does not
    /// retry or suppress them.
    async fn run(&self, state: &State) -> Result<StateUpdate, NodeError>;
}

/// Node built from a plain closure, for computations that need no struct.
///
/// ```rust
/// use weft::{FnNode, StateUpdate};
/// use serde_json::json;
///
/// let double = FnNode::new("double", |state| {
///     let x = state.get_i64("x").unwrap_or(0);
///     Ok(StateUpdate::new().with("x", json!(x * 2)))
/// });
/// ```
pub struct FnNode {
    id: String,
    f: Box<dyn Fn(&State) -> Result<StateUpdate, NodeError> + Send + Sync>,
}

impl FnNode {
    /// Wraps `f` as a node with the given id.
    pub fn new(
        id: impl Into<String>,
        f: impl Fn(&State) -> Result<StateUpdate, NodeError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            f: Box::new(f),
        }
    }
}

#[async_trait]
impl Node for FnNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, state: &State) -> Result<StateUpdate, NodeError> {
        (self.f)(state)
    }
}
