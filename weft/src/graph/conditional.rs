//! Conditional edges: route to the next node based on post-merge state.
//!
//! A source node may carry a routing selector that takes the current state and
//! returns a route key; the key is looked up in the route table to get the
//! next node id (or END). A key with no table entry is a run-time
//! [`GraphError::UnknownRoute`] — the table is strict, there is no fallback.
//!
//! **Interaction**: built by `StateGraph::add_conditional_edge`; resolved in
//! the `CompiledGraph` run loop after the source node's update is merged.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GraphError;
use crate::state::State;

/// Selector function: takes a reference to state and returns a route key.
pub type SelectorFn = Arc<dyn Fn(&State) -> String + Send + Sync>;

/// Conditional edge definition: selector plus route table.
#[derive(Clone)]
pub struct ConditionalRouter {
    /// Function that returns a route key from the post-merge state.
    pub(super) selector: SelectorFn,
    /// Map from route key to node id (or END). Strict: unknown keys error.
    pub(super) routes: HashMap<String, String>,
}

impl ConditionalRouter {
    pub fn new(selector: SelectorFn, routes: HashMap<String, String>) -> Self {
        Self { selector, routes }
    }

    /// Resolves the next node id from the current state.
    ///
    /// `node` is the source node id, used for error reporting.
    pub(super) fn resolve_next(&self, node: &str, state: &State) -> Result<String, GraphError> {
        let key = (self.selector)(state);
        self.routes
            .get(&key)
            .cloned()
            .ok_or(GraphError::UnknownRoute {
                node: node.to_string(),
                key,
            })
    }

    /// Route entries as `(key, target)` pairs, sorted by key for
    /// deterministic validation and visualization output.
    pub(super) fn sorted_routes(&self) -> Vec<(&str, &str)> {
        let mut routes: Vec<_> = self
            .routes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        routes.sort();
        routes
    }
}

/// How to determine the next node after a given node runs.
///
/// Stored in the compiled graph's next map: a single fixed target, or a
/// selector-driven router resolved against the post-merge state.
#[derive(Clone)]
pub enum NextEntry {
    /// Single fixed next node (or END).
    Unconditional(String),
    /// Next node decided by the router from state.
    Conditional(ConditionalRouter),
}
