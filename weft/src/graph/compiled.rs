//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Holds the schema, nodes, and the next-map
//! derived from explicit edges at compile time. Carries no per-invocation
//! mutable state, so independent invocations of one compiled graph may run
//! concurrently; each invocation owns its own `State` exclusively.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::GraphError;
use crate::node::Node;
use crate::state::{State, StateSchema, StateUpdate};

use super::conditional::NextEntry;
use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_merge,
};
use super::middleware::NodeMiddleware;
use super::state_graph::END;

/// Compiled graph: immutable structure, supports invoke only.
///
/// Execution is single-threaded, sequential, and synchronous per invocation:
/// one node at a time, and `invoke` does not return until the terminal
/// sentinel is reached or an error propagates. The engine places no timeout
/// or cancellation around node I/O; that is the node implementation's job.
#[derive(Clone)]
pub struct CompiledGraph {
    pub(super) schema: Arc<StateSchema>,
    pub(super) nodes: HashMap<String, Arc<dyn Node>>,
    /// Registration order; used by visualization.
    pub(super) node_order: Vec<String>,
    /// First node to run.
    pub(super) entry: String,
    /// Map from node id to its transition: a fixed target or a conditional router.
    pub(super) next_map: HashMap<String, NextEntry>,
    /// Optional wrapper composed around every node execution.
    pub(super) middleware: Option<Arc<dyn NodeMiddleware>>,
    /// Optional ceiling on node executions per invocation.
    pub(super) step_limit: Option<usize>,
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("node_order", &self.node_order)
            .field("entry", &self.entry)
            .field("step_limit", &self.step_limit)
            .finish_non_exhaustive()
    }
}

impl CompiledGraph {
    /// The schema every invocation's state is built from.
    pub fn schema(&self) -> &Arc<StateSchema> {
        &self.schema
    }

    async fn run_node(
        &self,
        node: Arc<dyn Node>,
        state: &State,
    ) -> Result<StateUpdate, crate::error::NodeError> {
        if let Some(middleware) = &self.middleware {
            let node_id = node.id().to_string();
            middleware
                .around_run(
                    &node_id,
                    state.clone(),
                    Box::new(move |s| Box::pin(async move { node.run(&s).await })),
                )
                .await
        } else {
            node.run(state).await
        }
    }

    /// Runs the graph from the entry point with caller-supplied initial values.
    ///
    /// Fields not named in `initial` start at their schema defaults. Per step:
    /// the current node runs against a read-only view of the state, its
    /// partial update is merged (each field by its declared policy), and the
    /// next node is resolved — through the node's conditional router against
    /// the post-merge state when it has one, else its single unconditional
    /// edge. Terminates when the transition target is [`END`], returning the
    /// final state.
    ///
    /// Errors — schema violations, unknown routes, the step ceiling, and any
    /// node-raised error — propagate to the caller; merges applied before a
    /// failing step are not rolled back.
    pub async fn invoke(&self, initial: StateUpdate) -> Result<State, GraphError> {
        log_graph_start();

        let mut state = match State::initialize(self.schema.clone(), initial) {
            Ok(state) => state,
            Err(e) => {
                let e = GraphError::Schema(e);
                log_graph_error(&e);
                return Err(e);
            }
        };

        let mut current = self.entry.clone();
        let mut steps = 0usize;
        loop {
            if let Some(limit) = self.step_limit {
                if steps >= limit {
                    let e = GraphError::StepLimitExceeded(limit);
                    log_graph_error(&e);
                    return Err(e);
                }
            }

            let node = self
                .nodes
                .get(&current)
                .expect("compiled graph has all nodes")
                .clone();

            log_node_start(&current);
            log_node_state(&current, &state);

            let update = match self.run_node(node, &state).await {
                Ok(update) => update,
                Err(e) => {
                    let e = GraphError::Node(e);
                    log_graph_error(&e);
                    return Err(e);
                }
            };

            if let Err(e) = state.merge(update) {
                let e = GraphError::Schema(e);
                log_graph_error(&e);
                return Err(e);
            }
            log_state_merge(&current);
            steps += 1;

            let next = match self
                .next_map
                .get(&current)
                .expect("compiled graph has an outgoing edge per node")
            {
                NextEntry::Unconditional(to) => to.clone(),
                NextEntry::Conditional(router) => match router.resolve_next(&current, &state) {
                    Ok(target) => {
                        tracing::debug!(from = %current, to = %target, "conditional routing");
                        target
                    }
                    Err(e) => {
                        log_graph_error(&e);
                        return Err(e);
                    }
                },
            };
            log_node_complete(&current, &next);

            if next == END {
                log_graph_complete();
                return Ok(state);
            }
            current = next;
        }
    }
}
