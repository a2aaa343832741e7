//! Logging utilities for graph execution.
//!
//! Structured logging for graph runs, node execution, and state merges.
//! Errors are logged here but never swallowed; they still propagate.

use crate::error::GraphError;
use crate::state::State;

/// Log node execution start.
pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

/// Log the state a node is about to see.
pub fn log_node_state(node_id: &str, state: &State) {
    tracing::debug!(node_id = node_id, state = ?state, "Node execution: state");
}

/// Log a merged node update.
pub fn log_state_merge(node_id: &str) {
    tracing::debug!(node_id = node_id, "State update merged");
}

/// Log the resolved transition out of a node.
pub fn log_node_complete(node_id: &str, next: &str) {
    tracing::debug!(node_id = node_id, next = next, "Node execution complete");
}

/// Log graph execution start.
pub fn log_graph_start() {
    tracing::info!("Starting graph execution");
}

/// Log graph execution completion.
pub fn log_graph_complete() {
    tracing::info!("Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &GraphError) {
    tracing::error!(?error, "Graph execution error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MergePolicy, StateSchema, StateUpdate};

    #[test]
    fn test_logging_functions() {
        // These should not panic
        let schema = StateSchema::builder()
            .field("x", MergePolicy::Overwrite)
            .build()
            .unwrap();
        let state = State::initialize(schema, StateUpdate::new()).unwrap();
        log_node_start("test_node");
        log_node_state("test_node", &state);
        log_state_merge("test_node");
        log_node_complete("test_node", "__end__");
        log_graph_start();
        log_graph_complete();
        log_graph_error(&GraphError::StepLimitExceeded(1));
    }
}
