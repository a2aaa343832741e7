//! Run-time error types for graph execution.
//!
//! Used by `Node::run` and `CompiledGraph::invoke`. Construction-time errors
//! (`BuildError`, `CompilationError`) live with the graph builder.

use thiserror::Error;

use crate::state::SchemaError;

/// Error raised inside a node function.
///
/// The engine propagates these to the `invoke` caller unmodified; there is no
/// catching, wrapping, or retry at the engine level.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Execution failed with a message (e.g. an external service call failed).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// An underlying error from a collaborator the node calls, preserved as
    /// the source for callers that want to downcast.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Error surfaced by `CompiledGraph::invoke`.
///
/// Everything propagates to the immediate caller; nothing is swallowed or
/// retried. Merges applied before the failing step are not rolled back.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A state initialization or merge violated the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A conditional edge's selector returned a key absent from its route
    /// table. Detected only at run time since it depends on state content.
    #[error("selector on node {node:?} returned route {key:?} with no entry in the route table")]
    UnknownRoute { node: String, key: String },

    /// The configured step ceiling was reached before any terminal edge.
    #[error("step limit of {0} node executions exceeded")]
    StepLimitExceeded(usize),

    /// A node function failed; propagated as-is.
    #[error(transparent)]
    Node(#[from] NodeError),
}
