//! Node middleware: a caller-supplied wrapper around each node execution.
//!
//! Generalizes decorator-style tracing: instead of baking instrumentation into
//! the engine, the caller composes a wrapper at graph build time via
//! `StateGraph::with_middleware`. The wrapper receives the node id, an owned
//! snapshot of the pre-merge state, and the inner run function; it decides
//! when (and whether) to call through.

use std::pin::Pin;

use async_trait::async_trait;

use crate::error::NodeError;
use crate::state::{State, StateUpdate};

/// Future returned by a wrapped node run.
pub type NodeFuture = Pin<Box<dyn std::future::Future<Output = Result<StateUpdate, NodeError>> + Send>>;

/// Wraps node execution in the compiled graph's run loop.
#[async_trait]
pub trait NodeMiddleware: Send + Sync {
    /// Called once per node execution. `inner` runs the actual node; the
    /// middleware must call it (or substitute a result) and return the
    /// outcome. Errors returned here propagate to the `invoke` caller.
    async fn around_run(
        &self,
        node_id: &str,
        state: State,
        inner: Box<dyn FnOnce(State) -> NodeFuture + Send>,
    ) -> Result<StateUpdate, NodeError>;
}
