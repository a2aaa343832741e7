//! Logging middleware that prints node enter/exit around each node run.
//!
//! Interacts with [`NodeMiddleware`](super::NodeMiddleware); composed via
//! `StateGraph::with_middleware`.

use async_trait::async_trait;

use crate::error::NodeError;
use crate::state::{State, StateUpdate};

use super::middleware::{NodeFuture, NodeMiddleware};

/// Middleware that logs node enter/exit around each node run.
///
/// Logs to stderr so that normal output can be redirected separately.
#[derive(Default)]
pub struct LoggingNodeMiddleware;

#[async_trait]
impl NodeMiddleware for LoggingNodeMiddleware {
    async fn around_run(
        &self,
        node_id: &str,
        state: State,
        inner: Box<dyn FnOnce(State) -> NodeFuture + Send>,
    ) -> Result<StateUpdate, NodeError> {
        eprintln!("[node] enter node={}", node_id);
        let result = inner(state).await;
        match &result {
            Ok(_) => eprintln!("[node] exit node={}", node_id),
            Err(e) => eprintln!("[node] exit node={} error={}", node_id, e),
        }
        result
    }
}
