//! Weft: a typed state-graph workflow engine.
//!
//! A workflow is a directed graph of named nodes over a shared state
//! container. The state is an ordered mapping from declared field name to
//! JSON value, where each field carries a merge policy fixed at schema
//! definition time: overwrite (last write wins) or append (ordered
//! accumulation). Nodes are pure with respect to the state — they receive a
//! read-only borrow and return a partial update — and the run loop merges
//! each update before resolving the next node, either along a single edge or
//! through a selector-driven route table.
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use weft::{FnNode, MergePolicy, StateGraph, StateSchema, StateUpdate, END, START};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = StateSchema::builder()
//!     .field("x", MergePolicy::Overwrite)
//!     .field("y", MergePolicy::Overwrite)
//!     .build()?;
//!
//! let mut graph = StateGraph::new(schema);
//! graph.add_node(
//!     "answer",
//!     Arc::new(FnNode::new("answer", |_| {
//!         Ok(StateUpdate::new().with("y", json!(2)))
//!     })),
//! )?;
//! graph.add_edge(START, "answer");
//! graph.add_edge("answer", END);
//!
//! let compiled = graph.compile()?;
//! let out = compiled.invoke(StateUpdate::new().with("x", json!(1))).await?;
//! assert_eq!(out.get("x"), Some(&json!(1)));
//! assert_eq!(out.get("y"), Some(&json!(2)));
//! # Ok(())
//! # }
//! ```
//!
//! The compiled graph is immutable and carries no per-invocation mutable
//! state; independent invocations may run concurrently. The engine performs
//! no retries, timeouts, or persistence — errors propagate to the caller and
//! each invocation's state is discarded when `invoke` returns.

pub mod error;
pub mod graph;
pub mod node;
pub mod state;

pub use error::{GraphError, NodeError};
pub use graph::{
    generate_dot, generate_text, BuildError, CompilationError, CompiledGraph, GraphIssue,
    LoggingNodeMiddleware, NodeFuture, NodeMiddleware, SelectorFn, StateGraph, END, START,
};
pub use node::{FnNode, Node};
pub use state::{
    FieldSpec, MergePolicy, SchemaBuilder, SchemaError, State, StateSchema, StateUpdate,
};
