//! Workflow graph: builder, compiled executable, conditional routing,
//! middleware, and visualization.
//!
//! Build with [`StateGraph`] (add nodes, wire edges, set the entry point),
//! compile into an immutable [`CompiledGraph`], then `invoke` it with initial
//! state values. `add_edge(START, n)` designates the entry node; an edge or
//! route targeting [`END`] terminates execution.

mod compiled;
mod conditional;
mod logging;
mod logging_middleware;
mod middleware;
mod state_graph;
mod visualization;

pub use compiled::CompiledGraph;
pub use conditional::{ConditionalRouter, NextEntry, SelectorFn};
pub use logging_middleware::LoggingNodeMiddleware;
pub use middleware::{NodeFuture, NodeMiddleware};
pub use state_graph::{BuildError, CompilationError, GraphIssue, StateGraph, END, START};
pub use visualization::{generate_dot, generate_text};
