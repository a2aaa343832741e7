//! Graph builder: register nodes, wire edges, designate the entry point,
//! then compile into an immutable executable.
//!
//! Construction is incremental; `compile()` validates the whole structure in
//! one pass and reports every defect found, so a caller can fix all issues
//! without repeated compile attempts.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::node::Node;
use crate::state::StateSchema;

use super::compiled::CompiledGraph;
use super::conditional::{ConditionalRouter, NextEntry, SelectorFn};
use super::middleware::NodeMiddleware;

/// Sentinel id for the edge source that designates the entry point.
pub const START: &str = "__start__";

/// Terminal sentinel: an edge or route targeting `END` stops execution.
pub const END: &str = "__end__";

/// Graph construction error, raised at the call that caused it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// `add_node` was called with an id that is already registered.
    #[error("node {0:?} is already registered")]
    DuplicateNode(String),

    /// `set_entry_point` named a node that is not registered.
    #[error("node {0:?} is not registered")]
    UnknownNode(String),
}

/// One structural defect found during `compile()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// No entry point was designated.
    MissingEntryPoint,
    /// The entry point names an unregistered node.
    UnknownEntryPoint(String),
    /// An edge leaves a node id that is not registered.
    UnknownEdgeSource(String),
    /// An unconditional edge targets an unregistered node.
    UnknownEdgeTarget { from: String, to: String },
    /// A conditional route targets an unregistered node.
    UnknownRouteTarget {
        from: String,
        key: String,
        to: String,
    },
    /// A registered node has no outgoing edge and is not pointed at END.
    NoOutgoingEdge(String),
    /// A registered node cannot be reached from the entry point.
    Unreachable(String),
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::MissingEntryPoint => write!(f, "no entry point set"),
            GraphIssue::UnknownEntryPoint(id) => {
                write!(f, "entry point {id:?} is not a registered node")
            }
            GraphIssue::UnknownEdgeSource(id) => {
                write!(f, "edge source {id:?} is not a registered node")
            }
            GraphIssue::UnknownEdgeTarget { from, to } => {
                write!(f, "edge {from:?} -> {to:?} targets an unregistered node")
            }
            GraphIssue::UnknownRouteTarget { from, key, to } => write!(
                f,
                "route {key:?} out of {from:?} targets unregistered node {to:?}"
            ),
            GraphIssue::NoOutgoingEdge(id) => {
                write!(f, "node {id:?} has no outgoing edge")
            }
            GraphIssue::Unreachable(id) => {
                write!(f, "node {id:?} is unreachable from the entry point")
            }
        }
    }
}

/// Aggregate of every structural defect found in one `compile()` pass.
#[derive(Debug)]
pub struct CompilationError {
    pub issues: Vec<GraphIssue>,
}

impl std::error::Error for CompilationError {}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph validation failed: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Mutable workflow graph builder over a shared state schema.
///
/// **Interaction**: produces a [`CompiledGraph`] via [`StateGraph::compile`];
/// the compiled form is immutable and safe for concurrent invocations.
pub struct StateGraph {
    schema: Arc<StateSchema>,
    nodes: HashMap<String, Arc<dyn Node>>,
    /// Registration order, for deterministic validation and visualization.
    node_order: Vec<String>,
    next_map: HashMap<String, NextEntry>,
    /// Insertion order of next_map keys.
    edge_order: Vec<String>,
    entry: Option<String>,
    middleware: Option<Arc<dyn NodeMiddleware>>,
    step_limit: Option<usize>,
}

impl std::fmt::Debug for StateGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateGraph")
            .field("node_order", &self.node_order)
            .field("edge_order", &self.edge_order)
            .field("entry", &self.entry)
            .field("step_limit", &self.step_limit)
            .finish_non_exhaustive()
    }
}

impl StateGraph {
    /// Starts an empty graph over `schema`.
    pub fn new(schema: Arc<StateSchema>) -> Self {
        Self {
            schema,
            nodes: HashMap::new(),
            node_order: Vec::new(),
            next_map: HashMap::new(),
            edge_order: Vec::new(),
            entry: None,
            middleware: None,
            step_limit: None,
        }
    }

    /// Registers a node. Fails if the id is already taken.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        node: Arc<dyn Node>,
    ) -> Result<&mut Self, BuildError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(BuildError::DuplicateNode(id));
        }
        self.node_order.push(id.clone());
        self.nodes.insert(id, node);
        Ok(self)
    }

    /// Registers an unconditional transition. `to` may be [`END`];
    /// `add_edge(START, n)` designates the entry point. Endpoint validity is
    /// checked at compile time, and a later edge from the same source
    /// replaces the earlier one.
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        if from == START {
            self.entry = Some(to.to_string());
            return self;
        }
        if !self.next_map.contains_key(from) {
            self.edge_order.push(from.to_string());
        }
        self.next_map
            .insert(from.to_string(), NextEntry::Unconditional(to.to_string()));
        self
    }

    /// Registers a selector-driven transition out of `from`.
    ///
    /// After `from` runs and its update is merged, `selector(state)` produces
    /// a route key looked up in `routes`; the target may be a node id or
    /// [`END`]. A key absent from `routes` fails the invocation with
    /// `GraphError::UnknownRoute` at that step.
    pub fn add_conditional_edge(
        &mut self,
        from: &str,
        selector: SelectorFn,
        routes: HashMap<String, String>,
    ) -> &mut Self {
        if !self.next_map.contains_key(from) {
            self.edge_order.push(from.to_string());
        }
        self.next_map.insert(
            from.to_string(),
            NextEntry::Conditional(ConditionalRouter::new(selector, routes)),
        );
        self
    }

    /// Designates the first node to execute. Fails if `id` is not registered.
    pub fn set_entry_point(&mut self, id: &str) -> Result<&mut Self, BuildError> {
        if !self.nodes.contains_key(id) {
            return Err(BuildError::UnknownNode(id.to_string()));
        }
        self.entry = Some(id.to_string());
        Ok(self)
    }

    /// Composes a middleware around every node execution of the compiled graph.
    pub fn with_middleware(mut self, middleware: Arc<dyn NodeMiddleware>) -> Self {
        self.middleware = Some(middleware);
        self
    }

    /// Bounds an invocation to at most `limit` node executions. Cycles are
    /// legal and the engine does not detect infinite loops otherwise.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Validates the graph and returns its immutable executable form.
    ///
    /// All defects are collected in one pass: missing or unknown entry point,
    /// dangling edge endpoints, nodes with no outgoing edge, and nodes
    /// unreachable from the entry point.
    pub fn compile(&self) -> Result<CompiledGraph, CompilationError> {
        let mut issues = Vec::new();

        match &self.entry {
            None => issues.push(GraphIssue::MissingEntryPoint),
            Some(entry) if !self.nodes.contains_key(entry) => {
                issues.push(GraphIssue::UnknownEntryPoint(entry.clone()))
            }
            Some(_) => {}
        }

        for id in &self.node_order {
            if !self.next_map.contains_key(id) {
                issues.push(GraphIssue::NoOutgoingEdge(id.clone()));
            }
        }

        for from in &self.edge_order {
            if !self.nodes.contains_key(from) {
                issues.push(GraphIssue::UnknownEdgeSource(from.clone()));
            }
            match &self.next_map[from] {
                NextEntry::Unconditional(to) => {
                    if to != END && !self.nodes.contains_key(to) {
                        issues.push(GraphIssue::UnknownEdgeTarget {
                            from: from.clone(),
                            to: to.clone(),
                        });
                    }
                }
                NextEntry::Conditional(router) => {
                    for (key, to) in router.sorted_routes() {
                        if to != END && !self.nodes.contains_key(to) {
                            issues.push(GraphIssue::UnknownRouteTarget {
                                from: from.clone(),
                                key: key.to_string(),
                                to: to.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if let Some(entry) = self.entry.as_ref().filter(|e| self.nodes.contains_key(*e)) {
            let reachable = self.reachable_from(entry);
            for id in &self.node_order {
                if !reachable.contains(id.as_str()) {
                    issues.push(GraphIssue::Unreachable(id.clone()));
                }
            }
        }

        if !issues.is_empty() {
            return Err(CompilationError { issues });
        }

        Ok(CompiledGraph {
            schema: self.schema.clone(),
            nodes: self.nodes.clone(),
            node_order: self.node_order.clone(),
            entry: self.entry.clone().expect("entry validated above"),
            next_map: self.next_map.clone(),
            middleware: self.middleware.clone(),
            step_limit: self.step_limit,
        })
    }

    fn reachable_from<'a>(&'a self, entry: &'a str) -> HashSet<&'a str> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack = vec![entry];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            match self.next_map.get(id) {
                Some(NextEntry::Unconditional(to)) => {
                    if to != END && self.nodes.contains_key(to) {
                        stack.push(to);
                    }
                }
                Some(NextEntry::Conditional(router)) => {
                    for (_, to) in router.sorted_routes() {
                        if to != END && self.nodes.contains_key(to) {
                            stack.push(to);
                        }
                    }
                }
                None => {}
            }
        }
        visited
    }
}
