//! Conditional routing example: a bounded classify/retry cycle.
//!
//! Deterministic (no network). A classify node scores an incident
//! description; a conditional edge routes to a pager node, back into
//! classification for another pass, or straight to END. The cycle is bounded
//! by a step limit, and the bundled logging middleware prints node
//! enter/exit lines to stderr.
//!
//! Run: `cargo run -p weft-examples --example triage -- "database on fire"`

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use serde_json::json;

use weft::{
    FnNode, LoggingNodeMiddleware, MergePolicy, State, StateGraph, StateSchema, StateUpdate, END,
    START,
};

fn severity_of(description: &str) -> i64 {
    ["fire", "down", "outage", "corrupt"]
        .iter()
        .filter(|word| description.contains(*word))
        .count() as i64
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let description = env::args()
        .nth(1)
        .unwrap_or_else(|| "intermittent latency on the search endpoint".to_string());

    let schema = StateSchema::builder()
        .field("notes", MergePolicy::Append)
        .field("description", MergePolicy::Overwrite)
        .field_with_default("severity", MergePolicy::Overwrite, json!(0))
        .field_with_default("passes", MergePolicy::Overwrite, json!(0))
        .build()
        .expect("valid schema");

    let classify = FnNode::new("classify", |state: &State| {
        let description = state.get_str("description").unwrap_or_default();
        let passes = state.get_i64("passes").unwrap_or(0) + 1;
        let severity = severity_of(description) + passes - 1;
        Ok(StateUpdate::new()
            .with("severity", json!(severity))
            .with("passes", json!(passes))
            .with("notes", json!([format!("pass {passes}: severity {severity}")])))
    });

    let page = FnNode::new("page", |state: &State| {
        let severity = state.get_i64("severity").unwrap_or(0);
        Ok(StateUpdate::new().with("notes", json!([format!("paged on-call (severity {severity})")])))
    });

    let routes: HashMap<String, String> = [
        ("escalate".to_string(), "page".to_string()),
        ("look_again".to_string(), "classify".to_string()),
        ("benign".to_string(), END.to_string()),
    ]
    .into_iter()
    .collect();

    let mut graph = StateGraph::new(schema);
    graph.add_node("classify", Arc::new(classify)).expect("node registers");
    graph.add_node("page", Arc::new(page)).expect("node registers");
    graph.add_edge(START, "classify");
    graph.add_conditional_edge(
        "classify",
        Arc::new(|state: &State| {
            let severity = state.get_i64("severity").unwrap_or(0);
            let passes = state.get_i64("passes").unwrap_or(0);
            if severity >= 2 {
                "escalate".into()
            } else if passes < 3 {
                "look_again".into()
            } else {
                "benign".into()
            }
        }),
        routes,
    );
    graph.add_edge("page", END);

    let compiled = graph
        .with_middleware(Arc::new(LoggingNodeMiddleware))
        .with_step_limit(10)
        .compile()
        .expect("valid graph");

    println!("{}", weft::generate_text(&compiled));

    let initial = StateUpdate::new().with("description", json!(description));
    match compiled.invoke(initial).await {
        Ok(state) => {
            for (field, value) in state.iter() {
                println!("{field}: {value}");
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
