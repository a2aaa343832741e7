//! End-to-end graph tests: a multi-step pipeline with a mock model node,
//! selector-driven revision loop, and schema enforcement across steps.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use weft::{
    FnNode, MergePolicy, Node, NodeError, State, StateGraph, StateSchema, StateUpdate, END,
    GraphError, START,
};

/// Initialize logging once for the whole test binary; RUST_LOG controls output.
#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn schema() -> Arc<StateSchema> {
    StateSchema::builder()
        .field("messages", MergePolicy::Append)
        .field("business_context", MergePolicy::Overwrite)
        .field("research_insights", MergePolicy::Overwrite)
        .field_with_default("quality_score", MergePolicy::Overwrite, json!(0))
        .build()
        .unwrap()
}

/// Stand-in for a hosted model call: deterministic text derived from the
/// business context, scored by an injected function.
struct MockResearchNode {
    score: Box<dyn Fn(&str) -> i64 + Send + Sync>,
}

#[async_trait]
impl Node for MockResearchNode {
    fn id(&self) -> &str {
        "research"
    }

    async fn run(&self, state: &State) -> Result<StateUpdate, NodeError> {
        let context = state.get_str("business_context").unwrap_or_default();
        let insights = format!("insights for: {context}");
        let score = (self.score)(&insights);
        Ok(StateUpdate::new()
            .with("research_insights", json!(insights))
            .with("quality_score", json!(score))
            .with(
                "messages",
                json!([{ "role": "assistant", "content": insights }]),
            ))
    }
}

/// **Scenario**: Full pipeline — research produces insights, a conditional
/// edge loops through a revise step until the score clears the bar, and the
/// message log keeps one entry per executed step in order.
#[tokio::test]
async fn research_pipeline_with_revision_loop() {
    let mut graph = StateGraph::new(schema());
    graph
        .add_node(
            "research",
            Arc::new(MockResearchNode {
                score: Box::new(|_| 40),
            }),
        )
        .unwrap();
    graph
        .add_node(
            "revise",
            Arc::new(FnNode::new("revise", |state: &State| {
                let score = state.get_i64("quality_score").unwrap_or(0);
                Ok(StateUpdate::new()
                    .with("quality_score", json!(score + 30))
                    .with("messages", json!([{ "role": "system", "content": "revised" }])))
            })),
        )
        .unwrap();
    graph.add_edge(START, "research");
    let routes: HashMap<String, String> = [
        ("good".to_string(), END.to_string()),
        ("needs_work".to_string(), "revise".to_string()),
    ]
    .into_iter()
    .collect();
    let selector: weft::SelectorFn = Arc::new(|state: &State| {
        if state.get_i64("quality_score").unwrap_or(0) >= 70 {
            "good".into()
        } else {
            "needs_work".into()
        }
    });
    graph.add_conditional_edge("research", selector.clone(), routes.clone());
    graph.add_conditional_edge("revise", selector, routes);
    let compiled = graph.with_step_limit(10).compile().expect("valid graph");

    let out = compiled
        .invoke(StateUpdate::new().with("business_context", json!("rare books")))
        .await
        .unwrap();

    // research: 40, revise: 70 -> good
    assert_eq!(out.get_i64("quality_score"), Some(70));
    assert_eq!(
        out.get_str("research_insights"),
        Some("insights for: rare books")
    );
    let messages = out.get_array("messages").unwrap();
    assert_eq!(messages.len(), 2, "one entry per executed step");
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[1]["content"], "revised");
}

/// **Scenario**: The same registrations compiled into two separate executables
/// agree on the final state for identical input.
#[tokio::test]
async fn pipeline_double_compile_agrees() {
    fn build() -> weft::CompiledGraph {
        let mut graph = StateGraph::new(schema());
        graph
            .add_node(
                "research",
                Arc::new(MockResearchNode {
                    score: Box::new(|text| (text.len() as i64).clamp(70, 95)),
                }),
            )
            .unwrap();
        graph.add_edge(START, "research");
        graph.add_edge("research", END);
        graph.compile().expect("valid graph")
    }

    let initial = StateUpdate::new().with("business_context", json!("dental SaaS"));
    let a = build().invoke(initial.clone()).await.unwrap();
    let b = build().invoke(initial).await.unwrap();
    assert_eq!(a, b);
}

/// **Scenario**: A node whose update names a field outside the schema stops
/// the pipeline with a schema error carried out of invoke.
#[tokio::test]
async fn pipeline_rejects_out_of_schema_update() {
    let mut graph = StateGraph::new(schema());
    graph
        .add_node(
            "rogue",
            Arc::new(FnNode::new("rogue", |_| {
                Ok(StateUpdate::new().with("telemetry", json!({"spans": 3})))
            })),
        )
        .unwrap();
    graph.add_edge(START, "rogue");
    graph.add_edge("rogue", END);
    let compiled = graph.compile().expect("valid graph");

    let err = compiled.invoke(StateUpdate::new()).await.unwrap_err();
    assert!(matches!(err, GraphError::Schema(_)), "got {err:?}");
}
