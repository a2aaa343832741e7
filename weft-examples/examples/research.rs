//! Market research workflow: single-node chain START → research → END.
//!
//! The research node renders a prompt from the business context in state,
//! calls OpenAI chat completions, scores the reply with an injected scoring
//! function, and returns a partial update (insights, score, message log,
//! session id). Requires `OPENAI_API_KEY` (via .env or the environment).
//!
//! Run: `cargo run -p weft-examples --example research -- "B2B SaaS for dentists"`

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::env;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};

use weft::{
    MergePolicy, Node, NodeError, State, StateGraph, StateSchema, StateUpdate, END, START,
};

const RESEARCH_PROMPT: &str = "\
MARKET RESEARCH BRIEF

BUSINESS CONTEXT FOR ANALYSIS:
{business_context}

Conduct customer psychology research for the business above. Cover:
1. Core motivational drivers and hidden pain points
2. Authentic customer language patterns (include 3-5 example phrases)
3. Awareness levels and decision triggers
4. Positioning opportunities and messaging angles

Structure the response with clear sections and specific recommendations.";

/// Renders a prompt template, validating that every required context key is
/// supplied. Placeholders use `{key}` syntax.
fn render(template: &str, context: &HashMap<&str, String>) -> Result<String, NodeError> {
    let mut out = template.to_string();
    for (key, value) in context {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    if let Some(start) = out.find('{') {
        let rest = &out[start..];
        let end = rest.find('}').map(|i| start + i + 1).unwrap_or(out.len());
        return Err(NodeError::ExecutionFailed(format!(
            "prompt template placeholder {} has no context value",
            &out[start..end]
        )));
    }
    Ok(out)
}

/// Research node: prompt in, scored insights out.
///
/// The OpenAI client is passed in explicitly (credentials resolved by the
/// caller, never read inside the node) and the quality heuristic is an
/// injected function, so the node stays testable in isolation.
struct ResearchNode {
    client: Client<OpenAIConfig>,
    model: String,
    score: Box<dyn Fn(&str) -> i64 + Send + Sync>,
}

impl ResearchNode {
    fn new(
        client: Client<OpenAIConfig>,
        model: impl Into<String>,
        score: impl Fn(&str) -> i64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            score: Box::new(score),
        }
    }
}

#[async_trait]
impl Node for ResearchNode {
    fn id(&self) -> &str {
        "research"
    }

    async fn run(&self, state: &State) -> Result<StateUpdate, NodeError> {
        let business_context = state
            .get_str("business_context")
            .unwrap_or_default()
            .to_string();

        let context: HashMap<&str, String> =
            [("business_context", business_context.clone())].into();
        let prompt = render(RESEARCH_PROMPT, &context)?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.clone())
            .build()
            .map_err(|e| NodeError::Source(Box::new(e)))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.3)
            .messages(vec![user_message.into()])
            .build()
            .map_err(|e| NodeError::Source(Box::new(e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| NodeError::Source(Box::new(e)))?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| NodeError::ExecutionFailed("empty completion".to_string()))?;

        let quality_score = (self.score)(&content);

        let mut hasher = DefaultHasher::new();
        business_context.hash(&mut hasher);
        let session_id = format!("research_{}", hasher.finish() % 10_000);

        Ok(StateUpdate::new()
            .with("research_insights", json!(content))
            .with("quality_score", json!(quality_score))
            .with(
                "messages",
                json!([{ "role": "assistant", "content": content }]),
            )
            .with("session_id", json!(session_id)))
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let business_context = env::args()
        .nth(1)
        .unwrap_or_else(|| "An online bookstore for rare first editions".to_string());

    let api_key = match env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("OPENAI_API_KEY not set");
            std::process::exit(1);
        }
    };
    let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));

    let schema = StateSchema::builder()
        .field("messages", MergePolicy::Append)
        .field("business_context", MergePolicy::Overwrite)
        .field("research_insights", MergePolicy::Overwrite)
        .field_with_default("quality_score", MergePolicy::Overwrite, json!(0))
        .field("session_id", MergePolicy::Overwrite)
        .build()
        .expect("valid schema");

    // Length-based quality heuristic, clamped to [70, 95].
    let score = |artifact: &str| (artifact.len() as i64 / 50).clamp(70, 95);

    let mut graph = StateGraph::new(schema);
    graph
        .add_node(
            "research",
            Arc::new(ResearchNode::new(client, "gpt-4o-mini", score)),
        )
        .expect("node registers");
    graph.add_edge(START, "research");
    graph.add_edge("research", END);

    let compiled = graph.compile().expect("valid graph");

    let initial = StateUpdate::new().with("business_context", json!(business_context));
    match compiled.invoke(initial).await {
        Ok(state) => {
            println!("{}", state.get_str("research_insights").unwrap_or(""));
            eprintln!(
                "quality_score={} session_id={}",
                state.get_i64("quality_score").unwrap_or(0),
                state.get_str("session_id").unwrap_or("")
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
