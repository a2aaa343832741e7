//! Graph visualization utilities.
//!
//! Export a compiled graph to Graphviz DOT format, or a plain text summary,
//! for debugging. Conditional routes render as labeled dashed edges.

use std::fmt::Write;

use super::conditional::NextEntry;
use super::CompiledGraph;
use super::{END, START};

/// Generate a Graphviz DOT representation of the compiled graph.
pub fn generate_dot(graph: &CompiledGraph) -> String {
    let mut dot = String::from("digraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [shape=box];\n\n");

    dot.push_str(&format!(
        "  \"{}\" [label=\"START\", style=bold, fillcolor=lightgreen];\n",
        START
    ));
    dot.push_str(&format!(
        "  \"{}\" [label=\"END\", style=bold, fillcolor=lightcoral];\n",
        END
    ));

    for node_id in &graph.node_order {
        dot.push_str(&format!("  \"{}\";\n", node_id));
    }

    dot.push('\n');
    dot.push_str(&format!("  \"{}\" -> \"{}\";\n", START, graph.entry));

    for node_id in &graph.node_order {
        match &graph.next_map[node_id] {
            NextEntry::Unconditional(to) => {
                dot.push_str(&format!("  \"{}\" -> \"{}\";\n", node_id, to));
            }
            NextEntry::Conditional(router) => {
                for (key, to) in router.sorted_routes() {
                    dot.push_str(&format!(
                        "  \"{}\" -> \"{}\" [label=\"{}\", style=dashed];\n",
                        node_id, to, key
                    ));
                }
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Generate a simple text representation of the compiled graph structure.
pub fn generate_text(graph: &CompiledGraph) -> String {
    let mut text = String::new();
    writeln!(text, "Graph Structure:").unwrap();
    writeln!(text, "Nodes: {}", graph.node_order.len()).unwrap();
    writeln!(text, "Entry: {}", graph.entry).unwrap();

    writeln!(text, "\nTransitions:").unwrap();
    writeln!(text, "  {} -> {}", START, graph.entry).unwrap();
    for node_id in &graph.node_order {
        match &graph.next_map[node_id] {
            NextEntry::Unconditional(to) => {
                writeln!(text, "  {} -> {}", node_id, to).unwrap();
            }
            NextEntry::Conditional(router) => {
                for (key, to) in router.sorted_routes() {
                    writeln!(text, "  {} -[{}]-> {}", node_id, key, to).unwrap();
                }
            }
        }
    }

    text
}
