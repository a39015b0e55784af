use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::domain::model::AdjacencyList;

/// Render a minimal GEXF 1.2draft document for Gephi. Edges are undirected
/// and deduplicated; missing labels fall back to the numeric id.
pub fn render(adj: &AdjacencyList, labels: &BTreeMap<i64, String>) -> String {
    let mut nodes: BTreeSet<i64> = adj.keys().copied().collect();
    let mut edges: BTreeSet<(i64, i64)> = BTreeSet::new();

    for (&from, members) in adj {
        for &to in members {
            nodes.insert(to);
            if from != to {
                edges.insert((from.min(to), from.max(to)));
            }
        }
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<gexf xmlns=\"http://www.gexf.net/1.2draft\" version=\"1.2\">\n");
    out.push_str("  <graph mode=\"static\" defaultedgetype=\"undirected\">\n");

    out.push_str("    <nodes>\n");
    for id in &nodes {
        let label = labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string());
        let _ = writeln!(
            out,
            "      <node id=\"{}\" label=\"{}\" />",
            id,
            escape(&label)
        );
    }
    out.push_str("    </nodes>\n");

    out.push_str("    <edges>\n");
    for (edge_id, (source, target)) in edges.iter().enumerate() {
        let _ = writeln!(
            out,
            "      <edge id=\"{}\" source=\"{}\" target=\"{}\" />",
            edge_id, source, target
        );
    }
    out.push_str("    </edges>\n");

    out.push_str("  </graph>\n");
    out.push_str("</gexf>\n");
    out
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
