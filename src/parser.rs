use crate::graph::SankeyGraph;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^sankey(-beta)?\s*$").unwrap());
static INIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%%\{\s*init\s*:\s*(\{.*\})\s*\}%%").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub graph: SankeyGraph,
    pub init_config: Option<serde_json::Value>,
}

/// Parses either a JSON graph document or Mermaid-style sankey text.
pub fn parse_input(input: &str) -> Result<ParseOutput> {
    if input.trim_start().starts_with('{') {
        let graph = parse_graph_json(input)?;
        return Ok(ParseOutput {
            graph,
            init_config: None,
        });
    }
    parse_sankey(input)
}

/// Parses `sankey-beta` text: one `source,target,value` row per line.
///
/// Fields may be quoted with `"` or `'`. Rows with fewer than three fields or
/// an empty endpoint are skipped. A value that is not a number becomes NaN
/// and so carries no flow.
pub fn parse_sankey(input: &str) -> Result<ParseOutput> {
    let mut graph = SankeyGraph::new();
    let (lines, init_config) = preprocess_input(input)?;

    for line in lines {
        if HEADER_RE.is_match(&line) {
            continue;
        }
        let parts = split_args(&line);
        if parts.len() < 3 {
            continue;
        }
        let source = strip_quotes(&parts[0]);
        let target = strip_quotes(&parts[1]);
        if source.is_empty() || target.is_empty() {
            continue;
        }
        let weight = strip_quotes(&parts[2]).parse::<f32>().unwrap_or(f32::NAN);
        graph.connect(&source, &target, weight);
    }

    Ok(ParseOutput { graph, init_config })
}

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default, alias = "edges")]
    links: Vec<LinkEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    #[serde(alias = "id")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    source: String,
    target: String,
    #[serde(default, alias = "weight")]
    value: Option<f32>,
}

/// Parses `{"nodes": [{"name"}], "links": [{"source", "target", "value"}]}`.
///
/// Listed nodes come first in declaration order; links may name nodes that
/// were not listed. A link without a value carries no flow.
pub fn parse_graph_json(input: &str) -> Result<SankeyGraph> {
    let document: GraphDocument =
        serde_json::from_str(input).context("invalid sankey graph document")?;
    let mut graph = SankeyGraph::new();
    for node in &document.nodes {
        graph.add_node(&node.name);
    }
    for link in &document.links {
        graph.connect(&link.source, &link.target, link.value.unwrap_or(f32::NAN));
    }
    Ok(graph)
}

fn preprocess_input(input: &str) -> Result<(Vec<String>, Option<serde_json::Value>)> {
    let mut init_config: Option<serde_json::Value> = None;
    let mut lines = Vec::new();

    for raw_line in input.lines() {
        let trimmed_line = raw_line.trim();
        if trimmed_line.is_empty() {
            continue;
        }
        if let Some(caps) = INIT_RE.captures(trimmed_line) {
            if let Some(json_str) = caps.get(1).map(|m| m.as_str()) {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(json_str) {
                    init_config = Some(value);
                } else {
                    let value = json5::from_str::<serde_json::Value>(json_str)
                        .context("invalid init directive")?;
                    init_config = Some(value);
                }
            }
            continue;
        }
        if trimmed_line.starts_with("%%") {
            continue;
        }
        let without_comment = strip_trailing_comment(trimmed_line);
        if without_comment.is_empty() {
            continue;
        }
        lines.push(without_comment);
    }

    Ok((lines, init_config))
}

fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in input.chars() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            current.push(ch);
            continue;
        }
        if ch == ',' {
            args.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(ch);
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        args.push(trimmed.to_string());
    }
    args
}

fn strip_quotes(input: &str) -> String {
    let trimmed = input.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn strip_trailing_comment(line: &str) -> String {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut out = String::new();
    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            out.push(ch);
            continue;
        }
        if ch == '%'
            && let Some('%') = chars.peek().copied()
        {
            break;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sankey_basic() {
        let input = "sankey-beta\n  A, B, 10\n  B, C, 5";
        let parsed = parse_sankey(input).unwrap();
        assert_eq!(parsed.graph.node_count(), 3);
        assert_eq!(parsed.graph.edge_count(), 2);
        assert_eq!(parsed.graph.edges()[0].weight, 10.0);
        assert!(parsed.init_config.is_none());
    }

    #[test]
    fn parse_sankey_quoted_fields_and_comments() {
        let input = r#"%% energy flows
sankey
"Bio-conversion, solid", Losses, 26.862 %% trailing
'Coal imports',"Coal", 11.606
"#;
        let parsed = parse_sankey(input).unwrap();
        let graph = &parsed.graph;
        assert!(graph.find("Bio-conversion, solid").is_some());
        assert!(graph.find("Coal imports").is_some());
        assert_eq!(graph.edge_count(), 2);
        assert!((graph.edges()[0].weight - 26.862).abs() < 1e-4);
    }

    #[test]
    fn parse_sankey_skips_short_rows_and_keeps_bad_values_as_nan() {
        let input = "sankey-beta\nA, B\n, B, 3\nA, C, lots";
        let parsed = parse_sankey(input).unwrap();
        assert_eq!(parsed.graph.edge_count(), 1);
        assert!(parsed.graph.edges()[0].weight.is_nan());
    }

    #[test]
    fn parse_init_directive_with_json5_fallback() {
        let input = "%%{init: {sankey: {nodeGap: 4, orient: 'vertical'}}}%%\nsankey-beta\nA,B,1";
        let parsed = parse_sankey(input).unwrap();
        let init = parsed.init_config.unwrap();
        assert_eq!(init["sankey"]["nodeGap"].as_f64(), Some(4.0));
        assert_eq!(init["sankey"]["orient"], "vertical");
    }

    #[test]
    fn parse_graph_json_document() {
        let input = r#"{
            "nodes": [{"name": "c"}, {"name": "a"}],
            "links": [
                {"source": "a", "target": "b", "value": 2},
                {"source": "b", "target": "c", "value": 1.5},
                {"source": "a", "target": "c"}
            ]
        }"#;
        let parsed = parse_input(input).unwrap();
        let names: Vec<&str> = parsed.graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!(parsed.graph.edge_count(), 3);
        assert!(parsed.graph.edges()[2].weight.is_nan());
    }

    #[test]
    fn parse_graph_json_reports_bad_documents() {
        assert!(parse_graph_json("{\"links\": [{\"source\": 1}]}").is_err());
    }
}
