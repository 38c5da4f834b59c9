//! Arena-backed flow graph.
//!
//! Nodes and edges live in flat vectors and refer to each other by index, so
//! the graph has no ownership cycles and serializes as plain data. Every
//! layout field sits in a fixed-shape record ([`NodeLayout`], [`EdgeLayout`])
//! that the pipeline in [`crate::layout`] rewrites from scratch on each run.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Orient;
use crate::error::GraphError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node layout scratch state.
///
/// `primary` runs along the breadth axis (levels), `secondary` along the
/// depth axis (stacking within a level).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub value: f32,
    pub level: usize,
    pub primary: f32,
    pub primary_size: f32,
    pub secondary: f32,
    pub secondary_size: f32,
    /// Outgoing edges in ribbon stacking order.
    pub out_order: Vec<EdgeId>,
    /// Incoming edges in ribbon stacking order.
    pub in_order: Vec<EdgeId>,
}

impl NodeLayout {
    pub fn center(&self) -> f32 {
        self.secondary + self.secondary_size / 2.0
    }

    pub fn secondary_end(&self) -> f32 {
        self.secondary + self.secondary_size
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeLayout {
    pub thickness: f32,
    pub source_offset: f32,
    pub target_offset: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyNode {
    pub name: String,
    pub in_edges: Vec<EdgeId>,
    pub out_edges: Vec<EdgeId>,
    #[serde(default)]
    pub layout: NodeLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
    #[serde(default)]
    pub layout: EdgeLayout,
}

impl SankeyEdge {
    /// Weight as it enters sums: NaN counts as nothing.
    pub fn effective_weight(&self) -> f32 {
        if self.weight.is_nan() { 0.0 } else { self.weight }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Anchor points of one ribbon on its source and target bars.
///
/// `start` / `end` mark the top (horizontal) or left (vertical) edge of the
/// band; the band extends `thickness` along the secondary axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ribbon {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub thickness: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphRecord")]
pub struct SankeyGraph {
    nodes: Vec<SankeyNode>,
    edges: Vec<SankeyEdge>,
    #[serde(skip)]
    index: HashMap<String, NodeId>,
}

/// Serialized form of [`SankeyGraph`]; the name index is rebuilt on load.
#[derive(Deserialize)]
struct GraphRecord {
    nodes: Vec<SankeyNode>,
    edges: Vec<SankeyEdge>,
}

impl From<GraphRecord> for SankeyGraph {
    fn from(record: GraphRecord) -> Self {
        let mut graph = SankeyGraph {
            nodes: record.nodes,
            edges: record.edges,
            index: HashMap::new(),
        };
        graph.reindex();
        graph
    }
}

impl SankeyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the node called `name`, creating it if needed.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(SankeyNode {
            name: name.to_string(),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            layout: NodeLayout::default(),
        });
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f32,
    ) -> Result<EdgeId, GraphError> {
        for id in [source, target] {
            if id.index() >= self.nodes.len() {
                return Err(GraphError::UnknownNode { id });
            }
        }
        Ok(self.push_edge(source, target, weight))
    }

    pub fn connect(&mut self, source: &str, target: &str, weight: f32) -> EdgeId {
        let source = self.add_node(source);
        let target = self.add_node(target);
        self.push_edge(source, target, weight)
    }

    fn push_edge(&mut self, source: NodeId, target: NodeId, weight: f32) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(SankeyEdge {
            source,
            target,
            weight,
            layout: EdgeLayout::default(),
        });
        self.nodes[source.index()].out_edges.push(id);
        self.nodes[target.index()].in_edges.push(id);
        id
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &SankeyNode {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &SankeyEdge {
        &self.edges[id.index()]
    }

    pub fn nodes(&self) -> &[SankeyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SankeyEdge] {
        &self.edges
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [SankeyNode], &mut [SankeyEdge]) {
        (&mut self.nodes, &mut self.edges)
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.name.clone(), NodeId(idx)))
            .collect();
    }

    pub fn node_rect(&self, id: NodeId, orient: Orient) -> Rect {
        let layout = &self.node(id).layout;
        match orient {
            Orient::Horizontal => Rect {
                x: layout.primary,
                y: layout.secondary,
                width: layout.primary_size,
                height: layout.secondary_size,
            },
            Orient::Vertical => Rect {
                x: layout.secondary,
                y: layout.primary,
                width: layout.secondary_size,
                height: layout.primary_size,
            },
        }
    }

    pub fn ribbon(&self, id: EdgeId, orient: Orient) -> Ribbon {
        let edge = self.edge(id);
        let source = self.node_rect(edge.source, orient);
        let target = self.node_rect(edge.target, orient);
        let (start, end) = match orient {
            Orient::Horizontal => (
                (source.x + source.width, source.y + edge.layout.source_offset),
                (target.x, target.y + edge.layout.target_offset),
            ),
            Orient::Vertical => (
                (source.x + edge.layout.source_offset, source.y + source.height),
                (target.x + edge.layout.target_offset, target.y),
            ),
        };
        Ribbon {
            start,
            end,
            thickness: edge.layout.thickness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_is_idempotent_by_name() {
        let mut graph = SankeyGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        assert_ne!(a, b);
        assert_eq!(graph.add_node("a"), a);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.find("b"), Some(b));
        assert_eq!(graph.find("c"), None);
    }

    #[test]
    fn edges_keep_insertion_order_on_both_endpoints() {
        let mut graph = SankeyGraph::new();
        let e1 = graph.connect("a", "b", 1.0);
        let e2 = graph.connect("a", "c", 2.0);
        let e3 = graph.connect("c", "b", 3.0);
        let a = graph.find("a").unwrap();
        let b = graph.find("b").unwrap();
        assert_eq!(graph.node(a).out_edges, vec![e1, e2]);
        assert_eq!(graph.node(b).in_edges, vec![e1, e3]);
    }

    #[test]
    fn add_edge_rejects_unknown_endpoint() {
        let mut graph = SankeyGraph::new();
        let a = graph.add_node("a");
        let err = graph.add_edge(a, NodeId(7), 1.0).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode { id: NodeId(7) });
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nan_weight_counts_as_zero() {
        let mut graph = SankeyGraph::new();
        let e = graph.connect("a", "b", f32::NAN);
        assert_eq!(graph.edge(e).effective_weight(), 0.0);
    }

    #[test]
    fn rects_and_ribbons_follow_orientation() {
        let mut graph = SankeyGraph::new();
        let e = graph.connect("a", "b", 1.0);
        let (nodes, edges) = graph.parts_mut();
        nodes[0].layout = NodeLayout {
            primary: 0.0,
            primary_size: 10.0,
            secondary: 5.0,
            secondary_size: 40.0,
            ..NodeLayout::default()
        };
        nodes[1].layout = NodeLayout {
            primary: 100.0,
            primary_size: 10.0,
            secondary: 20.0,
            secondary_size: 40.0,
            ..NodeLayout::default()
        };
        edges[0].layout = EdgeLayout {
            thickness: 12.0,
            source_offset: 3.0,
            target_offset: 4.0,
        };

        let rect = graph.node_rect(NodeId(0), Orient::Vertical);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (5.0, 0.0, 40.0, 10.0));

        let horizontal = graph.ribbon(e, Orient::Horizontal);
        assert_eq!(horizontal.start, (10.0, 8.0));
        assert_eq!(horizontal.end, (100.0, 24.0));
        assert_eq!(horizontal.thickness, 12.0);

        let vertical = graph.ribbon(e, Orient::Vertical);
        assert_eq!(vertical.start, (8.0, 10.0));
        assert_eq!(vertical.end, (24.0, 100.0));
    }

    #[test]
    fn deserialized_graph_finds_nodes_by_name() {
        let mut graph = SankeyGraph::new();
        graph.connect("x", "y", 1.0);
        let json = serde_json::to_string(&graph).unwrap();
        let mut restored: SankeyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.find("y"), Some(NodeId(1)));
        assert_eq!(restored.add_node("x"), NodeId(0));
        assert_eq!(restored.node_count(), 2);
        restored.connect("y", "z", 2.0);
        assert_eq!(restored.node(NodeId(1)).out_edges, vec![EdgeId(1)]);
    }
}
