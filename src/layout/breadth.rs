use tracing::warn;

use crate::graph::{NodeId, SankeyEdge, SankeyNode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Breadth {
    pub level_count: usize,
    pub scale: f32,
    /// Nodes left on a cycle and forced to level 0.
    pub unleveled: usize,
}

/// Levels nodes with Kahn's algorithm and spreads the levels across
/// `primary_extent`.
///
/// Each frontier of zero in-degree nodes is one level. Sinks are then moved
/// to the last level so terminal flows line up on the far edge.
pub(super) fn compute_node_breadths(
    nodes: &mut [SankeyNode],
    edges: &[SankeyEdge],
    node_thickness: f32,
    primary_extent: f32,
) -> Breadth {
    let mut indegree: Vec<usize> = nodes.iter().map(|node| node.in_edges.len()).collect();
    let mut levels: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut frontier: Vec<NodeId> = indegree
        .iter()
        .enumerate()
        .filter_map(|(idx, deg)| (*deg == 0).then_some(NodeId(idx)))
        .collect();

    let mut level = 0usize;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &node_id in &frontier {
            levels[node_id.index()] = Some(level);
            for &edge_id in &nodes[node_id.index()].out_edges {
                let target = edges[edge_id.index()].target;
                let remaining = &mut indegree[target.index()];
                if *remaining > 0 {
                    *remaining -= 1;
                    if *remaining == 0 {
                        next.push(target);
                    }
                }
            }
        }
        level += 1;
        frontier = next;
    }

    let level_count = if nodes.is_empty() { 0 } else { level.max(1) };
    let unleveled = levels.iter().filter(|level| level.is_none()).count();
    if unleveled > 0 {
        warn!(
            unleveled,
            "sankey graph contains a cycle; placing unresolved nodes on the first level"
        );
    }

    let scale = if level_count > 1 {
        (primary_extent - node_thickness) / (level_count - 1) as f32
    } else {
        0.0
    };

    for (node, level) in nodes.iter_mut().zip(levels) {
        let level = if node.out_edges.is_empty() {
            level_count - 1
        } else {
            level.unwrap_or(0)
        };
        node.layout.level = level;
        node.layout.primary = level as f32 * scale;
        node.layout.primary_size = node_thickness;
    }

    Breadth {
        level_count,
        scale,
        unleveled,
    }
}
