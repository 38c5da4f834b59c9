use std::cmp::Ordering;

use crate::graph::{EdgeId, NodeId, SankeyEdge, SankeyNode};

/// Orders each node's ribbons by the depth of the node at their other end
/// and stacks them from offset 0.
///
/// The order is recorded in the node's layout; the graph's own edge lists
/// keep their insertion order.
pub(super) fn compute_edge_depths(nodes: &mut [SankeyNode], edges: &mut [SankeyEdge]) {
    for idx in 0..nodes.len() {
        let out_order = sorted_by_depth(&nodes[idx].out_edges, nodes, edges, |e| e.target);
        let in_order = sorted_by_depth(&nodes[idx].in_edges, nodes, edges, |e| e.source);
        let layout = &mut nodes[idx].layout;
        layout.out_order = out_order;
        layout.in_order = in_order;
    }

    for node in nodes.iter() {
        let mut offset = 0.0f32;
        for id in &node.layout.out_order {
            let edge = &mut edges[id.index()].layout;
            edge.source_offset = offset;
            offset += edge.thickness;
        }
        let mut offset = 0.0f32;
        for id in &node.layout.in_order {
            let edge = &mut edges[id.index()].layout;
            edge.target_offset = offset;
            offset += edge.thickness;
        }
    }
}

fn sorted_by_depth(
    edge_ids: &[EdgeId],
    nodes: &[SankeyNode],
    edges: &[SankeyEdge],
    endpoint: impl Fn(&SankeyEdge) -> NodeId,
) -> Vec<EdgeId> {
    let depth = |id: &EdgeId| nodes[endpoint(&edges[id.index()]).index()].layout.secondary;
    let mut order = edge_ids.to_vec();
    order.sort_by(|a, b| depth(a).partial_cmp(&depth(b)).unwrap_or(Ordering::Equal));
    order
}
