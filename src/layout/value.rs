use crate::graph::{EdgeId, SankeyEdge, SankeyNode};

/// Writes each node's flow value: the larger of its inflow and outflow.
pub(super) fn compute_node_values(nodes: &mut [SankeyNode], edges: &[SankeyEdge]) {
    for node in nodes.iter_mut() {
        let outflow = sum_weights(&node.out_edges, edges);
        let inflow = sum_weights(&node.in_edges, edges);
        node.layout.value = outflow.max(inflow);
    }
}

fn sum_weights(ids: &[EdgeId], edges: &[SankeyEdge]) -> f32 {
    ids.iter()
        .map(|id| edges[id.index()].effective_weight())
        .sum()
}
