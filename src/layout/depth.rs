use std::collections::HashMap;

use crate::graph::{NodeId, SankeyEdge, SankeyNode};

/// Buckets nodes that share a primary coordinate, nodes kept in insertion
/// order within each column.
///
/// Columns are ordered by level rather than by coordinate, so a negative
/// breadth scale (node thickness wider than the extent) still yields the
/// first level first.
pub(super) fn group_by_breadth(nodes: &[SankeyNode]) -> Vec<Vec<NodeId>> {
    let mut levels: Vec<usize> = Vec::new();
    let mut buckets: Vec<Vec<NodeId>> = Vec::new();
    let mut slot_by_key: HashMap<u32, usize> = HashMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        let key = node.layout.primary;
        let slot = *slot_by_key.entry(key.to_bits()).or_insert_with(|| {
            levels.push(node.layout.level);
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(NodeId(idx));
    }

    let mut order: Vec<usize> = (0..levels.len()).collect();
    order.sort_by_key(|slot| levels[*slot]);
    order
        .into_iter()
        .map(|slot| std::mem::take(&mut buckets[slot]))
        .collect()
}

/// Sizes every node and edge with one shared value-to-length ratio and seeds
/// each node's depth with its ordinal in the column.
///
/// The ratio comes from the most crowded column so that ribbon thickness is
/// comparable across the whole diagram. Returns that ratio.
pub(super) fn initialize_node_depths(
    columns: &[Vec<NodeId>],
    nodes: &mut [SankeyNode],
    edges: &mut [SankeyEdge],
    secondary_extent: f32,
    node_gap: f32,
) -> f32 {
    let value_scale = columns
        .iter()
        .map(|column| {
            let total: f32 = column
                .iter()
                .map(|id| nodes[id.index()].layout.value)
                .sum();
            let free = secondary_extent - (column.len() as f32 - 1.0) * node_gap;
            free / total
        })
        .fold(f32::INFINITY, f32::min);
    // All-zero columns give an infinite ratio, gap-only columns a negative one.
    let value_scale = if value_scale.is_finite() {
        value_scale.max(0.0)
    } else {
        0.0
    };

    for column in columns {
        for (ordinal, id) in column.iter().enumerate() {
            let layout = &mut nodes[id.index()].layout;
            layout.secondary = ordinal as f32;
            layout.secondary_size = scaled(layout.value, value_scale);
        }
    }
    for edge in edges.iter_mut() {
        edge.layout.thickness = scaled(edge.effective_weight(), value_scale);
    }
    value_scale
}

/// Flow that overflowed f32 carries no length.
fn scaled(amount: f32, value_scale: f32) -> f32 {
    if amount.is_finite() {
        amount * value_scale
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SankeyGraph;
    use crate::layout::breadth::compute_node_breadths;
    use crate::layout::value::compute_node_values;

    fn prepare(graph: &mut SankeyGraph) -> Vec<Vec<NodeId>> {
        prepare_with(graph, 10.0, 200.0)
    }

    fn prepare_with(graph: &mut SankeyGraph, thickness: f32, extent: f32) -> Vec<Vec<NodeId>> {
        let (nodes, edges) = graph.parts_mut();
        compute_node_values(nodes, edges);
        compute_node_breadths(nodes, edges, thickness, extent);
        group_by_breadth(nodes)
    }

    fn column_names<'a>(graph: &'a SankeyGraph, columns: &[Vec<NodeId>]) -> Vec<Vec<&'a str>> {
        columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|id| graph.node(*id).name.as_str())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn columns_follow_breadth_and_insertion_order() {
        let mut graph = SankeyGraph::new();
        graph.connect("b", "sink", 1.0);
        graph.connect("a", "mid", 1.0);
        graph.connect("mid", "sink", 1.0);
        let columns = prepare(&mut graph);
        assert_eq!(
            column_names(&graph, &columns),
            vec![vec!["b", "a"], vec!["mid"], vec!["sink"]]
        );
    }

    #[test]
    fn columns_stay_in_level_order_when_bars_exceed_the_extent() {
        let mut graph = SankeyGraph::new();
        graph.connect("A", "B", 1.0);
        graph.connect("B", "C", 1.0);
        let columns = prepare_with(&mut graph, 20.0, 10.0);
        assert!(graph.node(graph.find("C").unwrap()).layout.primary < 0.0);
        assert_eq!(
            column_names(&graph, &columns),
            vec![vec!["A"], vec!["B"], vec!["C"]]
        );
    }

    #[test]
    fn crowded_column_sets_the_shared_scale() {
        let mut graph = SankeyGraph::new();
        graph.connect("a", "x", 30.0);
        graph.connect("b", "x", 10.0);
        graph.connect("c", "x", 20.0);
        let columns = prepare(&mut graph);
        let (nodes, edges) = graph.parts_mut();
        let ky = initialize_node_depths(&columns, nodes, edges, 100.0, 5.0);
        // Sources: (100 - 2*5) / 60 = 1.5; sink: 100 / 60.
        assert!((ky - 1.5).abs() < 1e-6);

        let a = &graph.node(graph.find("a").unwrap()).layout;
        let c = &graph.node(graph.find("c").unwrap()).layout;
        assert_eq!(a.secondary, 0.0);
        assert_eq!(c.secondary, 2.0);
        assert!((a.secondary_size - 45.0).abs() < 1e-4);
        assert!((graph.edges()[1].layout.thickness - 15.0).abs() < 1e-4);
    }

    #[test]
    fn overflowing_flow_gets_zero_size_instead_of_nan() {
        let mut graph = SankeyGraph::new();
        graph.connect("a", "sink", 3e38);
        graph.connect("b", "sink", 3e38);
        let columns = prepare(&mut graph);
        let (nodes, edges) = graph.parts_mut();
        let ky = initialize_node_depths(&columns, nodes, edges, 100.0, 5.0);
        assert_eq!(ky, 0.0);
        assert!(graph.node(graph.find("sink").unwrap()).layout.value.is_infinite());
        for node in graph.nodes() {
            assert_eq!(node.layout.secondary_size, 0.0, "{}", node.name);
        }
        assert!(graph.edges().iter().all(|e| e.layout.thickness == 0.0));
    }

    #[test]
    fn zero_valued_graph_gets_zero_scale() {
        let mut graph = SankeyGraph::new();
        graph.add_node("a");
        graph.add_node("b");
        let columns = prepare(&mut graph);
        let (nodes, edges) = graph.parts_mut();
        let ky = initialize_node_depths(&columns, nodes, edges, 100.0, 5.0);
        assert_eq!(ky, 0.0);
        assert!(graph.nodes().iter().all(|n| n.layout.secondary_size == 0.0));
    }
}
