use std::cmp::Ordering;

use crate::graph::{NodeId, SankeyNode};

/// Relative slack allowed before a column counts as overflowing. The shared
/// value scale makes the most crowded column fit exactly, and summing its
/// sizes in f32 can land a rounding step past the extent.
const OVERFLOW_TOLERANCE: f32 = 1e-5;

/// Pushes apart overlapping nodes in every column.
///
/// Each column is re-sorted by depth, swept forward so that every node
/// starts at least `node_gap` after its predecessor, and, if the last node
/// then spills past `secondary_extent`, swept backward from the boundary.
/// A column whose nodes and gaps cannot fit stays overflowed. Returns how
/// many columns that is.
pub(super) fn resolve_collisions(
    columns: &mut [Vec<NodeId>],
    nodes: &mut [SankeyNode],
    node_gap: f32,
    secondary_extent: f32,
) -> usize {
    let mut overflowing = 0;
    for column in columns.iter_mut() {
        column.sort_by(|a, b| {
            let a = nodes[a.index()].layout.secondary;
            let b = nodes[b.index()].layout.secondary;
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });
        resolve_column(column, nodes, node_gap, secondary_extent);

        let demand: f32 = column
            .iter()
            .map(|id| nodes[id.index()].layout.secondary_size)
            .sum::<f32>()
            + column.len().saturating_sub(1) as f32 * node_gap;
        if overflows(demand, secondary_extent) {
            overflowing += 1;
        }
    }
    overflowing
}

fn overflows(demand: f32, extent: f32) -> bool {
    demand - extent > extent.abs().max(1.0) * OVERFLOW_TOLERANCE
}

fn resolve_column(column: &[NodeId], nodes: &mut [SankeyNode], node_gap: f32, extent: f32) {
    let Some(&last) = column.last() else {
        return;
    };

    let mut floor = 0.0f32;
    for id in column {
        let layout = &mut nodes[id.index()].layout;
        let dy = floor - layout.secondary;
        if dy > 0.0 {
            layout.secondary += dy;
        }
        floor = layout.secondary_end() + node_gap;
    }

    let dy = floor - node_gap - extent;
    if dy <= 0.0 {
        return;
    }
    let layout = &mut nodes[last.index()].layout;
    layout.secondary -= dy;
    let mut ceiling = layout.secondary;
    for id in column.iter().rev().skip(1) {
        let layout = &mut nodes[id.index()].layout;
        let dy = layout.secondary_end() + node_gap - ceiling;
        if dy > 0.0 {
            layout.secondary -= dy;
        }
        ceiling = layout.secondary;
    }
}
