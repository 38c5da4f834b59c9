use crate::graph::{EdgeId, NodeId, SankeyEdge, SankeyNode};

/// Geometric damping schedule for depth relaxation.
///
/// Yields `0.99^k` on the k-th call, starting at k = 1. It never ends;
/// callers `take` as many iterations as they want.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anneal {
    alpha: f32,
}

impl Anneal {
    pub const DECAY: f32 = 0.99;

    pub fn new() -> Self {
        Self { alpha: 1.0 }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl Default for Anneal {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Anneal {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.alpha *= Self::DECAY;
        Some(self.alpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Sweep {
    /// Last column first; nodes move toward their successors.
    RightToLeft,
    /// First column first; nodes move toward their predecessors.
    LeftToRight,
}

/// One Gauss-Seidel sweep over the columns.
///
/// Nodes are visited column by column in sweep order and in column order
/// within a column, and every move is written back immediately, so later
/// nodes in the same sweep see the updated neighbours.
pub(super) fn relax(
    columns: &[Vec<NodeId>],
    nodes: &mut [SankeyNode],
    edges: &[SankeyEdge],
    alpha: f32,
    sweep: Sweep,
) {
    let mut visit = |column: &Vec<NodeId>| {
        for &id in column {
            let node = &nodes[id.index()];
            let target = match sweep {
                Sweep::RightToLeft => weighted_center(&node.out_edges, nodes, edges, |e| e.target),
                Sweep::LeftToRight => weighted_center(&node.in_edges, nodes, edges, |e| e.source),
            };
            let Some(target) = target else {
                continue;
            };
            let layout = &mut nodes[id.index()].layout;
            layout.secondary += (target - layout.center()) * alpha;
        }
    };
    match sweep {
        Sweep::RightToLeft => columns.iter().rev().for_each(&mut visit),
        Sweep::LeftToRight => columns.iter().for_each(&mut visit),
    }
}

/// Weight-averaged center of the nodes at the far end of `edge_ids`.
///
/// `None` when there are no edges, their weights sum to zero, or the
/// average is not finite.
fn weighted_center(
    edge_ids: &[EdgeId],
    nodes: &[SankeyNode],
    edges: &[SankeyEdge],
    endpoint: impl Fn(&SankeyEdge) -> NodeId,
) -> Option<f32> {
    let mut weighted = 0.0f32;
    let mut total = 0.0f32;
    for id in edge_ids {
        let edge = &edges[id.index()];
        let weight = edge.effective_weight();
        let term = nodes[endpoint(edge).index()].layout.center() * weight;
        if !term.is_nan() {
            weighted += term;
        }
        total += weight;
    }
    if total == 0.0 {
        return None;
    }
    let center = weighted / total;
    center.is_finite().then_some(center)
}
