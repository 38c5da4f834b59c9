//! Sankey layout pipeline.
//!
//! [`compute_layout`] runs, in order: node values, breadth leveling, depth
//! initialization, collision removal, `iterations` rounds of depth
//! relaxation (each followed by collision removal), and ribbon stacking.
//! Every step writes into the graph's layout records and only reads fields
//! written earlier in the same run.

mod breadth;
mod collision;
mod depth;
mod relax;
mod ribbon;
mod value;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace};

use breadth::compute_node_breadths;
use collision::resolve_collisions;
use depth::{group_by_breadth, initialize_node_depths};
use relax::{Sweep, relax};
use ribbon::compute_edge_depths;
use value::compute_node_values;

pub use relax::Anneal;

use crate::config::{Extent, Orient, SankeyConfig};
use crate::error::Result;
use crate::graph::{NodeId, SankeyGraph};

/// Summary of one layout run. Per-node and per-edge results live on the
/// graph itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLayout {
    pub orientation: Orient,
    pub extent: Extent,
    pub level_count: usize,
    /// Distance between consecutive levels along the breadth axis.
    pub breadth_scale: f32,
    /// Length of one unit of flow along the depth axis.
    pub value_scale: f32,
    /// Relaxation rounds actually run.
    pub iterations: usize,
    /// Nodes that sat on a cycle and were forced to the first level.
    pub unleveled: usize,
    /// Columns that could not fit their nodes after the final pass.
    pub overflowing_columns: usize,
    /// Node ids per level, first level first, in final depth order.
    pub columns: Vec<Vec<NodeId>>,
}

pub fn compute_layout(
    graph: &mut SankeyGraph,
    extent: Extent,
    config: &SankeyConfig,
) -> Result<SankeyLayout> {
    config.validate()?;
    extent.validate()?;

    let span = debug_span!(
        "sankey_layout",
        nodes = graph.node_count(),
        edges = graph.edge_count()
    );
    let _guard = span.enter();

    let orientation = config.orientation;
    let node_gap = config.node_gap;
    let (primary_extent, secondary_extent) = extent.axes(orientation);
    let (nodes, edges) = graph.parts_mut();

    compute_node_values(nodes, edges);
    let iterations = if nodes.iter().any(|node| node.layout.value == 0.0) {
        if config.iterations > 0 {
            debug!("zero-valued node present; skipping depth relaxation");
        }
        0
    } else {
        config.iterations
    };

    let breadth = compute_node_breadths(nodes, edges, config.node_thickness, primary_extent);
    let mut columns = group_by_breadth(nodes);
    let value_scale = initialize_node_depths(&columns, nodes, edges, secondary_extent, node_gap);
    debug!(
        levels = breadth.level_count,
        breadth_scale = breadth.scale,
        value_scale,
        iterations,
        "sankey depths initialized"
    );

    let mut overflowing = resolve_collisions(&mut columns, nodes, node_gap, secondary_extent);
    for (round, alpha) in Anneal::new().take(iterations).enumerate() {
        relax(&columns, nodes, edges, alpha, Sweep::RightToLeft);
        resolve_collisions(&mut columns, nodes, node_gap, secondary_extent);
        relax(&columns, nodes, edges, alpha, Sweep::LeftToRight);
        overflowing = resolve_collisions(&mut columns, nodes, node_gap, secondary_extent);
        trace!(round = round + 1, alpha, "sankey relaxation round");
    }

    compute_edge_depths(nodes, edges);

    Ok(SankeyLayout {
        orientation,
        extent,
        level_count: breadth.level_count,
        breadth_scale: breadth.scale,
        value_scale,
        iterations,
        unleveled: breadth.unleveled,
        overflowing_columns: overflowing,
        columns,
    })
}
