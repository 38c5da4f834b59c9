#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod layout_dump;
pub mod parser;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, Extent, Orient, SankeyConfig, load_config, merge_init_config};
pub use error::{GraphError, LayoutError};
pub use graph::{
    EdgeId, EdgeLayout, NodeId, NodeLayout, Rect, Ribbon, SankeyEdge, SankeyGraph, SankeyNode,
};
pub use layout::{Anneal, SankeyLayout, compute_layout};
pub use layout_dump::LayoutDump;
pub use parser::{ParseOutput, parse_graph_json, parse_input, parse_sankey};
