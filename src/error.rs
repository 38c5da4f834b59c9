use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("edge endpoint refers to a node that is not in the graph: {id}")]
    UnknownNode { id: NodeId },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout setting `{field}`: {value} (expected a finite, non-negative number)")]
    InvalidConfig { field: &'static str, value: f32 },
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
