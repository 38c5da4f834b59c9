use crate::graph::SankeyGraph;
use crate::layout::SankeyLayout;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub orientation: String,
    pub width: f32,
    pub height: f32,
    pub level_count: usize,
    pub breadth_scale: f32,
    pub value_scale: f32,
    pub iterations: usize,
    pub unleveled: usize,
    pub overflowing_columns: usize,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub name: String,
    pub value: f32,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub weight: f32,
    pub thickness: f32,
    pub source_offset: f32,
    pub target_offset: f32,
    pub start: [f32; 2],
    pub end: [f32; 2],
}

impl LayoutDump {
    pub fn from_graph(graph: &SankeyGraph, layout: &SankeyLayout) -> Self {
        let orient = layout.orientation;
        let nodes = graph
            .node_ids()
            .map(|id| {
                let node = graph.node(id);
                let rect = graph.node_rect(id, orient);
                NodeDump {
                    name: node.name.clone(),
                    value: node.layout.value,
                    level: node.layout.level,
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                }
            })
            .collect();

        let edges = graph
            .edge_ids()
            .map(|id| {
                let edge = graph.edge(id);
                let ribbon = graph.ribbon(id, orient);
                EdgeDump {
                    source: graph.node(edge.source).name.clone(),
                    target: graph.node(edge.target).name.clone(),
                    weight: edge.weight,
                    thickness: ribbon.thickness,
                    source_offset: edge.layout.source_offset,
                    target_offset: edge.layout.target_offset,
                    start: [ribbon.start.0, ribbon.start.1],
                    end: [ribbon.end.0, ribbon.end.1],
                }
            })
            .collect();

        LayoutDump {
            orientation: format!("{:?}", orient),
            width: layout.extent.width,
            height: layout.extent.height,
            level_count: layout.level_count,
            breadth_scale: layout.breadth_scale,
            value_scale: layout.value_scale,
            iterations: layout.iterations,
            unleveled: layout.unleveled,
            overflowing_columns: layout.overflowing_columns,
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes pretty JSON to `path`, or to stdout when `path` is `None`.
    pub fn write(&self, path: Option<&Path>) -> anyhow::Result<()> {
        match path {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer_pretty(&mut writer, self)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                serde_json::to_writer_pretty(&mut handle, self)?;
                handle.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Extent, SankeyConfig};
    use crate::layout::compute_layout;

    #[test]
    fn dump_carries_names_and_geometry() {
        let mut graph = SankeyGraph::new();
        graph.connect("in", "out", 4.0);
        let layout =
            compute_layout(&mut graph, Extent::new(200.0, 100.0), &SankeyConfig::default())
                .unwrap();
        let dump = LayoutDump::from_graph(&graph, &layout);
        assert_eq!(dump.orientation, "Horizontal");
        assert_eq!(dump.nodes.len(), 2);
        assert_eq!(dump.nodes[1].name, "out");
        assert_eq!(dump.nodes[1].x, 180.0);
        assert_eq!(dump.edges[0].start[0], 20.0);
        assert_eq!(dump.edges[0].end[0], 180.0);
        assert!((dump.edges[0].thickness - 100.0).abs() < 1e-4);

        let json = dump.to_json().unwrap();
        assert!(json.contains("\"source\": \"in\""));
    }
}
