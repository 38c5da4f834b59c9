use sankey_layout::{
    Config, LayoutDump, Orient, compute_layout, merge_init_config, parse_input,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyLayoutOptions {
    width: Option<f32>,
    height: Option<f32>,
    orient: Option<String>,
    node_width: Option<f32>,
    node_gap: Option<f32>,
    layout_iterations: Option<usize>,
}

fn build_config(options: SankeyLayoutOptions, init: Option<&serde_json::Value>) -> Config {
    let mut config = Config::default();
    if let Some(init) = init {
        config = merge_init_config(config, init);
    }

    if let Some(width) = options.width {
        config.extent.width = width;
    }
    if let Some(height) = options.height {
        config.extent.height = height;
    }
    if let Some(orient) = options.orient.as_deref().and_then(Orient::from_token) {
        config.sankey.orientation = orient;
    }
    if let Some(node_width) = options.node_width {
        config.sankey.node_thickness = node_width;
    }
    if let Some(node_gap) = options.node_gap {
        config.sankey.node_gap = node_gap;
    }
    if let Some(iterations) = options.layout_iterations {
        config.sankey.iterations = iterations;
    }
    config
}

fn layout_to_json(input: &str, options: SankeyLayoutOptions) -> Result<String, String> {
    let mut parsed = parse_input(input).map_err(|error| error.to_string())?;
    let config = build_config(options, parsed.init_config.as_ref());
    let layout = compute_layout(&mut parsed.graph, config.extent, &config.sankey)
        .map_err(|error| error.to_string())?;
    LayoutDump::from_graph(&parsed.graph, &layout)
        .to_json()
        .map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_sankey_json(input: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SankeyLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SankeyLayoutOptions::default()
    };

    layout_to_json(input, options).map_err(|error| JsValue::from_str(&error))
}
