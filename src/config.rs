use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LayoutError;

/// Which screen axis the flow runs along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orient {
    /// Levels spread along x, stacking along y.
    #[default]
    Horizontal,
    /// Levels spread along y, stacking along x.
    Vertical,
}

impl Orient {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "lr" => Some(Self::Horizontal),
            "vertical" | "td" | "tb" => Some(Self::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SankeyConfig {
    /// Thickness of every node bar along the breadth axis.
    #[serde(alias = "nodeWidth")]
    pub node_thickness: f32,
    /// Minimum gap between neighbouring nodes of one level.
    pub node_gap: f32,
    #[serde(alias = "layoutIterations")]
    pub iterations: usize,
    #[serde(alias = "orient")]
    pub orientation: Orient,
}

impl Default for SankeyConfig {
    fn default() -> Self {
        Self {
            node_thickness: 20.0,
            node_gap: 8.0,
            iterations: 32,
            orientation: Orient::Horizontal,
        }
    }
}

impl SankeyConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        check_dimension("node_thickness", self.node_thickness)?;
        check_dimension("node_gap", self.node_gap)
    }
}

/// Size of the area the diagram is laid out into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Splits the extent into (primary, secondary) lengths for `orient`.
    pub fn axes(&self, orient: Orient) -> (f32, f32) {
        match orient {
            Orient::Horizontal => (self.width, self.height),
            Orient::Vertical => (self.height, self.width),
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)
    }
}

fn check_dimension(field: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig { field, value })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sankey: SankeyConfig,
    pub extent: Extent,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}

/// Applies an inline `%%{init: ...}%%` directive on top of `config`.
///
/// Only keys present in the directive override; unknown keys are ignored.
pub fn merge_init_config(mut config: Config, init: &serde_json::Value) -> Config {
    if let Some(sankey) = init.get("sankey") {
        let settings = &mut config.sankey;
        if let Some(val) = number_of(sankey, &["nodeThickness", "nodeWidth"]) {
            settings.node_thickness = val;
        }
        if let Some(val) = number_of(sankey, &["nodeGap"]) {
            settings.node_gap = val;
        }
        if let Some(val) = ["iterations", "layoutIterations"]
            .iter()
            .find_map(|key| sankey.get(*key).and_then(|v| v.as_u64()))
        {
            settings.iterations = val as usize;
        }
        if let Some(val) = ["orientation", "orient"]
            .iter()
            .find_map(|key| sankey.get(*key).and_then(|v| v.as_str()))
            .and_then(Orient::from_token)
        {
            settings.orientation = val;
        }
        if let Some(val) = number_of(sankey, &["width"]) {
            config.extent.width = val;
        }
        if let Some(val) = number_of(sankey, &["height"]) {
            config.extent.height = val;
        }
    }
    config
}

fn number_of(value: &serde_json::Value, keys: &[&str]) -> Option<f32> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_f64()))
        .map(|v| v as f32)
}
