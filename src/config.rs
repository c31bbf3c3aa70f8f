use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },
}

/// Sizes and spacing handed to the layered layout engine. The direction is
/// always top-to-bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub rank_spacing: f32,
    pub node_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 300.0,
            node_height: 200.0,
            rank_spacing: 80.0,
            node_spacing: 50.0,
            margin_x: 8.0,
            margin_y: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFrameConfig {
    pub padding: f32,
    pub header_height: f32,
}

impl Default for GroupFrameConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            header_height: 40.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub groups: GroupFrameConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfigFile {
    pub node_width: Option<f32>,
    pub node_height: Option<f32>,
    pub rank_spacing: Option<f32>,
    pub node_spacing: Option<f32>,
    pub margin_x: Option<f32>,
    pub margin_y: Option<f32>,
}

impl LayoutConfigFile {
    pub fn apply(self, config: &mut LayoutConfig) {
        if let Some(v) = self.node_width {
            config.node_width = v;
        }
        if let Some(v) = self.node_height {
            config.node_height = v;
        }
        if let Some(v) = self.rank_spacing {
            config.rank_spacing = v;
        }
        if let Some(v) = self.node_spacing {
            config.node_spacing = v;
        }
        if let Some(v) = self.margin_x {
            config.margin_x = v;
        }
        if let Some(v) = self.margin_y {
            config.margin_y = v;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GroupFrameConfigFile {
    padding: Option<f32>,
    header_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    groups: Option<GroupFrameConfigFile>,
}

/// Parses a camelCase JSON/JSON5 document; absent fields keep their defaults.
pub fn parse_config(contents: &str) -> Result<Config, json5::Error> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(layout) = parsed.layout {
        layout.apply(&mut config.layout);
    }
    if let Some(groups) = parsed.groups {
        if let Some(v) = groups.padding {
            config.groups.padding = v;
        }
        if let Some(v) = groups.header_height {
            config.groups.header_height = v;
        }
    }
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
