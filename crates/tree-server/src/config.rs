//! Configuration loading and management

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tree_core::{Gradient, LeafType};

/// Main configuration for the tree server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of rows returned by the list endpoint
    #[serde(default = "default_list_cap")]
    pub list_cap: usize,

    /// Window for the "recent leaves" aggregate, in hours
    #[serde(default = "default_recent_window_hours")]
    pub recent_window_hours: i64,

    /// Column defaults applied when an insert omits styling fields
    #[serde(default)]
    pub leaf_defaults: LeafDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafDefaults {
    #[serde(default = "default_x")]
    pub x: i32,

    #[serde(default = "default_y")]
    pub y: i32,

    #[serde(rename = "type", default = "default_leaf_type")]
    pub leaf_type: LeafType,

    #[serde(default = "default_gradient")]
    pub gradient: Gradient,
}

impl Default for LeafDefaults {
    fn default() -> Self {
        Self {
            x: default_x(),
            y: default_y(),
            leaf_type: default_leaf_type(),
            gradient: default_gradient(),
        }
    }
}

fn default_list_cap() -> usize {
    tree_core::LIST_CAP
}

fn default_recent_window_hours() -> i64 {
    24
}

fn default_x() -> i32 {
    200
}

fn default_y() -> i32 {
    150
}

fn default_leaf_type() -> LeafType {
    LeafType::Heart
}

fn default_gradient() -> Gradient {
    Gradient::Gradient1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_cap: default_list_cap(),
            recent_window_hours: default_recent_window_hours(),
            leaf_defaults: LeafDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from the data directory
    pub fn load(data_path: &str) -> Result<Self> {
        let config_file = Path::new(data_path).join("config.json");

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)
                .with_context(|| format!("Failed to read config file: {:?}", config_file))?;
            let config: Config =
                serde_json::from_str(&content).with_context(|| "Failed to parse config.json")?;
            tracing::info!("Loaded configuration from {:?}", config_file);
            Ok(config)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_file);
            let config = Config::default();

            // Create data directory if it doesn't exist
            std::fs::create_dir_all(data_path)
                .with_context(|| format!("Failed to create data directory: {}", data_path))?;

            // Write default config for reference
            let content = serde_json::to_string_pretty(&config)?;
            std::fs::write(&config_file, content)
                .with_context(|| format!("Failed to write default config: {:?}", config_file))?;
            tracing::info!("Created default config at {:?}", config_file);

            Ok(config)
        }
    }
}
