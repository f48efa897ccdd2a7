//! Catalog loading configuration

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted `max_frame_depth`
pub const MAX_FRAME_DEPTH_LIMIT: u32 = 256;

/// When frame nesting is checked relative to installing a timeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameCheckOrder {
    /// Check the candidate timeline; nothing circular is ever installed
    #[default]
    ValidateFirst,
    /// For Modify, install first and report afterwards
    InstallThenCheck,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Frame nesting deeper than this is treated as circular
    pub max_frame_depth: u32,
    pub frame_check: FrameCheckOrder,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_frame_depth: 50,
            frame_check: FrameCheckOrder::ValidateFirst,
        }
    }
}

impl CatalogConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CatalogConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_frame_depth <= MAX_FRAME_DEPTH_LIMIT,
            "max_frame_depth {} exceeds the limit of {}",
            self.max_frame_depth,
            MAX_FRAME_DEPTH_LIMIT
        );
        Ok(())
    }
}
