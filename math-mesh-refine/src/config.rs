//! JSON configuration for mesh refinement

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{RefineError, Result};

/// Large-triangle slicing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceConfig {
    /// Triangles with a longer edge are subdivided
    #[serde(default = "default_max_edge_length")]
    pub max_edge_length: f64,
    /// Maximum subdivision depth per input triangle
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    /// Place new vertices on Bezier edge curves instead of edge midpoints
    #[serde(default)]
    pub smooth: bool,
}

fn default_max_edge_length() -> f64 {
    1.0
}

fn default_max_passes() -> usize {
    3
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            max_edge_length: default_max_edge_length(),
            max_passes: default_max_passes(),
            smooth: false,
        }
    }
}

/// Sliver removal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinTriangleConfig {
    /// Longest edge over the sum of the other two above which a triangle
    /// counts as a sliver
    #[serde(default = "default_ratio")]
    pub ratio: f64,
    /// Upper bound on removal attempts
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_ratio() -> f64 {
    0.9
}

fn default_max_iterations() -> usize {
    10_000
}

impl Default for ThinTriangleConfig {
    fn default() -> Self {
        Self {
            ratio: default_ratio(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Complete refinement configuration loaded from JSON
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RefineConfig {
    #[serde(default)]
    pub slice: SliceConfig,
    #[serde(default)]
    pub thin: ThinTriangleConfig,
    /// Run sliver removal after slicing
    #[serde(default)]
    pub remove_thin: bool,
}

impl RefineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RefineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<()> {
        let len = self.slice.max_edge_length;
        if !(len.is_finite() && len > 0.0) {
            return Err(RefineError::InvalidConfig(format!(
                "max_edge_length must be positive, got {}",
                len
            )));
        }
        let ratio = self.thin.ratio;
        if !(ratio.is_finite() && ratio > 0.0 && ratio <= 1.0) {
            return Err(RefineError::InvalidConfig(format!(
                "thin ratio must be in (0, 1], got {}",
                ratio
            )));
        }
        Ok(())
    }
}
