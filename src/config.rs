//! Build configuration for the geometry store and BVH.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::util::{Error, Result};

/// Default positional tolerance for vertex welding (per axis, absolute).
pub const DEFAULT_DEDUP_TOLERANCE: f32 = 0.1;

/// Settings shared by [`Mesh`](crate::geom::Mesh) and [`Bvh`](crate::bvh::Bvh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    /// Two vertices closer than this on every axis are merged.
    pub dedup_tolerance: f32,
    /// Run the local rotation optimizer during refit.
    pub rotations: bool,
    /// Check every structural invariant after each insertion (slow).
    pub validate_each_insert: bool,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
            rotations: true,
            validate_each_insert: false,
        }
    }
}

impl BvhConfig {
    /// Parse from a JSON string; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the builders cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.dedup_tolerance.is_nan() || self.dedup_tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "dedup_tolerance must be a non-negative number, got {}",
                self.dedup_tolerance
            )));
        }
        Ok(())
    }

    /// Copy with any rejected value replaced by its default.
    ///
    /// Builders constructed from an in-code config go through this, so a bad
    /// tolerance falls back to the default instead of switching welding off.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        if config.validate().is_err() {
            tracing::warn!(
                tolerance = config.dedup_tolerance,
                fallback = DEFAULT_DEDUP_TOLERANCE,
                "invalid dedup_tolerance, using default"
            );
            config.dedup_tolerance = DEFAULT_DEDUP_TOLERANCE;
        }
        config
    }
}
