// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Slice configuration system
//!
//! Settings are layered: built-in defaults, then `polycut.toml` (or an
//! explicit file), then `POLYCUT_*` environment variables. Command-line
//! flags are applied on top by the binary.

use crate::geometry::{Axis, NgonPolicy, PlaneSlicer, WELD_TOLERANCE};
use crate::io::ExportFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "polycut.toml";

/// Slice configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Axis the cutting plane is perpendicular to
    pub axis: Axis,
    /// Everything below this coordinate is removed
    pub height: f64,
    /// Per-coordinate distance under which intersection points are merged
    pub weld_tolerance: f64,
    /// Close the cut with cap faces
    pub cap: bool,
    /// Which crossing n-gons are triangulated before clipping
    pub triangulate: NgonPolicy,
    /// Output format when none is given on the command line
    pub format: ExportFormat,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            height: 0.0,
            weld_tolerance: WELD_TOLERANCE,
            cap: true,
            triangulate: NgonPolicy::MultiCrossing,
            format: ExportFormat::Obj,
        }
    }
}

impl SliceConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SliceConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// An explicit `path` must exist; otherwise `polycut.toml` is used when
    /// present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!(?config, "loaded slice configuration");
        Ok(config)
    }

    /// Apply `POLYCUT_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(axis) = lookup("POLYCUT_AXIS") {
            self.axis = axis
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid POLYCUT_AXIS")?;
        }

        if let Some(height) = lookup("POLYCUT_HEIGHT") {
            self.height = height.trim().parse().context("Invalid POLYCUT_HEIGHT")?;
        }

        if let Some(tolerance) = lookup("POLYCUT_WELD_TOLERANCE") {
            self.weld_tolerance = tolerance
                .trim()
                .parse()
                .context("Invalid POLYCUT_WELD_TOLERANCE")?;
        }

        if let Some(cap) = lookup("POLYCUT_CAP") {
            self.cap = cap.trim().parse().context("Invalid POLYCUT_CAP")?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.height.is_finite() {
            bail!("Slice height must be finite, got {}", self.height);
        }
        if !self.weld_tolerance.is_finite() || self.weld_tolerance < 0.0 {
            bail!(
                "Weld tolerance must be a non-negative number, got {}",
                self.weld_tolerance
            );
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Slicer carrying these settings
    pub fn slicer(&self) -> PlaneSlicer {
        PlaneSlicer::new(self.axis, self.height)
            .with_weld_tolerance(self.weld_tolerance)
            .with_ngon_policy(self.triangulate)
            .with_cap(self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SliceConfig::default();
        assert_eq!(config.axis, Axis::Y);
        assert_eq!(config.height, 0.0);
        assert_eq!(config.weld_tolerance, 1e-5);
        assert!(config.cap);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("polycut.toml");
        std::fs::write(&path, "axis = \"z\"\nheight = -4.0\ntriangulate = \"always\"\n")?;

        let config = SliceConfig::from_file(&path)?;
        assert_eq!(config.axis, Axis::Z);
        assert_eq!(config.height, -4.0);
        assert_eq!(config.triangulate, NgonPolicy::Always);
        assert!(config.cap);
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("saved.toml");

        let config = SliceConfig {
            axis: Axis::X,
            height: 2.5,
            cap: false,
            format: ExportFormat::Stl,
            ..Default::default()
        };
        config.save(&path)?;
        assert_eq!(SliceConfig::load(Some(&path))?.format, ExportFormat::Stl);
        assert_eq!(SliceConfig::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("POLYCUT_AXIS", "x"),
            ("POLYCUT_HEIGHT", " 1.25 "),
            ("POLYCUT_CAP", "false"),
        ]);

        let mut config = SliceConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()))?;
        assert_eq!(config.axis, Axis::X);
        assert_eq!(config.height, 1.25);
        assert!(!config.cap);
        assert_eq!(config.weld_tolerance, 1e-5);
        Ok(())
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = SliceConfig::default();
        let result = config.apply_env(|key| (key == "POLYCUT_HEIGHT").then(|| "tall".to_string()));
        assert!(result.is_err());

        let mut config = SliceConfig::default();
        let result = config.apply_env(|key| (key == "POLYCUT_CAP").then(|| "no".to_string()));
        assert!(result.is_err());
        assert!(config.cap);
    }

    #[test]
    fn test_validation() {
        let config = SliceConfig {
            weld_tolerance: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SliceConfig {
            height: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        assert!(SliceConfig::load(Some(Path::new("/nonexistent/polycut.toml"))).is_err());
    }
}
