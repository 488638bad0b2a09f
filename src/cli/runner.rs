// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Import, slice and export pipeline driven by the CLI

use crate::config::SliceConfig;
use crate::geometry::{analyze, MeshStats, SliceReport};
use crate::io::{self, ExportFormat};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Result of one slice job
#[derive(Debug, Clone)]
pub struct SliceRun {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub report: SliceReport,
    pub before: MeshStats,
    pub after: MeshStats,
    pub slice_time: Duration,
    pub total_time: Duration,
}

/// Runner for slice jobs
pub struct Runner {
    config: SliceConfig,
}

impl Runner {
    pub fn new(config: SliceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    /// `output.<ext>` next to the input file
    pub fn default_output(input: &Path, format: ExportFormat) -> PathBuf {
        let name = format!("output.{}", format.extension());
        match input.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Import `input`, slice it, and write the result.
    ///
    /// Without an explicit format the output extension decides, falling
    /// back to the configured format.
    pub fn run_slice(
        &self,
        input: &Path,
        output: Option<&Path>,
        format: Option<ExportFormat>,
    ) -> Result<SliceRun> {
        let start = Instant::now();

        let format = format
            .or_else(|| output.and_then(ExportFormat::from_path))
            .unwrap_or(self.config.format);
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_output(input, format));

        let mut mesh = io::import_obj_file(input)?;
        let before = analyze(&mesh);

        let slice_start = Instant::now();
        let report = self
            .config
            .slicer()
            .slice(&mut mesh)
            .with_context(|| format!("Failed to slice {}", input.display()))?;
        let slice_time = slice_start.elapsed();

        io::export(&mesh, &output, format)?;
        let after = analyze(&mesh);

        info!(
            input = %input.display(),
            output = %output.display(),
            elapsed = ?start.elapsed(),
            "slice job finished"
        );

        Ok(SliceRun {
            input: input.to_path_buf(),
            output,
            format,
            report,
            before,
            after,
            slice_time,
            total_time: start.elapsed(),
        })
    }

    /// Import `input` and compute its statistics
    pub fn inspect(&self, input: &Path) -> Result<MeshStats> {
        let mesh = io::import_obj_file(input)?;
        Ok(analyze(&mesh))
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(SliceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axis, Primitive};
    use nalgebra::Point3;
    use tempfile::TempDir;

    fn write_cube(dir: &Path) -> Result<PathBuf> {
        let mesh = Primitive::cube(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).to_mesh()?;
        let path = dir.join("cube.obj");
        io::export_obj(&mesh, &path)?;
        Ok(path)
    }

    #[test]
    fn test_default_output_next_to_input() {
        let out = Runner::default_output(Path::new("models/part.obj"), ExportFormat::Obj);
        assert_eq!(out, PathBuf::from("models/output.obj"));
        let out = Runner::default_output(Path::new("part.obj"), ExportFormat::Stl);
        assert_eq!(out, PathBuf::from("output.stl"));
    }

    #[test]
    fn test_run_slice() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_cube(dir.path())?;

        let config = SliceConfig {
            axis: Axis::Y,
            height: 0.5,
            ..Default::default()
        };
        let run = Runner::new(config).run_slice(&input, None, None)?;

        assert_eq!(run.output, dir.path().join("output.obj"));
        assert!(run.output.exists());
        assert_eq!(run.report.cap_faces, 1);
        assert_eq!(run.before.face_count, 6);
        assert_eq!(run.after.face_count, 6);
        assert!(run.after.is_closed);

        let reloaded = io::import_obj_file(&run.output)?;
        assert_eq!(reloaded.vertex_count(), 8);
        Ok(())
    }

    #[test]
    fn test_format_from_output_extension() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_cube(dir.path())?;
        let output = dir.path().join("half.stl");

        let run = Runner::default().run_slice(&input, Some(&output), None)?;
        assert_eq!(run.format, ExportFormat::Stl);
        assert!(output.exists());
        Ok(())
    }

    #[test]
    fn test_missing_input() {
        let result = Runner::default().run_slice(Path::new("/nonexistent/in.obj"), None, None);
        assert!(result.is_err());
    }
}
