// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycut mesh editor
//!
//! An id-keyed polygon mesh with cascading deletes, plus an axis-aligned
//! slice operation that removes everything below a height, clips the faces
//! crossing it, welds the intersection points and caps the opening.

pub mod cli;
pub mod config;
pub mod geometry;
pub mod io;
pub mod utils;

pub use config::SliceConfig;
pub use geometry::{slice, Axis, Mesh, MeshError, Primitive, SliceReport};
pub use io::{export_obj, export_stl, import_obj_file, parse_obj};

use anyhow::{Context, Result};
use std::path::Path;

/// Import an OBJ file, slice it with `config`, and write the result as OBJ
pub fn slice_file(input: &Path, output: &Path, config: &SliceConfig) -> Result<SliceReport> {
    let mut mesh = import_obj_file(input)?;
    let report = config
        .slicer()
        .slice(&mut mesh)
        .with_context(|| format!("Failed to slice {}", input.display()))?;
    export_obj(&mesh, output)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slice() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mut mesh = parse_obj(source).unwrap();
        let report = slice(&mut mesh, Axis::Y, -1.0).unwrap();
        assert_eq!(report.crossing_faces, 0);
        assert_eq!(mesh.face_count(), 1);
    }
}
