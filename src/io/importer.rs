// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OBJ file importer

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Import an .obj file into a mesh
pub fn import_obj_file(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read OBJ file: {}", path.display()))?;

    super::parse_obj(&source).with_context(|| format!("Failed to parse OBJ file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_import_obj_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "v 0 0 0")?;
        writeln!(file, "v 1 0 0")?;
        writeln!(file, "v 0 1 0")?;
        writeln!(file, "f 1 2 3")?;

        let mesh = import_obj_file(file.path())?;
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);

        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = import_obj_file("/nonexistent/polycut/input.obj").unwrap_err();
        assert!(err.to_string().contains("Failed to read OBJ file"));
    }
}
