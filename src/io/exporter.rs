// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh exporters for OBJ and STL

use crate::geometry::{Mesh, VertexId};
use crate::utils::math::triangle_normal;
use ahash::AHashMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub const OBJ_HEADER: &str = "# OBJ exported from polycut";

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Obj,
    Stl,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Obj => "obj",
            ExportFormat::Stl => "stl",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "obj" => Ok(ExportFormat::Obj),
            "stl" => Ok(ExportFormat::Stl),
            other => Err(format!("unsupported format '{}' (expected obj or stl)", other)),
        }
    }
}

/// Write a mesh in the given format
pub fn export(mesh: &Mesh, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Obj => export_obj(mesh, path),
        ExportFormat::Stl => export_stl(mesh, path),
    }
}

/// Export mesh to an OBJ file
pub fn export_obj(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create OBJ file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)
        .with_context(|| format!("Failed to write OBJ file: {}", path.display()))?;
    writer.flush()?;

    info!(path = %path.display(), "exported OBJ");
    Ok(())
}

/// Write OBJ text. Vertices are renumbered from 1 in id order.
pub fn write_obj<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", OBJ_HEADER)?;
    writeln!(writer, "usemtl (null)")?;

    let mut numbering: AHashMap<VertexId, usize> = AHashMap::with_capacity(mesh.vertex_count());
    for (i, vertex) in mesh.vertices().enumerate() {
        let p = vertex.position();
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        numbering.insert(vertex.id(), i + 1);
    }

    for face in mesh.faces() {
        let indices: Vec<String> = face
            .vertices()
            .iter()
            .map(|v| {
                numbering
                    .get(v)
                    .map(|i| i.to_string())
                    .with_context(|| format!("Face {} references missing vertex {}", face.id(), v))
            })
            .collect::<Result<_>>()?;
        writeln!(writer, "f {}", indices.join(" "))?;
    }

    Ok(())
}

/// Export mesh to a binary STL file, fan-triangulating every face
pub fn export_stl(mesh: &Mesh, path: &Path) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let mut triangles = Vec::new();
    for face in mesh.faces() {
        let points = face
            .vertices()
            .iter()
            .map(|v| mesh.position(*v))
            .collect::<Result<Vec<_>, _>>()?;

        for i in 1..points.len().saturating_sub(1) {
            let (p0, p1, p2) = (&points[0], &points[i], &points[i + 1]);
            let normal = triangle_normal(p0, p1, p2)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(nalgebra::Vector3::zeros);

            let vertex = |p: &nalgebra::Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);
            triangles.push(StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [vertex(p0), vertex(p1), vertex(p2)],
            });
        }
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    stl_io::write_stl(&mut file, triangles.iter()).context("Failed to write STL file")?;

    info!(path = %path.display(), triangles = triangles.len(), "exported STL");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Point3;
    use tempfile::NamedTempFile;

    fn unit_cube() -> Mesh {
        Primitive::cube(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .to_mesh()
            .unwrap()
    }

    #[test]
    fn test_write_obj_layout() -> Result<()> {
        let mut mesh = Mesh::new();
        let a = mesh.new_vertex(0.0, 0.0, 0.0)?;
        let b = mesh.new_vertex(1.5, 0.0, 0.0)?;
        let c = mesh.new_vertex(0.0, -2.0, 0.25)?;
        mesh.new_face(&[a, b, c])?;

        let mut out = Vec::new();
        write_obj(&mesh, &mut out)?;
        let text = String::from_utf8(out)?;

        let expected = "\
# OBJ exported from polycut
usemtl (null)
v 0 0 0
v 1.5 0 0
v 0 -2 0.25
f 1 2 3
";
        assert_eq!(text, expected);
        Ok(())
    }

    #[test]
    fn test_renumbering_after_delete() -> Result<()> {
        let mut mesh = unit_cube();
        let first = mesh.vertex_ids()[0];
        mesh.delete_vertex(first);

        let mut out = Vec::new();
        write_obj(&mesh, &mut out)?;
        let text = String::from_utf8(out)?;

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 7);
        let max_index = text
            .lines()
            .filter(|l| l.starts_with("f "))
            .flat_map(|l| l[2..].split(' ').map(|i| i.parse::<usize>().unwrap()))
            .max()
            .unwrap();
        assert_eq!(max_index, 7);
        Ok(())
    }

    #[test]
    fn test_export_stl() -> Result<()> {
        let mesh = unit_cube();
        let file = NamedTempFile::new()?;
        export_stl(&mesh, file.path())?;

        let mut reader = File::open(file.path())?;
        let stl = stl_io::read_stl(&mut reader)?;
        assert_eq!(stl.faces.len(), 12);
        assert_eq!(stl.vertices.len(), 8);
        Ok(())
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("OBJ".parse::<ExportFormat>().unwrap(), ExportFormat::Obj);
        assert_eq!(
            ExportFormat::from_path(Path::new("out/part.stl")),
            Some(ExportFormat::Stl)
        );
        assert!("3mf".parse::<ExportFormat>().is_err());
    }
}
