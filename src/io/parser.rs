// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ parser using pest

use crate::geometry::{Mesh, MeshError, VertexId};
use anyhow::{anyhow, Context, Result};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[grammar = "io/obj.pest"]
struct ObjParser;

/// Parse OBJ source into a mesh.
///
/// Vertices are numbered from 1 in file order. Face indices may be
/// negative, counting back from the most recent vertex. A face can only
/// reference vertices declared above it.
pub fn parse_obj(source: &str) -> Result<Mesh> {
    let mut pairs = ObjParser::parse(Rule::obj, source).context("Failed to parse OBJ source")?;

    let mut mesh = Mesh::new();
    let mut declared: Vec<VertexId> = Vec::new();

    if let Some(program) = pairs.next() {
        for pair in program.into_inner() {
            match pair.as_rule() {
                Rule::vertex => {
                    let line = pair.line_col().0;
                    let [x, y, z] = parse_vertex(pair)?;
                    let id = mesh
                        .new_vertex(x, y, z)
                        .with_context(|| format!("Invalid vertex on line {}", line))?;
                    declared.push(id);
                }
                Rule::face => {
                    let line = pair.line_col().0;
                    let verts = parse_face(pair, &declared)
                        .with_context(|| format!("Invalid face on line {}", line))?;
                    mesh.new_face(&verts)
                        .with_context(|| format!("Invalid face on line {}", line))?;
                }
                _ => {}
            }
        }
    }

    let loose: Vec<VertexId> = mesh
        .vertices()
        .filter(|v| v.incident_face_count() == 0)
        .map(|v| v.id())
        .collect();
    if !loose.is_empty() {
        warn!(count = loose.len(), "dropping vertices not used by any face");
        for id in loose {
            mesh.delete_vertex(id);
        }
    }

    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "parsed OBJ mesh"
    );
    Ok(mesh)
}

fn parse_vertex(pair: Pair<Rule>) -> Result<[f64; 3]> {
    let mut coords = [0.0; 3];
    let mut numbers = pair.into_inner();
    for coord in coords.iter_mut() {
        let number = numbers
            .next()
            .ok_or_else(|| anyhow!("Vertex needs three coordinates"))?;
        *coord = number
            .as_str()
            .parse::<f64>()
            .with_context(|| format!("Malformed number '{}'", number.as_str()))?;
    }

    let extra = numbers.count();
    if extra > 0 {
        debug!(extra, "ignoring extra vertex components");
    }
    Ok(coords)
}

fn parse_face(pair: Pair<Rule>, declared: &[VertexId]) -> Result<Vec<VertexId>> {
    let mut verts = Vec::new();
    for face_ref in pair.into_inner() {
        let index = face_ref
            .into_inner()
            .next()
            .ok_or_else(|| anyhow!("Face reference without an index"))?;
        let raw: i64 = index
            .as_str()
            .parse()
            .with_context(|| format!("Malformed index '{}'", index.as_str()))?;
        verts.push(resolve_index(raw, declared)?);
    }
    Ok(verts)
}

/// Map a 1-based (or negative, relative) OBJ index onto a declared vertex
fn resolve_index(raw: i64, declared: &[VertexId]) -> Result<VertexId, MeshError> {
    let count = declared.len() as i64;
    let position = match raw {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => Some(count + i),
    };

    position
        .filter(|p| (0..count).contains(p))
        .map(|p| declared[p as usize])
        .ok_or_else(|| {
            MeshError::InvalidTopology(format!(
                "vertex index {} is out of range ({} vertices declared)",
                raw, count
            ))
        })
}
