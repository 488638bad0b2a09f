// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge adjacency queries and face triangulation

use super::{FaceId, Mesh, MeshResult, VertexId};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Canonical (min, max) key for an undirected edge
pub(crate) fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Mesh {
    /// Directed edges of a face in winding order
    pub fn face_edges(&self, face: FaceId) -> MeshResult<Vec<(VertexId, VertexId)>> {
        Ok(self.face_or_err(face)?.edges())
    }

    /// Edges touching a vertex, gathered from all of its incident faces.
    ///
    /// Each edge keeps the direction of the first face (in id order) that
    /// contains it; the reverse of an edge already listed is dropped.
    pub fn vertex_edges(&self, vertex: VertexId) -> MeshResult<Vec<(VertexId, VertexId)>> {
        let v = self.vertex_or_err(vertex)?;

        let mut seen = AHashSet::new();
        let mut edges = Vec::new();
        for face in v.incident_faces() {
            let face = self.face_or_err(face)?;
            for (a, b) in face.edges() {
                if (a == vertex || b == vertex) && seen.insert(edge_key(a, b)) {
                    edges.push((a, b));
                }
            }
        }
        Ok(edges)
    }

    /// Vertices sharing an edge with `vertex`
    pub fn neighbors(&self, vertex: VertexId) -> MeshResult<Vec<VertexId>> {
        Ok(self
            .vertex_edges(vertex)?
            .into_iter()
            .map(|(a, b)| if a == vertex { b } else { a })
            .filter(|&other| other != vertex)
            .collect())
    }

    /// Number of faces containing the undirected edge `a`-`b`
    pub fn edge_face_count(&self, a: VertexId, b: VertexId) -> MeshResult<usize> {
        let v = self.vertex_or_err(a)?;
        let key = edge_key(a, b);

        let mut count = 0;
        for face in v.incident_faces() {
            let face = self.face_or_err(face)?;
            count += face
                .edges()
                .into_iter()
                .filter(|&(p, q)| edge_key(p, q) == key)
                .count();
        }
        Ok(count)
    }

    /// Whether the undirected edge `a`-`b` is claimed by exactly one face
    pub fn is_border_edge(&self, a: VertexId, b: VertexId) -> MeshResult<bool> {
        Ok(self.edge_face_count(a, b)? == 1)
    }

    /// Whether any edge touching `vertex` is claimed by exactly one face
    pub fn is_border(&self, vertex: VertexId) -> MeshResult<bool> {
        let v = self.vertex_or_err(vertex)?;

        let mut counts: AHashMap<(VertexId, VertexId), usize> = AHashMap::new();
        for face in v.incident_faces() {
            for (a, b) in self.face_or_err(face)?.edges() {
                if a == vertex || b == vertex {
                    *counts.entry(edge_key(a, b)).or_insert(0) += 1;
                }
            }
        }
        Ok(counts.values().any(|&count| count == 1))
    }

    /// Fan-triangulate a face from its first vertex.
    ///
    /// An n-gon (n > 3) is replaced by the triangles (v0, v1, v2),
    /// (v0, v2, v3), ... over the same vertices. Triangles come back in fan
    /// order; a triangle is returned unchanged.
    pub fn triangulate(&mut self, face: FaceId) -> MeshResult<Vec<FaceId>> {
        let verts = self.face_or_err(face)?.vertices().to_vec();
        if verts.len() <= 3 {
            return Ok(vec![face]);
        }

        // Build the fan before removing the original so no vertex is ever
        // orphaned in between.
        let mut triangles = Vec::with_capacity(verts.len() - 2);
        for i in 1..verts.len() - 1 {
            let tri = [verts[0], verts[i], verts[i + 1]];
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                debug!(%face, "skipping degenerate fan triangle");
                continue;
            }
            triangles.push(self.new_face(&tri)?);
        }

        self.delete_face(face);
        Ok(triangles)
    }
}
