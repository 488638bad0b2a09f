// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation: id-keyed vertex and face registries
//!
//! Vertices and faces reference each other only by id. The mesh owns both
//! registries, so the vertex <-> face back-references never form ownership
//! cycles.

use super::{BoundingBox, FaceId, IdAllocator, MeshError, MeshResult, VertexId};
use nalgebra::Point3;
use std::collections::{BTreeMap, BTreeSet};

/// Vertex with position and the set of faces that reference it
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    position: Point3<f64>,
    faces: BTreeSet<FaceId>,
}

impl Vertex {
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Faces currently referencing this vertex
    pub fn incident_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().copied()
    }

    pub fn incident_face_count(&self) -> usize {
        self.faces.len()
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

/// Polygon defined by an ordered vertex loop; the order encodes the winding
#[derive(Debug, Clone)]
pub struct Face {
    id: FaceId,
    verts: Vec<VertexId>,
}

impl Face {
    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.verts
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// Consecutive vertex pairs, wrapping from the last vertex to the first
    pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
        let n = self.verts.len();
        (0..n)
            .map(|i| (self.verts[i], self.verts[(i + 1) % n]))
            .collect()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.verts.contains(&vertex)
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Face {}

/// Polygon mesh
///
/// Enumeration follows id order, which is allocation order. Callers must not
/// rely on that beyond determinism.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    ids: IdAllocator,
    vertices: BTreeMap<VertexId, Vertex>,
    faces: BTreeMap<FaceId, Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new vertex and return its id
    pub fn new_vertex(&mut self, x: f64, y: f64, z: f64) -> MeshResult<VertexId> {
        check_finite(x, y, z)?;
        let id = VertexId(self.ids.next());
        self.insert_vertex(id, Point3::new(x, y, z));
        Ok(id)
    }

    pub fn new_vertex_at(&mut self, position: Point3<f64>) -> MeshResult<VertexId> {
        self.new_vertex(position.x, position.y, position.z)
    }

    /// Register a vertex under an explicitly chosen id.
    ///
    /// The id must never have been issued by this mesh before; afterwards the
    /// allocator continues above it.
    pub fn new_vertex_with_id(&mut self, id: u64, x: f64, y: f64, z: f64) -> MeshResult<VertexId> {
        check_finite(x, y, z)?;
        if self.ids.is_issued(id) {
            return Err(MeshError::DuplicateId(id));
        }
        self.ids.reserve(id);
        let id = VertexId(id);
        self.insert_vertex(id, Point3::new(x, y, z));
        Ok(id)
    }

    fn insert_vertex(&mut self, id: VertexId, position: Point3<f64>) {
        self.vertices.insert(
            id,
            Vertex {
                id,
                position,
                faces: BTreeSet::new(),
            },
        );
    }

    /// Create a face over existing vertices and wire up the back-references
    pub fn new_face(&mut self, verts: &[VertexId]) -> MeshResult<FaceId> {
        self.validate_face(verts)?;
        let id = FaceId(self.ids.next());
        self.insert_face(id, verts);
        Ok(id)
    }

    /// Create a face under an explicitly chosen, never-issued id
    pub fn new_face_with_id(&mut self, id: u64, verts: &[VertexId]) -> MeshResult<FaceId> {
        if self.ids.is_issued(id) {
            return Err(MeshError::DuplicateId(id));
        }
        self.validate_face(verts)?;
        self.ids.reserve(id);
        let id = FaceId(id);
        self.insert_face(id, verts);
        Ok(id)
    }

    fn validate_face(&self, verts: &[VertexId]) -> MeshResult<()> {
        if let Some(missing) = verts.iter().find(|v| !self.vertices.contains_key(v)) {
            return Err(MeshError::InvalidTopology(format!(
                "vertex {} does not belong to this mesh",
                missing
            )));
        }

        let distinct: BTreeSet<_> = verts.iter().collect();
        if distinct.len() < 3 {
            return Err(MeshError::InvalidTopology(format!(
                "a face needs at least 3 distinct vertices, got {}",
                distinct.len()
            )));
        }

        Ok(())
    }

    fn insert_face(&mut self, id: FaceId, verts: &[VertexId]) {
        for v in verts {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.faces.insert(id);
            }
        }
        self.faces.insert(
            id,
            Face {
                id,
                verts: verts.to_vec(),
            },
        );
    }

    /// Delete a vertex together with every face still referencing it.
    ///
    /// Returns `false` if the vertex was already gone.
    pub fn delete_vertex(&mut self, id: VertexId) -> bool {
        let Some(vertex) = self.vertices.remove(&id) else {
            return false;
        };

        for face in vertex.faces {
            self.delete_face(face);
        }
        true
    }

    /// Delete a face, unlinking it from its vertices and removing any vertex
    /// left without faces.
    ///
    /// Returns `false` if the face was already gone.
    pub fn delete_face(&mut self, id: FaceId) -> bool {
        let Some(face) = self.faces.remove(&id) else {
            return false;
        };

        let mut orphans = Vec::new();
        for v in &face.verts {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.faces.remove(&id);
                if vertex.faces.is_empty() && !orphans.contains(v) {
                    orphans.push(*v);
                }
            }
        }

        for v in orphans {
            self.delete_vertex(v);
        }
        true
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(&id)
    }

    pub(crate) fn vertex_or_err(&self, id: VertexId) -> MeshResult<&Vertex> {
        self.vertices.get(&id).ok_or(MeshError::UnknownVertex(id))
    }

    pub(crate) fn face_or_err(&self, id: FaceId) -> MeshResult<&Face> {
        self.faces.get(&id).ok_or(MeshError::UnknownFace(id))
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains_key(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    /// Snapshot of the current vertex ids
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.keys().copied().collect()
    }

    /// Snapshot of the current face ids
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().copied().collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Position of a vertex
    pub fn position(&self, id: VertexId) -> MeshResult<Point3<f64>> {
        Ok(self.vertex_or_err(id)?.position)
    }

    /// Faces currently referencing a vertex
    pub fn vertex_faces(&self, id: VertexId) -> MeshResult<Vec<FaceId>> {
        Ok(self.vertex_or_err(id)?.incident_faces().collect())
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.values().map(|v| &v.position))
    }

    /// Verify the registry invariants: face vertices exist, back-references
    /// agree in both directions, and no vertex is left without faces.
    pub fn check_consistency(&self) -> MeshResult<()> {
        for face in self.faces.values() {
            for v in &face.verts {
                let vertex = self.vertices.get(v).ok_or_else(|| {
                    MeshError::InvalidTopology(format!(
                        "face {} references missing vertex {}",
                        face.id, v
                    ))
                })?;
                if !vertex.faces.contains(&face.id) {
                    return Err(MeshError::InvalidTopology(format!(
                        "vertex {} does not list face {}",
                        v, face.id
                    )));
                }
            }
        }

        for vertex in self.vertices.values() {
            if vertex.faces.is_empty() {
                return Err(MeshError::InvalidTopology(format!(
                    "vertex {} has no incident faces",
                    vertex.id
                )));
            }
            for f in &vertex.faces {
                let listed = self.faces.get(f).is_some_and(|face| face.contains(vertex.id));
                if !listed {
                    return Err(MeshError::InvalidTopology(format!(
                        "vertex {} lists face {} which does not reference it",
                        vertex.id, f
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_finite(x: f64, y: f64, z: f64) -> MeshResult<()> {
    if x.is_finite() && y.is_finite() && z.is_finite() {
        Ok(())
    } else {
        Err(MeshError::InvalidGeometry { x, y, z })
    }
}
