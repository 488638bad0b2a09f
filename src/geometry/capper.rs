// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closing the boundary loops left open by a slice

use super::{FaceId, Mesh, MeshError, MeshResult, VertexId};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Walks border loops through a set of cut vertices and fills each loop
/// with one face.
///
/// Loops are walked against the winding of the faces that own their border
/// edges, so a cap faces the same way as the surface it closes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderCapper;

impl BorderCapper {
    pub fn new() -> Self {
        Self
    }

    /// Create one cap face per loop through `cut_vertices`.
    ///
    /// Every cut vertex ends up in exactly one cap. A vertex that cannot be
    /// placed on a closed loop of at least three vertices fails the whole
    /// call with [`MeshError::DegenerateCap`].
    pub fn cap(&self, mesh: &mut Mesh, cut_vertices: &BTreeSet<VertexId>) -> MeshResult<Vec<FaceId>> {
        let mut remaining: BTreeSet<VertexId> = cut_vertices
            .iter()
            .copied()
            .filter(|v| mesh.contains_vertex(*v))
            .collect();
        // A loop can never be longer than the set it is drawn from
        let limit = remaining.len();

        let mut caps = Vec::new();
        while let Some(&start) = remaining.iter().next() {
            let ring = self.walk_loop(mesh, start, &remaining, limit)?;
            for v in &ring {
                remaining.remove(v);
            }

            let cap = mesh.new_face(&ring)?;
            debug!(%cap, vertices = ring.len(), "created cap face");
            caps.push(cap);
        }

        if caps.len() > 1 {
            debug!(loops = caps.len(), "capped multiple cross sections");
        }
        Ok(caps)
    }

    fn walk_loop(
        &self,
        mesh: &Mesh,
        start: VertexId,
        remaining: &BTreeSet<VertexId>,
        limit: usize,
    ) -> MeshResult<Vec<VertexId>> {
        let first = self.initial_step(mesh, start, remaining)?;

        let mut ring = vec![start];
        let mut visited = BTreeSet::from([start]);
        let (mut prev, mut cur) = (start, first);

        while cur != start {
            if !visited.insert(cur) {
                return Err(degenerate(format!("border walk from {} revisits {}", start, cur)));
            }
            ring.push(cur);
            if ring.len() > limit {
                return Err(degenerate(format!(
                    "border walk from {} exceeded {} vertices",
                    start, limit
                )));
            }

            let next = self.next_step(mesh, start, prev, cur, remaining)?;
            prev = cur;
            cur = next;
        }

        if ring.len() < 3 {
            return Err(degenerate(format!(
                "loop through {} closes with only {} vertices",
                start,
                ring.len()
            )));
        }
        Ok(ring)
    }

    /// The first step leaves `start` along a border edge that enters it in
    /// face winding order, so the walk runs opposite to that face.
    fn initial_step(
        &self,
        mesh: &Mesh,
        start: VertexId,
        remaining: &BTreeSet<VertexId>,
    ) -> MeshResult<VertexId> {
        for (a, b) in mesh.vertex_edges(start)? {
            if b == start && a != start && remaining.contains(&a) && mesh.is_border_edge(a, b)? {
                return Ok(a);
            }
        }

        // Inconsistent winding; take any open edge to another cut vertex
        for (a, b) in mesh.vertex_edges(start)? {
            let other = if a == start { b } else { a };
            if other != start && remaining.contains(&other) && mesh.is_border_edge(a, b)? {
                warn!(vertex = %start, "no incoming border edge, cap orientation may be reversed");
                return Ok(other);
            }
        }

        Err(degenerate(format!(
            "{} has no border edge to another cut vertex",
            start
        )))
    }

    fn next_step(
        &self,
        mesh: &Mesh,
        start: VertexId,
        prev: VertexId,
        cur: VertexId,
        remaining: &BTreeSet<VertexId>,
    ) -> MeshResult<VertexId> {
        let mut candidates = Vec::new();
        for w in mesh.neighbors(cur)? {
            if w == prev || !(w == start || remaining.contains(&w)) {
                continue;
            }
            if mesh.is_border_edge(cur, w)? && mesh.is_border(w)? {
                candidates.push(w);
            }
        }

        match candidates.as_slice() {
            [next] => Ok(*next),
            [] => Err(degenerate(format!("border walk is open at {}", cur))),
            _ => Err(degenerate(format!(
                "border walk is ambiguous at {} ({} candidates)",
                cur,
                candidates.len()
            ))),
        }
    }
}

fn degenerate(message: String) -> MeshError {
    MeshError::DegenerateCap(message)
}

/// Cap every loop through `cut_vertices` with default settings
pub fn cap(mesh: &mut Mesh, cut_vertices: &BTreeSet<VertexId>) -> MeshResult<Vec<FaceId>> {
    BorderCapper::new().cap(mesh, cut_vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axis, PlaneSlicer, Primitive};
    use crate::utils::math::triangle_normal;
    use nalgebra::Point3;

    fn clipped_cube(min: Point3<f64>, height: f64) -> (Mesh, BTreeSet<VertexId>) {
        let max = min + nalgebra::Vector3::new(1.0, 1.0, 1.0);
        let mut mesh = Primitive::cube(min, max).to_mesh().unwrap();
        let outcome = PlaneSlicer::new(Axis::Y, height).clip(&mut mesh).unwrap();
        (mesh, outcome.cut_vertices)
    }

    #[test]
    fn test_cap_faces_outward() {
        let (mut mesh, cut) = clipped_cube(Point3::origin(), 0.5);
        let caps = cap(&mut mesh, &cut).unwrap();
        assert_eq!(caps.len(), 1);

        let face = mesh.face(caps[0]).unwrap();
        assert_eq!(face.len(), 4);
        assert!(cut.iter().all(|v| face.contains(*v)));

        let p: Vec<_> = face
            .vertices()
            .iter()
            .map(|v| mesh.position(*v).unwrap())
            .collect();
        let normal = triangle_normal(&p[0], &p[1], &p[2]);
        assert!(normal.y < 0.0);

        // Closed again
        for vertex in mesh.vertices() {
            assert!(!mesh.is_border(vertex.id()).unwrap());
        }
        mesh.check_consistency().unwrap();
    }

    #[test]
    fn test_two_loops() {
        let mut mesh = Primitive::cube(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .to_mesh()
            .unwrap();
        let other = Primitive::cube(Point3::new(3.0, 0.0, 0.0), Point3::new(4.0, 1.0, 1.0))
            .to_mesh()
            .unwrap();
        let ids: Vec<_> = other
            .vertices()
            .map(|v| {
                let p = v.position();
                (v.id(), mesh.new_vertex(p.x, p.y, p.z).unwrap())
            })
            .collect();
        for face in other.faces() {
            let verts: Vec<_> = face
                .vertices()
                .iter()
                .map(|v| ids.iter().find(|(old, _)| old == v).unwrap().1)
                .collect();
            mesh.new_face(&verts).unwrap();
        }

        let outcome = PlaneSlicer::new(Axis::Y, 0.5).clip(&mut mesh).unwrap();
        assert_eq!(outcome.cut_vertices.len(), 8);

        let caps = cap(&mut mesh, &outcome.cut_vertices).unwrap();
        assert_eq!(caps.len(), 2);
        for v in &outcome.cut_vertices {
            let owning = caps
                .iter()
                .filter(|c| mesh.face(**c).unwrap().contains(*v))
                .count();
            assert_eq!(owning, 1);
        }
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn test_empty_set_is_noop() {
        let mut mesh = Primitive::cube(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .to_mesh()
            .unwrap();
        assert!(cap(&mut mesh, &BTreeSet::new()).unwrap().is_empty());
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_open_chain_is_degenerate() {
        // A strip of two quads: the cut vertices form a path, not a loop
        let mut mesh = Mesh::new();
        let a = mesh.new_vertex(0.0, 0.0, 0.0).unwrap();
        let b = mesh.new_vertex(1.0, 0.0, 0.0).unwrap();
        let c = mesh.new_vertex(2.0, 0.0, 0.0).unwrap();
        let d = mesh.new_vertex(2.0, 1.0, 0.0).unwrap();
        let e = mesh.new_vertex(1.0, 1.0, 0.0).unwrap();
        let f = mesh.new_vertex(0.0, 1.0, 0.0).unwrap();
        mesh.new_face(&[a, b, e, f]).unwrap();
        mesh.new_face(&[b, c, d, e]).unwrap();

        let cut = BTreeSet::from([a, b, c]);
        let result = cap(&mut mesh, &cut);
        assert!(matches!(result, Err(MeshError::DegenerateCap(_))));
    }

    #[test]
    fn test_isolated_cut_vertex_is_degenerate() {
        let mut mesh = Mesh::new();
        let a = mesh.new_vertex(0.0, 0.0, 0.0).unwrap();
        let b = mesh.new_vertex(1.0, 0.0, 0.0).unwrap();
        let c = mesh.new_vertex(0.0, 1.0, 0.0).unwrap();
        mesh.new_face(&[a, b, c]).unwrap();

        let result = cap(&mut mesh, &BTreeSet::from([a]));
        assert!(matches!(result, Err(MeshError::DegenerateCap(_))));
    }
}
