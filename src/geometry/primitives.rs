// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{Mesh, MeshResult, VertexId};
use ahash::AHashMap;
use nalgebra::Point3;

/// Geometric primitives
pub enum Primitive {
    /// Axis-aligned box whose six sides are split into `divisions` x
    /// `divisions` quads sharing their vertices
    Box {
        min: Point3<f64>,
        max: Point3<f64>,
        divisions: usize,
    },
}

impl Primitive {
    /// Box with one quad per side: 8 vertices, 6 faces
    pub fn cube(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::Box {
            min,
            max,
            divisions: 1,
        }
    }

    pub fn grid_cube(min: Point3<f64>, max: Point3<f64>, divisions: usize) -> Self {
        Self::Box {
            min,
            max,
            divisions: divisions.max(1),
        }
    }

    pub fn to_mesh(&self) -> MeshResult<Mesh> {
        match self {
            Self::Box {
                min,
                max,
                divisions,
            } => generate_box_mesh(min, max, *divisions),
        }
    }
}

/// Faces are wound counter-clockwise seen from outside.
fn generate_box_mesh(min: &Point3<f64>, max: &Point3<f64>, n: usize) -> MeshResult<Mesh> {
    let mut mesh = Mesh::new();
    let mut lattice: AHashMap<[usize; 3], VertexId> = AHashMap::new();

    let on_surface = |c: &[usize; 3]| c.iter().any(|&i| i == 0 || i == n);

    for i in 0..=n {
        for j in 0..=n {
            for k in 0..=n {
                let cell = [i, j, k];
                if !on_surface(&cell) {
                    continue;
                }
                let t = |idx: usize, axis: usize| {
                    min[axis] + (max[axis] - min[axis]) * idx as f64 / n as f64
                };
                let id = mesh.new_vertex(t(i, 0), t(j, 1), t(k, 2))?;
                lattice.insert(cell, id);
            }
        }
    }

    for axis in 0..3 {
        for (side, outward) in [(0, false), (n, true)] {
            // (u, v) chosen so that u x v points along the outward normal
            let (u, v) = if outward {
                ((axis + 1) % 3, (axis + 2) % 3)
            } else {
                ((axis + 2) % 3, (axis + 1) % 3)
            };

            for a in 0..n {
                for b in 0..n {
                    let corner = |du: usize, dv: usize| {
                        let mut c = [0usize; 3];
                        c[axis] = side;
                        c[u] = a + du;
                        c[v] = b + dv;
                        lattice[&c]
                    };
                    let quad = [corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)];
                    mesh.new_face(&quad)?;
                }
            }
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::triangle_normal;

    #[test]
    fn test_unit_cube() {
        let mesh = Primitive::cube(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .to_mesh()
            .unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.faces().all(|f| f.len() == 4));
        mesh.check_consistency().unwrap();
    }

    #[test]
    fn test_faces_point_outward() {
        let mesh = Primitive::grid_cube(Point3::origin(), Point3::new(2.0, 2.0, 2.0), 3)
            .to_mesh()
            .unwrap();
        let center = mesh.bounding_box().center();

        for face in mesh.faces() {
            let p: Vec<_> = face
                .vertices()
                .iter()
                .map(|v| mesh.position(*v).unwrap())
                .collect();
            let normal = triangle_normal(&p[0], &p[1], &p[2]);
            assert!(normal.dot(&(p[0] - center)) > 0.0);
        }
    }

    #[test]
    fn test_grid_cube_counts() {
        let n = 4;
        let mesh = Primitive::grid_cube(Point3::origin(), Point3::new(1.0, 1.0, 1.0), n)
            .to_mesh()
            .unwrap();
        assert_eq!(mesh.face_count(), 6 * n * n);
        assert_eq!(mesh.vertex_count(), 6 * n * n + 2);
    }
}
