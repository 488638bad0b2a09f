// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh analytics and statistics

use super::topology::edge_key;
use super::{Mesh, VertexId};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Mesh statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub face_count: usize,
    /// Triangles after fan-triangulating every face
    pub triangle_count: usize,
    /// Distinct undirected edges
    pub edge_count: usize,
    /// Edges claimed by exactly one face
    pub border_edges: usize,
    /// Edges claimed by more than two faces
    pub non_manifold_edges: usize,
    /// Every edge is shared by exactly two faces
    pub is_closed: bool,
    /// Enclosed volume; only meaningful for closed meshes
    pub volume: f64,
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean vertex position [x, y, z]
    pub centroid: [f64; 3],
}

impl MeshStats {
    pub fn empty() -> Self {
        Self {
            vertex_count: 0,
            face_count: 0,
            triangle_count: 0,
            edge_count: 0,
            border_edges: 0,
            non_manifold_edges: 0,
            is_closed: false,
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
        }
    }
}

/// Analyze a mesh and compute statistics
pub fn analyze(mesh: &Mesh) -> MeshStats {
    if mesh.vertex_count() == 0 || mesh.face_count() == 0 {
        return MeshStats::empty();
    }

    let mut edges: AHashMap<(VertexId, VertexId), usize> = AHashMap::new();
    let mut triangle_count = 0;
    let mut signed_volume = 0.0;
    let mut surface_area = 0.0;

    for face in mesh.faces() {
        for (a, b) in face.edges() {
            *edges.entry(edge_key(a, b)).or_insert(0) += 1;
        }

        let points: Vec<Point3<f64>> = face
            .vertices()
            .iter()
            .filter_map(|v| mesh.vertex(*v).map(|vertex| vertex.position()))
            .collect();
        for i in 1..points.len().saturating_sub(1) {
            let (p0, p1, p2) = (&points[0], &points[i], &points[i + 1]);
            triangle_count += 1;

            // Signed volume of the tetrahedron formed with the origin
            signed_volume += p0.coords.dot(&p1.coords.cross(&p2.coords)) / 6.0;
            surface_area += (p1 - p0).cross(&(p2 - p0)).norm() / 2.0;
        }
    }

    let border_edges = edges.values().filter(|&&count| count == 1).count();
    let non_manifold_edges = edges.values().filter(|&&count| count > 2).count();

    MeshStats {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        triangle_count,
        edge_count: edges.len(),
        border_edges,
        non_manifold_edges,
        is_closed: edges.values().all(|&count| count == 2),
        volume: signed_volume.abs(),
        surface_area,
        bbox: mesh.bounding_box().to_array(),
        centroid: calculate_centroid(mesh),
    }
}

fn calculate_centroid(mesh: &Mesh) -> [f64; 3] {
    let mut sum = nalgebra::Vector3::zeros();
    for vertex in mesh.vertices() {
        sum += vertex.position().coords;
    }
    let mean = sum / mesh.vertex_count() as f64;
    [mean.x, mean.y, mean.z]
}
