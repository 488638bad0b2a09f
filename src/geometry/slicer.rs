// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned plane slicing
//!
//! Everything strictly below the cutting height is removed. Faces straddling
//! the plane are clipped to it, coincident intersection points are welded,
//! and the opened boundary is closed by [`BorderCapper`].

use super::{BorderCapper, FaceId, Mesh, MeshResult, VertexId};
use crate::utils::math::{lerp_point, points_coincide};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Default per-coordinate tolerance for welding intersection vertices
pub const WELD_TOLERANCE: f64 = 1e-5;

/// Coordinate axis the cutting plane is perpendicular to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn coord(self, point: &Point3<f64>) -> f64 {
        point[self.index()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{}' (expected x, y or z)", other)),
        }
    }
}

/// When crossing faces with more than three vertices are fan-triangulated
/// before clipping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NgonPolicy {
    /// Only n-gons whose boundary crosses the plane more than twice. A face
    /// crossing exactly twice clips to a single polygon as it is.
    #[default]
    MultiCrossing,
    /// Every crossing n-gon
    Always,
}

/// Counters describing one slice operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceReport {
    pub axis: Axis,
    pub height: f64,
    /// Faces with vertices on both sides of the plane
    pub crossing_faces: usize,
    pub faces_triangulated: usize,
    /// Vertices removed, including vertices orphaned by the cull
    pub vertices_culled: usize,
    /// New vertices created on the plane
    pub vertices_created: usize,
    /// Intersection points merged into an existing cut vertex
    pub welds: usize,
    /// Kept vertices lying on the plane that stood in for an intersection
    pub plane_vertices_reused: usize,
    pub remnant_faces: usize,
    /// Clipped polygons that collapsed below three distinct vertices
    pub degenerate_remnants: usize,
    pub cap_faces: usize,
}

/// Result of the clipping phase, before capping
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    /// Vertices lying on the cut: newly created intersections plus reused
    /// on-plane vertices. These bound the hole(s) left by the cull.
    pub cut_vertices: BTreeSet<VertexId>,
    pub remnant_faces: Vec<FaceId>,
    pub report: SliceReport,
}

/// Face corner captured before the cull
#[derive(Debug, Clone, Copy)]
struct Corner {
    id: VertexId,
    position: Point3<f64>,
    kept: bool,
}

/// Where a clipped polygon corner resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    /// A surviving original vertex
    Kept(VertexId),
    /// Entry in the weld table
    Cut(usize),
}

#[derive(Debug, Clone)]
struct CutPoint {
    position: Point3<f64>,
    /// Kept vertex already sitting on the plane at this position
    existing: Option<VertexId>,
    /// Vertex created for this point once a remnant face needs it
    created: Option<VertexId>,
}

/// Linear-scan table of cut points used to weld intersections
#[derive(Debug, Default)]
struct WeldTable {
    points: Vec<CutPoint>,
    tolerance: f64,
}

impl WeldTable {
    fn new(tolerance: f64) -> Self {
        Self {
            points: Vec::new(),
            tolerance,
        }
    }

    fn find(&self, position: &Point3<f64>) -> Option<usize> {
        self.points
            .iter()
            .position(|p| points_coincide(&p.position, position, self.tolerance))
    }

    fn find_existing(&self, vertex: VertexId) -> Option<usize> {
        self.points.iter().position(|p| p.existing == Some(vertex))
    }

    /// On-plane vertices always resolve through their table entry so that a
    /// clipped polygon never lists them twice
    fn kept_slot(&self, vertex: VertexId) -> Slot {
        match self.find_existing(vertex) {
            Some(index) => Slot::Cut(index),
            None => Slot::Kept(vertex),
        }
    }

    fn push(&mut self, position: Point3<f64>, existing: Option<VertexId>) -> usize {
        self.points.push(CutPoint {
            position,
            existing,
            created: None,
        });
        self.points.len() - 1
    }
}

/// Slices a mesh at an axis-aligned height, keeping the side at or above it
#[derive(Debug, Clone)]
pub struct PlaneSlicer {
    axis: Axis,
    height: f64,
    weld_tolerance: f64,
    ngon_policy: NgonPolicy,
    cap: bool,
}

impl PlaneSlicer {
    pub fn new(axis: Axis, height: f64) -> Self {
        Self {
            axis,
            height,
            weld_tolerance: WELD_TOLERANCE,
            ngon_policy: NgonPolicy::default(),
            cap: true,
        }
    }

    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    pub fn with_ngon_policy(mut self, policy: NgonPolicy) -> Self {
        self.ngon_policy = policy;
        self
    }

    /// Whether [`slice`](Self::slice) closes the cut with cap faces
    pub fn with_cap(mut self, cap: bool) -> Self {
        self.cap = cap;
        self
    }

    /// Clip the mesh to the plane and, unless disabled, cap the opening.
    ///
    /// On error the mesh may be left partially sliced; slice a clone if the
    /// original must survive a failure.
    pub fn slice(&self, mesh: &mut Mesh) -> MeshResult<SliceReport> {
        info!(axis = %self.axis, height = self.height, "slicing mesh");

        let ClipOutcome {
            cut_vertices,
            mut report,
            ..
        } = self.clip(mesh)?;

        if self.cap {
            let caps = BorderCapper::new().cap(mesh, &cut_vertices)?;
            report.cap_faces = caps.len();
        }

        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            caps = report.cap_faces,
            "slice complete"
        );
        Ok(report)
    }

    /// Remove everything below the plane and rebuild the straddling faces,
    /// without capping.
    pub fn clip(&self, mesh: &mut Mesh) -> MeshResult<ClipOutcome> {
        let mut report = SliceReport {
            axis: self.axis,
            height: self.height,
            ..Default::default()
        };

        // Classify
        let crossing: Vec<FaceId> = mesh
            .face_ids()
            .into_iter()
            .filter(|&f| self.is_crossing(mesh, f))
            .collect();
        report.crossing_faces = crossing.len();
        info!(count = crossing.len(), "faces found crossing the slice plane");

        // Normalize n-gons
        let mut clip_faces = Vec::with_capacity(crossing.len());
        for face in crossing {
            if self.needs_triangulation(mesh, face)? {
                report.faces_triangulated += 1;
                for tri in mesh.triangulate(face)? {
                    if self.is_crossing(mesh, tri) {
                        clip_faces.push(tri);
                    }
                }
            } else {
                clip_faces.push(face);
            }
        }

        // Capture directed edge lists while every original vertex still exists
        let mut snapshots = Vec::with_capacity(clip_faces.len());
        for &face in &clip_faces {
            let mut edges = Vec::new();
            for (a, b) in mesh.face_edges(face)? {
                edges.push((self.corner(mesh, a)?, self.corner(mesh, b)?));
            }
            snapshots.push((face, edges));
        }

        // Clip every edge list and weld the intersections
        let mut welds = WeldTable::new(self.weld_tolerance);
        self.register_plane_vertices(&snapshots, &mut welds);

        let mut polygons = Vec::with_capacity(snapshots.len());
        for (face, edges) in &snapshots {
            let mut slots = Vec::new();
            for (a, b) in edges {
                let (start, end) = match (a.kept, b.kept) {
                    (true, true) => (welds.kept_slot(a.id), welds.kept_slot(b.id)),
                    (false, false) => continue,
                    (true, false) => (
                        welds.kept_slot(a.id),
                        self.intersect(a, b, &mut welds, &mut report),
                    ),
                    (false, true) => (
                        self.intersect(b, a, &mut welds, &mut report),
                        welds.kept_slot(b.id),
                    ),
                };
                push_distinct(&mut slots, start);
                push_distinct(&mut slots, end);
            }
            if slots.len() > 1 && slots.first() == slots.last() {
                slots.pop();
            }
            polygons.push((*face, slots));
        }

        // Rebuild the remnant polygons. Creating them before the cull keeps
        // their surviving vertices referenced throughout.
        let mut cut_vertices = BTreeSet::new();
        let mut remnant_faces = Vec::new();
        for (face, slots) in polygons {
            let distinct: BTreeSet<_> = slots.iter().collect();
            if distinct.len() < 3 {
                debug!(%face, corners = distinct.len(), "clipped face collapsed, dropping it");
                report.degenerate_remnants += 1;
                continue;
            }

            let mut verts = Vec::with_capacity(slots.len());
            for slot in &slots {
                let id = match *slot {
                    Slot::Kept(id) => id,
                    Slot::Cut(index) => {
                        let id = self.materialize(mesh, &mut welds, index, &mut report)?;
                        cut_vertices.insert(id);
                        id
                    }
                };
                verts.push(id);
            }
            let remnant = mesh.new_face(&verts)?;
            debug!(%face, %remnant, corners = verts.len(), "rebuilt clipped face");
            remnant_faces.push(remnant);
        }
        report.remnant_faces = remnant_faces.len();

        // Cull
        let before = mesh.vertex_count();
        let below: Vec<VertexId> = mesh
            .vertices()
            .filter(|v| self.axis.coord(&v.position()) < self.height)
            .map(|v| v.id())
            .collect();
        for vertex in below {
            mesh.delete_vertex(vertex);
        }
        report.vertices_culled = before - mesh.vertex_count();

        // On-plane vertices left on the opening belong to the cut even when
        // every remnant touching them collapsed
        for point in &welds.points {
            if let Some(existing) = point.existing {
                if mesh.contains_vertex(existing) && mesh.is_border(existing)? {
                    cut_vertices.insert(existing);
                }
            }
        }
        cut_vertices.retain(|v| mesh.contains_vertex(*v));

        // A kept face lying in the plane already covers its part of the
        // opening; capping it again would leave a coincident sheet
        let mut flat = Vec::new();
        for vertex in &cut_vertices {
            if !self.leaves_plane(mesh, *vertex)? {
                flat.push(*vertex);
            }
        }
        if !flat.is_empty() {
            debug!(vertices = flat.len(), "cut vertices only touch faces in the plane, not capping them");
            for vertex in flat {
                cut_vertices.remove(&vertex);
            }
        }

        info!(
            created = report.vertices_created,
            welds = report.welds,
            remnants = report.remnant_faces,
            culled = report.vertices_culled,
            "clipping complete"
        );

        Ok(ClipOutcome {
            cut_vertices,
            remnant_faces,
            report,
        })
    }

    /// Whether any face around `vertex` reaches off the cutting plane
    fn leaves_plane(&self, mesh: &Mesh, vertex: VertexId) -> MeshResult<bool> {
        for face in mesh.vertex_faces(vertex)? {
            for v in mesh.face_or_err(face)?.vertices() {
                let offset = self.axis.coord(&mesh.position(*v)?) - self.height;
                if offset.abs() > self.weld_tolerance {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn is_kept(&self, position: &Point3<f64>) -> bool {
        self.axis.coord(position) >= self.height
    }

    fn corner(&self, mesh: &Mesh, id: VertexId) -> MeshResult<Corner> {
        let position = mesh.position(id)?;
        Ok(Corner {
            id,
            position,
            kept: self.is_kept(&position),
        })
    }

    /// At least one vertex strictly below and one at or above the height
    fn is_crossing(&self, mesh: &Mesh, face: FaceId) -> bool {
        let Some(face) = mesh.face(face) else {
            return false;
        };

        let (mut below, mut above) = (false, false);
        for v in face.vertices() {
            if let Some(vertex) = mesh.vertex(*v) {
                if self.is_kept(&vertex.position()) {
                    above = true;
                } else {
                    below = true;
                }
            }
        }
        below && above
    }

    fn needs_triangulation(&self, mesh: &Mesh, face: FaceId) -> MeshResult<bool> {
        let verts = mesh.face_or_err(face)?.vertices();
        if verts.len() <= 3 {
            return Ok(false);
        }

        match self.ngon_policy {
            NgonPolicy::Always => Ok(true),
            NgonPolicy::MultiCrossing => {
                let mut kept = Vec::with_capacity(verts.len());
                for v in verts {
                    kept.push(self.is_kept(&mesh.position(*v)?));
                }
                let transitions = (0..kept.len())
                    .filter(|&i| kept[i] != kept[(i + 1) % kept.len()])
                    .count();
                Ok(transitions > 2)
            }
        }
    }

    /// Point where the segment from `kept` to `dropped` meets the plane
    fn intersection_point(&self, kept: &Corner, dropped: &Corner) -> Point3<f64> {
        let k = self.axis.coord(&kept.position);
        let d = self.axis.coord(&dropped.position);
        let t = (self.height - k) / (d - k);

        let mut point = lerp_point(&kept.position, &dropped.position, t);
        point[self.axis.index()] = self.height;
        point
    }

    /// Kept endpoints that already sit on the plane stand in for the
    /// intersection of their crossing edges. Registering them first lets
    /// interpolated points weld onto them regardless of visiting order.
    fn register_plane_vertices(
        &self,
        snapshots: &[(FaceId, Vec<(Corner, Corner)>)],
        welds: &mut WeldTable,
    ) {
        for (_, edges) in snapshots {
            for (a, b) in edges {
                let (kept, dropped) = match (a.kept, b.kept) {
                    (true, false) => (a, b),
                    (false, true) => (b, a),
                    _ => continue,
                };
                let point = self.intersection_point(kept, dropped);
                if points_coincide(&point, &kept.position, welds.tolerance)
                    && welds.find_existing(kept.id).is_none()
                {
                    welds.push(kept.position, Some(kept.id));
                }
            }
        }
    }

    fn intersect(
        &self,
        kept: &Corner,
        dropped: &Corner,
        welds: &mut WeldTable,
        report: &mut SliceReport,
    ) -> Slot {
        if let Some(index) = welds.find_existing(kept.id) {
            return Slot::Cut(index);
        }

        let point = self.intersection_point(kept, dropped);
        match welds.find(&point) {
            Some(index) => {
                report.welds += 1;
                Slot::Cut(index)
            }
            None => Slot::Cut(welds.push(point, None)),
        }
    }

    /// Vertex backing a weld table entry, created on first use
    fn materialize(
        &self,
        mesh: &mut Mesh,
        welds: &mut WeldTable,
        index: usize,
        report: &mut SliceReport,
    ) -> MeshResult<VertexId> {
        let point = &mut welds.points[index];
        if let Some(existing) = point.existing {
            if point.created.is_none() {
                point.created = Some(existing);
                report.plane_vertices_reused += 1;
            }
            return Ok(existing);
        }
        if let Some(created) = point.created {
            return Ok(created);
        }

        let id = mesh.new_vertex_at(point.position)?;
        point.created = Some(id);
        report.vertices_created += 1;
        Ok(id)
    }
}

/// Append unless it repeats the previous corner
fn push_distinct(slots: &mut Vec<Slot>, slot: Slot) {
    if slots.last() != Some(&slot) {
        slots.push(slot);
    }
}

/// Slice `mesh` at `height` along `axis` with default settings
pub fn slice(mesh: &mut Mesh, axis: Axis, height: f64) -> MeshResult<SliceReport> {
    PlaneSlicer::new(axis, height).slice(mesh)
}
