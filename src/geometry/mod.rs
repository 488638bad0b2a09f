// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh topology, slicing and capping

mod analytics;
mod bbox;
mod capper;
mod error;
mod id;
mod mesh;
mod primitives;
mod slicer;
mod topology;

pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use capper::{cap, BorderCapper};
pub use error::{MeshError, MeshResult};
pub use id::{FaceId, IdAllocator, VertexId};
pub use mesh::{Face, Mesh, Vertex};
pub use primitives::Primitive;
pub use slicer::{slice, Axis, ClipOutcome, NgonPolicy, PlaneSlicer, SliceReport, WELD_TOLERANCE};
