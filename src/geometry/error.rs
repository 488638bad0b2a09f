// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh editing operations

use super::{FaceId, VertexId};
use thiserror::Error;

/// Errors raised by mesh construction, slicing and capping.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// A coordinate was NaN or infinite.
    #[error("Invalid geometry: coordinate ({x}, {y}, {z}) is not finite")]
    InvalidGeometry { x: f64, y: f64, z: f64 },

    /// A face could not be built from the given vertices.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A vertex id that is not (or no longer) part of the mesh.
    #[error("Unknown vertex {0}")]
    UnknownVertex(VertexId),

    /// A face id that is not (or no longer) part of the mesh.
    #[error("Unknown face {0}")]
    UnknownFace(FaceId),

    /// An explicit id was requested that has already been issued.
    #[error("Id {0} is already in use")]
    DuplicateId(u64),

    /// The border walk around a cut could not be closed.
    #[error("Degenerate cap: {0}")]
    DegenerateCap(String),
}

/// Result type for mesh operations.
pub type MeshResult<T> = std::result::Result<T, MeshError>;
