//! Error types for the planner.

use std::path::PathBuf;

use rand_distr::weighted::Error as WeightedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NbvError {
    /// The reference mesh asset does not exist.
    #[error("mesh asset {0} not found")]
    MeshNotFound(PathBuf),

    /// The reference mesh exists but could not be parsed.
    #[error("failed to read mesh {path}: {source}")]
    MeshRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An in-memory STL stream could not be parsed. File loads report
    /// [`NbvError::MeshRead`] with the path instead.
    #[error("failed to parse STL data: {0}")]
    MeshParse(#[source] std::io::Error),

    #[error("mesh has no vertices or no faces")]
    EmptyMesh,

    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteVertex(usize),

    /// All vertices collapse onto a single point, so there is no extent to scale by.
    #[error("mesh bounding box has zero extent")]
    ZeroExtentMesh,

    #[error("mesh has zero surface area")]
    ZeroAreaMesh,

    #[error("{what} must be at least 1, got {count}")]
    InvalidSampleCount { what: &'static str, count: usize },

    #[error("{what} must be finite and non-negative, got {value}")]
    InvalidDistance { what: &'static str, value: f64 },

    #[error("object pose has a non-finite coordinate: ({x}, {y}, {z})")]
    InvalidPose { x: f64, y: f64, z: f64 },

    #[error("scalar field {name} has {len} values for {points} points")]
    ScalarLength {
        name: &'static str,
        len: usize,
        points: usize,
    },

    #[error("surface sampling failed: {0}")]
    Sampling(#[from] WeightedError),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NbvError>;
