//! Candidate viewpoint generators. Both work in the canonical mesh frame; the
//! planner moves their output into world space.

mod normals;
mod sphere;
mod surface;

use nalgebra::Point3;

pub use normals::estimate_normals;
pub use sphere::fibonacci_sphere;
pub use surface::{SurfaceSample, UniformSurfaceSampler, generate_normal_based_views};

/// A sampled viewpoint position before the object pose is applied.
pub type CandidatePoint = Point3<f64>;
