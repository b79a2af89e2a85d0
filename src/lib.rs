//! Next-best-view candidate generation around a known object.
//!
//! A reference mesh is loaded once and normalized into a canonical frame
//! ([`mesh`]). For every request the [`planner::ViewPlanner`] combines a
//! golden-angle sphere of viewpoints with viewpoints stepped off the mesh
//! surface along its normals ([`sampling`]), moves them to the object's world
//! position and attaches azimuth/elevation angles.

pub mod config;
pub mod error;
pub mod export;
pub mod mesh;
pub mod planner;
pub mod sampling;

pub use config::PlannerConfig;
pub use error::{NbvError, Result};
pub use mesh::Mesh;
pub use planner::{NbvPoint, NbvResponse, ObjectPose, ViewPlanner};
