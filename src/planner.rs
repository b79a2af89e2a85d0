use log::{debug, info};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::error::{NbvError, Result};
use crate::mesh::Mesh;
use crate::sampling::{CandidatePoint, fibonacci_sphere, generate_normal_based_views};

/// World-space position of the observed object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ObjectPose {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return Err(NbvError::InvalidPose {
                x: self.x,
                y: self.y,
                z: self.z,
            });
        }
        Ok(())
    }
}

/// A candidate viewpoint in world space, with its direction from the object
/// center in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NbvPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// In (-180, 180], measured in the xy plane from +x towards +y.
    pub azimuth: f64,
    /// In [-90, 90], positive towards +z.
    pub elevation: f64,
}

impl NbvPoint {
    pub fn from_world(world: Point3<f64>, center: Point3<f64>) -> Self {
        let (azimuth, elevation) = azimuth_elevation(&(world - center));
        Self {
            x: world.x,
            y: world.y,
            z: world.z,
            azimuth,
            elevation,
        }
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Azimuth and elevation of `rel` in degrees.
///
/// A zero vector has no direction and reports `(0, 0)`. `atan2` can return
/// -180 for vectors on the negative x axis; that is folded to 180.
pub fn azimuth_elevation(rel: &Vector3<f64>) -> (f64, f64) {
    let largest = rel.amax();
    if largest == 0.0 {
        return (0.0, 0.0);
    }
    // Rescaled so the horizontal length cannot overflow.
    let dir = rel / largest;
    let mut azimuth = dir.y.atan2(dir.x).to_degrees();
    if azimuth <= -180.0 {
        azimuth = 180.0;
    }
    let elevation = dir.z.atan2(dir.x.hypot(dir.y)).to_degrees();
    (azimuth.min(180.0), elevation.clamp(-90.0, 90.0))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NbvResponse {
    /// Sphere candidates first, then surface-normal candidates.
    pub nbv_points: Vec<NbvPoint>,
}

impl NbvResponse {
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.nbv_points.iter().map(NbvPoint::position).collect()
    }
}

/// Owns the canonical mesh and the sampling parameters.
///
/// Planning only reads the mesh, so one planner can serve any number of
/// threads through `&ViewPlanner` or an `Arc`.
#[derive(Clone, Debug)]
pub struct ViewPlanner {
    mesh: Mesh,
    config: PlannerConfig,
}

impl ViewPlanner {
    /// `mesh` is expected to be canonical already; see [`crate::mesh::normalize`].
    pub fn new(mesh: Mesh, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { mesh, config })
    }

    /// Load and normalize the mesh named by the config.
    pub fn from_config(config: PlannerConfig) -> Result<Self> {
        let mesh = Mesh::load_canonical(&config.mesh_path)?;
        let planner = Self::new(mesh, config)?;
        info!(
            "Planner ready: {} sphere + {} surface candidates per request",
            planner.config.sphere_samples, planner.config.normal_views
        );
        Ok(planner)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Candidate viewpoints around the canonical mesh, before any pose is applied.
    pub fn candidates<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<CandidatePoint>> {
        let config = &self.config;
        let mut candidates = fibonacci_sphere(config.sphere_samples, config.sphere_radius)?;
        candidates.extend(generate_normal_based_views(
            &self.mesh,
            config.normal_views,
            config.normal_distance,
            config.normal_neighbors,
            rng,
        )?);
        Ok(candidates)
    }

    /// Plan with the configured randomness: seeded if the config has a seed,
    /// otherwise fresh for every call.
    pub fn plan_next_best_view(&self, pose: &ObjectPose) -> Result<NbvResponse> {
        match self.config.seed {
            Some(seed) => self.plan_with_rng(pose, &mut StdRng::seed_from_u64(seed)),
            None => self.plan_with_rng(pose, &mut rand::rng()),
        }
    }

    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        pose: &ObjectPose,
        rng: &mut R,
    ) -> Result<NbvResponse> {
        pose.validate()?;
        let center = pose.position();
        let nbv_points: Vec<NbvPoint> = self
            .candidates(rng)?
            .into_iter()
            .map(|c| NbvPoint::from_world(c + center.coords, center))
            .collect();
        debug!("Planned {} candidates around {center}", nbv_points.len());
        Ok(NbvResponse { nbv_points })
    }
}
