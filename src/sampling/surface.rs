use log::debug;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use rand_distr::Distribution;
use rand_distr::weighted::WeightedAliasIndex;

use super::CandidatePoint;
use super::normals::estimate_normals;
use crate::config::{check_count, check_distance};
use crate::error::{NbvError, Result};
use crate::mesh::Mesh;

/// A point on the mesh surface with the vertex normal interpolated at that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

/// Draws points uniformly over the surface area of a mesh: faces are picked
/// with probability proportional to their area, then a uniform barycentric
/// point is taken inside the face.
pub struct UniformSurfaceSampler<'a> {
    mesh: &'a Mesh,
    face_distribution: WeightedAliasIndex<f64>,
}

impl<'a> UniformSurfaceSampler<'a> {
    pub fn try_new(mesh: &'a Mesh) -> Result<Self> {
        let areas: Vec<f64> = (0..mesh.faces().len()).map(|f| mesh.face_area(f)).collect();
        if areas.iter().sum::<f64>() <= 0.0 {
            return Err(NbvError::ZeroAreaMesh);
        }
        let face_distribution = WeightedAliasIndex::new(areas)?;
        Ok(Self {
            mesh,
            face_distribution,
        })
    }
}

impl Distribution<SurfaceSample> for UniformSurfaceSampler<'_> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SurfaceSample {
        let face = self.face_distribution.sample(rng);
        let [v0, v1, v2] = self.mesh.triangle(face);
        let [i0, i1, i2] = self.mesh.faces()[face];
        let normals = self.mesh.normals();

        let r1: f64 = rng.random();
        let r2: f64 = rng.random();
        let (r1, r2) = if r1 + r2 > 1.0 {
            (1.0 - r1, 1.0 - r2)
        } else {
            (r1, r2)
        };
        let position = v0 + r1 * (v1 - v0) + r2 * (v2 - v0);

        let interpolated = (1.0 - r1 - r2) * normals[i0] + r1 * normals[i1] + r2 * normals[i2];
        let normal = interpolated
            .try_normalize(1e-12)
            .or_else(|| (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-12))
            .unwrap_or_else(Vector3::zeros);

        SurfaceSample { position, normal }
    }
}

/// Viewpoints that look back at the surface: `num_views` area-uniform surface
/// samples, each moved by `-normal * distance`.
///
/// Sampling is random. Pass a seeded generator for repeatable output; the
/// planner uses a fresh thread-local generator unless configured with a seed.
pub fn generate_normal_based_views<R: Rng + ?Sized>(
    mesh: &Mesh,
    num_views: usize,
    distance: f64,
    neighbors: usize,
    rng: &mut R,
) -> Result<Vec<CandidatePoint>> {
    check_count("normal views", num_views)?;
    check_count("normal neighbors", neighbors)?;
    check_distance("normal distance", distance)?;

    let sampler = UniformSurfaceSampler::try_new(mesh)?;
    let samples: Vec<SurfaceSample> = (0..num_views).map(|_| sampler.sample(rng)).collect();

    let points: Vec<Point3<f64>> = samples.iter().map(|s| s.position).collect();
    let hints: Vec<Vector3<f64>> = samples.iter().map(|s| s.normal).collect();
    let normals = estimate_normals(&points, &hints, neighbors);
    debug!("Sampled {} surface points", points.len());

    Ok(points
        .iter()
        .zip(&normals)
        .map(|(p, n)| *p - *n * distance)
        .collect())
}
