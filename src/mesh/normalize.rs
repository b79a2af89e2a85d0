use log::{debug, info};
use nalgebra::Point3;
use ndarray::{Array2, Axis};

use super::Mesh;
use crate::error::{NbvError, Result};

/// Center the mesh on its vertex centroid and scale it so that the largest
/// bounding-box side is exactly 1.
pub fn normalize(mesh: Mesh) -> Result<Mesh> {
    let n_vertices = mesh.vertices().len();
    let coords: Vec<f64> = mesh
        .vertices()
        .iter()
        .flat_map(|v| [v.x, v.y, v.z])
        .collect();
    let mut cloud = Array2::from_shape_vec((n_vertices, 3), coords)?;

    // Center
    let centroid = cloud.mean_axis(Axis(0)).ok_or(NbvError::EmptyMesh)?;
    cloud -= &centroid;

    // Scale
    let max = cloud.fold_axis(Axis(0), f64::NEG_INFINITY, |&m, &c| m.max(c));
    let min = cloud.fold_axis(Axis(0), f64::INFINITY, |&m, &c| m.min(c));
    let max_extent = (&max - &min).fold(0.0f64, |m, &e| m.max(e));
    if max_extent <= 0.0 {
        return Err(NbvError::ZeroExtentMesh);
    }
    let scale = 1.0 / max_extent;
    cloud *= scale;
    debug!("Centroid {centroid}, max extent {max_extent}");
    info!("Normalized mesh with scale {scale}");

    let vertices = cloud
        .rows()
        .into_iter()
        .map(|r| Point3::new(r[0], r[1], r[2]))
        .collect();
    Ok(mesh.with_vertices(vertices))
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::mesh::tests::cuboid;

    #[test]
    fn extent_two_becomes_unit_and_centered() {
        let mesh = cuboid(Point3::new(3.0, -1.0, 7.0), Vector3::new(2.0, 1.0, 0.5));
        assert_eq!(mesh.extent().max(), 2.0);

        let canonical = normalize(mesh).unwrap();
        assert!((canonical.extent().max() - 1.0).abs() < 1e-12);
        assert!(canonical.centroid().coords.norm() < 1e-12);
        let extent = canonical.extent();
        assert!((extent.x - 1.0).abs() < 1e-12);
        assert!((extent.y - 0.5).abs() < 1e-12);
        assert!((extent.z - 0.25).abs() < 1e-12);
    }

    #[test]
    fn normals_survive_normalization() {
        let mesh = cuboid(Point3::new(10.0, 10.0, 10.0), Vector3::repeat(4.0));
        let before = mesh.normals().to_vec();
        let canonical = normalize(mesh).unwrap();
        assert_eq!(canonical.normals(), before.as_slice());
        assert_eq!(canonical.faces().len(), 12);
    }

    #[test]
    fn collapsed_mesh_is_rejected() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let mesh = Mesh::new(vec![p, p, p], vec![[0, 1, 2]]).unwrap();
        assert!(matches!(normalize(mesh), Err(NbvError::ZeroExtentMesh)));
    }
}
