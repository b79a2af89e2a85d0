use nalgebra::{Matrix3, Point3, Vector3};

/// Relative eigenvalue below which a neighbourhood is treated as a line or a point.
const DEGENERATE_RATIO: f64 = 1e-9;

/// k nearest neighbours of `points[i]` (itself included), brute force on squared L2.
fn knn(points: &[Point3<f64>], i: usize, k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let da = (points[a] - points[i]).norm_squared();
        let db = (points[b] - points[i]).norm_squared();
        da.total_cmp(&db)
    });
    order.truncate(k);
    order
}

/// Normal of the plane best fitting `neighbors`, or `None` when they do not span a plane.
fn fit_plane_normal(points: &[Point3<f64>], neighbors: &[usize]) -> Option<Vector3<f64>> {
    if neighbors.len() < 3 {
        return None;
    }
    let mean = neighbors
        .iter()
        .fold(Vector3::zeros(), |acc, &j| acc + points[j].coords)
        / neighbors.len() as f64;
    let covariance = neighbors.iter().fold(Matrix3::zeros(), |acc, &j| {
        let d = points[j].coords - mean;
        acc + d * d.transpose()
    });

    let eigen = covariance.symmetric_eigen();
    let mut order = [0, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let largest = eigen.eigenvalues[order[2]];
    if largest <= 0.0 || eigen.eigenvalues[order[1]] <= largest * DEGENERATE_RATIO {
        return None;
    }
    eigen
        .eigenvectors
        .column(order[0])
        .into_owned()
        .try_normalize(1e-12)
}

/// Estimate a unit normal at every point from the local shape of the cloud.
///
/// Each normal is the direction of least variance among the point's `k`
/// nearest neighbours, flipped to agree with `hints[i]` (typically the
/// interpolated mesh normal, which points outward). Where the neighbourhood
/// is degenerate the hint is used as-is.
pub fn estimate_normals(
    points: &[Point3<f64>],
    hints: &[Vector3<f64>],
    k: usize,
) -> Vec<Vector3<f64>> {
    debug_assert_eq!(points.len(), hints.len());
    (0..points.len())
        .map(|i| {
            let neighbors = knn(points, i, k);
            match fit_plane_normal(points, &neighbors) {
                Some(n) if n.dot(&hints[i]) < 0.0 => -n,
                Some(n) => n,
                None => hints[i],
            }
        })
        .collect()
}
