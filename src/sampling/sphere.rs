use std::f64::consts::PI;

use nalgebra::Point3;

use super::CandidatePoint;
use crate::config::{check_count, check_distance};
use crate::error::Result;

/// Golden-angle spiral on a sphere of `radius` around the origin.
///
/// Points run from the north pole (`y = radius`) to the south pole in index
/// order. A single sample is placed at the north pole.
pub fn fibonacci_sphere(samples: usize, radius: f64) -> Result<Vec<CandidatePoint>> {
    check_count("sphere samples", samples)?;
    check_distance("sphere radius", radius)?;
    if samples == 1 {
        return Ok(vec![Point3::new(0.0, radius, 0.0)]);
    }

    let phi = PI * (3.0 - 5.0f64.sqrt());
    let last = (samples - 1) as f64;
    let points = (0..samples)
        .map(|i| {
            let y = 1.0 - (i as f64 / last) * 2.0;
            let r = (1.0 - y * y).sqrt();
            let theta = phi * i as f64;
            Point3::new(theta.cos() * r, y, theta.sin() * r) * radius
        })
        .collect();
    Ok(points)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::error::NbvError;

    #[test]
    fn eight_points_on_half_unit_sphere() {
        let points = fibonacci_sphere(8, 0.5).unwrap();
        assert_eq!(points.len(), 8);
        assert_eq!(points[0], Point3::new(0.0, 0.5, 0.0));
        assert!((points[7].y + 0.5).abs() < 1e-15);
        for p in &points {
            assert!((p.coords.norm() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn latitudes_are_evenly_spaced() {
        let points = fibonacci_sphere(5, 1.0).unwrap();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        for (y, expected) in ys.iter().zip([1.0, 0.5, 0.0, -0.5, -1.0]) {
            assert!((y - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn single_sample_sits_at_pole() {
        assert_eq!(
            fibonacci_sphere(1, 2.0).unwrap(),
            vec![Point3::new(0.0, 2.0, 0.0)]
        );
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            fibonacci_sphere(0, 1.0),
            Err(NbvError::InvalidSampleCount { count: 0, .. })
        ));
        assert!(matches!(
            fibonacci_sphere(8, -1.0),
            Err(NbvError::InvalidDistance { .. })
        ));
        assert!(fibonacci_sphere(8, f64::INFINITY).is_err());
    }

    proptest! {
        #[test]
        fn points_lie_on_sphere(samples in 2usize..500, radius in 0.0f64..100.0) {
            let points = fibonacci_sphere(samples, radius).unwrap();
            prop_assert_eq!(points.len(), samples);
            for p in &points {
                prop_assert!((p.coords.norm() - radius).abs() <= 1e-9 * radius.max(1.0));
            }
        }

        #[test]
        fn deterministic(samples in 1usize..200, radius in 0.0f64..10.0) {
            let a = fibonacci_sphere(samples, radius).unwrap();
            let b = fibonacci_sphere(samples, radius).unwrap();
            let bits = |ps: &[Point3<f64>]| -> Vec<u64> {
                ps.iter().flat_map(|p| p.coords.iter().map(|c| c.to_bits()).collect::<Vec<_>>()).collect()
            };
            prop_assert_eq!(bits(a.as_slice()), bits(b.as_slice()));
        }
    }
}
