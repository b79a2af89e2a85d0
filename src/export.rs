//! Legacy ASCII VTK output, for looking at a candidate set in ParaView.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{NbvError, Result};
use crate::planner::NbvResponse;

/// One named value per point, written as a `POINT_DATA` scalar array.
#[derive(Clone, Debug, PartialEq)]
pub struct PointScalars {
    pub name: &'static str,
    pub values: Vec<f64>,
}

impl PointScalars {
    pub fn new(name: &'static str, values: Vec<f64>) -> Self {
        Self { name, values }
    }

    /// `source` (0 for sphere candidates, 1 for surface candidates),
    /// `azimuth` and `elevation` for every point of `response`.
    pub fn for_response(response: &NbvResponse, sphere_samples: usize) -> Vec<Self> {
        let points = &response.nbv_points;
        let source = (0..points.len())
            .map(|i| if i < sphere_samples { 0.0 } else { 1.0 })
            .collect();
        vec![
            Self::new("source", source),
            Self::new("azimuth", points.iter().map(|p| p.azimuth).collect()),
            Self::new("elevation", points.iter().map(|p| p.elevation).collect()),
        ]
    }
}

/// Write `points` as a VTK polydata vertex cloud, with optional per-point scalars.
pub fn write_vtk_legacy(
    points: &[Point3<f64>],
    scalars: &[PointScalars],
    path: &Path,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_vtk(points, scalars, &mut out)?;
    out.flush()?;
    Ok(())
}

pub fn write_vtk<W: Write>(
    points: &[Point3<f64>],
    scalars: &[PointScalars],
    out: &mut W,
) -> Result<()> {
    let n = points.len();
    if let Some(bad) = scalars.iter().find(|s| s.values.len() != n) {
        return Err(NbvError::ScalarLength {
            name: bad.name,
            len: bad.values.len(),
            points: n,
        });
    }

    write!(
        out,
        "# vtk DataFile Version 3.0\nNBV candidates\nASCII\nDATASET POLYDATA\nPOINTS {n} double\n"
    )?;
    for p in points {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    writeln!(out, "VERTICES {n} {}", 2 * n)?;
    for i in 0..n {
        writeln!(out, "1 {i}")?;
    }

    if scalars.is_empty() {
        return Ok(());
    }
    writeln!(out, "POINT_DATA {n}")?;
    for field in scalars {
        writeln!(out, "SCALARS {} double 1\nLOOKUP_TABLE default", field.name)?;
        for v in &field.values {
            writeln!(out, "{v}")?;
        }
    }
    Ok(())
}
