mod normalize;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::info;
use nalgebra::{Point3, Vector3};
use stl_io::IndexedMesh;

use crate::error::{NbvError, Result};

pub use normalize::normalize;

/// An indexed triangle mesh with per-vertex normals.
///
/// Construction validates the face indices and computes the vertex normals, so
/// every `Mesh` can be sampled without further checks. Nothing mutates a mesh
/// after construction; a canonical mesh is built once and shared by reference.
#[derive(Clone, Debug)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    normals: Vec<Vector3<f64>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if vertices.is_empty() || faces.is_empty() {
            return Err(NbvError::EmptyMesh);
        }
        if let Some(i) = vertices
            .iter()
            .position(|v| !v.coords.iter().all(|c| c.is_finite()))
        {
            return Err(NbvError::NonFiniteVertex(i));
        }
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(NbvError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        let normals = vertex_normals(&vertices, &faces);
        Ok(Self {
            vertices,
            faces,
            normals,
        })
    }

    pub fn from_stl(mesh: IndexedMesh) -> Result<Self> {
        let vertices = mesh
            .vertices
            .iter()
            .map(|v| Point3::new(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64))
            .collect();
        let faces = mesh.faces.iter().map(|f| f.vertices).collect();
        Self::new(vertices, faces)
    }

    /// Parse a binary or ASCII STL stream. A malformed stream is
    /// [`NbvError::MeshParse`].
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Self::from_stl(stl_io::read_stl(reader).map_err(NbvError::MeshParse)?)
    }

    /// Load an STL file as-is, without normalizing it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NbvError::MeshNotFound(path.to_path_buf()));
        }
        info!("Loading mesh from: {}", path.display());

        let read_err = |source: std::io::Error| NbvError::MeshRead {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = BufReader::new(File::open(path).map_err(read_err)?);
        let stl = stl_io::read_stl(&mut reader).map_err(read_err)?;

        let mesh = Self::from_stl(stl)?;
        info!(
            "Loaded {} vertices, {} faces",
            mesh.vertices.len(),
            mesh.faces.len()
        );
        Ok(mesh)
    }

    /// Load an STL file and bring it into the canonical frame: centered, unit extent.
    pub fn load_canonical<P: AsRef<Path>>(path: P) -> Result<Self> {
        normalize(Self::load(path)?)
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Unit vertex normals. Vertices touched only by degenerate faces have a zero normal.
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn triangle(&self, face: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[face];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    pub fn face_area(&self, face: usize) -> f64 {
        let [v0, v1, v2] = self.triangle(face);
        (v1 - v0).cross(&(v2 - v0)).norm() * 0.5
    }

    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }

    /// Mean of the vertex positions.
    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let first = self.vertices[0];
        self.vertices
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.inf(v), hi.sup(v)))
    }

    pub fn extent(&self) -> Vector3<f64> {
        let (lo, hi) = self.bounding_box();
        hi - lo
    }

    /// Swap in moved vertex positions, keeping faces and normals. Only valid for
    /// translations and uniform positive scales, which leave normals unchanged.
    fn with_vertices(self, vertices: Vec<Point3<f64>>) -> Self {
        debug_assert_eq!(vertices.len(), self.vertices.len());
        Self { vertices, ..self }
    }
}

/// Area-weighted vertex normals: each face adds its unnormalized cross product
/// to its three corners.
fn vertex_normals(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];
    for &[a, b, c] in faces {
        let n = (vertices[b] - vertices[a]).cross(&(vertices[c] - vertices[a]));
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    for n in &mut normals {
        if let Some(unit) = n.try_normalize(1e-12) {
            *n = unit;
        }
    }
    normals
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use super::*;

    /// Axis-aligned box with one corner at `origin`, faces wound counter-clockwise
    /// seen from outside.
    pub(crate) fn cuboid(origin: Point3<f64>, size: Vector3<f64>) -> Mesh {
        let vertices = (0..8)
            .map(|i| {
                let corner = Vector3::new(
                    [0.0, 1.0, 1.0, 0.0][i % 4],
                    [0.0, 0.0, 1.0, 1.0][i % 4],
                    (i / 4) as f64,
                );
                origin + corner.component_mul(&size)
            })
            .collect();
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Mesh::new(vertices, faces).unwrap()
    }

    #[test]
    fn cube_normals_point_outward() {
        let mesh = cuboid(Point3::new(-0.5, -0.5, -0.5), Vector3::repeat(1.0));
        for (v, n) in mesh.vertices().iter().zip(mesh.normals()) {
            assert!((n.norm() - 1.0).abs() < 1e-12);
            assert!(v.coords.dot(n) > 0.0, "normal {n:?} at {v:?} points inward");
        }
    }

    #[test]
    fn cube_area_and_bounds() {
        let mesh = cuboid(Point3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 1.0, 1.0));
        assert!((mesh.surface_area() - 10.0).abs() < 1e-12);
        let (lo, hi) = mesh.bounding_box();
        assert_eq!(lo, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(hi, Point3::new(3.0, 3.0, 4.0));
        assert_eq!(mesh.centroid(), Point3::new(2.0, 2.5, 3.5));
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(matches!(
            Mesh::new(vec![], vec![]),
            Err(NbvError::EmptyMesh)
        ));
        let tri = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert!(matches!(
            Mesh::new(tri.clone(), vec![[0, 1, 3]]),
            Err(NbvError::FaceIndexOutOfRange { face: 0, index: 3, vertex_count: 3 })
        ));
        let mut nan = tri;
        nan[1].y = f64::NAN;
        assert!(matches!(
            Mesh::new(nan, vec![[0, 1, 2]]),
            Err(NbvError::NonFiniteVertex(1))
        ));
    }

    #[test]
    fn missing_asset_is_not_found() {
        let err = Mesh::load("does/not/exist.stl").unwrap_err();
        assert!(matches!(err, NbvError::MeshNotFound(_)));
    }

    #[test]
    fn stl_round_trip_through_file() {
        let v = |x: f32, y: f32, z: f32| stl_io::Vertex::new([x, y, z]);
        let triangles = [
            stl_io::Triangle {
                normal: stl_io::Normal::new([0.0, 0.0, 1.0]),
                vertices: [v(0.0, 0.0, 0.0), v(2.0, 0.0, 0.0), v(2.0, 2.0, 0.0)],
            },
            stl_io::Triangle {
                normal: stl_io::Normal::new([0.0, 0.0, 1.0]),
                vertices: [v(0.0, 0.0, 0.0), v(2.0, 2.0, 0.0), v(0.0, 2.0, 0.0)],
            },
        ];
        let mut bytes = Cursor::new(Vec::new());
        stl_io::write_stl(&mut bytes, triangles.iter()).unwrap();

        let path = std::env::temp_dir().join(format!("nbv-mesh-{}.stl", std::process::id()));
        std::fs::write(&path, bytes.into_inner()).unwrap();
        let mesh = Mesh::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.faces().len(), 2);
        assert!((mesh.surface_area() - 4.0).abs() < 1e-9);
        for n in mesh.normals() {
            assert!((n - Vector3::z()).norm() < 1e-12);
        }
    }

    #[test]
    fn ascii_stl_from_memory() {
        let text = "solid t\n\
            facet normal 0 0 1\n outer loop\n\
            vertex 0 0 0\n vertex 1 0 0\n vertex 0 1 0\n\
            endloop\n endfacet\nendsolid t\n";
        let mesh = Mesh::from_reader(&mut Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(mesh.faces().len(), 1);
        assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn garbage_file_is_read_error() {
        let path = std::env::temp_dir().join(format!("nbv-garbage-{}.stl", std::process::id()));
        std::fs::write(&path, b"not an stl").unwrap();
        let err = Mesh::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, NbvError::MeshRead { .. }));
    }

    #[test]
    fn garbage_stream_is_parse_error() {
        let err = Mesh::from_reader(&mut Cursor::new(b"not an stl".to_vec())).unwrap_err();
        assert!(matches!(err, NbvError::MeshParse(_)), "{err:?}");
        assert!(err.to_string().starts_with("failed to parse STL data"));
    }
}
