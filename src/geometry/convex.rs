use crate::geometry::Shape;
use crate::math::vector::{Vec3, Vec3d};
use crate::surface::Surface;

use simple_error::{bail, SimpleResult};

// A closed convex volume bounded by triangles. The exit search is the generic
// bisection: the mesh only knows how to answer `contains`.
#[derive(Clone, Debug)]
pub struct ConvexMesh {
    vertices: Vec<Vec3d>,
    faces: Vec<[usize; 3]>,
    centroid: Vec3d,
    // One (point, outward normal) pair per face:
    planes: Vec<(Vec3d, Vec3d)>,
}

impl ConvexMesh {
    pub fn new(vertices: Vec<Vec3d>, faces: Vec<[usize; 3]>) -> SimpleResult<Self> {
        if vertices.len() < 4 || faces.len() < 4 {
            bail!("A closed mesh needs at least 4 vertices and 4 faces");
        }
        if let Some(face) = faces.iter().find(|f| f.iter().any(|&i| i >= vertices.len())) {
            bail!("Face {:?} refers to a missing vertex", face);
        }

        let centroid = vertices
            .iter()
            .fold(Vec3::zero(), |acc, &v| acc + v)
            .scale(1. / vertices.len() as f64);

        let mut planes = Vec::with_capacity(faces.len());
        for face in faces.iter() {
            let a = vertices[face[0]];
            let normal = match (vertices[face[1]] - a).cross(vertices[face[2]] - a).try_normalize() {
                Some(n) => n,
                None => bail!("Face {:?} is degenerate", face),
            };
            let normal = if (a - centroid).dot(normal) < 0. {
                -normal
            } else {
                normal
            };
            planes.push((a, normal));
        }

        Ok(ConvexMesh {
            vertices,
            faces,
            centroid,
            planes,
        })
    }

    // Vertices on the axes at the given distance from the origin:
    pub fn octahedron(radius: f64) -> Self {
        let r = radius;
        let vertices = vec![
            Vec3::new(r, 0., 0.),
            Vec3::new(-r, 0., 0.),
            Vec3::new(0., r, 0.),
            Vec3::new(0., -r, 0.),
            Vec3::new(0., 0., r),
            Vec3::new(0., 0., -r),
        ];
        let mut faces = Vec::with_capacity(8);
        for &x in &[0, 1] {
            for &y in &[2, 3] {
                for &z in &[4, 5] {
                    faces.push([x, y, z]);
                }
            }
        }
        ConvexMesh {
            centroid: Vec3::zero(),
            planes: faces
                .iter()
                .map(|f| {
                    let n = (vertices[f[0]] + vertices[f[1]] + vertices[f[2]]).normalize();
                    (vertices[f[0]], n)
                })
                .collect(),
            vertices,
            faces,
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

impl Shape for ConvexMesh {
    fn contains(&self, position: Vec3d) -> bool {
        self.planes
            .iter()
            .all(|&(point, normal)| (position - point).dot(normal) <= 0.)
    }

    fn boundary(&self) -> Vec<Surface> {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| {
                Surface::triangle(
                    self.vertices[f[0]],
                    self.vertices[f[1]],
                    self.vertices[f[2]],
                    &format!("Face {}", i),
                )
                .facing_away_from(self.centroid)
            })
            .collect()
    }

    fn center(&self) -> Vec3d {
        self.centroid
    }
}
