use crate::math::vector::Vec3d;

// Points closer to a surface than this are on it:
pub const SURFACE_TOLERANCE: f64 = 1e-4;
// Rays this close to parallel never hit:
const PARALLEL_EPSILON: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    // An infinite plane through a point:
    Plane { point: Vec3d },
    // corner + s * u + t * v for s, t in [0, 1]:
    Parallelogram { corner: Vec3d, u: Vec3d, v: Vec3d },
    Triangle { a: Vec3d, b: Vec3d, c: Vec3d },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Inside,
    Outside,
    OnBoundary,
}

// A boundary element of a geometry. The normal always points from the inside
// of the owning geometry to the outside.
#[derive(Clone, Debug)]
pub struct Surface {
    pub primitive: Primitive,
    pub normal: Vec3d,
    pub label: String,
    pub index_inside: f64,
    pub index_outside: f64,
}

impl Surface {
    fn from_primitive(primitive: Primitive, normal: Vec3d, label: &str) -> Self {
        Surface {
            primitive,
            normal,
            label: label.to_string(),
            index_inside: 1.,
            index_outside: 1.,
        }
    }

    pub fn plane(point: Vec3d, normal: Vec3d, label: &str) -> Self {
        Surface::from_primitive(Primitive::Plane { point }, normal.normalize(), label)
    }

    // The normal follows the right hand rule: u x v.
    pub fn parallelogram(corner: Vec3d, u: Vec3d, v: Vec3d, label: &str) -> Self {
        Surface::from_primitive(
            Primitive::Parallelogram { corner, u, v },
            u.cross(v).normalize(),
            label,
        )
    }

    // The normal follows the winding: (b - a) x (c - a).
    pub fn triangle(a: Vec3d, b: Vec3d, c: Vec3d, label: &str) -> Self {
        Surface::from_primitive(
            Primitive::Triangle { a, b, c },
            (b - a).cross(c - a).normalize(),
            label,
        )
    }

    // Flips the normal if needed so that it points away from the given interior point:
    pub fn facing_away_from(mut self, interior: Vec3d) -> Self {
        if (self.anchor() - interior).dot(self.normal) < 0. {
            self.normal = -self.normal;
            self.primitive = match self.primitive {
                Primitive::Triangle { a, b, c } => Primitive::Triangle { a, b: c, c: b },
                Primitive::Parallelogram { corner, u, v } => Primitive::Parallelogram {
                    corner,
                    u: v,
                    v: u,
                },
                plane => plane,
            };
        }
        self
    }

    /// A point on the primitive, roughly in its middle.
    pub fn anchor(&self) -> Vec3d {
        match self.primitive {
            Primitive::Plane { point } => point,
            Primitive::Parallelogram { corner, u, v } => corner + (u + v).scale(0.5),
            Primitive::Triangle { a, b, c } => (a + b + c).scale(1. / 3.),
        }
    }

    fn origin(&self) -> Vec3d {
        match self.primitive {
            Primitive::Plane { point } => point,
            Primitive::Parallelogram { corner, .. } => corner,
            Primitive::Triangle { a, .. } => a,
        }
    }

    pub fn signed_distance(&self, point: Vec3d) -> f64 {
        (point - self.origin()).dot(self.normal)
    }

    pub fn classify(&self, point: Vec3d) -> Side {
        let d = self.signed_distance(point);
        if d > SURFACE_TOLERANCE {
            Side::Outside
        } else if d < -SURFACE_TOLERANCE {
            Side::Inside
        } else {
            Side::OnBoundary
        }
    }

    // Solves p = origin + s * e0 + t * e1 in the least squares sense. Returns
    // None for degenerate edges.
    fn edge_coords(origin: Vec3d, e0: Vec3d, e1: Vec3d, p: Vec3d) -> Option<(f64, f64)> {
        let w = p - origin;
        let a = e0.dot(e0);
        let b = e0.dot(e1);
        let c = e1.dot(e1);
        let det = a * c - b * b;
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let d = w.dot(e0);
        let e = w.dot(e1);
        Some(((c * d - b * e) / det, (a * e - b * d) / det))
    }

    // Whether a point already known to be on the plane lies within the primitive:
    fn within_extent(&self, point: Vec3d) -> bool {
        match self.primitive {
            Primitive::Plane { .. } => true,
            Primitive::Parallelogram { corner, u, v } => {
                match Surface::edge_coords(corner, u, v, point) {
                    Some((s, t)) => {
                        let ts = SURFACE_TOLERANCE / u.length();
                        let tt = SURFACE_TOLERANCE / v.length();
                        s >= -ts && s <= 1. + ts && t >= -tt && t <= 1. + tt
                    }
                    None => false,
                }
            }
            Primitive::Triangle { a, b, c } => {
                let e0 = b - a;
                let e1 = c - a;
                match Surface::edge_coords(a, e0, e1, point) {
                    Some((s, t)) => {
                        let tol = SURFACE_TOLERANCE / e0.length().min(e1.length());
                        s >= -tol && t >= -tol && s + t <= 1. + tol
                    }
                    None => false,
                }
            }
        }
    }

    /// True when the point lies on the surface within tolerance.
    pub fn contains(&self, point: Vec3d) -> bool {
        self.classify(point) == Side::OnBoundary && self.within_extent(point)
    }

    /// Distance along the ray to the primitive, if it is hit within max_distance.
    pub fn intersect(&self, origin: Vec3d, direction: Vec3d, max_distance: f64) -> Option<f64> {
        let denom = direction.dot(self.normal);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.origin() - origin).dot(self.normal) / denom;
        if t < 0. || t > max_distance || !t.is_finite() {
            return None;
        }
        if self.within_extent(origin + direction.scale(t)) {
            Some(t)
        } else {
            None
        }
    }
}
