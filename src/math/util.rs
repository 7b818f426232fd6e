use crate::math::numbers::Float;
use crate::math::vector::Vec3;

// This creates a coordinate system given only a single vector.
pub fn coord_system<T: Float>(v1: Vec3<T>) -> (Vec3<T>, Vec3<T>) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vec3 {
            x: -v1.z,
            y: T::zero(),
            z: v1.x,
        }
    } else {
        Vec3 {
            x: T::zero(),
            y: v1.z,
            z: -v1.y,
        }
    }
    .normalize();

    let v3 = v1.cross(v2);

    (v2, v3)
}

// Aligns a vector vec so that it faces the same direction as the refv vector
// by negating or not negating it.
pub fn align<T: Float>(refv: Vec3<T>, vec: Vec3<T>) -> Vec3<T> {
    if refv.dot(vec) < T::zero() {
        -vec
    } else {
        vec
    }
}

// wo points away from the surface (towards where the light came from):
pub fn reflect<T: Float>(wo: Vec3<T>, n: Vec3<T>) -> Vec3<T> {
    -wo + n.scale(T::two() * wo.dot(n))
}

// wi points away from the surface, n is on the same side as wi and eta = eta_i / eta_t.
// Returns None on total internal reflection.
pub fn refract<T: Float>(wi: Vec3<T>, n: Vec3<T>, eta: T) -> Option<Vec3<T>> {
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = T::zero().max(T::one() - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= T::one() {
        return None;
    }
    let cos_theta_t = (T::one() - sin2_theta_t).sqrt();
    Some((-wi).scale(eta) + n.scale(cos_theta_i * eta - cos_theta_t))
}
