use crate::math::numbers::Float;
use crate::math::vector::{Vec2, Vec3};

pub fn uniform_sample_sphere<T: Float>(u: Vec2<T>) -> Vec3<T> {
    let z = T::one() - T::two() * u.x;
    let r = T::zero().max(T::one() - z * z).sqrt();
    let phi = T::two() * T::PI * u.y;
    Vec3 {
        x: r * phi.cos(),
        y: r * phi.sin(),
        z,
    }
}

/// Uniformly samples a direction inside a cone around +z with the given half angle.
pub fn uniform_sample_cone<T: Float>(u: Vec2<T>, cos_theta_max: T) -> Vec3<T> {
    let z = (T::one() - u.x) + u.x * cos_theta_max;
    let r = T::zero().max(T::one() - z * z).sqrt();
    let phi = T::two() * T::PI * u.y;
    Vec3 {
        x: r * phi.cos(),
        y: r * phi.sin(),
        z,
    }
}

pub fn concentric_sample_disk<T: Float>(u: Vec2<T>) -> Vec2<T> {
    // Map to [-1, 1]:
    let u_offset = u.scale(T::two()) - Vec2::one();
    if u_offset == Vec2::zero() {
        return Vec2::zero();
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, T::PI_OVER_4 * (u_offset.y / u_offset.x))
    } else {
        (
            u_offset.y,
            T::PI_OVER_2 - T::PI_OVER_4 * (u_offset.x / u_offset.y),
        )
    };

    Vec2 {
        x: r * theta.cos(),
        y: r * theta.sin(),
    }
}
