use crate::geometry::GeometryId;
use crate::math::util::{align, reflect, refract};
use crate::math::vector::Vec3d;

use num_traits::clamp;
use rand::Rng;

// Computes the unpolarized Fresnel reflectance for light travelling from a medium
// with index n1 into one with index n2. cos_theta_i is measured against the normal.
pub fn reflectance(cos_theta_i: f64, n1: f64, n2: f64) -> f64 {
    let cos_theta_i = clamp(cos_theta_i.abs(), 0., 1.);
    if n1 == n2 {
        return 0.;
    }

    // This is just the identity: cos^2 + sin^2 = 1
    let sin_theta_i = (1. - cos_theta_i * cos_theta_i).max(0.).sqrt();
    // Snell's law:
    let sin_theta_t = n1 / n2 * sin_theta_i;
    // Total internal reflection:
    if sin_theta_t > 1. {
        return 1.;
    }
    let cos_theta_t = (1. - sin_theta_t * sin_theta_t).max(0.).sqrt();

    let denom_s = n1 * cos_theta_i + n2 * cos_theta_t;
    let denom_p = n1 * cos_theta_t + n2 * cos_theta_i;
    // Grazing incidence:
    if denom_s == 0. || denom_p == 0. {
        return 1.;
    }
    let refl_s = (n1 * cos_theta_i - n2 * cos_theta_t) / denom_s;
    let refl_p = (n1 * cos_theta_t - n2 * cos_theta_i) / denom_p;

    // Average the result as we are dealing with unpolarized light:
    clamp(0.5 * (refl_s * refl_s + refl_p * refl_p), 0., 1.)
}

// Everything needed to decide what happens to a photon hitting a surface.
#[derive(Clone, Copy, Debug)]
pub struct FresnelIntersect {
    // Direction of the incoming photon:
    pub direction: Vec3d,
    // Outward normal of the surface:
    pub normal: Vec3d,
    pub geometry: GeometryId,
    pub surface: usize,
    pub distance: f64,
    // Index on the side the photon comes from and the one it goes to:
    pub index_in: f64,
    pub index_out: f64,
}

impl FresnelIntersect {
    pub fn cos_incidence(&self) -> f64 {
        self.direction.dot(self.normal).abs()
    }

    pub fn reflectance(&self) -> f64 {
        reflectance(self.cos_incidence(), self.index_in, self.index_out)
    }

    pub fn is_reflected<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let r = self.reflectance();
        if r >= 1. {
            return true;
        }
        rng.gen::<f64>() < r
    }

    pub fn reflected_direction(&self) -> Vec3d {
        reflect(-self.direction, self.normal)
    }

    // Falls back to reflection when refraction is impossible.
    pub fn refracted_direction(&self) -> Vec3d {
        let wi = -self.direction;
        let n = align(wi, self.normal);
        match refract(wi, n, self.index_in / self.index_out) {
            Some(t) => t.normalize(),
            None => self.reflected_direction(),
        }
    }
}
