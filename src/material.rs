use crate::math::numbers::Float;

use num_traits::clamp;
use rand::Rng;

use std::fmt;

// Below this the phase function is treated as isotropic:
const ISOTROPIC_G: f64 = 1e-6;

// Optical properties of a homogeneous medium. All coefficients are in inverse
// length units of the geometry the material is assigned to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub mu_s: f64,
    pub mu_a: f64,
    pub g: f64,
    pub index: f64,
}

impl Material {
    pub fn new(mu_s: f64, mu_a: f64, g: f64, index: f64) -> Self {
        Material {
            mu_s: mu_s.max(0.),
            mu_a: mu_a.max(0.),
            g: clamp(g, -1., 1.),
            index,
        }
    }

    // A non-scattering, non-absorbing medium:
    pub fn vacuum(index: f64) -> Self {
        Material::new(0., 0., 0., index)
    }

    pub fn mu_t(&self) -> f64 {
        self.mu_s + self.mu_a
    }

    pub fn albedo(&self) -> f64 {
        let mu_t = self.mu_t();
        if mu_t == 0. {
            0.
        } else {
            self.mu_s / mu_t
        }
    }

    /// Fraction of the weight deposited at each interaction.
    pub fn absorbed_fraction(&self) -> f64 {
        if self.mu_t() == 0. {
            0.
        } else {
            1. - self.albedo()
        }
    }

    /// Samples a free path length from the exponential distribution. Returns
    /// infinity for a medium that neither scatters nor absorbs.
    pub fn sample_scattering_distance<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mu_t = self.mu_t();
        if mu_t == 0. {
            return f64::INFINITY;
        }
        // U in (0, 1] so the log stays finite:
        let u = 1. - rng.gen::<f64>();
        -u.ln() / mu_t
    }

    /// Samples (theta, phi) from the Henyey-Greenstein phase function.
    pub fn sample_scattering_angles<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        let phi = f64::two() * f64::PI * rng.gen::<f64>();
        let u = rng.gen::<f64>();
        let g = self.g;
        let theta = if g.abs() < ISOTROPIC_G {
            (2. * u - 1.).acos()
        } else {
            let temp = (1. - g * g) / (1. - g + 2. * g * u);
            let cos_theta = (1. + g * g - temp * temp) / (2. * g);
            clamp(cos_theta, -1., 1.).acos()
        };
        (theta, phi)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mu_s={:.4} mu_a={:.4} g={:.4} n={:.4}",
            self.mu_s, self.mu_a, self.g, self.index
        )
    }
}
