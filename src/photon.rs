use crate::fresnel::FresnelIntersect;
use crate::geometry::GeometryId;
use crate::math::vector::Vec3d;
use crate::scorer::ScorePoint;

use rand::Rng;

// Russian roulette settings. A photon whose weight drops below the threshold
// survives with the given chance and has its weight boosted to compensate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Roulette {
    pub threshold: f64,
    pub chance: f64,
}

impl Default for Roulette {
    fn default() -> Self {
        Roulette {
            threshold: 1e-4,
            chance: 0.1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Photon {
    // Position, in the frame of the current geometry if there is one:
    pub r: Vec3d,
    // Direction of propagation:
    pub ez: Vec3d,
    // Azimuth reference, always perpendicular to ez:
    pub er: Vec3d,
    pub weight: f64,
    pub alive: bool,
    pub geometry: Option<GeometryId>,
}

impl Photon {
    pub fn new(position: Vec3d, direction: Vec3d) -> Self {
        let ez = direction.normalize();
        Photon {
            r: position,
            ez,
            er: ez.any_perpendicular(),
            weight: 1.,
            alive: true,
            geometry: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn move_by(&mut self, distance: f64) {
        self.r += self.ez.scale(distance);
    }

    // Rotates er around ez by phi, then ez around the new er by theta:
    pub fn scatter_by(&mut self, theta: f64, phi: f64) {
        self.er = self.er.rotate_around(self.ez, phi).normalize();
        self.ez = self.ez.rotate_around(self.er, theta).normalize();
    }

    fn set_direction(&mut self, ez: Vec3d) {
        self.ez = ez.normalize();
        // Keep er perpendicular to the new direction:
        self.er = (self.er - self.ez.scale(self.er.dot(self.ez)))
            .try_normalize()
            .unwrap_or_else(|| self.ez.any_perpendicular());
    }

    pub fn reflect(&mut self, intersect: &FresnelIntersect) {
        self.set_direction(intersect.reflected_direction());
    }

    pub fn refract(&mut self, intersect: &FresnelIntersect) {
        self.set_direction(intersect.refracted_direction());
    }

    /// Removes up to delta from the weight and returns what was actually removed.
    pub fn decrease_weight_by(&mut self, delta: f64) -> f64 {
        let delta = delta.min(self.weight).max(0.);
        self.weight -= delta;
        if self.weight <= 0. {
            self.weight = 0.;
        }
        delta
    }

    // Returns false when the photon did not survive.
    pub fn roulette<R: Rng + ?Sized>(&mut self, rng: &mut R, roulette: Roulette) -> bool {
        if self.weight >= roulette.threshold || self.weight <= 0. {
            return self.alive;
        }
        if rng.gen::<f64>() < roulette.chance {
            self.weight /= roulette.chance;
            true
        } else {
            self.weight = 0.;
            self.alive = false;
            false
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn transform_to_local(&mut self, origin: Vec3d) {
        self.r = self.r - origin;
    }

    pub fn transform_from_local(&mut self, origin: Vec3d) {
        self.r = self.r + origin;
    }

    // The photon as the scorer sees it, given the origin of its current frame:
    pub fn score_point(&self, origin: Vec3d) -> ScorePoint {
        ScorePoint {
            position: self.r + origin,
            direction: self.ez,
            weight: self.weight,
        }
    }
}
