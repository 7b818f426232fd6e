use crate::math::sampling::{concentric_sample_disk, uniform_sample_cone, uniform_sample_sphere};
use crate::math::vector::{Vec2, Vec3, Vec3d};

use num_traits::clamp;
use rand::{Rng, RngCore};

use std::fmt;

// Initial state of a photon, relative to the source position:
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    pub position: Vec3d,
    pub direction: Vec3d,
}

fn sample2(rng: &mut dyn RngCore) -> Vec2<f64> {
    Vec2 {
        x: rng.gen(),
        y: rng.gen(),
    }
}

/// Produces a finite number of photons. Sources are shared by every worker, all the
/// randomness comes from the generator passed in.
pub trait Source: Send + Sync + fmt::Debug {
    fn max_count(&self) -> usize;

    fn new_launch(&self, rng: &mut dyn RngCore) -> Launch;

    fn launches<'a, R: RngCore>(&'a self, rng: &'a mut R) -> Launches<'a, Self, R>
    where
        Self: Sized,
    {
        Launches::new(self, rng)
    }
}

// Yields exactly `max_count` launches.
pub struct Launches<'a, S: Source + ?Sized, R: RngCore> {
    source: &'a S,
    rng: &'a mut R,
    remaining: usize,
}

impl<'a, S: Source + ?Sized, R: RngCore> Launches<'a, S, R> {
    pub fn new(source: &'a S, rng: &'a mut R) -> Self {
        Launches {
            source,
            rng,
            remaining: source.max_count(),
        }
    }
}

impl<'a, S: Source + ?Sized, R: RngCore> Iterator for Launches<'a, S, R> {
    type Item = Launch;

    fn next(&mut self) -> Option<Launch> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.source.new_launch(&mut *self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, S: Source + ?Sized, R: RngCore> ExactSizeIterator for Launches<'a, S, R> {}

// A point emitting uniformly in every direction:
#[derive(Clone, Copy, Debug)]
pub struct IsotropicSource {
    pub max_count: usize,
}

impl IsotropicSource {
    pub fn new(max_count: usize) -> Self {
        IsotropicSource { max_count }
    }
}

impl Source for IsotropicSource {
    fn max_count(&self) -> usize {
        self.max_count
    }

    fn new_launch(&self, rng: &mut dyn RngCore) -> Launch {
        Launch {
            position: Vec3::zero(),
            direction: uniform_sample_sphere(sample2(rng)),
        }
    }
}

// An infinitely thin collimated beam:
#[derive(Clone, Copy, Debug)]
pub struct PencilSource {
    pub direction: Vec3d,
    pub max_count: usize,
}

impl PencilSource {
    pub fn new(direction: Vec3d, max_count: usize) -> Self {
        PencilSource {
            direction: direction.normalize(),
            max_count,
        }
    }
}

impl Source for PencilSource {
    fn max_count(&self) -> usize {
        self.max_count
    }

    fn new_launch(&self, _: &mut dyn RngCore) -> Launch {
        Launch {
            position: Vec3::zero(),
            direction: self.direction,
        }
    }
}

// The output of a multimode fiber: positions uniform on the core and directions
// uniform in the acceptance cone given by the numerical aperture.
#[derive(Clone, Copy, Debug)]
pub struct MultimodeFiberSource {
    pub direction: Vec3d,
    x_axis: Vec3d,
    y_axis: Vec3d,
    pub radius: f64,
    pub na: f64,
    pub index: f64,
    pub max_count: usize,
}

impl MultimodeFiberSource {
    pub fn new(direction: Vec3d, diameter: f64, na: f64, index: f64, max_count: usize) -> Self {
        let direction = direction.normalize();
        let x_axis = direction.any_perpendicular();
        let y_axis = direction.cross(x_axis);
        MultimodeFiberSource {
            direction,
            x_axis,
            y_axis,
            radius: 0.5 * diameter,
            na,
            index,
            max_count,
        }
    }

    // Half angle of the emission cone:
    pub fn max_angle(&self) -> f64 {
        clamp(self.na / self.index, 0., 1.).asin()
    }
}

impl Source for MultimodeFiberSource {
    fn max_count(&self) -> usize {
        self.max_count
    }

    fn new_launch(&self, rng: &mut dyn RngCore) -> Launch {
        let disk = concentric_sample_disk(sample2(rng)).scale(self.radius);
        let cone = uniform_sample_cone(sample2(rng), self.max_angle().cos());
        Launch {
            position: self.x_axis.scale(disk.x) + self.y_axis.scale(disk.y),
            direction: (self.x_axis.scale(cone.x)
                + self.y_axis.scale(cone.y)
                + self.direction.scale(cone.z))
            .normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn launches_are_finite() {
        let mut rng = Pcg32::seed_from_u64(0);
        let source = IsotropicSource::new(17);
        let launches = source.launches(&mut rng);
        assert_eq!(launches.len(), 17);
        assert_eq!(launches.count(), 17);
    }

    #[test]
    fn isotropic_directions_average_out() {
        let mut rng = Pcg32::seed_from_u64(1);
        let source = IsotropicSource::new(100_000);
        let sum = source
            .launches(&mut rng)
            .fold(Vec3::zero(), |acc, l| acc + l.direction);
        assert!(sum.scale(1e-5).length() < 0.01);
    }

    #[test]
    fn pencil_is_collimated() {
        let mut rng = Pcg32::seed_from_u64(1);
        let source = PencilSource::new(Vec3::new(0., 0., 3.), 5);
        for launch in source.launches(&mut rng) {
            assert_eq!(launch.position, Vec3::zero());
            assert_eq!(launch.direction, Vec3::z_hat());
        }
    }

    #[test]
    fn fiber_stays_in_its_core_and_cone() {
        let mut rng = Pcg32::seed_from_u64(2);
        let source = MultimodeFiberSource::new(Vec3::new(1., 1., 0.), 0.1, 0.6, 1.4, 10_000);
        let cos_max = source.max_angle().cos();
        for launch in source.launches(&mut rng) {
            assert!(launch.position.length() <= 0.05 + 1e-12);
            assert!(launch.position.dot(source.direction).abs() < 1e-12);
            assert!((launch.direction.length() - 1.).abs() < 1e-12);
            assert!(launch.direction.dot(source.direction) >= cos_max - 1e-12);
        }
    }

    #[test]
    fn dyn_sources_launch_too() {
        let mut rng = Pcg32::seed_from_u64(3);
        let source: Box<dyn Source> = Box::new(PencilSource::new(Vec3::x_hat(), 3));
        assert_eq!(Launches::new(source.as_ref(), &mut rng).count(), 3);
    }
}
