use crate::geometry::{Exit, Shape};
use crate::math::vector::{Vec3, Vec3d};
use crate::surface::Surface;

// Surface order of the layers:
pub const FRONT: usize = 0;
pub const BACK: usize = 1;

// A slab between z = 0 and z = thickness, infinite along x and y.
#[derive(Clone, Copy, Debug)]
pub struct Layer {
    pub thickness: f64,
}

impl Layer {
    pub fn new(thickness: f64) -> Self {
        Layer { thickness }
    }
}

impl Shape for Layer {
    fn contains(&self, position: Vec3d) -> bool {
        position.z >= 0. && position.z <= self.thickness
    }

    fn boundary(&self) -> Vec<Surface> {
        vec![
            Surface::plane(Vec3::zero(), -Vec3::z_hat(), "Front"),
            Surface::plane(Vec3::new(0., 0., self.thickness), Vec3::z_hat(), "Back"),
        ]
    }

    fn center(&self) -> Vec3d {
        Vec3::new(0., 0., 0.5 * self.thickness)
    }

    fn next_exit_interface(
        &self,
        _: &[Surface],
        position: Vec3d,
        direction: Vec3d,
        distance: f64,
    ) -> Option<Exit> {
        if self.contains(position + direction.scale(distance)) {
            return None;
        }
        if direction.z > 0. {
            let d = (self.thickness - position.z) / direction.z;
            if d <= distance {
                return Some(Exit {
                    surface: BACK,
                    distance: d.max(0.),
                });
            }
        } else if direction.z < 0. {
            let d = -position.z / direction.z;
            if d <= distance {
                return Some(Exit {
                    surface: FRONT,
                    distance: d.max(0.),
                });
            }
        }
        None
    }
}

// Everything beyond z = 0. Photons only leave through the front.
#[derive(Clone, Copy, Debug, Default)]
pub struct SemiInfiniteLayer;

impl SemiInfiniteLayer {
    pub fn new() -> Self {
        SemiInfiniteLayer
    }
}

impl Shape for SemiInfiniteLayer {
    fn contains(&self, position: Vec3d) -> bool {
        position.z >= 0.
    }

    fn boundary(&self) -> Vec<Surface> {
        vec![Surface::plane(Vec3::zero(), -Vec3::z_hat(), "Front")]
    }

    fn center(&self) -> Vec3d {
        Vec3::z_hat()
    }

    fn next_exit_interface(
        &self,
        _: &[Surface],
        position: Vec3d,
        direction: Vec3d,
        distance: f64,
    ) -> Option<Exit> {
        if !distance.is_finite() || self.contains(position + direction.scale(distance)) {
            return None;
        }
        if direction.z < 0. {
            let d = -position.z / direction.z;
            if d <= distance {
                return Some(Exit {
                    surface: FRONT,
                    distance: d.max(0.),
                });
            }
        }
        None
    }
}
