use crate::geometry::Shape;
use crate::math::vector::{Vec3, Vec3d};
use crate::surface::Surface;

// An axis aligned box centered on the local origin.
#[derive(Clone, Copy, Debug)]
pub struct Cuboid {
    pub size: Vec3d,
}

impl Cuboid {
    pub fn new(size: Vec3d) -> Self {
        Cuboid { size }
    }

    pub fn cube(side: f64) -> Self {
        Cuboid::new(Vec3::new(side, side, side))
    }

    fn half(&self) -> Vec3d {
        self.size.scale(0.5)
    }
}

impl Shape for Cuboid {
    fn contains(&self, position: Vec3d) -> bool {
        let h = self.half();
        position.x.abs() <= h.x && position.y.abs() <= h.y && position.z.abs() <= h.z
    }

    // Front, Back, Left, Right, Bottom, Top. Each face is wound so that its normal
    // points outward.
    fn boundary(&self) -> Vec<Surface> {
        let h = self.half();
        let s = self.size;
        let ex = Vec3::new(s.x, 0., 0.);
        let ey = Vec3::new(0., s.y, 0.);
        let ez = Vec3::new(0., 0., s.z);
        let low = -h;
        vec![
            Surface::parallelogram(low, ey, ex, "Front"),
            Surface::parallelogram(low + ez, ex, ey, "Back"),
            Surface::parallelogram(low, ez, ey, "Left"),
            Surface::parallelogram(low + ex, ey, ez, "Right"),
            Surface::parallelogram(low, ex, ez, "Bottom"),
            Surface::parallelogram(low + ey, ez, ex, "Top"),
        ]
    }

    fn center(&self) -> Vec3d {
        Vec3::zero()
    }
}
