//! Monte Carlo propagation of photons through scattering and absorbing media.
//!
//! Geometries with optical properties are placed in a `World` together with sources.
//! Every photon is followed through the geometries, reflected or refracted at their
//! surfaces, until it leaves for good or is absorbed. What happens along the way is
//! reported to a `Scorer`.

pub mod fresnel;
pub mod geometry;
pub mod material;
pub mod math;
pub mod photon;
pub mod scorer;
pub mod source;
pub mod surface;
pub mod threading;
pub mod world;

pub use geometry::{ConvexMesh, Cuboid, Geometry, GeometryId, Layer, SemiInfiniteLayer};
pub use material::Material;
pub use math::vector::{Vec3, Vec3d};
pub use photon::{Photon, Roulette};
pub use scorer::{EnergyTally, Fate, Scorer};
pub use source::{IsotropicSource, MultimodeFiberSource, PencilSource, Source};
pub use threading::{RunParam, RunSummary};
pub use world::World;
