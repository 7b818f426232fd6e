pub mod convex;
pub mod cuboid;
pub mod layer;

pub use convex::ConvexMesh;
pub use cuboid::Cuboid;
pub use layer::{Layer, SemiInfiniteLayer};

use crate::fresnel::FresnelIntersect;
use crate::material::Material;
use crate::math::sampling::uniform_sample_sphere;
use crate::math::vector::{Vec2, Vec3d};
use crate::photon::{Photon, Roulette};
use crate::scorer::{Crossing, CrossingKind, Fate, Scorer};
use crate::surface::{Surface, SURFACE_TOLERANCE};

use log::debug;
use rand::Rng;
use simple_error::{bail, SimpleResult};

use std::cmp::Ordering;
use std::fmt;

// How far a photon is pushed off a surface after hitting it:
pub const NUDGE: f64 = 1e-3;
// Bisection stops once the step is smaller than this:
pub const BISECTION_TOLERANCE: f64 = 1e-5;
// Length of the rays used when validating a geometry:
pub const VALIDATION_LENGTH: f64 = 1e6;
// Exit search length for photons that never interact:
pub const INFINITE_FLIGHT_SEARCH: f64 = 1e6;
// Distance beyond a surface at which the neighbouring medium is looked up:
pub const NEIGHBOUR_OFFSET: f64 = 10. * SURFACE_TOLERANCE;

const MAX_BISECTION_STEPS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub usize);

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// An interface found along a ray, given as an index into the geometry's surfaces:
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exit {
    pub surface: usize,
    pub distance: f64,
}

/// The shape of a geometry, in its local frame. `contains` and `boundary` have to agree:
/// every surface normal points from the inside to the outside.
pub trait Shape: Send + Sync + fmt::Debug {
    fn contains(&self, position: Vec3d) -> bool;

    // The surfaces bounding the shape, built once per geometry:
    fn boundary(&self) -> Vec<Surface>;

    // A point well inside the shape:
    fn center(&self) -> Vec3d;

    /// The interface a photon at `position` (inside) leaves through when travelling
    /// `distance` along `direction`, if any.
    fn next_exit_interface(
        &self,
        surfaces: &[Surface],
        position: Vec3d,
        direction: Vec3d,
        distance: f64,
    ) -> Option<Exit> {
        bisect_exit(self, surfaces, position, direction, distance)
    }

    /// The closest interface a photon at `position` (outside) enters through.
    fn next_entrance_interface(
        &self,
        surfaces: &[Surface],
        position: Vec3d,
        direction: Vec3d,
        distance: f64,
    ) -> Option<Exit> {
        nearest_entrance(surfaces, position, direction, distance)
    }
}

// Works for any shape with a consistent `contains`. Marches from the inside point
// towards the end point, halving the step and turning around whenever the
// containment changes, then picks the outward surface holding the final point.
pub fn bisect_exit<S: Shape + ?Sized>(
    shape: &S,
    surfaces: &[Surface],
    position: Vec3d,
    direction: Vec3d,
    distance: f64,
) -> Option<Exit> {
    if !distance.is_finite()
        || !shape.contains(position)
        || shape.contains(position + direction.scale(distance))
    {
        return None;
    }

    let mut was_inside = true;
    let mut current = position;
    let mut delta = 0.5 * distance;
    let mut steps = 0;
    while delta.abs() > BISECTION_TOLERANCE && steps < MAX_BISECTION_STEPS {
        current += direction.scale(delta);
        let is_inside = shape.contains(current);
        if is_inside != was_inside {
            delta = -delta * 0.5;
        }
        was_inside = is_inside;
        steps += 1;
    }

    // Exact intersections win over the bisected distance:
    let rough = (current - position).length();
    surfaces
        .iter()
        .enumerate()
        .filter(|(_, s)| s.normal.dot(direction) > 0. && s.contains(current))
        .map(|(i, s)| match s.intersect(position, direction, distance) {
            Some(t) => (true, Exit { surface: i, distance: t }),
            None => (false, Exit { surface: i, distance: rough }),
        })
        .min_by(|(exact_a, a), (exact_b, b)| {
            exact_b.cmp(exact_a).then(
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(Ordering::Equal),
            )
        })
        .map(|(_, exit)| exit)
}

// The nearest surface the ray crosses against its normal.
pub fn nearest_entrance(
    surfaces: &[Surface],
    position: Vec3d,
    direction: Vec3d,
    distance: f64,
) -> Option<Exit> {
    let mut best: Option<Exit> = None;
    for (i, surface) in surfaces.iter().enumerate() {
        // Parallel or outward, does not apply:
        if direction.dot(surface.normal) >= 0. {
            continue;
        }
        if let Some(t) = surface.intersect(position, direction, distance) {
            if best.map_or(true, |b| t < b.distance) {
                best = Some(Exit {
                    surface: i,
                    distance: t,
                });
            }
        }
    }
    best
}

// The medium found at some point outside of a geometry:
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Medium {
    // None for the space between the geometries:
    pub geometry: Option<GeometryId>,
    pub index: f64,
}

/// What lies around a geometry. Looked up every time a photon reaches one of its
/// surfaces, so that a surface shared with several neighbours uses the right index
/// at every point.
pub trait Surroundings {
    // `position` is in world coordinates, `from` is the geometry being left:
    fn medium_at(&self, position: Vec3d, from: GeometryId) -> Medium;
}

// The same index everywhere outside:
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniform(pub f64);

impl Surroundings for Uniform {
    fn medium_at(&self, _: Vec3d, _: GeometryId) -> Medium {
        Medium {
            geometry: None,
            index: self.0,
        }
    }
}

// Settings for the propagation of a single photon in a geometry:
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropagationParam {
    pub roulette: Roulette,
    // A photon interacting more often than this in a single visit is dropped:
    pub max_interactions: usize,
}

impl Default for PropagationParam {
    fn default() -> Self {
        PropagationParam {
            roulette: Roulette::default(),
            max_interactions: 1_000_000,
        }
    }
}

// A photon transmitted straight into an adjacent geometry. The point is where it
// crossed over, in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handoff {
    pub geometry: GeometryId,
    pub point: Vec3d,
}

// What happened to a photon visiting a geometry:
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    // The photon left the geometry and is alive, in world coordinates:
    Exited(Option<Handoff>),
    // The photon is dead:
    Terminated(Fate),
}

enum State {
    Propagating,
    AtInterface(FresnelIntersect, Option<GeometryId>),
    Exited(Option<Handoff>),
}

#[derive(Debug)]
pub struct Geometry {
    shape: Box<dyn Shape>,
    pub material: Material,
    pub surfaces: Vec<Surface>,
    // Position of the local frame in world coordinates:
    pub origin: Vec3d,
    pub label: String,
    // When false the geometry emits no absorption or crossing events:
    pub scored: bool,
    pub(crate) id: GeometryId,
}

impl Geometry {
    pub fn new<S: Shape + 'static>(shape: S, material: Material, label: &str) -> Self {
        let mut surfaces = shape.boundary();
        for surface in surfaces.iter_mut() {
            surface.index_inside = material.index;
        }
        Geometry {
            shape: Box::new(shape),
            material,
            surfaces,
            origin: Vec3d::zero(),
            label: label.to_string(),
            scored: true,
            id: GeometryId(0),
        }
    }

    pub fn unscored(mut self) -> Self {
        self.scored = false;
        self
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    pub fn center(&self) -> Vec3d {
        self.shape.center()
    }

    // Position in local coordinates:
    pub fn contains(&self, position: Vec3d) -> bool {
        self.shape.contains(position)
    }

    pub fn contains_world(&self, position: Vec3d) -> bool {
        self.shape.contains(position - self.origin)
    }

    pub fn next_exit_interface(
        &self,
        position: Vec3d,
        direction: Vec3d,
        distance: f64,
    ) -> Option<FresnelIntersect> {
        let exit = self
            .shape
            .next_exit_interface(&self.surfaces, position, direction, distance)?;
        let surface = &self.surfaces[exit.surface];
        Some(FresnelIntersect {
            direction,
            normal: surface.normal,
            geometry: self.id,
            surface: exit.surface,
            distance: exit.distance,
            index_in: surface.index_inside,
            index_out: surface.index_outside,
        })
    }

    pub fn next_entrance_interface(
        &self,
        position: Vec3d,
        direction: Vec3d,
        distance: f64,
    ) -> Option<FresnelIntersect> {
        let entrance =
            self.shape
                .next_entrance_interface(&self.surfaces, position, direction, distance)?;
        let surface = &self.surfaces[entrance.surface];
        Some(FresnelIntersect {
            direction,
            normal: surface.normal,
            geometry: self.id,
            surface: entrance.surface,
            distance: entrance.distance,
            index_in: surface.index_outside,
            index_out: surface.index_inside,
        })
    }

    // The surface a photon crossing over at `position` (world coordinates) along
    // `direction` enters through:
    pub fn entrance_surface_at(&self, position: Vec3d, direction: Vec3d) -> Option<usize> {
        let start = position - self.origin - direction.scale(NUDGE);
        self.shape
            .next_entrance_interface(&self.surfaces, start, direction, 2. * NUDGE)
            .map(|entrance| entrance.surface)
    }

    /// Propagates a photon (in world coordinates) inside this geometry until it is
    /// transmitted through one of the surfaces or dies. The index on the far side of
    /// a surface comes from `surroundings` at the point where the photon hits it. The
    /// photon is back in world coordinates when this returns.
    pub fn propagate<R, S, M>(
        &self,
        photon: &mut Photon,
        rng: &mut R,
        scorer: &mut S,
        surroundings: &M,
        param: &PropagationParam,
    ) -> Outcome
    where
        R: Rng + ?Sized,
        S: Scorer,
        M: Surroundings + ?Sized,
    {
        photon.transform_to_local(self.origin);
        photon.geometry = Some(self.id);

        // Remaining free flight distance, carried over across reflections:
        let mut d = 0.;
        let mut interactions = 0;
        let mut state = State::Propagating;
        let outcome = loop {
            state = match state {
                State::Propagating => {
                    if !photon.is_alive() {
                        break Outcome::Terminated(Fate::Killed);
                    }
                    // Can happen after a reflection close to an edge:
                    if !self.contains(photon.r) {
                        break Outcome::Exited(None);
                    }
                    if interactions >= param.max_interactions {
                        debug!(
                            "Photon dropped after {} interactions in '{}'",
                            interactions, self.label
                        );
                        photon.kill();
                        break Outcome::Terminated(Fate::Lost);
                    }
                    interactions += 1;

                    if d <= 0. {
                        d = self.material.sample_scattering_distance(rng);
                    }
                    let search = if d.is_finite() {
                        d
                    } else {
                        INFINITE_FLIGHT_SEARCH
                    };

                    match self.next_exit_interface(photon.r, photon.ez, search) {
                        Some(mut intersect) => {
                            photon.move_by(intersect.distance);
                            let beyond =
                                photon.r + self.origin + intersect.normal.scale(NEIGHBOUR_OFFSET);
                            let medium = surroundings.medium_at(beyond, self.id);
                            intersect.index_out = medium.index;
                            State::AtInterface(intersect, medium.geometry)
                        }
                        None if !d.is_finite() => {
                            debug!(
                                "Photon in '{}' never interacts and finds no interface",
                                self.label
                            );
                            photon.kill();
                            break Outcome::Terminated(Fate::Lost);
                        }
                        None => {
                            photon.move_by(d);
                            d = 0.;

                            let delta = photon
                                .decrease_weight_by(photon.weight * self.material.absorbed_fraction());
                            if self.scored {
                                scorer.on_volume_absorption(
                                    self.id,
                                    &photon.score_point(self.origin),
                                    delta,
                                );
                            }

                            let (theta, phi) = self.material.sample_scattering_angles(rng);
                            photon.scatter_by(theta, phi);
                            photon.roulette(rng, param.roulette);
                            State::Propagating
                        }
                    }
                }
                State::AtInterface(intersect, neighbour) => {
                    if intersect.is_reflected(rng) {
                        photon.reflect(&intersect);
                        photon.move_by(NUDGE);
                        d -= intersect.distance;
                        State::Propagating
                    } else {
                        photon.refract(&intersect);
                        if self.scored {
                            scorer.on_interface_crossing(
                                Crossing {
                                    geometry: self.id,
                                    surface: intersect.surface,
                                    kind: CrossingKind::Exiting,
                                },
                                &photon.score_point(self.origin),
                            );
                        }
                        let handoff = neighbour.map(|geometry| Handoff {
                            geometry,
                            point: photon.r + self.origin,
                        });
                        photon.move_by(NUDGE);
                        State::Exited(handoff)
                    }
                }
                State::Exited(handoff) => break Outcome::Exited(handoff),
            };
        };

        photon.transform_from_local(self.origin);
        if let Outcome::Exited(_) = outcome {
            photon.geometry = None;
        }
        outcome
    }

    /// Checks that the surfaces agree with `contains`, with rays shot in random
    /// directions from the center of the shape and back.
    pub fn validate<R: Rng + ?Sized>(&self, probes: usize, rng: &mut R) -> SimpleResult<()> {
        let center = self.center();
        if !self.contains(center) {
            bail!("'{}': center {} is not inside the geometry", self.label, center);
        }

        let mut failures = 0;
        let mut first = None;
        for _ in 0..probes {
            let direction = uniform_sample_sphere(Vec2 {
                x: rng.gen(),
                y: rng.gen(),
            });
            // Unbounded along this direction, nothing to check:
            if self.contains(center + direction.scale(VALIDATION_LENGTH)) {
                continue;
            }
            if let Err(e) = self.check_probe(center, direction) {
                failures += 1;
                first.get_or_insert(e);
            }
        }

        if let Some(first) = first {
            bail!(
                "'{}': {} of {} probes are inconsistent, first: {}",
                self.label,
                failures,
                probes,
                first
            );
        }
        Ok(())
    }

    fn check_probe(&self, center: Vec3d, direction: Vec3d) -> Result<(), String> {
        // Leaving from the center:
        if self
            .next_entrance_interface(center, direction, VALIDATION_LENGTH)
            .is_some()
        {
            return Err(format!("entrance found leaving along {}", direction));
        }
        let exit = self
            .next_exit_interface(center, direction, VALIDATION_LENGTH)
            .ok_or_else(|| format!("no exit found along {}", direction))?;
        let surface = &self.surfaces[exit.surface];
        if !surface.contains(center + direction.scale(exit.distance)) {
            return Err(format!("exit point is not on '{}'", surface.label));
        }
        if surface.normal.dot(direction) <= 0. {
            return Err(format!("exit surface '{}' faces inward", surface.label));
        }
        if exit.index_in != surface.index_inside || exit.index_out != surface.index_outside {
            return Err(format!("exit indices do not match '{}'", surface.label));
        }

        // Coming back from far away:
        let far = center + direction.scale(VALIDATION_LENGTH);
        let back = -direction;
        if self
            .next_exit_interface(far, back, VALIDATION_LENGTH)
            .is_some()
        {
            return Err(format!("exit found entering along {}", back));
        }
        let entrance = self
            .next_entrance_interface(far, back, VALIDATION_LENGTH)
            .ok_or_else(|| format!("no entrance found along {}", back))?;
        let surface = &self.surfaces[entrance.surface];
        if !surface.contains(far + back.scale(entrance.distance)) {
            return Err(format!("entrance point is not on '{}'", surface.label));
        }
        if entrance.index_in != surface.index_outside || entrance.index_out != surface.index_inside
        {
            return Err(format!("entrance indices do not match '{}'", surface.label));
        }
        Ok(())
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at {} with surfaces [", self.label, self.origin)?;
        for (i, surface) in self.surfaces.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", surface.label)?;
        }
        write!(f, "]\n{}", self.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector::Vec3;
    use crate::scorer::EnergyTally;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const AIR: Uniform = Uniform(1.);

    // A sphere only known through `contains`, so it uses the generic search.
    #[derive(Debug)]
    struct Ball {
        radius: f64,
    }

    impl Shape for Ball {
        fn contains(&self, position: Vec3d) -> bool {
            position.length() <= self.radius
        }

        fn boundary(&self) -> Vec<Surface> {
            Vec::new()
        }

        fn center(&self) -> Vec3d {
            Vec3::zero()
        }
    }

    #[test]
    fn bisection_finds_the_boundary_of_a_cube() {
        let cube = Cuboid::cube(2.);
        let surfaces = cube.boundary();
        let origin = Vec3::new(0.2, -0.3, 0.1);
        let direction = Vec3::new(1., 0.5, 0.2).normalize();
        let exit = bisect_exit(&cube, &surfaces, origin, direction, 10.).unwrap();
        let expected = (1. - origin.x) / direction.x;
        assert!((exit.distance - expected).abs() < 1e-9);
        assert_eq!(surfaces[exit.surface].normal, Vec3::new(1., 0., 0.));
    }

    #[test]
    fn bisection_reports_nothing_when_staying_inside() {
        let cube = Cuboid::cube(2.);
        let surfaces = cube.boundary();
        assert!(bisect_exit(&cube, &surfaces, Vec3::zero(), Vec3::new(0., 0., 1.), 0.5).is_none());
    }

    #[test]
    fn bisection_without_a_matching_surface_is_none() {
        let ball = Ball { radius: 1. };
        let surfaces = ball.boundary();
        assert!(bisect_exit(&ball, &surfaces, Vec3::zero(), Vec3::new(0., 0., 1.), 5.).is_none());
    }

    #[test]
    fn indices_follow_the_material() {
        let g = Geometry::new(Cuboid::cube(1.), Material::new(1., 1., 0., 1.33), "cube");
        assert!(g.surfaces.iter().all(|s| s.index_inside == 1.33));
        assert!(g.surfaces.iter().all(|s| s.index_outside == 1.));
    }

    #[test]
    fn entrance_swaps_indices() {
        let g = Geometry::new(Cuboid::cube(1.), Material::new(1., 1., 0., 1.33), "cube");
        let hit = g
            .next_entrance_interface(Vec3::new(0., 0., -5.), Vec3::new(0., 0., 1.), 10.)
            .unwrap();
        assert!((hit.distance - 4.5).abs() < 1e-12);
        assert_eq!(hit.index_in, 1.);
        assert_eq!(hit.index_out, 1.33);
        assert!(g
            .next_exit_interface(Vec3::new(0., 0., -5.), Vec3::new(0., 0., 1.), 10.)
            .is_none());
    }

    #[test]
    fn entrance_surface_is_found_at_the_crossing_point() {
        let mut g = Geometry::new(Cuboid::cube(2.), Material::vacuum(1.), "cube");
        g.origin = Vec3::new(0., 0., 10.);
        let surface = g
            .entrance_surface_at(Vec3::new(0.2, 0.1, 9.), Vec3::new(0., 0.6, 0.8))
            .unwrap();
        assert_eq!(g.surfaces[surface].normal, -Vec3::z_hat());
        assert!(g
            .entrance_surface_at(Vec3::new(0.2, 0.1, 5.), Vec3::z_hat())
            .is_none());
    }

    // Sends everything leaving through z > 0 into a neighbour with the given index.
    struct Above(f64);

    impl Surroundings for Above {
        fn medium_at(&self, position: Vec3d, _: GeometryId) -> Medium {
            if position.z > 0. {
                Medium {
                    geometry: Some(GeometryId(7)),
                    index: self.0,
                }
            } else {
                AIR.medium_at(position, GeometryId(0))
            }
        }
    }

    #[test]
    fn transmission_into_a_neighbour_is_handed_off() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut tally = EnergyTally::new();
        let g = Geometry::new(Cuboid::cube(2.), Material::vacuum(1.4), "cube");
        let mut photon = Photon::new(Vec3::zero(), Vec3::z_hat());
        let outcome = g.propagate(&mut photon, &mut rng, &mut tally, &Above(1.4), &PropagationParam::default());
        match outcome {
            Outcome::Exited(Some(handoff)) => {
                assert_eq!(handoff.geometry, GeometryId(7));
                assert!((handoff.point - Vec3::new(0., 0., 1.)).length() < 1e-9);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!((photon.r.z - (1. + NUDGE)).abs() < 1e-9);
    }

    #[test]
    fn validation_passes_for_consistent_shapes() {
        let mut rng = Pcg32::seed_from_u64(3);
        let material = Material::new(1., 0.1, 0.8, 1.4);
        let shapes = vec![
            Geometry::new(Cuboid::new(Vec3::new(1., 2., 3.)), material, "box"),
            Geometry::new(Layer::new(1.), material, "layer"),
            Geometry::new(SemiInfiniteLayer::new(), material, "semi"),
        ];
        for g in shapes.iter() {
            assert!(g.validate(500, &mut rng).is_ok(), "{}", g.label);
        }
    }

    #[test]
    fn validation_reports_inconsistent_shapes() {
        let mut rng = Pcg32::seed_from_u64(3);
        let g = Geometry::new(Ball { radius: 1. }, Material::vacuum(1.), "ball");
        assert!(g.validate(10, &mut rng).is_err());
    }

    #[test]
    fn transparent_matched_cube_lets_photons_through() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut tally = EnergyTally::new();
        let mut g = Geometry::new(Cuboid::cube(2.), Material::vacuum(1.), "cube");
        g.origin = Vec3::new(0., 0., 10.);
        let mut photon = Photon::new(Vec3::new(0.1, 0.1, 9.5), Vec3::new(0., 0., 1.));
        let outcome = g.propagate(&mut photon, &mut rng, &mut tally, &AIR, &PropagationParam::default());
        assert_eq!(outcome, Outcome::Exited(None));
        assert!(photon.geometry.is_none());
        assert!((photon.r.z - (11. + NUDGE)).abs() < 1e-9);
        assert_eq!(photon.weight, 1.);
        assert_eq!(tally.transmitted_through(GeometryId(0), 1), 1.);
    }

    #[test]
    fn absorbing_medium_deposits_weight() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut tally = EnergyTally::new();
        let g = Geometry::new(Cuboid::cube(2.), Material::new(10., 10., 0.9, 1.), "cube");
        for _ in 0..100 {
            let mut photon = Photon::new(Vec3::zero(), Vec3::new(0., 0., 1.));
            let outcome = g.propagate(&mut photon, &mut rng, &mut tally, &AIR, &PropagationParam::default());
            match outcome {
                Outcome::Exited(_) => tally.escaped += photon.weight,
                Outcome::Terminated(_) => tally.lost += photon.weight,
            }
            tally.launched += 1.;
        }
        assert!(tally.total_absorbed() > 50.);
        // Roulette makes this statistical:
        assert!(tally.balance().abs() < 2.);
    }

    #[test]
    fn unscored_geometry_is_silent() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut tally = EnergyTally::new();
        let g = Geometry::new(Cuboid::cube(2.), Material::new(1., 1., 0., 1.4), "cube").unscored();
        let mut photon = Photon::new(Vec3::zero(), Vec3::new(0., 0., 1.));
        g.propagate(&mut photon, &mut rng, &mut tally, &AIR, &PropagationParam::default());
        assert!(tally.absorbed.is_empty());
        assert!(tally.crossings.is_empty());
    }

    #[test]
    fn interaction_guard_drops_the_photon() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut tally = EnergyTally::new();
        let g = Geometry::new(Cuboid::cube(100.), Material::new(100., 0., 0., 1.), "cube");
        let mut photon = Photon::new(Vec3::zero(), Vec3::new(0., 0., 1.));
        let param = PropagationParam {
            max_interactions: 10,
            ..PropagationParam::default()
        };
        let outcome = g.propagate(&mut photon, &mut rng, &mut tally, &AIR, &param);
        assert_eq!(outcome, Outcome::Terminated(Fate::Lost));
        assert!(!photon.is_alive());
    }

    #[test]
    fn non_interacting_unbounded_flight_is_lost() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut tally = EnergyTally::new();
        let g = Geometry::new(SemiInfiniteLayer::new(), Material::vacuum(1.), "semi");
        let mut photon = Photon::new(Vec3::new(0., 0., 1.), Vec3::new(0., 0., 1.));
        let outcome = g.propagate(&mut photon, &mut rng, &mut tally, &AIR, &PropagationParam::default());
        assert_eq!(outcome, Outcome::Terminated(Fate::Lost));
    }
}
