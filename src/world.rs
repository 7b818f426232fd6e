use crate::fresnel::FresnelIntersect;
use crate::geometry::{
    Geometry, GeometryId, Handoff, Medium, Outcome, Surroundings, NEIGHBOUR_OFFSET, NUDGE,
};
use crate::math::vector::Vec3d;
use crate::photon::Photon;
use crate::scorer::{Crossing, CrossingKind, EnergyTally, Fate, ScorePoint, Scorer};
use crate::source::Source;
use crate::threading::{self, RunParam, RunSummary};

use log::{debug, info, warn};
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use simple_error::{bail, SimpleResult};

use std::fmt;
use std::sync::atomic::AtomicBool;

// How far a photon outside every geometry looks for the next one:
pub const OBSTACLE_SEARCH: f64 = 1e7;

#[derive(Debug)]
pub struct PlacedSource {
    pub source: Box<dyn Source>,
    pub position: Vec3d,
}

// Anything that can be placed in the world:
pub enum WorldObject {
    Geometry(Geometry),
    Source(Box<dyn Source>),
}

impl From<Geometry> for WorldObject {
    fn from(geometry: Geometry) -> Self {
        WorldObject::Geometry(geometry)
    }
}

impl<S: Source + 'static> From<S> for WorldObject {
    fn from(source: S) -> Self {
        WorldObject::Source(Box::new(source))
    }
}

// What `place` registered:
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placed {
    Geometry(GeometryId),
    Source(usize),
}

#[derive(Debug)]
pub struct World {
    geometries: Vec<Geometry>,
    sources: Vec<PlacedSource>,
    // Refractive index of the space between the geometries:
    pub index: f64,
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}

impl World {
    pub fn new() -> Self {
        World {
            geometries: Vec::new(),
            sources: Vec::new(),
            index: 1.,
        }
    }

    pub fn with_index(index: f64) -> Self {
        World {
            index,
            ..World::new()
        }
    }

    pub fn place<T: Into<WorldObject>>(&mut self, object: T, position: Vec3d) -> SimpleResult<Placed> {
        match object.into() {
            WorldObject::Geometry(g) => self.place_geometry(g, position).map(Placed::Geometry),
            WorldObject::Source(s) => Ok(Placed::Source(self.place_boxed_source(s, position))),
        }
    }

    pub fn place_geometry(&mut self, mut geometry: Geometry, position: Vec3d) -> SimpleResult<GeometryId> {
        // Labels identify geometries in reports:
        if self.geometries.iter().any(|g| g.label == geometry.label) {
            bail!("Geometry label: \"{}\" is not unique.", geometry.label);
        }
        let id = GeometryId(self.geometries.len());
        geometry.origin = position;
        geometry.id = id;
        self.geometries.push(geometry);
        Ok(id)
    }

    pub fn place_source<S: Source + 'static>(&mut self, source: S, position: Vec3d) -> usize {
        self.place_boxed_source(Box::new(source), position)
    }

    fn place_boxed_source(&mut self, source: Box<dyn Source>, position: Vec3d) -> usize {
        self.sources.push(PlacedSource { source, position });
        self.sources.len() - 1
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn sources(&self) -> &[PlacedSource] {
        &self.sources
    }

    pub fn total_source_photons(&self) -> usize {
        self.sources.iter().map(|s| s.source.max_count()).sum()
    }

    /// Checks the setup, assigns the refractive indices on both sides of every
    /// surface and validates the geometries. Must be called before propagating.
    pub fn prepare(&mut self, param: &RunParam) -> SimpleResult<()> {
        if self.geometries.is_empty() {
            bail!("No geometries: you must create objects");
        }
        if self.sources.is_empty() {
            bail!("No sources: you must create sources");
        }

        self.assign_indices();

        let mut rng = Pcg32::seed_from_u64(param.seed);
        for geometry in self.geometries.iter() {
            if let Err(e) = geometry.validate(param.validation_probes, &mut rng) {
                warn!(
                    "The geometry {} appears invalid. Advancing cautiously. ({})",
                    geometry.label, e
                );
            }
        }
        info!(
            "World ready: {} geometries, {} sources, {} photons",
            self.geometries.len(),
            self.sources.len(),
            self.total_source_photons()
        );
        Ok(())
    }

    // The outside index of a surface is the one of whatever lies right beyond its
    // anchor. Propagation looks the medium up again at every crossing, since a plane
    // can border several geometries.
    fn assign_indices(&mut self) {
        let outside: Vec<Vec<f64>> = self
            .geometries
            .iter()
            .map(|geometry| {
                geometry
                    .surfaces
                    .iter()
                    .map(|s| {
                        let beyond = geometry.origin + s.anchor() + s.normal.scale(NEIGHBOUR_OFFSET);
                        self.medium_at(beyond, geometry.id).index
                    })
                    .collect()
            })
            .collect();

        for (geometry, indices) in self.geometries.iter_mut().zip(outside) {
            let index_inside = geometry.material.index;
            for (surface, index_outside) in geometry.surfaces.iter_mut().zip(indices) {
                surface.index_inside = index_inside;
                surface.index_outside = index_outside;
            }
        }
    }

    /// The first geometry containing the point (in world coordinates).
    pub fn contains(&self, position: Vec3d) -> Option<GeometryId> {
        self.geometries
            .iter()
            .find(|g| g.contains_world(position))
            .map(|g| g.id)
    }

    /// The closest entrance into any geometry for a photon outside of all of them.
    pub fn next_obstacle(&self, photon: &Photon) -> Option<FresnelIntersect> {
        let mut shortest = OBSTACLE_SEARCH;
        let mut closest = None;
        for geometry in self.geometries.iter() {
            let local = photon.r - geometry.origin;
            if let Some(mut intersect) = geometry.next_entrance_interface(local, photon.ez, shortest) {
                if intersect.distance < shortest {
                    // Coming from the space between the geometries:
                    intersect.index_in = self.index;
                    shortest = intersect.distance;
                    closest = Some(intersect);
                }
            }
        }
        closest
    }

    // Creates the photon with the given global index, counting through the sources in
    // the order they were placed.
    pub fn launch(&self, index: usize, rng: &mut dyn RngCore) -> Option<Photon> {
        let mut index = index;
        for placed in self.sources.iter() {
            let count = placed.source.max_count();
            if index < count {
                let launch = placed.source.new_launch(rng);
                return Some(Photon::new(placed.position + launch.position, launch.direction));
            }
            index -= count;
        }
        None
    }

    /// Follows a single photon through the world until it ends, handing it from one
    /// geometry to the next.
    pub fn propagate_photon<R: Rng, S: Scorer>(
        &self,
        index: usize,
        rng: &mut R,
        scorer: &mut S,
        param: &RunParam,
    ) -> Option<Fate> {
        let mut photon = self.launch(index, rng)?;
        Some(self.propagate(&mut photon, rng, scorer, param))
    }

    pub fn propagate<R: Rng, S: Scorer>(
        &self,
        photon: &mut Photon,
        rng: &mut R,
        scorer: &mut S,
        param: &RunParam,
    ) -> Fate {
        let world_origin = Vec3d::zero();
        let propagation = param.propagation();
        scorer.on_launch(&photon.score_point(world_origin));

        let mut current = self.contains(photon.r);
        let mut handoffs = 0;
        let fate = loop {
            if !photon.is_alive() {
                break Fate::Killed;
            }
            if handoffs >= param.max_handoffs {
                debug!("Photon dropped after {} hand-offs", handoffs);
                photon.kill();
                break Fate::Lost;
            }
            handoffs += 1;

            match current {
                Some(id) => {
                    let geometry = &self.geometries[id.0];
                    match geometry.propagate(photon, rng, scorer, self, &propagation) {
                        Outcome::Terminated(fate) => break fate,
                        // Then check if we are in another adjacent object:
                        Outcome::Exited(handoff) => {
                            current = self.contains(photon.r);
                            if let Some(handoff) = handoff.filter(|h| current == Some(h.geometry)) {
                                self.score_handoff(handoff, photon, scorer);
                            }
                        }
                    }
                }
                None => {
                    let intersect = match self.next_obstacle(photon) {
                        Some(intersect) => intersect,
                        // Nothing left to hit:
                        None => {
                            photon.kill();
                            break Fate::Escaped;
                        }
                    };
                    photon.move_by(intersect.distance);
                    if intersect.is_reflected(rng) {
                        photon.reflect(&intersect);
                        photon.move_by(NUDGE);
                        current = self.contains(photon.r);
                    } else {
                        photon.refract(&intersect);
                        let geometry = &self.geometries[intersect.geometry.0];
                        if geometry.scored {
                            scorer.on_interface_crossing(
                                Crossing {
                                    geometry: intersect.geometry,
                                    surface: intersect.surface,
                                    kind: CrossingKind::Entering,
                                },
                                &photon.score_point(world_origin),
                            );
                        }
                        photon.move_by(NUDGE);
                        current = Some(intersect.geometry);
                    }
                }
            }
        };

        photon.geometry = None;
        scorer.on_termination(&photon.score_point(world_origin), fate);
        fate
    }

    // A photon transmitted into an adjacent geometry enters it at the crossing point.
    fn score_handoff<S: Scorer>(&self, handoff: Handoff, photon: &Photon, scorer: &mut S) {
        let geometry = &self.geometries[handoff.geometry.0];
        if !geometry.scored {
            return;
        }
        match geometry.entrance_surface_at(handoff.point, photon.ez) {
            Some(surface) => {
                let point = ScorePoint {
                    position: handoff.point,
                    ..photon.score_point(Vec3d::zero())
                };
                scorer.on_interface_crossing(
                    Crossing {
                        geometry: handoff.geometry,
                        surface,
                        kind: CrossingKind::Entering,
                    },
                    &point,
                );
            }
            None => debug!(
                "No entrance surface of '{}' at hand-off point {}",
                geometry.label, handoff.point
            ),
        }
    }

    /// Prepares the world and propagates every photon of every source.
    pub fn run<S, F>(&mut self, param: RunParam, make_scorer: F) -> SimpleResult<(S, RunSummary)>
    where
        S: Scorer,
        F: Fn() -> S + Sync,
    {
        self.run_with_abort(param, &AtomicBool::new(false), make_scorer)
    }

    // Same as `run`, but stops launching photons once `abort` is set.
    pub fn run_with_abort<S, F>(
        &mut self,
        param: RunParam,
        abort: &AtomicBool,
        make_scorer: F,
    ) -> SimpleResult<(S, RunSummary)>
    where
        S: Scorer,
        F: Fn() -> S + Sync,
    {
        self.prepare(&param)?;
        threading::run(self, param, abort, make_scorer)
    }

    /// A text summary of the energy that went where.
    pub fn report<'a>(&'a self, tally: &'a EnergyTally) -> Report<'a> {
        Report { world: self, tally }
    }
}

impl Surroundings for World {
    fn medium_at(&self, position: Vec3d, from: GeometryId) -> Medium {
        match self
            .geometries
            .iter()
            .find(|g| g.id != from && g.contains_world(position))
        {
            Some(g) => Medium {
                geometry: Some(g.id),
                index: g.material.index,
            },
            None => Medium {
                geometry: None,
                index: self.index,
            },
        }
    }
}

pub struct Report<'a> {
    world: &'a World,
    tally: &'a EnergyTally,
}

fn percent(value: f64, reference: f64) -> f64 {
    if reference > 0. {
        100. * value / reference
    } else {
        0.
    }
}

impl Report<'_> {
    fn write_geometry(&self, f: &mut fmt::Formatter<'_>, geometry: &Geometry) -> fmt::Result {
        let tally = self.tally;
        let id = geometry.id;
        let total = self.world.total_source_photons() as f64;

        writeln!(f, "{}", geometry.label)?;
        writeln!(f, "=====================\n")?;
        writeln!(f, "Geometry and material")?;
        writeln!(f, "---------------------")?;
        writeln!(f, "{}", geometry)?;
        writeln!(f, "\nPhysical quantities")?;
        writeln!(f, "---------------------")?;
        if !geometry.scored {
            return writeln!(f, "Not scored\n");
        }

        // Light that made it inside, or everything for sources placed inside:
        let entered: f64 = (0..geometry.surfaces.len())
            .map(|i| tally.crossed(id, i, CrossingKind::Entering))
            .sum();
        let propagating = if entered > 0. { entered } else { tally.launched };

        let mut transmitted = 0.;
        for (i, surface) in geometry.surfaces.iter().enumerate() {
            let t = tally.transmitted_through(id, i);
            transmitted += t;
            writeln!(
                f,
                "Transmittance [{}] : {:.1}% of propagating light",
                surface.label,
                percent(t, propagating)
            )?;
            writeln!(
                f,
                "Transmittance [{}] : {:.1}% of total power",
                surface.label,
                percent(t, total)
            )?;
        }
        let absorbed = tally.absorbed_in(id);
        writeln!(
            f,
            "Absorbance : {:.1}% of propagating light",
            percent(absorbed, propagating)
        )?;
        writeln!(f, "Absorbance : {:.1}% of total power", percent(absorbed, total))?;
        writeln!(
            f,
            "Absorbance + Transmittance = {:.1}%\n",
            percent(absorbed + transmitted, propagating)
        )
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for geometry in self.world.geometries.iter() {
            self.write_geometry(f, geometry)?;
        }
        write!(
            f,
            "Photons: {} launched, {} escaped, {} killed, {} lost",
            self.tally.photons,
            self.tally.fate_count(Fate::Escaped),
            self.tally.fate_count(Fate::Killed),
            self.tally.fate_count(Fate::Lost)
        )
    }
}
