use crate::geometry::GeometryId;
use crate::math::vector::Vec3d;

use std::collections::HashMap;

// The photon as seen by a scorer. Always in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScorePoint {
    pub position: Vec3d,
    pub direction: Vec3d,
    pub weight: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrossingKind {
    Entering,
    Exiting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Crossing {
    pub geometry: GeometryId,
    pub surface: usize,
    pub kind: CrossingKind,
}

// How a photon ended:
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fate {
    // Left every geometry for good:
    Escaped,
    // Lost the roulette:
    Killed,
    // Terminated because propagation could not continue:
    Lost,
}

/// Receives the events of every photon processed by a worker. Each worker owns its
/// own scorer, the partial results are merged once the run is over.
pub trait Scorer: Send {
    fn on_launch(&mut self, point: &ScorePoint);
    fn on_volume_absorption(&mut self, geometry: GeometryId, point: &ScorePoint, delta: f64);
    fn on_interface_crossing(&mut self, crossing: Crossing, point: &ScorePoint);
    fn on_termination(&mut self, point: &ScorePoint, fate: Fate);

    fn merge(&mut self, other: Self)
    where
        Self: Sized;
}

// Sums the weight of every event. Enough to check energy conservation and
// to compute transmittance and absorbance.
#[derive(Clone, Debug, Default)]
pub struct EnergyTally {
    pub photons: usize,
    pub launched: f64,
    pub absorbed: HashMap<GeometryId, f64>,
    pub crossings: HashMap<Crossing, f64>,
    pub fates: HashMap<Fate, usize>,
    // Weight still carried by photons when they ended:
    pub escaped: f64,
    pub lost: f64,
}

impl EnergyTally {
    pub fn new() -> Self {
        EnergyTally::default()
    }

    pub fn absorbed_in(&self, geometry: GeometryId) -> f64 {
        self.absorbed.get(&geometry).copied().unwrap_or(0.)
    }

    pub fn total_absorbed(&self) -> f64 {
        self.absorbed.values().sum()
    }

    pub fn crossed(&self, geometry: GeometryId, surface: usize, kind: CrossingKind) -> f64 {
        let crossing = Crossing {
            geometry,
            surface,
            kind,
        };
        self.crossings.get(&crossing).copied().unwrap_or(0.)
    }

    // Weight that left the geometry through the given surface:
    pub fn transmitted_through(&self, geometry: GeometryId, surface: usize) -> f64 {
        self.crossed(geometry, surface, CrossingKind::Exiting)
    }

    pub fn fate_count(&self, fate: Fate) -> usize {
        self.fates.get(&fate).copied().unwrap_or(0)
    }

    /// Weight that is neither absorbed nor carried away by terminated photons. Zero
    /// when energy is conserved exactly (no roulette).
    pub fn balance(&self) -> f64 {
        self.launched - self.total_absorbed() - self.escaped - self.lost
    }
}

impl Scorer for EnergyTally {
    fn on_launch(&mut self, point: &ScorePoint) {
        self.photons += 1;
        self.launched += point.weight;
    }

    fn on_volume_absorption(&mut self, geometry: GeometryId, _: &ScorePoint, delta: f64) {
        *self.absorbed.entry(geometry).or_insert(0.) += delta;
    }

    fn on_interface_crossing(&mut self, crossing: Crossing, point: &ScorePoint) {
        *self.crossings.entry(crossing).or_insert(0.) += point.weight;
    }

    fn on_termination(&mut self, point: &ScorePoint, fate: Fate) {
        *self.fates.entry(fate).or_insert(0) += 1;
        match fate {
            Fate::Escaped => self.escaped += point.weight,
            Fate::Lost => self.lost += point.weight,
            Fate::Killed => (),
        }
    }

    fn merge(&mut self, other: Self) {
        self.photons += other.photons;
        self.launched += other.launched;
        for (geometry, delta) in other.absorbed {
            *self.absorbed.entry(geometry).or_insert(0.) += delta;
        }
        for (crossing, weight) in other.crossings {
            *self.crossings.entry(crossing).or_insert(0.) += weight;
        }
        for (fate, count) in other.fates {
            *self.fates.entry(fate).or_insert(0) += count;
        }
        self.escaped += other.escaped;
        self.lost += other.lost;
    }
}
