use photon_mc::geometry::NUDGE;
use photon_mc::scorer::CrossingKind;
use photon_mc::{
    ConvexMesh, Cuboid, EnergyTally, Fate, Geometry, GeometryId, Layer, Material,
    MultimodeFiberSource, PencilSource, Photon, Roulette, RunParam, Vec3, World,
};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use std::sync::atomic::AtomicBool;

fn no_roulette() -> RunParam {
    RunParam {
        roulette: Roulette {
            threshold: 0.,
            chance: 0.1,
        },
        validation_probes: 200,
        ..RunParam::default()
    }
}

fn slab_world(photons: usize) -> World {
    let mut world = World::new();
    world
        .place(
            Geometry::new(Layer::new(1.), Material::new(1., 0.1, 0.1, 1.4), "Layer"),
            Vec3::zero(),
        )
        .unwrap();
    world
        .place(
            MultimodeFiberSource::new(Vec3::z_hat(), 0.1, 0.6, 1., photons),
            Vec3::new(0., 0., -1.),
        )
        .unwrap();
    world
}

#[test]
fn energy_is_conserved_without_roulette() {
    let mut world = slab_world(2000);
    let (tally, summary) = world.run(no_roulette(), EnergyTally::new).unwrap();
    assert_eq!(summary.photons_processed, 2000);
    assert!(!summary.aborted);
    assert_eq!(tally.photons, 2000);
    assert_eq!(tally.launched, 2000.);
    assert!(tally.balance().abs() < 1e-9, "balance {}", tally.balance());
    assert_eq!(tally.fate_count(Fate::Killed), 0);
}

#[test]
fn energy_is_conserved_on_average_with_roulette() {
    let mut world = slab_world(5000);
    let param = RunParam {
        validation_probes: 200,
        ..RunParam::default()
    };
    let (tally, _) = world.run(param, EnergyTally::new).unwrap();
    assert!(tally.fate_count(Fate::Killed) > 0);
    assert!(tally.balance().abs() < 0.01 * tally.launched);
}

#[test]
fn adjacent_geometries_conserve_energy() {
    let mut world = World::new();
    world
        .place(
            Geometry::new(Layer::new(0.5), Material::new(2., 0.5, 0.8, 1.4), "top"),
            Vec3::zero(),
        )
        .unwrap();
    world
        .place(
            Geometry::new(Cuboid::new(Vec3::new(4., 4., 1.)), Material::new(1., 0.2, 0.5, 1.33), "box"),
            Vec3::new(0., 0., 1.),
        )
        .unwrap();
    world
        .place(PencilSource::new(Vec3::z_hat(), 2000), Vec3::new(0., 0., -1.))
        .unwrap();
    let (tally, _) = world.run(no_roulette(), EnergyTally::new).unwrap();
    assert!(tally.balance().abs() < 1e-9);
    assert!(tally.absorbed_in(world.geometries()[0].id()) > 0.);
    assert!(tally.absorbed_in(world.geometries()[1].id()) > 0.);
}

// Weight that entered a geometry through any of its surfaces, and weight that left it:
fn entered_and_accounted(tally: &EnergyTally, id: GeometryId, surfaces: usize) -> (f64, f64) {
    let entered: f64 = (0..surfaces)
        .map(|i| tally.crossed(id, i, CrossingKind::Entering))
        .sum();
    let transmitted: f64 = (0..surfaces).map(|i| tally.transmitted_through(id, i)).sum();
    (entered, transmitted + tally.absorbed_in(id))
}

#[test]
fn stacked_layers_account_for_their_own_light() {
    let mut world = World::new();
    world
        .place(
            Geometry::new(Layer::new(0.5), Material::new(2., 0.2, 0.8, 1.4), "top"),
            Vec3::zero(),
        )
        .unwrap();
    world
        .place(
            Geometry::new(Layer::new(1.), Material::new(1., 0.1, 0.5, 1.33), "bottom"),
            Vec3::new(0., 0., 0.5),
        )
        .unwrap();
    world
        .place(PencilSource::new(Vec3::z_hat(), 3000), Vec3::new(0., 0., -1.))
        .unwrap();
    let (tally, _) = world.run(no_roulette(), EnergyTally::new).unwrap();
    assert!(tally.balance().abs() < 1e-9);

    for geometry in world.geometries() {
        let (entered, accounted) = entered_and_accounted(&tally, geometry.id(), 2);
        assert!(entered > 0., "{}", geometry.label);
        assert!(
            (accounted / entered - 1.).abs() < 0.01,
            "{}: {} entered, {} accounted for",
            geometry.label,
            entered,
            accounted
        );
    }
    assert!(tally.crossed(world.geometries()[1].id(), 0, CrossingKind::Entering) > 0.);
}

#[test]
fn convex_mesh_conserves_energy() {
    let mut world = World::new();
    world
        .place(
            Geometry::new(ConvexMesh::octahedron(1.), Material::new(2., 0.5, 0.7, 1.4), "octahedron"),
            Vec3::new(0., 0., 1.),
        )
        .unwrap();
    world
        .place(PencilSource::new(Vec3::z_hat(), 2000), Vec3::new(0.1, 0.05, -1.))
        .unwrap();
    let (tally, _) = world.run(no_roulette(), EnergyTally::new).unwrap();
    assert!(tally.balance().abs() < 1e-6, "balance {}", tally.balance());
    assert_eq!(tally.fate_count(Fate::Escaped), 2000);

    let id = world.geometries()[0].id();
    assert!(tally.absorbed_in(id) > 0.);
    let (entered, accounted) = entered_and_accounted(&tally, id, 8);
    assert!(entered > 0.8 * tally.launched);
    assert!((accounted / entered - 1.).abs() < 0.01);
}

#[test]
fn same_seed_same_results() {
    let param = RunParam {
        seed: 1234,
        ..no_roulette()
    };
    let (a, _) = slab_world(500).run(param, EnergyTally::new).unwrap();
    let (b, _) = slab_world(500).run(param, EnergyTally::new).unwrap();
    assert_eq!(a.total_absorbed(), b.total_absorbed());
    assert_eq!(a.escaped, b.escaped);
    assert_eq!(a.fates, b.fates);

    let (c, _) = slab_world(500)
        .run(RunParam { seed: 4321, ..param }, EnergyTally::new)
        .unwrap();
    assert_ne!(a.total_absorbed(), c.total_absorbed());
}

#[test]
fn results_do_not_depend_on_the_thread_count() {
    let single = RunParam {
        seed: 99,
        batch_size: 16,
        ..RunParam::default()
    };
    let multi = RunParam {
        num_threads: 4,
        ..single
    };
    let (a, _) = slab_world(1000).run(single, EnergyTally::new).unwrap();
    let (b, s) = slab_world(1000).run(multi, EnergyTally::new).unwrap();
    assert_eq!(s.photons_processed, 1000);
    assert_eq!(a.fates, b.fates);
    // Only the order of the sums differs:
    assert!((a.total_absorbed() - b.total_absorbed()).abs() < 1e-9);
    assert!((a.escaped - b.escaped).abs() < 1e-9);
}

#[test]
fn transparent_matched_slab_changes_nothing() {
    let mut world = World::new();
    world
        .place(Geometry::new(Layer::new(1.), Material::vacuum(1.), "clear"), Vec3::zero())
        .unwrap();
    world
        .place(PencilSource::new(Vec3::z_hat(), 1), Vec3::new(0., 0., -1.))
        .unwrap();
    let param = no_roulette();
    world.prepare(&param).unwrap();

    let mut tally = EnergyTally::new();
    let mut rng = Pcg32::seed_from_u64(0);
    let mut photon = Photon::new(Vec3::new(0.3, -0.2, -1.), Vec3::z_hat());
    let fate = world.propagate(&mut photon, &mut rng, &mut tally, &param);
    assert_eq!(fate, Fate::Escaped);
    assert_eq!(photon.weight, 1.);
    assert_eq!(photon.ez, Vec3::z_hat());
    assert!((photon.r.x - 0.3).abs() < 1e-12);
    assert!((photon.r.y + 0.2).abs() < 1e-12);
    assert!((photon.r.z - (1. + 2. * NUDGE)).abs() < 1e-9);

    let id = world.geometries()[0].id();
    assert_eq!(tally.crossed(id, 0, CrossingKind::Entering), 1.);
    assert_eq!(tally.transmitted_through(id, 1), 1.);
}

#[test]
fn clear_slab_transmits_as_predicted_by_fresnel() {
    let n: f64 = 1.4;
    let r = ((n - 1.) / (n + 1.)).powi(2);
    let expected = (1. - r) / (1. + r);

    let mut world = World::new();
    world
        .place(Geometry::new(Layer::new(1.), Material::vacuum(n), "glass"), Vec3::zero())
        .unwrap();
    world
        .place(PencilSource::new(Vec3::z_hat(), 20_000), Vec3::new(0., 0., -1.))
        .unwrap();
    let (tally, _) = world.run(no_roulette(), EnergyTally::new).unwrap();
    let id = world.geometries()[0].id();
    let transmitted = tally.transmitted_through(id, 1) / tally.launched;
    assert!((transmitted - expected).abs() < 0.01, "T = {} expected {}", transmitted, expected);
    assert_eq!(tally.fate_count(Fate::Escaped), 20_000);
}

#[test]
fn aborted_runs_stop_launching() {
    let mut world = slab_world(1000);
    let abort = AtomicBool::new(true);
    let (tally, summary) = world
        .run_with_abort(no_roulette(), &abort, EnergyTally::new)
        .unwrap();
    assert!(summary.aborted);
    assert_eq!(summary.photons_launched, 1000);
    assert_eq!(summary.photons_processed, 0);
    assert_eq!(tally.photons, 0);
}

fn allowed_cores() -> Option<Vec<usize>> {
    core_affinity::get_core_ids().map(|ids| ids.iter().map(|c| c.id).collect())
}

#[test]
fn running_leaves_the_calling_thread_unpinned() {
    let before = allowed_cores();
    for &num_threads in &[1, 2] {
        let param = RunParam {
            num_threads,
            ..no_roulette()
        };
        slab_world(100).run(param, EnergyTally::new).unwrap();
        assert_eq!(allowed_cores(), before);
    }
}

#[test]
fn zero_threads_is_a_configuration_error() {
    let mut world = slab_world(10);
    let param = RunParam {
        num_threads: 0,
        ..RunParam::default()
    };
    assert!(world.run(param, EnergyTally::new).is_err());
}

#[test]
fn reference_slab_accounts_for_all_light() {
    let mut world = slab_world(5000);
    let param = RunParam {
        num_threads: 2,
        validation_probes: 200,
        ..RunParam::default()
    };
    let (tally, _) = world.run(param, EnergyTally::new).unwrap();
    let id = world.geometries()[0].id();
    let entered = tally.crossed(id, 0, CrossingKind::Entering);
    let transmitted = tally.transmitted_through(id, 0) + tally.transmitted_through(id, 1);
    let absorbed = tally.absorbed_in(id);
    assert!(entered > 0.9 * tally.launched);
    assert!(((transmitted + absorbed) / entered - 1.).abs() < 0.01);

    let report = world.report(&tally).to_string();
    assert!(report.contains("Absorbance + Transmittance"));
}
