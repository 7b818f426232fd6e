use photon_mc::{
    EnergyTally, Geometry, Layer, Material, MultimodeFiberSource, RunParam, Vec3, World,
};

use log::{error, info};
use simple_error::{SimpleError, SimpleResult};

use std::env;
use std::process;
use std::str::FromStr;

const DEFAULT_PHOTONS: usize = 10_000;

fn arg_or<T: FromStr>(args: &[String], i: usize, name: &str, default: T) -> SimpleResult<T> {
    match args.get(i) {
        Some(arg) => arg
            .parse()
            .map_err(|_| SimpleError::new(format!("Invalid {}: \"{}\"", name, arg))),
        None => Ok(default),
    }
}

// A fiber shining on a slab: photon_mc [photons] [threads] [seed]
fn run() -> SimpleResult<()> {
    let args: Vec<String> = env::args().collect();
    let default_threads = core_affinity::get_core_ids().map_or(1, |ids| ids.len().max(1)) as u32;

    let photons = arg_or(&args, 1, "photon count", DEFAULT_PHOTONS)?;
    let param = RunParam {
        num_threads: arg_or(&args, 2, "thread count", default_threads)?,
        seed: arg_or(&args, 3, "seed", 0)?,
        ..RunParam::default()
    };

    let mut world = World::new();
    let tissue = Material::new(1., 0.1, 0.1, 1.4);
    world.place(Geometry::new(Layer::new(1.), tissue, "Layer"), Vec3::zero())?;
    world.place(
        MultimodeFiberSource::new(Vec3::z_hat(), 0.1, 0.6, 1., photons),
        Vec3::new(0., 0., -1.),
    )?;

    let (tally, summary) = world.run(param, EnergyTally::new)?;
    info!("\n{}", world.report(&tally));
    info!(
        "{:.3} ms per photon",
        1000. * summary.elapsed.as_secs_f64() / summary.photons_processed.max(1) as f64
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
