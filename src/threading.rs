use crate::geometry::PropagationParam;
use crate::photon::Roulette;
use crate::scorer::Scorer;
use crate::world::World;

use core_affinity;
use crossbeam::thread;
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use simple_error::{bail, SimpleError, SimpleResult};

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub struct RunParam {
    /// The number of threads to run with
    pub num_threads: u32,
    /// Every photon gets its own generator derived from this and its index
    pub seed: u64,
    /// The number of photons a thread takes from the queue at once
    pub batch_size: usize,
    pub roulette: Roulette,
    /// The max number of interactions during a single visit of a geometry
    pub max_interactions: usize,
    /// The max number of times a photon is handed from one region to another
    pub max_handoffs: usize,
    /// The number of rays shot when validating each geometry
    pub validation_probes: usize,
}

impl Default for RunParam {
    fn default() -> Self {
        RunParam {
            num_threads: 1,
            seed: 0,
            batch_size: 256,
            roulette: Roulette::default(),
            max_interactions: 1_000_000,
            max_handoffs: 100_000,
            validation_probes: 1000,
        }
    }
}

impl RunParam {
    pub fn propagation(&self) -> PropagationParam {
        PropagationParam {
            roulette: self.roulette,
            max_interactions: self.max_interactions,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    pub photons_launched: usize,
    pub photons_processed: usize,
    pub aborted: bool,
    pub elapsed: Duration,
}

// Hands out consecutive ranges of photon indices to the threads.
pub struct WorkQueue {
    total: usize,
    batch_size: usize,
    next_batch_start: AtomicUsize,
}

impl WorkQueue {
    pub fn new(total: usize, batch_size: usize) -> Self {
        WorkQueue {
            total,
            batch_size: batch_size.max(1),
            next_batch_start: AtomicUsize::new(0),
        }
    }

    // A thread safe function that returns the next batch for a single thread to work
    // with. If the function returns `None`, then every photon was handed out.
    pub fn get_batch(&self) -> Option<Range<usize>> {
        let mut old_start = self.next_batch_start.load(Ordering::Relaxed);
        loop {
            if old_start >= self.total {
                return None;
            }
            let new_start = (old_start + self.batch_size).min(self.total);

            match self.next_batch_start.compare_exchange_weak(
                old_start,
                new_start,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(old_start..new_start),
                // Someone else took it, try again with the new value:
                Err(i) => old_start = i,
            }
        }
    }
}

/// The generator of a single photon. Only depends on the run seed and the index of the
/// photon, so results do not depend on how photons are spread over threads.
pub fn photon_rng(seed: u64, index: usize) -> Pcg32 {
    Pcg32::seed_from_u64(seed ^ (index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

/// Propagates every photon of every source of the (prepared) world. Each thread owns
/// a scorer created by `make_scorer`, they are merged in thread order at the end.
pub fn run<S, F>(
    world: &World,
    param: RunParam,
    abort: &AtomicBool,
    make_scorer: F,
) -> SimpleResult<(S, RunSummary)>
where
    S: Scorer,
    F: Fn() -> S + Sync,
{
    if param.num_threads == 0 {
        bail!("A run needs at least one thread");
    }

    let total = world.total_source_photons();
    let queue = WorkQueue::new(total, param.batch_size);
    let queue_ref = &queue;
    let make_scorer_ref = &make_scorer;
    let start = Instant::now();
    info!(
        "Propagating {} photons on {} thread(s)",
        total, param.num_threads
    );

    // Check if we will go ahead and bind threads:
    let (bind_threads, core_ids) = match core_affinity::get_core_ids() {
        Some(ids) => {
            // If there are fewer cores than threads demanded, than don't bother binding threads:
            if ids.len() < param.num_threads as usize {
                (false, Vec::new())
            } else {
                (true, ids)
            }
        }
        _ => (false, Vec::new()),
    };
    let core_ids_ref = &core_ids;

    let work = move |id: usize| -> (S, usize) {
        // Id 0 runs on the caller's thread, which keeps its own affinity:
        if bind_threads && id > 0 {
            core_affinity::set_for_current(core_ids_ref[id]);
        }
        let mut scorer = make_scorer_ref();
        let processed = thread_run(id, world, queue_ref, &param, abort, &mut scorer);
        (scorer, processed)
    };

    let results = if param.num_threads == 1 {
        vec![work(0)]
    } else {
        thread::scope(|s| {
            // The main thread always has id 0:
            let handles: Vec<_> = (1..param.num_threads as usize)
                .map(|id| s.spawn(move |_| work(id)))
                .collect();
            let mut results = vec![work(0)];
            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(_) => return Err(SimpleError::new("A worker thread panicked")),
                }
            }
            Ok(results)
        })
        .map_err(|_| SimpleError::new("A worker thread panicked"))??
    };

    let mut processed = 0;
    let mut merged: Option<S> = None;
    for (scorer, count) in results {
        processed += count;
        match merged.as_mut() {
            Some(m) => m.merge(scorer),
            None => merged = Some(scorer),
        }
    }
    let scorer = match merged {
        Some(scorer) => scorer,
        None => bail!("No worker produced a scorer"),
    };

    let summary = RunSummary {
        photons_launched: total,
        photons_processed: processed,
        aborted: processed < total,
        elapsed: start.elapsed(),
    };
    let seconds = summary.elapsed.as_secs_f64();
    info!(
        "Propagated {} of {} photons in {:.2} s ({:.0} photons/s){}",
        processed,
        total,
        seconds,
        if seconds > 0. {
            processed as f64 / seconds
        } else {
            0.
        },
        if summary.aborted { ", aborted" } else { "" }
    );
    Ok((scorer, summary))
}

// Loops over batches until the queue is empty or the run is aborted. Returns the
// number of photons it propagated.
fn thread_run<S: Scorer>(
    id: usize,
    world: &World,
    queue: &WorkQueue,
    param: &RunParam,
    abort: &AtomicBool,
    scorer: &mut S,
) -> usize {
    let mut processed = 0;
    while let Some(batch) = queue.get_batch() {
        for index in batch {
            if abort.load(Ordering::Relaxed) {
                debug!("Thread {} stopping after {} photons", id, processed);
                return processed;
            }
            let mut rng = photon_rng(param.seed, index);
            world.propagate_photon(index, &mut rng, scorer, param);
            processed += 1;
        }
    }
    processed
}
