//! Tiled force evaluation with cohort-shared staging.
//!
//! Targets are split into blocks of `cohort_size`. A cohort is `cohort_size`
//! worker threads (lanes) sharing a staging buffer and a barrier; cohort `g`
//! handles blocks `g, g + cohorts, g + 2 * cohorts, ...`. For each tile of
//! sources:
//!
//! 1. lane `l` copies source `tile_start + l` into slot `l` (if it exists)
//! 2. barrier
//! 3. every lane with a real target sums over the staged slots
//! 4. barrier, so nobody overwrites a slot that is still being read
//!
//! Each source is read from the shared array once per block instead of once
//! per target. Lanes whose target lies past the end still stage and still hit
//! every barrier; otherwise the barrier counts would not match.
//!
//! The lanes are the threads of a dedicated rayon pool, started once when the
//! evaluator is built and parked between evaluations. An evaluation is a
//! pool broadcast: every lane runs exactly once, so every barrier fills.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use super::engine::{MAX_COHORT_SIZE, MAX_LANES};
use super::forces::{ForceEvaluator, GravityModel};
use super::states::{NVec3, NVec4};
use crate::error::SimError;

/// Cohort staging slots. Lane `l` is the only writer of slot `l`; the
/// cohort barrier orders every write before the reads of the same tile.
struct StagingBuffer {
    slots: Vec<[AtomicU32; 4]>,
}

impl StagingBuffer {
    fn new(width: usize) -> Self {
        Self {
            slots: (0..width).map(|_| Default::default()).collect(),
        }
    }

    fn store(&self, lane: usize, v: NVec4) {
        for (slot, c) in self.slots[lane].iter().zip(v.iter()) {
            slot.store(c.to_bits(), Ordering::Relaxed);
        }
    }

    fn load(&self, lane: usize) -> NVec4 {
        let s = &self.slots[lane];
        NVec4::new(
            f32::from_bits(s[0].load(Ordering::Relaxed)),
            f32::from_bits(s[1].load(Ordering::Relaxed)),
            f32::from_bits(s[2].load(Ordering::Relaxed)),
            f32::from_bits(s[3].load(Ordering::Relaxed)),
        )
    }
}

struct Cohort {
    staging: StagingBuffer,
    barrier: Barrier,
}

impl Cohort {
    fn new(width: usize) -> Self {
        Self {
            staging: StagingBuffer::new(width),
            barrier: Barrier::new(width),
        }
    }
}

#[derive(Default)]
struct LaneOutput {
    results: Vec<(usize, NVec3)>,
    loads: usize,
}

/// One lane of one cohort
#[derive(Clone, Copy)]
struct Worker<'a> {
    cohort: &'a Cohort,
    group: usize,  // cohort index
    groups: usize, // cohorts in flight
    lane: usize,
    width: usize,
    blocks: usize,
}

impl Worker<'_> {
    fn run(self, model: &GravityModel, targets: &[NVec4], sources: &[NVec4]) -> LaneOutput {
        let mut out = LaneOutput::default();

        for block in (self.group..self.blocks).step_by(self.groups) {
            let target = block * self.width + self.lane;
            let x = targets.get(target).map(|t| t.xyz());
            let mut acc = x.map_or_else(NVec3::zeros, |x| model.central_term(x));

            for tile_start in (0..sources.len()).step_by(self.width) {
                let tile_len = self.width.min(sources.len() - tile_start);

                if self.lane < tile_len {
                    self.cohort.staging.store(self.lane, sources[tile_start + self.lane]);
                    out.loads += 1;
                }
                self.cohort.barrier.wait();

                if let Some(x) = x {
                    for slot in 0..tile_len {
                        acc += model.pairwise(x, self.cohort.staging.load(slot));
                    }
                }
                self.cohort.barrier.wait();
            }

            if x.is_some() {
                out.results.push((target, acc));
            }
        }
        out
    }
}

/// Cohort-staged evaluator. Sums in the same order as
/// [`NaiveGravity`](super::forces::NaiveGravity), so both agree to rounding.
pub struct TiledGravity {
    cohort_size: usize,
    cohorts: Mutex<Vec<Cohort>>,
    pool: ThreadPool,
    staged_loads: AtomicUsize,
}

impl TiledGravity {
    /// Start `cohort_size * cohorts` lane threads.
    ///
    /// The geometry is clamped to at least one lane and to [`MAX_COHORT_SIZE`]
    /// and [`MAX_LANES`]; `Engine::validate` reports out-of-range settings
    /// before a scenario gets here. Fails if the OS refuses a thread.
    pub fn new(cohort_size: usize, cohorts: usize) -> Result<Self, SimError> {
        let width = cohort_size.clamp(1, MAX_COHORT_SIZE);
        let groups = cohorts.clamp(1, MAX_LANES / width);
        let lanes = width * groups;

        let pool = ThreadPoolBuilder::new()
            .num_threads(lanes)
            .thread_name(|i| format!("tiled-lane-{}", i))
            .build()
            .map_err(|source| SimError::LanePool { lanes, source })?;
        log::debug!("tiled: started {} lanes ({} cohorts of {})", lanes, groups, width);

        Ok(Self {
            cohort_size: width,
            cohorts: Mutex::new((0..groups).map(|_| Cohort::new(width)).collect()),
            pool,
            staged_loads: AtomicUsize::new(0),
        })
    }

    pub fn cohort_size(&self) -> usize {
        self.cohort_size
    }

    /// Lane threads kept alive by this evaluator
    pub fn lanes(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Source records staged during the most recent evaluation
    pub fn staged_loads(&self) -> usize {
        self.staged_loads.load(Ordering::Relaxed)
    }
}

impl ForceEvaluator for TiledGravity {
    fn name(&self) -> &'static str {
        "tiled"
    }

    fn accumulate_accels(&self, model: &GravityModel, targets: &[NVec4], sources: &[NVec4], out: &mut [NVec3]) {
        debug_assert_eq!(targets.len(), out.len());
        self.staged_loads.store(0, Ordering::Relaxed);
        if targets.is_empty() {
            return;
        }

        // staging slots and barriers are shared: one evaluation at a time
        let guard = self.cohorts.lock().unwrap_or_else(PoisonError::into_inner);
        let cohorts: &[Cohort] = &guard;

        let width = self.cohort_size;
        let blocks = targets.len().div_ceil(width);
        let groups = cohorts.len().min(blocks);

        let lanes: Vec<LaneOutput> = self.pool.broadcast(|ctx| {
            let (group, lane) = (ctx.index() / width, ctx.index() % width);
            if group >= groups {
                return LaneOutput::default();
            }
            let worker = Worker {
                cohort: &cohorts[group],
                group,
                groups,
                lane,
                width,
                blocks,
            };
            worker.run(model, targets, sources)
        });
        drop(guard);

        let mut loads = 0;
        for lane in lanes {
            loads += lane.loads;
            for (i, a) in lane.results {
                out[i] = a;
            }
        }
        self.staged_loads.store(loads, Ordering::Relaxed);

        log::debug!(
            "tiled: {} targets, {} sources, {} blocks over {} cohorts of {}, {} staged loads",
            targets.len(),
            sources.len(),
            blocks,
            groups,
            width,
            loads
        );
    }
}
