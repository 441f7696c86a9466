use std::time::Instant;

use crate::configuration::config::{ForceConfig, IntegratorConfig};
use crate::error::SimError;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{ForceEvaluator, GravityModel, NaiveGravity};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{pack, NVec3, NVec4};
use crate::simulation::tiled::TiledGravity;

/// Deterministic positions, no seeding needed
fn make_positions(n: usize) -> Vec<NVec4> {
    (0..n)
        .map(|i| {
            let i_f = i as f32;
            let x = NVec3::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0, 0.0);
            pack(x, 0.001)
        })
        .collect()
}

/// Time one naive and one tiled evaluation of all accelerations for a range of N.
/// Prints CSV so it can be pasted straight into a spreadsheet.
pub fn bench_gravity(cohort_size: usize, cohorts: usize) -> Result<(), SimError> {
    let ns = [256, 512, 1024, 2048, 4096, 8192];
    let model = GravityModel::new(&Parameters::default());
    let naive = NaiveGravity;
    let tiled = TiledGravity::new(cohort_size, cohorts)?;

    println!("N,naive_ms,tiled_ms,staged_loads");
    for n in ns {
        let positions = make_positions(n);
        let mut out = vec![NVec3::zeros(); n];

        // Warm up
        naive.accumulate_accels(&model, &positions, &positions, &mut out);
        tiled.accumulate_accels(&model, &positions, &positions, &mut out);

        let t0 = Instant::now();
        naive.accumulate_accels(&model, &positions, &positions, &mut out);
        let ms_naive = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        tiled.accumulate_accels(&model, &positions, &positions, &mut out);
        let ms_tiled = t1.elapsed().as_secs_f64() * 1000.0;

        println!("{},{:.6},{:.6},{}", n, ms_naive, ms_tiled, tiled.staged_loads());
    }
    Ok(())
}

/// Average step time of the Euler and midpoint integrators
pub fn bench_step(force: ForceConfig, steps: usize) -> Result<(), SimError> {
    let ns = [512, 1024, 2048, 4096];
    let params = Parameters::default();

    println!("N,euler_ms,midpoint_ms");
    for n in ns {
        let mut per_step = [0.0f64; 2];
        for (slot, integrator) in [IntegratorConfig::Euler, IntegratorConfig::Midpoint].into_iter().enumerate() {
            let engine = Engine {
                force,
                integrator,
                ..Engine::default()
            };
            let mut scenario = Scenario::initialize(n, params.clone(), engine)?;

            // Warm-up
            scenario.step(params.h0)?;

            let t0 = Instant::now();
            for _ in 0..steps {
                scenario.step(params.h0)?;
            }
            per_step[slot] = t0.elapsed().as_secs_f64() * 1000.0 / steps.max(1) as f64;
        }
        println!("{},{:.6},{:.6}", n, per_step[0], per_step[1]);
    }
    Ok(())
}
