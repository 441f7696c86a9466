//! Fixed-step time integrators
//!
//! A step is two passes over all bodies:
//! 1. [`Integrator::velocity_pass`] evaluates accelerations and writes new
//!    velocities, plus the `drift` velocity the position pass should apply
//! 2. [`position_pass`] moves every body by `drift * dt`
//!
//! Pass 2 only starts once pass 1 has finished for every body: rayon's
//! `for_each` returns after all of its tasks, which is the global barrier.

use rayon::prelude::*;

use super::forces::{ForceEvaluator, GravityModel};
use super::states::{pack, NVec3, NVec4, System};
use crate::configuration::config::IntegratorConfig;
use crate::error::ConfigError;

/// Per-step scratch space, allocated once with the body arrays
#[derive(Debug, Default)]
pub struct StepBuffers {
    pub accel: Vec<NVec3>,     // a(x_n)
    pub accel_mid: Vec<NVec3>, // a(x_mid), midpoint only
    pub midpoint: Vec<NVec4>,  // half-step positions, midpoint only
    pub drift: Vec<NVec3>,     // velocity applied by the position pass
}

pub trait Integrator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pass 1: update `sys.velocities` and fill `scratch.drift`
    fn velocity_pass(
        &self,
        sys: &mut System,
        forces: &dyn ForceEvaluator,
        model: &GravityModel,
        scratch: &mut StepBuffers,
        dt: f32,
    );
}

/// Semi-implicit Euler: `v' = v + a dt`, then `x' = x + v' dt`
pub struct EulerIntegrator;

impl Integrator for EulerIntegrator {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn velocity_pass(
        &self,
        sys: &mut System,
        forces: &dyn ForceEvaluator,
        model: &GravityModel,
        scratch: &mut StepBuffers,
        dt: f32,
    ) {
        forces.accumulate_accels(model, &sys.positions, &sys.positions, &mut scratch.accel);

        sys.velocities
            .par_iter_mut()
            .zip(scratch.drift.par_iter_mut())
            .zip(scratch.accel.par_iter())
            .for_each(|((v, drift), a)| {
                *v += a * dt;
                *drift = *v;
            });
    }
}

/// Midpoint RK2.
///
/// Every body is moved half a step with its current velocity, the forces are
/// evaluated on that half-step configuration, and the midpoint acceleration
/// is applied over the full step:
///
/// - `x_m = x + v dt/2`, `v_m = v + a(x) dt/2`
/// - `v'  = v + a(x_m) dt`
/// - `x'  = x + v_m dt`
pub struct MidpointIntegrator;

impl Integrator for MidpointIntegrator {
    fn name(&self) -> &'static str {
        "midpoint"
    }

    fn velocity_pass(
        &self,
        sys: &mut System,
        forces: &dyn ForceEvaluator,
        model: &GravityModel,
        scratch: &mut StepBuffers,
        dt: f32,
    ) {
        let half_dt = 0.5 * dt;

        // a(x_n)
        forces.accumulate_accels(model, &sys.positions, &sys.positions, &mut scratch.accel);

        // Half step for every body before any midpoint force is evaluated
        scratch
            .midpoint
            .par_iter_mut()
            .zip(scratch.drift.par_iter_mut())
            .zip(sys.positions.par_iter())
            .zip(sys.velocities.par_iter())
            .zip(scratch.accel.par_iter())
            .for_each(|((((mid, drift), p), v), a)| {
                *mid = pack(p.xyz() + v * half_dt, p.w);
                *drift = v + a * half_dt;
            });

        // a(x_mid), against the midpoint configuration
        forces.accumulate_accels(model, &scratch.midpoint, &scratch.midpoint, &mut scratch.accel_mid);

        sys.velocities
            .par_iter_mut()
            .zip(scratch.accel_mid.par_iter())
            .for_each(|(v, a)| *v += a * dt);
    }
}

/// Pass 2: `x' = x + drift dt`, mass untouched
pub fn position_pass(sys: &mut System, drift: &[NVec3], dt: f32) {
    sys.positions
        .par_iter_mut()
        .zip(drift.par_iter())
        .for_each(|(p, d)| *p = pack(p.xyz() + d * dt, p.w));
}

/// Pick the integrator for a mode. Quartic (RK4) has no implementation and
/// is rejected here, before the simulation allocates anything.
pub fn integrator_for(mode: IntegratorConfig) -> Result<Box<dyn Integrator>, ConfigError> {
    match mode {
        IntegratorConfig::Euler => Ok(Box::new(EulerIntegrator)),
        IntegratorConfig::Midpoint => Ok(Box::new(MidpointIntegrator)),
        IntegratorConfig::Quartic => Err(ConfigError::UnsupportedIntegrator(mode.name())),
    }
}
