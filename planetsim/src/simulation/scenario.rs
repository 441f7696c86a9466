//! Build fully-initialized simulations and advance them
//!
//! A [`Scenario`] is the single owner of the body arrays. It holds:
//! - engine settings (`Engine`) and numerical parameters (`Parameters`)
//! - system state (`System`, parallel position/mass and velocity arrays)
//! - the force strategy and integrator chosen at initialize
//! - scratch buffers reused by every step
//!
//! Parallel passes borrow the arrays from the scenario; nothing lives in
//! globals.

use rayon::prelude::*;

use super::engine::Engine;
use super::forces::{evaluator_for, ForceEvaluator, GravityModel};
use super::integrator::{integrator_for, position_pass, Integrator, StepBuffers};
use super::params::Parameters;
use super::seeding::{circular_velocity, disk_position, random_velocity};
use super::states::{pack, CentralMass, NVec3, NVec4, System};
use crate::configuration::config::{BodyConfig, IntegratorConfig, ScenarioConfig, VelocityConfig};
use crate::error::{ConfigError, SimError};
use crate::visualization::projection::Projection;

pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub projection: Projection,
    pub system: System,
    pub(crate) gravity: GravityModel,
    pub(crate) forces: Box<dyn ForceEvaluator>,
    integrator: Box<dyn Integrator>,
    scratch: StepBuffers,
}

impl Scenario {
    /// Allocate `body_count` bodies and seed them from the parameters.
    ///
    /// Everything is validated first; a configuration error returns before
    /// any body buffer is allocated. Seeding runs in parallel and has
    /// completed when this returns.
    pub fn initialize(body_count: usize, parameters: Parameters, engine: Engine) -> Result<Self, SimError> {
        let integrator = validate(body_count, &parameters, &engine)?;

        let mut positions = alloc("positions", body_count, NVec4::zeros())?;
        let mut velocities = alloc("velocities", body_count, NVec3::zeros())?;

        let central = CentralMass::at_origin(parameters.central_mass);
        let (seed, scale, mass) = (parameters.seed, parameters.scale, parameters.planet_mass);

        positions
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, p)| *p = pack(disk_position(i, seed, scale), mass));

        match engine.velocity_init {
            VelocityConfig::Circular => velocities
                .par_iter_mut()
                .zip(positions.par_iter())
                .for_each(|(v, p)| *v = circular_velocity(p.xyz(), &central, parameters.G)),
            VelocityConfig::Random => {
                let speed = parameters.random_speed;
                velocities
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(i, v)| *v = random_velocity(i, seed, speed));
            }
        }

        log::info!(
            "initialized {} bodies (seed {}, scale {}, {:?} velocities), force = {}, integrator = {}",
            body_count,
            seed,
            scale,
            engine.velocity_init,
            engine.force.name(),
            integrator.name()
        );

        Self::assemble(parameters, engine, integrator, positions, velocities)
    }

    /// Start from an explicit state instead of the seeded disk
    pub fn with_bodies(
        parameters: Parameters,
        engine: Engine,
        positions: Vec<NVec4>,
        velocities: Vec<NVec3>,
    ) -> Result<Self, SimError> {
        let integrator = validate(positions.len(), &parameters, &engine)?;
        if positions.len() != velocities.len() {
            return Err(config_error(
                positions.len(),
                &parameters,
                ConfigError::MismatchedBodies {
                    positions: positions.len(),
                    velocities: velocities.len(),
                },
            ));
        }

        check_bodies(&positions, &velocities).map_err(|e| config_error(positions.len(), &parameters, e))?;

        log::info!(
            "initialized {} explicit bodies, force = {}, integrator = {}",
            positions.len(),
            engine.force.name(),
            integrator.name()
        );

        Self::assemble(parameters, engine, integrator, positions, velocities)
    }

    /// Map a YAML scenario onto runtime types and initialize it
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        let p_cfg = cfg.parameters;
        let defaults = Parameters::default();
        let parameters = Parameters {
            t_end: p_cfg.t_end,
            h0: p_cfg.h0,
            seed: p_cfg.seed,
            eps: p_cfg.eps,
            G: p_cfg.G,
            planet_mass: p_cfg.planet_mass,
            central_mass: p_cfg.central_mass,
            scale: p_cfg.scale,
            random_speed: p_cfg.random_speed.unwrap_or(defaults.random_speed),
        };
        let engine = Engine::from_config(&cfg.engine);
        let projection = cfg
            .projection
            .as_ref()
            .map(|p| Projection::from_config(p, parameters.scale))
            .unwrap_or_else(|| Projection::for_scale(parameters.scale));

        let mut scenario = match cfg.bodies {
            Some(bodies) => {
                let (positions, velocities) =
                    bodies_from_config(&bodies).map_err(|e| config_error(bodies.len(), &parameters, e))?;
                Self::with_bodies(parameters, engine, positions, velocities)?
            }
            None => Self::initialize(p_cfg.body_count, parameters, engine)?,
        };
        scenario.projection = projection;
        Ok(scenario)
    }

    fn assemble(
        parameters: Parameters,
        engine: Engine,
        integrator: Box<dyn Integrator>,
        positions: Vec<NVec4>,
        velocities: Vec<NVec3>,
    ) -> Result<Self, SimError> {
        let n = positions.len();
        let mut scratch = StepBuffers {
            accel: alloc("accelerations", n, NVec3::zeros())?,
            drift: alloc("drift velocities", n, NVec3::zeros())?,
            ..Default::default()
        };
        if engine.integrator == IntegratorConfig::Midpoint {
            scratch.accel_mid = alloc("midpoint accelerations", n, NVec3::zeros())?;
            scratch.midpoint = alloc("midpoint positions", n, NVec4::zeros())?;
        }

        let forces = evaluator_for(&engine)?;

        Ok(Self {
            gravity: GravityModel::new(&parameters),
            forces,
            projection: Projection::for_scale(parameters.scale),
            system: System {
                positions,
                velocities,
                t: 0.0,
                step: 0,
            },
            engine,
            parameters,
            integrator,
            scratch,
        })
    }

    /// Advance by `dt`: velocities for every body, then positions for every body
    pub fn step(&mut self, dt: f32) -> Result<(), SimError> {
        if !dt.is_finite() {
            return Err(SimError::InvalidTimeStep {
                step: self.system.step,
                dt,
            });
        }

        self.integrator
            .velocity_pass(&mut self.system, self.forces.as_ref(), &self.gravity, &mut self.scratch, dt);
        position_pass(&mut self.system, &self.scratch.drift, dt);

        self.system.t += dt;
        self.system.step += 1;
        log::debug!("step {} done, t = {}", self.system.step, self.system.t);
        Ok(())
    }

    /// Net acceleration on body `index` through the configured strategy,
    /// `None` if there is no such body
    pub fn net_acceleration(&self, index: usize) -> Option<NVec3> {
        self.forces
            .net_acceleration(&self.gravity, index, &self.system.positions)
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    pub fn force_name(&self) -> &'static str {
        self.forces.name()
    }
}

/// All startup checks. Returns the integrator so it is only selected once.
fn validate(body_count: usize, parameters: &Parameters, engine: &Engine) -> Result<Box<dyn Integrator>, SimError> {
    let checks = || -> Result<Box<dyn Integrator>, ConfigError> {
        if body_count == 0 {
            return Err(ConfigError::NonPositiveBodyCount(body_count));
        }
        parameters.validate()?;
        engine.validate()?;
        integrator_for(engine.integrator)
    };
    checks().map_err(|e| config_error(body_count, parameters, e))
}

fn config_error(bodies: usize, parameters: &Parameters, source: ConfigError) -> SimError {
    SimError::Configuration {
        bodies,
        G: parameters.G,
        eps: parameters.eps,
        source,
    }
}

/// `n` copies of `fill`, failing instead of aborting when memory runs out
pub(crate) fn alloc<T: Clone>(buffer: &'static str, n: usize, fill: T) -> Result<Vec<T>, SimError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|source| SimError::ResourceExhausted {
            buffer,
            bodies: n,
            source,
        })?;
    v.resize(n, fill);
    Ok(v)
}

/// Explicit bodies get the checks `Parameters::validate` applies to generated ones
fn check_bodies(positions: &[NVec4], velocities: &[NVec3]) -> Result<(), ConfigError> {
    for (index, (p, v)) in positions.iter().zip(velocities).enumerate() {
        let invalid = |field, expected| ConfigError::InvalidBody { index, field, expected };
        if !(p.w.is_finite() && p.w >= 0.0) {
            return Err(invalid("m", "finite and non-negative"));
        }
        if !p.xyz().iter().all(|c| c.is_finite()) {
            return Err(invalid("x", "finite"));
        }
        if !v.iter().all(|c| c.is_finite()) {
            return Err(invalid("v", "finite"));
        }
    }
    Ok(())
}

fn bodies_from_config(bodies: &[BodyConfig]) -> Result<(Vec<NVec4>, Vec<NVec3>), ConfigError> {
    let mut positions = Vec::with_capacity(bodies.len());
    let mut velocities = Vec::with_capacity(bodies.len());
    for (index, bc) in bodies.iter().enumerate() {
        let x = vec3(index, "x", &bc.x)?;
        let v = vec3(index, "v", &bc.v)?;
        positions.push(pack(x, bc.m));
        velocities.push(v);
    }
    Ok((positions, velocities))
}

fn vec3(index: usize, field: &'static str, c: &[f32]) -> Result<NVec3, ConfigError> {
    match c {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(ConfigError::BadVector {
            index,
            field,
            len: c.len(),
        }),
    }
}
