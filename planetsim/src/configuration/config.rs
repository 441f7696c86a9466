//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force strategy, integrator, velocity initializer, cohort geometry
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`ProjectionConfig`] – render buffer geometry (optional)
//! - [`BodyConfig`]       – explicit initial state for each body (optional)
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   force: tiled            # or "naive"
//!   integrator: euler       # "midpoint" / "rk2", "quartic" / "rk4"
//!   velocity_init: circular # or "random"
//!   cohort_size: 64
//!   cohorts: 4              # optional, defaults to available cores
//!
//! parameters:
//!   body_count: 2048
//!   t_end: 1.0              # total simulation time
//!   h0: 0.001               # fixed step size
//!   seed: 42                # deterministic seed
//!   eps: 0.01               # softening
//!   G: 1.0                  # gravitational constant
//!   planet_mass: 0.001
//!   central_mass: 1000.0
//!   scale: 10.0             # diameter of the seeding disk
//!
//! projection:
//!   width: 256
//!   height: 256
//! ```
//!
//! When `bodies` is present it replaces the generated disk, and
//! `body_count` is ignored.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Which integrator the engine advances the system with
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Semi-implicit Euler, velocity first then position
    Euler,

    #[serde(rename = "midpoint", alias = "rk2")] // Midpoint RK2, two force evaluations per step
    Midpoint,

    #[serde(rename = "quartic", alias = "rk4")] // Classical RK4, rejected at initialize
    Quartic,
}

impl IntegratorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorConfig::Euler => "euler",
            IntegratorConfig::Midpoint => "midpoint",
            IntegratorConfig::Quartic => "quartic",
        }
    }
}

impl FromStr for IntegratorConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" => Ok(IntegratorConfig::Euler),
            "midpoint" | "rk2" => Ok(IntegratorConfig::Midpoint),
            "quartic" | "rk4" => Ok(IntegratorConfig::Quartic),
            _ => Err(ConfigError::UnknownIntegrator(s.to_string())),
        }
    }
}

/// How net accelerations are accumulated
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceConfig {
    #[serde(rename = "naive")] // Direct O(N^2) summation, one task per body
    Naive,

    #[serde(rename = "tiled")] // Cohorts stage tiles of sources into a shared buffer
    Tiled,
}

impl ForceConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ForceConfig::Naive => "naive",
            ForceConfig::Tiled => "tiled",
        }
    }
}

/// Initial velocity field
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityConfig {
    #[serde(rename = "circular")] // Tangent velocity for a circular orbit around the central mass
    Circular,

    #[serde(rename = "random")] // Random in-plane scatter
    Random,
}

#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub force: ForceConfig,
    pub integrator: IntegratorConfig,
    #[serde(default = "default_velocity_init")]
    pub velocity_init: VelocityConfig,
    #[serde(default = "default_cohort_size")]
    pub cohort_size: usize,
    pub cohorts: Option<usize>, // defaults to available parallelism
}

#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(default)]
    pub body_count: usize,
    pub t_end: f32,        // time end
    pub h0: f32,           // time step size
    pub seed: u32,         // deterministic seed to make runs reproducible
    pub eps: f32,          // softening - bounds the force at tiny separations
    pub G: f32,            // gravitational constant
    pub planet_mass: f32,  // mass of each generated body
    pub central_mass: f32, // fixed mass at the origin
    pub scale: f32,        // seeding disk diameter
    pub random_speed: Option<f32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProjectionConfig {
    pub width: usize,
    pub height: usize,
    pub field_extent: Option<f32>, // world-space width covered by the field, defaults to scale
    #[serde(default = "default_field_gain")]
    pub field_gain: f32,
    #[serde(default = "default_root_iterations")]
    pub root_iterations: u32,
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f32>, // Initial position
    pub v: Vec<f32>, // Initial velocity
    pub m: f32,      // Mass of the body
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub projection: Option<ProjectionConfig>,
    pub bodies: Option<Vec<BodyConfig>>,
}

fn default_velocity_init() -> VelocityConfig {
    VelocityConfig::Circular
}

fn default_cohort_size() -> usize {
    64
}

fn default_field_gain() -> f32 {
    1.0
}

fn default_root_iterations() -> u32 {
    2
}
