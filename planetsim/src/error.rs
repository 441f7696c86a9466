//! Error types surfaced to the host.
//!
//! Configuration problems are caught by `Scenario::initialize` before any
//! buffer is allocated. Close encounters are never errors: softening
//! bounds the force instead.

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("body count must be positive, got {0}")]
    NonPositiveBodyCount(usize),

    #[error("integrator `{0}` is not supported")]
    UnsupportedIntegrator(&'static str),

    #[error("unknown integrator `{0}` (expected euler, midpoint or quartic)")]
    UnknownIntegrator(String),

    #[error("parameter `{name}` must be {expected}, got {value}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("cohort size must be positive")]
    ZeroCohortSize,

    #[error("cohort count must be positive")]
    ZeroCohorts,

    #[error("cohort size {cohort_size} exceeds the limit of {max} lanes")]
    CohortTooLarge { cohort_size: usize, max: usize },

    #[error("{cohort_size} lanes x {cohorts} cohorts exceeds the limit of {max} worker threads")]
    TooManyLanes { cohort_size: usize, cohorts: usize, max: usize },

    #[error("explicit bodies disagree: {positions} positions, {velocities} velocities")]
    MismatchedBodies { positions: usize, velocities: usize },

    #[error("body {index} needs 3 components in `{field}`, got {len}")]
    BadVector {
        index: usize,
        field: &'static str,
        len: usize,
    },

    #[error("body {index}: `{field}` must be {expected}")]
    InvalidBody {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

#[allow(non_snake_case)]
#[derive(Debug, Error)]
pub enum SimError {
    #[error("initialize failed ({bodies} bodies, G = {G}, eps = {eps}): {source}")]
    Configuration {
        bodies: usize,
        G: f32,
        eps: f32,
        #[source]
        source: ConfigError,
    },

    #[error("could not allocate {buffer} for {bodies} bodies")]
    ResourceExhausted {
        buffer: &'static str,
        bodies: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("could not start {lanes} tiled worker threads")]
    LanePool {
        lanes: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("field of {width} x {height} texels does not fit in memory")]
    FieldTooLarge { width: usize, height: usize },

    #[error("{buffer} buffer too small at step {step}: need {needed} floats, got {got}")]
    BufferTooSmall {
        buffer: &'static str,
        step: u64,
        needed: usize,
        got: usize,
    },

    #[error("invalid time step {dt} at step {step}")]
    InvalidTimeStep { step: u64, dt: f32 },
}

impl SimError {
    /// Configuration errors are the only ones a host can fix by editing the scenario
    pub fn is_configuration(&self) -> bool {
        matches!(self, SimError::Configuration { .. })
    }
}
