//! High-level runtime engine settings
//!
//! Selects the force strategy, integrator, velocity initializer and cohort
//! geometry used when building and running a `Scenario`

use crate::configuration::config::{EngineConfig, ForceConfig, IntegratorConfig, VelocityConfig};
use crate::error::ConfigError;

/// Widest cohort the tiled evaluator accepts
pub const MAX_COHORT_SIZE: usize = 1024;

/// Upper bound on `cohort_size * cohorts`, the tiled worker thread count
pub const MAX_LANES: usize = 4096;

const DEFAULT_COHORT_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct Engine {
    pub force: ForceConfig,            // naive or tiled
    pub integrator: IntegratorConfig,  // euler, midpoint or quartic
    pub velocity_init: VelocityConfig, // circular orbits or random scatter
    pub cohort_size: usize,            // workers per cohort, also the tile width
    pub cohorts: usize,                // cohorts running concurrently
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            force: ForceConfig::Naive,
            integrator: IntegratorConfig::Euler,
            velocity_init: VelocityConfig::Circular,
            cohort_size: DEFAULT_COHORT_SIZE,
            cohorts: default_cohorts(DEFAULT_COHORT_SIZE),
        }
    }
}

impl Engine {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            force: cfg.force,
            integrator: cfg.integrator,
            velocity_init: cfg.velocity_init,
            cohort_size: cfg.cohort_size,
            cohorts: cfg.cohorts.unwrap_or_else(|| default_cohorts(cfg.cohort_size)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cohort_size == 0 {
            return Err(ConfigError::ZeroCohortSize);
        }
        if self.cohorts == 0 {
            return Err(ConfigError::ZeroCohorts);
        }
        if self.cohort_size > MAX_COHORT_SIZE {
            return Err(ConfigError::CohortTooLarge {
                cohort_size: self.cohort_size,
                max: MAX_COHORT_SIZE,
            });
        }
        match self.cohort_size.checked_mul(self.cohorts) {
            Some(lanes) if lanes <= MAX_LANES => Ok(()),
            _ => Err(ConfigError::TooManyLanes {
                cohort_size: self.cohort_size,
                cohorts: self.cohorts,
                max: MAX_LANES,
            }),
        }
    }
}

/// One cohort per available core, as many as fit under [`MAX_LANES`]
pub fn default_cohorts(cohort_size: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.min(MAX_LANES / cohort_size.max(1)).max(1)
}
