//! Acceleration model and force evaluation strategies
//!
//! [`GravityModel`] is the single pairwise law. A [`ForceEvaluator`] decides
//! how the pairs are visited: [`NaiveGravity`] sums every source per target,
//! [`TiledGravity`](super::tiled::TiledGravity) stages sources through cohort
//! buffers. The strategy is picked once from the engine settings.

use rayon::prelude::*;

use super::engine::Engine;
use super::params::Parameters;
use super::states::{CentralMass, NVec3, NVec4};
use super::tiled::TiledGravity;
use crate::configuration::config::ForceConfig;
use crate::error::SimError;

/// Softened Newtonian gravity, optionally with the fixed central mass
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct GravityModel {
    pub G: f32,   // gravitational constant
    pub eps: f32, // softening
    pub central: Option<CentralMass>,
}

impl GravityModel {
    pub fn new(params: &Parameters) -> Self {
        Self {
            G: params.G,
            eps: params.eps,
            central: Some(CentralMass::at_origin(params.central_mass)),
        }
    }

    /// Same law, real bodies only
    pub fn without_central(self) -> Self {
        Self { central: None, ..self }
    }

    /// Acceleration at `x` caused by `other` (position + mass):
    /// `G m (x_o - x) / (r + eps)^3`
    ///
    /// `other == x` gives exactly zero, so a body may safely be summed against itself.
    #[inline]
    pub fn pairwise(&self, x: NVec3, other: NVec4) -> NVec3 {
        let d = other.xyz() - x;
        let soft = d.norm() + self.eps;
        d * (self.G * other.w / (soft * soft * soft))
    }

    #[inline]
    pub fn central_term(&self, x: NVec3) -> NVec3 {
        match self.central {
            Some(c) => self.pairwise(x, c.packed()),
            None => NVec3::zeros(),
        }
    }

    /// Central term first, then every source in index order
    pub fn net_acceleration(&self, x: NVec3, sources: &[NVec4]) -> NVec3 {
        sources
            .iter()
            .fold(self.central_term(x), |acc, s| acc + self.pairwise(x, *s))
    }
}

/// Strategy for accumulating net accelerations
///
/// Implementations overwrite `out[i]` with the net acceleration at
/// `targets[i].xyz()` due to the model's central mass and every entry of
/// `sources`. The `w` component of a target is ignored.
pub trait ForceEvaluator: Send + Sync {
    fn name(&self) -> &'static str;

    fn accumulate_accels(&self, model: &GravityModel, targets: &[NVec4], sources: &[NVec4], out: &mut [NVec3]);

    /// Net acceleration on body `index` of `positions`, `None` past the end
    fn net_acceleration(&self, model: &GravityModel, index: usize, positions: &[NVec4]) -> Option<NVec3> {
        let target = positions.get(index..=index)?;
        let mut out = [NVec3::zeros()];
        self.accumulate_accels(model, target, positions, &mut out);
        Some(out[0])
    }
}

/// Direct summation, one rayon task per target
pub struct NaiveGravity;

impl ForceEvaluator for NaiveGravity {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn accumulate_accels(&self, model: &GravityModel, targets: &[NVec4], sources: &[NVec4], out: &mut [NVec3]) {
        debug_assert_eq!(targets.len(), out.len());
        out.par_iter_mut()
            .zip(targets.par_iter())
            .for_each(|(a, t)| *a = model.net_acceleration(t.xyz(), sources));
    }
}

/// Build the evaluator selected by the engine settings. The tiled evaluator
/// starts its lane threads here.
pub fn evaluator_for(engine: &Engine) -> Result<Box<dyn ForceEvaluator>, SimError> {
    Ok(match engine.force {
        ForceConfig::Naive => Box::new(NaiveGravity),
        ForceConfig::Tiled => Box::new(TiledGravity::new(engine.cohort_size, engine.cohorts)?),
    })
}
