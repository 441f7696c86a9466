//! Projection of body state into host-owned render buffers
//!
//! Both buffers are derived data: they are fully overwritten on every call
//! and the host owns their memory.
//!
//! - vertex buffer: `[x * k, y * k, 0, 1]` per body, `k = 2 / scale`, so the
//!   seeding disk fills clip space
//! - field buffer: one value per texel, the compressed magnitude of the pull
//!   of every real body at that point, in `[0, 1]`

use rayon::prelude::*;

use crate::configuration::config::ProjectionConfig;
use crate::error::SimError;
use crate::simulation::scenario::{alloc, Scenario};
use crate::simulation::states::{NVec3, NVec4};

/// Floats per body in the vertex buffer
pub const VERTEX_STRIDE: usize = 4;

#[derive(Debug, Clone)]
pub struct Projection {
    pub vertex_scale: f32,    // world -> clip space factor
    pub field_extent: f32,    // world-space width covered by the field
    pub field_gain: f32,      // applied before compression
    pub root_iterations: u32, // how many square roots compress the field
    pub width: usize,         // preferred field resolution
    pub height: usize,
}

impl Projection {
    pub fn for_scale(scale: f32) -> Self {
        Self {
            vertex_scale: 2.0 / scale,
            field_extent: scale,
            field_gain: 1.0,
            root_iterations: 2,
            width: 256,
            height: 256,
        }
    }

    pub fn from_config(cfg: &ProjectionConfig, scale: f32) -> Self {
        Self {
            field_extent: cfg.field_extent.unwrap_or(scale),
            field_gain: cfg.field_gain,
            root_iterations: cfg.root_iterations,
            width: cfg.width,
            height: cfg.height,
            ..Self::for_scale(scale)
        }
    }

    /// Compress an acceleration magnitude into `[0, 1]`. NaN maps to 0.
    pub fn field_value(&self, magnitude: f32) -> f32 {
        let mut v = magnitude * self.field_gain;
        for _ in 0..self.root_iterations {
            v = v.sqrt();
        }
        v.max(0.0).min(1.0)
    }

    /// Zero-mass probes at texel centers, row-major, centered on the origin.
    /// Texels are square; the grid spans `field_extent` horizontally.
    pub fn probe_grid(&self, width: usize, height: usize) -> Result<Vec<NVec4>, SimError> {
        let texels = texel_count(width, height)?;
        let mut probes = Vec::new();
        probes
            .try_reserve_exact(texels)
            .map_err(|source| SimError::ResourceExhausted {
                buffer: "field probes",
                bodies: texels,
                source,
            })?;

        let texel = self.field_extent / width.max(1) as f32;
        let (cx, cy) = (0.5 * width as f32, 0.5 * height as f32);
        probes.extend((0..height).flat_map(|row| {
            (0..width).map(move |col| {
                let x = (col as f32 + 0.5 - cx) * texel;
                let y = (row as f32 + 0.5 - cy) * texel;
                NVec4::new(x, y, 0.0, 0.0)
            })
        }));
        Ok(probes)
    }
}

fn texel_count(width: usize, height: usize) -> Result<usize, SimError> {
    width
        .checked_mul(height)
        .ok_or(SimError::FieldTooLarge { width, height })
}

impl Scenario {
    /// Fill `dest` with one `[x k, y k, 0, 1]` record per body.
    ///
    /// Clip space does not depend on the render target, so `width` and
    /// `height` only describe it to the host.
    pub fn write_vertex_buffer(&self, dest: &mut [f32], _width: usize, _height: usize) -> Result<(), SimError> {
        let needed = self.system.len() * VERTEX_STRIDE;
        if dest.len() < needed {
            return Err(SimError::BufferTooSmall {
                buffer: "vertex",
                step: self.system.step,
                needed,
                got: dest.len(),
            });
        }

        let k = self.projection.vertex_scale;
        dest[..needed]
            .par_chunks_exact_mut(VERTEX_STRIDE)
            .zip(self.system.positions.par_iter())
            .for_each(|(v, p)| v.copy_from_slice(&[p.x * k, p.y * k, 0.0, 1.0]));
        Ok(())
    }

    /// Fill `dest` (row-major, `width * height`) with the compressed pull of
    /// all bodies at each texel. The central mass is left out.
    pub fn write_field_buffer(&self, dest: &mut [f32], width: usize, height: usize) -> Result<(), SimError> {
        let needed = texel_count(width, height)?;
        if dest.len() < needed {
            return Err(SimError::BufferTooSmall {
                buffer: "field",
                step: self.system.step,
                needed,
                got: dest.len(),
            });
        }
        if needed == 0 {
            return Ok(());
        }

        let probes = self.projection.probe_grid(width, height)?;
        let mut accel = alloc("field accelerations", needed, NVec3::zeros())?;
        let model = self.gravity.without_central();
        self.forces
            .accumulate_accels(&model, &probes, &self.system.positions, &mut accel);

        dest[..needed]
            .par_iter_mut()
            .zip(accel.par_iter())
            .for_each(|(d, a)| *d = self.projection.field_value(a.norm()));
        Ok(())
    }
}
