//! Core state types for the planetary simulation.
//!
//! Body state is stored as two parallel arrays sharing one index space:
//! - `positions[i]`  packs position and mass as `(x, y, z, w = mass)`
//! - `velocities[i]` holds the velocity of the same body
//!
//! The central mass is not stored here; see [`CentralMass`].

use nalgebra::{Vector3, Vector4};

pub type NVec3 = Vector3<f32>;
pub type NVec4 = Vector4<f32>;

/// Build a packed position/mass record
#[inline]
pub fn pack(x: NVec3, mass: f32) -> NVec4 {
    NVec4::new(x.x, x.y, x.z, mass)
}

/// Unpacked view of one body, handy for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub m: f32,   // mass
}

/// Fixed massive body at the origin. Pulls on everything, never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralMass {
    pub x: NVec3,
    pub m: f32,
}

impl CentralMass {
    pub fn at_origin(m: f32) -> Self {
        Self { x: NVec3::zeros(), m }
    }

    /// Packed record, so it can be fed to the pairwise law like any body
    pub fn packed(&self) -> NVec4 {
        pack(self.x, self.m)
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub positions: Vec<NVec4>,  // position + mass per body
    pub velocities: Vec<NVec3>, // velocity per body
    pub t: f32,                 // time
    pub step: u64,              // completed steps
}

impl System {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn body(&self, i: usize) -> Body {
        let p = self.positions[i];
        Body {
            x: p.xyz(),
            v: self.velocities[i],
            m: p.w,
        }
    }

    /// Mass-weighted mean position of the stored bodies (central mass excluded)
    pub fn center_of_mass(&self) -> NVec3 {
        let (weighted, total) = self
            .positions
            .iter()
            .fold((NVec3::zeros(), 0.0f32), |(acc, m), p| (acc + p.xyz() * p.w, m + p.w));
        if total > 0.0 {
            weighted / total
        } else {
            NVec3::zeros()
        }
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.positions
            .iter()
            .zip(self.velocities.iter())
            .map(|(p, v)| 0.5 * p.w * v.norm_squared())
            .sum()
    }
}
