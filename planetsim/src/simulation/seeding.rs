//! Deterministic initial conditions.
//!
//! Every body draws its random numbers from its own stream: an avalanche
//! hash of `(index, seed)` seeds a ChaCha generator, which feeds a uniform
//! `[0, 1)` distribution. The same `(index, seed)` always produces the same
//! vector, regardless of thread scheduling.

use rand::distributions::Uniform;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::states::{CentralMass, NVec3};

/// Stream offset so velocities do not reuse the position draws
const VELOCITY_STREAM: u32 = 0x5bd1_e995;

/// Bob Jenkins' 32-bit integer mix. Small input changes flip about half the output bits.
pub fn hash(mut a: u32) -> u32 {
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a = (a ^ 0xc761_c23c) ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    a = (a ^ 0xb55a_4f09) ^ (a >> 16);
    a
}

/// Uniform sample in `[0, 1)^3` for body `index` under `seed`
pub fn sample_unit(index: usize, seed: u32) -> NVec3 {
    let key = hash((index as u32) ^ hash(seed));
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(key));
    let unit = Uniform::new(0.0f32, 1.0f32);
    NVec3::new(rng.sample(unit), rng.sample(unit), rng.sample(unit))
}

/// Uniform scatter over the disk of diameter `scale` in the xy plane.
/// The radius is never zero, so every body has a defined circular orbit.
pub fn disk_position(index: usize, seed: u32, scale: f32) -> NVec3 {
    let u = sample_unit(index, seed);
    // sqrt keeps the area density uniform; 1 - u moves the range to (0, 1]
    let radius = 0.5 * scale * (1.0 - u.x).sqrt();
    let angle = std::f32::consts::TAU * u.y;
    NVec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
}

/// In-plane velocity with each component in `[-speed, speed)`
pub fn random_velocity(index: usize, seed: u32, speed: f32) -> NVec3 {
    let u = sample_unit(index, seed ^ VELOCITY_STREAM);
    NVec3::new((2.0 * u.x - 1.0) * speed, (2.0 * u.y - 1.0) * speed, 0.0)
}

/// Velocity of a circular orbit around `central`: magnitude `sqrt(G M / r)`,
/// direction `up x r` (counter-clockwise seen from +z).
#[allow(non_snake_case)]
pub fn circular_velocity(x: NVec3, central: &CentralMass, G: f32) -> NVec3 {
    let rel = x - central.x;
    let r = rel.norm();
    let tangent = NVec3::z().cross(&rel);
    let len = tangent.norm();
    // on the axis through the central mass there is no tangent direction
    if r <= 0.0 || len <= 0.0 {
        return NVec3::zeros();
    }
    let speed = (G * central.m / r).sqrt();
    tangent * (speed / len)
}
