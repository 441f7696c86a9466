//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size and end time,
//! - softening and gravitational constant (`eps`, `G`),
//! - planet and central masses, spatial scale,
//! - deterministic seed and random velocity spread

use crate::error::ConfigError;

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub t_end: f32,        // time end
    pub h0: f32,           // step size
    pub seed: u32,         // deterministic seed
    pub eps: f32,          // softening, added to the separation
    pub G: f32,            // gravitational constant
    pub planet_mass: f32,  // uniform mass of generated bodies
    pub central_mass: f32, // mass of the fixed body at the origin
    pub scale: f32,        // diameter of the seeding disk
    pub random_speed: f32, // spread of random initial velocities
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            h0: 0.001,
            seed: 42,
            eps: 0.01,
            G: 1.0,
            planet_mass: 0.001,
            central_mass: 1000.0,
            scale: 10.0,
            random_speed: 0.5,
        }
    }
}

impl Parameters {
    /// Reject values the force law or the seeding cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("G", self.G, self.G.is_finite() && self.G >= 0.0, "finite and non-negative")?;
        check("eps", self.eps, self.eps.is_finite() && self.eps > 0.0, "finite and positive")?;
        check("scale", self.scale, self.scale.is_finite() && self.scale > 0.0, "finite and positive")?;
        check(
            "planet_mass",
            self.planet_mass,
            self.planet_mass.is_finite() && self.planet_mass >= 0.0,
            "finite and non-negative",
        )?;
        check(
            "central_mass",
            self.central_mass,
            self.central_mass.is_finite() && self.central_mass >= 0.0,
            "finite and non-negative",
        )?;
        check("h0", self.h0, self.h0.is_finite() && self.h0 > 0.0, "finite and positive")?;
        check(
            "random_speed",
            self.random_speed,
            self.random_speed.is_finite() && self.random_speed >= 0.0,
            "finite and non-negative",
        )?;
        Ok(())
    }

    /// Number of fixed steps needed to reach `t_end`. Rounded, since
    /// `t_end / h0` rarely divides exactly in f32.
    pub fn step_count(&self) -> u64 {
        (self.t_end / self.h0).round().max(0.0) as u64
    }
}

fn check(name: &'static str, value: f32, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value, expected })
    }
}
