pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{ConfigError, SimError};

pub use simulation::states::{Body, CentralMass, System, NVec3, NVec4};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::forces::{ForceEvaluator, GravityModel, NaiveGravity};
pub use simulation::tiled::TiledGravity;
pub use simulation::integrator::{Integrator, EulerIntegrator, MidpointIntegrator};
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, ForceConfig, VelocityConfig, EngineConfig, ParametersConfig, ProjectionConfig, BodyConfig, ScenarioConfig};

pub use visualization::projection::{Projection, VERTEX_STRIDE};

pub use benchmark::benchmark::{bench_gravity, bench_step};
