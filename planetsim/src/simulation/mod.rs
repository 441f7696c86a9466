pub mod states;
pub mod params;
pub mod engine;
pub mod seeding;
pub mod forces;
pub mod tiled;
pub mod integrator;
pub mod scenario;
