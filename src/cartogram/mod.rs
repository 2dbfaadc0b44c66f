mod config;
mod engine;
mod state;

pub use config::{COMPUTE_FPS, DEFAULT_GRACE_STEPS, EngineConfig};
pub use engine::Cartogram;
pub use state::{RegionState, Status};
