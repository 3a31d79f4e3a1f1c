pub mod engine;

pub use engine::{EngineSettings, MonitorEngine, Observation};
