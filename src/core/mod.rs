//! Core types: coordinates, deterministic RNG, engine configuration.

pub mod config;
pub mod coord;
pub mod rng;

pub use config::{EngineConfig, STANDARD_BOARD_SIZE, STANDARD_FLEET};
pub use coord::{Coord, Orientation};
pub use rng::EngineRng;
