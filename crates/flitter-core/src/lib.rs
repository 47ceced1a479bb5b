//! Flitter core engine: platform-agnostic flight path, smoke trail and cursor logic.
//!
//! One [`Simulation`] owns every piece of animation state. Call
//! [`Simulation::tick`] once per display frame and hand the returned
//! [`FrameView`] to a renderer.

pub mod config;
pub mod error;
pub mod flight;
pub mod frame;
pub mod pointer;
pub mod random;
pub mod simulation;
pub mod trail;

pub use config::{EngineConfig, FlightConfig, PointerConfig, TrailPreset};
pub use error::ConfigError;
pub use flight::FlightController;
pub use frame::{DrawLayer, EntityTransform, EntityUniform, FrameSnapshot, FrameView};
pub use pointer::{PointerFollower, PointerSnapshot, WandState};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use simulation::Simulation;
pub use trail::{Particle, ParticlePool, SENTINEL_POSITION};
