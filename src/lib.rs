//! Heartfall - a falling-hearts arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, scoring)
//! - `driver`: Per-frame game loop that feeds the simulation and its sinks
//! - `platform`: Render/notification/input contracts
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `renderer`: Text and Canvas 2D render sinks
//! - `tuning`: Data-driven game balance

pub mod driver;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use driver::{GameLoop, LoopControl};
pub use error::{RenderError, StoreError, TuningError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Reference frame length in milliseconds. Velocities are expressed per reference frame.
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest frame the driver will feed into the simulation (ms)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Default play field
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Entity sizes
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const HEART_SIZE: f32 = 30.0;
    pub const OBSTACLE_SIZE: f32 = 40.0;
    pub const POWER_UP_SIZE: f32 = 40.0;

    /// Player starts this far above the bottom edge
    pub const PLAYER_START_OFFSET: f32 = 100.0;

    /// Particles emitted per burst
    pub const BURST_PARTICLES: usize = 20;
    /// Special effects finish at this progress value
    pub const EFFECT_DONE: f32 = 100.0;
    /// Radius of the explosion effect on special hearts
    pub const EXPLOSION_RADIUS: f32 = 50.0;
}
