//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only enters through the `dt` passed to `tick`
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, activate_power_up, heart_points, resolve_collisions};
pub use state::{
    Combo, Effect, EffectKind, GameEvent, GamePhase, GameState, Heart, HeartKind, Obstacle,
    ObstacleKind, Particle, Player, PowerUp, PowerUpKind, PowerUpTimers, Snapshot,
};
pub use tick::{TickInput, autopilot_velocity, tick};
