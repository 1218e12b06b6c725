//! Error types shared across the crate.

/// Invalid game balance. Rejected before a session is created.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TuningError {
    #[error("{name} must be a positive, finite number (got {value})")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f32 },

    #[error("slow time factor must be in (0, 1] (got {0})")]
    SlowFactor(f32),

    #[error("{name} multiplier must be at least 1 (got {value})")]
    Multiplier { name: &'static str, value: f32 },

    #[error("{name} range is inverted ({min}..{max})")]
    InvertedRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("special heart odds add up to more than 1 (got {0})")]
    Odds(f32),

    #[error("combo threshold must be at least 1")]
    ComboThreshold,

    #[error("starting lives must be at least 1")]
    StartingLives,

    #[error("invalid tuning JSON: {0}")]
    Json(String),
}

/// Key/value storage failures. Never fatal to gameplay.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("stored value for {key} is corrupt: {value}")]
    Corrupt { key: String, value: String },
}

/// Drawing failures reported by a render sink.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("render surface lost")]
    SurfaceLost,

    #[error("render failed: {0}")]
    Other(String),
}
