//! Centralized error types for the game core.
//!
//! Per-tick anomalies never surface as errors; they resolve into hit, miss or
//! no-op transitions. What remains here is level validation, rejected inputs,
//! catalog loading and storage access.

/// Main error type for the game core.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Invalid level: {0}")]
    InvalidLevel(#[from] LevelError),

    #[error("A projectile is already in flight")]
    AlreadyInFlight,

    #[error("Illegal transition: {0}")]
    IllegalTransition(&'static str),

    #[error("Unknown level: {0}")]
    UnknownLevel(u32),

    #[error("Duplicate level id in catalog: {0}")]
    DuplicateLevel(u32),

    #[error("Invalid ring config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    #[error("Level catalog error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Reasons a level configuration is rejected before play starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("level id must be positive")]
    ZeroId,

    #[error("level has no sectors")]
    NoSectors,

    #[error("sector {index} has width {width}, expected (0, {max}]")]
    SectorWidth { index: usize, width: f32, max: f32 },

    #[error("sector widths sum to {total}, more than {max}")]
    TotalAngle { total: f32, max: f32 },

    #[error("{colors} colors for {sectors} sectors")]
    ColorCount { sectors: usize, colors: usize },

    #[error("rotation rate must be finite and non-zero, got {0}")]
    RotationRate(f32),

    #[error("projectile rate must be finite and positive, got {0}")]
    ProjectileRate(f32),
}

/// Errors raised by a key-value store backend.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed value for {key}: {value}")]
    Malformed { key: String, value: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
