//! Color Ring - a rotating ring reflex game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ring geometry, rotation, projectile, level and session state)
//! - `progression`: Unlocked-level tracking and location tokens
//! - `persistence`: Key-value store backends
//! - `palette`: Game colors and seeded color selection
//! - `settings`: Tunable timing and layout configuration

pub mod error;
pub mod palette;
pub mod persistence;
pub mod progression;
pub mod settings;
pub mod sim;

pub use error::{GameError, GameResult, LevelError, StorageError};
pub use palette::Color;
pub use progression::{Location, Progression, Route};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 30;
    /// Fixed simulation timestep at the default rate
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the loop will try to catch up on (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.25;

    /// Sum of all sector widths must not exceed a full turn
    pub const MAX_TOTAL_ANGLE: f32 = 360.0;
    /// Widest sector the ring can draw (a skewed quarter tile stops working past this)
    pub const MAX_SECTOR_WIDTH: f32 = 170.0;

    /// Seconds per full turn at a rotation rate of 1.0
    pub const ROTATION_PERIOD_SCALE: f32 = 5.0;
    /// Where projectiles meet the ring (degrees clockwise from the top, 180 = bottom)
    pub const COLLISION_POINT: f32 = 180.0;

    /// Levels are numbered from 1; level 1 is always playable
    pub const FIRST_LEVEL: u32 = 1;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest absolute separation between two angles in degrees, in [0, 180]
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = normalize_degrees(a - b);
    if d > 180.0 { 360.0 - d } else { d }
}
