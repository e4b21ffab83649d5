//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Ring angle tracked as state, never read back from a renderer
//! - No rendering or platform dependencies

pub mod geometry;
pub mod level;
pub mod projectile;
pub mod rotator;
pub mod state;
pub mod tick;

pub use geometry::{SectorBounds, build_sector_bounds, sector_index_at};
pub use level::{Level, LevelCatalog};
pub use projectile::{Arrival, Projectile, ProjectileSlot};
pub use rotator::{Direction, ReversalArc, Rotator, RotatorMode};
pub use state::{LevelEvent, LevelPhase, LevelState, Miss, RingConfig, Sector, SectorRing};
pub use tick::{GameLoop, GameSession, RenderSnapshot, SessionEvent, SessionState, TickInput, tick};
