//! The single in-flight projectile
//!
//! Travel is normalized: progress 0 is the launcher, 1 is the collision point.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::palette::Color;

/// A projectile heading for the ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub color: Color,
    /// Travel progress in [0, 1]
    pub progress: f32,
    /// Progress gained per second
    pub rate: f32,
    /// Set once the arrival event has been handed out
    arrived: bool,
}

impl Projectile {
    pub fn new(color: Color, rate: f32) -> Self {
        Self {
            color,
            progress: 0.0,
            rate,
            arrived: false,
        }
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Seconds until arrival at the current rate
    pub fn time_to_arrival(&self) -> f32 {
        if self.rate <= 0.0 {
            return f32::INFINITY;
        }
        (1.0 - self.progress).max(0.0) / self.rate
    }
}

/// Emitted once, on the tick a projectile reaches the collision point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    pub color: Color,
}

/// Holds at most one projectile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileSlot {
    current: Option<Projectile>,
}

impl ProjectileSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch a projectile; fails if one already occupies the slot
    pub fn fire(&mut self, color: Color, rate: f32) -> GameResult<()> {
        if self.current.is_some() {
            return Err(GameError::AlreadyInFlight);
        }
        self.current = Some(Projectile::new(color, rate));
        Ok(())
    }

    /// Move the projectile along; returns the arrival the first time progress hits 1
    pub fn advance(&mut self, dt: f32) -> Option<Arrival> {
        let projectile = self.current.as_mut()?;
        if projectile.arrived {
            return None;
        }

        projectile.progress = (projectile.progress + projectile.rate * dt).min(1.0);
        if projectile.progress >= 1.0 {
            projectile.arrived = true;
            return Some(Arrival {
                color: projectile.color,
            });
        }
        None
    }

    pub fn get(&self) -> Option<&Projectile> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Remove and return the projectile (the caller resolves arrivals)
    pub fn take(&mut self) -> Option<Projectile> {
        self.current.take()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
