//! Per-attempt level state
//!
//! `LevelState` ties the ring, its rotation and the projectile together for one
//! try at a level. Everything is rebuilt from the `Level` on start and thrown
//! away on exit or retry.

use serde::{Deserialize, Serialize};

use super::geometry::{SectorBounds, sector_index_at};
use super::level::Level;
use super::projectile::{Arrival, Projectile, ProjectileSlot};
use super::rotator::Rotator;
use crate::consts::{COLLISION_POINT, ROTATION_PERIOD_SCALE};
use crate::error::{GameError, GameResult};
use crate::normalize_degrees;
use crate::palette::Color;

/// Timing and layout values shared by every level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Ring-frame angle where projectiles land (degrees)
    pub collision_point: f32,
    /// Seconds per turn at rotation rate 1.0
    pub rotation_period_scale: f32,
}

impl RingConfig {
    /// Reject values that would make the ring spin infinitely fast or land nowhere
    pub fn validate(&self) -> GameResult<()> {
        if !self.rotation_period_scale.is_finite() || self.rotation_period_scale <= 0.0 {
            return Err(GameError::InvalidConfig {
                field: "rotation_period_scale",
                value: self.rotation_period_scale,
            });
        }
        if !self.collision_point.is_finite() {
            return Err(GameError::InvalidConfig {
                field: "collision_point",
                value: self.collision_point,
            });
        }
        Ok(())
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            collision_point: COLLISION_POINT,
            rotation_period_scale: ROTATION_PERIOD_SCALE,
        }
    }
}

/// One colored slice of the ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub bounds: SectorBounds,
    pub color: Color,
    /// False once the sector has been shot away
    pub live: bool,
}

/// The ring's sectors; removed sectors leave a gap and keep their index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRing {
    bounds: Vec<SectorBounds>,
    sectors: Vec<Sector>,
}

impl SectorRing {
    /// Pair bounds with colors (both already validated to the same length)
    pub fn new(bounds: Vec<SectorBounds>, colors: &[Color]) -> Self {
        let sectors = bounds
            .iter()
            .zip(colors)
            .map(|(&bounds, &color)| Sector {
                bounds,
                color,
                live: true,
            })
            .collect();
        Self { bounds, sectors }
    }

    /// Live sector covering a ring angle; None for gaps and removed sectors
    pub fn sector_at(&self, angle: f32) -> Option<usize> {
        sector_index_at(&self.bounds, angle).filter(|&i| self.sectors[i].live)
    }

    /// Shoot a sector away, returning it if it was still live
    pub fn remove(&mut self, index: usize) -> Option<Sector> {
        let sector = self.sectors.get_mut(index).filter(|s| s.live)?;
        sector.live = false;
        Some(*sector)
    }

    pub fn get(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    /// Live sectors in ring order, with their stable indices
    pub fn live_sectors(&self) -> impl Iterator<Item = (usize, &Sector)> {
        self.sectors.iter().enumerate().filter(|(_, s)| s.live)
    }

    pub fn live_count(&self) -> usize {
        self.sectors.iter().filter(|s| s.live).count()
    }

    /// True when every sector has been removed
    pub fn is_cleared(&self) -> bool {
        self.live_count() == 0
    }

    /// Sectors ever built for this attempt, live or not
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Sum of all sector widths
    pub fn total_angle(&self) -> f32 {
        self.bounds.last().map(|b| b.end).unwrap_or(0.0)
    }
}

/// Where a level attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Waiting for a fire signal
    Idle,
    /// A projectile is travelling
    Flying,
    /// Every sector removed
    Complete,
    /// A shot missed
    Failed,
}

/// Why a shot counted as a miss
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Miss {
    /// Nothing live under the collision point
    Gap { angle: f32 },
    /// A sector was there but its color differed
    WrongColor {
        sector: usize,
        sector_color: Color,
        fired: Color,
    },
}

/// Outcome of a tick that resolved a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelEvent {
    /// Sector removed, sectors remain
    Hit { sector: usize, reversed: bool },
    /// Last sector removed
    Complete { sector: usize },
    /// Shot missed; the ring is frozen
    Failed(Miss),
}

/// State of one attempt at a level
#[derive(Debug, Clone)]
pub struct LevelState {
    level: Level,
    config: RingConfig,
    ring: SectorRing,
    rotator: Rotator,
    projectile: ProjectileSlot,
    phase: LevelPhase,
    hits: u32,
}

impl LevelState {
    /// Validate the level and set up a fresh attempt
    pub fn start(level: Level, config: RingConfig) -> GameResult<Self> {
        config.validate()?;
        let bounds = level.sector_bounds()?;
        let ring = SectorRing::new(bounds, &level.sector_colors);
        let rotator = Rotator::from_rate(level.rotation_rate, config.rotation_period_scale);

        log::info!(
            "Level {} start: {} sectors over {:.0}°, period {:.2}s, reverse_on_hit={}",
            level.id,
            ring.len(),
            ring.total_angle(),
            rotator.full_rotation_period(),
            level.reverse_on_hit
        );

        Ok(Self {
            level,
            config,
            ring,
            rotator,
            projectile: ProjectileSlot::new(),
            phase: LevelPhase::Idle,
            hits: 0,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    pub fn ring(&self) -> &SectorRing {
        &self.ring
    }

    pub fn rotator(&self) -> &Rotator {
        &self.rotator
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.get()
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, LevelPhase::Complete | LevelPhase::Failed)
    }

    /// Launch a projectile of `color` toward the ring
    pub fn on_fire_signal(&mut self, color: Color) -> GameResult<()> {
        if self.is_finished() {
            return Err(GameError::IllegalTransition("level is already over"));
        }
        if self.rotator.is_frozen() {
            return Err(GameError::IllegalTransition("ring is frozen"));
        }
        self.projectile.fire(color, self.level.projectile_rate)?;
        self.phase = LevelPhase::Flying;
        Ok(())
    }

    /// Freeze the ring, keeping every bit of state for `resume`
    pub fn pause(&mut self) {
        self.rotator.freeze();
    }

    pub fn resume(&mut self) {
        if !self.is_finished() {
            self.rotator.resume();
        }
    }

    /// Advance one step; resolves the projectile if it lands this tick
    pub fn tick(&mut self, dt: f32) -> Option<LevelEvent> {
        if self.is_finished() {
            return None;
        }
        self.rotator.advance(dt);
        let arrival = self.projectile.advance(dt)?;
        Some(self.resolve(arrival))
    }

    /// Ring-frame angle currently under the collision point
    pub fn collision_angle(&self) -> f32 {
        normalize_degrees(self.config.collision_point - self.rotator.current_angle())
    }

    /// Color of the live sector at the collision point right now
    pub fn color_at_collision_point(&self) -> Option<Color> {
        let index = self.ring.sector_at(self.collision_angle())?;
        self.ring.get(index).map(|s| s.color)
    }

    /// Color under the collision point when a shot fired now would land,
    /// stepping a copy of the rotator the same way `tick` does.
    pub fn predict_color_on_arrival(&self, dt: f32) -> Option<Color> {
        if dt <= 0.0 {
            return None;
        }
        let mut rotator = self.rotator.clone();
        let mut flight = Projectile::new(Color::from_hex(0), self.level.projectile_rate);
        // Same accumulation as ProjectileSlot::advance so the tick count matches
        for _ in 0..100_000 {
            rotator.advance(dt);
            flight.progress = (flight.progress + flight.rate * dt).min(1.0);
            if flight.progress >= 1.0 {
                let angle = normalize_degrees(self.config.collision_point - rotator.current_angle());
                let index = self.ring.sector_at(angle)?;
                return self.ring.get(index).map(|s| s.color);
            }
        }
        None
    }

    fn resolve(&mut self, arrival: Arrival) -> LevelEvent {
        self.projectile.clear();
        let angle = self.collision_angle();

        let target = self
            .ring
            .sector_at(angle)
            .and_then(|i| self.ring.get(i).map(|s| (i, s.color)));

        match target {
            Some((sector, color)) if color == arrival.color => self.on_hit(sector),
            Some((sector, sector_color)) => self.on_miss(Miss::WrongColor {
                sector,
                sector_color,
                fired: arrival.color,
            }),
            None => self.on_miss(Miss::Gap { angle }),
        }
    }

    fn on_hit(&mut self, sector: usize) -> LevelEvent {
        self.ring.remove(sector);
        self.hits += 1;

        let reversed = self.level.reverse_on_hit;
        if reversed {
            self.rotator.reverse_direction();
        }
        log::debug!(
            "Level {}: hit sector {} ({} left, reversed={})",
            self.level.id,
            sector,
            self.ring.live_count(),
            reversed
        );

        if self.ring.is_cleared() {
            self.rotator.freeze();
            self.phase = LevelPhase::Complete;
            log::info!("Level {} complete after {} hits", self.level.id, self.hits);
            LevelEvent::Complete { sector }
        } else {
            self.phase = LevelPhase::Idle;
            LevelEvent::Hit { sector, reversed }
        }
    }

    fn on_miss(&mut self, miss: Miss) -> LevelEvent {
        self.rotator.freeze();
        self.phase = LevelPhase::Failed;
        log::info!("Level {} failed: {:?}", self.level.id, miss);
        LevelEvent::Failed(miss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::error::LevelError;
    use crate::sim::rotator::Direction;

    const R: Color = Color::from_hex(0xff0000);
    const G: Color = Color::from_hex(0x00ff00);
    const B: Color = Color::from_hex(0x0000ff);
    const Y: Color = Color::from_hex(0xffff00);

    fn quad_level() -> Level {
        Level {
            id: 1,
            name: String::new(),
            sector_widths: vec![90.0; 4],
            sector_colors: vec![R, G, B, Y],
            rotation_rate: 0.01,
            projectile_rate: 10.0,
            reverse_on_hit: false,
            ring_size: 60.0,
        }
    }

    /// Collision point in the middle of sector 1 (G)
    fn aimed_at_green() -> RingConfig {
        RingConfig {
            collision_point: 135.0,
            ..Default::default()
        }
    }

    fn run_until_event(state: &mut LevelState) -> LevelEvent {
        for _ in 0..10_000 {
            if let Some(event) = state.tick(SIM_DT) {
                return event;
            }
        }
        panic!("no event produced");
    }

    #[test]
    fn test_start_rejects_invalid_level() {
        let mut level = quad_level();
        level.sector_widths = vec![360.0];
        level.sector_colors = vec![R];
        let err = LevelState::start(level, RingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidLevel(LevelError::SectorWidth { .. })
        ));
    }

    #[test]
    fn test_start_rejects_bad_ring_config() {
        for scale in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let config = RingConfig {
                rotation_period_scale: scale,
                ..Default::default()
            };
            assert!(matches!(
                LevelState::start(quad_level(), config),
                Err(GameError::InvalidConfig {
                    field: "rotation_period_scale",
                    ..
                })
            ));
        }

        let config = RingConfig {
            collision_point: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            LevelState::start(quad_level(), config),
            Err(GameError::InvalidConfig {
                field: "collision_point",
                ..
            })
        ));
    }

    #[test]
    fn test_hit_removes_only_target_sector() {
        let mut state = LevelState::start(quad_level(), aimed_at_green()).unwrap();
        let before: Vec<SectorBounds> = (0..4).map(|i| state.ring().get(i).unwrap().bounds).collect();

        state.on_fire_signal(G).unwrap();
        assert_eq!(state.phase(), LevelPhase::Flying);
        let event = run_until_event(&mut state);

        assert_eq!(event, LevelEvent::Hit { sector: 1, reversed: false });
        assert_eq!(state.ring().live_count(), 3);
        assert!(!state.ring().get(1).unwrap().live);
        for i in 0..4 {
            assert_eq!(state.ring().get(i).unwrap().bounds, before[i]);
        }
        assert_eq!(state.phase(), LevelPhase::Idle);
        assert!(state.projectile().is_none());
    }

    #[test]
    fn test_wrong_color_fails_and_freezes() {
        let mut state = LevelState::start(quad_level(), aimed_at_green()).unwrap();
        state.on_fire_signal(R).unwrap();
        let event = run_until_event(&mut state);

        assert!(matches!(
            event,
            LevelEvent::Failed(Miss::WrongColor { sector: 1, fired: R, .. })
        ));
        assert_eq!(state.phase(), LevelPhase::Failed);
        assert!(state.rotator().is_frozen());
        assert!(state.tick(SIM_DT).is_none());
        assert!(matches!(
            state.on_fire_signal(G),
            Err(GameError::IllegalTransition(_))
        ));
    }

    #[test]
    fn test_shooting_into_removed_gap_is_a_miss() {
        let mut state = LevelState::start(quad_level(), aimed_at_green()).unwrap();
        state.on_fire_signal(G).unwrap();
        run_until_event(&mut state);

        state.on_fire_signal(G).unwrap();
        let event = run_until_event(&mut state);
        assert!(matches!(event, LevelEvent::Failed(Miss::Gap { .. })));
    }

    #[test]
    fn test_partial_ring_gap_is_a_miss() {
        let mut level = quad_level();
        level.sector_widths = vec![90.0, 90.0];
        level.sector_colors = vec![R, G];
        // 270° lands in the uncovered half of the ring
        let config = RingConfig {
            collision_point: 270.0,
            ..Default::default()
        };
        let mut state = LevelState::start(level, config).unwrap();
        assert_eq!(state.color_at_collision_point(), None);
        state.on_fire_signal(R).unwrap();
        assert!(matches!(
            run_until_event(&mut state),
            LevelEvent::Failed(Miss::Gap { .. })
        ));
    }

    #[test]
    fn test_fire_while_in_flight_rejected() {
        let mut state = LevelState::start(quad_level(), aimed_at_green()).unwrap();
        state.on_fire_signal(G).unwrap();
        assert!(matches!(
            state.on_fire_signal(B),
            Err(GameError::AlreadyInFlight)
        ));
        assert_eq!(state.projectile().map(|p| p.color), Some(G));
    }

    #[test]
    fn test_pause_blocks_fire_and_keeps_angle() {
        let mut level = quad_level();
        level.rotation_rate = 1.0;
        let mut state = LevelState::start(level, RingConfig::default()).unwrap();
        state.tick(SIM_DT);
        state.pause();
        let angle = state.rotator().current_angle();

        assert!(matches!(
            state.on_fire_signal(R),
            Err(GameError::IllegalTransition(_))
        ));
        state.tick(SIM_DT);
        assert_eq!(state.rotator().current_angle(), angle);

        state.resume();
        state.tick(SIM_DT);
        assert!(state.rotator().current_angle() > angle);
        assert_eq!(state.rotator().direction(), Direction::Clockwise);
    }

    #[test]
    fn test_clearing_ring_completes_never_misses() {
        let mut level = quad_level();
        level.sector_widths = vec![90.0];
        level.sector_colors = vec![G];
        let mut state = LevelState::start(level, aimed_at_green()).unwrap();
        // Sector 0 spans 0..90, so aim there
        state.config.collision_point = 45.0;

        state.on_fire_signal(G).unwrap();
        assert_eq!(run_until_event(&mut state), LevelEvent::Complete { sector: 0 });
        assert_eq!(state.phase(), LevelPhase::Complete);
        assert!(state.ring().is_cleared());
        assert!(state.rotator().is_frozen());
        for _ in 0..100 {
            assert!(state.tick(SIM_DT).is_none());
        }
    }

    #[test]
    fn test_predicted_color_matches_landing() {
        let mut level = quad_level();
        level.rotation_rate = -1.3;
        level.projectile_rate = 1.5;
        let mut state = LevelState::start(level, RingConfig::default()).unwrap();
        for _ in 0..17 {
            state.tick(SIM_DT);
        }
        let predicted = state.predict_color_on_arrival(SIM_DT).unwrap();
        state.on_fire_signal(predicted).unwrap();
        assert!(matches!(run_until_event(&mut state), LevelEvent::Hit { .. }));
    }
}
