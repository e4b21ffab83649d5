//! Fixed timestep session driver
//!
//! `GameSession` owns the current attempt and its Playing/Paused/Won/Lost state.
//! `GameLoop` feeds it fixed ticks out of variable frame time.

use serde::Serialize;

use super::level::Level;
use super::state::{LevelEvent, LevelState, Miss, RingConfig};
use crate::consts::{MAX_FRAME_TIME, TICK_RATE};
use crate::error::{GameError, GameResult};
use crate::palette::Color;
use crate::progression::{LevelStatus, Location};
use crate::settings::Settings;

/// Session-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// No level loaded
    NotStarted,
    /// Ring turning, input accepted
    Playing,
    /// Ring frozen, waiting for resume
    Paused,
    /// Level cleared
    Won,
    /// Level failed
    Lost,
}

/// What a session tick reports back to the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Hit { sector: usize, remaining: usize },
    Won { level_id: u32 },
    Lost { level_id: u32, miss: Miss },
}

/// Input edges for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Fire a projectile of this color
    pub fire: Option<Color>,
    /// Pause request; a no-op unless playing
    pub pause: bool,
    /// Resume request; a no-op unless paused
    pub resume: bool,
}

/// One run of the game: the active level attempt and its state
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    config: RingConfig,
    level: Option<LevelState>,
}

impl GameSession {
    pub fn new(config: RingConfig) -> Self {
        Self {
            state: SessionState::NotStarted,
            config,
            level: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_level_id(&self) -> Option<u32> {
        self.level.as_ref().map(|l| l.level().id)
    }

    pub fn level_state(&self) -> Option<&LevelState> {
        self.level.as_ref()
    }

    /// Begin a fresh attempt. An invalid level leaves the session untouched.
    pub fn start_level(&mut self, level: Level) -> GameResult<()> {
        let attempt = LevelState::start(level, self.config)?;
        self.level = Some(attempt);
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Begin an attempt already paused, as when arriving from a shared link
    pub fn start_paused(&mut self, level: Level) -> GameResult<()> {
        self.start_level(level)?;
        self.pause();
        Ok(())
    }

    /// Start the current level over
    pub fn retry(&mut self) -> GameResult<()> {
        let level = self
            .level
            .as_ref()
            .map(|l| l.level().clone())
            .ok_or(GameError::IllegalTransition("no level to retry"))?;
        self.start_level(level)
    }

    /// Drop the current attempt and go back to the start screen
    pub fn reset(&mut self) {
        self.level = None;
        self.state = SessionState::NotStarted;
    }

    /// Fire a projectile; only accepted while playing
    pub fn fire(&mut self, color: Color) -> GameResult<()> {
        if self.state != SessionState::Playing {
            return Err(GameError::IllegalTransition("fire outside of play"));
        }
        match self.level.as_mut() {
            Some(level) => level.on_fire_signal(color),
            None => Err(GameError::IllegalTransition("no level loaded")),
        }
    }

    pub fn pause(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        if let Some(level) = self.level.as_mut() {
            level.pause();
        }
        self.state = SessionState::Paused;
        log::debug!("Paused");
    }

    pub fn resume(&mut self) {
        if self.state != SessionState::Paused {
            return;
        }
        if let Some(level) = self.level.as_mut() {
            level.resume();
        }
        self.state = SessionState::Playing;
        log::debug!("Resumed");
    }

    /// Advance the attempt by `dt` if playing
    pub fn tick(&mut self, dt: f32) -> Option<SessionEvent> {
        if self.state != SessionState::Playing {
            return None;
        }
        let level = self.level.as_mut()?;
        let level_id = level.level().id;

        match level.tick(dt)? {
            LevelEvent::Hit { sector, .. } => Some(SessionEvent::Hit {
                sector,
                remaining: level.ring().live_count(),
            }),
            LevelEvent::Complete { .. } => {
                self.state = SessionState::Won;
                Some(SessionEvent::Won { level_id })
            }
            LevelEvent::Failed(miss) => {
                self.state = SessionState::Lost;
                Some(SessionEvent::Lost { level_id, miss })
            }
        }
    }

    /// Canonical location for the current state
    pub fn location(&self) -> Location {
        let Some(id) = self.current_level_id() else {
            return Location::Start;
        };
        let status = match self.state {
            SessionState::NotStarted => return Location::Start,
            SessionState::Playing => LevelStatus::Playing,
            SessionState::Paused => LevelStatus::Paused,
            SessionState::Won => LevelStatus::Won,
            SessionState::Lost => LevelStatus::Lost,
        };
        Location::Level { id, status }
    }

    /// Everything a renderer needs to draw the current frame
    pub fn snapshot(&self) -> RenderSnapshot {
        let Some(level) = self.level.as_ref() else {
            return RenderSnapshot {
                level_id: None,
                name: String::new(),
                ring_size: 0.0,
                rotation: 0.0,
                sectors: Vec::new(),
                projectile: None,
                state: self.state,
                location: self.location().to_string(),
            };
        };

        RenderSnapshot {
            level_id: Some(level.level().id),
            name: level.level().display_name(),
            ring_size: level.level().ring_size,
            rotation: level.rotator().current_angle(),
            sectors: level
                .ring()
                .live_sectors()
                .map(|(index, s)| SectorView {
                    index,
                    start: s.bounds.start,
                    end: s.bounds.end,
                    color: s.color,
                })
                .collect(),
            projectile: level.projectile().map(|p| ProjectileView {
                color: p.color,
                progress: p.progress,
            }),
            state: self.state,
            location: self.location().to_string(),
        }
    }
}

/// A live sector as handed to a renderer
#[derive(Debug, Clone, Serialize)]
pub struct SectorView {
    pub index: usize,
    pub start: f32,
    pub end: f32,
    pub color: Color,
}

/// The in-flight projectile as handed to a renderer
#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub color: Color,
    pub progress: f32,
}

/// Per-tick view of the session for an external renderer
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub level_id: Option<u32>,
    pub name: String,
    pub ring_size: f32,
    /// Ring rotation offset in degrees
    pub rotation: f32,
    pub sectors: Vec<SectorView>,
    pub projectile: Option<ProjectileView>,
    pub state: SessionState,
    pub location: String,
}

/// Apply one tick's input edges, then advance the session by one fixed timestep.
///
/// Rejected inputs (fire while paused, fire with a projectile in flight) are
/// dropped here; they are not errors from the player's point of view. Pause is
/// applied before resume, so a tick carrying both ends up playing.
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) -> Option<SessionEvent> {
    if input.pause {
        session.pause();
    }
    if input.resume {
        session.resume();
    }

    if let Some(color) = input.fire {
        if let Err(e) = session.fire(color) {
            log::debug!("Ignored fire {}: {}", color, e);
        }
    }

    session.tick(dt)
}

/// Fixed-rate scheduler around a `GameSession`
#[derive(Debug, Clone)]
pub struct GameLoop {
    session: GameSession,
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
    input: TickInput,
    ticks: u64,
}

impl GameLoop {
    pub fn new(session: GameSession, settings: &Settings) -> Self {
        Self::with_rate(session, settings.tick_rate, settings.max_substeps)
    }

    pub fn with_rate(session: GameSession, tick_rate: u32, max_substeps: u32) -> Self {
        let tick_rate = if tick_rate == 0 { TICK_RATE } else { tick_rate };
        Self {
            session,
            dt: 1.0 / tick_rate as f32,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            input: TickInput::default(),
            ticks: 0,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    /// Seconds of game time per tick
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// True while a level is being played or sits paused
    pub fn is_running(&self) -> bool {
        matches!(
            self.session.state(),
            SessionState::Playing | SessionState::Paused
        )
    }

    /// Queue a fire edge for the next tick
    pub fn fire(&mut self, color: Color) {
        self.input.fire = Some(color);
    }

    /// Queue a pause for the next tick
    pub fn pause(&mut self) {
        self.input.pause = true;
    }

    /// Queue a resume for the next tick
    pub fn resume(&mut self) {
        self.input.resume = true;
    }

    /// Start `level` with a clean accumulator and no queued input
    pub fn restart(&mut self, level: Level) -> GameResult<()> {
        self.session.start_level(level)?;
        self.accumulator = 0.0;
        self.input = TickInput::default();
        Ok(())
    }

    /// Run exactly one fixed tick
    pub fn step(&mut self) -> Option<SessionEvent> {
        if !self.is_running() {
            return None;
        }
        let input = std::mem::take(&mut self.input);
        let event = tick(&mut self.session, &input, self.dt);
        self.ticks += 1;

        if !self.is_running() {
            self.accumulator = 0.0;
            self.input = TickInput::default();
            log::info!(
                "Loop stopped after {} ticks: {:?}",
                self.ticks,
                self.session.state()
            );
        }
        event
    }

    /// Feed `elapsed` seconds of wall time, running as many fixed ticks as fit
    pub fn advance(&mut self, elapsed: f32) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.is_running() {
            return events;
        }

        // Long stalls (tab hidden, debugger) must not replay seconds of game time
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_TIME);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps && self.is_running() {
            self.accumulator -= self.dt;
            substeps += 1;
            if let Some(event) = self.step() {
                events.push(event);
            }
        }
        events
    }
}
