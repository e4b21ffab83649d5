//! Level progression
//!
//! Tracks the furthest unlocked level in a key-value store and maps between
//! level ids and location tokens (`level/<id>`, `level/<id>/paused`, ...).
//! The stored value only ever grows.

use std::fmt;
use std::str::FromStr;

use crate::consts::FIRST_LEVEL;
use crate::error::StorageError;
use crate::persistence::KeyValueStore;

/// Storage key for the furthest unlocked level
pub const UNLOCKED_LEVEL_KEY: &str = "unlockedLevel";

/// What the session is doing on a level, as shown in its location token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Playing,
    Paused,
    Won,
    Lost,
}

/// A navigable location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Start,
    Level { id: u32, status: LevelStatus },
}

impl Location {
    pub fn level(id: u32) -> Self {
        Location::Level {
            id,
            status: LevelStatus::Playing,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Start => Ok(()),
            Location::Level { id, status } => match status {
                LevelStatus::Playing => write!(f, "level/{}", id),
                LevelStatus::Paused => write!(f, "level/{}/paused", id),
                LevelStatus::Won => write!(f, "level/{}/won", id),
                LevelStatus::Lost => write!(f, "level/{}/lost", id),
            },
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized location {0:?}")]
pub struct ParseLocationError(String);

/// Split `level/<id>[/<suffix>]` (optionally prefixed by `#` or `/`) into id and suffix
fn split_level_token(token: &str) -> Option<(u32, Option<&str>)> {
    let token = token.trim().trim_start_matches('#').trim_start_matches('/');
    let mut parts = token.split('/');
    if parts.next()? != "level" {
        return None;
    }
    let id = parts.next()?.parse().ok()?;
    let suffix = parts.next().filter(|s| !s.is_empty());
    if parts.next().is_some() {
        return None;
    }
    Some((id, suffix))
}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#').trim_start_matches('/');
        if trimmed.is_empty() {
            return Ok(Location::Start);
        }

        let err = || ParseLocationError(s.to_string());
        let (id, suffix) = split_level_token(trimmed).ok_or_else(err)?;
        let status = match suffix {
            None => LevelStatus::Playing,
            Some("paused") => LevelStatus::Paused,
            Some("won") | Some("win") => LevelStatus::Won,
            Some("lost") | Some("lose") => LevelStatus::Lost,
            Some(_) => return Err(err()),
        };
        Ok(Location::Level { id, status })
    }
}

/// Where a requested location leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Level(u32),
    StartScreen,
}

/// Furthest unlocked level, backed by a key-value store
#[derive(Debug)]
pub struct Progression<S> {
    store: S,
    unlocked: u32,
}

impl<S: KeyValueStore> Progression<S> {
    /// Read progress from `store`.
    ///
    /// A failing read still yields a usable tracker with level 1 unlocked; the
    /// error is handed back so the caller can tell the player progress is not
    /// being loaded.
    pub fn open(store: S) -> (Self, Option<StorageError>) {
        let mut progression = Self {
            store,
            unlocked: FIRST_LEVEL,
        };
        let error = progression.reload().err();
        if let Some(e) = &error {
            log::warn!("Progress unavailable, starting from level {}: {}", FIRST_LEVEL, e);
        }
        (progression, error)
    }

    /// Like `open`, dropping the load error after logging it
    pub fn new(store: S) -> Self {
        Self::open(store).0
    }

    /// Re-read the stored value; never lowers the in-memory value
    pub fn reload(&mut self) -> Result<u32, StorageError> {
        let stored = self.read_stored()?;
        self.unlocked = self.unlocked.max(stored);
        Ok(self.unlocked)
    }

    fn read_stored(&self) -> Result<u32, StorageError> {
        match self.store.get(UNLOCKED_LEVEL_KEY)? {
            None => Ok(FIRST_LEVEL),
            Some(value) => match value.trim().parse::<u32>() {
                Ok(level) => Ok(level.max(FIRST_LEVEL)),
                Err(_) => Err(StorageError::Malformed {
                    key: UNLOCKED_LEVEL_KEY.to_string(),
                    value,
                }),
            },
        }
    }

    pub fn unlocked_up_to(&self) -> u32 {
        self.unlocked
    }

    /// Raise the unlocked level to at least `level_id`.
    ///
    /// The in-memory value is updated even when the store fails, so the
    /// current session keeps its progress. Nothing is written unless the stored
    /// value could be read first (or was unreadable garbage), so a higher value
    /// already on record is never overwritten.
    pub fn persist(&mut self, level_id: u32) -> Result<(), StorageError> {
        self.unlocked = self.unlocked.max(level_id);

        // Another writer may have moved the stored value on
        let stored = match self.read_stored() {
            Ok(stored) => stored,
            Err(StorageError::Malformed { value, .. }) => {
                log::warn!("Replacing malformed stored progress {:?}", value);
                FIRST_LEVEL
            }
            Err(e) => {
                log::warn!("Could not read stored progress, not writing: {}", e);
                return Err(e);
            }
        };
        let target = self.unlocked.max(stored);
        self.unlocked = target;

        if stored == target {
            return Ok(());
        }
        self.store.set(UNLOCKED_LEVEL_KEY, &target.to_string())?;
        log::info!("Unlocked up to level {}", target);
        Ok(())
    }

    /// Record a win on `level_id`, unlocking the next level
    pub fn record_win(&mut self, level_id: u32) -> Result<u32, StorageError> {
        self.persist(level_id.saturating_add(1))?;
        Ok(self.unlocked)
    }

    pub fn is_unlocked(&self, level_id: u32) -> bool {
        level_id == FIRST_LEVEL || (level_id > FIRST_LEVEL && level_id <= self.unlocked)
    }

    /// Decide whether a location token may open its level.
    ///
    /// Level 1 always opens; anything past the unlocked level, or any token
    /// that does not name a level, routes to the start screen.
    pub fn resolve_requested_level(&self, token: &str) -> Route {
        match split_level_token(token) {
            Some((id, _)) if self.is_unlocked(id) => Route::Level(id),
            Some((id, _)) => {
                log::info!("Level {} is locked (unlocked up to {})", id, self.unlocked);
                Route::StartScreen
            }
            None => Route::StartScreen,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
