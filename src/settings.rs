//! Game settings and preferences
//!
//! Persisted as JSON under a single key, separate from progression.

use serde::{Deserialize, Serialize};

use crate::consts::{COLLISION_POINT, MAX_SUBSTEPS, ROTATION_PERIOD_SCALE, TICK_RATE};
use crate::error::StorageError;
use crate::normalize_degrees;
use crate::persistence::KeyValueStore;
use crate::sim::RingConfig;

/// Game speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    Relaxed,
    #[default]
    Normal,
    Frantic,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Relaxed => "Relaxed",
            SpeedPreset::Normal => "Normal",
            SpeedPreset::Frantic => "Frantic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Some(SpeedPreset::Relaxed),
            "normal" => Some(SpeedPreset::Normal),
            "frantic" | "fast" => Some(SpeedPreset::Frantic),
            _ => None,
        }
    }

    /// Seconds per turn at rotation rate 1.0 (bigger is slower)
    pub fn rotation_period_scale(&self) -> f32 {
        match self {
            SpeedPreset::Relaxed => ROTATION_PERIOD_SCALE * 1.5,
            SpeedPreset::Normal => ROTATION_PERIOD_SCALE,
            SpeedPreset::Frantic => ROTATION_PERIOD_SCALE * 0.7,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Speed preset the period scale was last derived from
    pub speed: SpeedPreset,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Most ticks run for one frame before dropping time
    pub max_substeps: u32,
    /// Seconds per turn at rotation rate 1.0
    pub rotation_period_scale: f32,
    /// Where projectiles meet the ring (degrees, 180 = bottom)
    pub collision_point: f32,
    /// Seed for level colors and projectile colors; None picks one at startup
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: SpeedPreset::Normal,
            tick_rate: TICK_RATE,
            max_substeps: MAX_SUBSTEPS,
            rotation_period_scale: ROTATION_PERIOD_SCALE,
            collision_point: COLLISION_POINT,
            seed: None,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "color_ring_settings";

    /// Create settings from a speed preset
    pub fn from_preset(preset: SpeedPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a speed preset (updates the rotation period scale)
    pub fn apply_preset(&mut self, preset: SpeedPreset) {
        self.speed = preset;
        self.rotation_period_scale = preset.rotation_period_scale();
    }

    /// Seconds per simulation tick
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Per-level ring timing and layout
    pub fn ring_config(&self) -> RingConfig {
        RingConfig {
            collision_point: normalize_degrees(self.collision_point),
            rotation_period_scale: self.rotation_period_scale,
        }
    }

    /// Replace nonsensical values (hand-edited saves) with defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.tick_rate == 0 {
            self.tick_rate = defaults.tick_rate;
        }
        if self.max_substeps == 0 {
            self.max_substeps = defaults.max_substeps;
        }
        if !self.rotation_period_scale.is_finite() || self.rotation_period_scale <= 0.0 {
            self.rotation_period_scale = defaults.rotation_period_scale;
        }
        if !self.collision_point.is_finite() {
            self.collision_point = defaults.collision_point;
        }
        self
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
