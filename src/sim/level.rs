//! Level configuration and the level catalog
//!
//! A catalog is an ordered JSON list of levels. Entries may omit their colors,
//! in which case each level draws distinct colors from the game palette using a
//! seeded RNG so the same seed always paints the same rings.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{SectorBounds, build_sector_bounds};
use crate::error::{GameError, GameResult, LevelError};
use crate::palette::{Color, GAME_PALETTE, pick_colors};

/// Levels shipped with the game
const BUILTIN_CATALOG: &str = include_str!("../../assets/levels.json");

fn default_ring_size() -> f32 {
    60.0
}

/// Immutable description of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    /// Label shown in the middle of the ring
    #[serde(default)]
    pub name: String,
    /// Sector widths in degrees, in ring order
    pub sector_widths: Vec<f32>,
    /// One color per sector, aligned with `sector_widths`
    pub sector_colors: Vec<Color>,
    /// Signed turns per time unit; the sign sets the starting direction
    pub rotation_rate: f32,
    /// Projectile progress per second
    pub projectile_rate: f32,
    /// Flip rotation after every successful hit
    #[serde(default)]
    pub reverse_on_hit: bool,
    /// Display size hint, passed through to renderers
    #[serde(default = "default_ring_size")]
    pub ring_size: f32,
}

impl Level {
    pub fn sector_count(&self) -> usize {
        self.sector_widths.len()
    }

    /// Validate the whole level and return its sector bounds
    pub fn sector_bounds(&self) -> Result<Vec<SectorBounds>, LevelError> {
        if self.id == 0 {
            return Err(LevelError::ZeroId);
        }
        if self.sector_colors.len() != self.sector_widths.len() {
            return Err(LevelError::ColorCount {
                sectors: self.sector_widths.len(),
                colors: self.sector_colors.len(),
            });
        }
        if !self.rotation_rate.is_finite() || self.rotation_rate == 0.0 {
            return Err(LevelError::RotationRate(self.rotation_rate));
        }
        if !self.projectile_rate.is_finite() || self.projectile_rate <= 0.0 {
            return Err(LevelError::ProjectileRate(self.projectile_rate));
        }
        build_sector_bounds(&self.sector_widths)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        self.sector_bounds().map(|_| ())
    }

    /// Name to display, falling back to the level number
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

/// Catalog entry as written in JSON, where colors are optional
#[derive(Debug, Clone, Deserialize)]
struct LevelEntry {
    id: u32,
    #[serde(default)]
    name: String,
    sector_widths: Vec<f32>,
    #[serde(default)]
    sector_colors: Option<Vec<Color>>,
    rotation_rate: f32,
    projectile_rate: f32,
    #[serde(default)]
    reverse_on_hit: bool,
    #[serde(default = "default_ring_size")]
    ring_size: f32,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    levels: Vec<LevelEntry>,
}

/// Ordered set of levels, indexed by id
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Build a catalog from already-complete levels (sorted by id); ids must be unique
    pub fn new(mut levels: Vec<Level>) -> GameResult<Self> {
        levels.sort_by_key(|l| l.id);
        if let Some(pair) = levels.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(GameError::DuplicateLevel(pair[0].id));
        }
        Ok(Self { levels })
    }

    /// Parse a JSON catalog, painting colorless levels from the palette
    pub fn from_json(json: &str, seed: u64) -> GameResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut rng = Pcg32::seed_from_u64(seed);

        let levels = file
            .levels
            .into_iter()
            .map(|entry| {
                let sector_colors = entry.sector_colors.unwrap_or_else(|| {
                    pick_colors(&mut rng, &GAME_PALETTE, entry.sector_widths.len())
                });
                Level {
                    id: entry.id,
                    name: entry.name,
                    sector_widths: entry.sector_widths,
                    sector_colors,
                    rotation_rate: entry.rotation_rate,
                    projectile_rate: entry.projectile_rate,
                    reverse_on_hit: entry.reverse_on_hit,
                    ring_size: entry.ring_size,
                }
            })
            .collect();

        let catalog = Self::new(levels)?;
        log::info!("Loaded level catalog with {} levels", catalog.len());
        Ok(catalog)
    }

    /// The catalog bundled with the game
    pub fn builtin(seed: u64) -> GameResult<Self> {
        Self::from_json(BUILTIN_CATALOG, seed)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Like `get`, but a missing id is an error
    pub fn level(&self, id: u32) -> GameResult<&Level> {
        self.get(id).ok_or(GameError::UnknownLevel(id))
    }

    /// The level that follows `id` in catalog order
    pub fn next_after(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id > id)
    }

    pub fn last_id(&self) -> Option<u32> {
        self.levels.last().map(|l| l.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}
