//! Game colors and seeded color selection
//!
//! Sector and projectile colors are plain RGB identifiers. Renderers decide how
//! they look; the core only compares them for equality.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::state::SectorRing;

/// An RGB color identifier (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn from_hex(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Colors levels draw from when the catalog leaves them unspecified
pub const GAME_PALETTE: [Color; 14] = [
    Color::from_hex(0xf472d0),
    Color::from_hex(0xe51400),
    Color::from_hex(0xff6e40),
    Color::from_hex(0xffab40),
    Color::from_hex(0xffff00),
    Color::from_hex(0x60a917),
    Color::from_hex(0x76ff03),
    Color::from_hex(0x64ffda),
    Color::from_hex(0x64b5f6),
    Color::from_hex(0x0050ef),
    Color::from_hex(0xb388ff),
    Color::from_hex(0x9c27b0),
    Color::from_hex(0x9e9e9e),
    Color::from_hex(0x8d6e63),
];

/// Pick `count` colors from `palette`, distinct while the palette lasts.
///
/// Partial Fisher-Yates from the back of the palette, so a level with N sectors
/// consumes exactly N draws from the RNG.
pub fn pick_colors(rng: &mut Pcg32, palette: &[Color], count: usize) -> Vec<Color> {
    if palette.is_empty() {
        return Vec::new();
    }

    let mut colors = palette.to_vec();
    let len = colors.len();
    let shuffled = count.min(len);
    for i in (len - shuffled..len).rev() {
        let j = rng.random_range(0..=i);
        colors.swap(i, j);
    }

    let tail = &colors[len - shuffled..];
    (0..count).map(|i| tail[i % tail.len()]).collect()
}

/// Chooses projectile colors among the sectors still on the ring
#[derive(Debug, Clone)]
pub struct ColorPicker {
    rng: Pcg32,
}

impl ColorPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// A color that still has a live sector, or None once the ring is empty
    pub fn pick(&mut self, ring: &SectorRing) -> Option<Color> {
        let live: Vec<Color> = ring.live_sectors().map(|(_, s)| s.color).collect();
        if live.is_empty() {
            return None;
        }
        Some(live[self.rng.random_range(0..live.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_color_hex_roundtrip() {
        let c: Color = "#F472D0".parse().unwrap();
        assert_eq!(c, Color::from_rgb(0xf4, 0x72, 0xd0));
        assert_eq!(c.to_string(), "#f472d0");
        assert!("#12345".parse::<Color>().is_err());
        assert!("zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_serde_as_string() {
        let json = serde_json::to_string(&Color::from_hex(0x0050ef)).unwrap();
        assert_eq!(json, "\"#0050ef\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::from_hex(0x0050ef));
    }

    #[test]
    fn test_pick_colors_distinct_and_deterministic() {
        let mut rng1 = Pcg32::seed_from_u64(7);
        let mut rng2 = Pcg32::seed_from_u64(7);
        let a = pick_colors(&mut rng1, &GAME_PALETTE, 6);
        let b = pick_colors(&mut rng2, &GAME_PALETTE, 6);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        let unique: HashSet<_> = a.iter().collect();
        assert_eq!(unique.len(), 6);
        assert!(a.iter().all(|c| GAME_PALETTE.contains(c)));
    }

    #[test]
    fn test_pick_colors_more_than_palette_repeats() {
        let mut rng = Pcg32::seed_from_u64(1);
        let small = [Color::from_hex(0xff0000), Color::from_hex(0x00ff00)];
        let colors = pick_colors(&mut rng, &small, 5);
        assert_eq!(colors.len(), 5);
        assert!(colors.iter().all(|c| small.contains(c)));
    }
}
