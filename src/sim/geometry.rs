//! Sector geometry for the color ring
//!
//! Angles are degrees measured clockwise from the ring's zero mark. A sector
//! covers the half-open range [start, end), so an angle sitting exactly on a
//! boundary belongs to the sector that begins there.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SECTOR_WIDTH, MAX_TOTAL_ANGLE};
use crate::error::LevelError;
use crate::normalize_degrees;

/// Angular extent of one sector in ring coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorBounds {
    /// Start angle (degrees, inclusive)
    pub start: f32,
    /// End angle (degrees, exclusive)
    pub end: f32,
}

impl SectorBounds {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Angular span of the sector
    #[inline]
    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    /// Check if a ring angle falls inside [start, end)
    #[inline]
    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.start && angle < self.end
    }

    /// Angle halfway through the sector
    #[inline]
    pub fn midpoint(&self) -> f32 {
        self.start + self.width() / 2.0
    }
}

/// Turn per-sector widths into cumulative [start, end) bounds.
///
/// Validates every width against (0, 170] and the total against 360 before any
/// bound is produced.
pub fn build_sector_bounds(widths: &[f32]) -> Result<Vec<SectorBounds>, LevelError> {
    if widths.is_empty() {
        return Err(LevelError::NoSectors);
    }

    let mut total = 0.0;
    for (index, &width) in widths.iter().enumerate() {
        if !width.is_finite() || width <= 0.0 || width > MAX_SECTOR_WIDTH {
            return Err(LevelError::SectorWidth {
                index,
                width,
                max: MAX_SECTOR_WIDTH,
            });
        }
        total += width;
    }
    if total > MAX_TOTAL_ANGLE {
        return Err(LevelError::TotalAngle {
            total,
            max: MAX_TOTAL_ANGLE,
        });
    }

    let mut start = 0.0;
    Ok(widths
        .iter()
        .map(|&width| {
            let bounds = SectorBounds::new(start, start + width);
            start = bounds.end;
            bounds
        })
        .collect())
}

/// Index of the sector whose range holds `angle`, after normalizing it to [0, 360).
///
/// Returns None past the last sector when the widths sum to less than a full turn.
pub fn sector_index_at(bounds: &[SectorBounds], angle: f32) -> Option<usize> {
    let angle = normalize_degrees(angle);
    // Bounds are ascending, so the first sector ending past the angle is the candidate
    let index = bounds.partition_point(|b| b.end <= angle);
    bounds
        .get(index)
        .filter(|b| b.contains(angle))
        .map(|_| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_bounds_cumulative() {
        let bounds = build_sector_bounds(&[45.0, 45.0, 90.0, 150.0, 30.0]).unwrap();
        let starts: Vec<f32> = bounds.iter().map(|b| b.start).collect();
        let ends: Vec<f32> = bounds.iter().map(|b| b.end).collect();
        assert_eq!(starts, vec![0.0, 45.0, 90.0, 180.0, 330.0]);
        assert_eq!(ends, vec![45.0, 90.0, 180.0, 330.0, 360.0]);
    }

    #[test]
    fn test_build_bounds_rejects_bad_widths() {
        assert_eq!(build_sector_bounds(&[]), Err(LevelError::NoSectors));
        assert!(matches!(
            build_sector_bounds(&[360.0]),
            Err(LevelError::SectorWidth { index: 0, .. })
        ));
        assert!(matches!(
            build_sector_bounds(&[90.0, 0.0]),
            Err(LevelError::SectorWidth { index: 1, .. })
        ));
        assert!(matches!(
            build_sector_bounds(&[90.0, -10.0]),
            Err(LevelError::SectorWidth { index: 1, .. })
        ));
        assert!(matches!(
            build_sector_bounds(&[170.0, 170.0, 30.0]),
            Err(LevelError::TotalAngle { .. })
        ));
        // The cap itself is allowed
        assert!(build_sector_bounds(&[170.0, 170.0, 20.0]).is_ok());
    }

    #[test]
    fn test_sector_index_half_open() {
        let bounds = build_sector_bounds(&[90.0, 90.0, 90.0, 90.0]).unwrap();
        assert_eq!(sector_index_at(&bounds, 0.0), Some(0));
        assert_eq!(sector_index_at(&bounds, 89.9), Some(0));
        assert_eq!(sector_index_at(&bounds, 90.0), Some(1));
        assert_eq!(sector_index_at(&bounds, 359.9), Some(3));
        assert_eq!(sector_index_at(&bounds, 360.0), Some(0));
        assert_eq!(sector_index_at(&bounds, -45.0), Some(3));
    }

    #[test]
    fn test_sector_index_past_total() {
        let bounds = build_sector_bounds(&[100.0, 100.0]).unwrap();
        assert_eq!(sector_index_at(&bounds, 150.0), Some(1));
        assert_eq!(sector_index_at(&bounds, 200.0), None);
        assert_eq!(sector_index_at(&bounds, 300.0), None);
    }

    fn widths_strategy() -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(1.0f32..=170.0, 1..12)
            .prop_filter("total must fit in a turn", |w| w.iter().sum::<f32>() <= 360.0)
    }

    proptest! {
        #[test]
        fn prop_bounds_partition_total(widths in widths_strategy()) {
            let bounds = build_sector_bounds(&widths).unwrap();
            prop_assert_eq!(bounds.len(), widths.len());
            prop_assert_eq!(bounds[0].start, 0.0);
            for pair in bounds.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
                prop_assert!(pair[0].start < pair[0].end);
            }
            let total: f32 = widths.iter().sum();
            prop_assert!((bounds[bounds.len() - 1].end - total).abs() < 1e-3);
        }

        #[test]
        fn prop_index_matches_containing_sector(widths in widths_strategy(), t in 0.0f32..1.0) {
            let bounds = build_sector_bounds(&widths).unwrap();
            let pick = ((widths.len() as f32 * t) as usize).min(widths.len() - 1);
            let b = bounds[pick];
            let angle = b.start + b.width() * 0.5;
            prop_assert_eq!(sector_index_at(&bounds, angle), Some(pick));
            // The end boundary never maps back to its own sector
            prop_assert_ne!(sector_index_at(&bounds, b.end), Some(pick));
        }
    }
}
