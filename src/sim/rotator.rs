//! Ring rotation as explicit state
//!
//! The ring angle is tracked numerically rather than read back from whatever
//! draws it. A direction change plays out as a bounded `Reversing` arc that runs
//! to the ring's zero mark in the new direction, then hands over to `Normal`.

use serde::{Deserialize, Serialize};

use crate::normalize_degrees;

/// Rotation direction: clockwise (+1) or counter-clockwise (-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Direction matching the sign of a rotation rate (zero counts as clockwise)
    pub fn from_rate(rate: f32) -> Self {
        if rate < 0.0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// One-shot interpolation used while switching direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReversalArc {
    /// Angle where the reversal began
    pub from: f32,
    /// Zero mark reached in the new direction (0 or 360)
    pub to: f32,
    /// Seconds needed to cover the arc at normal speed
    pub duration: f32,
    /// Seconds spent on the arc so far
    pub elapsed: f32,
    /// Direction of travel along the arc, and of the rotation that follows
    pub direction: Direction,
}

impl ReversalArc {
    /// Build the arc from `angle` to the zero mark travelling in `direction`
    fn toward_zero(angle: f32, direction: Direction, speed: f32) -> Self {
        let to = match direction {
            Direction::Clockwise => 360.0,
            Direction::CounterClockwise => 0.0,
        };
        let distance = (to - angle).abs();
        Self {
            from: angle,
            to,
            duration: distance / speed,
            elapsed: 0.0,
            direction,
        }
    }

    /// Interpolated angle along the arc, unwrapped (may equal 360 at the very end)
    pub fn position(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

/// Current rotation behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RotatorMode {
    /// Constant-speed rotation, looping forever
    Normal { direction: Direction },
    /// Catch-up arc after a direction change
    Reversing(ReversalArc),
    /// Stopped; `resume` holds the motion to continue with
    Frozen { resume: Box<RotatorMode> },
}

/// Owns the ring's rotation offset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rotator {
    /// Current offset in [0, 360)
    angle: f32,
    /// Angular speed in degrees per second (always positive)
    speed: f32,
    mode: RotatorMode,
}

impl Rotator {
    /// Rotator at angle 0 turning at `speed` degrees per second
    pub fn new(direction: Direction, speed: f32) -> Self {
        Self {
            angle: 0.0,
            speed: speed.abs(),
            mode: RotatorMode::Normal { direction },
        }
    }

    /// Rotator for a rate in cycles per time unit, where one unit is `period_scale` seconds
    pub fn from_rate(rate: f32, period_scale: f32) -> Self {
        let period = period_scale / rate.abs();
        Self::new(Direction::from_rate(rate), 360.0 / period)
    }

    /// Seconds for one full turn at normal speed
    pub fn full_rotation_period(&self) -> f32 {
        360.0 / self.speed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn mode(&self) -> &RotatorMode {
        &self.mode
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.mode, RotatorMode::Frozen { .. })
    }

    pub fn is_reversing(&self) -> bool {
        matches!(self.active_motion(), RotatorMode::Reversing(_))
    }

    /// Current ring offset in [0, 360)
    #[inline]
    pub fn current_angle(&self) -> f32 {
        self.angle
    }

    /// Direction the ring is (or will be, once unfrozen) turning
    pub fn direction(&self) -> Direction {
        match self.active_motion() {
            RotatorMode::Normal { direction } => *direction,
            RotatorMode::Reversing(arc) => arc.direction,
            RotatorMode::Frozen { .. } => Direction::Clockwise,
        }
    }

    /// The motion that applies when not frozen
    fn active_motion(&self) -> &RotatorMode {
        match &self.mode {
            RotatorMode::Frozen { resume } => &**resume,
            motion => motion,
        }
    }

    /// Advance rotation by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        match &mut self.mode {
            RotatorMode::Frozen { .. } => {}
            RotatorMode::Normal { direction } => {
                self.angle = normalize_degrees(self.angle + direction.sign() * self.speed * dt);
            }
            RotatorMode::Reversing(arc) => {
                let remaining = arc.remaining();
                if dt < remaining {
                    arc.elapsed += dt;
                    self.angle = normalize_degrees(arc.position());
                    return;
                }

                let direction = arc.direction;
                self.angle = normalize_degrees(arc.to);
                log::debug!("Reversal arc complete at {:.2}°, now {:?}", self.angle, direction);
                self.mode = RotatorMode::Normal { direction };
                // Time left over after reaching the zero mark keeps turning
                self.advance(dt - remaining);
            }
        }
    }

    /// Switch to the opposite direction via a catch-up arc.
    ///
    /// Called mid-arc, the arc restarts from the current angle toward the
    /// opposite zero mark. Called while frozen, only the remembered motion changes.
    pub fn reverse_direction(&mut self) {
        let arc = ReversalArc::toward_zero(self.angle, self.direction().opposite(), self.speed);
        match &mut self.mode {
            RotatorMode::Frozen { resume } => **resume = RotatorMode::Reversing(arc),
            mode => *mode = RotatorMode::Reversing(arc),
        }
    }

    /// Stop at the current angle; no-op when already frozen
    pub fn freeze(&mut self) {
        if self.is_frozen() {
            return;
        }
        let motion = std::mem::replace(&mut self.mode, Self::PLACEHOLDER);
        self.mode = RotatorMode::Frozen {
            resume: Box::new(motion),
        };
    }

    /// Continue the motion interrupted by `freeze`, from the same angle
    pub fn resume(&mut self) {
        self.mode = match std::mem::replace(&mut self.mode, Self::PLACEHOLDER) {
            RotatorMode::Frozen { resume } => *resume,
            motion => motion,
        };
    }

    const PLACEHOLDER: RotatorMode = RotatorMode::Normal {
        direction: Direction::Clockwise,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angular_distance;
    use proptest::prelude::*;

    const EPS: f32 = 1e-2;

    #[test]
    fn test_from_rate_period() {
        let r = Rotator::from_rate(1.0, 5.0);
        assert!((r.full_rotation_period() - 5.0).abs() < 1e-4);
        assert_eq!(r.direction(), Direction::Clockwise);

        let r = Rotator::from_rate(-2.0, 5.0);
        assert!((r.full_rotation_period() - 2.5).abs() < 1e-4);
        assert_eq!(r.direction(), Direction::CounterClockwise);
    }

    #[test]
    fn test_normal_advance_wraps() {
        let mut r = Rotator::new(Direction::Clockwise, 90.0);
        r.advance(1.0);
        assert!((r.current_angle() - 90.0).abs() < EPS);
        r.advance(3.5);
        assert!((r.current_angle() - 45.0).abs() < EPS);

        let mut r = Rotator::new(Direction::CounterClockwise, 90.0);
        r.advance(0.5);
        assert!((r.current_angle() - 315.0).abs() < EPS);
    }

    #[test]
    fn test_reverse_from_clockwise_runs_down_to_zero() {
        let mut r = Rotator::new(Direction::Clockwise, 90.0);
        r.advance(1.0); // at 90
        r.reverse_direction();
        assert!(r.is_reversing());
        assert_eq!(r.direction(), Direction::CounterClockwise);
        if let RotatorMode::Reversing(arc) = r.mode() {
            assert!((arc.to - 0.0).abs() < EPS);
            assert!((arc.duration - 1.0).abs() < EPS);
        }

        r.advance(0.5);
        assert!((r.current_angle() - 45.0).abs() < EPS);
        r.advance(0.5);
        assert_eq!(
            r.mode(),
            &RotatorMode::Normal {
                direction: Direction::CounterClockwise
            }
        );
        r.advance(1.0);
        assert!((r.current_angle() - 270.0).abs() < EPS);
    }

    #[test]
    fn test_reverse_from_counter_clockwise_runs_up_to_360() {
        let mut r = Rotator::new(Direction::CounterClockwise, 90.0);
        r.advance(1.0); // at 270
        r.reverse_direction();
        if let RotatorMode::Reversing(arc) = r.mode() {
            assert!((arc.to - 360.0).abs() < EPS);
            assert!((arc.duration - 1.0).abs() < EPS);
        } else {
            panic!("expected reversing");
        }
        // Overshooting the arc carries the leftover into normal rotation
        r.advance(1.5);
        assert!(!r.is_reversing());
        assert!((r.current_angle() - 45.0).abs() < EPS);
    }

    #[test]
    fn test_reverse_while_reversing_restarts_from_current_angle() {
        let mut r = Rotator::new(Direction::Clockwise, 90.0);
        r.advance(1.0); // 90, reverse heads to 0
        r.reverse_direction();
        r.advance(0.5); // 45
        r.reverse_direction();
        match r.mode() {
            RotatorMode::Reversing(arc) => {
                assert_eq!(arc.direction, Direction::Clockwise);
                assert!((arc.from - 45.0).abs() < EPS);
                assert!((arc.to - 360.0).abs() < EPS);
                assert!((arc.duration - 3.5).abs() < EPS);
            }
            other => panic!("expected reversing, got {:?}", other),
        }
    }

    #[test]
    fn test_reverse_at_zero_is_immediate() {
        let mut r = Rotator::new(Direction::Clockwise, 90.0);
        r.reverse_direction();
        r.advance(1.0 / 30.0);
        assert!(!r.is_reversing());
        assert_eq!(r.direction(), Direction::CounterClockwise);
    }

    #[test]
    fn test_freeze_and_resume_keep_angle_and_direction() {
        let mut r = Rotator::new(Direction::CounterClockwise, 90.0);
        r.advance(0.5);
        let angle = r.current_angle();
        r.freeze();
        r.freeze();
        r.advance(10.0);
        assert_eq!(r.current_angle(), angle);
        assert!(r.is_frozen());

        r.resume();
        assert!(!r.is_frozen());
        assert_eq!(r.direction(), Direction::CounterClockwise);
        r.advance(0.5);
        assert!(angular_distance(r.current_angle(), angle - 45.0) < EPS);
    }

    #[test]
    fn test_freeze_mid_reversal_resumes_arc() {
        let mut r = Rotator::new(Direction::Clockwise, 90.0);
        r.advance(1.0);
        r.reverse_direction();
        r.advance(0.25);
        r.freeze();
        r.advance(5.0);
        r.resume();
        assert!(r.is_reversing());
        r.advance(0.25);
        assert!((r.current_angle() - 45.0).abs() < EPS);
    }

    #[test]
    fn test_reverse_while_frozen_stays_frozen() {
        let mut r = Rotator::new(Direction::Clockwise, 90.0);
        r.advance(1.0);
        r.freeze();
        r.reverse_direction();
        assert!(r.is_frozen());
        assert_eq!(r.direction(), Direction::CounterClockwise);
        r.resume();
        assert!(r.is_reversing());
    }

    proptest! {
        #[test]
        fn prop_normal_advance_decomposes(
            speed in 1.0f32..720.0,
            ccw in any::<bool>(),
            dt1 in 0.0f32..3.0,
            dt2 in 0.0f32..3.0,
        ) {
            let dir = if ccw { Direction::CounterClockwise } else { Direction::Clockwise };
            let mut split = Rotator::new(dir, speed);
            let mut whole = Rotator::new(dir, speed);
            split.advance(dt1);
            split.advance(dt2);
            whole.advance(dt1 + dt2);
            prop_assert!(angular_distance(split.current_angle(), whole.current_angle()) < 0.05);
        }

        #[test]
        fn prop_reversal_is_monotone_and_finite(
            speed in 10.0f32..720.0,
            start in 0.0f32..5.0,
            ccw in any::<bool>(),
        ) {
            let dir = if ccw { Direction::CounterClockwise } else { Direction::Clockwise };
            let mut r = Rotator::new(dir, speed);
            r.advance(start);
            r.reverse_direction();
            let (from, to) = match r.mode() {
                RotatorMode::Reversing(arc) => (arc.from, arc.to),
                _ => unreachable!(),
            };
            let lo = from.min(to);
            let hi = from.max(to);

            let dt = 1.0 / 30.0;
            let mut last = from;
            let mut ticks = 0;
            while let RotatorMode::Reversing(arc) = r.mode() {
                let pos = arc.position();
                prop_assert!(pos >= lo - 1e-3 && pos <= hi + 1e-3);
                if to > from {
                    prop_assert!(pos >= last - 1e-3);
                } else {
                    prop_assert!(pos <= last + 1e-3);
                }
                last = pos;
                r.advance(dt);
                ticks += 1;
                prop_assert!(ticks < 100_000);
            }
            prop_assert_eq!(r.direction(), dir.opposite());
        }
    }
}
