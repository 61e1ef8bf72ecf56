//! Displayed percentage for a results card.
//!
//! The value is a pure function of the frame number: each frame adds one
//! hundredth of the target, the display is floored, and frame 100 lands on
//! the target exactly.

use std::time::Duration;

const FRAMES_TO_TARGET: u32 = 100;
const FRAME_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageAnimation {
    target: f64,
}

impl PercentageAnimation {
    pub fn new(target: f64) -> Self {
        let target = if target.is_finite() { target.clamp(0.0, 100.0) } else { 0.0 };
        Self { target }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn frame_interval() -> Duration {
        FRAME_INTERVAL
    }

    /// Value shown at `frame` (frame 0 shows 0).
    pub fn value_at(&self, frame: u32) -> f64 {
        if frame >= FRAMES_TO_TARGET {
            return self.target;
        }
        let progress = self.target / f64::from(FRAMES_TO_TARGET) * f64::from(frame);
        progress.floor().min(self.target)
    }

    pub fn is_done(&self, frame: u32) -> bool {
        self.value_at(frame) >= self.target
    }

    /// Values for frames 0..=100, ending at the target.
    pub fn frames(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=FRAMES_TO_TARGET).map(move |f| self.value_at(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_monotonically() {
        for target in [0.0, 3.0, 33.3, 50.0, 99.9, 100.0] {
            let anim = PercentageAnimation::new(target);
            let values: Vec<f64> = anim.frames().collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "target {target}");
            assert_eq!(*values.last().unwrap(), target);
            assert!(values.iter().all(|v| *v <= target));
        }
    }

    #[test]
    fn holds_target_after_last_frame() {
        let anim = PercentageAnimation::new(66.6);
        assert_eq!(anim.value_at(500), 66.6);
        assert!(anim.is_done(100));
        assert!(!anim.is_done(10));
    }

    #[test]
    fn clamps_bad_targets() {
        assert_eq!(PercentageAnimation::new(150.0).target(), 100.0);
        assert_eq!(PercentageAnimation::new(-5.0).target(), 0.0);
        assert_eq!(PercentageAnimation::new(f64::NAN).target(), 0.0);
    }
}
