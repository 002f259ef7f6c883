//! Inertia scrolling: `current` chases `target` by a fixed fraction per frame.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollState {
    pub ease: f32,
    pub current: f32,
    pub target: f32,
    pub last: f32,
    /// Scroll value captured when the active drag started.
    pub drag_anchor: Option<f32>,
}

impl ScrollState {
    pub fn new(ease: f32) -> Self {
        Self {
            ease,
            current: 0.0,
            target: 0.0,
            last: 0.0,
            drag_anchor: None,
        }
    }

    /// Advances `current` one frame toward `target` and reports which way it moved.
    pub fn advance(&mut self) -> Direction {
        self.current = lerp(self.current, self.target, self.ease);
        if self.current > self.last {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    /// Per-frame displacement; drives the wave amplitude.
    pub fn speed(&self) -> f32 {
        self.current - self.last
    }

    /// Commits the frame: the next `advance` compares against this position.
    pub fn end_frame(&mut self) {
        self.last = self.current;
    }

    /// Snaps `target` to the nearest whole multiple of `item_width`, keeping its sign.
    pub fn snap_target(&mut self, item_width: f32) {
        if item_width <= 0.0 || !item_width.is_finite() {
            return;
        }
        let index = (self.target.abs() / item_width).round();
        let snapped = index * item_width;
        self.target = if self.target < 0.0 { -snapped } else { snapped };
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        (self.target - self.current).abs() <= epsilon
    }
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_is_monotonic_and_converges() {
        let mut state = ScrollState::new(0.05);
        state.target = 10.0;
        let mut previous_gap = f32::MAX;
        let mut frames = 0;
        while !state.is_settled(0.5) {
            state.advance();
            state.end_frame();
            let gap = state.target - state.current;
            assert!(gap >= 0.0, "never overshoots");
            assert!(gap < previous_gap, "gap shrinks every frame");
            previous_gap = gap;
            frames += 1;
            assert!(frames < 1_000);
        }
        // (1 - 0.05)^n * 10 <= 0.5  =>  n = 59
        assert!((55..=90).contains(&frames), "settled after {frames} frames");
    }

    #[test]
    fn direction_follows_motion() {
        let mut state = ScrollState::new(0.5);
        state.target = 4.0;
        assert_eq!(state.advance(), Direction::Right);
        state.end_frame();
        state.target = -4.0;
        assert_eq!(state.advance(), Direction::Left);
    }

    #[test]
    fn idle_frame_reports_left() {
        let mut state = ScrollState::new(0.05);
        assert_eq!(state.advance(), Direction::Left);
        assert_eq!(state.speed(), 0.0);
    }

    #[test]
    fn snap_preserves_sign() {
        let mut state = ScrollState::new(0.05);
        state.target = 7.4;
        state.snap_target(3.0);
        assert!((state.target - 6.0).abs() < 1e-6);

        state.target = -7.6;
        state.snap_target(3.0);
        assert!((state.target + 9.0).abs() < 1e-6);
    }

    #[test]
    fn snap_ignores_degenerate_width() {
        let mut state = ScrollState::new(0.05);
        state.target = 1.3;
        state.snap_target(0.0);
        assert!((state.target - 1.3).abs() < f32::EPSILON);
    }
}
