//! Pointer gesture state machine: tells clicks apart from drags.

use std::time::{Duration, Instant};

use glam::Vec2;

/// Thresholds a press must stay within to count as a click.
#[derive(Debug, Clone, Copy)]
pub struct ClickPolicy {
    pub max_distance_px: f32,
    pub max_duration: Duration,
}

impl ClickPolicy {
    pub fn is_click(&self, moved: bool, elapsed: Duration) -> bool {
        !moved && elapsed <= self.max_duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub origin: Vec2,
    pub started_at: Instant,
    /// Largest distance from `origin` seen so far.
    pub max_distance: f32,
    pub moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Dragging(DragGesture),
}

/// How a finished press should be treated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    Click(Vec2),
    Drag,
    /// Pointer-up without a matching pointer-down.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    state: PointerState,
    policy: ClickPolicy,
}

impl PointerTracker {
    pub fn new(policy: ClickPolicy) -> Self {
        Self {
            state: PointerState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging(_))
    }

    pub fn press(&mut self, at: Vec2, now: Instant) {
        self.state = PointerState::Dragging(DragGesture {
            origin: at,
            started_at: now,
            max_distance: 0.0,
            moved: false,
        });
    }

    /// Records movement. Returns the horizontal travel since the press while dragging.
    pub fn motion(&mut self, at: Vec2) -> Option<f32> {
        let PointerState::Dragging(gesture) = &mut self.state else {
            return None;
        };
        let distance = at.distance(gesture.origin);
        gesture.max_distance = gesture.max_distance.max(distance);
        if gesture.max_distance > self.policy.max_distance_px {
            gesture.moved = true;
        }
        Some(gesture.origin.x - at.x)
    }

    pub fn release(&mut self, at: Vec2, now: Instant) -> Release {
        let PointerState::Dragging(mut gesture) = std::mem::take(&mut self.state) else {
            return Release::Ignored;
        };
        if at.distance(gesture.origin) > self.policy.max_distance_px {
            gesture.moved = true;
        }
        let elapsed = now.saturating_duration_since(gesture.started_at);
        if self.policy.is_click(gesture.moved, elapsed) {
            Release::Click(at)
        } else {
            Release::Drag
        }
    }

    /// Drops an in-flight gesture without classifying it.
    pub fn cancel(&mut self) {
        self.state = PointerState::Idle;
    }
}
