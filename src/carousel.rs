//! Flat, layout-driven carousel.
//!
//! Shares the gallery's click-vs-drag policy but pages one item at a time:
//! a release past the drag buffer, or faster than the velocity threshold,
//! advances to the neighbouring item and a damped spring settles the strip.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::CarouselSettings;
use crate::gallery::pointer::ClickPolicy;

/// A pointer held still this long before release carries no fling velocity.
const FLING_WINDOW: Duration = Duration::from_millis(100);

/// Damped spring driving the strip offset toward its resting position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub position: f32,
    pub velocity: f32,
    pub target: f32,
    stiffness: f32,
    damping: f32,
}

impl Spring {
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            stiffness,
            damping,
        }
    }

    /// Steps the spring by `dt` seconds. Returns `true` once it has come to rest.
    pub fn step(&mut self, dt: f32) -> bool {
        let displacement = self.position - self.target;
        let accel = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += accel * dt;
        self.position += self.velocity * dt;

        let settled = (self.position - self.target).abs() < 0.5 && self.velocity.abs() < 0.5;
        if settled {
            self.position = self.target;
            self.velocity = 0.0;
        }
        settled
    }

    pub fn is_resting(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct StripDrag {
    origin_x: f32,
    start_offset: f32,
    started_at: Instant,
    last_x: f32,
    last_at: Instant,
    /// Pointer velocity in px/s, smoothed over recent samples.
    velocity: f32,
    moved: bool,
}

/// Result of lifting the pointer off the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselRelease {
    /// The press qualified as a click; carries the item under the pointer, if any.
    Click(Option<usize>),
    /// A swipe changed the active item.
    Advanced { from: usize, to: usize },
    /// A swipe too short or slow to page; the strip springs back.
    SnappedBack,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    index: usize,
    settings: CarouselSettings,
    policy: ClickPolicy,
    spring: Spring,
    drag: Option<StripDrag>,
}

impl Carousel {
    pub fn new(len: usize, settings: CarouselSettings, policy: ClickPolicy) -> Self {
        let spring = Spring::new(settings.spring_stiffness, settings.spring_damping);
        Self {
            len,
            index: 0,
            settings,
            policy,
            spring,
            drag: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Item pitch: width plus gap.
    pub fn track(&self) -> f32 {
        self.settings.item_width_px + self.settings.gap_px
    }

    /// Current translate-x of the strip, in pixels.
    pub fn offset(&self) -> f32 {
        self.spring.position
    }

    pub fn resting_offset(&self) -> f32 {
        -(self.index as f32) * self.track()
    }

    pub fn press(&mut self, x: f32, now: Instant) {
        if self.is_empty() {
            return;
        }
        self.drag = Some(StripDrag {
            origin_x: x,
            start_offset: self.spring.position,
            started_at: now,
            last_x: x,
            last_at: now,
            velocity: 0.0,
            moved: false,
        });
        self.spring.velocity = 0.0;
    }

    pub fn motion(&mut self, x: f32, now: Instant) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if (x - drag.origin_x).abs() > self.policy.max_distance_px {
            drag.moved = true;
        }
        let dt = now.saturating_duration_since(drag.last_at).as_secs_f32();
        if dt > 0.0 {
            let sample = (x - drag.last_x) / dt;
            drag.velocity = drag.velocity * 0.2 + sample * 0.8;
        }
        drag.last_x = x;
        drag.last_at = now;
        self.spring.position = drag.start_offset + (x - drag.origin_x);
    }

    pub fn release(&mut self, x: f32, now: Instant) -> CarouselRelease {
        let Some(drag) = self.drag.take() else {
            return CarouselRelease::Ignored;
        };
        let travel = x - drag.origin_x;
        let moved = drag.moved || travel.abs() > self.policy.max_distance_px;
        let elapsed = now.saturating_duration_since(drag.started_at);
        if self.policy.is_click(moved, elapsed) {
            self.spring.position = drag.start_offset;
            return CarouselRelease::Click(self.item_at(x));
        }

        let velocity = if now.saturating_duration_since(drag.last_at) > FLING_WINDOW {
            0.0
        } else {
            drag.velocity
        };
        let buffer = self.settings.drag_buffer_px;
        let fling = self.settings.velocity_threshold;
        let step: isize = if travel < -buffer || velocity < -fling {
            1
        } else if travel > buffer || velocity > fling {
            -1
        } else {
            0
        };

        let from = self.index;
        self.go_by(step);
        debug!(from, to = self.index, travel, velocity, "carousel_release");
        if self.index == from {
            CarouselRelease::SnappedBack
        } else {
            CarouselRelease::Advanced {
                from,
                to: self.index,
            }
        }
    }

    /// Moves the active item by `step`, wrapping or clamping per the loop mode.
    pub fn go_by(&mut self, step: isize) {
        if self.is_empty() {
            return;
        }
        let last = self.len - 1;
        let next = self.index as isize + step;
        self.index = if self.settings.loop_items {
            let wrapped = next.rem_euclid(self.len as isize) as usize;
            // Keep the strip continuous: jump by a whole lap so the spring only
            // covers the one-item distance.
            let lap = self.len as f32 * self.track();
            if next > last as isize {
                self.spring.position += lap;
            } else if next < 0 {
                self.spring.position -= lap;
            }
            wrapped
        } else {
            next.clamp(0, last as isize) as usize
        };
        self.spring.target = self.resting_offset();
    }

    /// Advances the settle animation. Returns `true` while still moving.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.drag.is_some() {
            return false;
        }
        !self.spring.step(dt.as_secs_f32())
    }

    /// Item under `x`, measured from the container's left edge. Gaps hit nothing.
    pub fn item_at(&self, x: f32) -> Option<usize> {
        let track = self.track();
        if self.is_empty() || track <= 0.0 {
            return None;
        }
        let local = x - self.spring.position;
        let slot = (local / track).floor();
        if local - slot * track > self.settings.item_width_px {
            return None;
        }
        let slot = slot as isize;
        if self.settings.loop_items {
            Some(slot.rem_euclid(self.len as isize) as usize)
        } else if (0..self.len as isize).contains(&slot) {
            Some(slot as usize)
        } else {
            None
        }
    }
}
