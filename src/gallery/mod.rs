//! Gallery controller: scroll physics, input handling, recycling and hit-testing.
//!
//! Everything here is GPU-free. The renderer reads node state after each
//! [`GalleryController::tick`] and turns it into draw calls.

pub mod arc;
pub mod camera;
pub mod labels;
pub mod node;
pub mod pointer;
pub mod scroll;

use std::time::{Duration, Instant};

use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::catalogue::GalleryItem;
use crate::config::Configuration;
use crate::events::ItemSelected;

use arc::ArcLayout;
use camera::{Camera, Screen, Viewport, screen_to_world};
use node::{FrameParams, ItemNode};
use pointer::{ClickPolicy, PointerTracker, Release};
use scroll::{Direction, ScrollState};

/// Every catalogue item appears this many times in the scene.
pub const COPIES: usize = 3;

/// Tunables the controller needs, lifted out of [`Configuration`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    pub bend: f32,
    pub vertical_offset: f32,
    pub ease: f32,
    pub drag_sensitivity: f32,
    pub wheel_step: f32,
    pub click_max_distance_px: f32,
    pub click_max_duration: Duration,
    pub wheel_settle_delay: Duration,
    pub hover_smoothing: f32,
    pub time_step: f32,
    pub fov_degrees: f32,
    pub camera_distance: f32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&Configuration::default())
    }
}

impl From<&Configuration> for ControllerOptions {
    fn from(cfg: &Configuration) -> Self {
        Self {
            bend: cfg.gallery.bend,
            vertical_offset: cfg.gallery.vertical_offset,
            ease: cfg.physics.ease,
            drag_sensitivity: cfg.physics.drag_sensitivity,
            wheel_step: cfg.physics.wheel_step,
            click_max_distance_px: cfg.physics.click_max_distance_px,
            click_max_duration: cfg.physics.click_max_duration,
            wheel_settle_delay: cfg.physics.wheel_settle_delay,
            hover_smoothing: cfg.physics.hover_smoothing,
            time_step: cfg.physics.time_step,
            fov_degrees: cfg.camera.fov_degrees,
            camera_distance: cfg.camera.distance,
        }
    }
}

/// Summary of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub direction: Direction,
    pub recycled: usize,
}

#[derive(Debug)]
pub struct GalleryController {
    items: Vec<GalleryItem>,
    nodes: Vec<ItemNode>,
    scroll: ScrollState,
    camera: Camera,
    screen: Screen,
    viewport: Viewport,
    pointer: PointerTracker,
    settle_at: Option<Instant>,
    options: ControllerOptions,
}

impl GalleryController {
    /// Builds the scene for `items`. Returns `None` (after logging) for an empty list.
    pub fn new<R: Rng + ?Sized>(
        items: Vec<GalleryItem>,
        options: ControllerOptions,
        screen: Screen,
        rng: &mut R,
    ) -> Option<Self> {
        if items.is_empty() {
            warn!("gallery_skipped_empty_items");
            return None;
        }

        let node_count = items.len() * COPIES;
        let nodes = (0..node_count)
            .map(|virtual_index| {
                ItemNode::new(
                    virtual_index % items.len(),
                    virtual_index,
                    node_count,
                    rng.random_range(0.0..100.0),
                )
            })
            .collect();

        let camera = Camera::new(options.fov_degrees, options.camera_distance);
        let viewport = camera.viewport();
        let pointer = PointerTracker::new(ClickPolicy {
            max_distance_px: options.click_max_distance_px,
            max_duration: options.click_max_duration,
        });

        let mut controller = Self {
            items,
            nodes,
            scroll: ScrollState::new(options.ease),
            camera,
            screen,
            viewport,
            pointer,
            settle_at: None,
            options,
        };
        controller.resize(screen);
        debug!(
            items = controller.items.len(),
            nodes = controller.nodes.len(),
            "gallery_constructed"
        );
        Some(controller)
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn nodes(&self) -> &[ItemNode] {
        &self.nodes
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_dragging()
    }

    /// Scroll distance between neighbouring items.
    pub fn item_width(&self) -> f32 {
        self.nodes.first().map_or(0.0, ItemNode::width)
    }

    pub fn total_width(&self) -> f32 {
        self.nodes.first().map_or(0.0, ItemNode::total_width)
    }

    /// Re-measures the container. Zero-area sizes are ignored.
    pub fn resize(&mut self, screen: Screen) {
        let Some(viewport) = self.camera.resize(screen) else {
            debug!(
                width = screen.width,
                height = screen.height,
                "gallery_resize_ignored"
            );
            return;
        };
        self.screen = screen;
        self.viewport = viewport;
        for node in &mut self.nodes {
            node.resize(screen, viewport);
        }
    }

    pub fn pointer_down(&mut self, at: Vec2, now: Instant) {
        self.pointer.press(at, now);
        self.scroll.drag_anchor = Some(self.scroll.current);
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        match self.pointer.motion(at) {
            Some(travel) => {
                let anchor = self.scroll.drag_anchor.unwrap_or(self.scroll.current);
                self.scroll.target = anchor + travel * self.options.drag_sensitivity;
            }
            None => self.hover_at(at),
        }
    }

    /// Ends a press. A click over an item yields the selection signal.
    pub fn pointer_up(&mut self, at: Vec2, now: Instant) -> Option<ItemSelected> {
        let release = self.pointer.release(at, now);
        self.scroll.drag_anchor = None;
        match release {
            Release::Click(point) => {
                let node = self.hit_test(point)?;
                let id = self.items[self.nodes[node].item()].id.clone();
                debug!(%id, node, "item_selected");
                Some(ItemSelected { id })
            }
            Release::Drag | Release::Ignored => None,
        }
    }

    /// Pointer left the container: drop hover and any in-flight gesture.
    pub fn pointer_leave(&mut self) {
        self.pointer.cancel();
        self.scroll.drag_anchor = None;
        for node in &mut self.nodes {
            node.set_hovered(false);
        }
    }

    /// Wheel notches; positive advances to the right.
    pub fn wheel_lines(&mut self, lines: f32, now: Instant) {
        if lines == 0.0 {
            return;
        }
        self.scroll.target += lines.signum() * self.options.wheel_step;
        self.settle_at = Some(now + self.options.wheel_settle_delay);
    }

    /// Precise (touchpad) wheel travel in pixels; positive advances to the right.
    pub fn wheel_pixels(&mut self, pixels: f32, now: Instant) {
        if pixels == 0.0 {
            return;
        }
        self.scroll.target += pixels * self.options.drag_sensitivity;
        self.settle_at = Some(now + self.options.wheel_settle_delay);
    }

    /// Moves the target by whole items (keyboard navigation).
    pub fn step_items(&mut self, steps: i32) {
        self.scroll.target += steps as f32 * self.item_width();
        self.scroll.snap_target(self.item_width());
    }

    /// One animation frame: settle check, easing, node updates.
    pub fn tick(&mut self, now: Instant) -> FrameReport {
        if self.settle_at.is_some_and(|at| now >= at) {
            self.settle_at = None;
            self.scroll.snap_target(self.item_width());
        }

        let direction = self.scroll.advance();
        let frame = FrameParams {
            scroll: &self.scroll,
            direction,
            viewport: self.viewport,
            arc: ArcLayout::new(self.options.bend, self.viewport.width),
            vertical_offset: self.options.vertical_offset,
            time_step: self.options.time_step,
            hover_smoothing: self.options.hover_smoothing,
        };
        let recycled = self
            .nodes
            .iter_mut()
            .map(|node| node.update(&frame))
            .filter(|shifted| *shifted)
            .count();
        self.scroll.end_frame();

        FrameReport {
            direction,
            recycled,
        }
    }

    /// First node, in construction order, whose bounds contain the pointer.
    ///
    /// Overlapping planes are not ordered by depth.
    pub fn hit_test(&self, pointer: Vec2) -> Option<usize> {
        let world = screen_to_world(pointer, self.screen, self.viewport)?;
        self.nodes.iter().position(|node| node.contains(world))
    }

    /// Updates the hover flag of every node for a pointer at `pointer`.
    pub fn hover_at(&mut self, pointer: Vec2) {
        let world = screen_to_world(pointer, self.screen, self.viewport);
        for node in &mut self.nodes {
            node.set_hovered(world.is_some_and(|w| node.contains(w)));
        }
    }

    /// Item shown closest to the centre of the viewport.
    pub fn focused_item(&self) -> Option<usize> {
        self.nodes
            .iter()
            .min_by(|a, b| {
                let da = a.scroll_x(self.scroll.current).abs();
                let db = b.scroll_x(self.scroll.current).abs();
                da.total_cmp(&db)
            })
            .map(ItemNode::item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn items(n: usize) -> Vec<GalleryItem> {
        (0..n)
            .map(|i| GalleryItem::new(format!("id-{i}"), format!("Item {i}"), format!("{i}.png")))
            .collect()
    }

    fn controller(n: usize) -> GalleryController {
        let mut rng = StdRng::seed_from_u64(7);
        GalleryController::new(
            items(n),
            ControllerOptions::default(),
            Screen::new(1600.0, 900.0),
            &mut rng,
        )
        .expect("non-empty gallery")
    }

    #[test]
    fn empty_items_build_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(
            GalleryController::new(
                Vec::new(),
                ControllerOptions::default(),
                Screen::new(800.0, 600.0),
                &mut rng,
            )
            .is_none()
        );
    }

    #[test]
    fn wave_clocks_are_desynchronised() {
        let c = controller(4);
        let first = c.nodes()[0].time();
        assert!(c.nodes().iter().skip(1).any(|n| (n.time() - first).abs() > 1e-3));
    }

    #[test]
    fn drag_moves_target_against_pointer() {
        let mut c = controller(4);
        let t0 = Instant::now();
        c.pointer_down(Vec2::new(800.0, 450.0), t0);
        c.pointer_move(Vec2::new(700.0, 450.0));
        assert!((c.scroll().target - 5.0).abs() < 1e-5);
        assert!(c.pointer_up(Vec2::new(700.0, 450.0), t0 + Duration::from_millis(100)).is_none());
        assert!(c.scroll().drag_anchor.is_none());
    }

    #[test]
    fn wheel_settles_on_item_boundary_after_delay() {
        let mut c = controller(4);
        let t0 = Instant::now();
        c.wheel_lines(1.0, t0);
        c.wheel_lines(1.0, t0 + Duration::from_millis(50));
        c.tick(t0 + Duration::from_millis(100));
        assert!((c.scroll().target - 0.8).abs() < 1e-5, "no snap before the quiet period");
        c.tick(t0 + Duration::from_millis(260));
        assert!(c.scroll().target.abs() < 1e-5, "0.8 rounds to item 0");
    }

    #[test]
    fn leaving_clears_hover() {
        let mut c = controller(2);
        c.tick(Instant::now());
        c.hover_at(Vec2::new(800.0, 450.0));
        assert!(c.nodes().iter().any(ItemNode::is_hovered));
        c.pointer_leave();
        assert!(!c.nodes().iter().any(ItemNode::is_hovered));
    }
}
