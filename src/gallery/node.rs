//! One visual copy of a catalogue item and its per-frame transform state.

use glam::Vec2;

use super::arc::ArcLayout;
use super::camera::{Screen, Viewport};
use super::scroll::{Direction, ScrollState};

/// Reference screen height the plane design size is expressed against.
pub const DESIGN_HEIGHT: f32 = 1500.0;
/// Plane size in design pixels.
pub const PLANE_DESIGN_SIZE: Vec2 = Vec2::new(700.0, 900.0);
/// World-unit gap between neighbouring planes.
pub const PLANE_PADDING: f32 = 2.0;

/// Inputs shared by every node for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams<'a> {
    pub scroll: &'a ScrollState,
    pub direction: Direction,
    pub viewport: Viewport,
    pub arc: ArcLayout,
    pub vertical_offset: f32,
    pub time_step: f32,
    pub hover_smoothing: f32,
}

#[derive(Debug, Clone)]
pub struct ItemNode {
    item: usize,
    virtual_index: usize,
    node_count: usize,
    wrap_offset: f32,
    base_x: f32,
    width: f32,
    total_width: f32,
    scale: Vec2,
    position: Vec2,
    rotation: f32,
    time: f32,
    speed: f32,
    hover_progress: f32,
    hovered: bool,
}

impl ItemNode {
    /// `time` seeds the wave clock so neighbouring planes do not ripple in sync.
    pub fn new(item: usize, virtual_index: usize, node_count: usize, time: f32) -> Self {
        Self {
            item,
            virtual_index,
            node_count,
            wrap_offset: 0.0,
            base_x: 0.0,
            width: 0.0,
            total_width: 0.0,
            scale: Vec2::ZERO,
            position: Vec2::ZERO,
            rotation: 0.0,
            time,
            speed: 0.0,
            hover_progress: 0.0,
            hovered: false,
        }
    }

    pub fn item(&self) -> usize {
        self.item
    }

    pub fn virtual_index(&self) -> usize {
        self.virtual_index
    }

    pub fn wrap_offset(&self) -> f32 {
        self.wrap_offset
    }

    pub fn base_x(&self) -> f32 {
        self.base_x
    }

    /// Plane width plus padding: the scroll distance between neighbours.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn total_width(&self) -> f32 {
        self.total_width
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn hover_progress(&self) -> f32 {
        self.hover_progress
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Recomputes size and slot from the container and its world extent.
    pub fn resize(&mut self, screen: Screen, viewport: Viewport) {
        if !screen.has_area() {
            return;
        }
        let design_scale = screen.height / DESIGN_HEIGHT;
        self.scale = Vec2::new(
            viewport.width * (PLANE_DESIGN_SIZE.x * design_scale) / screen.width,
            viewport.height * (PLANE_DESIGN_SIZE.y * design_scale) / screen.height,
        );
        self.width = self.scale.x + PLANE_PADDING;
        self.total_width = self.width * self.node_count as f32;
        self.base_x = self.width * self.virtual_index as f32;
    }

    /// Horizontal position before the arc is applied.
    pub fn scroll_x(&self, current: f32) -> f32 {
        self.base_x - current - self.wrap_offset
    }

    /// Per-frame update. Returns `true` when the node was recycled to the other side.
    pub fn update(&mut self, frame: &FrameParams<'_>) -> bool {
        let x = self.scroll_x(frame.scroll.current);
        let placement = frame.arc.place(x, frame.vertical_offset);
        self.position = Vec2::new(x, placement.y);
        self.rotation = placement.rotation;

        self.time += frame.time_step;
        self.speed = frame.scroll.speed();

        let plane_half = self.scale.x / 2.0;
        let viewport_half = frame.viewport.width / 2.0;
        let is_before = x + plane_half < -viewport_half;
        let is_after = x - plane_half > viewport_half;
        let recycled = match frame.direction {
            Direction::Right if is_before => {
                self.wrap_offset -= self.total_width;
                true
            }
            Direction::Left if is_after => {
                self.wrap_offset += self.total_width;
                true
            }
            _ => false,
        };

        let goal = if self.hovered { 1.0 } else { 0.0 };
        self.hover_progress += (goal - self.hover_progress) * frame.hover_smoothing;
        self.hover_progress = self.hover_progress.clamp(0.0, 1.0);

        recycled
    }

    /// Inclusive axis-aligned bounds test against the plane's current position.
    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.scale / 2.0;
        (point.x - self.position.x).abs() <= half.x && (point.y - self.position.y).abs() <= half.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized_node(virtual_index: usize, count: usize) -> ItemNode {
        let mut node = ItemNode::new(virtual_index % 4, virtual_index, count, 0.0);
        node.resize(
            Screen::new(1500.0, 1500.0),
            Viewport {
                width: 15.0,
                height: 15.0,
            },
        );
        node
    }

    fn frame<'a>(scroll: &'a ScrollState, direction: Direction) -> FrameParams<'a> {
        FrameParams {
            scroll,
            direction,
            viewport: Viewport {
                width: 15.0,
                height: 15.0,
            },
            arc: ArcLayout::new(0.0, 15.0),
            vertical_offset: 0.0,
            time_step: 0.04,
            hover_smoothing: 0.1,
        }
    }

    #[test]
    fn resize_derives_slot_from_design_size() {
        let node = sized_node(3, 12);
        assert!((node.scale().x - 7.0).abs() < 1e-5);
        assert!((node.scale().y - 9.0).abs() < 1e-5);
        assert!((node.width() - 9.0).abs() < 1e-5);
        assert!((node.total_width() - 108.0).abs() < 1e-4);
        assert!((node.base_x() - 27.0).abs() < 1e-5);
    }

    #[test]
    fn zero_area_resize_keeps_previous_geometry() {
        let mut node = sized_node(1, 12);
        node.resize(
            Screen::new(0.0, 0.0),
            Viewport {
                width: f32::NAN,
                height: f32::NAN,
            },
        );
        assert!(node.scale().x.is_finite());
        assert!((node.width() - 9.0).abs() < 1e-5);
    }

    #[test]
    fn recycles_only_in_scroll_direction() {
        let mut node = sized_node(0, 12);
        let mut scroll = ScrollState::new(0.05);
        scroll.current = 20.0;
        // x = -20: fully left of the viewport.
        assert!(!node.update(&frame(&scroll, Direction::Left)));
        assert_eq!(node.wrap_offset(), 0.0);
        assert!(node.update(&frame(&scroll, Direction::Right)));
        assert!((node.wrap_offset() + 108.0).abs() < 1e-4);
        assert!((node.scroll_x(scroll.current) - 88.0).abs() < 1e-3);
        // Now far to the right; continuing rightward never shifts again.
        assert!(!node.update(&frame(&scroll, Direction::Right)));
    }

    #[test]
    fn hover_progress_is_smoothed_and_bounded() {
        let mut node = sized_node(0, 12);
        let scroll = ScrollState::new(0.05);
        node.set_hovered(true);
        node.update(&frame(&scroll, Direction::Left));
        assert!((node.hover_progress() - 0.1).abs() < 1e-6);
        for _ in 0..500 {
            node.update(&frame(&scroll, Direction::Left));
            assert!((0.0..=1.0).contains(&node.hover_progress()));
        }
        assert!(node.hover_progress() > 0.99);
        node.set_hovered(false);
        node.update(&frame(&scroll, Direction::Left));
        assert!(node.hover_progress() < 1.0 && node.hover_progress() > 0.8);
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut node = sized_node(0, 12);
        let scroll = ScrollState::new(0.05);
        node.update(&frame(&scroll, Direction::Left));
        let half = node.scale() / 2.0;
        assert!(node.contains(Vec2::new(half.x, 0.0)));
        assert!(node.contains(Vec2::new(-half.x, -half.y)));
        assert!(!node.contains(Vec2::new(half.x + 1e-3, 0.0)));
    }
}
