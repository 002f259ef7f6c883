//! Lifecycle wrapper around [`GalleryController`].
//!
//! Rebuilds the gallery whenever its items or options change, tears it down
//! on request, and forwards item selections to a [`Navigator`].

use std::time::Instant;

use glam::Vec2;
use tracing::info;

use crate::catalogue::{GalleryItem, ItemKind};
use crate::events::ItemSelected;
use crate::gallery::camera::Screen;
use crate::gallery::{ControllerOptions, FrameReport, GalleryController};
use crate::navigation::{Navigator, forward_selection};

pub struct GalleryHost<N> {
    navigator: N,
    kind: ItemKind,
    items: Vec<GalleryItem>,
    options: ControllerOptions,
    screen: Screen,
    controller: Option<GalleryController>,
    generation: u64,
}

impl<N: Navigator> GalleryHost<N> {
    pub fn new(navigator: N, kind: ItemKind, options: ControllerOptions, screen: Screen) -> Self {
        Self {
            navigator,
            kind,
            items: Vec::new(),
            options,
            screen,
            controller: None,
            generation: 0,
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ItemKind) {
        self.kind = kind;
    }

    /// Bumped on every rebuild; renderers compare it to know when to recreate resources.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn controller(&self) -> Option<&GalleryController> {
        self.controller.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }

    /// Replaces the item list. Returns `true` if the gallery was rebuilt.
    pub fn set_items(&mut self, items: Vec<GalleryItem>) -> bool {
        if items == self.items && self.generation > 0 {
            return false;
        }
        self.items = items;
        self.rebuild();
        true
    }

    /// Replaces the controller options. Returns `true` if the gallery was rebuilt.
    pub fn set_options(&mut self, options: ControllerOptions) -> bool {
        if options == self.options {
            return false;
        }
        self.options = options;
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        self.teardown();
        self.generation += 1;
        self.controller = GalleryController::new(
            self.items.clone(),
            self.options.clone(),
            self.screen,
            &mut rand::rng(),
        );
        if let Some(controller) = &self.controller {
            info!(
                generation = self.generation,
                items = controller.items().len(),
                nodes = controller.nodes().len(),
                "gallery_constructed"
            );
        }
    }

    /// Drops the controller; input and frames stop reaching it.
    pub fn teardown(&mut self) {
        if self.controller.take().is_some() {
            info!(generation = self.generation, "gallery_torn_down");
        }
    }

    pub fn resize(&mut self, screen: Screen) {
        if screen.has_area() {
            self.screen = screen;
        }
        if let Some(controller) = self.controller.as_mut() {
            controller.resize(screen);
        }
    }

    pub fn pointer_down(&mut self, at: Vec2, now: Instant) {
        if let Some(controller) = self.controller.as_mut() {
            controller.pointer_down(at, now);
        }
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        if let Some(controller) = self.controller.as_mut() {
            controller.pointer_move(at);
        }
    }

    /// Ends a press; a click on an item is routed to the navigator and returned.
    pub fn pointer_up(&mut self, at: Vec2, now: Instant) -> Option<ItemSelected> {
        let selected = self.controller.as_mut()?.pointer_up(at, now)?;
        info!(id = %selected.id, kind = ?self.kind, "item_selected");
        forward_selection(&mut self.navigator, self.kind, selected.clone());
        Some(selected)
    }

    pub fn pointer_leave(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.pointer_leave();
        }
    }

    pub fn wheel_lines(&mut self, lines: f32, now: Instant) {
        if let Some(controller) = self.controller.as_mut() {
            controller.wheel_lines(lines, now);
        }
    }

    pub fn wheel_pixels(&mut self, pixels: f32, now: Instant) {
        if let Some(controller) = self.controller.as_mut() {
            controller.wheel_pixels(pixels, now);
        }
    }

    pub fn step_items(&mut self, steps: i32) {
        if let Some(controller) = self.controller.as_mut() {
            controller.step_items(steps);
        }
    }

    pub fn tick(&mut self, now: Instant) -> Option<FrameReport> {
        self.controller.as_mut().map(|c| c.tick(now))
    }
}
