//! Perspective camera and the world-space extent it sees at the item plane.

use glam::{Mat4, Vec2, Vec3};

/// Container size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Visible extent, in world units, of the `z = 0` plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct Camera {
    fov_y: f32,
    distance: f32,
    aspect: f32,
}

impl Camera {
    const NEAR: f32 = 0.1;
    const FAR: f32 = 100.0;

    pub fn new(fov_degrees: f32, distance: f32) -> Self {
        Self {
            fov_y: fov_degrees.to_radians(),
            distance,
            aspect: 1.0,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Updates the aspect ratio from `screen`. Returns `None` for a zero-area
    /// screen so callers never propagate a NaN extent.
    pub fn resize(&mut self, screen: Screen) -> Option<Viewport> {
        if !screen.has_area() {
            return None;
        }
        self.aspect = screen.width / screen.height;
        Some(self.viewport())
    }

    pub fn viewport(&self) -> Viewport {
        let height = 2.0 * (self.fov_y / 2.0).tan() * self.distance;
        Viewport {
            width: height * self.aspect,
            height,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, Self::NEAR, Self::FAR);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y);
        proj * view
    }
}

/// Converts a container-relative pixel position to world coordinates on the item plane.
pub fn screen_to_world(pointer: Vec2, screen: Screen, viewport: Viewport) -> Option<Vec2> {
    if !screen.has_area() {
        return None;
    }
    let ndc_x = (pointer.x / screen.width) * 2.0 - 1.0;
    let ndc_y = -(pointer.y / screen.height) * 2.0 + 1.0;
    Some(Vec2::new(
        ndc_x * viewport.width / 2.0,
        ndc_y * viewport.height / 2.0,
    ))
}
