//! Maps a horizontal position onto a circular arc (the "bend" silhouette).

/// Vertical placement and z-rotation of a plane at horizontal position `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPlacement {
    pub y: f32,
    pub rotation: f32,
}

/// The arc through the viewport's half-width `H` with sag `B` at its ends.
#[derive(Debug, Clone, Copy)]
pub struct ArcLayout {
    bend: f32,
    half_width: f32,
    radius: f32,
}

impl ArcLayout {
    pub fn new(bend: f32, viewport_width: f32) -> Self {
        let half_width = viewport_width / 2.0;
        let b = bend.abs();
        let radius = if b > 0.0 {
            (half_width * half_width + b * b) / (2.0 * b)
        } else {
            f32::INFINITY
        };
        Self {
            bend,
            half_width,
            radius,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn place(&self, x: f32, vertical_offset: f32) -> ArcPlacement {
        if self.bend == 0.0 || self.half_width <= 0.0 {
            return ArcPlacement {
                y: vertical_offset,
                rotation: 0.0,
            };
        }
        let r = self.radius;
        let effective_x = x.abs().min(self.half_width);
        let arc = r - (r * r - effective_x * effective_x).max(0.0).sqrt();
        let angle = (effective_x / r).clamp(-1.0, 1.0).asin();
        let side = sign(x);
        if self.bend > 0.0 {
            ArcPlacement {
                y: vertical_offset - arc,
                rotation: -side * angle,
            }
        } else {
            ArcPlacement {
                y: vertical_offset + arc,
                rotation: side * angle,
            }
        }
    }
}

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
