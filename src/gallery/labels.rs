//! Placement of the text labels hanging below each image plane.

use glam::{Mat4, Vec2, Vec3};

/// Title height as a fraction of the plane height.
pub const TITLE_HEIGHT: f32 = 0.15;
/// Price / sold-count height as a fraction of the plane height.
pub const SUB_HEIGHT: f32 = 0.1;
/// World-unit gap between the plane and the first label row, and between rows.
pub const LABEL_GAP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Title,
    Price,
    Sold,
}

/// Offset of a label's centre from its plane's centre, and its world size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSlot {
    pub role: LabelRole,
    pub offset: Vec2,
    pub size: Vec2,
}

/// Lays out labels for a plane of `plane_scale`. Each entry pairs a role with
/// the raster's width/height ratio.
///
/// The title sits directly below the plane; price and sold count share the
/// row beneath it, split left and right when both are present.
pub fn layout_labels(plane_scale: Vec2, labels: &[(LabelRole, f32)]) -> Vec<LabelSlot> {
    let title_h = plane_scale.y * TITLE_HEIGHT;
    let sub_h = plane_scale.y * SUB_HEIGHT;
    let bottom = -plane_scale.y / 2.0;
    let has = |role| labels.iter().any(|(r, _)| *r == role);
    let split = has(LabelRole::Price) && has(LabelRole::Sold);

    labels
        .iter()
        .map(|&(role, aspect)| match role {
            LabelRole::Title => LabelSlot {
                role,
                offset: Vec2::new(0.0, bottom - LABEL_GAP - title_h / 2.0),
                size: Vec2::new(title_h * aspect, title_h),
            },
            LabelRole::Price | LabelRole::Sold => {
                let x = match (split, role) {
                    (true, LabelRole::Price) => -plane_scale.x / 4.0,
                    (true, _) => plane_scale.x / 4.0,
                    (false, _) => 0.0,
                };
                LabelSlot {
                    role,
                    offset: Vec2::new(x, bottom - 2.0 * LABEL_GAP - title_h - sub_h / 2.0),
                    size: Vec2::new(sub_h * aspect, sub_h),
                }
            }
        })
        .collect()
}

/// Plane transform: arc placement and tilt, then plane scale.
pub fn plane_model(position: Vec2, rotation: f32, scale: Vec2) -> Mat4 {
    Mat4::from_translation(position.extend(0.0))
        * Mat4::from_rotation_z(rotation)
        * Mat4::from_scale(Vec3::new(scale.x, scale.y, 1.0))
}

/// Label transform: follows the plane's placement and tilt, not its scale.
pub fn label_model(position: Vec2, rotation: f32, slot: &LabelSlot) -> Mat4 {
    Mat4::from_translation(position.extend(0.0))
        * Mat4::from_rotation_z(rotation)
        * Mat4::from_translation(slot.offset.extend(0.0))
        * Mat4::from_scale(Vec3::new(slot.size.x, slot.size.y, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_hangs_below_plane() {
        let slots = layout_labels(Vec2::new(7.0, 9.0), &[(LabelRole::Title, 4.0)]);
        let title = slots[0];
        assert!((title.size.y - 1.35).abs() < 1e-5);
        assert!((title.size.x - 5.4).abs() < 1e-5);
        let top_edge = title.offset.y + title.size.y / 2.0;
        assert!((top_edge - (-4.5 - LABEL_GAP)).abs() < 1e-5);
    }

    #[test]
    fn price_and_sold_split_when_both_present() {
        let slots = layout_labels(
            Vec2::new(8.0, 10.0),
            &[
                (LabelRole::Title, 3.0),
                (LabelRole::Price, 2.0),
                (LabelRole::Sold, 2.0),
            ],
        );
        assert_eq!(slots[1].offset.x, -2.0);
        assert_eq!(slots[2].offset.x, 2.0);
        assert_eq!(slots[1].offset.y, slots[2].offset.y);
        assert!(slots[1].offset.y < slots[0].offset.y);
    }

    #[test]
    fn lone_sub_label_is_centred() {
        let slots = layout_labels(Vec2::new(8.0, 10.0), &[(LabelRole::Sold, 2.0)]);
        assert_eq!(slots[0].offset.x, 0.0);
    }

    #[test]
    fn label_follows_plane_without_its_scale() {
        let slot = LabelSlot {
            role: LabelRole::Title,
            offset: Vec2::new(0.0, -5.0),
            size: Vec2::new(2.0, 1.0),
        };
        let m = label_model(Vec2::new(3.0, 1.0), 0.0, &slot);
        let centre = m.transform_point3(Vec3::ZERO);
        assert!((centre - Vec3::new(3.0, -4.0, 0.0)).length() < 1e-5);
        let corner = m.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((corner - Vec3::new(4.0, -3.5, 0.0)).length() < 1e-5);
    }
}
