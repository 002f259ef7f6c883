use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::catalogue::ItemKind;
use crate::color::parse_hex_color;
use crate::renderer::text::FontSpec;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GallerySettings {
    /// Arc strength of the carousel silhouette in world units (0 = flat strip).
    pub bend: f32,
    /// Label colour as a hex string.
    pub text_color: String,
    /// Colour of the secondary labels (price, sold count).
    pub sub_text_color: String,
    /// Corner rounding of each image plane as a fraction of its size, in `[0, 1)`.
    pub border_radius: f32,
    /// CSS-like font spec for item titles, e.g. `bold 30px DejaVu Sans`.
    pub font: String,
    /// Font spec for the price and sold-count labels.
    pub sub_font: String,
    /// Colour the image blends toward while hovered.
    pub shadow_color: String,
    /// Fixed vertical offset applied to every plane before the arc.
    pub vertical_offset: f32,
    /// Surface clear colour.
    pub background: String,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            bend: 3.0,
            text_color: "#ffffff".into(),
            sub_text_color: "#cbd5e1".into(),
            border_radius: 0.05,
            font: "bold 30px DejaVu Sans".into(),
            sub_font: "24px DejaVu Sans".into(),
            shadow_color: "#000000".into(),
            vertical_offset: 0.0,
            background: "#111827".into(),
        }
    }
}

impl GallerySettings {
    fn validate(&self) -> Result<()> {
        ensure!(self.bend.is_finite(), "gallery.bend must be finite");
        ensure!(
            (0.0..1.0).contains(&self.border_radius),
            "gallery.border-radius must be in [0, 1)"
        );
        ensure!(
            self.vertical_offset.is_finite(),
            "gallery.vertical-offset must be finite"
        );
        for (name, value) in [
            ("text-color", &self.text_color),
            ("sub-text-color", &self.sub_text_color),
            ("shadow-color", &self.shadow_color),
            ("background", &self.background),
        ] {
            ensure!(
                parse_hex_color(value).is_some(),
                "gallery.{name} '{value}' is not a hex colour"
            );
        }
        FontSpec::parse(&self.font).context("invalid gallery.font")?;
        FontSpec::parse(&self.sub_font).context("invalid gallery.sub-font")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PhysicsSettings {
    /// Fraction of the remaining distance covered each frame, in `(0, 1]`.
    pub ease: f32,
    /// World units scrolled per pixel of drag.
    pub drag_sensitivity: f32,
    /// World units scrolled per wheel notch.
    pub wheel_step: f32,
    /// Pointer travel (px) beyond which a gesture is a drag, never a click.
    pub click_max_distance_px: f32,
    /// Longest press that still counts as a click.
    #[serde(with = "humantime_serde")]
    pub click_max_duration: Duration,
    /// Quiet period after the last wheel event before snapping to an item.
    #[serde(with = "humantime_serde")]
    pub wheel_settle_delay: Duration,
    /// Per-frame smoothing factor for hover progress, in `(0, 1]`.
    pub hover_smoothing: f32,
    /// Per-frame increment of the wave animation clock.
    pub time_step: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            ease: 0.05,
            drag_sensitivity: 0.05,
            wheel_step: 0.4,
            click_max_distance_px: 5.0,
            click_max_duration: Duration::from_millis(200),
            wheel_settle_delay: Duration::from_millis(200),
            hover_smoothing: 0.1,
            time_step: 0.04,
        }
    }
}

impl PhysicsSettings {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.ease > 0.0 && self.ease <= 1.0,
            "physics.ease must be in (0, 1]"
        );
        ensure!(
            self.drag_sensitivity > 0.0,
            "physics.drag-sensitivity must be positive"
        );
        ensure!(self.wheel_step > 0.0, "physics.wheel-step must be positive");
        ensure!(
            self.click_max_distance_px >= 0.0,
            "physics.click-max-distance-px must not be negative"
        );
        ensure!(
            self.hover_smoothing > 0.0 && self.hover_smoothing <= 1.0,
            "physics.hover-smoothing must be in (0, 1]"
        );
        ensure!(self.time_step.is_finite(), "physics.time-step must be finite");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            distance: 20.0,
        }
    }
}

impl CameraSettings {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.fov_degrees > 0.0 && self.fov_degrees < 180.0,
            "camera.fov-degrees must be in (0, 180)"
        );
        ensure!(self.distance > 0.0, "camera.distance must be positive");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Loop Gallery".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LoaderSettings {
    /// Maximum number of concurrent fetch+decode jobs.
    pub max_concurrent: usize,
    /// Timeout for a single remote fetch.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Longest edge (px) kept after decoding; larger images are downscaled.
    pub max_dimension: u32,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            request_timeout: Duration::from_secs(10),
            max_dimension: 1024,
        }
    }
}

impl LoaderSettings {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.max_concurrent > 0,
            "loader.max-concurrent must be greater than zero"
        );
        ensure!(
            self.max_dimension > 0,
            "loader.max-dimension must be greater than zero"
        );
        Ok(())
    }
}

/// Settings for the layout-driven (non-GPU) carousel variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CarouselSettings {
    pub item_width_px: f32,
    pub gap_px: f32,
    /// Drag distance (px) that must be exceeded before a release can advance.
    pub drag_buffer_px: f32,
    /// Release speed (px/s) beyond which a drag flings to the neighbour.
    pub velocity_threshold: f32,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
    /// Wrap around at either end instead of clamping.
    #[serde(rename = "loop")]
    pub loop_items: bool,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            item_width_px: 300.0,
            gap_px: 16.0,
            drag_buffer_px: 40.0,
            velocity_threshold: 500.0,
            spring_stiffness: 300.0,
            spring_damping: 30.0,
            loop_items: false,
        }
    }
}

impl CarouselSettings {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.item_width_px > 0.0,
            "carousel.item-width-px must be positive"
        );
        ensure!(self.gap_px >= 0.0, "carousel.gap-px must not be negative");
        ensure!(
            self.drag_buffer_px >= 0.0,
            "carousel.drag-buffer-px must not be negative"
        );
        ensure!(
            self.velocity_threshold > 0.0,
            "carousel.velocity-threshold must be positive"
        );
        ensure!(
            self.spring_stiffness > 0.0 && self.spring_damping >= 0.0,
            "carousel spring must have positive stiffness and non-negative damping"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Catalogue file (YAML, or JSON when the extension is `.json`).
    pub items_path: PathBuf,
    /// Whether the catalogue lists products or categories.
    pub item_kind: ItemKind,
    pub gallery: GallerySettings,
    pub physics: PhysicsSettings,
    pub camera: CameraSettings,
    pub window: WindowSettings,
    pub loader: LoaderSettings,
    pub carousel: CarouselSettings,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            items_path: PathBuf::from("items.yaml"),
            item_kind: ItemKind::default(),
            gallery: GallerySettings::default(),
            physics: PhysicsSettings::default(),
            camera: CameraSettings::default(),
            window: WindowSettings::default(),
            loader: LoaderSettings::default(),
            carousel: CarouselSettings::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.items_path.as_os_str().is_empty(),
            "items-path must not be empty"
        );
        self.gallery
            .validate()
            .context("invalid gallery configuration")?;
        self.physics
            .validate()
            .context("invalid physics configuration")?;
        self.camera
            .validate()
            .context("invalid camera configuration")?;
        self.loader
            .validate()
            .context("invalid loader configuration")?;
        self.carousel
            .validate()
            .context("invalid carousel configuration")?;
        Ok(self)
    }
}
