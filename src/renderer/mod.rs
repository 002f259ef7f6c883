//! GPU side of the gallery: uploads per-item textures and per-node uniforms,
//! then draws every plane and its labels with the shared programs.

pub mod geometry;
pub mod pipelines;
pub mod text;
pub mod texture;

use std::sync::Arc;

use anyhow::{Context, Result};
use bytemuck::Zeroable;
use palette::Srgba;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::catalogue::GalleryItem;
use crate::color::{parse_hex_color, to_linear_array, to_wgpu_color};
use crate::config::GallerySettings;
use crate::events::DecodedImage;
use crate::gallery::GalleryController;
use crate::gallery::labels::{LabelRole, label_model, layout_labels, plane_model};

use pipelines::GalleryPrograms;
use text::{FontSpec, TextRasterizer};
use texture::GpuTexture;

/// Labels with less coverage than this are discarded by the text program.
const LABEL_ALPHA_CUTOFF: f32 = 0.1;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ImageUniform {
    pub model: [[f32; 4]; 4],
    pub plane_size: [f32; 2],
    pub image_size: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub hover: f32,
    pub border_radius: f32,
    pub shadow: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LabelUniform {
    pub model: [[f32; 4]; 4],
    pub alpha_cutoff: f32,
    pub _pad: [f32; 3],
}

/// Visual settings resolved from [`GallerySettings`].
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub text_color: Srgba<u8>,
    pub sub_text_color: Srgba<u8>,
    pub shadow: [f32; 4],
    pub border_radius: f32,
    pub font: FontSpec,
    pub sub_font: FontSpec,
    pub clear: wgpu::Color,
}

impl RenderStyle {
    pub fn from_settings(settings: &GallerySettings) -> Result<Self> {
        let color = |name: &str, value: &str| {
            parse_hex_color(value).with_context(|| format!("gallery.{name} '{value}' is not a hex colour"))
        };
        Ok(Self {
            text_color: color("text-color", &settings.text_color)?,
            sub_text_color: color("sub-text-color", &settings.sub_text_color)?,
            shadow: to_linear_array(color("shadow-color", &settings.shadow_color)?),
            border_radius: settings.border_radius,
            font: FontSpec::parse(&settings.font).context("invalid gallery.font")?,
            sub_font: FontSpec::parse(&settings.sub_font).context("invalid gallery.sub-font")?,
            clear: to_wgpu_color(color("background", &settings.background)?),
        })
    }
}

struct LabelTexture {
    role: LabelRole,
    texture: GpuTexture,
    aspect: f32,
}

/// Textures shared by the copies of one catalogue item.
struct ItemTextures {
    image: GpuTexture,
    labels: Vec<LabelTexture>,
}

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct NodeSlots {
    image: UniformSlot,
    labels: Vec<UniformSlot>,
}

pub struct GalleryRenderer {
    programs: Arc<GalleryPrograms>,
    style: RenderStyle,
    camera: UniformSlot,
    items: Vec<ItemTextures>,
    nodes: Vec<NodeSlots>,
}

impl GalleryRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        programs: Arc<GalleryPrograms>,
        controller: &GalleryController,
        style: RenderStyle,
        rasterizer: &mut TextRasterizer,
    ) -> Self {
        let camera = uniform_slot(
            device,
            &programs.camera_layout,
            "gallery-camera",
            bytemuck::bytes_of(&CameraUniform {
                view_proj: controller.camera().view_proj().to_cols_array_2d(),
            }),
        );

        let items: Vec<ItemTextures> = controller
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let image = GpuTexture::blank(
                    device,
                    queue,
                    &programs.texture_layout,
                    &programs.sampler,
                    &format!("gallery-image-{index}"),
                );
                let labels = rasterize_labels(device, queue, &programs, &style, rasterizer, item);
                ItemTextures { image, labels }
            })
            .collect();

        let nodes = controller
            .nodes()
            .iter()
            .map(|node| {
                let image = uniform_slot(
                    device,
                    &programs.uniform_layout,
                    "gallery-node",
                    bytemuck::bytes_of(&ImageUniform::zeroed()),
                );
                let labels = items[node.item()]
                    .labels
                    .iter()
                    .map(|_| {
                        uniform_slot(
                            device,
                            &programs.uniform_layout,
                            "gallery-label",
                            bytemuck::bytes_of(&LabelUniform::zeroed()),
                        )
                    })
                    .collect();
                NodeSlots { image, labels }
            })
            .collect();

        debug!(items = items.len(), "gallery_gpu_resources_created");
        Self {
            programs,
            style,
            camera,
            items,
            nodes,
        }
    }

    /// Replaces the placeholder texture of catalogue item `item`.
    pub fn set_image(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        item: usize,
        image: &DecodedImage,
    ) {
        let Some(slot) = self.items.get_mut(item) else {
            warn!(item, "image_for_unknown_item");
            return;
        };
        slot.image = GpuTexture::from_rgba(
            device,
            queue,
            &self.programs.texture_layout,
            &self.programs.sampler,
            &format!("gallery-image-{item}"),
            image.width,
            image.height,
            &image.pixels,
        );
    }

    /// Writes camera and per-node uniforms for the controller's current frame.
    pub fn prepare(&self, queue: &wgpu::Queue, controller: &GalleryController) {
        queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: controller.camera().view_proj().to_cols_array_2d(),
            }),
        );

        for (node, slots) in controller.nodes().iter().zip(&self.nodes) {
            let item = &self.items[node.item()];
            let uniform = ImageUniform {
                model: plane_model(node.position(), node.rotation(), node.scale())
                    .to_cols_array_2d(),
                plane_size: node.scale().to_array(),
                image_size: item.image.size(),
                time: node.time(),
                speed: node.speed(),
                hover: node.hover_progress(),
                border_radius: self.style.border_radius,
                shadow: self.style.shadow,
            };
            queue.write_buffer(&slots.image.buffer, 0, bytemuck::bytes_of(&uniform));

            let roles: Vec<(LabelRole, f32)> =
                item.labels.iter().map(|l| (l.role, l.aspect)).collect();
            for (slot, target) in layout_labels(node.scale(), &roles).iter().zip(&slots.labels) {
                let uniform = LabelUniform {
                    model: label_model(node.position(), node.rotation(), slot).to_cols_array_2d(),
                    alpha_cutoff: LABEL_ALPHA_CUTOFF,
                    _pad: [0.0; 3],
                };
                queue.write_buffer(&target.buffer, 0, bytemuck::bytes_of(&uniform));
            }
        }
    }

    pub fn draw<'a>(&'a self, controller: &GalleryController, rpass: &mut wgpu::RenderPass<'a>) {
        rpass.set_bind_group(0, &self.camera.bind_group, &[]);

        rpass.set_pipeline(&self.programs.image_pipeline);
        for (node, slots) in controller.nodes().iter().zip(&self.nodes) {
            rpass.set_bind_group(1, &slots.image.bind_group, &[]);
            rpass.set_bind_group(2, &self.items[node.item()].image.bind_group, &[]);
            self.programs.plane.draw(rpass);
        }

        rpass.set_pipeline(&self.programs.text_pipeline);
        for (node, slots) in controller.nodes().iter().zip(&self.nodes) {
            let labels = &self.items[node.item()].labels;
            for (label, slot) in labels.iter().zip(&slots.labels) {
                rpass.set_bind_group(1, &slot.bind_group, &[]);
                rpass.set_bind_group(2, &label.texture.bind_group, &[]);
                self.programs.quad.draw(rpass);
            }
        }
    }
}

fn uniform_slot(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    contents: &[u8],
) -> UniformSlot {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    UniformSlot { buffer, bind_group }
}

/// Title, price and sold-count rasters for one item. A label whose font cannot
/// be resolved is skipped.
fn rasterize_labels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    programs: &GalleryPrograms,
    style: &RenderStyle,
    rasterizer: &mut TextRasterizer,
    item: &GalleryItem,
) -> Vec<LabelTexture> {
    let wanted = [
        (LabelRole::Title, Some(item.label.clone()), &style.font, style.text_color),
        (LabelRole::Price, item.price_label(), &style.sub_font, style.sub_text_color),
        (LabelRole::Sold, item.sold_label(), &style.sub_font, style.sub_text_color),
    ];

    wanted
        .into_iter()
        .filter_map(|(role, text, font, color)| {
            let text = text.filter(|t| !t.trim().is_empty())?;
            match rasterizer.rasterize(&text, font, color) {
                Ok(raster) => Some(LabelTexture {
                    role,
                    aspect: raster.aspect(),
                    texture: GpuTexture::from_rgba(
                        device,
                        queue,
                        &programs.texture_layout,
                        &programs.sampler,
                        &format!("gallery-label-{}", item.id),
                        raster.width,
                        raster.height,
                        &raster.pixels,
                    ),
                }),
                Err(err) => {
                    warn!(id = %item.id, ?role, error = %err, "label_raster_failed");
                    None
                }
            }
        })
        .collect()
}
