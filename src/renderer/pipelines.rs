//! Compiled programs shared by every gallery built on the same drawing context.

use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::gpu::ContextId;

use super::geometry::{GpuMesh, PLANE_SEGMENTS_X, PLANE_SEGMENTS_Y, Vertex, build_plane_mesh};

/// Additive-only cache: entries are built once per key and never evicted.
#[derive(Debug)]
pub struct ProgramCache<K, V> {
    entries: HashMap<K, Arc<V>>,
}

impl<K, V> Default for ProgramCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> ProgramCache<K, V> {
    pub fn get_or_build(&mut self, key: K, build: impl FnOnce() -> V) -> Arc<V> {
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(build()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type GalleryProgramCache = ProgramCache<(ContextId, wgpu::TextureFormat), GalleryPrograms>;

/// Both pipelines plus the layouts, sampler and plane mesh they are used with.
pub struct GalleryPrograms {
    pub image_pipeline: wgpu::RenderPipeline,
    pub text_pipeline: wgpu::RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    pub plane: GpuMesh,
    pub quad: GpuMesh,
}

impl GalleryPrograms {
    pub fn build(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        debug!(?format, "compiling_gallery_programs");
        let camera_layout = uniform_layout(device, "gallery-camera-layout", wgpu::ShaderStages::VERTEX);
        let uniform_layout = uniform_layout(
            device,
            "gallery-node-layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gallery-texture-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gallery-pipeline-layout"),
            bind_group_layouts: &[&camera_layout, &uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let image_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gallery-image-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/image.wgsl"))),
        });
        let text_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gallery-text-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/text.wgsl"))),
        });

        let image_pipeline = render_pipeline(
            device,
            "gallery-image-pipeline",
            &pipeline_layout,
            &image_shader,
            format,
        );
        let text_pipeline = render_pipeline(
            device,
            "gallery-text-pipeline",
            &pipeline_layout,
            &text_shader,
            format,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("gallery-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let plane = GpuMesh::upload(
            device,
            &build_plane_mesh(PLANE_SEGMENTS_X, PLANE_SEGMENTS_Y),
            "gallery-plane",
        );
        let quad = GpuMesh::upload(device, &build_plane_mesh(1, 1), "gallery-label-quad");

        Self {
            image_pipeline,
            text_pipeline,
            camera_layout,
            uniform_layout,
            texture_layout,
            sampler,
            plane,
            quad,
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_once_per_key() {
        let mut cache: ProgramCache<(u32, &str), String> = ProgramCache::default();
        let mut builds = 0;
        let a = cache.get_or_build((1, "rgba"), || {
            builds += 1;
            "first".to_string()
        });
        let b = cache.get_or_build((1, "rgba"), || {
            builds += 1;
            "second".to_string()
        });
        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "first");
    }

    #[test]
    fn distinct_contexts_get_distinct_entries() {
        let mut cache: ProgramCache<(u32, &str), u32> = ProgramCache::default();
        cache.get_or_build((1, "rgba"), || 1);
        cache.get_or_build((2, "rgba"), || 2);
        cache.get_or_build((1, "bgra"), || 3);
        assert_eq!(cache.len(), 3);
    }
}
