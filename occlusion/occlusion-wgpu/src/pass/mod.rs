//! Occlusion pass: depth-only occluders first, then constant-color outlines, over whatever
//! is already in the color target (the camera image).

use bytemuck::{Pod, Zeroable};
use occlusion_core::{ColorWriteMask, DrawItem, Material};
use surface_api::PlaneGeometry;
use wgpu::CommandEncoder;

use crate::device::{WgpuPlaneGeometry, PLANE_VERTEX_STRIDE};

const SHADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/occlusion.wgsl"));

/// Per-draw uniform: model matrix (column-major) + outline color.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniform {
    model: [f32; 16],
    color: [f32; 4],
}

const OBJECT_UNIFORM_SIZE: u64 = std::mem::size_of::<ObjectUniform>() as u64;

/// Maps a material's channel mask onto wgpu color writes.
pub fn color_writes(mask: ColorWriteMask) -> wgpu::ColorWrites {
    let mut writes = wgpu::ColorWrites::empty();
    if mask.contains(ColorWriteMask::RED) {
        writes |= wgpu::ColorWrites::RED;
    }
    if mask.contains(ColorWriteMask::GREEN) {
        writes |= wgpu::ColorWrites::GREEN;
    }
    if mask.contains(ColorWriteMask::BLUE) {
        writes |= wgpu::ColorWrites::BLUE;
    }
    if mask.contains(ColorWriteMask::ALPHA) {
        writes |= wgpu::ColorWrites::ALPHA;
    }
    writes
}

#[derive(Clone, Debug)]
pub struct OcclusionPassConfig {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Clear the color target first. `None` keeps the existing camera image.
    pub clear_color: Option<wgpu::Color>,
}

impl Default for OcclusionPassConfig {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            depth_format: wgpu::TextureFormat::Depth32Float,
            clear_color: None,
        }
    }
}

pub struct OcclusionPass {
    occluder_pipeline: wgpu::RenderPipeline,
    outline_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    view_proj_buf: wgpu::Buffer,
    config: OcclusionPassConfig,
}

impl OcclusionPass {
    pub fn new(device: &wgpu::Device, config: OcclusionPassConfig) -> Result<Self, String> {
        if !config.depth_format.has_depth_aspect() {
            return Err(format!("OcclusionPass: {:?} is not a depth format", config.depth_format));
        }
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("occlusion_shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("occlusion_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(OBJECT_UNIFORM_SIZE),
                    },
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("occlusion_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let occluder_pipeline = Self::build_pipeline(
            device,
            &shader,
            &pipeline_layout,
            &config,
            "occlusion_occluder",
            color_writes(Material::depth_only().color_write_mask),
            None,
        );
        let outline_pipeline = Self::build_pipeline(
            device,
            &shader,
            &pipeline_layout,
            &config,
            "occlusion_outline",
            wgpu::ColorWrites::ALL,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );
        let view_proj_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("occlusion_view_proj"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(Self { occluder_pipeline, outline_pipeline, bind_group_layout, view_proj_buf, config })
    }

    fn build_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        config: &OcclusionPassConfig,
        label: &str,
        write_mask: wgpu::ColorWrites,
        blend: Option<wgpu::BlendState>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: PLANE_VERTEX_STRIDE,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                        wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x2 },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.color_format,
                    blend,
                    write_mask,
                })],
                compilation_options: Default::default(),
            }),
            // Planes are seen from both sides (walls, tables from below).
            primitive: wgpu::PrimitiveState { cull_mode: None, ..Default::default() },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: config.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    pub fn config(&self) -> &OcclusionPassConfig {
        &self.config
    }

    /// Encodes `items` in order. Items must already be sorted (see `SurfaceScene::draw_list`).
    /// Geometry not created by `WgpuMeshDevice`, or with no triangles yet, is skipped.
    pub fn encode(
        &self,
        encoder: &mut CommandEncoder,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        items: &[DrawItem<'_>],
        view_proj: &[f32; 16],
    ) -> Result<(), String> {
        queue.write_buffer(&self.view_proj_buf, 0, bytemuck::cast_slice(view_proj));
        let load = match self.config.clear_color {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("occlusion_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let mut drawn = 0usize;
        for item in items {
            let Some(geometry) = item.mesh.geometry.as_any().downcast_ref::<WgpuPlaneGeometry>() else {
                log::trace!("surface {:?}: geometry from another device; skipped", item.surface_id);
                continue;
            };
            let index_count = geometry.index_count();
            if index_count == 0 {
                continue;
            }
            let pipeline = if item.mesh.material.writes_color() {
                &self.outline_pipeline
            } else {
                &self.occluder_pipeline
            };
            let object = ObjectUniform {
                model: item.world_transform,
                color: item.mesh.material.diffuse.to_array(),
            };
            let object_buf = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("occlusion_object"),
                size: OBJECT_UNIFORM_SIZE,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(&object_buf, 0, bytemuck::bytes_of(&object));
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("occlusion_bg"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry { binding: 0, resource: self.view_proj_buf.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 1, resource: object_buf.as_entire_binding() },
                ],
            });
            rp.set_pipeline(pipeline);
            rp.set_bind_group(0, &bind_group, &[]);
            rp.set_vertex_buffer(0, geometry.vertex_buffer().slice(..));
            rp.set_index_buffer(geometry.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
            rp.draw_indexed(0..index_count, 0, 0..1);
            drawn += 1;
        }
        drop(rp);
        log::trace!("occlusion pass: {} of {} items drawn", drawn, items.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_only_mask_disables_all_color_writes() {
        assert_eq!(color_writes(ColorWriteMask::empty()), wgpu::ColorWrites::empty());
        assert_eq!(color_writes(Material::depth_only().color_write_mask), wgpu::ColorWrites::empty());
    }

    #[test]
    fn full_mask_writes_all_channels() {
        assert_eq!(color_writes(ColorWriteMask::all()), wgpu::ColorWrites::ALL);
        assert_eq!(
            color_writes(ColorWriteMask::RED | ColorWriteMask::ALPHA),
            wgpu::ColorWrites::RED | wgpu::ColorWrites::ALPHA
        );
    }

    #[test]
    fn object_uniform_matches_wgsl_layout() {
        assert_eq!(OBJECT_UNIFORM_SIZE, 80);
    }
}
