//! Frame targets: color (camera image + outlines) and depth (occluders).

use wgpu::TextureView;

pub struct FrameTargets {
    pub color: wgpu::Texture,
    pub depth: wgpu::Texture,
    width: u32,
    height: u32,
}

impl FrameTargets {
    /// Reuses `existing` when the size and formats match, otherwise allocates new targets.
    pub fn ensure_size(
        device: &wgpu::Device,
        existing: Option<Self>,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err("FrameTargets: width and height must be > 0".to_string());
        }
        if let Some(t) = existing {
            if t.width == width
                && t.height == height
                && t.color.format() == color_format
                && t.depth.format() == depth_format
            {
                return Ok(t);
            }
        }
        let make = |label: &str, format: wgpu::TextureFormat, usage: wgpu::TextureUsages| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };
        let color = make(
            "occlusion_color",
            color_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC,
        );
        let depth = make(
            "occlusion_depth",
            depth_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        Ok(Self { color, depth, width, height })
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn color_view(&self) -> TextureView { self.color.create_view(&Default::default()) }
    pub fn depth_view(&self) -> TextureView { self.depth.create_view(&Default::default()) }
}
