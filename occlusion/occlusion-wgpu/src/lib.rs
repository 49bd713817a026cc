//! wgpu backend for the occlusion core.
//!
//! [`WgpuRenderContext`] is what the host hands to `OcclusionManager::create`;
//! [`OcclusionRenderer`] draws a `SurfaceScene` into a color + depth target.

pub mod context;
pub mod device;
pub mod pass;
pub mod resources;

use std::sync::Arc;

use occlusion_core::{OutlineStyle, SurfaceScene};

pub use context::WgpuRenderContext;
pub use device::{PlaneVertex, WgpuMeshDevice, WgpuPlaneGeometry};
pub use pass::{OcclusionPass, OcclusionPassConfig};
pub use resources::FrameTargets;

pub struct OcclusionRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pass: OcclusionPass,
    frame: Option<FrameTargets>,
}

impl OcclusionRenderer {
    pub fn new(mesh_device: &WgpuMeshDevice) -> Result<Self, String> {
        Self::new_with_config(mesh_device, OcclusionPassConfig::default())
    }

    pub fn new_with_config(mesh_device: &WgpuMeshDevice, config: OcclusionPassConfig) -> Result<Self, String> {
        let device = Arc::clone(mesh_device.device());
        let queue = Arc::clone(mesh_device.queue());
        let pass = OcclusionPass::new(&device, config)?;
        Ok(Self { device, queue, pass, frame: None })
    }

    pub fn device(&self) -> &wgpu::Device { &self.device }
    pub fn queue(&self) -> &wgpu::Queue { &self.queue }

    pub fn ensure_frame_targets(&mut self, width: u32, height: u32) -> Result<&FrameTargets, String> {
        let config = self.pass.config();
        let existing = self.frame.take();
        let targets = FrameTargets::ensure_size(&self.device, existing, width, height, config.color_format, config.depth_format)?;
        Ok(self.frame.insert(targets))
    }

    pub fn frame_targets(&self) -> Option<&FrameTargets> {
        self.frame.as_ref()
    }

    /// Encode the scene's occluders and outlines into the given encoder, using this renderer's frame targets.
    pub fn encode_frame<S: OutlineStyle>(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        width: u32,
        height: u32,
        scene: &SurfaceScene<S>,
        view_proj: &[f32; 16],
    ) -> Result<(), String> {
        self.ensure_frame_targets(width, height)?;
        let frame = self.frame.as_ref().ok_or("encode_frame: no frame targets")?;
        let items = scene.draw_list(view_proj);
        self.pass.encode(
            encoder,
            &self.device,
            &self.queue,
            &frame.color_view(),
            &frame.depth_view(),
            &items,
            view_proj,
        )
    }

    /// Encode into a caller-owned color/depth pair (e.g. the camera image and a swapchain depth buffer).
    pub fn encode_to<S: OutlineStyle>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        scene: &SurfaceScene<S>,
        view_proj: &[f32; 16],
    ) -> Result<(), String> {
        let items = scene.draw_list(view_proj);
        self.pass.encode(encoder, &self.device, &self.queue, color_view, depth_view, &items, view_proj)
    }

    /// Encode and submit one frame into the renderer's own targets.
    pub fn render_frame<S: OutlineStyle>(
        &mut self,
        width: u32,
        height: u32,
        scene: &SurfaceScene<S>,
        view_proj: &[f32; 16],
    ) -> Result<(), String> {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("occlusion_frame") });
        self.encode_frame(&mut encoder, width, height, scene, view_proj)?;
        self.queue.submit([encoder.finish()]);
        Ok(())
    }
}
