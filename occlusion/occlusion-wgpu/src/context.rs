//! RenderContext backed by a wgpu device (or deliberately without one).

use std::sync::Arc;

use surface_api::{MeshDevice, RenderContext};

use crate::device::WgpuMeshDevice;

#[derive(Debug, Default)]
pub struct WgpuRenderContext {
    mesh_device: Option<WgpuMeshDevice>,
}

impl WgpuRenderContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { mesh_device: Some(WgpuMeshDevice::new(device, queue)) }
    }

    /// Context whose renderer has no GPU device; every create() on it yields nothing.
    pub fn without_device() -> Self {
        Self::default()
    }

    /// Requests the default adapter and a device with no surface. Blocks.
    pub fn headless() -> Result<Self, String> {
        let (device, queue) = pollster::block_on(request_device())?;
        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }

    pub fn mesh_device(&self) -> Option<&WgpuMeshDevice> {
        self.mesh_device.as_ref()
    }
}

impl RenderContext for WgpuRenderContext {
    fn device(&self) -> Option<&dyn MeshDevice> {
        self.mesh_device.as_ref().map(|d| d as &dyn MeshDevice)
    }
}

async fn request_device() -> Result<(wgpu::Device, wgpu::Queue), String> {
    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .ok_or("No adapter")?;
    log::info!("using adapter {:?}", adapter.get_info().name);
    adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await
        .map_err(|e| e.to_string())
}
