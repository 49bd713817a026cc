//! wgpu-backed plane geometry: one vertex buffer and one u32 index buffer per mesh,
//! rewritten in place while the triangulation fits and regrown when it does not.

use std::any::Any;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use surface_api::{Geometry, MeshDevice, PlaneBoundary, PlaneGeometry};

/// Vertex layout: position, normal, uv. Stride 32.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub const PLANE_VERTEX_STRIDE: u64 = std::mem::size_of::<PlaneVertex>() as u64;

const INITIAL_VERTICES: u64 = 64;
const INITIAL_INDICES: u64 = 192;

/// Packs a boundary into GPU vertices. Normals point along the plane's +y.
pub fn pack_vertices(boundary: &PlaneBoundary) -> Vec<PlaneVertex> {
    boundary
        .vertices
        .iter()
        .enumerate()
        .map(|(i, p)| PlaneVertex {
            position: *p,
            normal: [0.0, 1.0, 0.0],
            uv: boundary.texture_coordinates.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// Indices that reference a missing vertex would read out of bounds on the GPU; drop those triangles.
pub fn valid_indices(boundary: &PlaneBoundary) -> Vec<u32> {
    let count = boundary.vertices.len() as u32;
    boundary
        .triangle_indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| i < count))
        .flatten()
        .copied()
        .collect()
}

#[derive(Debug)]
pub struct WgpuPlaneGeometry {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    vertex_buf: Arc<wgpu::Buffer>,
    index_buf: Arc<wgpu::Buffer>,
    vertex_capacity: u64,
    index_capacity: u64,
    vertex_count: usize,
    index_count: u32,
}

impl WgpuPlaneGeometry {
    fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let vertex_buf = Arc::new(create_vertex_buffer(&device, INITIAL_VERTICES));
        let index_buf = Arc::new(create_index_buffer(&device, INITIAL_INDICES));
        Self {
            device,
            queue,
            vertex_buf,
            index_buf,
            vertex_capacity: INITIAL_VERTICES,
            index_capacity: INITIAL_INDICES,
            vertex_count: 0,
            index_count: 0,
        }
    }

    pub fn vertex_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.vertex_buf
    }

    pub fn index_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.index_buf
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertices: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("occlusion_plane_vertex"),
        size: vertices * PLANE_VERTEX_STRIDE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, indices: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("occlusion_plane_index"),
        size: indices * 4,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl Geometry for WgpuPlaneGeometry {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_plane(&self) -> Option<&dyn PlaneGeometry> {
        Some(self)
    }

    fn as_plane_mut(&mut self) -> Option<&mut dyn PlaneGeometry> {
        Some(self)
    }
}

impl PlaneGeometry for WgpuPlaneGeometry {
    fn update_from(&mut self, boundary: &PlaneBoundary) {
        let vertices = pack_vertices(boundary);
        let indices = valid_indices(boundary);
        if vertices.is_empty() || indices.is_empty() {
            self.vertex_count = 0;
            self.index_count = 0;
            return;
        }
        let vertex_len = vertices.len() as u64;
        let index_len = indices.len() as u64;
        if vertex_len > self.vertex_capacity {
            self.vertex_capacity = vertex_len.next_power_of_two();
            self.vertex_buf = Arc::new(create_vertex_buffer(&self.device, self.vertex_capacity));
            log::trace!("plane vertex buffer grown to {} vertices", self.vertex_capacity);
        }
        if index_len > self.index_capacity {
            self.index_capacity = index_len.next_power_of_two();
            self.index_buf = Arc::new(create_index_buffer(&self.device, self.index_capacity));
            log::trace!("plane index buffer grown to {} indices", self.index_capacity);
        }
        self.queue.write_buffer(&self.vertex_buf, 0, bytemuck::cast_slice(&vertices));
        self.queue.write_buffer(&self.index_buf, 0, bytemuck::cast_slice(&indices));
        self.vertex_count = vertices.len();
        self.index_count = indices.len() as u32;
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Hands out [`WgpuPlaneGeometry`] meshes on one device/queue.
#[derive(Debug, Clone)]
pub struct WgpuMeshDevice {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl WgpuMeshDevice {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}

impl MeshDevice for WgpuMeshDevice {
    /// Never blocks. Buffer allocation errors surface through the device's
    /// uncaptured-error handler, not through this result.
    fn create_plane_geometry(&self) -> Result<Box<dyn Geometry>, String> {
        let geometry = WgpuPlaneGeometry::new(Arc::clone(&self.device), Arc::clone(&self.queue));
        Ok(Box::new(geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_matches_pipeline_layout() {
        assert_eq!(PLANE_VERTEX_STRIDE, 32);
    }

    #[test]
    fn packs_rectangle() {
        let b = PlaneBoundary::rectangle([0.0; 3], [2.0, 1.0]);
        let v = pack_vertices(&b);
        assert_eq!(v.len(), 4);
        assert!(v.iter().all(|p| p.normal == [0.0, 1.0, 0.0]));
        assert_eq!(v[0].position, [-1.0, 0.0, -0.5]);
        assert_eq!(v[2].uv, [1.0, 1.0]);
        let bytes: &[u8] = bytemuck::cast_slice(&v);
        assert_eq!(bytes.len(), 4 * 32);
    }

    #[test]
    fn missing_texture_coordinates_default_to_zero() {
        let mut b = PlaneBoundary::rectangle([0.0; 3], [1.0, 1.0]);
        b.texture_coordinates.truncate(1);
        let v = pack_vertices(&b);
        assert_eq!(v[3].uv, [0.0, 0.0]);
    }

    #[test]
    fn out_of_range_triangles_are_dropped() {
        let mut b = PlaneBoundary::rectangle([0.0; 3], [1.0, 1.0]);
        b.triangle_indices.extend_from_slice(&[0, 1, 9]);
        b.triangle_indices.push(2);
        assert_eq!(valid_indices(&b), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn create_returns_without_waiting_on_the_device() {
        // Needs an adapter; machines without one have nothing to check here.
        let Ok(ctx) = crate::WgpuRenderContext::headless() else {
            return;
        };
        let Some(mesh_device) = ctx.mesh_device() else {
            return;
        };
        let mut geometry = mesh_device.create_plane_geometry().unwrap();
        let plane = geometry.as_plane_mut().unwrap();
        assert_eq!(plane.vertex_count(), 0);
        plane.update_from(&PlaneBoundary::from_polygon([0.0; 3], &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.5, 2.0], [0.0, 1.0]]));
        assert_eq!(plane.vertex_count(), 5);
        assert_eq!(plane.index_count(), 9);
    }
}
