//! In-memory MeshDevice / RenderContext for unit tests.

use std::any::Any;
use std::cell::Cell;

use surface_api::{Geometry, MeshDevice, PlaneBoundary, PlaneGeometry, RenderContext};

#[derive(Debug, Default)]
pub struct MockPlaneGeometry {
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub updates: usize,
}

impl Geometry for MockPlaneGeometry {
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

impl PlaneGeometry for MockPlaneGeometry {
    fn update_from(&mut self, boundary: &PlaneBoundary) {
        self.vertices = boundary.vertices.clone();
        self.indices = boundary.triangle_indices.clone();
        self.updates += 1;
    }
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
    fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// A geometry kind the occlusion core does not manage (e.g. a loaded model).
#[derive(Debug, Default, PartialEq)]
pub struct ForeignGeometry;

impl Geometry for ForeignGeometry {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Allocation {
    #[default]
    Plane,
    Foreign,
    Fail,
}

#[derive(Debug, Default)]
pub struct MockDevice {
    pub allocation: Allocation,
    /// Fail every allocation after this many succeeded.
    pub fail_after: Option<usize>,
    pub allocated: Cell<usize>,
}

impl MockDevice {
    pub fn failing() -> Self {
        Self { allocation: Allocation::Fail, ..Self::default() }
    }

    pub fn failing_after(count: usize) -> Self {
        Self { fail_after: Some(count), ..Self::default() }
    }
}

impl MeshDevice for MockDevice {
    fn create_plane_geometry(&self) -> Result<Box<dyn Geometry>, String> {
        if self.fail_after.is_some_and(|n| self.allocated.get() >= n) {
            return Err("mock device exhausted".to_string());
        }
        let geometry: Box<dyn Geometry> = match self.allocation {
            Allocation::Plane => Box::new(MockPlaneGeometry::default()),
            Allocation::Foreign => Box::new(ForeignGeometry),
            Allocation::Fail => return Err("mock allocation failure".to_string()),
        };
        self.allocated.set(self.allocated.get() + 1);
        Ok(geometry)
    }
}

#[derive(Debug, Default)]
pub struct MockContext {
    pub device: Option<MockDevice>,
}

impl MockContext {
    pub fn with_device(device: MockDevice) -> Self {
        Self { device: Some(device) }
    }
}

impl RenderContext for MockContext {
    fn device(&self) -> Option<&dyn MeshDevice> {
        self.device.as_ref().map(|d| d as &dyn MeshDevice)
    }
}

pub fn mock_updates(node: &crate::node::MeshNode) -> usize {
    node.geometry
        .as_any()
        .downcast_ref::<MockPlaneGeometry>()
        .map(|g| g.updates)
        .unwrap_or(0)
}
