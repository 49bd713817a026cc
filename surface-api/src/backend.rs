//! Traits a rendering backend implements so the occlusion core can allocate and refresh
//! plane meshes without knowing the GPU API.

use std::any::Any;
use std::fmt::Debug;

use crate::PlaneBoundary;

/// Geometry attached to a scene node. Backends may hand out kinds the occlusion core
/// does not manage; those report `None` from [`Geometry::as_plane_mut`].
pub trait Geometry: Debug {
    /// Downcast hook for the backend that created this geometry (e.g. to reach GPU buffers).
    fn as_any(&self) -> &dyn Any;

    fn as_plane(&self) -> Option<&dyn PlaneGeometry> {
        None
    }

    fn as_plane_mut(&mut self) -> Option<&mut dyn PlaneGeometry> {
        None
    }
}

/// Dynamically updatable mesh that mirrors a [`PlaneBoundary`].
pub trait PlaneGeometry: Debug {
    /// Replace vertex/index data with the boundary's current triangulation.
    fn update_from(&mut self, boundary: &PlaneBoundary);
    fn vertex_count(&self) -> usize;
    fn index_count(&self) -> u32;
}

/// GPU device handle as seen by the occlusion core: it only allocates plane geometries.
pub trait MeshDevice: Debug {
    fn create_plane_geometry(&self) -> Result<Box<dyn Geometry>, String>;
}

/// Renderer-side context passed with tracking callbacks. The device may be absent
/// (e.g. before the GPU is ready, or on a headless host).
pub trait RenderContext {
    fn device(&self) -> Option<&dyn MeshDevice>;
}
