//! Shared surface-tracking API for the occlusion crates.
//! Defines the tracked plane types and tracking events the host delivers, and the
//! MeshDevice/RenderContext traits a rendering backend implements.

mod backend;
mod surface;

pub use backend::{Geometry, MeshDevice, PlaneGeometry, RenderContext};
pub use surface::{Anchor, PlaneBoundary, SurfaceEvent, SurfaceId, TrackedSurface, IDENTITY_TRANSFORM};
