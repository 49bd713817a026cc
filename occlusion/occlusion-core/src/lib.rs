//! Occlusion core: depth-only occlusion meshes and outlines for tracked planar surfaces.
//!
//! The host forwards tracking events (discovered / updated / removed) to an
//! [`OcclusionManager`] directly, or through a [`SurfaceScene`] that keeps the node map.
//! GPU work stays behind the `surface_api::MeshDevice` trait.

pub mod config;
pub mod material;
pub mod node;
pub mod occlusion;
pub mod outline;
pub mod scene;
pub mod style;
pub mod vecmath;

#[cfg(test)]
mod testing;

pub use config::OcclusionConfig;
pub use material::{ColorWriteMask, LightingModel, Material, Rgba};
pub use node::{BoundingBox, MeshNode, OcclusionNode};
pub use occlusion::OcclusionManager;
pub use outline::{create_outline, scale_for_surface};
pub use scene::{DrawItem, SceneChange, SurfaceScene};
pub use style::{Length, LengthUnit, OrientationStyle, OutlineStyle, StyleFn};
