//! Occlusion manager: builds and refreshes the depth-only mesh for each tracked plane.
//!
//! Every failure here is silent. Tracking state is provisional, so a surface that cannot
//! get geometry this frame simply has no occlusion until a later update succeeds.

use surface_api::{Anchor, RenderContext, TrackedSurface};

use crate::config::OcclusionConfig;
use crate::material::{Material, Rgba};
use crate::node::{BoundingBox, MeshNode, OcclusionNode};
use crate::outline;
use crate::style::{Length, OrientationStyle, OutlineStyle, StyleFn};
use crate::vecmath::Vec3;

pub struct OcclusionManager<S = OrientationStyle> {
    config: OcclusionConfig,
    style: S,
}

impl Default for OcclusionManager<OrientationStyle> {
    fn default() -> Self {
        Self::new(OcclusionConfig::default(), OrientationStyle::default())
    }
}

impl<C, W> OcclusionManager<StyleFn<C, W>>
where
    C: Fn(&TrackedSurface) -> Rgba,
    W: Fn(&TrackedSurface) -> Length,
{
    /// Manager whose outline color and stroke width come from two callbacks.
    pub fn with_callbacks(config: OcclusionConfig, color: C, width: W) -> Self {
        Self::new(config, StyleFn::new(color, width))
    }
}

impl<S: OutlineStyle> OcclusionManager<S> {
    pub fn new(config: OcclusionConfig, style: S) -> Self {
        Self { config, style }
    }

    pub fn config(&self) -> &OcclusionConfig {
        &self.config
    }

    pub fn style(&self) -> &S {
        &self.style
    }

    /// Outline inflation for `surface` under this manager's style and config.
    pub fn outline_scale(&self, surface: &TrackedSurface) -> Vec3 {
        outline::style_scale(surface, &self.style, &self.config)
    }

    /// Builds the occlusion node for a newly discovered anchor.
    /// `None` for non-plane anchors, a context without a device, or a failed allocation.
    pub fn create(&self, context: &dyn RenderContext, anchor: &Anchor, wants_outline: bool) -> Option<OcclusionNode> {
        let Some(surface) = anchor.as_plane() else {
            log::debug!("anchor {:?} is not a plane; no occlusion node", anchor.id());
            return None;
        };
        let Some(device) = context.device() else {
            log::debug!("no mesh device; surface {:?} left unoccluded", surface.id);
            return None;
        };
        let mut geometry = match device.create_plane_geometry() {
            Ok(g) => g,
            Err(e) => {
                log::debug!("plane geometry allocation failed for surface {:?}: {}", surface.id, e);
                return None;
            }
        };
        let Some(plane) = geometry.as_plane_mut() else {
            log::debug!("device returned a non-plane geometry for surface {:?}", surface.id);
            return None;
        };
        plane.update_from(&surface.boundary);

        let mut mesh = MeshNode::new(geometry, Material::depth_only());
        mesh.rendering_order = self.config.occlusion_rendering_order;
        mesh.bounding_box = Some(BoundingBox::from_extent(surface.extent));

        let outline = if wants_outline {
            outline::create_outline(surface, device, &self.style, &self.config)
        } else {
            None
        };

        log::trace!(
            "occlusion node for surface {:?}: extent {:?}, outline {}",
            surface.id,
            surface.extent,
            outline.is_some()
        );
        Some(OcclusionNode { surface_id: surface.id, mesh, outline })
    }

    /// Refreshes geometry, bounds and outline scale from the anchor's latest estimate.
    /// Returns `false` and leaves the node untouched if the anchor is not a plane,
    /// belongs to another surface, or the node's geometry is not a plane mesh.
    pub fn update(&self, node: &mut OcclusionNode, anchor: &Anchor) -> bool {
        let Some(surface) = anchor.as_plane() else {
            return false;
        };
        if surface.id != node.surface_id {
            log::debug!("update for surface {:?} delivered to node of {:?}; ignored", surface.id, node.surface_id);
            return false;
        }
        let Some(geometry) = node.mesh.geometry.as_plane_mut() else {
            return false;
        };
        geometry.update_from(&surface.boundary);
        let bounding_box = BoundingBox::from_extent(surface.extent);
        node.mesh.bounding_box = Some(bounding_box);

        if let Some(outline_node) = node.outline.as_mut() {
            if !outline::refresh_outline(outline_node, surface, bounding_box, &self.style, &self.config) {
                log::debug!("outline of surface {:?} has non-plane geometry; not refreshed", surface.id);
            }
        }
        log::trace!("surface {:?} updated: extent {:?}", surface.id, surface.extent);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::LightingModel;
    use crate::testing::{mock_updates, Allocation, ForeignGeometry, MockContext, MockDevice};
    use surface_api::{SurfaceId, IDENTITY_TRANSFORM};

    fn plane(extent: [f32; 2]) -> Anchor {
        Anchor::Plane(TrackedSurface::rectangle(SurfaceId(7), IDENTITY_TRANSFORM, extent))
    }

    fn context() -> MockContext {
        MockContext::with_device(MockDevice::default())
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn create_builds_depth_only_node() {
        let manager = OcclusionManager::default();
        let node = manager.create(&context(), &plane([1.0, 1.0]), false).unwrap();
        assert_eq!(node.surface_id, SurfaceId(7));
        assert!(!node.mesh.material.writes_color());
        assert_eq!(node.mesh.rendering_order, -1);
        assert!(node.mesh.rendering_order < 0);
        assert_eq!(node.mesh.plane_geometry().unwrap().vertex_count(), 4);
        assert_eq!(mock_updates(&node.mesh), 1);
        assert!(node.outline.is_none());
    }

    #[test]
    fn create_with_outline() {
        let manager = OcclusionManager::default();
        let node = manager.create(&context(), &plane([1.0, 1.0]), true).unwrap();
        let outline = node.outline.as_ref().unwrap();
        assert_eq!(outline.material.lighting_model, LightingModel::Constant);
        assert_eq!(outline.rendering_order, 0);
        assert_eq!(mock_updates(outline), 1);
    }

    #[test]
    fn create_without_device_returns_none() {
        let manager = OcclusionManager::default();
        assert!(manager.create(&MockContext::default(), &plane([1.0, 1.0]), true).is_none());
    }

    #[test]
    fn create_ignores_non_plane_anchor() {
        let manager = OcclusionManager::default();
        let point = Anchor::Point { id: SurfaceId(1), transform: IDENTITY_TRANSFORM };
        let ctx = context();
        assert!(manager.create(&ctx, &point, true).is_none());
        assert_eq!(ctx.device.as_ref().unwrap().allocated.get(), 0);
    }

    #[test]
    fn create_fails_on_allocation_error() {
        let manager = OcclusionManager::default();
        assert!(manager.create(&MockContext::with_device(MockDevice::failing()), &plane([1.0, 1.0]), true).is_none());
        let foreign = MockDevice { allocation: Allocation::Foreign, ..MockDevice::default() };
        assert!(manager.create(&MockContext::with_device(foreign), &plane([1.0, 1.0]), false).is_none());
    }

    #[test]
    fn outline_failure_still_yields_occluder() {
        let manager = OcclusionManager::default();
        let ctx = MockContext::with_device(MockDevice::failing_after(1));
        let node = manager.create(&ctx, &plane([1.0, 1.0]), true).unwrap();
        assert!(node.outline.is_none());
    }

    #[test]
    fn update_recomputes_bounds_and_outline_scale() {
        let manager = OcclusionManager::default();
        let ctx = context();
        let mut node = manager.create(&ctx, &plane([1.0, 1.0]), true).unwrap();

        let b = node.mesh.bounding_box.unwrap();
        assert_eq!(b.min, [-0.5, -0.5, -0.5]);
        assert_eq!(b.max, [0.5, 0.5, 0.5]);
        let s = node.outline.as_ref().unwrap().scale;
        assert!(approx(s[0], 1.005) && s[1] == 1.0 && approx(s[2], 1.005));

        assert!(manager.update(&mut node, &plane([2.0, 1.0])));
        let b = node.mesh.bounding_box.unwrap();
        assert_eq!(b.min[0], -1.0);
        assert_eq!(b.max[0], 1.0);
        let outline = node.outline.as_ref().unwrap();
        assert_eq!(outline.bounding_box, Some(b));
        assert!(approx(outline.scale[0], 1.0025));
        assert!(approx(outline.scale[2], 1.005));
        assert_eq!(outline.position, [0.0, -0.002, 0.0]);
        assert_eq!(mock_updates(&node.mesh), 2);
        assert_eq!(mock_updates(outline), 2);

        let Anchor::Plane(surface) = plane([2.0, 1.0]) else {
            unreachable!()
        };
        assert_eq!(manager.outline_scale(&surface), outline.scale);
        let wide = TrackedSurface::rectangle(SurfaceId(7), IDENTITY_TRANSFORM, [0.0, 5.0]);
        let s = manager.outline_scale(&wide);
        assert!(approx(s[0], 1.0 + 0.005 / 0.001));
        assert!(approx(s[2], 1.001) && s[1] == 1.0);
    }

    #[test]
    fn bounds_track_latest_extent() {
        let manager = OcclusionManager::default();
        let mut node = manager.create(&context(), &plane([1.0, 1.0]), false).unwrap();
        for extent in [[0.3, 0.7], [4.0, 0.2], [1.5, 1.5]] {
            manager.update(&mut node, &plane(extent));
            let b = node.mesh.bounding_box.unwrap();
            assert_eq!(b.min, [-extent[0] / 2.0, -extent[1] / 2.0, -extent[1] / 2.0]);
            assert_eq!(b.max, [extent[0] / 2.0, extent[1] / 2.0, extent[1] / 2.0]);
        }
    }

    #[test]
    fn update_on_foreign_geometry_is_noop() {
        let manager = OcclusionManager::default();
        let mut node = OcclusionNode {
            surface_id: SurfaceId(7),
            mesh: MeshNode::new(Box::new(ForeignGeometry), Material::default()),
            outline: None,
        };
        assert!(!manager.update(&mut node, &plane([2.0, 1.0])));
        assert!(node.mesh.bounding_box.is_none());
        assert_eq!(node.mesh.scale, [1.0; 3]);
        assert_eq!(node.mesh.material, Material::default());
        assert!(node.mesh.geometry.as_any().downcast_ref::<ForeignGeometry>().is_some());
    }

    #[test]
    fn update_ignores_non_plane_and_other_surface() {
        let manager = OcclusionManager::default();
        let mut node = manager.create(&context(), &plane([1.0, 1.0]), true).unwrap();
        let point = Anchor::Point { id: SurfaceId(7), transform: IDENTITY_TRANSFORM };
        assert!(!manager.update(&mut node, &point));
        let other = Anchor::Plane(TrackedSurface::rectangle(SurfaceId(8), IDENTITY_TRANSFORM, [3.0, 3.0]));
        assert!(!manager.update(&mut node, &other));
        assert_eq!(node.mesh.bounding_box, Some(BoundingBox::from_extent([1.0, 1.0])));
        assert_eq!(mock_updates(&node.mesh), 1);
    }

    #[test]
    fn callbacks_drive_outline() {
        let manager = OcclusionManager::with_callbacks(
            OcclusionConfig::default(),
            |_| Rgba::new(1.0, 0.5, 0.0, 1.0),
            |_| Length::meters(0.1),
        );
        let node = manager.create(&context(), &plane([1.0, 2.0]), true).unwrap();
        let outline = node.outline.unwrap();
        assert_eq!(outline.material.diffuse, Rgba::new(1.0, 0.5, 0.0, 1.0));
        assert!(approx(outline.scale[0], 1.1));
        assert!(approx(outline.scale[2], 1.05));
    }
}
