//! Scene nodes produced for tracked surfaces.

use surface_api::{Geometry, PlaneGeometry, SurfaceId};

use crate::material::Material;
use crate::vecmath::{self, Mat4, Vec2, Vec3};

/// Axis-aligned box in node-local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Box centered on the node origin spanning a plane's [width, depth] extent.
    /// The vertical half-size pairs with the depth so the box never collapses to zero height.
    pub fn from_extent(extent: Vec2) -> Self {
        let radius = vecmath::scale3(vecmath::from_xz(extent, extent[1]), 0.5);
        Self { min: vecmath::neg3(radius), max: radius }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }

    /// True when every corner lies outside the same clip plane (wgpu clip volume, z in [0, w]).
    pub fn is_outside_clip(&self, clip_from_local: &Mat4) -> bool {
        let clip: Vec<[f32; 4]> = self
            .corners()
            .iter()
            .map(|c| vecmath::transform_point(clip_from_local, *c))
            .collect();
        let planes: [fn(&[f32; 4]) -> bool; 6] = [
            |p| p[0] < -p[3],
            |p| p[0] > p[3],
            |p| p[1] < -p[3],
            |p| p[1] > p[3],
            |p| p[2] < 0.0,
            |p| p[2] > p[3],
        ];
        planes.iter().any(|outside| clip.iter().all(|p| outside(p)))
    }
}

/// One drawable mesh: geometry, material and local placement.
#[derive(Debug)]
pub struct MeshNode {
    pub geometry: Box<dyn Geometry>,
    pub material: Material,
    /// Lower values draw earlier.
    pub rendering_order: i32,
    pub position: Vec3,
    pub scale: Vec3,
    /// Set explicitly on every update; the renderer does not derive bounds from dynamic geometry.
    pub bounding_box: Option<BoundingBox>,
}

impl MeshNode {
    pub fn new(geometry: Box<dyn Geometry>, material: Material) -> Self {
        Self {
            geometry,
            material,
            rendering_order: 0,
            position: [0.0; 3],
            scale: [1.0; 3],
            bounding_box: None,
        }
    }

    pub fn plane_geometry(&self) -> Option<&dyn PlaneGeometry> {
        self.geometry.as_plane()
    }

    /// Parent-from-local transform (translation * scale).
    pub fn local_transform(&self) -> Mat4 {
        vecmath::from_translation_scale(self.position, self.scale)
    }
}

/// Occlusion mesh for one surface, with its optional outline child.
#[derive(Debug)]
pub struct OcclusionNode {
    pub surface_id: SurfaceId,
    pub mesh: MeshNode,
    /// Outline drawn under the occlusion mesh; lives and dies with this node.
    pub outline: Option<MeshNode>,
}

impl OcclusionNode {
    pub fn has_outline(&self) -> bool {
        self.outline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vecmath::IDENTITY;

    #[test]
    fn box_from_extent_is_centered() {
        let b = BoundingBox::from_extent([1.0, 1.0]);
        assert_eq!(b.min, [-0.5, -0.5, -0.5]);
        assert_eq!(b.max, [0.5, 0.5, 0.5]);

        let wide = BoundingBox::from_extent([2.0, 1.0]);
        assert_eq!(wide.min[0], -1.0);
        assert_eq!(wide.max[0], 1.0);
        assert_eq!(wide.max[2], 0.5);
    }

    #[test]
    fn culling_against_identity_clip() {
        let b = BoundingBox::from_extent([0.5, 0.5]);
        // Push z into [0, 1] so the box is inside the depth range.
        let inside = vecmath::from_translation_scale([0.0, 0.0, 0.5], [1.0; 3]);
        assert!(!b.is_outside_clip(&inside));

        let far_right = vecmath::from_translation_scale([5.0, 0.0, 0.5], [1.0; 3]);
        assert!(b.is_outside_clip(&far_right));

        let behind = vecmath::from_translation_scale([0.0, 0.0, -5.0], [1.0; 3]);
        assert!(b.is_outside_clip(&behind));

        // Straddling an edge is still visible.
        let straddle = vecmath::from_translation_scale([1.0, 0.0, 0.5], [1.0; 3]);
        assert!(!b.is_outside_clip(&straddle));
        assert!(!BoundingBox::from_extent([4.0, 1.0]).is_outside_clip(&IDENTITY));
    }
}
