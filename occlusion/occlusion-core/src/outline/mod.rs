//! Outline meshes: a copy of the occlusion mesh, inflated by a fixed stroke width and
//! tucked just under the plane so it shows around the occluder's edge.

use surface_api::{MeshDevice, TrackedSurface};

use crate::config::OcclusionConfig;
use crate::material::Material;
use crate::node::{BoundingBox, MeshNode};
use crate::style::OutlineStyle;
use crate::vecmath::{self, Vec3};

/// Per-axis inflation that grows the footprint by `stroke_width` meters in x and z.
/// Extents below `min_extent` (or non-finite) are raised to it, so the result is always finite.
pub fn scale_for_surface(surface: &TrackedSurface, stroke_width: f32, min_extent: f32) -> Vec3 {
    let stroke = if stroke_width.is_finite() { vecmath::clamp(stroke_width, 0.0, f32::MAX) } else { 0.0 };
    let width = floor_extent(surface.extent[0], min_extent);
    let depth = floor_extent(surface.extent[1], min_extent);
    [1.0 + stroke / width, 1.0, 1.0 + stroke / depth]
}

fn floor_extent(extent: f32, min_extent: f32) -> f32 {
    let floor = if min_extent > 0.0 { min_extent } else { f32::EPSILON };
    if extent.is_finite() {
        vecmath::clamp(extent, floor, f32::MAX)
    } else {
        floor
    }
}

pub(crate) fn style_scale(surface: &TrackedSurface, style: &impl OutlineStyle, config: &OcclusionConfig) -> Vec3 {
    let stroke = style.width_for_surface(surface).to_meters();
    scale_for_surface(surface, stroke, config.min_extent)
}

/// Builds the outline child for `surface`. `None` if the device cannot allocate a plane mesh.
pub fn create_outline(
    surface: &TrackedSurface,
    device: &dyn MeshDevice,
    style: &impl OutlineStyle,
    config: &OcclusionConfig,
) -> Option<MeshNode> {
    let mut geometry = match device.create_plane_geometry() {
        Ok(g) => g,
        Err(e) => {
            log::debug!("outline for surface {:?} skipped: {}", surface.id, e);
            return None;
        }
    };
    geometry.as_plane_mut()?.update_from(&surface.boundary);

    let mut node = MeshNode::new(geometry, Material::constant(style.color_for_surface(surface)));
    node.scale = style_scale(surface, style, config);
    node.position = [0.0, -config.outline_offset, 0.0];
    node.bounding_box = Some(BoundingBox::from_extent(surface.extent));
    Some(node)
}

/// Re-syncs an existing outline with the surface. Returns false (leaving the node alone)
/// if its geometry is not a plane mesh.
pub(crate) fn refresh_outline(
    outline: &mut MeshNode,
    surface: &TrackedSurface,
    bounding_box: BoundingBox,
    style: &impl OutlineStyle,
    config: &OcclusionConfig,
) -> bool {
    let Some(geometry) = outline.geometry.as_plane_mut() else {
        return false;
    };
    geometry.update_from(&surface.boundary);
    outline.bounding_box = Some(bounding_box);
    outline.scale = style_scale(surface, style, config);
    true
}
