//! Occlusion configuration: render ordering, outline placement, degenerate-extent floor.

/// Occlusion manager and scene configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct OcclusionConfig {
    /// Rendering order of occlusion meshes. Lower draws first; regular content uses 0.
    pub occlusion_rendering_order: i32,
    /// Distance in meters the outline sits below the occlusion mesh (along local -y).
    pub outline_offset: f32,
    /// Smallest extent (meters) used when computing outline inflation.
    pub min_extent: f32,
    /// Whether the scene requests outlines for newly discovered surfaces.
    pub outline_enabled: bool,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            occlusion_rendering_order: -1,
            outline_offset: 0.002,
            min_extent: 0.001,
            outline_enabled: true,
        }
    }
}
