//! Data types supplied by the tracking subsystem. The occlusion core only reads these;
//! the tracker replaces them with a fresh estimate on every update.

/// Tracker-assigned identity of an anchor. Stable for the anchor's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Identity 4x4 matrix, column-major.
pub const IDENTITY_TRANSFORM: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Polygonal mesh describing the tracked region of a plane, in anchor space (y is the plane normal).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaneBoundary {
    /// Mesh vertices (x, y, z). y is always 0 for a plane estimate.
    pub vertices: Vec<[f32; 3]>,
    /// One texture coordinate per vertex, normalized over the boundary's bounds.
    pub texture_coordinates: Vec<[f32; 2]>,
    /// Triangle list into `vertices`.
    pub triangle_indices: Vec<u32>,
    /// Outline polygon (counter-clockwise seen from +y), in the same space as `vertices`.
    pub boundary_vertices: Vec<[f32; 3]>,
}

impl PlaneBoundary {
    /// Axis-aligned rectangle of `extent` (width along x, depth along z) around `center`.
    pub fn rectangle(center: [f32; 3], extent: [f32; 2]) -> Self {
        let hx = extent[0] * 0.5;
        let hz = extent[1] * 0.5;
        Self::from_polygon(center, &[[-hx, -hz], [-hx, hz], [hx, hz], [hx, -hz]])
    }

    /// Fan-triangulates a convex polygon given as (x, z) offsets from `center`.
    /// Fewer than three points produce an empty mesh.
    pub fn from_polygon(center: [f32; 3], points: &[[f32; 2]]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }
        let boundary_vertices: Vec<[f32; 3]> = points
            .iter()
            .map(|p| [center[0] + p[0], center[1], center[2] + p[1]])
            .collect();

        let (mut min_x, mut max_x, mut min_z, mut max_z) = (f32::MAX, f32::MIN, f32::MAX, f32::MIN);
        for v in &boundary_vertices {
            min_x = min_x.min(v[0]);
            max_x = max_x.max(v[0]);
            min_z = min_z.min(v[2]);
            max_z = max_z.max(v[2]);
        }
        let span_x = (max_x - min_x).max(f32::EPSILON);
        let span_z = (max_z - min_z).max(f32::EPSILON);
        let texture_coordinates = boundary_vertices
            .iter()
            .map(|v| [(v[0] - min_x) / span_x, (v[2] - min_z) / span_z])
            .collect();

        let mut triangle_indices = Vec::with_capacity((points.len() - 2) * 3);
        for i in 1..(points.len() as u32 - 1) {
            triangle_indices.extend_from_slice(&[0, i, i + 1]);
        }

        Self {
            vertices: boundary_vertices.clone(),
            texture_coordinates,
            triangle_indices,
            boundary_vertices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangle_indices.is_empty()
    }
}

/// A planar surface as currently estimated by the tracker.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedSurface {
    pub id: SurfaceId,
    /// Anchor world transform: column-major 4x4 matrix (index [col*4+row]).
    pub transform: [f32; 16],
    /// Center of the estimated plane in anchor space.
    pub center: [f32; 3],
    /// Horizontal extent in meters: [width along x, depth along z].
    pub extent: [f32; 2],
    pub boundary: PlaneBoundary,
}

impl TrackedSurface {
    /// Rectangular surface of the given extent centered on the anchor origin.
    pub fn rectangle(id: SurfaceId, transform: [f32; 16], extent: [f32; 2]) -> Self {
        Self {
            id,
            transform,
            center: [0.0; 3],
            extent,
            boundary: PlaneBoundary::rectangle([0.0; 3], extent),
        }
    }
}

/// Anything the tracker can report. Only planes get occlusion geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum Anchor {
    Plane(TrackedSurface),
    /// Non-planar anchor (e.g. a hit-test point). Occlusion calls ignore these.
    Point { id: SurfaceId, transform: [f32; 16] },
}

impl Anchor {
    pub fn id(&self) -> SurfaceId {
        match self {
            Anchor::Plane(surface) => surface.id,
            Anchor::Point { id, .. } => *id,
        }
    }

    pub fn transform(&self) -> &[f32; 16] {
        match self {
            Anchor::Plane(surface) => &surface.transform,
            Anchor::Point { transform, .. } => transform,
        }
    }

    pub fn as_plane(&self) -> Option<&TrackedSurface> {
        match self {
            Anchor::Plane(surface) => Some(surface),
            Anchor::Point { .. } => None,
        }
    }
}

/// Tracking update delivered to the renderer, one at a time on the render thread.
#[derive(Clone, Debug)]
pub enum SurfaceEvent {
    Discovered(Anchor),
    Updated(Anchor),
    Removed(SurfaceId),
}

impl SurfaceEvent {
    pub fn surface_id(&self) -> SurfaceId {
        match self {
            SurfaceEvent::Discovered(anchor) | SurfaceEvent::Updated(anchor) => anchor.id(),
            SurfaceEvent::Removed(id) => *id,
        }
    }
}
