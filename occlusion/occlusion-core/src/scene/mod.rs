//! Surface scene: the per-surface node map a renderer delegate keeps, driven by tracking events.

use std::collections::BTreeMap;

use surface_api::{RenderContext, SurfaceEvent, SurfaceId};

use crate::node::{MeshNode, OcclusionNode};
use crate::occlusion::OcclusionManager;
use crate::style::{OrientationStyle, OutlineStyle};
use crate::vecmath::{self, Mat4, Vec3};

/// What an event did to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    Added,
    Updated,
    Removed,
    /// Event could not produce or change a node: non-plane anchor, no device, unknown id,
    /// or a stored node whose geometry cannot take plane updates.
    Skipped,
}

struct SurfaceEntry {
    transform: Mat4,
    /// Plane center in anchor space; the mesh is built around it.
    center: Vec3,
    node: OcclusionNode,
}

/// One mesh ready to draw, in the order it should be drawn.
#[derive(Debug)]
pub struct DrawItem<'a> {
    pub surface_id: SurfaceId,
    pub mesh: &'a MeshNode,
    pub world_transform: Mat4,
    pub is_outline: bool,
}

pub struct SurfaceScene<S = OrientationStyle> {
    manager: OcclusionManager<S>,
    entries: BTreeMap<SurfaceId, SurfaceEntry>,
}

impl Default for SurfaceScene<OrientationStyle> {
    fn default() -> Self {
        Self::new(OcclusionManager::default())
    }
}

impl<S: OutlineStyle> SurfaceScene<S> {
    pub fn new(manager: OcclusionManager<S>) -> Self {
        Self { manager, entries: BTreeMap::new() }
    }

    pub fn manager(&self) -> &OcclusionManager<S> {
        &self.manager
    }

    pub fn apply(&mut self, context: &dyn RenderContext, event: &SurfaceEvent) -> SceneChange {
        match event {
            SurfaceEvent::Discovered(anchor) | SurfaceEvent::Updated(anchor) => {
                let Some(surface) = anchor.as_plane() else {
                    return SceneChange::Skipped;
                };
                if let Some(entry) = self.entries.get_mut(&surface.id) {
                    if !self.manager.update(&mut entry.node, anchor) {
                        return SceneChange::Skipped;
                    }
                    entry.transform = surface.transform;
                    entry.center = surface.center;
                    return SceneChange::Updated;
                }
                // A surface skipped earlier (e.g. no device yet) gets another chance on each update.
                let wants_outline = self.manager.config().outline_enabled;
                match self.manager.create(context, anchor, wants_outline) {
                    Some(node) => {
                        log::info!("surface {:?} added (extent {:?})", surface.id, surface.extent);
                        self.entries.insert(surface.id, SurfaceEntry { transform: surface.transform, center: surface.center, node });
                        SceneChange::Added
                    }
                    None => SceneChange::Skipped,
                }
            }
            SurfaceEvent::Removed(id) => match self.entries.remove(id) {
                Some(_) => {
                    log::info!("surface {:?} removed", id);
                    SceneChange::Removed
                }
                None => SceneChange::Skipped,
            },
        }
    }

    /// Drops every node, as after a tracking reset that discards existing anchors.
    pub fn reset(&mut self) {
        if !self.entries.is_empty() {
            log::info!("scene reset: dropping {} surface(s)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn node(&self, id: SurfaceId) -> Option<&OcclusionNode> {
        self.entries.get(&id).map(|e| &e.node)
    }

    pub fn transform(&self, id: SurfaceId) -> Option<&Mat4> {
        self.entries.get(&id).map(|e| &e.transform)
    }

    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visible meshes sorted by rendering order (occluders first), culled against `view_proj`.
    /// Node bounds are origin-centered, so they are moved onto the plane center before the test.
    pub fn draw_list(&self, view_proj: &Mat4) -> Vec<DrawItem<'_>> {
        let mut items = Vec::with_capacity(self.entries.len() * 2);
        for (&surface_id, entry) in &self.entries {
            let to_center = vecmath::from_translation_scale(entry.center, [1.0; 3]);
            let node_world = vecmath::mul(&entry.transform, &entry.node.mesh.local_transform());
            push_visible(&mut items, surface_id, &entry.node.mesh, node_world, &to_center, view_proj, false);
            if let Some(outline) = entry.node.outline.as_ref() {
                let outline_world = vecmath::mul(&node_world, &outline.local_transform());
                push_visible(&mut items, surface_id, outline, outline_world, &to_center, view_proj, true);
            }
        }
        items.sort_by_key(|item| item.mesh.rendering_order);
        items
    }
}

fn push_visible<'a>(
    items: &mut Vec<DrawItem<'a>>,
    surface_id: SurfaceId,
    mesh: &'a MeshNode,
    world_transform: Mat4,
    to_center: &Mat4,
    view_proj: &Mat4,
    is_outline: bool,
) {
    if let Some(bounds) = mesh.bounding_box {
        let clip_from_bounds = vecmath::mul(&vecmath::mul(view_proj, &world_transform), to_center);
        if bounds.is_outside_clip(&clip_from_bounds) {
            return;
        }
    }
    items.push(DrawItem { surface_id, mesh, world_transform, is_outline });
}
