use std::collections::HashMap;

use slotmap::SlotMap;

use crate::scene::{
    Camera, DirectionalLight, Frustum, ItemKey, Mesh, MeshKey, SceneItem,
};

/// Scene contents: meshes, items, and the batches that group items by the
/// mesh they render with.
///
/// Items are registered against one or more meshes; the per-mesh batch maps
/// are what the renderer iterates, so draw submission never walks the full
/// item set. `changed` is set whenever geometry is added or removed and is
/// consumed by the shadow pass to skip redundant cascade rebuilds.
pub struct Scene {
    pub camera: Camera,
    pub light: DirectionalLight,
    meshes: SlotMap<MeshKey, Mesh>,
    items: SlotMap<ItemKey, SceneItem>,
    mesh_batches: HashMap<MeshKey, Vec<ItemKey>>,
    instanced_batches: HashMap<MeshKey, Vec<ItemKey>>,
    changed: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            camera: Camera::new(),
            light: DirectionalLight::default(),
            meshes: SlotMap::with_key(),
            items: SlotMap::with_key(),
            mesh_batches: HashMap::new(),
            instanced_batches: HashMap::new(),
            changed: true,
        }
    }

    /// Registers a mesh and opens its (initially empty) batch.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        let instanced = mesh.is_instanced();
        let key = self.meshes.insert(mesh);
        if instanced {
            self.instanced_batches.insert(key, Vec::new());
        } else {
            self.mesh_batches.insert(key, Vec::new());
        }
        self.changed = true;
        key
    }

    /// Spawns an item and registers it with each of the given meshes.
    /// Mesh keys that are no longer live are skipped with a warning.
    pub fn spawn(&mut self, item: SceneItem, meshes: &[MeshKey]) -> ItemKey {
        let key = self.items.insert(item);
        for &mesh_key in meshes {
            let Some(mesh) = self.meshes.get(mesh_key) else {
                log::warn!("spawn: mesh key {mesh_key:?} is stale, skipping");
                continue;
            };
            let batch = if mesh.is_instanced() {
                self.instanced_batches.entry(mesh_key).or_default()
            } else {
                self.mesh_batches.entry(mesh_key).or_default()
            };
            batch.push(key);
        }
        self.changed = true;
        key
    }

    /// Removes an item from every batch it appears in.
    pub fn despawn(&mut self, key: ItemKey) -> Option<SceneItem> {
        let item = self.items.remove(key)?;
        for batch in self
            .mesh_batches
            .values_mut()
            .chain(self.instanced_batches.values_mut())
        {
            batch.retain(|&k| k != key);
        }
        self.changed = true;
        Some(item)
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    #[inline]
    #[must_use]
    pub fn item(&self, key: ItemKey) -> Option<&SceneItem> {
        self.items.get(key)
    }

    #[inline]
    pub fn item_mut(&mut self, key: ItemKey) -> Option<&mut SceneItem> {
        self.items.get_mut(key)
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = (ItemKey, &mut SceneItem)> {
        self.items.iter_mut()
    }

    #[must_use]
    pub fn mesh_batches(&self) -> &HashMap<MeshKey, Vec<ItemKey>> {
        &self.mesh_batches
    }

    #[must_use]
    pub fn instanced_batches(&self) -> &HashMap<MeshKey, Vec<ItemKey>> {
        &self.instanced_batches
    }

    /// True when geometry changed since the last [`Scene::clear_changed`].
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Updates every batched item's `inside_frustum` flag against the given
    /// frustum. Items with `disable_culling` keep whatever flag they have.
    pub fn apply_culling(&mut self, frustum: &Frustum) {
        for batches in [&self.mesh_batches, &self.instanced_batches] {
            for (&mesh_key, item_keys) in batches {
                let Some(radius) = self.meshes.get(mesh_key).map(|m| m.bounding_radius) else {
                    continue;
                };
                for &item_key in item_keys {
                    let Some(item) = self.items.get_mut(item_key) else {
                        continue;
                    };
                    if item.disable_culling {
                        continue;
                    }
                    item.inside_frustum =
                        frustum.intersects_sphere(item.position, item.scale * radius);
                }
            }
        }
    }
}
