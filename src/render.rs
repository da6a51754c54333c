//! Frame orchestration: culling, cascade updates, and draw submission.

use glam::Mat4;

use crate::backend::{CascadeUniform, DrawCall, InstanceTransform, RenderBackend};
use crate::culling::FrustumCullingFilter;
use crate::scene::{Camera, Scene};
use crate::shadow::{CASCADE_COUNT, CascadeSet};

/// Renders one frame of a scene through a [`RenderBackend`].
///
/// Per frame: the frustum is re-extracted and culling applied, the shadow
/// cascades follow the camera, and the shadow maps are re-rendered only
/// when the scene reports a change ([`Scene::mark_changed`] covers camera
/// and light movement too). The scene pass always runs.
pub struct FrameRenderer {
    culling: FrustumCullingFilter,
    cascades: CascadeSet,
    aspect: f32,
}

impl FrameRenderer {
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            culling: FrustumCullingFilter::new(),
            cascades: CascadeSet::new(),
            aspect,
        }
    }

    /// Call on window resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    #[must_use]
    pub fn cascades(&self) -> &CascadeSet {
        &self.cascades
    }

    pub fn render(&mut self, scene: &mut Scene, backend: &mut impl RenderBackend) {
        let projection = Camera::projection_matrix(self.aspect);
        let view = *scene.camera.view_matrix();

        self.culling.update_frustum(projection, view);
        self.culling.filter(scene);

        self.cascades
            .update(view, self.aspect, scene.light.direction);
        if scene.changed() {
            self.render_shadow_maps(scene, backend);
            scene.clear_changed();
        }

        self.render_scene_pass(scene, &view, &projection, backend);
    }

    fn render_shadow_maps(&self, scene: &Scene, backend: &mut impl RenderBackend) {
        for (index, cascade) in self.cascades.cascades().iter().enumerate() {
            backend.begin_shadow_pass(index, cascade.light_view(), cascade.ortho_proj());
            submit_draws(scene, backend);
        }
    }

    fn render_scene_pass(
        &self,
        scene: &Scene,
        view: &Mat4,
        projection: &Mat4,
        backend: &mut impl RenderBackend,
    ) {
        let splits = self.cascades.split_distances();
        let mut uniforms = [CascadeUniform::new(&Mat4::IDENTITY, &Mat4::IDENTITY, 0.0);
            CASCADE_COUNT];
        for (uniform, (cascade, split)) in uniforms
            .iter_mut()
            .zip(self.cascades.cascades().iter().zip(splits))
        {
            *uniform = CascadeUniform::new(cascade.light_view(), cascade.ortho_proj(), split);
        }

        backend.begin_scene_pass(view, projection, &uniforms);
        submit_draws(scene, backend);
    }
}

/// Submits every visible item of both batch kinds to the current pass.
fn submit_draws(scene: &Scene, backend: &mut impl RenderBackend) {
    for (&mesh_key, item_keys) in scene.mesh_batches() {
        let Some(mesh) = scene.mesh(mesh_key) else {
            continue;
        };
        for &item_key in item_keys {
            let Some(item) = scene.item(item_key) else {
                continue;
            };
            if !item.inside_frustum {
                continue;
            }
            let joints = item
                .animation
                .as_ref()
                .map(|state| state.current_animation().current_frame());
            backend.draw(&DrawCall {
                mesh,
                model_matrix: item.model_matrix(),
                selected: item.selected,
                joints,
            });
        }
    }

    for (&mesh_key, item_keys) in scene.instanced_batches() {
        let Some(mesh) = scene.mesh(mesh_key) else {
            continue;
        };
        let instances: Vec<InstanceTransform> = item_keys
            .iter()
            .filter_map(|&key| scene.item(key))
            .filter(|item| item.inside_frustum)
            .map(|item| InstanceTransform::new(&item.model_matrix(), item.selected))
            .collect();
        if !instances.is_empty() {
            backend.draw_instanced(mesh, &instances);
        }
    }
}
