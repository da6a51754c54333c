//! Render backend seam.
//!
//! The frame renderer decides what to draw; a [`RenderBackend`]
//! implementation owns the GPU (or test double) that draws it. Uniform
//! structs here are `Pod` so backends can upload them byte-for-byte.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::animation::AnimatedFrame;
use crate::scene::Mesh;
use crate::shadow::CASCADE_COUNT;

/// One non-instanced draw: a mesh, its world transform, and the skinning
/// frame when the item is animated.
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    pub model_matrix: Mat4,
    pub selected: bool,
    pub joints: Option<&'a AnimatedFrame>,
}

/// Per-cascade shadow uniforms as consumed by the scene pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CascadeUniform {
    pub light_view: [f32; 16],
    pub ortho_projection: [f32; 16],
    /// Far distance of the cascade slice in view space.
    pub split_distance: f32,
    pub _pad: [f32; 3],
}

impl CascadeUniform {
    #[must_use]
    pub fn new(light_view: &Mat4, ortho_projection: &Mat4, split_distance: f32) -> Self {
        Self {
            light_view: light_view.to_cols_array(),
            ortho_projection: ortho_projection.to_cols_array(),
            split_distance,
            _pad: [0.0; 3],
        }
    }
}

/// Per-instance vertex data for instanced batches.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InstanceTransform {
    pub model: [f32; 16],
    /// 1.0 when the item is selected, 0.0 otherwise.
    pub selected: f32,
    pub _pad: [f32; 3],
}

impl InstanceTransform {
    #[must_use]
    pub fn new(model: &Mat4, selected: bool) -> Self {
        Self {
            model: model.to_cols_array(),
            selected: if selected { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }
}

/// What a concrete renderer must provide to draw one frame.
///
/// Calls arrive in pass order: `begin_shadow_pass` then draws, once per
/// cascade, then `begin_scene_pass` and its draws. `draw` and
/// `draw_instanced` apply to whichever pass was begun last.
pub trait RenderBackend {
    fn begin_shadow_pass(&mut self, cascade: usize, light_view: &Mat4, ortho_projection: &Mat4);

    fn begin_scene_pass(
        &mut self,
        view: &Mat4,
        projection: &Mat4,
        cascades: &[CascadeUniform; CASCADE_COUNT],
    );

    fn draw(&mut self, call: &DrawCall<'_>);

    fn draw_instanced(&mut self, mesh: &Mesh, instances: &[InstanceTransform]);
}
