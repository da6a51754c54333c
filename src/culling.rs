use glam::Mat4;

use crate::scene::{Frustum, Scene};

/// Keeps a frustum extracted from the current projection×view matrix and
/// flags scene items that fall outside it.
///
/// Runs once per frame before draw submission; the renderer then skips any
/// batched item whose `inside_frustum` flag is false.
#[derive(Debug, Default)]
pub struct FrustumCullingFilter {
    frustum: Frustum,
}

impl FrustumCullingFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-extracts the frustum planes from the combined matrix.
    pub fn update_frustum(&mut self, projection: Mat4, view: Mat4) {
        self.frustum = Frustum::from_matrix(projection * view);
    }

    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Tests every batched item's bounding sphere against the frustum.
    ///
    /// The sphere is the mesh bounding radius scaled by the item's uniform
    /// scale, centred on the item position. Items with `disable_culling`
    /// are left untouched.
    pub fn filter(&self, scene: &mut Scene) {
        scene.apply_culling(&self.frustum);
    }
}
