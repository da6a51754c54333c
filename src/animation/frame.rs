use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Maximum joint count supported by the skinning uniform.
pub const MAX_JOINTS: usize = 300;

/// One animation frame: the final skinning matrix for every bone slot.
///
/// Slot `i` always holds the transform that maps bone-`i`-space mesh vertices
/// into model space for this frame, bind-pose inversion already combined. A
/// vertex skinned by bone `i` with weight `w` contributes
/// `w * (joint_matrices[i] * vertex_local_pos)`. Unset slots stay identity.
#[derive(Debug, Clone)]
pub struct AnimatedFrame {
    joint_matrices: Box<[Mat4; MAX_JOINTS]>,
}

impl Default for AnimatedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimatedFrame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            joint_matrices: Box::new([Mat4::IDENTITY; MAX_JOINTS]),
        }
    }

    /// Stores the final skinning matrix for bone `id`.
    ///
    /// # Panics
    /// Panics if `id >= MAX_JOINTS`; importers validate bone counts before
    /// any frame is built.
    #[inline]
    pub fn set_joint_matrix(&mut self, id: usize, matrix: Mat4) {
        self.joint_matrices[id] = matrix;
    }

    #[inline]
    #[must_use]
    pub fn joint_matrix(&self, id: usize) -> Mat4 {
        self.joint_matrices[id]
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4; MAX_JOINTS] {
        &self.joint_matrices
    }

    /// Packs the frame into the GPU-consumable skinning uniform layout.
    #[must_use]
    pub fn as_uniform(&self) -> JointMatricesUniform {
        let mut uniform = JointMatricesUniform::zeroed();
        for (slot, matrix) in uniform.joints.iter_mut().zip(self.joint_matrices.iter()) {
            *slot = matrix.to_cols_array();
        }
        uniform
    }
}

/// Plain-old-data view of a frame's joint matrices, column-major, one
/// `[f32; 16]` per joint slot. Uploaded as a single skinning uniform.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct JointMatricesUniform {
    pub joints: [[f32; 16]; MAX_JOINTS],
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn frame_defaults_to_identity() {
        let frame = AnimatedFrame::new();
        assert_eq!(frame.joint_matrix(0), Mat4::IDENTITY);
        assert_eq!(frame.joint_matrix(MAX_JOINTS - 1), Mat4::IDENTITY);
    }

    #[test]
    fn uniform_packs_column_major() {
        let mut frame = AnimatedFrame::new();
        frame.set_joint_matrix(2, Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        let uniform = frame.as_uniform();
        // Translation lives in the fourth column
        assert_eq!(uniform.joints[2][12], 1.0);
        assert_eq!(uniform.joints[2][13], 2.0);
        assert_eq!(uniform.joints[2][14], 3.0);
    }
}
