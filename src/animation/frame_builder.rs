//! Frame Builder
//!
//! Composes per-joint local transforms into the final skinning matrices of
//! one [`AnimatedFrame`]. Two paths exist, matching the two importer
//! strategies:
//!
//! - the hierarchical path walks an imported [`NodeArena`] top-down, parent
//!   before child, and applies `global_inverse_root * global * offset` for
//!   every bone bound to a node;
//! - the flat path consumes an MD5-style base frame plus sparse, flag-gated
//!   per-joint deltas from a float stream.
//!
//! Both rely on the parent-before-child ordering invariant enforced by
//! [`NodeArena`] and [`Skeleton`] at construction time.

use bitflags::bitflags;
use glam::Mat4;

use crate::animation::bone::{Bone, Skeleton, quat_from_xyz};
use crate::animation::frame::{AnimatedFrame, MAX_JOINTS};
use crate::errors::{MarionetteError, Result};
use crate::scene::NodeArena;

bitflags! {
    /// Which components of a joint differ from the base frame.
    ///
    /// The frame float stream holds values only for flagged components, in
    /// flag order; unflagged components inherit the base-frame value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FrameFlags: u32 {
        const POS_X = 1;
        const POS_Y = 1 << 1;
        const POS_Z = 1 << 2;
        const ROT_X = 1 << 3;
        const ROT_Y = 1 << 4;
        const ROT_Z = 1 << 5;
    }
}

/// Per-joint description of where a frame's sparse deltas live.
#[derive(Debug, Clone, Copy)]
pub struct FlatJointSpec {
    pub flags: FrameFlags,
    /// Offset of this joint's first flagged value in the frame float stream.
    pub start_index: usize,
}

/// Associates a node of the hierarchy with one bone id.
#[derive(Debug, Clone, Copy)]
pub struct BoneBinding {
    pub node: usize,
    pub bone: usize,
}

/// Per-joint inverse bind matrices from a skeleton's rest pose.
///
/// Expects model-space joint poses (the MD5 mesh convention): each bone's
/// bind transform is `translate(position) * rotate(orientation)`, inverted.
#[must_use]
pub fn inverse_bind_matrices(skeleton: &Skeleton) -> Vec<Mat4> {
    skeleton
        .joints()
        .iter()
        .map(|joint| {
            (Mat4::from_translation(joint.position) * Mat4::from_quat(joint.orientation)).inverse()
        })
        .collect()
}

/// Builds one frame by walking the node hierarchy top-down.
///
/// `locals[i]` is node `i`'s local transform for this frame (animated where
/// a channel targets the node, the stored rest transform otherwise). The
/// walk recurses through every node so descendant transforms stay correct
/// even where no bone is attached; only bound nodes produce joint matrices.
///
/// The skinning composition is order-sensitive:
/// `global_inverse_root * global(node) * offset(bone)`. Swapping operands
/// silently deforms the skin wrong, which is why it lives in exactly one
/// place.
pub fn build_hierarchical_frame(
    arena: &NodeArena,
    locals: &[Mat4],
    bones: &[Bone],
    bindings: &[BoneBinding],
    global_inverse_root: Mat4,
) -> Result<AnimatedFrame> {
    if bones.len() > MAX_JOINTS {
        return Err(MarionetteError::TooManyJoints {
            count: bones.len(),
            max: MAX_JOINTS,
        });
    }
    debug_assert_eq!(locals.len(), arena.len());

    let globals = arena.global_transforms(locals);

    let mut frame = AnimatedFrame::new();
    for binding in bindings {
        let bone = &bones[binding.bone];
        let matrix = global_inverse_root * globals[binding.node] * bone.offset_matrix;
        frame.set_joint_matrix(bone.id, matrix);
    }
    Ok(frame)
}

/// Builds one frame from a flat joint list with sparse per-frame deltas.
///
/// For each joint, the base-frame position/orientation (parent-relative) is
/// patched by values read from `frame_data`: one float per set flag, read in
/// flag order starting at the joint's `start_index`. An unset flag must not
/// advance the read cursor, since misreading it corrupts every subsequent
/// joint.
/// Orientation w is reconstructed after patching.
///
/// The local joint matrix is composed with the parent's already-computed
/// matrix (model space), then multiplied by the joint's inverse bind matrix
/// to produce the skinning matrix.
pub fn build_flat_frame(
    base: &Skeleton,
    specs: &[FlatJointSpec],
    frame_data: &[f32],
    inv_bind_matrices: &[Mat4],
) -> Result<AnimatedFrame> {
    if base.len() > MAX_JOINTS {
        return Err(MarionetteError::TooManyJoints {
            count: base.len(),
            max: MAX_JOINTS,
        });
    }
    debug_assert_eq!(specs.len(), base.len());
    debug_assert_eq!(inv_bind_matrices.len(), base.len());

    let mut frame = AnimatedFrame::new();
    // Model-space joint matrices needed for parent composition
    let mut local_joint_matrices: Vec<Mat4> = Vec::with_capacity(base.len());

    for (i, joint) in base.joints().iter().enumerate() {
        let spec = specs[i];
        let mut position = joint.position;
        let (mut ox, mut oy, mut oz) = {
            let o = joint.orientation;
            (o.x, o.y, o.z)
        };

        let mut cursor = spec.start_index;
        let mut read = |cursor: &mut usize| -> Result<f32> {
            let value = frame_data.get(*cursor).copied().ok_or({
                MarionetteError::FrameDataUnderflow {
                    joint: i,
                    expected: *cursor + 1,
                    got: frame_data.len(),
                }
            })?;
            *cursor += 1;
            Ok(value)
        };

        if spec.flags.contains(FrameFlags::POS_X) {
            position.x = read(&mut cursor)?;
        }
        if spec.flags.contains(FrameFlags::POS_Y) {
            position.y = read(&mut cursor)?;
        }
        if spec.flags.contains(FrameFlags::POS_Z) {
            position.z = read(&mut cursor)?;
        }
        if spec.flags.contains(FrameFlags::ROT_X) {
            ox = read(&mut cursor)?;
        }
        if spec.flags.contains(FrameFlags::ROT_Y) {
            oy = read(&mut cursor)?;
        }
        if spec.flags.contains(FrameFlags::ROT_Z) {
            oz = read(&mut cursor)?;
        }

        let orientation = quat_from_xyz(ox, oy, oz);

        let mut joint_matrix = Mat4::from_translation(position) * Mat4::from_quat(orientation);
        if let Some(parent) = joint.parent {
            // Parent ordering is a Skeleton construction invariant
            joint_matrix = local_joint_matrices[parent] * joint_matrix;
        }

        frame.set_joint_matrix(i, joint_matrix * inv_bind_matrices[i]);
        local_joint_matrices.push(joint_matrix);
    }

    Ok(frame)
}
