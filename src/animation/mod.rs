//! Skeletal animation data model and frame building.
//!
//! - [`Bone`] / [`Skeleton`]: immutable import-time data
//! - [`AnimatedFrame`]: per-frame skinning matrices, one slot per bone id
//! - [`Animation`]: a clip with caller-driven discrete frame stepping
//! - [`frame_builder`]: hierarchical and flat joint-matrix composition

pub mod bone;
pub mod clip;
pub mod frame;
pub mod frame_builder;

pub use bone::{Bone, Joint, Skeleton, quat_from_xyz};
pub use clip::Animation;
pub use frame::{AnimatedFrame, JointMatricesUniform, MAX_JOINTS};
pub use frame_builder::{
    BoneBinding, FlatJointSpec, FrameFlags, build_flat_frame, build_hierarchical_frame,
    inverse_bind_matrices,
};
