use glam::{Mat4, Quat, Vec3};

use crate::errors::{MarionetteError, Result};

/// Immutable bone identity created once at import time.
///
/// `id` is the index into the skinning-matrix array: bone `i`'s result always
/// lands in [`AnimatedFrame`](crate::animation::AnimatedFrame) slot `i`.
#[derive(Debug, Clone)]
pub struct Bone {
    pub id: usize,
    pub name: String,
    /// Bone-space → mesh-space transform (inverse bind pose).
    pub offset_matrix: Mat4,
}

impl Bone {
    #[must_use]
    pub fn new(id: usize, name: impl Into<String>, offset_matrix: Mat4) -> Self {
        Self {
            id,
            name: name.into(),
            offset_matrix,
        }
    }
}

/// One joint of a flat skeleton: rest pose plus parent linkage.
///
/// The space of the rest pose follows the source data: MD5 mesh joints carry
/// model-space poses, animation base frames carry parent-relative ones. The
/// frame builder documents which it expects.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, or `None` for the root.
    pub parent: Option<usize>,
    pub position: Vec3,
    pub orientation: Quat,
}

/// Ordered flat joint list.
///
/// Invariant: every parent index references an earlier-indexed joint, so a
/// single top-down pass over the list visits parents before children. The
/// constructor enforces this; the frame builder relies on it.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Builds a skeleton, validating the parent-before-child ordering.
    pub fn new(joints: Vec<Joint>) -> Result<Self> {
        for (i, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= i {
                    return Err(MarionetteError::HierarchyInvariant { joint: i, parent });
                }
            }
        }
        Ok(Self { joints })
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

/// Reconstructs the w component of a quaternion stored as x/y/z only.
///
/// Model formats frequently drop w to save space; `1 - x² - y² - z²` can
/// overshoot slightly negative in float, so it is clamped before the root.
#[must_use]
pub fn quat_from_xyz(x: f32, y: f32, z: f32) -> Quat {
    let w = (1.0 - x * x - y * y - z * z).max(0.0).sqrt();
    Quat::from_xyzw(x, y, z, w)
}
