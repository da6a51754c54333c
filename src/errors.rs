//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`MarionetteError`] covers all failure modes of scene
//! construction:
//! - Model import errors (unreadable files, malformed blocks, zero meshes)
//! - Skeleton hierarchy invariant violations
//! - Animation frame-stream underflow
//! - Texture resolution errors
//!
//! Per-frame computations (shadow cascades, frustum culling) never return
//! errors: degenerate numeric input is clamped or normalized in place so
//! a transient fault cannot crash the render loop.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, MarionetteError>`.

use thiserror::Error;

/// The main error type for the marionette engine.
///
/// Each variant carries enough context to tell which asset, joint or clip
/// caused scene construction to abort.
#[derive(Error, Debug)]
pub enum MarionetteError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Import Errors
    // ========================================================================
    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Malformed or incomplete model data.
    #[error("Import error: {0}")]
    Import(String),

    /// A referenced texture could not be resolved.
    #[error("Texture not found: {0}")]
    TextureNotFound(String),

    // ========================================================================
    // Skeleton & Animation Errors
    // ========================================================================
    /// A joint references a parent that has not been computed yet, or the
    /// hierarchy contains a cycle. Indicates a corrupt asset; never tolerated
    /// silently since it would desync all downstream joint math.
    #[error("Hierarchy invariant violation: joint {joint} references parent {parent}")]
    HierarchyInvariant {
        /// Index of the offending joint
        joint: usize,
        /// The invalid parent index
        parent: usize,
    },

    /// An animation frame's float stream is shorter than its component flags
    /// imply. The clip is rejected; sibling clips may still load.
    #[error("Frame data underflow at joint {joint}: needed {expected} floats, stream has {got}")]
    FrameDataUnderflow {
        /// Joint whose flagged components ran past the stream
        joint: usize,
        /// Floats implied by the flags up to and including this joint
        expected: usize,
        /// Floats actually present in the frame stream
        got: usize,
    },

    /// More bones than skinning-uniform slots.
    #[error("Model has {count} bones, exceeding the {max} joint slots")]
    TooManyJoints {
        /// Bones found in the model
        count: usize,
        /// Maximum supported joint count
        max: usize,
    },
}

impl From<gltf::Error> for MarionetteError {
    fn from(err: gltf::Error) -> Self {
        MarionetteError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, MarionetteError>`.
pub type Result<T> = std::result::Result<T, MarionetteError>;
