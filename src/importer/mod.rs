//! Model importers.
//!
//! Two formats produce the same [`ImportedModel`]: glTF via the hierarchical
//! node path and MD5 via the flat joint path. Texture references resolve
//! through an injected [`TextureCache`] so callers control the search root.

mod gltf;
pub mod md5;
mod texture;

use std::collections::HashMap;

pub use self::gltf::load_gltf_model;
pub use md5::load_md5_model;
pub use texture::TextureCache;

use crate::animation::Animation;
use crate::scene::Mesh;

/// Output common to every importer: meshes plus named, pre-baked clips.
#[derive(Debug)]
pub struct ImportedModel {
    pub meshes: Vec<Mesh>,
    pub animations: HashMap<String, Animation>,
}
