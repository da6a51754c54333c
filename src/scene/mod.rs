mod camera;
mod item;
mod light;
mod mesh;
mod node;
#[allow(clippy::module_inception)]
mod scene;

pub use camera::{generic_view_matrix, Camera, Frustum, FOV, Z_FAR, Z_NEAR};
pub use item::{AnimationState, SceneItem};
pub use light::DirectionalLight;
pub use mesh::{Material, Mesh, MeshKind, MAX_WEIGHTS, NO_BONE};
pub use node::{Node, NodeArena};
pub use scene::Scene;

slotmap::new_key_type! {
    pub struct MeshKey;
    pub struct ItemKey;
}
