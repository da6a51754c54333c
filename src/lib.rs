#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod backend;
pub mod culling;
pub mod engine;
pub mod errors;
pub mod importer;
pub mod render;
pub mod scene;
pub mod shadow;

pub use animation::{AnimatedFrame, Animation, JointMatricesUniform, MAX_JOINTS, Skeleton};
pub use backend::{CascadeUniform, DrawCall, InstanceTransform, RenderBackend};
pub use culling::FrustumCullingFilter;
pub use engine::{FrameAdvanceGate, Timer, UpdateLoop, TARGET_UPS};
pub use errors::{MarionetteError, Result};
pub use importer::{load_gltf_model, load_md5_model, ImportedModel, TextureCache};
pub use render::FrameRenderer;
pub use scene::{
    AnimationState, Camera, DirectionalLight, Frustum, ItemKey, Material, Mesh, MeshKey, MeshKind,
    Scene, SceneItem,
};
pub use shadow::{CascadeSet, ShadowCascade, CASCADE_COUNT, CASCADE_SPLITS};
