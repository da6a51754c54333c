use std::path::PathBuf;

use glam::{Vec2, Vec3, Vec4};

/// Maximum bone influences carried per vertex.
pub const MAX_WEIGHTS: usize = 4;

/// Sentinel bone index for unused per-vertex weight slots.
pub const NO_BONE: i32 = -1;

/// Draw-call capability of a mesh.
///
/// Instanced meshes share one draw call across all their scene items and
/// differ only in a packed per-instance transform buffer; standard meshes
/// get one draw call per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Standard,
    Instanced,
}

/// Surface description attached to a mesh.
///
/// When a model resolves no material, [`Material::default`] provides an
/// identity-contribution, fully opaque fallback.
#[derive(Debug, Clone)]
pub struct Material {
    pub colour: Vec4,
    pub reflectance: f32,
    pub texture: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            colour: Vec4::ONE,
            reflectance: 1.0,
            texture: None,
            normal_map: None,
        }
    }
}

impl Material {
    #[must_use]
    pub fn from_colour(colour: Vec4) -> Self {
        Self {
            colour,
            ..Self::default()
        }
    }
}

/// Vertex attribute buffers, index buffer, one material, and a precomputed
/// bounding radius used for culling.
///
/// `joint_indices`/`weights` are empty for rigid meshes; when present they
/// hold [`MAX_WEIGHTS`] slots per vertex, padded with `(NO_BONE, 0.0)`.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub kind: MeshKind,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub joint_indices: Vec<[i32; MAX_WEIGHTS]>,
    pub weights: Vec<[f32; MAX_WEIGHTS]>,
    pub indices: Vec<u32>,
    pub material: Material,
    /// Greatest vertex distance from the model origin, scaled by the item's
    /// uniform scale at cull time.
    pub bounding_radius: f32,
}

impl Mesh {
    /// Builds a rigid mesh and computes its bounding radius.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        tex_coords: Vec<Vec2>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        let bounding_radius = bounding_radius(&positions);
        Self {
            name: name.into(),
            kind: MeshKind::Standard,
            positions,
            normals,
            tex_coords,
            joint_indices: Vec::new(),
            weights: Vec::new(),
            indices,
            material,
            bounding_radius,
        }
    }

    /// Builds a skinned mesh carrying per-vertex bone slots.
    #[must_use]
    pub fn new_skinned(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        tex_coords: Vec<Vec2>,
        joint_indices: Vec<[i32; MAX_WEIGHTS]>,
        weights: Vec<[f32; MAX_WEIGHTS]>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        let mut mesh = Self::new(name, positions, normals, tex_coords, indices, material);
        mesh.joint_indices = joint_indices;
        mesh.weights = weights;
        mesh
    }

    #[inline]
    #[must_use]
    pub fn is_instanced(&self) -> bool {
        self.kind == MeshKind::Instanced
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.joint_indices.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

fn bounding_radius(positions: &[Vec3]) -> f32 {
    positions
        .iter()
        .map(|p| p.length_squared())
        .fold(0.0_f32, f32::max)
        .sqrt()
}
