//! md5mesh interpretation: joints block plus one or more mesh blocks.

use glam::{Quat, Vec2, Vec3};

use crate::animation::{Joint, Skeleton, quat_from_xyz};
use crate::errors::{MarionetteError, Result};
use crate::importer::md5::{parse_f32, parse_parent, parse_usize, scan, tokens};
use crate::importer::TextureCache;
use crate::scene::{MAX_WEIGHTS, Material, Mesh, NO_BONE};

/// A bind-pose joint. Position and orientation are model-space, unlike the
/// parent-relative base frame of an md5anim.
#[derive(Debug, Clone)]
pub struct Md5Joint {
    pub name: String,
    pub parent: Option<usize>,
    pub position: Vec3,
    pub orientation: Quat,
}

#[derive(Debug, Clone)]
struct Md5Vertex {
    tex_coord: Vec2,
    start_weight: usize,
    weight_count: usize,
}

#[derive(Debug, Clone)]
struct Md5Weight {
    joint: usize,
    bias: f32,
    position: Vec3,
}

#[derive(Debug, Clone)]
struct Md5MeshSection {
    shader: String,
    vertices: Vec<Md5Vertex>,
    triangles: Vec<[u32; 3]>,
    weights: Vec<Md5Weight>,
}

/// A parsed md5mesh document.
#[derive(Debug, Clone)]
pub struct Md5MeshFile {
    pub joints: Vec<Md5Joint>,
    meshes: Vec<Md5MeshSection>,
}

impl Md5MeshFile {
    pub fn parse(text: &str) -> Result<Self> {
        let (headers, blocks) = scan(text)?;

        let mut joints = Vec::new();
        let mut meshes = Vec::new();
        for block in &blocks {
            match block.id.as_str() {
                "joints" => {
                    for line in &block.lines {
                        joints.push(parse_joint_line(line)?);
                    }
                }
                "mesh" => meshes.push(parse_mesh_block(&block.lines)?),
                _ => {}
            }
        }

        if let Some(expected) = headers.get("numJoints") {
            let expected = parse_usize(expected, "numJoints")?;
            if joints.len() != expected {
                return Err(MarionetteError::Import(format!(
                    "numJoints is {expected} but joints block has {}",
                    joints.len()
                )));
            }
        }
        if joints.is_empty() {
            return Err(MarionetteError::Import("md5mesh has no joints".into()));
        }
        if meshes.is_empty() {
            return Err(MarionetteError::Import("md5mesh has no mesh blocks".into()));
        }

        Ok(Self { joints, meshes })
    }

    /// Bind-pose skeleton in model space.
    pub fn skeleton(&self) -> Result<Skeleton> {
        Skeleton::new(
            self.joints
                .iter()
                .map(|j| Joint {
                    name: j.name.clone(),
                    parent: j.parent,
                    position: j.position,
                    orientation: j.orientation,
                })
                .collect(),
        )
    }

    /// Bakes every mesh section into a skinned [`Mesh`] in bind pose.
    ///
    /// Vertex positions are the bias-weighted sum of each weight's offset
    /// rotated into joint space; normals are accumulated from face normals
    /// and renormalized.
    pub fn build_meshes(&self, textures: &mut TextureCache) -> Result<Vec<Mesh>> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, section)| self.build_mesh(i, section, textures))
            .collect()
    }

    fn build_mesh(
        &self,
        index: usize,
        section: &Md5MeshSection,
        textures: &mut TextureCache,
    ) -> Result<Mesh> {
        let count = section.vertices.len();
        let mut positions = Vec::with_capacity(count);
        let mut tex_coords = Vec::with_capacity(count);
        let mut joint_indices = Vec::with_capacity(count);
        let mut weights = Vec::with_capacity(count);

        for (vi, vertex) in section.vertices.iter().enumerate() {
            let end = vertex.start_weight + vertex.weight_count;
            if end > section.weights.len() {
                return Err(MarionetteError::Import(format!(
                    "vertex {vi} references weights {}..{end} of {}",
                    vertex.start_weight,
                    section.weights.len()
                )));
            }

            let mut position = Vec3::ZERO;
            let mut slots = [NO_BONE; MAX_WEIGHTS];
            let mut biases = [0.0f32; MAX_WEIGHTS];
            for (wi, weight) in section.weights[vertex.start_weight..end].iter().enumerate() {
                let joint = self.joints.get(weight.joint).ok_or_else(|| {
                    MarionetteError::Import(format!(
                        "weight references joint {} of {}",
                        weight.joint,
                        self.joints.len()
                    ))
                })?;
                position += (joint.position + joint.orientation * weight.position) * weight.bias;
                if wi < MAX_WEIGHTS {
                    slots[wi] = weight.joint as i32;
                    biases[wi] = weight.bias;
                }
            }

            positions.push(position);
            tex_coords.push(vertex.tex_coord);
            joint_indices.push(slots);
            weights.push(biases);
        }

        for (ti, tri) in section.triangles.iter().enumerate() {
            if let Some(&vertex) = tri.iter().find(|&&v| v as usize >= count) {
                return Err(MarionetteError::Import(format!(
                    "triangle {ti} references vertex {vertex} of {count}"
                )));
            }
        }

        let indices: Vec<u32> = section.triangles.iter().flatten().copied().collect();
        let normals = accumulate_normals(&positions, &section.triangles);

        let mut material = Material::default();
        if !section.shader.is_empty() {
            material.texture = Some(textures.resolve(&section.shader)?);
            material.normal_map =
                textures.resolve_optional(&TextureCache::normal_map_name(&section.shader));
        }

        Ok(Mesh::new_skinned(
            format!("mesh_{index}"),
            positions,
            normals,
            tex_coords,
            joint_indices,
            weights,
            indices,
            material,
        ))
    }
}

/// Smooth normals from face normals: each face's cross product is added to
/// its three vertices, then every sum is normalized.
fn accumulate_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|i| i as usize);
        let normal = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += normal;
        normals[b] += normal;
        normals[c] += normal;
    }
    for normal in &mut normals {
        *normal = normal.normalize_or(Vec3::Z);
    }
    normals
}

/// `"name" parent ( px py pz ) ( qx qy qz )`
fn parse_joint_line(line: &str) -> Result<Md5Joint> {
    let toks = tokens(line);
    let [name, parent, px, py, pz, qx, qy, qz] = toks.as_slice() else {
        return Err(MarionetteError::Import(format!(
            "malformed joint line: '{line}'"
        )));
    };
    Ok(Md5Joint {
        name: name.clone(),
        parent: parse_parent(parent, "joints")?,
        position: Vec3::new(
            parse_f32(px, "joints")?,
            parse_f32(py, "joints")?,
            parse_f32(pz, "joints")?,
        ),
        orientation: quat_from_xyz(
            parse_f32(qx, "joints")?,
            parse_f32(qy, "joints")?,
            parse_f32(qz, "joints")?,
        ),
    })
}

fn parse_mesh_block(lines: &[String]) -> Result<Md5MeshSection> {
    let mut shader = String::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    let mut weights = Vec::new();

    for line in lines {
        let toks = tokens(line);
        match toks.first().map(String::as_str) {
            Some("shader") => {
                shader = toks.get(1).cloned().unwrap_or_default();
            }
            Some("vert") => {
                let [_kw, _idx, s, t, start, count] = toks.as_slice() else {
                    return Err(MarionetteError::Import(format!(
                        "malformed vert line: '{line}'"
                    )));
                };
                vertices.push(Md5Vertex {
                    tex_coord: Vec2::new(parse_f32(s, "vert")?, parse_f32(t, "vert")?),
                    start_weight: parse_usize(start, "vert")?,
                    weight_count: parse_usize(count, "vert")?,
                });
            }
            Some("tri") => {
                let [_kw, _idx, a, b, c] = toks.as_slice() else {
                    return Err(MarionetteError::Import(format!(
                        "malformed tri line: '{line}'"
                    )));
                };
                triangles.push([
                    parse_usize(a, "tri")? as u32,
                    parse_usize(b, "tri")? as u32,
                    parse_usize(c, "tri")? as u32,
                ]);
            }
            Some("weight") => {
                let [_kw, _idx, joint, bias, x, y, z] = toks.as_slice() else {
                    return Err(MarionetteError::Import(format!(
                        "malformed weight line: '{line}'"
                    )));
                };
                weights.push(Md5Weight {
                    joint: parse_usize(joint, "weight")?,
                    bias: parse_f32(bias, "weight")?,
                    position: Vec3::new(
                        parse_f32(x, "weight")?,
                        parse_f32(y, "weight")?,
                        parse_f32(z, "weight")?,
                    ),
                });
            }
            // numverts/numtris/numweights are implied by the lists
            _ => {}
        }
    }

    Ok(Md5MeshSection {
        shader,
        vertices,
        triangles,
        weights,
    })
}
