//! glTF 2.0 importer.
//!
//! Walks the document scene into a [`NodeArena`], turns skins into globally
//! numbered bones, and bakes every animation into discrete per-frame joint
//! matrices through the hierarchical frame builder. Keyframes are sampled by
//! index, not by time; channels shorter than the longest one hold their last
//! keyframe.

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};
use gltf::animation::util::ReadOutputs;
use log::debug;

use crate::animation::{Animation, Bone, BoneBinding, build_hierarchical_frame};
use crate::errors::{MarionetteError, Result};
use crate::importer::{ImportedModel, TextureCache};
use crate::scene::{MAX_WEIGHTS, Material, Mesh, NO_BONE, NodeArena};

/// Loads a glTF (or glb) model with all of its animations.
pub fn load_gltf_model(path: &Path, textures: &mut TextureCache) -> Result<ImportedModel> {
    let (document, buffers, _images) = gltf::import(path)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| MarionetteError::Import("glTF document has no scene".into()))?;

    // Flatten the hierarchy into an arena. Multiple scene roots get a
    // synthetic identity root so arena index 0 is always the single root.
    let mut arena = NodeArena::new();
    let mut node_map = HashMap::new();
    let roots: Vec<_> = scene.nodes().collect();
    match roots.as_slice() {
        [single] => add_node(&mut arena, &mut node_map, single, None)?,
        _ => {
            let root = arena.push("root", Mat4::IDENTITY, None)?;
            for node in &roots {
                add_node(&mut arena, &mut node_map, node, Some(root))?;
            }
        }
    }
    let global_inverse_root = arena.nodes()[0].local_transform.inverse();

    let (bones, bindings, skin_base) = load_skins(&document, &buffers, &node_map)?;
    let meshes = load_meshes(&document, &buffers, &node_map, &skin_base, textures)?;
    if meshes.is_empty() {
        return Err(MarionetteError::Import(
            "glTF scene contains no meshes".into(),
        ));
    }

    let rest_locals = arena.local_transforms();
    let mut animations = HashMap::new();
    for (index, animation) in document.animations().enumerate() {
        let name = animation
            .name()
            .map_or_else(|| format!("animation_{index}"), str::to_string);
        let clip = bake_animation(
            &animation,
            &buffers,
            &node_map,
            &arena,
            &rest_locals,
            &bones,
            &bindings,
            global_inverse_root,
            &name,
        )?;
        if clip.frame_count() == 0 {
            debug!("skipping clip '{name}': no keyframes target scene nodes");
            continue;
        }
        debug!(
            "baked clip '{name}': {} frames, {:.2}s",
            clip.frame_count(),
            clip.duration()
        );
        animations.insert(name, clip);
    }

    Ok(ImportedModel { meshes, animations })
}

fn add_node(
    arena: &mut NodeArena,
    node_map: &mut HashMap<usize, usize>,
    node: &gltf::Node<'_>,
    parent: Option<usize>,
) -> Result<()> {
    let name = node
        .name()
        .map_or_else(|| format!("node_{}", node.index()), str::to_string);
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let index = arena.push(name, transform, parent)?;
    node_map.insert(node.index(), index);
    for child in node.children() {
        add_node(arena, node_map, &child, Some(index))?;
    }
    Ok(())
}

/// Bones get ids that are global across skins, so meshes from different
/// skins can share one joint-matrix array. Returns, per skin index, the
/// first global bone id of that skin.
fn load_skins(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    node_map: &HashMap<usize, usize>,
) -> Result<(Vec<Bone>, Vec<BoneBinding>, HashMap<usize, usize>)> {
    let mut bones = Vec::new();
    let mut bindings = Vec::new();
    let mut skin_base = HashMap::new();

    for skin in document.skins() {
        let base = bones.len();
        skin_base.insert(skin.index(), base);

        let reader = skin.reader(|buffer| Some(&buffers[buffer.index()].0[..]));
        let ibms: Vec<Mat4> = reader
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default();

        for (i, joint) in skin.joints().enumerate() {
            let node = *node_map.get(&joint.index()).ok_or_else(|| {
                MarionetteError::Import(format!(
                    "skin {} references node {} outside the scene",
                    skin.index(),
                    joint.index()
                ))
            })?;
            let id = base + i;
            let name = joint
                .name()
                .map_or_else(|| format!("joint_{id}"), str::to_string);
            let offset = ibms.get(i).copied().unwrap_or(Mat4::IDENTITY);
            bones.push(Bone::new(id, name, offset));
            bindings.push(BoneBinding { node, bone: id });
        }
    }

    Ok((bones, bindings, skin_base))
}

fn load_meshes(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    node_map: &HashMap<usize, usize>,
    skin_base: &HashMap<usize, usize>,
    textures: &mut TextureCache,
) -> Result<Vec<Mesh>> {
    let mut meshes = Vec::new();

    for node in document.nodes() {
        if !node_map.contains_key(&node.index()) {
            continue;
        }
        let Some(gltf_mesh) = node.mesh() else {
            continue;
        };
        let bone_base = node
            .skin()
            .and_then(|skin| skin_base.get(&skin.index()).copied());

        for (pi, primitive) in gltf_mesh.primitives().enumerate() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()].0[..]));

            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| {
                    MarionetteError::Import(format!(
                        "mesh '{}' primitive {pi} has no positions",
                        gltf_mesh.name().unwrap_or("?")
                    ))
                })?
                .map(Vec3::from)
                .collect();
            let count = positions.len();

            let normals: Vec<Vec3> = reader
                .read_normals()
                .map_or_else(|| vec![Vec3::Z; count], |iter| iter.map(Vec3::from).collect());
            let tex_coords: Vec<Vec2> = reader.read_tex_coords(0).map_or_else(
                || vec![Vec2::ZERO; count],
                |iter| iter.into_f32().map(Vec2::from).collect(),
            );
            let indices: Vec<u32> = reader.read_indices().map_or_else(
                || (0..count as u32).collect(),
                |iter| iter.into_u32().collect(),
            );

            let material = load_material(&primitive.material(), textures)?;
            let name = gltf_mesh
                .name()
                .map_or_else(|| format!("mesh_{}_{pi}", gltf_mesh.index()), str::to_string);

            let joints = reader.read_joints(0).map(|iter| iter.into_u16());
            let weights = reader.read_weights(0).map(|iter| iter.into_f32());
            let mesh = match (bone_base, joints, weights) {
                (Some(base), Some(joints), Some(weights)) => {
                    let mut joint_indices = Vec::with_capacity(count);
                    let mut vertex_weights = Vec::with_capacity(count);
                    for (j, w) in joints.zip(weights) {
                        let mut slots = [NO_BONE; MAX_WEIGHTS];
                        for k in 0..MAX_WEIGHTS {
                            if w[k] > 0.0 {
                                slots[k] = (base + j[k] as usize) as i32;
                            }
                        }
                        joint_indices.push(slots);
                        vertex_weights.push(w);
                    }
                    Mesh::new_skinned(
                        name,
                        positions,
                        normals,
                        tex_coords,
                        joint_indices,
                        vertex_weights,
                        indices,
                        material,
                    )
                }
                _ => Mesh::new(name, positions, normals, tex_coords, indices, material),
            };
            meshes.push(mesh);
        }
    }

    Ok(meshes)
}

fn load_material(
    material: &gltf::Material<'_>,
    textures: &mut TextureCache,
) -> Result<Material> {
    let pbr = material.pbr_metallic_roughness();
    let mut out = Material::from_colour(pbr.base_color_factor().into());
    out.reflectance = 1.0 - pbr.roughness_factor();

    if let Some(info) = pbr.base_color_texture() {
        if let gltf::image::Source::Uri { uri, .. } = info.texture().source().source() {
            out.texture = Some(textures.resolve(uri)?);
            out.normal_map = textures.resolve_optional(&TextureCache::normal_map_name(uri));
        }
    }
    if let Some(normal) = material.normal_texture() {
        if let gltf::image::Source::Uri { uri, .. } = normal.texture().source().source() {
            out.normal_map = Some(textures.resolve(uri)?);
        }
    }

    Ok(out)
}

#[derive(Default)]
struct NodeChannels {
    translations: Vec<Vec3>,
    rotations: Vec<Quat>,
    scales: Vec<Vec3>,
}

fn sample<T: Copy>(values: &[T], frame: usize, rest: T) -> T {
    match values {
        [] => rest,
        _ => values[frame.min(values.len() - 1)],
    }
}

#[allow(clippy::too_many_arguments)]
fn bake_animation(
    animation: &gltf::Animation<'_>,
    buffers: &[gltf::buffer::Data],
    node_map: &HashMap<usize, usize>,
    arena: &NodeArena,
    rest_locals: &[Mat4],
    bones: &[Bone],
    bindings: &[BoneBinding],
    global_inverse_root: Mat4,
    name: &str,
) -> Result<Animation> {
    let mut channels: HashMap<usize, NodeChannels> = HashMap::new();
    let mut frame_count = 0usize;
    let mut duration = 0f64;

    for channel in animation.channels() {
        let Some(&node) = node_map.get(&channel.target().node().index()) else {
            continue;
        };
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()].0[..]));
        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();
        if let Some(&last) = times.last() {
            duration = duration.max(f64::from(last));
        }
        frame_count = frame_count.max(times.len());

        let entry = channels.entry(node).or_default();
        match reader.read_outputs() {
            Some(ReadOutputs::Translations(iter)) => {
                entry.translations = iter.map(Vec3::from).collect();
            }
            Some(ReadOutputs::Rotations(rotations)) => {
                entry.rotations = rotations.into_f32().map(Quat::from_array).collect();
            }
            Some(ReadOutputs::Scales(iter)) => {
                entry.scales = iter.map(Vec3::from).collect();
            }
            _ => {}
        }
    }

    let mut frames = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let mut locals = rest_locals.to_vec();
        for (&node, data) in &channels {
            let (rest_scale, rest_rotation, rest_translation) =
                rest_locals[node].to_scale_rotation_translation();
            let translation = sample(&data.translations, frame, rest_translation);
            let rotation = sample(&data.rotations, frame, rest_rotation);
            let scale = sample(&data.scales, frame, rest_scale);
            locals[node] = Mat4::from_scale_rotation_translation(scale, rotation, translation);
        }
        frames.push(build_hierarchical_frame(
            arena,
            &locals,
            bones,
            bindings,
            global_inverse_root,
        )?);
    }

    Ok(Animation::new(name, frames, duration))
}
