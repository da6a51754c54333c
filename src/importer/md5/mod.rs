//! MD5 (Doom 3) mesh and anim importer.
//!
//! Both file kinds share one line-oriented shape: scalar header entries
//! followed by named `{ ... }` blocks. The scanner here splits a document
//! into headers and blocks; `model` and `anim` interpret them. Frames are
//! baked to joint matrices through the flat frame builder at load time.

mod anim;
mod model;

use std::collections::HashMap;
use std::path::Path;

pub use anim::{HierarchyEntry, Md5AnimFile};
pub use model::{Md5Joint, Md5MeshFile};

use crate::animation::{Animation, build_flat_frame, inverse_bind_matrices};
use crate::errors::{MarionetteError, Result};
use crate::importer::{ImportedModel, TextureCache};

/// Loads an md5mesh plus one md5anim into meshes and a single named clip.
///
/// The clip takes its name from the anim file stem. The bind pose comes
/// from the mesh file; per-frame joint matrices compose the anim file's
/// base frame and sparse deltas with the bind pose inverses.
pub fn load_md5_model(
    mesh_path: &Path,
    anim_path: &Path,
    textures: &mut TextureCache,
) -> Result<ImportedModel> {
    let mesh_text = std::fs::read_to_string(mesh_path)?;
    let anim_text = std::fs::read_to_string(anim_path)?;

    let mesh_file = Md5MeshFile::parse(&mesh_text)?;
    let anim_file = Md5AnimFile::parse(&anim_text)?;

    if mesh_file.joints.len() != anim_file.hierarchy.len() {
        return Err(MarionetteError::Import(format!(
            "md5anim has {} joints, md5mesh has {}",
            anim_file.hierarchy.len(),
            mesh_file.joints.len()
        )));
    }

    let bind_skeleton = mesh_file.skeleton()?;
    let inv_bind = inverse_bind_matrices(&bind_skeleton);
    let base_skeleton = anim_file.base_skeleton()?;
    let specs = anim_file.joint_specs();

    let mut frames = Vec::with_capacity(anim_file.frames.len());
    for data in &anim_file.frames {
        frames.push(build_flat_frame(&base_skeleton, &specs, data, &inv_bind)?);
    }

    let name = anim_path
        .file_stem()
        .map_or_else(|| "animation".to_string(), |s| s.to_string_lossy().into_owned());
    let clip = Animation::new(name.clone(), frames, anim_file.duration());

    let meshes = mesh_file.build_meshes(textures)?;

    let mut animations = HashMap::new();
    animations.insert(name, clip);
    Ok(ImportedModel { meshes, animations })
}

/// One `name { ... }` block; `id` keeps everything before the brace, so a
/// `frame 12 {` block has id `"frame 12"`.
struct Block {
    id: String,
    lines: Vec<String>,
}

/// Splits a document into top-level `key value` headers and blocks.
/// Comments (`//`) and blank lines are dropped.
fn scan(text: &str) -> Result<(HashMap<String, String>, Vec<Block>)> {
    let mut headers = HashMap::new();
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for raw in text.lines() {
        let line = match raw.find("//") {
            Some(pos) => raw[..pos].trim(),
            None => raw.trim(),
        };
        if line.is_empty() {
            continue;
        }

        if let Some(mut block) = current.take() {
            if line == "}" {
                blocks.push(block);
            } else {
                block.lines.push(line.to_string());
                current = Some(block);
            }
        } else if let Some(id) = line.strip_suffix('{') {
            current = Some(Block {
                id: id.trim().to_string(),
                lines: Vec::new(),
            });
        } else if let Some((key, value)) = line.split_once(char::is_whitespace) {
            headers.insert(key.to_string(), value.trim().to_string());
        } else {
            return Err(MarionetteError::Import(format!(
                "unrecognized line outside block: '{line}'"
            )));
        }
    }

    if current.is_some() {
        return Err(MarionetteError::Import("unterminated block".into()));
    }
    Ok((headers, blocks))
}

/// Splits a block line into bare tokens: quoted strings become one token
/// without the quotes, parentheses are dropped.
fn tokens(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '"' => {
                chars.next();
                let mut token = String::new();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    token.push(c);
                }
                out.push(token);
            }
            '(' | ')' => {
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut token = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
                out.push(token);
            }
        }
    }
    out
}

fn parse_f32(token: &str, context: &str) -> Result<f32> {
    token
        .parse()
        .map_err(|_| MarionetteError::Import(format!("bad float '{token}' in {context}")))
}

fn parse_usize(token: &str, context: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| MarionetteError::Import(format!("bad integer '{token}' in {context}")))
}

/// Parses an MD5 parent index; `-1` means no parent.
fn parse_parent(token: &str, context: &str) -> Result<Option<usize>> {
    let value: i64 = token
        .parse()
        .map_err(|_| MarionetteError::Import(format!("bad parent '{token}' in {context}")))?;
    if value < 0 {
        Ok(None)
    } else {
        Ok(Some(value as usize))
    }
}
