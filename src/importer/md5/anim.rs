//! md5anim interpretation: hierarchy, base frame, and per-frame float
//! streams.

use glam::{Quat, Vec3};

use crate::animation::{FlatJointSpec, FrameFlags, Joint, Skeleton, quat_from_xyz};
use crate::errors::{MarionetteError, Result};
use crate::importer::md5::{parse_f32, parse_parent, parse_usize, scan, tokens};

/// One hierarchy line: which base-frame components of the joint each frame
/// overrides, and where its first override value sits in the frame stream.
#[derive(Debug, Clone)]
pub struct HierarchyEntry {
    pub name: String,
    pub parent: Option<usize>,
    pub flags: FrameFlags,
    pub start_index: usize,
}

/// A parsed md5anim document.
///
/// The base frame is parent-relative; frames hold raw floats whose layout
/// is described by the hierarchy entries.
#[derive(Debug, Clone)]
pub struct Md5AnimFile {
    pub frame_rate: f32,
    pub hierarchy: Vec<HierarchyEntry>,
    base_frame: Vec<(Vec3, Quat)>,
    pub frames: Vec<Vec<f32>>,
}

impl Md5AnimFile {
    pub fn parse(text: &str) -> Result<Self> {
        let (headers, blocks) = scan(text)?;

        let mut hierarchy = Vec::new();
        let mut base_frame = Vec::new();
        let mut frames = Vec::new();

        for block in &blocks {
            match block.id.as_str() {
                "hierarchy" => {
                    for line in &block.lines {
                        hierarchy.push(parse_hierarchy_line(line)?);
                    }
                }
                "baseframe" => {
                    for line in &block.lines {
                        base_frame.push(parse_base_frame_line(line)?);
                    }
                }
                id if id.starts_with("frame ") => {
                    let mut data = Vec::new();
                    for line in &block.lines {
                        for token in tokens(line) {
                            data.push(parse_f32(&token, id)?);
                        }
                    }
                    frames.push(data);
                }
                // bounds are only useful to a spatial pre-pass, skip
                _ => {}
            }
        }

        if hierarchy.is_empty() {
            return Err(MarionetteError::Import("md5anim has no hierarchy".into()));
        }
        if base_frame.len() != hierarchy.len() {
            return Err(MarionetteError::Import(format!(
                "baseframe has {} joints, hierarchy has {}",
                base_frame.len(),
                hierarchy.len()
            )));
        }
        if frames.is_empty() {
            return Err(MarionetteError::Import("md5anim has no frames".into()));
        }
        if let Some(expected) = headers.get("numFrames") {
            let expected = parse_usize(expected, "numFrames")?;
            if frames.len() != expected {
                return Err(MarionetteError::Import(format!(
                    "numFrames is {expected} but {} frame blocks found",
                    frames.len()
                )));
            }
        }

        let frame_rate = headers
            .get("frameRate")
            .map(|v| parse_f32(v, "frameRate"))
            .transpose()?
            .unwrap_or(24.0);

        Ok(Self {
            frame_rate,
            hierarchy,
            base_frame,
            frames,
        })
    }

    /// Parent-relative base-frame skeleton, joint names and parents from
    /// the hierarchy block.
    pub fn base_skeleton(&self) -> Result<Skeleton> {
        Skeleton::new(
            self.hierarchy
                .iter()
                .zip(&self.base_frame)
                .map(|(entry, &(position, orientation))| Joint {
                    name: entry.name.clone(),
                    parent: entry.parent,
                    position,
                    orientation,
                })
                .collect(),
        )
    }

    /// Per-joint frame-stream layout for the flat frame builder.
    #[must_use]
    pub fn joint_specs(&self) -> Vec<FlatJointSpec> {
        self.hierarchy
            .iter()
            .map(|entry| FlatJointSpec {
                flags: entry.flags,
                start_index: entry.start_index,
            })
            .collect()
    }

    /// Clip length in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        if self.frame_rate > 0.0 {
            self.frames.len() as f64 / f64::from(self.frame_rate)
        } else {
            0.0
        }
    }
}

/// `"name" parent flags startIndex`
fn parse_hierarchy_line(line: &str) -> Result<HierarchyEntry> {
    let toks = tokens(line);
    let [name, parent, flags, start_index] = toks.as_slice() else {
        return Err(MarionetteError::Import(format!(
            "malformed hierarchy line: '{line}'"
        )));
    };
    let bits = u32::try_from(parse_usize(flags, "hierarchy")?)
        .map_err(|_| MarionetteError::Import(format!("flags out of range in '{line}'")))?;
    let flags = FrameFlags::from_bits(bits)
        .ok_or_else(|| MarionetteError::Import(format!("unknown flag bits in '{line}'")))?;
    Ok(HierarchyEntry {
        name: name.clone(),
        parent: parse_parent(parent, "hierarchy")?,
        flags,
        start_index: parse_usize(start_index, "hierarchy")?,
    })
}

/// `( px py pz ) ( qx qy qz )`
fn parse_base_frame_line(line: &str) -> Result<(Vec3, Quat)> {
    let toks = tokens(line);
    let [px, py, pz, qx, qy, qz] = toks.as_slice() else {
        return Err(MarionetteError::Import(format!(
            "malformed baseframe line: '{line}'"
        )));
    };
    Ok((
        Vec3::new(
            parse_f32(px, "baseframe")?,
            parse_f32(py, "baseframe")?,
            parse_f32(pz, "baseframe")?,
        ),
        quat_from_xyz(
            parse_f32(qx, "baseframe")?,
            parse_f32(qy, "baseframe")?,
            parse_f32(qz, "baseframe")?,
        ),
    ))
}
