//! Importer Pipeline Tests
//!
//! End-to-end loads through temporary files:
//! - MD5 mesh + anim into baked meshes and a clip
//! - Minimal glTF document (embedded buffer) into a mesh
//! - Malformed input rejection with typed errors

use std::fs;
use std::path::PathBuf;

use glam::Vec3;

use marionette::errors::MarionetteError;
use marionette::importer::{load_gltf_model, load_md5_model, TextureCache};

const MD5_MESH: &str = r#"
MD5Version 10
commandline ""
numJoints 1
numMeshes 1

joints {
	"origin" -1 ( 0.0 0.0 0.0 ) ( 0.0 0.0 0.0 )
}

mesh {
	shader ""
	numverts 3
	vert 0 ( 0.0 0.0 ) 0 1
	vert 1 ( 1.0 0.0 ) 1 1
	vert 2 ( 0.0 1.0 ) 2 1
	numtris 1
	tri 0 0 1 2
	numweights 3
	weight 0 0 1.0 ( 0.0 0.0 0.0 )
	weight 1 0 1.0 ( 1.0 0.0 0.0 )
	weight 2 0 1.0 ( 0.0 1.0 0.0 )
}
"#;

const MD5_ANIM: &str = r#"
MD5Version 10
commandline ""
numFrames 2
numJoints 1
frameRate 24
numAnimatedComponents 1

hierarchy {
	"origin" -1 1 0
}

bounds {
	( -1 -1 -1 ) ( 2 2 2 )
}

baseframe {
	( 0 0 0 ) ( 0 0 0 )
}

frame 0 {
	0.0
}

frame 1 {
	2.0
}
"#;

const GLTF_TRIANGLE: &str = r#"{
  "asset": {"version": "2.0"},
  "scene": 0,
  "scenes": [{"nodes": [0]}],
  "nodes": [{"mesh": 0, "name": "tri"}],
  "meshes": [{"name": "tri", "primitives": [{"attributes": {"POSITION": 0}}]}],
  "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}],
  "bufferViews": [{"buffer": 0, "byteOffset": 0, "byteLength": 36}],
  "buffers": [{"byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"}]
}"#;

/// Temp directory scoped to one test, removed on drop.
struct Workdir(PathBuf);

impl Workdir {
    fn new(tag: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = std::env::temp_dir().join(format!("marionette_{tag}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.0.join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

// ============================================================================
// MD5
// ============================================================================

#[test]
fn md5_load_bakes_meshes_and_one_clip() {
    let dir = Workdir::new("md5_ok");
    let mesh_path = dir.write("walker.md5mesh", MD5_MESH);
    let anim_path = dir.write("walk.md5anim", MD5_ANIM);

    let mut textures = TextureCache::new(&dir.0);
    let model = load_md5_model(&mesh_path, &anim_path, &mut textures).unwrap();

    assert_eq!(model.meshes.len(), 1);
    let mesh = &model.meshes[0];
    assert!(mesh.is_skinned());
    assert!((mesh.positions[1] - Vec3::X).length() < 1e-6);
    assert!((mesh.bounding_radius - 1.0).abs() < 1e-6);

    // Clip named after the anim file stem.
    let clip = model.animations.get("walk").expect("clip 'walk'");
    assert_eq!(clip.frame_count(), 2);
    assert!((clip.duration() - 2.0 / 24.0).abs() < 1e-9);

    // Frame 1 overrides the root x position; bind pose is at the origin so
    // the skinning matrix translates vertices by 2 along X.
    let moved = clip.frames()[1].joint_matrix(0).transform_point3(Vec3::ZERO);
    assert!((moved - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6, "got {moved}");
}

#[test]
fn md5_joint_count_mismatch_is_an_import_error() {
    let dir = Workdir::new("md5_mismatch");
    let mesh_path = dir.write("walker.md5mesh", MD5_MESH);
    let anim = MD5_ANIM
        .replace("numJoints 1", "numJoints 2")
        .replace(
            "\t\"origin\" -1 1 0\n",
            "\t\"origin\" -1 1 0\n\t\"arm\" 0 0 0\n",
        )
        .replace(
            "\t( 0 0 0 ) ( 0 0 0 )\n}",
            "\t( 0 0 0 ) ( 0 0 0 )\n\t( 0 1 0 ) ( 0 0 0 )\n}",
        );
    let anim_path = dir.write("walk.md5anim", &anim);

    let mut textures = TextureCache::new(&dir.0);
    let err = load_md5_model(&mesh_path, &anim_path, &mut textures).unwrap_err();
    assert!(matches!(err, MarionetteError::Import(_)), "got {err}");
}

#[test]
fn md5_truncated_frame_stream_is_rejected() {
    let dir = Workdir::new("md5_underflow");
    let mesh_path = dir.write("walker.md5mesh", MD5_MESH);
    let anim = MD5_ANIM.replace("frame 1 {\n\t2.0\n}", "frame 1 {\n}");
    let anim_path = dir.write("walk.md5anim", &anim);

    let mut textures = TextureCache::new(&dir.0);
    let err = load_md5_model(&mesh_path, &anim_path, &mut textures).unwrap_err();
    assert!(
        matches!(err, MarionetteError::FrameDataUnderflow { .. }),
        "got {err}"
    );
}

#[test]
fn md5_missing_file_is_an_io_error() {
    let dir = Workdir::new("md5_missing");
    let anim_path = dir.write("walk.md5anim", MD5_ANIM);
    let mut textures = TextureCache::new(&dir.0);
    let err = load_md5_model(&dir.0.join("nope.md5mesh"), &anim_path, &mut textures)
        .unwrap_err();
    assert!(matches!(err, MarionetteError::Io(_)));
}

// ============================================================================
// glTF
// ============================================================================

#[test]
fn gltf_triangle_loads_with_defaults() {
    let dir = Workdir::new("gltf_ok");
    let path = dir.write("tri.gltf", GLTF_TRIANGLE);

    let mut textures = TextureCache::new(&dir.0);
    let model = load_gltf_model(&path, &mut textures).unwrap();

    assert_eq!(model.meshes.len(), 1);
    let mesh = &model.meshes[0];
    assert_eq!(mesh.name, "tri");
    assert_eq!(mesh.positions.len(), 3);
    assert!(!mesh.is_skinned(), "no skin in the document");
    assert_eq!(mesh.indices, vec![0, 1, 2], "indices synthesized in order");
    assert!(model.animations.is_empty());
}

#[test]
fn gltf_garbage_is_a_gltf_error() {
    let dir = Workdir::new("gltf_bad");
    let path = dir.write("bad.gltf", "{ not valid json ]");
    let mut textures = TextureCache::new(&dir.0);
    let err = load_gltf_model(&path, &mut textures).unwrap_err();
    assert!(matches!(err, MarionetteError::Gltf(_)), "got {err}");
}
