//! Skeletal Animation Tests
//!
//! Tests for:
//! - Clip frame stepping and wrap-around
//! - Hierarchical frame building (node arena path)
//! - Flat frame building (sparse delta path)
//! - Skinning matrix round trips in bind pose

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

use marionette::animation::{
    build_flat_frame, build_hierarchical_frame, inverse_bind_matrices, quat_from_xyz,
    AnimatedFrame, Animation, Bone, BoneBinding, FlatJointSpec, FrameFlags, Joint, Skeleton,
};
use marionette::scene::{NodeArena, SceneItem};

const EPSILON: f32 = 1e-5;

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Clip stepping
// ============================================================================

#[test]
fn next_frame_wraps_to_zero() {
    let frames = vec![AnimatedFrame::new(), AnimatedFrame::new(), AnimatedFrame::new()];
    let mut clip = Animation::new("walk", frames, 1.0);
    assert_eq!(clip.current_frame_index(), 0);
    clip.next_frame();
    clip.next_frame();
    assert_eq!(clip.current_frame_index(), 2);
    clip.next_frame();
    assert_eq!(clip.current_frame_index(), 0, "last frame should wrap to 0");
}

#[test]
fn stepping_a_full_cycle_is_identity() {
    let frames = vec![AnimatedFrame::new(); 5];
    let mut clip = Animation::new("cycle", frames, 1.0);
    clip.next_frame();
    let start = clip.current_frame_index();
    for _ in 0..clip.frame_count() {
        clip.next_frame();
    }
    assert_eq!(clip.current_frame_index(), start);
}

#[test]
fn playback_state_switches_clips_by_name() {
    let mut animations = HashMap::new();
    animations.insert(
        "idle".to_string(),
        Animation::new("idle", vec![AnimatedFrame::new()], 1.0),
    );
    animations.insert(
        "run".to_string(),
        Animation::new("run", vec![AnimatedFrame::new()], 0.5),
    );
    let mut item = SceneItem::animated(animations);
    let state = item.animation.as_mut().expect("two clips were provided");

    assert!(state.play("run"));
    assert_eq!(state.current_animation().name(), "run");
    assert!(!state.play("swim"), "unknown clip must be rejected");
    assert_eq!(state.current_animation().name(), "run");
}

// ============================================================================
// Hierarchical frame building
// ============================================================================

/// Three-node chain, each child one unit up from its parent, with a bone on
/// every node whose offset matrix is the bind-pose inverse.
fn chain_setup() -> (NodeArena, Vec<Bone>, Vec<BoneBinding>) {
    let mut arena = NodeArena::new();
    let root = arena.push("root", Mat4::IDENTITY, None).unwrap();
    let mid = arena
        .push("mid", Mat4::from_translation(Vec3::Y), Some(root))
        .unwrap();
    let tip = arena
        .push("tip", Mat4::from_translation(Vec3::Y), Some(mid))
        .unwrap();

    // Bind-pose globals are translations by 0, 1, 2 units of Y.
    let bones = vec![
        Bone::new(0, "root", Mat4::IDENTITY),
        Bone::new(1, "mid", Mat4::from_translation(-Vec3::Y)),
        Bone::new(2, "tip", Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0))),
    ];
    let bindings = vec![
        BoneBinding { node: root, bone: 0 },
        BoneBinding { node: mid, bone: 1 },
        BoneBinding { node: tip, bone: 2 },
    ];
    (arena, bones, bindings)
}

#[test]
fn bind_pose_produces_identity_skinning_matrices() {
    let (arena, bones, bindings) = chain_setup();
    let locals = arena.local_transforms();
    let frame =
        build_hierarchical_frame(&arena, &locals, &bones, &bindings, Mat4::IDENTITY).unwrap();

    for (id, vertex) in [(0, Vec3::ZERO), (1, Vec3::Y), (2, Vec3::new(0.0, 2.0, 0.0))] {
        let skinned = frame.joint_matrix(id).transform_point3(vertex);
        assert!(
            approx_vec(skinned, vertex),
            "bind pose must not move vertices: joint {id} moved {vertex} to {skinned}"
        );
    }
}

#[test]
fn root_rotation_propagates_to_the_tip() {
    let (arena, bones, bindings) = chain_setup();
    let mut locals = arena.local_transforms();
    // Bend the whole chain 90 degrees about Z at the root.
    locals[0] = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let frame =
        build_hierarchical_frame(&arena, &locals, &bones, &bindings, Mat4::IDENTITY).unwrap();

    // A vertex bound to the tip at its bind position swings to (-2, 0, 0).
    let skinned = frame.joint_matrix(2).transform_point3(Vec3::new(0.0, 2.0, 0.0));
    assert!(
        approx_vec(skinned, Vec3::new(-2.0, 0.0, 0.0)),
        "got {skinned}"
    );
}

#[test]
fn global_inverse_root_cancels_a_root_offset() {
    let (arena, bones, bindings) = chain_setup();
    let mut locals = arena.local_transforms();
    let offset = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
    locals[0] = offset;

    let frame = build_hierarchical_frame(&arena, &locals, &bones, &bindings, offset.inverse())
        .unwrap();
    let skinned = frame.joint_matrix(1).transform_point3(Vec3::Y);
    assert!(approx_vec(skinned, Vec3::Y), "got {skinned}");
}

#[test]
fn unbound_slots_stay_identity() {
    let (arena, bones, _) = chain_setup();
    let locals = arena.local_transforms();
    // Bind only the tip; the other slots must remain identity.
    let bindings = [BoneBinding { node: 2, bone: 2 }];
    let frame =
        build_hierarchical_frame(&arena, &locals, &bones, &bindings, Mat4::IDENTITY).unwrap();
    assert_eq!(frame.joint_matrix(0), Mat4::IDENTITY);
    assert_eq!(frame.joint_matrix(1), Mat4::IDENTITY);
}

// ============================================================================
// Flat frame building
// ============================================================================

fn flat_skeleton() -> Skeleton {
    Skeleton::new(vec![
        Joint {
            name: "root".to_string(),
            parent: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        },
        Joint {
            name: "tip".to_string(),
            parent: Some(0),
            position: Vec3::Y,
            orientation: Quat::IDENTITY,
        },
    ])
    .unwrap()
}

#[test]
fn bind_pose_round_trip_with_blended_weights() {
    let base = flat_skeleton();
    // Model-space bind skeleton matches the base frame here, so the frame
    // with no deltas must reproduce bind positions through any weight blend.
    let inv = inverse_bind_matrices(
        &Skeleton::new(vec![
            Joint {
                name: "root".to_string(),
                parent: None,
                position: Vec3::ZERO,
                orientation: Quat::IDENTITY,
            },
            Joint {
                name: "tip".to_string(),
                parent: None,
                position: Vec3::Y,
                orientation: Quat::IDENTITY,
            },
        ])
        .unwrap(),
    );
    let specs = [
        FlatJointSpec { flags: FrameFlags::empty(), start_index: 0 },
        FlatJointSpec { flags: FrameFlags::empty(), start_index: 0 },
    ];
    let frame = build_flat_frame(&base, &specs, &[], &inv).unwrap();

    let vertex = Vec3::new(0.3, 0.5, 0.0);
    let blended = frame.joint_matrix(0).transform_point3(vertex) * 0.7
        + frame.joint_matrix(1).transform_point3(vertex) * 0.3;
    assert!(
        approx_vec(blended, vertex),
        "0.7/0.3 blend in bind pose moved {vertex} to {blended}"
    );
}

#[test]
fn sparse_deltas_only_touch_flagged_joints() {
    let base = flat_skeleton();
    let inv = vec![Mat4::IDENTITY; 2];
    let specs = [
        FlatJointSpec { flags: FrameFlags::POS_Z, start_index: 0 },
        FlatJointSpec { flags: FrameFlags::empty(), start_index: 1 },
    ];
    let frame = build_flat_frame(&base, &specs, &[4.0], &inv).unwrap();

    let root = frame.joint_matrix(0).transform_point3(Vec3::ZERO);
    assert!(approx_vec(root, Vec3::new(0.0, 0.0, 4.0)));
    // Tip inherits the parent delta plus its unchanged base offset.
    let tip = frame.joint_matrix(1).transform_point3(Vec3::ZERO);
    assert!(approx_vec(tip, Vec3::new(0.0, 1.0, 4.0)));
}

// ============================================================================
// Orientation reconstruction
// ============================================================================

#[test]
fn reconstructed_quaternion_is_unit_length() {
    let q = quat_from_xyz(0.2, -0.4, 0.1);
    assert!((q.length() - 1.0).abs() < EPSILON);
    assert!(q.w >= 0.0, "w takes the non-negative root");
}

#[test]
fn overlong_xyz_clamps_instead_of_nan() {
    let q = quat_from_xyz(0.9, 0.9, 0.9);
    assert!(q.w.abs() < EPSILON);
    assert!(!q.w.is_nan());
}
