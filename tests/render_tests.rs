//! Frame Renderer Tests
//!
//! Tests using a recording backend double:
//! - Pass ordering (shadow cascades before the scene pass)
//! - Shadow-map re-render gating on the scene changed flag
//! - Culled items excluded from submission
//! - Instanced batches collapsing into one draw

use glam::{Mat4, Vec2, Vec3};

use marionette::backend::{CascadeUniform, DrawCall, InstanceTransform, RenderBackend};
use marionette::render::FrameRenderer;
use marionette::scene::{Material, Mesh, MeshKind, Scene, SceneItem};
use marionette::shadow::CASCADE_COUNT;

#[derive(Debug, PartialEq)]
enum Call {
    ShadowPass(usize),
    ScenePass,
    Draw { selected: bool },
    DrawInstanced { instances: usize },
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    fn shadow_passes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::ShadowPass(_)))
            .count()
    }

    fn draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Draw { .. }))
            .count()
    }
}

impl RenderBackend for Recorder {
    fn begin_shadow_pass(&mut self, cascade: usize, _light_view: &Mat4, _ortho: &Mat4) {
        self.calls.push(Call::ShadowPass(cascade));
    }

    fn begin_scene_pass(
        &mut self,
        _view: &Mat4,
        _projection: &Mat4,
        cascades: &[CascadeUniform; CASCADE_COUNT],
    ) {
        assert!(
            cascades[0].split_distance < cascades[CASCADE_COUNT - 1].split_distance,
            "cascade uniforms arrive nearest first"
        );
        self.calls.push(Call::ScenePass);
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        self.calls.push(Call::Draw {
            selected: call.selected,
        });
    }

    fn draw_instanced(&mut self, _mesh: &Mesh, instances: &[InstanceTransform]) {
        self.calls.push(Call::DrawInstanced {
            instances: instances.len(),
        });
    }
}

fn quad(kind: MeshKind) -> Mesh {
    let mut mesh = Mesh::new(
        "quad",
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        vec![Vec3::Z; 4],
        vec![Vec2::ZERO; 4],
        vec![0, 1, 2, 0, 2, 3],
        Material::default(),
    );
    mesh.kind = kind;
    mesh
}

fn item_at(z: f32) -> SceneItem {
    let mut item = SceneItem::new();
    item.position = Vec3::new(0.0, 0.0, z);
    item
}

#[test]
fn shadow_cascades_come_before_the_scene_pass() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(quad(MeshKind::Standard));
    scene.spawn(item_at(-5.0), &[mesh]);
    scene.camera.update_view_matrix();

    let mut renderer = FrameRenderer::new(1.0);
    let mut backend = Recorder::default();
    renderer.render(&mut scene, &mut backend);

    let scene_pass = backend
        .calls
        .iter()
        .position(|c| *c == Call::ScenePass)
        .expect("scene pass must run");
    for index in 0..CASCADE_COUNT {
        let shadow = backend
            .calls
            .iter()
            .position(|c| *c == Call::ShadowPass(index))
            .unwrap_or_else(|| panic!("missing shadow pass {index}"));
        assert!(shadow < scene_pass);
    }
}

#[test]
fn shadow_maps_skip_unchanged_frames() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(quad(MeshKind::Standard));
    scene.spawn(item_at(-5.0), &[mesh]);
    scene.camera.update_view_matrix();

    let mut renderer = FrameRenderer::new(1.0);

    let mut first = Recorder::default();
    renderer.render(&mut scene, &mut first);
    assert_eq!(first.shadow_passes(), CASCADE_COUNT);

    // Nothing changed: the depth maps stay valid, only the scene pass runs.
    let mut second = Recorder::default();
    renderer.render(&mut scene, &mut second);
    assert_eq!(second.shadow_passes(), 0);
    assert!(second.calls.contains(&Call::ScenePass));

    scene.mark_changed();
    let mut third = Recorder::default();
    renderer.render(&mut scene, &mut third);
    assert_eq!(third.shadow_passes(), CASCADE_COUNT);
}

#[test]
fn culled_items_are_not_submitted() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(quad(MeshKind::Standard));
    scene.spawn(item_at(-5.0), &[mesh]);
    scene.spawn(item_at(50.0), &[mesh]); // behind the camera
    scene.camera.update_view_matrix();

    let mut renderer = FrameRenderer::new(1.0);
    let mut backend = Recorder::default();
    renderer.render(&mut scene, &mut backend);

    // One visible item, drawn once per shadow cascade and once in the
    // scene pass.
    assert_eq!(backend.draws(), CASCADE_COUNT + 1);
}

#[test]
fn instanced_batch_is_a_single_draw() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(quad(MeshKind::Instanced));
    scene.spawn(item_at(-5.0), &[mesh]);
    scene.spawn(item_at(-6.0), &[mesh]);
    scene.spawn(item_at(-7.0), &[mesh]);
    scene.camera.update_view_matrix();

    let mut renderer = FrameRenderer::new(1.0);
    let mut backend = Recorder::default();
    renderer.render(&mut scene, &mut backend);

    let instanced: Vec<_> = backend
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::DrawInstanced { instances } => Some(*instances),
            _ => None,
        })
        .collect();
    // Once per cascade plus the scene pass, three instances each time.
    assert_eq!(instanced, vec![3; CASCADE_COUNT + 1]);
}

#[test]
fn selection_flag_reaches_the_backend() {
    let mut scene = Scene::new();
    let mesh = scene.add_mesh(quad(MeshKind::Standard));
    let mut item = item_at(-5.0);
    item.selected = true;
    scene.spawn(item, &[mesh]);
    scene.camera.update_view_matrix();
    scene.clear_changed(); // scene pass only

    let mut renderer = FrameRenderer::new(1.0);
    let mut backend = Recorder::default();
    renderer.render(&mut scene, &mut backend);

    assert_eq!(backend.calls.len(), 2);
    assert_eq!(backend.calls[0], Call::ScenePass);
    assert_eq!(backend.calls[1], Call::Draw { selected: true });
}
