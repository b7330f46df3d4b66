extern crate spark;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::seq::SliceRandom;

use spark::prelude::*;

const VS: &str = "in vec3 Position; void main() { gl_Position = vec4(Position, 1.0); }";
const FS: &str = "void main() {}";

fn video() -> (VideoSystem, TraceLog) {
    let _ = env_logger::builder().is_test(true).try_init();

    let trace = TraceLog::default();
    let visitor = Box::new(HeadlessVisitor::with_trace(trace.clone()));
    let video = VideoSystem::new(visitor, VideoParams::default()).unwrap();
    trace.lock().clear();
    (video, trace)
}

fn shader(video: &mut VideoSystem, name: &str) -> ShaderHandle {
    let params = ShaderParams {
        attributes: AttributeLayout::build()
            .with(Attribute::Position, 3)
            .finish(),
    };

    let handle = video.create_shader(name, params, VS, FS);
    assert!(!video.is_error_shader(handle));
    handle
}

fn renderable(video: &mut VideoSystem, name: &str) -> RenderableRef {
    let mut params = MeshParams::default();
    params.layout = VertexLayout::build()
        .with(Attribute::Position, VertexFormat::Float, 3, false)
        .finish();
    params.num_verts = 3;

    let mesh = video.create_mesh(params, None).unwrap();
    Renderable::new(name, Drawable::Mesh(MeshDrawable::new(mesh))).into_ref()
}

fn pass(name: &str, priority: i32, material: Option<MaterialRef>) -> RenderPassRef {
    let target = RenderTarget::frame_buffer(Viewport::new(0, 0, 800, 600)).into_ref();
    let mut pass = RenderPass::new(name);
    pass.initialize(target, Projection::default().into_ref(), priority);
    pass.use_default_material(material);
    pass.into_ref()
}

fn draws(trace: &TraceLog) -> Vec<ShaderHandle> {
    trace
        .lock()
        .iter()
        .filter_map(|v| match v {
            Trace::Draw(shader, _, _) => Some(*shader),
            _ => None,
        })
        .collect()
}

fn count<F: Fn(&Trace) -> bool>(trace: &TraceLog, f: F) -> usize {
    trace.lock().iter().filter(|v| f(v)).count()
}

#[test]
fn shadow_before_color() {
    let (mut video, trace) = video();
    let shadow = shader(&mut video, "shadow");
    let color = shader(&mut video, "color");

    let object = renderable(&mut video, "tissue");
    object
        .write()
        .set_material("Shadow", Material::new("shadow").into_ref());
    object
        .write()
        .set_material("Color", Material::new("color").into_ref());

    let mut scene = Scene::default();
    scene.add_pass(pass("Color", 1, None));
    scene.add_pass(pass("Shadow", 10, None));
    scene.add_renderable(object);

    scene.prepare_render_commands();
    assert_eq!(scene.queued_commands(), 2);

    let stats = scene.render(&mut video);
    assert_eq!(stats.commands, 2);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(draws(&trace), vec![shadow, color]);
    assert_eq!(scene.passes()[0].read().name(), "Shadow");
}

#[test]
fn explicit_material_required() {
    let (mut video, trace) = video();
    shader(&mut video, "overlay");

    let strict = renderable(&mut video, "strict");
    strict.write().set_requires_explicit_material(true);

    let mut scene = Scene::default();
    scene.add_pass(pass(
        "Overlay",
        0,
        Some(Material::new("overlay").into_ref()),
    ));
    scene.add_renderable(strict);

    scene.prepare_render_commands();
    assert_eq!(scene.queued_commands(), 0);

    let stats = scene.render(&mut video);
    assert_eq!(stats.commands, 0);
    assert!(draws(&trace).is_empty());

    // The target is cleared even if nothing is drawn into it.
    assert_eq!(count(&trace, |v| matches!(v, Trace::Clear(..))), 1);
}

#[test]
fn passes_execute_by_priority() {
    let (mut video, trace) = video();
    let mut rng = rand::thread_rng();

    let mut priorities: Vec<i32> = (0..8).map(|v| v * 3 - 7).collect();
    priorities.shuffle(&mut rng);

    let mut scene = Scene::default();
    let mut programs = Vec::new();
    for &priority in &priorities {
        let name = format!("pass{}", priority);
        programs.push((shader(&mut video, &name), priority));

        let material = Material::new(name.as_str()).into_ref();
        scene.add_pass(pass(&name, priority, Some(material)));
    }

    for i in 0..4 {
        let r = renderable(&mut video, &format!("r{}", i));
        scene.add_renderable(r);
    }

    scene.prepare_render_commands();
    assert_eq!(scene.queued_commands(), 32);
    scene.render(&mut video);

    let priority_of = |shader: ShaderHandle| {
        programs
            .iter()
            .find(|v| v.0 == shader)
            .map(|v| v.1)
            .unwrap()
    };

    let drawn: Vec<i32> = draws(&trace).into_iter().map(priority_of).collect();
    assert_eq!(drawn.len(), 32);
    assert!(drawn.windows(2).all(|v| v[0] >= v[1]));
}

#[test]
fn queue_drains() {
    let (mut video, _) = video();

    let mut scene = Scene::default();
    scene.prepare_render_commands();
    scene.render(&mut video);
    assert_eq!(scene.queued_commands(), 0);

    shader(&mut video, "flat");
    scene.add_pass(pass("a", 2, Some(Material::new("flat").into_ref())));
    scene.add_pass(pass("b", 1, Some(Material::new("flat").into_ref())));
    for i in 0..5 {
        let r = renderable(&mut video, &format!("r{}", i));
        scene.add_renderable(r);
    }

    for _ in 0..3 {
        scene.prepare_render_commands();
        assert_eq!(scene.queued_commands(), 10);
        let stats = scene.render(&mut video);
        assert_eq!(stats.commands, 10);
        assert_eq!(scene.queued_commands(), 0);
    }
}

#[test]
fn pass_transitions_bracket_runs() {
    let (mut video, trace) = video();
    shader(&mut video, "flat");

    let material = Material::new("flat").into_ref();
    let mut scene = Scene::default();
    scene.add_pass(pass("a", 3, Some(material.clone())));
    scene.add_pass(pass("b", 2, Some(material.clone())));
    scene.add_pass(pass("empty", 1, None));

    for i in 0..4 {
        let r = renderable(&mut video, &format!("r{}", i));
        scene.add_renderable(r);
    }

    scene.prepare_render_commands();
    let stats = scene.render(&mut video);

    // One run per pass which has commands, however many commands it has.
    assert_eq!(stats.commands, 8);
    assert_eq!(stats.pass_transitions, 2);
    assert_eq!(count(&trace, |v| matches!(v, Trace::RenderState(_))), 2);

    // Every initialized pass clears its target once.
    assert_eq!(count(&trace, |v| matches!(v, Trace::Clear(..))), 3);

    // The same material and program is shared by all commands.
    assert_eq!(stats.program_switches, 1);
    assert_eq!(count(&trace, |v| matches!(v, Trace::UseProgram(_))), 1);
}

#[test]
fn broken_shader_draws_with_error_shader() {
    let (mut video, trace) = video();
    let broken = video.create_shader("broken", ShaderParams::default(), VS, "#error oops");
    assert_eq!(broken, video.error_shader());

    let mut scene = Scene::default();
    scene.add_pass(pass("a", 0, Some(Material::new("broken").into_ref())));
    scene.add_pass(pass("b", 0, Some(Material::new("missing").into_ref())));
    let r = renderable(&mut video, "r");
    scene.add_renderable(r);

    scene.prepare_render_commands();
    let stats = scene.render(&mut video);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(draws(&trace), vec![video.error_shader(), video.error_shader()]);
}

#[test]
fn uninitialized_pass_is_skipped() {
    let (mut video, trace) = video();
    shader(&mut video, "flat");

    let mut orphan = RenderPass::new("orphan");
    orphan.use_default_material(Some(Material::new("flat").into_ref()));

    let mut scene = Scene::default();
    scene.add_pass(orphan.into_ref());
    let r = renderable(&mut video, "r");
    scene.add_renderable(r);
    trace.lock().clear();

    scene.prepare_render_commands();
    assert_eq!(scene.queued_commands(), 0);
    scene.render(&mut video);
    assert!(trace.lock().is_empty());
}

#[test]
fn duplicates_are_permitted() {
    let (mut video, _) = video();
    shader(&mut video, "flat");

    let p = pass("a", 0, Some(Material::new("flat").into_ref()));
    let r = renderable(&mut video, "r");

    let mut scene = Scene::default();
    scene.add_pass(p.clone());
    scene.add_renderable(r.clone());
    scene.add_renderable(r);

    assert!(scene.pass("a").is_some());
    assert!(scene.pass("b").is_none());
    assert_eq!(scene.renderables().len(), 2);

    scene.prepare_render_commands();
    assert_eq!(scene.queued_commands(), 2);
    scene.render(&mut video);
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<(&'static str, f32)>>>,
}

impl Updateable for Recorder {
    fn update(&mut self, dt: f32) {
        self.log.lock().push((self.name, dt));
    }
}

#[test]
fn update_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut scene = Scene::default();
    for &name in &["fluid", "sparks", "tissue"] {
        scene.add_updateable(Arc::new(Mutex::new(Recorder {
            name,
            log: log.clone(),
        })));
    }

    scene.update(0.5);
    scene.update(0.25);

    assert_eq!(
        *log.lock(),
        vec![
            ("fluid", 0.5),
            ("sparks", 0.5),
            ("tissue", 0.5),
            ("fluid", 0.25),
            ("sparks", 0.25),
            ("tissue", 0.25),
        ]
    );
}

#[test]
fn async_updateables() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::new(Mutex::new(Recorder {
        name: "sparks",
        log: log.clone(),
    }));

    let mut scene = Scene::default();
    scene.add_async_updateable("sparks", recorder).unwrap();
    assert_eq!(scene.num_async_tasks(), 1);
    assert!(scene.tasks()[0].is_running());

    scene.deactivate();
    assert!(scene.tasks()[0].is_paused());

    scene.activate();
    assert!(scene.tasks()[0].is_running());

    let ts = Instant::now();
    while log.lock().is_empty() && ts.elapsed() < Duration::from_secs(2) {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(!log.lock().is_empty());

    scene.reset();
    assert_eq!(scene.num_async_tasks(), 0);
    assert!(scene.passes().is_empty());

    // Stopped for good, not merely paused.
    let updates = log.lock().len();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(log.lock().len(), updates);
}
