extern crate spark;

use spark::prelude::*;
use spark::scene::create_render_command;

fn video() -> (VideoSystem, TraceLog) {
    let trace = TraceLog::default();
    let visitor = Box::new(HeadlessVisitor::with_trace(trace.clone()));
    let video = VideoSystem::new(visitor, VideoParams::default()).unwrap();
    trace.lock().clear();
    (video, trace)
}

fn pass(name: &str, material: Option<MaterialRef>) -> RenderPassRef {
    let mut pass = RenderPass::new(name);
    pass.initialize(
        RenderTarget::frame_buffer(Viewport::new(0, 0, 320, 240)).into_ref(),
        Projection::default().into_ref(),
        0,
    );
    pass.use_default_material(material);
    pass.into_ref()
}

fn renderable(name: &str) -> RenderableRef {
    let drawable = Drawable::Mesh(MeshDrawable::new(MeshHandle::default()));
    Renderable::new(name, drawable).into_ref()
}

#[test]
fn explicit_material_wins() {
    let fallback = Material::new("flat").into_ref();
    let explicit = Material::new("phong").into_ref();
    let p = pass("Color", Some(fallback.clone()));

    let r = renderable("tissue");
    r.write().set_material("Color", explicit.clone());

    let command = create_render_command(&p, &r).unwrap();
    assert!(std::sync::Arc::ptr_eq(command.material(), &explicit));

    // Explicit materials of other passes do not count.
    let other = renderable("bone");
    other.write().set_material("Shadow", explicit);
    let command = create_render_command(&p, &other).unwrap();
    assert!(std::sync::Arc::ptr_eq(command.material(), &fallback));
}

#[test]
fn explicit_material_required() {
    let p = pass("Overlay", Some(Material::new("flat").into_ref()));

    let r = renderable("strict");
    r.write().set_requires_explicit_material(true);
    assert!(create_render_command(&p, &r).is_none());

    r.write()
        .set_material("Overlay", Material::new("phong").into_ref());
    assert!(create_render_command(&p, &r).is_some());

    r.write().remove_material("Overlay");
    assert!(create_render_command(&p, &r).is_none());
}

#[test]
fn no_default_material() {
    let p = pass("Color", None);
    assert!(create_render_command(&p, &renderable("tissue")).is_none());
}

#[test]
fn commands_carry_pass_state() {
    let mut illumination = Illumination::new(Color::new(0.1, 0.1, 0.1, 1.0));
    illumination.add_light(Light::new(Color::white()));
    let illumination = std::sync::Arc::new(illumination);

    let p = pass("Color", Some(Material::new("flat").into_ref()));
    p.write().set_priority(7);
    p.write().set_illumination(Some(illumination.clone()));

    let command = create_render_command(&p, &renderable("tissue")).unwrap();
    assert_eq!(command.priority(), 7);
    assert!(std::sync::Arc::ptr_eq(
        command.illumination().unwrap(),
        &illumination
    ));
    assert!(command.shader().is_none());
}

#[test]
fn group_assigns_materials() {
    let p = pass("Color", None);
    let material = Material::new("phong").into_ref();

    let mut group = scene::RenderableGroup::new();
    group.add(renderable("a"));
    group.add(renderable("b"));
    group.set_material("Color", &material);
    group.set_requires_explicit_material(true);

    for r in group.members() {
        let command = create_render_command(&p, r).unwrap();
        assert!(std::sync::Arc::ptr_eq(command.material(), &material));
        assert!(r.read().requires_explicit_material());
    }
}

#[test]
fn pre_render_applies_render_state() {
    let (mut video, trace) = video();

    let mut pass = RenderPass::new("Glow");
    pass.initialize(
        RenderTarget::frame_buffer(Viewport::new(0, 0, 320, 240)).into_ref(),
        Projection::default().into_ref(),
        0,
    );
    pass.use_additive_blending();
    pass.set_depth(true, false);

    pass.pre_render(&mut video, None).unwrap();
    pass.post_render(&mut video, None).unwrap();

    assert_eq!(
        *trace.lock(),
        vec![
            Trace::BindSurface(None, SurfaceViewport::new(0, 0, 320, 240)),
            Trace::RenderState(pass.render_state()),
        ]
    );

    let state = pass.render_state();
    assert_eq!(
        state.color_blend,
        Some((Equation::Add, BlendFactor::Value(BlendValue::SourceAlpha), BlendFactor::One))
    );
    assert!(!state.depth_write);
}

#[test]
fn uninitialized_pass_fails() {
    let (mut video, trace) = video();

    let pass = RenderPass::new("orphan");
    assert!(!pass.is_initialized());
    assert!(pass.pre_render(&mut video, None).is_err());
    assert!(pass.start_frame(&mut video, None).is_err());
    assert!(pass.post_render(&mut video, None).is_err());
    assert!(trace.lock().is_empty());
}
