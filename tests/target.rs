extern crate spark;

use spark::prelude::*;
use spark::math::Vector2;

fn video() -> (VideoSystem, TraceLog) {
    let trace = TraceLog::default();
    let visitor = Box::new(HeadlessVisitor::with_trace(trace.clone()));
    let video = VideoSystem::new(visitor, VideoParams::default()).unwrap();
    trace.lock().clear();
    (video, trace)
}

fn clears(trace: &TraceLog) -> Vec<(Option<Color>, Option<f32>)> {
    trace
        .lock()
        .iter()
        .filter_map(|v| match v {
            Trace::Clear(color, depth) => Some((*color, *depth)),
            _ => None,
        })
        .collect()
}

#[test]
fn scaled_target_follows_viewport() {
    let (mut video, _) = video();

    let mut target = RenderTarget::scaled_texture(
        "bloom",
        TextureTargetKind::ColorAndDepth,
        Vector2::new(0.5, 0.5),
        Viewport::new(0, 0, 800, 600),
    );

    assert_eq!(target.size(), Vector2::new(400, 300));
    assert_eq!(target.texture_name(), Some("bloom"));

    target.initialize(&mut video).unwrap();
    let before = video.texture("bloom").unwrap();
    assert_eq!(
        video.texture_params(before).unwrap().dimensions,
        Vector2::new(400, 300)
    );

    target
        .resize_viewport(&mut video, Viewport::new(0, 0, 1024, 768))
        .unwrap();
    assert_eq!(target.size(), Vector2::new(512, 384));

    // The name resolves to the re-created texture, the old one is gone.
    let after = video.texture("bloom").unwrap();
    assert_ne!(before, after);
    assert!(video.texture_params(before).is_none());
    assert_eq!(
        video.texture_params(after).unwrap().dimensions,
        Vector2::new(512, 384)
    );

    // Same dimensions, nothing is re-allocated.
    target
        .resize_viewport(&mut video, Viewport::new(0, 0, 1024, 768))
        .unwrap();
    assert_eq!(video.texture("bloom"), Some(after));
}

#[test]
fn scaled_target_allocates_lazily() {
    let (mut video, _) = video();

    let mut target = RenderTarget::scaled_texture(
        "blur",
        TextureTargetKind::ColorOnly,
        Vector2::new(0.25, 0.25),
        Viewport::new(0, 0, 800, 600),
    );

    target
        .resize_viewport(&mut video, Viewport::new(0, 0, 400, 400))
        .unwrap();
    assert!(video.texture("blur").is_none());

    target.pre_render(&mut video).unwrap();
    let texture = video.texture("blur").unwrap();
    assert_eq!(
        video.texture_params(texture).unwrap().dimensions,
        Vector2::new(100, 100)
    );
}

#[test]
fn frame_buffer_follows_viewport() {
    let (mut video, trace) = video();

    let mut target = RenderTarget::frame_buffer(Viewport::new(0, 0, 800, 600));
    assert_eq!(target.texture_name(), None);

    target
        .resize_viewport(&mut video, Viewport::new(10, 20, 1024, 768))
        .unwrap();
    assert_eq!(target.size(), Vector2::new(1024, 768));

    target.pre_render(&mut video).unwrap();
    assert_eq!(
        *trace.lock(),
        vec![Trace::BindSurface(
            None,
            SurfaceViewport::new(10, 20, 1024, 768)
        )]
    );
}

#[test]
fn initialize_is_idempotent() {
    let (mut video, trace) = video();

    let mut target = RenderTarget::texture(
        "scene",
        TextureTargetKind::ColorAndDepth,
        Vector2::new(64, 64),
    );

    target.initialize(&mut video).unwrap();
    let texture = video.texture("scene").unwrap();
    let created = trace.lock().len();
    assert!(trace
        .lock()
        .iter()
        .any(|v| matches!(v, Trace::CreateRenderBuffer(_))));

    target.initialize(&mut video).unwrap();
    assert_eq!(trace.lock().len(), created);
    assert_eq!(video.texture("scene"), Some(texture));

    target.release(&mut video).unwrap();
    assert!(video.texture("scene").is_none());
}

#[test]
fn clears_per_kind() {
    let (mut video, trace) = video();
    let red = Color::new(1.0, 0.0, 0.0, 1.0);

    let mut color = RenderTarget::texture("color", TextureTargetKind::ColorOnly, Vector2::new(8, 8));
    color.set_clear_color(red);
    assert_eq!(color.clear_color(), red);

    let mut depth = RenderTarget::texture("shadow", TextureTargetKind::DepthOnly, Vector2::new(8, 8));
    let mut both =
        RenderTarget::texture("scene", TextureTargetKind::ColorAndDepth, Vector2::new(8, 8));
    let mut display = RenderTarget::frame_buffer(Viewport::new(0, 0, 8, 8));

    color.start_frame(&mut video).unwrap();
    depth.start_frame(&mut video).unwrap();
    both.start_frame(&mut video).unwrap();
    display.start_frame(&mut video).unwrap();

    assert_eq!(
        clears(&trace),
        vec![
            (Some(red), None),
            (None, Some(1.0)),
            (Some(Color::black()), Some(1.0)),
            (Some(Color::black()), Some(1.0)),
        ]
    );
}

#[test]
fn mipmaps_after_pass() {
    let (mut video, trace) = video();

    let mut target = RenderTarget::Texture(
        scene::TextureTarget::new("mirror", TextureTargetKind::ColorOnly, Vector2::new(16, 16))
            .with_mipmaps(true),
    );

    target.pre_render(&mut video).unwrap();
    target.post_render(&mut video).unwrap();

    let texture = video.texture("mirror").unwrap();
    assert!(video.texture_params(texture).unwrap().mipmap);
    assert_eq!(
        trace.lock().last(),
        Some(&Trace::GenerateMipmap(texture))
    );
}

#[test]
fn incomplete_surfaces() {
    let (mut video, _) = video();

    let empty = video.create_surface(SurfaceParams::default()).unwrap();
    assert!(video.check_surface(empty).is_err());

    let color = video
        .create_texture(
            "color",
            TextureParams {
                dimensions: Vector2::new(4, 4),
                ..Default::default()
            },
            None,
        )
        .unwrap();

    let depth = video
        .create_render_buffer(RenderBufferParams {
            format: RenderBufferFormat::Depth24,
            dimensions: Vector2::new(8, 8),
        })
        .unwrap();

    let mismatched = video
        .create_surface(SurfaceParams {
            color: Some(color),
            depth: SurfaceDepth::RenderBuffer(depth),
        })
        .unwrap();
    assert!(video.check_surface(mismatched).is_err());

    let complete = video
        .create_surface(SurfaceParams {
            color: Some(color),
            depth: SurfaceDepth::None,
        })
        .unwrap();
    assert!(video.check_surface(complete).is_ok());

    video.delete_surface(complete).unwrap();
    assert!(video.check_surface(complete).is_err());
}
