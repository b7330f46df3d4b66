//! The render command pipeline.
//!
//! A `Scene` owns render passes and renderables. A `RenderPass` draws into a
//! `RenderTarget` with a `Projection`, and resolves the `Material` each
//! `Renderable` is drawn with. Every frame the scene turns each (pass,
//! renderable) pair into a `RenderCommand`, orders the commands by pass
//! priority and applies them against the `VideoSystem`.

pub mod command;
pub mod errors;
pub mod illumination;
pub mod material;
pub mod pass;
pub mod projection;
pub mod renderable;
pub mod scene;
pub mod target;
pub mod uniforms;
pub mod viewport;

pub use self::command::{create_render_command, RenderCommand, RenderCommandQueue};
pub use self::illumination::{Illumination, Light};
pub use self::material::{Material, MaterialRef};
pub use self::pass::{Blending, RenderPass, RenderPassRef};
pub use self::projection::{Projection, ProjectionKind, ProjectionRef};
pub use self::renderable::{
    Draw, Drawable, MeshDrawable, PointBuffer, PointCloud, PointVertex, Renderable,
    RenderableGroup, RenderableRef,
};
pub use self::scene::{FrameStats, Scene};
pub use self::target::{
    FrameBufferTarget, RenderTarget, RenderTargetRef, ScaledTextureTarget, TextureTarget,
    TextureTargetKind,
};
pub use self::uniforms::{RenderUniform, MAX_LIGHTS};
pub use self::viewport::{Viewport, ViewportSubscriber};
