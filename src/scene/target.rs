//! Destinations of render passes: the display, or an offscreen texture.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::*;
use crate::math::*;
use crate::video::assets::prelude::*;
use crate::video::VideoSystem;

use super::viewport::{Viewport, ViewportSubscriber};

/// Which buffers a texture target allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureTargetKind {
    /// A color texture without depth buffer.
    ColorOnly,
    /// A color texture plus a depth render buffer.
    ColorAndDepth,
    /// A depth texture only, e.g. a shadow map.
    DepthOnly,
}

/// Draws into the default framebuffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameBufferTarget {
    viewport: Viewport,
    clear_color: Color,
}

impl FrameBufferTarget {
    pub fn new(viewport: Viewport) -> Self {
        FrameBufferTarget {
            viewport,
            clear_color: Color::black(),
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

/// Draws into a framebuffer object whose color (or depth) texture is registered
/// under `name`, so materials can sample it.
#[derive(Debug, Clone)]
pub struct TextureTarget {
    name: String,
    kind: TextureTargetKind,
    dimensions: Vector2<u32>,
    mipmaps: bool,
    clear_color: Color,
    surface: Option<SurfaceHandle>,
    texture: Option<TextureHandle>,
    depth_buffer: Option<RenderBufferHandle>,
}

impl TextureTarget {
    pub fn new<T: Into<String>>(name: T, kind: TextureTargetKind, dimensions: Vector2<u32>) -> Self {
        TextureTarget {
            name: name.into(),
            kind,
            dimensions,
            mipmaps: false,
            clear_color: Color::black(),
            surface: None,
            texture: None,
            depth_buffer: None,
        }
    }

    /// Generates mipmaps of the color texture after every pass drawn into it.
    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps && self.kind != TextureTargetKind::DepthOnly;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> TextureTargetKind {
        self.kind
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// The texture currently backing this target. It is replaced whenever the
    /// target is re-allocated, while `name` stays the same.
    #[inline]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Allocates the textures and the framebuffer. Does nothing if they have
    /// been allocated already. An incomplete framebuffer is logged, and the
    /// target is kept.
    pub fn initialize(&mut self, video: &mut VideoSystem) -> Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }

        let format = if self.kind == TextureTargetKind::DepthOnly {
            TextureFormat::Depth24
        } else {
            TextureFormat::RGBA8
        };

        let params = TextureParams {
            format,
            dimensions: self.dimensions,
            mipmap: self.mipmaps,
            ..Default::default()
        };

        let texture = video.create_texture(self.name.as_str(), params, None)?;
        self.texture = Some(texture);

        let mut params = SurfaceParams::default();
        match self.kind {
            TextureTargetKind::ColorOnly => params.color = Some(texture),
            TextureTargetKind::DepthOnly => params.depth = SurfaceDepth::Texture(texture),
            TextureTargetKind::ColorAndDepth => {
                let depth = video.create_render_buffer(RenderBufferParams {
                    format: RenderBufferFormat::Depth24,
                    dimensions: self.dimensions,
                })?;

                self.depth_buffer = Some(depth);
                params.color = Some(texture);
                params.depth = SurfaceDepth::RenderBuffer(depth);
            }
        }

        let surface = video.create_surface(params)?;
        self.surface = Some(surface);

        if let Err(err) = video.check_surface(surface) {
            error!("Render target {} is incomplete: {}", self.name, err);
        }

        Ok(())
    }

    /// Releases everything `initialize` allocated.
    pub fn release(&mut self, video: &mut VideoSystem) -> Result<()> {
        if let Some(surface) = self.surface.take() {
            video.delete_surface(surface)?;
        }

        if let Some(depth) = self.depth_buffer.take() {
            video.delete_render_buffer(depth)?;
        }

        if let Some(texture) = self.texture.take() {
            if video.texture(&self.name) == Some(texture) {
                video.delete_texture(&self.name);
            }
        }

        Ok(())
    }

    fn viewport(&self) -> SurfaceViewport {
        SurfaceViewport::new(0, 0, self.dimensions.x, self.dimensions.y)
    }

    fn bind(&mut self, video: &mut VideoSystem) -> Result<()> {
        self.initialize(video)?;
        let viewport = self.viewport();
        video.bind_surface(self.surface, viewport)
    }

    fn post_render(&mut self, video: &mut VideoSystem) -> Result<()> {
        if let (true, Some(texture)) = (self.mipmaps, self.texture) {
            video.generate_mipmap(texture)?;
        }

        Ok(())
    }

    fn start_frame(&mut self, video: &mut VideoSystem) -> Result<()> {
        self.bind(video)?;

        let color = if self.kind == TextureTargetKind::DepthOnly {
            None
        } else {
            Some(self.clear_color)
        };

        let depth = if self.kind == TextureTargetKind::ColorOnly {
            None
        } else {
            Some(1.0)
        };

        video.clear(color, depth)
    }
}

/// A texture target whose dimensions follow the viewport, scaled by a factor.
#[derive(Debug, Clone)]
pub struct ScaledTextureTarget {
    target: TextureTarget,
    scale: Vector2<f32>,
}

impl ScaledTextureTarget {
    pub fn new<T: Into<String>>(
        name: T,
        kind: TextureTargetKind,
        scale: Vector2<f32>,
        viewport: Viewport,
    ) -> Self {
        let dimensions = Self::scaled(scale, viewport);
        ScaledTextureTarget {
            target: TextureTarget::new(name, kind, dimensions),
            scale,
        }
    }

    fn scaled(scale: Vector2<f32>, viewport: Viewport) -> Vector2<u32> {
        let w = (scale.x * viewport.width as f32).round().max(1.0);
        let h = (scale.y * viewport.height as f32).round().max(1.0);
        Vector2::new(w as u32, h as u32)
    }

    #[inline]
    pub fn scale(&self) -> Vector2<f32> {
        self.scale
    }

    #[inline]
    pub fn target(&self) -> &TextureTarget {
        &self.target
    }

    /// Recomputes the dimensions and, if they changed, re-allocates the backing
    /// texture under the same name.
    pub fn resize(&mut self, video: &mut VideoSystem, viewport: Viewport) -> Result<()> {
        let dimensions = Self::scaled(self.scale, viewport);
        if dimensions == self.target.dimensions {
            return Ok(());
        }

        let initialized = self.target.is_initialized();
        self.target.release(video)?;
        self.target.dimensions = dimensions;

        if initialized {
            self.target.initialize(video)?;
        }

        debug!(
            "Render target {} resized to {}x{}.",
            self.target.name, dimensions.x, dimensions.y
        );

        Ok(())
    }
}

/// The destination of a render pass.
#[derive(Debug, Clone)]
pub enum RenderTarget {
    FrameBuffer(FrameBufferTarget),
    Texture(TextureTarget),
    ScaledTexture(ScaledTextureTarget),
}

pub type RenderTargetRef = Arc<RwLock<RenderTarget>>;

impl RenderTarget {
    pub fn frame_buffer(viewport: Viewport) -> Self {
        RenderTarget::FrameBuffer(FrameBufferTarget::new(viewport))
    }

    pub fn texture<T: Into<String>>(
        name: T,
        kind: TextureTargetKind,
        dimensions: Vector2<u32>,
    ) -> Self {
        RenderTarget::Texture(TextureTarget::new(name, kind, dimensions))
    }

    pub fn scaled_texture<T: Into<String>>(
        name: T,
        kind: TextureTargetKind,
        scale: Vector2<f32>,
        viewport: Viewport,
    ) -> Self {
        RenderTarget::ScaledTexture(ScaledTextureTarget::new(name, kind, scale, viewport))
    }

    #[inline]
    pub fn into_ref(self) -> RenderTargetRef {
        Arc::new(RwLock::new(self))
    }

    /// Allocates the GPU side of the target. Calling it again has no effect.
    pub fn initialize(&mut self, video: &mut VideoSystem) -> Result<()> {
        match *self {
            RenderTarget::FrameBuffer(_) => Ok(()),
            RenderTarget::Texture(ref mut v) => v.initialize(video),
            RenderTarget::ScaledTexture(ref mut v) => v.target.initialize(video),
        }
    }

    /// The current size of the backing store, in pixels.
    pub fn size(&self) -> Vector2<u32> {
        match *self {
            RenderTarget::FrameBuffer(ref v) => Vector2::new(v.viewport.width, v.viewport.height),
            RenderTarget::Texture(ref v) => v.dimensions,
            RenderTarget::ScaledTexture(ref v) => v.target.dimensions,
        }
    }

    /// The name under which materials can sample the target.
    pub fn texture_name(&self) -> Option<&str> {
        match *self {
            RenderTarget::FrameBuffer(_) => None,
            RenderTarget::Texture(ref v) => Some(v.name.as_str()),
            RenderTarget::ScaledTexture(ref v) => Some(v.target.name.as_str()),
        }
    }

    pub fn clear_color(&self) -> Color {
        match *self {
            RenderTarget::FrameBuffer(ref v) => v.clear_color,
            RenderTarget::Texture(ref v) => v.clear_color,
            RenderTarget::ScaledTexture(ref v) => v.target.clear_color,
        }
    }

    pub fn set_clear_color<T: Into<Color>>(&mut self, color: T) {
        let color = color.into();
        match *self {
            RenderTarget::FrameBuffer(ref mut v) => v.clear_color = color,
            RenderTarget::Texture(ref mut v) => v.clear_color = color,
            RenderTarget::ScaledTexture(ref mut v) => v.target.clear_color = color,
        }
    }

    /// Binds the target as draw destination and sets the viewport.
    pub fn pre_render(&mut self, video: &mut VideoSystem) -> Result<()> {
        match *self {
            RenderTarget::FrameBuffer(ref v) => video.bind_surface(None, v.viewport.into()),
            RenderTarget::Texture(ref mut v) => v.bind(video),
            RenderTarget::ScaledTexture(ref mut v) => v.target.bind(video),
        }
    }

    pub fn post_render(&mut self, video: &mut VideoSystem) -> Result<()> {
        match *self {
            RenderTarget::FrameBuffer(_) => Ok(()),
            RenderTarget::Texture(ref mut v) => v.post_render(video),
            RenderTarget::ScaledTexture(ref mut v) => v.target.post_render(video),
        }
    }

    /// Binds the target and clears it with its clear color.
    pub fn start_frame(&mut self, video: &mut VideoSystem) -> Result<()> {
        match *self {
            RenderTarget::FrameBuffer(ref v) => {
                video.bind_surface(None, v.viewport.into())?;
                video.clear(Some(v.clear_color), Some(1.0))
            }
            RenderTarget::Texture(ref mut v) => v.start_frame(video),
            RenderTarget::ScaledTexture(ref mut v) => v.target.start_frame(video),
        }
    }

    /// Frees the GPU side of texture targets.
    pub fn release(&mut self, video: &mut VideoSystem) -> Result<()> {
        match *self {
            RenderTarget::FrameBuffer(_) => Ok(()),
            RenderTarget::Texture(ref mut v) => v.release(video),
            RenderTarget::ScaledTexture(ref mut v) => v.target.release(video),
        }
    }
}

impl ViewportSubscriber for RenderTarget {
    fn resize_viewport(&mut self, video: &mut VideoSystem, viewport: Viewport) -> Result<()> {
        match *self {
            RenderTarget::FrameBuffer(ref mut v) => {
                v.set_viewport(viewport);
                Ok(())
            }
            RenderTarget::Texture(_) => Ok(()),
            RenderTarget::ScaledTexture(ref mut v) => v.resize(video, viewport),
        }
    }
}
