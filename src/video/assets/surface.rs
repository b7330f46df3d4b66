//! Surfaces wrap a framebuffer object and its attachments.

use crate::math::Vector2;
use crate::video::assets::texture::{RenderBufferHandle, TextureHandle};

impl_handle!(SurfaceHandle);

/// The depth attachment of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceDepth {
    None,
    /// A depth texture which could be sampled afterwards, e.g. a shadow map.
    Texture(TextureHandle),
    RenderBuffer(RenderBufferHandle),
}

impl Default for SurfaceDepth {
    fn default() -> Self {
        SurfaceDepth::None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceParams {
    pub color: Option<TextureHandle>,
    pub depth: SurfaceDepth,
}

impl SurfaceParams {
    #[inline]
    pub fn has_attachments(&self) -> bool {
        self.color.is_some() || self.depth != SurfaceDepth::None
    }
}

/// The viewport rectangle in pixels, relative to the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceViewport {
    pub position: Vector2<i32>,
    pub size: Vector2<u32>,
}

impl SurfaceViewport {
    pub fn new(left: i32, bottom: i32, width: u32, height: u32) -> Self {
        SurfaceViewport {
            position: Vector2::new(left, bottom),
            size: Vector2::new(width, height),
        }
    }
}
