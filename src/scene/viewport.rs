use crate::errors::*;
use crate::video::assets::surface::SurfaceViewport;
use crate::video::VideoSystem;

/// A rectangle of the display, in pixels, with its origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: i32,
    pub bottom: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub fn new(left: i32, bottom: i32, width: u32, height: u32) -> Self {
        Viewport {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Width divided by height, or 1.0 for a degenerated viewport.
    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<Viewport> for SurfaceViewport {
    fn from(v: Viewport) -> Self {
        SurfaceViewport::new(v.left, v.bottom, v.width, v.height)
    }
}

/// Something that reacts to resize notifications of the display. Delivering
/// these notifications is up to the windowing layer.
pub trait ViewportSubscriber {
    fn resize_viewport(&mut self, video: &mut VideoSystem, viewport: Viewport) -> Result<()>;
}
