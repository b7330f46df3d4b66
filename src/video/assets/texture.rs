//! 2D textures and render buffers. A texture can be sampled by shaders and,
//! when attached to a surface, rendered into.

use crate::math::Vector2;
use crate::video::errors::{Error, Result};

impl_handle!(TextureHandle);

/// The parameters of a texture object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureParams {
    /// Sets the wrap parameter for texture.
    pub wrap: TextureWrap,
    /// Specify how the texture is used whenever the pixel being sampled.
    pub filter: TextureFilter,
    /// Should we allocate a complete set of mipmaps for this texture.
    pub mipmap: bool,
    pub format: TextureFormat,
    pub dimensions: Vector2<u32>,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            format: TextureFormat::RGBA8,
            wrap: TextureWrap::Clamp,
            filter: TextureFilter::Linear,
            mipmap: false,
            dimensions: Vector2::new(0, 0),
        }
    }
}

impl TextureParams {
    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        if self.dimensions.x == 0 || self.dimensions.y == 0 {
            return Err(Error::TextureInvalid(format!(
                "zero sized dimensions {:?}",
                self.dimensions
            )));
        }

        if let Some(buf) = data {
            let len = self.format.size() as usize
                * self.dimensions.x as usize
                * self.dimensions.y as usize;

            if buf.len() > len {
                return Err(Error::OutOfBounds(buf.len(), len));
            }
        }

        Ok(())
    }
}

/// Specify how the texture is used whenever the pixel being sampled.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Sets the wrap parameter for texture.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureWrap {
    /// Samples at coord x + 1 map to coord x.
    Repeat,
    /// Samples at coord x + 1 map to coord 1 - x.
    Mirror,
    /// Samples at coord x + 1 map to coord 1.
    Clamp,
}

/// Pixel formats of textures. The depth formats can only be filled by
/// rendering into them.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureFormat {
    R8,
    RGB8,
    RGBA8,
    R32F,
    RGBA16F,
    RGBA32F,
    Depth16,
    Depth24,
    Depth32F,
}

impl TextureFormat {
    #[inline]
    pub fn is_depth(self) -> bool {
        match self {
            TextureFormat::Depth16 | TextureFormat::Depth24 | TextureFormat::Depth32F => true,
            _ => false,
        }
    }

    /// Returns the size in bytes of a pixel of this format.
    pub fn size(self) -> u8 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Depth16 => 2,
            TextureFormat::RGB8 | TextureFormat::Depth24 => 3,
            TextureFormat::RGBA8 | TextureFormat::R32F | TextureFormat::Depth32F => 4,
            TextureFormat::RGBA16F => 8,
            TextureFormat::RGBA32F => 16,
        }
    }
}

impl_handle!(RenderBufferHandle);

/// A render buffer is a write-only attachment of a surface, it can't be sampled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderBufferParams {
    pub format: RenderBufferFormat,
    pub dimensions: Vector2<u32>,
}

impl Default for RenderBufferParams {
    fn default() -> Self {
        RenderBufferParams {
            format: RenderBufferFormat::Depth24,
            dimensions: Vector2::new(0, 0),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum RenderBufferFormat {
    Depth16,
    Depth24,
    Depth24Stencil8,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate() {
        let mut params = TextureParams::default();
        assert!(params.validate(None).is_err());

        params.dimensions = Vector2::new(2, 2);
        assert!(params.validate(None).is_ok());
        assert!(params.validate(Some(&[0; 16])).is_ok());
        assert!(params.validate(Some(&[0; 17])).is_err());
    }

    #[test]
    fn depth_formats() {
        assert!(TextureFormat::Depth24.is_depth());
        assert!(!TextureFormat::RGBA16F.is_depth());
    }
}
