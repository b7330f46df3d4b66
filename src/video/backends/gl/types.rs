use gl;
use gl::types::*;

use crate::errors::*;
use crate::video::assets::prelude::*;

macro_rules! gl_enum {
    ($ty:ident { $($pat:pat => $value:expr),* $(,)* }) => {
        impl From<$ty> for GLenum {
            fn from(v: $ty) -> Self {
                match v {
                    $($pat => $value,)*
                }
            }
        }
    };
}

gl_enum!(MeshHint {
    MeshHint::Immutable => gl::STATIC_DRAW,
    MeshHint::Stream => gl::STREAM_DRAW,
    MeshHint::Dynamic => gl::DYNAMIC_DRAW,
});

gl_enum!(MeshPrimitive {
    MeshPrimitive::Points => gl::POINTS,
    MeshPrimitive::Lines => gl::LINES,
    MeshPrimitive::LineStrip => gl::LINE_STRIP,
    MeshPrimitive::Triangles => gl::TRIANGLES,
    MeshPrimitive::TriangleStrip => gl::TRIANGLE_STRIP,
});

gl_enum!(IndexFormat {
    IndexFormat::U16 => gl::UNSIGNED_SHORT,
    IndexFormat::U32 => gl::UNSIGNED_INT,
});

gl_enum!(VertexFormat {
    VertexFormat::Byte => gl::BYTE,
    VertexFormat::UByte => gl::UNSIGNED_BYTE,
    VertexFormat::Short => gl::SHORT,
    VertexFormat::UShort => gl::UNSIGNED_SHORT,
    VertexFormat::Float => gl::FLOAT,
});

gl_enum!(Comparison {
    Comparison::Never => gl::NEVER,
    Comparison::Less => gl::LESS,
    Comparison::LessOrEqual => gl::LEQUAL,
    Comparison::Greater => gl::GREATER,
    Comparison::GreaterOrEqual => gl::GEQUAL,
    Comparison::Equal => gl::EQUAL,
    Comparison::NotEqual => gl::NOTEQUAL,
    Comparison::Always => gl::ALWAYS,
});

gl_enum!(Equation {
    Equation::Add => gl::FUNC_ADD,
    Equation::Subtract => gl::FUNC_SUBTRACT,
    Equation::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
    Equation::Min => gl::MIN,
    Equation::Max => gl::MAX,
});

gl_enum!(FrontFaceOrder {
    FrontFaceOrder::Clockwise => gl::CW,
    FrontFaceOrder::CounterClockwise => gl::CCW,
});

gl_enum!(TextureWrap {
    TextureWrap::Repeat => gl::REPEAT,
    TextureWrap::Mirror => gl::MIRRORED_REPEAT,
    TextureWrap::Clamp => gl::CLAMP_TO_EDGE,
});

gl_enum!(RenderBufferFormat {
    RenderBufferFormat::Depth16 => gl::DEPTH_COMPONENT16,
    RenderBufferFormat::Depth24 => gl::DEPTH_COMPONENT24,
    RenderBufferFormat::Depth24Stencil8 => gl::DEPTH24_STENCIL8,
});

impl From<BlendFactor> for GLenum {
    fn from(factor: BlendFactor) -> Self {
        let (value, inverse) = match factor {
            BlendFactor::Zero => return gl::ZERO,
            BlendFactor::One => return gl::ONE,
            BlendFactor::Value(v) => (v, false),
            BlendFactor::OneMinusValue(v) => (v, true),
        };

        match (value, inverse) {
            (BlendValue::SourceColor, false) => gl::SRC_COLOR,
            (BlendValue::SourceColor, true) => gl::ONE_MINUS_SRC_COLOR,
            (BlendValue::SourceAlpha, false) => gl::SRC_ALPHA,
            (BlendValue::SourceAlpha, true) => gl::ONE_MINUS_SRC_ALPHA,
            (BlendValue::DestinationColor, false) => gl::DST_COLOR,
            (BlendValue::DestinationColor, true) => gl::ONE_MINUS_DST_COLOR,
            (BlendValue::DestinationAlpha, false) => gl::DST_ALPHA,
            (BlendValue::DestinationAlpha, true) => gl::ONE_MINUS_DST_ALPHA,
        }
    }
}

/// The `glTexImage2D` description of a texture format.
#[derive(Debug, Clone, Copy)]
pub struct PixelFormat {
    pub internal: GLenum,
    pub format: GLenum,
    pub pixel: GLenum,
}

impl From<TextureFormat> for PixelFormat {
    fn from(format: TextureFormat) -> Self {
        let (internal, format, pixel) = match format {
            TextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            TextureFormat::RGB8 => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
            TextureFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
            TextureFormat::R32F => (gl::R32F, gl::RED, gl::FLOAT),
            TextureFormat::RGBA16F => (gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
            TextureFormat::RGBA32F => (gl::RGBA32F, gl::RGBA, gl::FLOAT),
            TextureFormat::Depth16 => (gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT, gl::FLOAT),
            TextureFormat::Depth24 => (gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT, gl::FLOAT),
            TextureFormat::Depth32F => (gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT),
        };

        PixelFormat {
            internal,
            format,
            pixel,
        }
    }
}

#[inline]
pub fn boolean(v: bool) -> GLboolean {
    if v {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

/// Pops the oldest error flag of the context.
pub unsafe fn check() -> Result<()> {
    let reason = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "invalid enum argument",
        gl::INVALID_VALUE => "numeric argument out of range",
        gl::INVALID_OPERATION => "operation not allowed in the current state",
        gl::INVALID_FRAMEBUFFER_OPERATION => "bound framebuffer is incomplete",
        gl::OUT_OF_MEMORY => "out of memory",
        code => bail!("[GL] Unknown error 0x{:x}.", code),
    };

    bail!("[GL] {}.", reason)
}
