//! The video system: a thin facade over a graphics backend which owns every GPU
//! resource the render pipeline touches.
//!
//! Resources are addressed by versioned handles. Shaders and textures are also
//! registered under names, so materials and render targets can refer to them
//! before they are loaded, and keep referring to them after they are re-created.
//!
//! A shader which fails to build is never fatal. The name resolves to a flat
//! colored _error shader_ instead, which makes the broken geometry visible.

/// Maximum number of attributes in vertex layout.
pub const MAX_VERTEX_ATTRIBUTES: usize = 8;

pub mod assets;
pub mod backends;
pub mod errors;

mod system;
mod units;

pub use self::system::{VideoFrameInfo, VideoSystem};

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::headless::{HeadlessVisitor, Trace, TraceLog};
    pub use super::backends::Visitor;
    pub use super::{VideoFrameInfo, VideoSystem};
}
