//! Math types re-exported from `cgmath`, plus a RGBA `Color`.

pub use cgmath::*;

pub mod color;
pub use self::color::Color;
