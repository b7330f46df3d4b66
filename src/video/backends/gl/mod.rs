//! The OpenGL backend.

mod program;
mod resources;
mod state;
mod types;
mod visitor;

pub use self::visitor::GLVisitor;
