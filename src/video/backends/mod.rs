//! The backend of the video system, which should be responsible for only one
//! thing: submitting state changes and draw-calls to the low-level graphics API.

pub mod headless;
mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

use crate::errors::*;
use crate::math::Color;

use super::assets::prelude::*;

/// Every method touches the graphics context of the calling thread, which must
/// be current. That's why they are all `unsafe`.
/// Texture creation and mipmap generation may rebind texture unit 0.
pub trait Visitor {
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: &ShaderParams,
        vs: &str,
        fs: &str,
    ) -> Result<()>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: TextureParams,
        data: Option<&[u8]>,
    ) -> Result<()>;

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    unsafe fn generate_mipmap(&mut self, handle: TextureHandle) -> Result<()>;

    unsafe fn create_render_buffer(
        &mut self,
        handle: RenderBufferHandle,
        params: RenderBufferParams,
    ) -> Result<()>;

    unsafe fn delete_render_buffer(&mut self, handle: RenderBufferHandle) -> Result<()>;

    unsafe fn create_surface(&mut self, handle: SurfaceHandle, params: SurfaceParams)
        -> Result<()>;

    /// Checks the completeness of the framebuffer behind `handle`.
    unsafe fn check_surface(&mut self, handle: SurfaceHandle) -> Result<()>;

    unsafe fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()>;

    /// Binds `handle` as the draw destination, or the default framebuffer if `None`.
    unsafe fn bind_surface(
        &mut self,
        handle: Option<SurfaceHandle>,
        viewport: SurfaceViewport,
    ) -> Result<()>;

    unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()>;

    unsafe fn set_render_state(&mut self, state: &RenderState) -> Result<()>;

    unsafe fn use_program(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn bind_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: &UniformVariable,
    ) -> Result<()>;

    unsafe fn bind_texture(&mut self, unit: usize, handle: TextureHandle) -> Result<()>;

    unsafe fn create_mesh(
        &mut self,
        handle: MeshHandle,
        params: MeshParams,
        data: Option<&MeshData>,
    ) -> Result<()>;

    unsafe fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()>;

    unsafe fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()>;

    /// Attaches the vertex buffer of `mesh` to the attributes of `shader`.
    unsafe fn bind_attributes(&mut self, shader: ShaderHandle, mesh: MeshHandle) -> Result<()>;

    /// Draws with the current program. Returns the number of primitives assembled.
    unsafe fn draw(
        &mut self,
        shader: ShaderHandle,
        mesh: MeshHandle,
        index: MeshIndex,
    ) -> Result<u32>;

    /// Blocks until all execution is complete.
    unsafe fn flush(&mut self) -> Result<()>;

    /// Advance one frame, it will be called every frames.
    unsafe fn advance(&mut self) -> Result<()>;
}

/// Creates an OpenGL backend. `loader` resolves GL symbols from the current context.
#[cfg(not(target_arch = "wasm32"))]
pub unsafe fn new<F>(loader: F) -> Result<Box<dyn Visitor>>
where
    F: FnMut(&'static str) -> *const ::std::os::raw::c_void,
{
    let visitor = self::gl::GLVisitor::load_with(loader)?;
    Ok(Box::new(visitor))
}

pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
