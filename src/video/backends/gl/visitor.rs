use std::os::raw::c_void;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::math::Color;
use crate::utils::handle::HandleLike;

use super::super::super::assets::prelude::*;
use super::super::utils::DataVec;
use super::super::Visitor;
use super::program::Program;
use super::resources::{self, DepthAttachment, GLMesh, GLTexture};
use super::state::StateCache;
use super::types::check;

/// The OpenGL 3.2 core backend. Must only be used on the thread its context
/// is current on.
pub struct GLVisitor {
    state: StateCache,
    programs: DataVec<Program>,
    textures: DataVec<GLTexture>,
    render_buffers: DataVec<GLuint>,
    surfaces: DataVec<GLuint>,
    meshes: DataVec<GLMesh>,
}

fn fetch<H: HandleLike, T>(vec: &DataVec<T>, handle: H) -> Result<&T> {
    vec.get(handle)
        .ok_or_else(|| format_err!("{} is invalid.", handle))
}

impl GLVisitor {
    /// Loads the GL symbols with `loader` and creates a visitor on the current context.
    pub unsafe fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        Self::new()
    }

    pub unsafe fn new() -> Result<Self> {
        let visitor = GLVisitor {
            state: StateCache::new()?,
            programs: DataVec::new(),
            textures: DataVec::new(),
            render_buffers: DataVec::new(),
            surfaces: DataVec::new(),
            meshes: DataVec::new(),
        };

        info!("GLVisitor created.");
        Ok(visitor)
    }

    unsafe fn bind_mesh(&mut self, shader: ShaderHandle, mesh: MeshHandle) -> Result<()> {
        let program = fetch(&self.programs, shader)?;
        let buffers = fetch(&self.meshes, mesh)?;

        self.state
            .bind_vertex_array(shader, mesh, || buffers.vertex_array(program))
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: &ShaderParams,
        vs: &str,
        fs: &str,
    ) -> Result<()> {
        let program = Program::build(params, vs, fs)?;
        self.programs.create(handle, program);
        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let program = self
            .programs
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        self.state.forget_shader(handle);
        program.delete();
        check()
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: TextureParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let id = resources::generate(gl::GenTextures, "texture")?;
        self.state.bind_texture(0, handle, id)?;

        match GLTexture::allocate(id, params, data) {
            Ok(texture) => {
                self.textures.create(handle, texture);
                Ok(())
            }
            Err(err) => {
                self.state.forget_texture(handle);
                gl::DeleteTextures(1, &id);
                Err(err)
            }
        }
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = self
            .textures
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        self.state.forget_texture(handle);
        gl::DeleteTextures(1, &texture.id);
        check()
    }

    unsafe fn generate_mipmap(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = *fetch(&self.textures, handle)?;
        if !texture.params.mipmap {
            return Ok(());
        }

        self.state.bind_texture(0, handle, texture.id)?;
        gl::GenerateMipmap(gl::TEXTURE_2D);
        check()
    }

    unsafe fn create_render_buffer(
        &mut self,
        handle: RenderBufferHandle,
        params: RenderBufferParams,
    ) -> Result<()> {
        let id = resources::create_render_buffer(params)?;
        self.render_buffers.create(handle, id);
        Ok(())
    }

    unsafe fn delete_render_buffer(&mut self, handle: RenderBufferHandle) -> Result<()> {
        let id = self
            .render_buffers
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        gl::DeleteRenderbuffers(1, &id);
        check()
    }

    unsafe fn create_surface(&mut self, handle: SurfaceHandle, params: SurfaceParams) -> Result<()> {
        let color = match params.color {
            Some(v) => Some(fetch(&self.textures, v)?.id),
            None => None,
        };

        let depth = match params.depth {
            SurfaceDepth::None => DepthAttachment::None,
            SurfaceDepth::Texture(v) => DepthAttachment::Texture(fetch(&self.textures, v)?.id),
            SurfaceDepth::RenderBuffer(v) => {
                DepthAttachment::RenderBuffer(*fetch(&self.render_buffers, v)?)
            }
        };

        let id = resources::create_framebuffer(color, depth);
        self.state.invalidate_framebuffer();

        self.surfaces.create(handle, id?);
        Ok(())
    }

    unsafe fn check_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        let id = *fetch(&self.surfaces, handle)?;
        let status = resources::framebuffer_status(id);
        self.state.invalidate_framebuffer();
        status
    }

    unsafe fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        let id = self
            .surfaces
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        self.state.forget_surface(handle);
        gl::DeleteFramebuffers(1, &id);
        check()
    }

    unsafe fn bind_surface(
        &mut self,
        handle: Option<SurfaceHandle>,
        viewport: SurfaceViewport,
    ) -> Result<()> {
        let id = match handle {
            Some(v) => *fetch(&self.surfaces, v)?,
            None => 0,
        };

        self.state.bind_framebuffer(handle, id)?;
        self.state.set_viewport(viewport)
    }

    unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()> {
        self.state.clear(color, depth)
    }

    unsafe fn set_render_state(&mut self, state: &RenderState) -> Result<()> {
        self.state.apply(state)
    }

    unsafe fn use_program(&mut self, handle: ShaderHandle) -> Result<()> {
        let id = fetch(&self.programs, handle)?.id;
        self.state.use_program(handle, id)
    }

    unsafe fn bind_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: &UniformVariable,
    ) -> Result<()> {
        let program = fetch(&self.programs, handle)?;
        self.state.use_program(handle, program.id)?;
        program.upload(name, variable)
    }

    unsafe fn bind_texture(&mut self, unit: usize, handle: TextureHandle) -> Result<()> {
        let id = fetch(&self.textures, handle)?.id;
        self.state.bind_texture(unit, handle, id)
    }

    unsafe fn create_mesh(
        &mut self,
        handle: MeshHandle,
        params: MeshParams,
        data: Option<&MeshData>,
    ) -> Result<()> {
        let mesh = GLMesh::new(params, data)?;
        self.meshes.create(handle, mesh);
        Ok(())
    }

    unsafe fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let mesh = fetch(&self.meshes, handle)?;

        if mesh.params.hint == MeshHint::Immutable {
            bail!("{} is immutable.", handle);
        }

        if offset + bytes.len() > mesh.params.vertex_buffer_len() {
            bail!("Update of {} is out of bounds.", handle);
        }

        mesh.update(offset, bytes)
    }

    unsafe fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        let mesh = self
            .meshes
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        self.state.forget_mesh(handle);
        mesh.delete();
        check()
    }

    unsafe fn bind_attributes(&mut self, shader: ShaderHandle, mesh: MeshHandle) -> Result<()> {
        self.bind_mesh(shader, mesh)
    }

    unsafe fn draw(&mut self, shader: ShaderHandle, mesh: MeshHandle, index: MeshIndex) -> Result<u32> {
        let id = fetch(&self.programs, shader)?.id;
        self.state.use_program(shader, id)?;
        self.bind_mesh(shader, mesh)?;

        let params = fetch(&self.meshes, mesh)?.params;
        let indexed = params.num_idxes > 0;
        let total = if indexed {
            params.num_idxes
        } else {
            params.num_verts
        };

        let (from, len) = match index {
            MeshIndex::All => (0, total),
            MeshIndex::Ptr(from, len) if from + len <= total => (from, len),
            MeshIndex::Ptr(from, len) => {
                bail!("Range {}..{} exceeds the {} elements of {}.", from, from + len, total, mesh)
            }
        };

        let primitive: GLenum = params.primitive.into();
        if indexed {
            let offset = from * params.index_format.stride();
            gl::DrawElements(
                primitive,
                len as GLsizei,
                params.index_format.into(),
                offset as *const c_void,
            );
        } else {
            gl::DrawArrays(primitive, from as GLint, len as GLsizei);
        }

        check()?;
        Ok(params.primitive.assemble(len as u32))
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }

    unsafe fn advance(&mut self) -> Result<()> {
        self.state.invalidate_framebuffer();
        Ok(())
    }
}
