//! A visitor without any graphics context. It keeps just enough bookkeeping to
//! reject invalid handles and incomplete surfaces, and optionally records every
//! call into a shared `TraceLog`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::*;
use crate::math::{Color, Vector2};

use super::super::assets::prelude::*;
use super::utils::DataVec;
use super::Visitor;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    CreateShader(ShaderHandle),
    DeleteShader(ShaderHandle),
    CreateTexture(TextureHandle, Vector2<u32>),
    DeleteTexture(TextureHandle),
    GenerateMipmap(TextureHandle),
    CreateRenderBuffer(RenderBufferHandle),
    DeleteRenderBuffer(RenderBufferHandle),
    CreateSurface(SurfaceHandle),
    DeleteSurface(SurfaceHandle),
    BindSurface(Option<SurfaceHandle>, SurfaceViewport),
    Clear(Option<Color>, Option<f32>),
    RenderState(RenderState),
    UseProgram(ShaderHandle),
    Uniform(ShaderHandle, String, UniformVariable),
    BindTexture(usize, TextureHandle),
    CreateMesh(MeshHandle),
    UpdateVertexBuffer(MeshHandle, usize),
    DeleteMesh(MeshHandle),
    BindAttributes(ShaderHandle, MeshHandle),
    Draw(ShaderHandle, MeshHandle, MeshIndex),
    Flush,
    Advance,
}

pub type TraceLog = Arc<Mutex<Vec<Trace>>>;

pub struct HeadlessVisitor {
    trace: Option<TraceLog>,
    shaders: DataVec<ShaderParams>,
    textures: DataVec<TextureParams>,
    render_buffers: DataVec<RenderBufferParams>,
    surfaces: DataVec<SurfaceParams>,
    meshes: DataVec<MeshParams>,
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            trace: None,
            shaders: DataVec::new(),
            textures: DataVec::new(),
            render_buffers: DataVec::new(),
            surfaces: DataVec::new(),
            meshes: DataVec::new(),
        }
    }

    /// Creates a visitor which records every call into `trace`.
    pub fn with_trace(trace: TraceLog) -> Self {
        let mut visitor = HeadlessVisitor::new();
        visitor.trace = Some(trace);
        visitor
    }

    #[inline]
    fn record(&self, v: Trace) {
        if let Some(ref trace) = self.trace {
            trace.lock().push(v);
        }
    }

    fn attachment_dimensions(&self, params: &SurfaceParams) -> Result<Vec<Vector2<u32>>> {
        let mut dimensions = Vec::new();

        if let Some(color) = params.color {
            let texture = self
                .textures
                .get(color)
                .ok_or_else(|| format_err!("{} is invalid.", color))?;

            if texture.format.is_depth() {
                bail!("Color attachment {} has a depth format.", color);
            }

            dimensions.push(texture.dimensions);
        }

        match params.depth {
            SurfaceDepth::Texture(depth) => {
                let texture = self
                    .textures
                    .get(depth)
                    .ok_or_else(|| format_err!("{} is invalid.", depth))?;

                if !texture.format.is_depth() {
                    bail!("Depth attachment {} has a color format.", depth);
                }

                dimensions.push(texture.dimensions);
            }
            SurfaceDepth::RenderBuffer(depth) => {
                let rb = self
                    .render_buffers
                    .get(depth)
                    .ok_or_else(|| format_err!("{} is invalid.", depth))?;

                dimensions.push(rb.dimensions);
            }
            SurfaceDepth::None => {}
        }

        Ok(dimensions)
    }
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: &ShaderParams,
        vs: &str,
        fs: &str,
    ) -> Result<()> {
        // Mirrors the GLSL preprocessor, which fails compilation on `#error`.
        if vs.contains("#error") || fs.contains("#error") {
            bail!("[Headless] #error directive in shader sources.");
        }

        self.shaders.create(handle, *params);
        self.record(Trace::CreateShader(handle));
        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        self.shaders
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::DeleteShader(handle));
        Ok(())
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: TextureParams,
        _: Option<&[u8]>,
    ) -> Result<()> {
        self.textures.create(handle, params);
        self.record(Trace::CreateTexture(handle, params.dimensions));
        Ok(())
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        self.textures
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::DeleteTexture(handle));
        Ok(())
    }

    unsafe fn generate_mipmap(&mut self, handle: TextureHandle) -> Result<()> {
        self.textures
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::GenerateMipmap(handle));
        Ok(())
    }

    unsafe fn create_render_buffer(
        &mut self,
        handle: RenderBufferHandle,
        params: RenderBufferParams,
    ) -> Result<()> {
        self.render_buffers.create(handle, params);
        self.record(Trace::CreateRenderBuffer(handle));
        Ok(())
    }

    unsafe fn delete_render_buffer(&mut self, handle: RenderBufferHandle) -> Result<()> {
        self.render_buffers
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::DeleteRenderBuffer(handle));
        Ok(())
    }

    unsafe fn create_surface(
        &mut self,
        handle: SurfaceHandle,
        params: SurfaceParams,
    ) -> Result<()> {
        self.surfaces.create(handle, params);
        self.record(Trace::CreateSurface(handle));
        Ok(())
    }

    unsafe fn check_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        let params = *self
            .surfaces
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if !params.has_attachments() {
            bail!("[Headless] Surface is incomplete. No images are attached to the framebuffer.");
        }

        let dimensions = self.attachment_dimensions(&params)?;
        if dimensions.windows(2).any(|v| v[0] != v[1]) {
            bail!("[Headless] Surface is incomplete. Attachments have mismatched dimensions.");
        }

        Ok(())
    }

    unsafe fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        self.surfaces
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::DeleteSurface(handle));
        Ok(())
    }

    unsafe fn bind_surface(
        &mut self,
        handle: Option<SurfaceHandle>,
        viewport: SurfaceViewport,
    ) -> Result<()> {
        if let Some(surface) = handle {
            self.surfaces
                .get(surface)
                .ok_or_else(|| format_err!("{} is invalid.", surface))?;
        }

        self.record(Trace::BindSurface(handle, viewport));
        Ok(())
    }

    unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()> {
        self.record(Trace::Clear(color, depth));
        Ok(())
    }

    unsafe fn set_render_state(&mut self, state: &RenderState) -> Result<()> {
        self.record(Trace::RenderState(*state));
        Ok(())
    }

    unsafe fn use_program(&mut self, handle: ShaderHandle) -> Result<()> {
        self.shaders
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::UseProgram(handle));
        Ok(())
    }

    unsafe fn bind_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: &UniformVariable,
    ) -> Result<()> {
        self.record(Trace::Uniform(handle, name.to_owned(), *variable));
        Ok(())
    }

    unsafe fn bind_texture(&mut self, unit: usize, handle: TextureHandle) -> Result<()> {
        self.textures
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::BindTexture(unit, handle));
        Ok(())
    }

    unsafe fn create_mesh(
        &mut self,
        handle: MeshHandle,
        params: MeshParams,
        _: Option<&MeshData>,
    ) -> Result<()> {
        self.meshes.create(handle, params);
        self.record(Trace::CreateMesh(handle));
        Ok(())
    }

    unsafe fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let params = self
            .meshes
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if params.hint == MeshHint::Immutable {
            bail!("Trying to update immutable buffer.");
        }

        if offset + bytes.len() > params.vertex_buffer_len() {
            bail!("Trying to update vertex buffer out of bounds.");
        }

        self.record(Trace::UpdateVertexBuffer(handle, bytes.len()));
        Ok(())
    }

    unsafe fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        self.meshes
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        self.record(Trace::DeleteMesh(handle));
        Ok(())
    }

    unsafe fn bind_attributes(&mut self, shader: ShaderHandle, mesh: MeshHandle) -> Result<()> {
        let params = self
            .shaders
            .get(shader)
            .ok_or_else(|| format_err!("{} is invalid.", shader))?;

        let layout = self
            .meshes
            .get(mesh)
            .ok_or_else(|| format_err!("{} is invalid.", mesh))?
            .layout;

        if !params.attributes.is_match(&layout) {
            bail!("Vertex layout of {} does not match attributes of {}.", mesh, shader);
        }

        self.record(Trace::BindAttributes(shader, mesh));
        Ok(())
    }

    unsafe fn draw(
        &mut self,
        shader: ShaderHandle,
        mesh: MeshHandle,
        index: MeshIndex,
    ) -> Result<u32> {
        let params = *self
            .meshes
            .get(mesh)
            .ok_or_else(|| format_err!("{} is invalid.", mesh))?;

        let total = if params.num_idxes > 0 {
            params.num_idxes
        } else {
            params.num_verts
        };

        let len = match index {
            MeshIndex::Ptr(from, len) => {
                if from + len > total {
                    bail!("MeshIndex is out of bounds");
                }
                len
            }
            MeshIndex::All => total,
        };

        self.record(Trace::Draw(shader, mesh, index));
        Ok(params.primitive.assemble(len as u32))
    }

    unsafe fn flush(&mut self) -> Result<()> {
        self.record(Trace::Flush);
        Ok(())
    }

    unsafe fn advance(&mut self) -> Result<()> {
        self.record(Trace::Advance);
        Ok(())
    }
}
