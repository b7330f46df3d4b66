use crate::errors::*;
use crate::math::Color;
use crate::settings::VideoParams;
use crate::utils::hash::{FastHashMap, FastHashSet};
use crate::utils::ObjectPool;

use super::assets::prelude::*;
use super::backends::{self, Visitor};
use super::errors::Error;
use super::units::TextureUnits;

/// Counters of the backend calls issued since the last `advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoFrameInfo {
    pub drawcalls: u32,
    pub primitives: u32,
    pub program_switches: u32,
    pub uniforms: u32,
    pub texture_binds: u32,
}

/// The centralized management of video sub-system.
///
/// Every method ends up in the backend, so a `VideoSystem` must be used on the
/// thread which owns the graphics context.
pub struct VideoSystem {
    visitor: Box<dyn Visitor>,
    params: VideoParams,

    shaders: ObjectPool<ShaderHandle, ShaderParams>,
    shader_names: FastHashMap<String, ShaderHandle>,
    reported: FastHashSet<String>,
    error_shader: ShaderHandle,

    textures: ObjectPool<TextureHandle, TextureParams>,
    texture_names: FastHashMap<String, TextureHandle>,
    units: TextureUnits,

    render_buffers: ObjectPool<RenderBufferHandle, RenderBufferParams>,
    surfaces: ObjectPool<SurfaceHandle, SurfaceParams>,
    meshes: ObjectPool<MeshHandle, MeshParams>,

    program: Option<ShaderHandle>,
    program_owners: FastHashMap<ShaderHandle, u64>,
    info: VideoFrameInfo,
}

impl VideoSystem {
    /// Creates a video system on top of `visitor`. Fails only if the error
    /// shader can not be built.
    pub fn new(visitor: Box<dyn Visitor>, params: VideoParams) -> Result<Self> {
        let mut video = VideoSystem {
            visitor,
            params,
            shaders: ObjectPool::new(),
            shader_names: FastHashMap::default(),
            reported: FastHashSet::default(),
            error_shader: ShaderHandle::default(),
            textures: ObjectPool::new(),
            texture_names: FastHashMap::default(),
            units: TextureUnits::new(params.max_texture_units),
            render_buffers: ObjectPool::new(),
            surfaces: ObjectPool::new(),
            meshes: ObjectPool::new(),
            program: None,
            program_owners: FastHashMap::default(),
            info: VideoFrameInfo::default(),
        };

        let (params, vs, fs) = error_shader_sources(video.params.error_color);
        video.error_shader = video
            .build_shader(params, &vs, &fs)
            .map_err(|err| format_err!("Failed to build the error shader: {}", err))?;

        info!(
            "Video system created with {} texture units.",
            video.units.len()
        );

        Ok(video)
    }

    /// Creates a video system without graphics context.
    pub fn headless(params: VideoParams) -> Result<Self> {
        Self::new(backends::new_headless(), params)
    }

    #[inline]
    pub fn params(&self) -> &VideoParams {
        &self.params
    }

    /// Creates a shader program and registers it under `name`, replacing any
    /// shader registered under the same name.
    ///
    /// If the program fails to validate, compile or link, the failure is logged
    /// and `name` resolves to the error shader, whose handle is returned.
    pub fn create_shader<T: Into<String>>(
        &mut self,
        name: T,
        params: ShaderParams,
        vs: &str,
        fs: &str,
    ) -> ShaderHandle {
        let name = name.into();
        self.delete_shader(&name);

        let handle = match self.build_shader(params, vs, fs) {
            Ok(handle) => handle,
            Err(err) => {
                error!("Failed to create shader {}: {}", name, err);
                self.error_shader
            }
        };

        self.reported.remove(&name);
        self.shader_names.insert(name, handle);
        handle
    }

    fn build_shader(&mut self, params: ShaderParams, vs: &str, fs: &str) -> Result<ShaderHandle> {
        params.validate(vs, fs)?;

        let handle = self.shaders.create(params);
        if let Err(err) = unsafe { self.visitor.create_shader(handle, &params, vs, fs) } {
            self.shaders.free(handle);
            return Err(err);
        }

        Ok(handle)
    }

    /// Resolves `name` to a shader. Unknown names resolve to the error shader,
    /// which is reported once per name.
    pub fn shader(&mut self, name: &str) -> ShaderHandle {
        if let Some(&handle) = self.shader_names.get(name) {
            return handle;
        }

        if self.reported.insert(name.to_owned()) {
            error!("Shader {} is not loaded, using the error shader.", name);
        }

        self.error_shader
    }

    #[inline]
    pub fn find_shader(&self, name: &str) -> Option<ShaderHandle> {
        self.shader_names.get(name).cloned()
    }

    #[inline]
    pub fn error_shader(&self) -> ShaderHandle {
        self.error_shader
    }

    #[inline]
    pub fn is_error_shader(&self, handle: ShaderHandle) -> bool {
        handle == self.error_shader
    }

    #[inline]
    pub fn shader_params(&self, handle: ShaderHandle) -> Option<&ShaderParams> {
        self.shaders.get(handle)
    }

    /// Unregisters `name` and deletes its program. Returns false if there was
    /// nothing registered under `name`.
    pub fn delete_shader(&mut self, name: &str) -> bool {
        let handle = match self.shader_names.remove(name) {
            Some(handle) => handle,
            None => return false,
        };

        if handle != self.error_shader && self.shaders.free(handle).is_some() {
            if self.program == Some(handle) {
                self.program = None;
            }

            self.program_owners.remove(&handle);
            if let Err(err) = unsafe { self.visitor.delete_shader(handle) } {
                warn!("Failed to delete shader {}: {}", name, err);
            }
        }

        true
    }

    /// Creates a texture and registers it under `name`. An existing texture with
    /// the same name is deleted first, so the name keeps resolving.
    pub fn create_texture<T: Into<String>>(
        &mut self,
        name: T,
        params: TextureParams,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle> {
        params.validate(data)?;

        let name = name.into();
        self.delete_texture(&name);

        let handle = self.textures.create(params);
        if let Err(err) = unsafe { self.visitor.create_texture(handle, params, data) } {
            self.textures.free(handle);
            return Err(err);
        }

        self.units.release(0);
        self.texture_names.insert(name, handle);
        Ok(handle)
    }

    #[inline]
    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.texture_names.get(name).cloned()
    }

    #[inline]
    pub fn texture_params(&self, handle: TextureHandle) -> Option<&TextureParams> {
        self.textures.get(handle)
    }

    pub fn delete_texture(&mut self, name: &str) -> bool {
        let handle = match self.texture_names.remove(name) {
            Some(handle) => handle,
            None => return false,
        };

        if self.textures.free(handle).is_some() {
            self.units.evict(handle);
            if let Err(err) = unsafe { self.visitor.delete_texture(handle) } {
                warn!("Failed to delete texture {}: {}", name, err);
            }
        }

        true
    }

    /// Returns the texture unit `handle` is bound to, binding it to the least
    /// recently used unit if it is not resident.
    pub fn texture_unit(&mut self, handle: TextureHandle) -> Result<usize> {
        if !self.textures.contains(handle) {
            return Err(Error::invalid(handle).into());
        }

        let (unit, fresh) = self.units.assign(handle);
        if fresh {
            if let Err(err) = unsafe { self.visitor.bind_texture(unit, handle) } {
                self.units.release(unit);
                return Err(err);
            }

            self.info.texture_binds += 1;
        }

        Ok(unit)
    }

    pub fn generate_mipmap(&mut self, handle: TextureHandle) -> Result<()> {
        if !self.textures.contains(handle) {
            return Err(Error::invalid(handle).into());
        }

        unsafe { self.visitor.generate_mipmap(handle)? };
        self.units.release(0);
        Ok(())
    }

    pub fn create_render_buffer(&mut self, params: RenderBufferParams) -> Result<RenderBufferHandle> {
        let handle = self.render_buffers.create(params);
        if let Err(err) = unsafe { self.visitor.create_render_buffer(handle, params) } {
            self.render_buffers.free(handle);
            return Err(err);
        }

        Ok(handle)
    }

    pub fn delete_render_buffer(&mut self, handle: RenderBufferHandle) -> Result<()> {
        if self.render_buffers.free(handle).is_none() {
            return Err(Error::invalid(handle).into());
        }

        unsafe { self.visitor.delete_render_buffer(handle) }
    }

    pub fn create_surface(&mut self, params: SurfaceParams) -> Result<SurfaceHandle> {
        let handle = self.surfaces.create(params);
        if let Err(err) = unsafe { self.visitor.create_surface(handle, params) } {
            self.surfaces.free(handle);
            return Err(err);
        }

        Ok(handle)
    }

    /// Checks whether the attachments of `handle` form a complete framebuffer.
    pub fn check_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        if !self.surfaces.contains(handle) {
            return Err(Error::invalid(handle).into());
        }

        unsafe { self.visitor.check_surface(handle) }
    }

    #[inline]
    pub fn surface_params(&self, handle: SurfaceHandle) -> Option<&SurfaceParams> {
        self.surfaces.get(handle)
    }

    pub fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        if self.surfaces.free(handle).is_none() {
            return Err(Error::invalid(handle).into());
        }

        unsafe { self.visitor.delete_surface(handle) }
    }

    /// Binds `handle` as draw destination, or the default framebuffer if `None`.
    pub fn bind_surface(
        &mut self,
        handle: Option<SurfaceHandle>,
        viewport: SurfaceViewport,
    ) -> Result<()> {
        if let Some(handle) = handle {
            if !self.surfaces.contains(handle) {
                return Err(Error::invalid(handle).into());
            }
        }

        unsafe { self.visitor.bind_surface(handle, viewport) }
    }

    #[inline]
    pub fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()> {
        unsafe { self.visitor.clear(color, depth) }
    }

    #[inline]
    pub fn set_render_state(&mut self, state: &RenderState) -> Result<()> {
        unsafe { self.visitor.set_render_state(state) }
    }

    /// Makes `handle` the current program. The backend is only called if it
    /// differs from the last applied program; returns whether it did.
    pub fn use_program(&mut self, handle: ShaderHandle) -> Result<bool> {
        if !self.shaders.contains(handle) {
            return Err(Error::invalid(handle).into());
        }

        if self.program == Some(handle) {
            return Ok(false);
        }

        unsafe { self.visitor.use_program(handle)? };
        trace!("Switch program to {}.", handle);

        self.program = Some(handle);
        self.info.program_switches += 1;
        Ok(true)
    }

    /// Records `owner` as the last uploader of uniforms into program `handle`.
    /// Returns true if somebody else uploaded since `owner` did, in which case
    /// the program holds values `owner` knows nothing about.
    pub fn claim_program(&mut self, handle: ShaderHandle, owner: u64) -> bool {
        match self.program_owners.insert(handle, owner) {
            Some(prev) => prev != owner,
            None => true,
        }
    }

    pub fn bind_uniform(
        &mut self,
        handle: ShaderHandle,
        name: &str,
        variable: &UniformVariable,
    ) -> Result<()> {
        unsafe { self.visitor.bind_uniform(handle, name, variable)? };
        self.info.uniforms += 1;
        Ok(())
    }

    pub fn create_mesh(&mut self, params: MeshParams, data: Option<MeshData>) -> Result<MeshHandle> {
        params.validate(data.as_ref())?;

        let handle = self.meshes.create(params);
        if let Err(err) = unsafe { self.visitor.create_mesh(handle, params, data.as_ref()) } {
            self.meshes.free(handle);
            return Err(err);
        }

        Ok(handle)
    }

    /// Writes `bytes` into the vertex buffer of a non-immutable mesh.
    pub fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let params = self
            .meshes
            .get(handle)
            .ok_or_else(|| Error::invalid(handle))?;

        if params.hint == MeshHint::Immutable {
            return Err(Error::Immutable(handle.to_string()).into());
        }

        if offset + bytes.len() > params.vertex_buffer_len() {
            let len = params.vertex_buffer_len();
            return Err(Error::OutOfBounds(offset + bytes.len(), len).into());
        }

        unsafe { self.visitor.update_vertex_buffer(handle, offset, bytes) }
    }

    #[inline]
    pub fn mesh_params(&self, handle: MeshHandle) -> Option<&MeshParams> {
        self.meshes.get(handle)
    }

    pub fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        if self.meshes.free(handle).is_none() {
            return Err(Error::invalid(handle).into());
        }

        unsafe { self.visitor.delete_mesh(handle) }
    }

    pub fn bind_attributes(&mut self, shader: ShaderHandle, mesh: MeshHandle) -> Result<()> {
        if !self.shaders.contains(shader) {
            return Err(Error::invalid(shader).into());
        }

        if !self.meshes.contains(mesh) {
            return Err(Error::invalid(mesh).into());
        }

        unsafe { self.visitor.bind_attributes(shader, mesh) }
    }

    /// Draws `mesh` with the current program, which must be `shader`.
    pub fn draw(&mut self, shader: ShaderHandle, mesh: MeshHandle, index: MeshIndex) -> Result<()> {
        if !self.meshes.contains(mesh) {
            return Err(Error::invalid(mesh).into());
        }

        let primitives = unsafe { self.visitor.draw(shader, mesh, index)? };
        self.info.drawcalls += 1;
        self.info.primitives += primitives;
        Ok(())
    }

    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        unsafe { self.visitor.flush() }
    }

    /// Counters of the frame in progress.
    #[inline]
    pub fn stats(&self) -> VideoFrameInfo {
        self.info
    }

    /// Ends the frame and resets its counters.
    pub fn advance(&mut self) -> Result<()> {
        unsafe { self.visitor.advance()? };
        self.info = VideoFrameInfo::default();
        Ok(())
    }
}

fn error_shader_sources(color: Color) -> (ShaderParams, String, String) {
    let attributes = AttributeLayout::build()
        .with(Attribute::Position, 3)
        .finish();

    let vs = "#version 150
in vec3 Position;
uniform mat4 modelViewProjection;
void main() {
    gl_Position = modelViewProjection * vec4(Position, 1.0);
}
"
    .to_owned();

    let fs = format!(
        "#version 150
out vec4 FragColor;
void main() {{
    FragColor = vec4({:.4}, {:.4}, {:.4}, {:.4});
}}
",
        color.r, color.g, color.b, color.a
    );

    (ShaderParams { attributes }, vs, fs)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::math::Vector2;
    use crate::video::backends::headless::{HeadlessVisitor, Trace};

    const VS: &str = "void main() { gl_Position = vec4(0.0); }";
    const FS: &str = "void main() {}";

    fn recorded() -> (VideoSystem, Arc<Mutex<Vec<Trace>>>) {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let visitor = Box::new(HeadlessVisitor::with_trace(trace.clone()));
        let video = VideoSystem::new(visitor, VideoParams::default()).unwrap();
        trace.lock().clear();
        (video, trace)
    }

    fn texture_params() -> TextureParams {
        TextureParams {
            dimensions: Vector2::new(4, 4),
            ..Default::default()
        }
    }

    #[test]
    fn error_shader() {
        let mut video = VideoSystem::headless(VideoParams::default()).unwrap();

        let good = video.create_shader("good", ShaderParams::default(), VS, FS);
        assert!(!video.is_error_shader(good));
        assert_eq!(video.shader("good"), good);

        let bad = video.create_shader("bad", ShaderParams::default(), VS, "#error broken");
        assert!(video.is_error_shader(bad));
        assert_eq!(video.shader("bad"), video.error_shader());

        let empty = video.create_shader("empty", ShaderParams::default(), "", FS);
        assert!(video.is_error_shader(empty));

        assert_eq!(video.shader("missing"), video.error_shader());
        assert_eq!(video.find_shader("missing"), None);
    }

    #[test]
    fn error_shader_color() {
        let (_, _, fs) = error_shader_sources(Color::yellow());
        assert!(fs.contains("vec4(1.0000, 1.0000, 0.0000, 1.0000)"));
    }

    #[test]
    fn replace_shader() {
        let mut video = VideoSystem::headless(VideoParams::default()).unwrap();
        let first = video.create_shader("a", ShaderParams::default(), VS, FS);
        let second = video.create_shader("a", ShaderParams::default(), VS, FS);

        assert_ne!(first, second);
        assert!(video.shader_params(first).is_none());
        assert_eq!(video.shader("a"), second);

        assert!(video.delete_shader("a"));
        assert!(!video.delete_shader("a"));
        assert!(video.shader_params(second).is_none());
    }

    #[test]
    fn program_cache() {
        let (mut video, trace) = recorded();
        let a = video.create_shader("a", ShaderParams::default(), VS, FS);
        let b = video.create_shader("b", ShaderParams::default(), VS, FS);

        assert!(video.use_program(a).unwrap());
        assert!(!video.use_program(a).unwrap());
        assert!(video.use_program(b).unwrap());
        assert!(video.use_program(a).unwrap());
        assert_eq!(video.stats().program_switches, 3);

        let switches = trace
            .lock()
            .iter()
            .filter(|v| match v {
                Trace::UseProgram(_) => true,
                _ => false,
            })
            .count();
        assert_eq!(switches, 3);

        assert!(video.claim_program(a, 1));
        assert!(!video.claim_program(a, 1));
        assert!(video.claim_program(a, 2));
        assert!(video.claim_program(a, 1));
    }

    #[test]
    fn texture_units() {
        let (mut video, trace) = recorded();
        let texture = video.create_texture("t", texture_params(), None).unwrap();

        assert_eq!(video.texture("t"), Some(texture));
        assert_eq!(video.texture_unit(texture).unwrap(), 0);
        assert_eq!(video.texture_unit(texture).unwrap(), 0);
        assert_eq!(video.stats().texture_binds, 1);
        assert!(trace.lock().contains(&Trace::BindTexture(0, texture)));

        // Re-creating a texture under the same name keeps the name resolvable.
        let other = video.create_texture("t", texture_params(), None).unwrap();
        assert_ne!(texture, other);
        assert_eq!(video.texture("t"), Some(other));
        assert!(video.texture_unit(texture).is_err());
        assert!(video.texture_params(texture).is_none());
    }

    #[test]
    fn invalid_textures() {
        let mut video = VideoSystem::headless(VideoParams::default()).unwrap();
        assert!(video
            .create_texture("zero", TextureParams::default(), None)
            .is_err());
        assert_eq!(video.texture("zero"), None);

        let data = vec![0; 4 * 4 * 4 + 1];
        assert!(video
            .create_texture("large", texture_params(), Some(&data))
            .is_err());
    }

    #[test]
    fn frame_stats() {
        let mut video = VideoSystem::headless(VideoParams::default()).unwrap();

        let mut params = MeshParams::default();
        params.layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .finish();
        params.num_verts = 3;

        let shader = video.create_shader("s", ShaderParams::default(), VS, FS);
        let mesh = video.create_mesh(params, None).unwrap();
        assert!(video.update_vertex_buffer(mesh, 0, &[0; 4]).is_err());

        video.use_program(shader).unwrap();
        video.bind_attributes(shader, mesh).unwrap();
        video.draw(shader, mesh, MeshIndex::All).unwrap();
        video.draw(shader, mesh, MeshIndex::All).unwrap();

        let info = video.stats();
        assert_eq!(info.drawcalls, 2);
        assert_eq!(info.primitives, 2);

        video.advance().unwrap();
        assert_eq!(video.stats(), VideoFrameInfo::default());
    }
}
