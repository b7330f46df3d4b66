//! Shadows the parts of the GL context the visitor touches, so redundant state
//! changes never reach the driver.

use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::errors::*;
use crate::math::Color;
use crate::utils::hash::FastHashMap;
use crate::video::assets::prelude::*;

use super::types::{self, check};

pub struct StateCache {
    render_state: RenderState,
    viewport: Option<SurfaceViewport>,
    framebuffer: Option<Option<SurfaceHandle>>,
    program: Option<ShaderHandle>,
    active_unit: usize,
    textures: SmallVec<[Option<TextureHandle>; 16]>,
    vertex_arrays: FastHashMap<(ShaderHandle, MeshHandle), GLuint>,
    vertex_array: Option<(ShaderHandle, MeshHandle)>,
}

impl StateCache {
    /// Puts the context into the state `RenderState::default` describes.
    pub unsafe fn new() -> Result<Self> {
        let render_state = RenderState::default();

        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        gl::Disable(gl::CULL_FACE);
        gl::FrontFace(render_state.front_face_order.into());
        gl::Disable(gl::DEPTH_TEST);
        gl::DepthMask(types::boolean(render_state.depth_write));
        gl::DepthFunc(render_state.depth_test.into());
        gl::Disable(gl::BLEND);
        gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
        gl::PolygonMode(gl::FRONT_AND_BACK, gl::FILL);
        check()?;

        Ok(StateCache {
            render_state,
            viewport: None,
            framebuffer: None,
            program: None,
            active_unit: 0,
            textures: SmallVec::new(),
            vertex_arrays: FastHashMap::default(),
            vertex_array: None,
        })
    }

    pub unsafe fn use_program(&mut self, handle: ShaderHandle, id: GLuint) -> Result<()> {
        if self.program != Some(handle) {
            gl::UseProgram(id);
            self.program = Some(handle);
            check()?;
        }

        Ok(())
    }

    pub unsafe fn bind_framebuffer(&mut self, handle: Option<SurfaceHandle>, id: GLuint) -> Result<()> {
        if self.framebuffer != Some(handle) {
            gl::BindFramebuffer(gl::FRAMEBUFFER, id);
            self.framebuffer = Some(handle);
            check()?;
        }

        Ok(())
    }

    /// Marks the bound framebuffer unknown, after it has been changed behind the cache.
    #[inline]
    pub fn invalidate_framebuffer(&mut self) {
        self.framebuffer = None;
    }

    pub unsafe fn set_viewport(&mut self, viewport: SurfaceViewport) -> Result<()> {
        if self.viewport != Some(viewport) {
            gl::Viewport(
                viewport.position.x,
                viewport.position.y,
                viewport.size.x as GLsizei,
                viewport.size.y as GLsizei,
            );

            self.viewport = Some(viewport);
            check()?;
        }

        Ok(())
    }

    pub unsafe fn bind_texture(&mut self, unit: usize, handle: TextureHandle, id: GLuint) -> Result<()> {
        if self.active_unit != unit {
            gl::ActiveTexture(gl::TEXTURE0 + unit as GLuint);
            self.active_unit = unit;
        }

        if self.textures.len() <= unit {
            self.textures.resize(unit + 1, None);
        }

        if self.textures[unit] != Some(handle) {
            gl::BindTexture(gl::TEXTURE_2D, id);
            self.textures[unit] = Some(handle);
        }

        check()
    }

    /// Looks up the vertex array of a (shader, mesh) pair, building it with
    /// `build` the first time the pair is seen.
    pub unsafe fn bind_vertex_array<F>(
        &mut self,
        shader: ShaderHandle,
        mesh: MeshHandle,
        build: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Result<GLuint>,
    {
        let key = (shader, mesh);
        if self.vertex_array == Some(key) {
            return Ok(());
        }

        match self.vertex_arrays.get(&key) {
            Some(&vao) => {
                gl::BindVertexArray(vao);
                check()?;
            }
            None => {
                let vao = build()?;
                self.vertex_arrays.insert(key, vao);
            }
        }

        self.vertex_array = Some(key);
        Ok(())
    }

    /// Drops everything cached about a deleted shader.
    pub unsafe fn forget_shader(&mut self, handle: ShaderHandle) {
        if self.program == Some(handle) {
            self.program = None;
        }

        self.forget_vertex_arrays(|(shader, _)| shader == handle);
    }

    pub unsafe fn forget_mesh(&mut self, handle: MeshHandle) {
        self.forget_vertex_arrays(|(_, mesh)| mesh == handle);
    }

    unsafe fn forget_vertex_arrays<F>(&mut self, f: F)
    where
        F: Fn((ShaderHandle, MeshHandle)) -> bool,
    {
        if self.vertex_array.map_or(false, &f) {
            gl::BindVertexArray(0);
            self.vertex_array = None;
        }

        self.vertex_arrays.retain(|&key, vao| {
            if f(key) {
                gl::DeleteVertexArrays(1, vao);
                false
            } else {
                true
            }
        });
    }

    pub fn forget_texture(&mut self, handle: TextureHandle) {
        for v in self.textures.iter_mut().filter(|v| **v == Some(handle)) {
            *v = None;
        }
    }

    pub fn forget_surface(&mut self, handle: SurfaceHandle) {
        if self.framebuffer == Some(Some(handle)) {
            self.framebuffer = None;
        }
    }

    /// Clears the bound framebuffer. The masks which would prevent clearing are
    /// lifted first, and stay lifted until the next `apply`.
    pub unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()> {
        let mut bits = 0;

        if let Some(v) = color {
            self.set_color_write((true, true, true, true));
            gl::ClearColor(v.r, v.g, v.b, v.a);
            bits |= gl::COLOR_BUFFER_BIT;
        }

        if let Some(v) = depth {
            let comparison = self.render_state.depth_test;
            self.set_depth(comparison, true);
            gl::ClearDepth(f64::from(v));
            bits |= gl::DEPTH_BUFFER_BIT;
        }

        if bits == 0 {
            return Ok(());
        }

        gl::Clear(bits);
        check()
    }

    /// Applies the fixed-function state, issuing only what differs from the
    /// current one.
    pub unsafe fn apply(&mut self, state: &RenderState) -> Result<()> {
        if self.render_state.cull_face != state.cull_face {
            match state.cull_face {
                CullFace::Nothing => gl::Disable(gl::CULL_FACE),
                CullFace::Front => {
                    gl::Enable(gl::CULL_FACE);
                    gl::CullFace(gl::FRONT);
                }
                CullFace::Back => {
                    gl::Enable(gl::CULL_FACE);
                    gl::CullFace(gl::BACK);
                }
            }

            self.render_state.cull_face = state.cull_face;
        }

        if self.render_state.front_face_order != state.front_face_order {
            gl::FrontFace(state.front_face_order.into());
            self.render_state.front_face_order = state.front_face_order;
        }

        self.set_depth(state.depth_test, state.depth_write);
        self.set_blend(state.color_blend);
        self.set_color_write(state.color_write);

        if self.render_state.wireframe != state.wireframe {
            let mode = if state.wireframe { gl::LINE } else { gl::FILL };
            gl::PolygonMode(gl::FRONT_AND_BACK, mode);
            self.render_state.wireframe = state.wireframe;
        }

        check()
    }

    // The depth buffer is neither tested nor written while GL_DEPTH_TEST is off.
    unsafe fn set_depth(&mut self, comparison: Comparison, write: bool) {
        let rs = &mut self.render_state;
        let enabled = |cmp: Comparison, write: bool| cmp != Comparison::Always || write;

        let enable = enabled(comparison, write);
        if enable != enabled(rs.depth_test, rs.depth_write) {
            if enable {
                gl::Enable(gl::DEPTH_TEST);
            } else {
                gl::Disable(gl::DEPTH_TEST);
            }
        }

        if rs.depth_write != write {
            gl::DepthMask(types::boolean(write));
            rs.depth_write = write;
        }

        if rs.depth_test != comparison {
            gl::DepthFunc(comparison.into());
            rs.depth_test = comparison;
        }
    }

    unsafe fn set_blend(&mut self, blend: Option<(Equation, BlendFactor, BlendFactor)>) {
        let rs = &mut self.render_state;
        if rs.color_blend == blend {
            return;
        }

        match blend {
            Some((equation, src, dst)) => {
                if rs.color_blend.is_none() {
                    gl::Enable(gl::BLEND);
                }

                gl::BlendEquation(equation.into());
                gl::BlendFunc(src.into(), dst.into());
            }
            None => gl::Disable(gl::BLEND),
        }

        rs.color_blend = blend;
    }

    unsafe fn set_color_write(&mut self, mask: (bool, bool, bool, bool)) {
        if self.render_state.color_write != mask {
            gl::ColorMask(
                types::boolean(mask.0),
                types::boolean(mask.1),
                types::boolean(mask.2),
                types::boolean(mask.3),
            );

            self.render_state.color_write = mask;
        }
    }
}
