use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::math::Vector2;
use crate::video::assets::prelude::*;

use super::program::Program;
use super::types::{check, PixelFormat};

/// Generates one object name with a `glGen*` function.
pub unsafe fn generate(gen: unsafe fn(GLsizei, *mut GLuint), kind: &str) -> Result<GLuint> {
    let mut id = 0;
    gen(1, &mut id);
    if id == 0 {
        bail!("Failed to generate {} object.", kind);
    }

    Ok(id)
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
    match data {
        Some(v) if !v.is_empty() => v.as_ptr() as *const c_void,
        _ => ptr::null(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GLTexture {
    pub id: GLuint,
    pub params: TextureParams,
}

/// The number of levels in a full mipmap chain of `dimensions`.
pub fn mip_levels(dimensions: Vector2<u32>) -> u32 {
    32 - dimensions.x.max(dimensions.y).max(1).leading_zeros()
}

impl GLTexture {
    /// Allocates the storage of a texture which has been bound to the active
    /// unit, and uploads `data` into its first level.
    pub unsafe fn allocate(id: GLuint, params: TextureParams, data: Option<&[u8]>) -> Result<Self> {
        let levels = if params.mipmap {
            mip_levels(params.dimensions)
        } else {
            1
        };

        let wrap = GLenum::from(params.wrap) as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);

        let (min, mag) = match (params.filter, levels > 1) {
            (TextureFilter::Nearest, false) => (gl::NEAREST, gl::NEAREST),
            (TextureFilter::Nearest, true) => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
            (TextureFilter::Linear, false) => (gl::LINEAR, gl::LINEAR),
            (TextureFilter::Linear, true) => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
        };

        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, (levels - 1) as GLint);

        let pixels = PixelFormat::from(params.format);
        let ptr = data_ptr(data);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            pixels.internal as GLint,
            params.dimensions.x as GLsizei,
            params.dimensions.y as GLsizei,
            0,
            pixels.format,
            pixels.pixel,
            ptr,
        );

        if levels > 1 && !ptr.is_null() {
            gl::GenerateMipmap(gl::TEXTURE_2D);
        }

        check()?;
        Ok(GLTexture { id, params })
    }
}

pub unsafe fn create_render_buffer(params: RenderBufferParams) -> Result<GLuint> {
    let id = generate(gl::GenRenderbuffers, "render buffer")?;
    gl::BindRenderbuffer(gl::RENDERBUFFER, id);
    gl::RenderbufferStorage(
        gl::RENDERBUFFER,
        params.format.into(),
        params.dimensions.x as GLsizei,
        params.dimensions.y as GLsizei,
    );
    gl::BindRenderbuffer(gl::RENDERBUFFER, 0);

    check()?;
    Ok(id)
}

/// The resolved depth attachment of a framebuffer.
pub enum DepthAttachment {
    None,
    Texture(GLuint),
    RenderBuffer(GLuint),
}

/// Creates a framebuffer object. Leaves the default framebuffer bound.
pub unsafe fn create_framebuffer(color: Option<GLuint>, depth: DepthAttachment) -> Result<GLuint> {
    let id = generate(gl::GenFramebuffers, "framebuffer")?;
    gl::BindFramebuffer(gl::FRAMEBUFFER, id);

    match color {
        Some(texture) => gl::FramebufferTexture2D(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            texture,
            0,
        ),
        None => {
            gl::DrawBuffer(gl::NONE);
            gl::ReadBuffer(gl::NONE);
        }
    }

    match depth {
        DepthAttachment::Texture(texture) => gl::FramebufferTexture2D(
            gl::FRAMEBUFFER,
            gl::DEPTH_ATTACHMENT,
            gl::TEXTURE_2D,
            texture,
            0,
        ),
        DepthAttachment::RenderBuffer(rb) => gl::FramebufferRenderbuffer(
            gl::FRAMEBUFFER,
            gl::DEPTH_ATTACHMENT,
            gl::RENDERBUFFER,
            rb,
        ),
        DepthAttachment::None => {}
    }

    gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
    check()?;
    Ok(id)
}

/// Checks the completeness of framebuffer `id`. Leaves the default framebuffer bound.
pub unsafe fn framebuffer_status(id: GLuint) -> Result<()> {
    gl::BindFramebuffer(gl::FRAMEBUFFER, id);
    let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
    gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

    let reason = match status {
        gl::FRAMEBUFFER_COMPLETE => return Ok(()),
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "an attachment is incomplete",
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "no images are attached",
        gl::FRAMEBUFFER_UNSUPPORTED => "the combination of attachment formats is unsupported",
        _ => "unknown status",
    };

    bail!("[GL] Surface is incomplete, {}.", reason)
}

#[derive(Debug, Clone, Copy)]
pub struct GLMesh {
    pub vbo: GLuint,
    pub ibo: Option<GLuint>,
    pub params: MeshParams,
}

impl GLMesh {
    pub unsafe fn new(params: MeshParams, data: Option<&MeshData>) -> Result<Self> {
        let vbo = create_buffer(
            gl::ARRAY_BUFFER,
            params.hint,
            params.vertex_buffer_len(),
            data.map(|v| v.vptr.as_slice()),
        )?;

        let ibo = if params.num_idxes > 0 {
            let ibo = create_buffer(
                gl::ELEMENT_ARRAY_BUFFER,
                params.hint,
                params.index_buffer_len(),
                data.map(|v| v.iptr.as_slice()),
            );

            match ibo {
                Ok(ibo) => Some(ibo),
                Err(err) => {
                    gl::DeleteBuffers(1, &vbo);
                    return Err(err);
                }
            }
        } else {
            None
        };

        Ok(GLMesh { vbo, ibo, params })
    }

    pub unsafe fn update(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo);
        gl::BufferSubData(
            gl::ARRAY_BUFFER,
            offset as GLsizeiptr,
            bytes.len() as GLsizeiptr,
            bytes.as_ptr() as *const c_void,
        );

        check()
    }

    pub unsafe fn delete(&self) {
        gl::DeleteBuffers(1, &self.vbo);
        if let Some(ibo) = self.ibo {
            gl::DeleteBuffers(1, &ibo);
        }
    }

    /// Builds a vertex array object which feeds the vertex buffer into the
    /// attributes of `program`. Leaves it bound.
    pub unsafe fn vertex_array(&self, program: &Program) -> Result<GLuint> {
        let layout = &self.params.layout;
        let stride = GLsizei::from(layout.stride());

        let vao = generate(gl::GenVertexArrays, "vertex array")?;
        gl::BindVertexArray(vao);
        gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo);

        for (attribute, size, required) in program.params.attributes.iter() {
            let element = match layout.element(attribute) {
                Some(element) => element,
                None if required => {
                    gl::BindVertexArray(0);
                    gl::DeleteVertexArrays(1, &vao);
                    bail!("Vertex layout of mesh misses attribute {:?}.", attribute);
                }
                None => continue,
            };

            if element.size < size {
                gl::BindVertexArray(0);
                gl::DeleteVertexArrays(1, &vao);
                bail!(
                    "Attribute {:?} has {} components in vertex layout, {} required.",
                    attribute,
                    element.size,
                    size
                );
            }

            let name: &'static str = attribute.into();
            let location = program.attribute_location(name)?;
            if location < 0 {
                continue;
            }

            let offset = layout.offset(attribute).unwrap_or(0);
            gl::EnableVertexAttribArray(location as GLuint);
            gl::VertexAttribPointer(
                location as GLuint,
                GLint::from(element.size),
                element.format.into(),
                if element.normalized { gl::TRUE } else { gl::FALSE },
                stride,
                usize::from(offset) as *const c_void,
            );
        }

        if let Some(ibo) = self.ibo {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
        }

        check()?;
        Ok(vao)
    }
}

unsafe fn create_buffer(
    target: GLenum,
    hint: MeshHint,
    len: usize,
    data: Option<&[u8]>,
) -> Result<GLuint> {
    let id = generate(gl::GenBuffers, "buffer")?;
    gl::BindBuffer(target, id);
    gl::BufferData(target, len as GLsizeiptr, data_ptr(data), hint.into());

    if let Err(err) = check() {
        gl::DeleteBuffers(1, &id);
        return Err(err);
    }

    Ok(id)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mipmap_levels() {
        assert_eq!(mip_levels(Vector2::new(0, 0)), 1);
        assert_eq!(mip_levels(Vector2::new(1, 1)), 1);
        assert_eq!(mip_levels(Vector2::new(512, 384)), 10);
        assert_eq!(mip_levels(Vector2::new(1024, 1)), 11);
    }
}
