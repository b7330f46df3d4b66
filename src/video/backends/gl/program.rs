use std::cell::RefCell;
use std::ffi::CString;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::utils::hash::FastHashMap;
use crate::utils::hash_value::HashValue;
use crate::video::assets::prelude::*;

use super::types::check;

type Locations = RefCell<FastHashMap<HashValue, GLint>>;

/// A linked program object, with its uniform and attribute locations cached
/// by name.
#[derive(Debug, Clone)]
pub struct Program {
    pub id: GLuint,
    pub params: ShaderParams,
    uniforms: Locations,
    attributes: Locations,
}

impl Program {
    /// Compiles and links `vs` and `fs`. Fails if a required attribute of
    /// `params` is not an active input of the vertex stage.
    pub unsafe fn build(params: &ShaderParams, vs: &str, fs: &str) -> Result<Self> {
        let vs = compile(gl::VERTEX_SHADER, vs)?;
        let fs = match compile(gl::FRAGMENT_SHADER, fs) {
            Ok(fs) => fs,
            Err(err) => {
                gl::DeleteShader(vs);
                return Err(err);
            }
        };

        let linked = link(vs, fs);
        gl::DeleteShader(vs);
        gl::DeleteShader(fs);

        let program = Program {
            id: linked?,
            params: *params,
            uniforms: RefCell::default(),
            attributes: RefCell::default(),
        };

        for (attribute, _, required) in params.attributes.iter() {
            let name: &'static str = attribute.into();
            if required && program.attribute_location(name)? < 0 {
                program.delete();
                bail!("Attribute {:?} is not an input of the vertex shader.", attribute);
            }
        }

        check()?;
        Ok(program)
    }

    pub unsafe fn delete(&self) {
        gl::DeleteProgram(self.id);
    }

    /// The location of uniform `name`, or -1 if the linker optimized it away.
    pub unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        locate(&self.uniforms, name, |v| gl::GetUniformLocation(self.id, v))
    }

    pub unsafe fn attribute_location(&self, name: &str) -> Result<GLint> {
        locate(&self.attributes, name, |v| gl::GetAttribLocation(self.id, v))
    }

    /// Uploads `variable` into the program, which must be in use. Writes to
    /// inactive uniforms are dropped.
    pub unsafe fn upload(&self, name: &str, variable: &UniformVariable) -> Result<()> {
        let location = self.uniform_location(name)?;
        if location < 0 {
            return Ok(());
        }

        match *variable {
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector2f(v) => gl::Uniform2fv(location, 1, v.as_ptr()),
            UniformVariable::Vector3f(v) => gl::Uniform3fv(location, 1, v.as_ptr()),
            UniformVariable::Vector4f(v) => gl::Uniform4fv(location, 1, v.as_ptr()),
            UniformVariable::Matrix2f(v) => {
                gl::UniformMatrix2fv(location, 1, gl::FALSE, v.as_ptr() as *const f32)
            }
            UniformVariable::Matrix3f(v) => {
                gl::UniformMatrix3fv(location, 1, gl::FALSE, v.as_ptr() as *const f32)
            }
            UniformVariable::Matrix4f(v) => {
                gl::UniformMatrix4fv(location, 1, gl::FALSE, v.as_ptr() as *const f32)
            }
        }

        check()
    }
}

unsafe fn locate<F>(cache: &Locations, name: &str, query: F) -> Result<GLint>
where
    F: FnOnce(*const GLchar) -> GLint,
{
    let key = HashValue::from(name);
    if let Some(&location) = cache.borrow().get(&key) {
        return Ok(location);
    }

    let c_name = CString::new(name)?;
    let location = query(c_name.as_ptr());
    check()?;

    cache.borrow_mut().insert(key, location);
    Ok(location)
}

unsafe fn compile(stage: GLenum, source: &str) -> Result<GLuint> {
    let source = CString::new(source)?;
    let id = gl::CreateShader(stage);
    gl::ShaderSource(id, 1, &source.as_ptr(), ptr::null());
    gl::CompileShader(id);

    let mut status = GLint::from(gl::FALSE);
    gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut status);
    if status == GLint::from(gl::TRUE) {
        return Ok(id);
    }

    let mut len = 0;
    gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len);
    let mut log = vec![0u8; len.max(1) as usize];
    gl::GetShaderInfoLog(id, len, ptr::null_mut(), log.as_mut_ptr() as *mut GLchar);
    gl::DeleteShader(id);

    let stage = if stage == gl::VERTEX_SHADER {
        "vertex"
    } else {
        "fragment"
    };

    bail!("Failed to compile {} shader: {}", stage, info_log(&log))
}

unsafe fn link(vs: GLuint, fs: GLuint) -> Result<GLuint> {
    let id = gl::CreateProgram();
    gl::AttachShader(id, vs);
    gl::AttachShader(id, fs);
    gl::LinkProgram(id);
    gl::DetachShader(id, vs);
    gl::DetachShader(id, fs);

    let mut status = GLint::from(gl::FALSE);
    gl::GetProgramiv(id, gl::LINK_STATUS, &mut status);
    if status == GLint::from(gl::TRUE) {
        return Ok(id);
    }

    let mut len = 0;
    gl::GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut len);
    let mut log = vec![0u8; len.max(1) as usize];
    gl::GetProgramInfoLog(id, len, ptr::null_mut(), log.as_mut_ptr() as *mut GLchar);
    gl::DeleteProgram(id);

    bail!("Failed to link program: {}", info_log(&log))
}

fn info_log(log: &[u8]) -> String {
    String::from_utf8_lossy(log)
        .trim_end_matches('\0')
        .trim()
        .to_owned()
}
