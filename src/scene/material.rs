use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::Result;
use crate::utils::hash::{FastHashMap, FastHashSet};
use crate::video::assets::shader::{ShaderHandle, UniformVariable};
use crate::video::VideoSystem;

use super::errors::Error;
use super::uniforms::RenderUniform;

static MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy)]
struct Uniform {
    variable: UniformVariable,
    dirty: bool,
}

/// A shader plus the uniform values and texture samplers it is drawn with.
///
/// Shaders and textures are referred by name and resolved against the
/// `VideoSystem` every time the material is bound, so a material can be set up
/// before its resources are loaded.
#[derive(Debug)]
pub struct Material {
    id: u64,
    shader: String,
    textures: Vec<(String, String)>,
    uniforms: FastHashMap<String, Uniform>,
    program: Option<ShaderHandle>,
    missing: FastHashSet<String>,
}

pub type MaterialRef = Arc<RwLock<Material>>;

impl Material {
    pub fn new<T: Into<String>>(shader: T) -> Self {
        Material {
            id: MATERIAL_ID.fetch_add(1, Ordering::Relaxed),
            shader: shader.into(),
            textures: Vec::new(),
            uniforms: FastHashMap::default(),
            program: None,
            missing: FastHashSet::default(),
        }
    }

    #[inline]
    pub fn into_ref(self) -> MaterialRef {
        Arc::new(RwLock::new(self))
    }

    /// The name of the shader this material draws with.
    #[inline]
    pub fn name(&self) -> &str {
        &self.shader
    }

    pub fn set_shader<T: Into<String>>(&mut self, shader: T) {
        self.shader = shader.into();
        self.program = None;
    }

    /// Creates or updates the uniform `name`. The type of a uniform is fixed
    /// once it has been created; setting a value of another type fails and
    /// leaves the stored value untouched.
    pub fn set_shader_uniform<T1, T2>(&mut self, name: T1, value: T2) -> Result<()>
    where
        T1: AsRef<str>,
        T2: Into<UniformVariable>,
    {
        let name = name.as_ref();
        let variable = value.into();

        if let Some(uniform) = self.uniforms.get_mut(name) {
            let expected = uniform.variable.variable_type();
            if expected != variable.variable_type() {
                return Err(Error::UniformTypeMismatch {
                    name: name.to_owned(),
                    expected,
                    found: variable.variable_type(),
                }
                .into());
            }

            if uniform.variable != variable {
                uniform.variable = variable;
                uniform.dirty = true;
            }

            return Ok(());
        }

        self.uniforms.insert(
            name.to_owned(),
            Uniform {
                variable,
                dirty: true,
            },
        );

        Ok(())
    }

    /// Sets a build-in uniform. Type mismatches are logged and dropped.
    pub(crate) fn set_render_uniform<T: Into<UniformVariable>>(
        &mut self,
        uniform: RenderUniform,
        value: T,
    ) {
        if let Err(err) = self.set_shader_uniform(uniform.name(), value) {
            error!("{}", err);
        }
    }

    #[inline]
    pub fn shader_uniform(&self, name: &str) -> Option<UniformVariable> {
        self.uniforms.get(name).map(|v| v.variable)
    }

    #[inline]
    pub fn has_shader_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Binds the texture registered as `texture` to the sampler uniform `sampler`.
    pub fn add_texture<T1, T2>(&mut self, sampler: T1, texture: T2)
    where
        T1: Into<String>,
        T2: Into<String>,
    {
        let pair = (sampler.into(), texture.into());
        if !self.textures.contains(&pair) {
            self.textures.push(pair);
        }
    }

    pub fn remove_texture(&mut self, sampler: &str) {
        self.textures.retain(|(v, _)| v != sampler);
    }

    /// Iterates over the `(sampler, texture)` bindings.
    pub fn textures(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.textures.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Makes this material current: resolves its textures to texture units,
    /// switches program if needed and uploads uniforms. Everything is uploaded
    /// if the program holds values of another material, otherwise only what
    /// changed since the last upload.
    ///
    /// Leaves the current program and texture units changed.
    pub fn bind(&mut self, video: &mut VideoSystem) -> Result<ShaderHandle> {
        let shader = video.shader(&self.shader);

        for i in 0..self.textures.len() {
            let (sampler, texture) = self.textures[i].clone();
            let handle = match video.texture(&texture) {
                Some(handle) => handle,
                None => {
                    if self.missing.insert(texture.clone()) {
                        warn!(
                            "Texture {} of sampler {} is not loaded yet.",
                            texture, sampler
                        );
                    }
                    continue;
                }
            };

            self.missing.remove(&texture);
            let unit = video.texture_unit(handle)?;
            self.set_shader_uniform(&sampler, unit as i32)?;
        }

        video.use_program(shader)?;

        let claimed = video.claim_program(shader, self.id);
        let full = claimed || self.program != Some(shader);
        self.program = Some(shader);

        for (name, uniform) in self.uniforms.iter_mut() {
            if full || uniform.dirty {
                video.bind_uniform(shader, name, &uniform.variable)?;
                uniform.dirty = false;
            }
        }

        Ok(shader)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Matrix4;
    use crate::math::SquareMatrix;
    use crate::video::assets::shader::UniformVariableType;

    #[test]
    fn uniform_types() {
        let mut material = Material::new("phong");
        material.set_shader_uniform("intensity", 0.5f32).unwrap();
        material
            .set_shader_uniform("model", Matrix4::<f32>::identity())
            .unwrap();

        let err = material.set_shader_uniform("intensity", 1i32).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::UniformTypeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(*expected, UniformVariableType::F32);
                assert_eq!(*found, UniformVariableType::I32);
            }
            _ => panic!("unexpected error {}", err),
        }

        assert_eq!(
            material.shader_uniform("intensity"),
            Some(UniformVariable::F32(0.5))
        );

        material.set_shader_uniform("intensity", 0.25f32).unwrap();
        assert_eq!(
            material.shader_uniform("intensity"),
            Some(UniformVariable::F32(0.25))
        );
    }

    #[test]
    fn textures() {
        let mut material = Material::new("phong");
        material.add_texture("diffuse", "wood");
        material.add_texture("diffuse", "wood");
        material.add_texture("shadow", "shadow_map");
        assert_eq!(material.textures().count(), 2);

        material.remove_texture("diffuse");
        assert_eq!(
            material.textures().collect::<Vec<_>>(),
            vec![("shadow", "shadow_map")]
        );
    }

    #[test]
    fn set_shader() {
        let mut material = Material::new("phong");
        assert_eq!(material.name(), "phong");
        material.set_shader("flat");
        assert_eq!(material.name(), "flat");
    }

    #[test]
    fn unique_ids() {
        let a = Material::new("a");
        let b = Material::new("a");
        assert_ne!(a.id, b.id);
    }
}
