//! Lights whose uniforms are pushed into a material before every draw.

use crate::math::*;

use super::material::Material;
use super::projection::ProjectionRef;
use super::uniforms::{RenderUniform, MAX_LIGHTS};

#[derive(Debug, Clone)]
pub struct Light {
    /// Color of the light.
    pub color: Color,
    /// The projection a shadow-casting light renders its shadow map with.
    pub shadow: Option<ProjectionRef>,
}

impl Light {
    pub fn new(color: Color) -> Self {
        Light {
            color,
            shadow: None,
        }
    }

    pub fn with_shadow(color: Color, shadow: ProjectionRef) -> Self {
        Light {
            color,
            shadow: Some(shadow),
        }
    }
}

/// An ambient color plus an ordered list of lights.
#[derive(Debug, Clone)]
pub struct Illumination {
    pub ambient: Color,
    lights: Vec<Light>,
}

impl Default for Illumination {
    fn default() -> Self {
        Illumination {
            ambient: Color::black(),
            lights: Vec::new(),
        }
    }
}

impl Illumination {
    pub fn new(ambient: Color) -> Self {
        Illumination {
            ambient,
            lights: Vec::new(),
        }
    }

    /// Appends a light. Lights beyond `MAX_LIGHTS` are dropped with a warning.
    pub fn add_light(&mut self, light: Light) {
        if self.lights.len() >= MAX_LIGHTS {
            warn!("At most {} lights are supported, light ignored.", MAX_LIGHTS);
            return;
        }

        self.lights.push(light);
    }

    #[inline]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Pushes the light uniforms of a draw with `model` transform into `material`.
    pub fn apply(&self, material: &mut Material, model: Matrix4<f32>) {
        material.set_render_uniform(RenderUniform::AmbientColor, self.ambient);

        for (i, light) in self.lights.iter().enumerate() {
            material.set_render_uniform(RenderUniform::LIGHT_COLORS[i], light.color);

            if let Some(ref shadow) = light.shadow {
                let shadow = shadow.read();
                let pvm = shadow.projection_matrix() * shadow.view_matrix() * model;
                material.set_render_uniform(RenderUniform::LIGHT_PVMS[i], pvm);
            }
        }
    }
}
