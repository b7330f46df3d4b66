//! Build-in uniform variables that are filled before every draw.

use crate::video::assets::shader::UniformVariableType;

/// Maximum number of lights of an `Illumination`.
pub const MAX_LIGHTS: usize = 4;

macro_rules! impl_render_uniforms {
    ($name: ident { $($uniform: ident => [$tt: ident, $field: tt], )* }) => {
        /// A list of supported build-in uniform variables that would be filled when
        /// applying a `RenderCommand`.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $uniform, )*
        }

        impl $name {
            pub const UNIFORMS: &'static [$name] = &[ $( $name::$uniform, )* ];

            pub const FIELDS: &'static [&'static str] = &[ $( $field, )* ];

            pub const TYPES: &'static [UniformVariableType] = &[
                $( UniformVariableType::$tt, )*
            ];

            #[inline]
            pub fn name(self) -> &'static str {
                Self::FIELDS[self as usize]
            }

            #[inline]
            pub fn variable_type(self) -> UniformVariableType {
                Self::TYPES[self as usize]
            }
        }

        impl From<$name> for &'static str {
            fn from(v: $name) -> Self {
                v.name()
            }
        }
    };
}

impl_render_uniforms!(
    RenderUniform {
        Model => [Matrix4f, "model"],
        View => [Matrix4f, "view"],
        Projection => [Matrix4f, "projection"],
        ModelView => [Matrix4f, "modelView"],
        InverseModelView => [Matrix4f, "inverseModelView"],
        ModelViewProjection => [Matrix4f, "modelViewProjection"],
        NormalMatrix => [Matrix3f, "normalMatrix"],
        Time => [F32, "time"],
        AmbientColor => [Vector4f, "ambientColor"],
        LightColor0 => [Vector4f, "lightColor[0]"],
        LightColor1 => [Vector4f, "lightColor[1]"],
        LightColor2 => [Vector4f, "lightColor[2]"],
        LightColor3 => [Vector4f, "lightColor[3]"],
        LightPVM0 => [Matrix4f, "lightPVM[0]"],
        LightPVM1 => [Matrix4f, "lightPVM[1]"],
        LightPVM2 => [Matrix4f, "lightPVM[2]"],
        LightPVM3 => [Matrix4f, "lightPVM[3]"],
    }
);

impl RenderUniform {
    pub const LIGHT_COLORS: [RenderUniform; MAX_LIGHTS] = [
        RenderUniform::LightColor0,
        RenderUniform::LightColor1,
        RenderUniform::LightColor2,
        RenderUniform::LightColor3,
    ];

    pub const LIGHT_PVMS: [RenderUniform; MAX_LIGHTS] = [
        RenderUniform::LightPVM0,
        RenderUniform::LightPVM1,
        RenderUniform::LightPVM2,
        RenderUniform::LightPVM3,
    ];
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fields() {
        assert_eq!(RenderUniform::UNIFORMS.len(), RenderUniform::FIELDS.len());
        assert_eq!(RenderUniform::UNIFORMS.len(), RenderUniform::TYPES.len());

        assert_eq!(RenderUniform::NormalMatrix.name(), "normalMatrix");
        assert_eq!(
            RenderUniform::NormalMatrix.variable_type(),
            UniformVariableType::Matrix3f
        );

        assert_eq!(RenderUniform::LIGHT_COLORS[2].name(), "lightColor[2]");
        assert_eq!(RenderUniform::LIGHT_PVMS[3].name(), "lightPVM[3]");
    }
}
