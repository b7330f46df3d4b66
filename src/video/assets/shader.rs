//! Shader program parameters, fixed-function render state and uniform values.

use std::str::FromStr;

use crate::math::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use crate::video::assets::mesh::VertexLayout;
use crate::video::errors::{Error, Result};
use crate::video::MAX_VERTEX_ATTRIBUTES;

impl_handle!(ShaderHandle);

/// The parameters of a shader program: the vertex attributes it consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShaderParams {
    pub attributes: AttributeLayout,
}

impl ShaderParams {
    /// Rejects programs with an empty stage. Compilation errors are left to the backend.
    pub fn validate(&self, vs: &str, fs: &str) -> Result<()> {
        for (stage, source) in &[("vertex", vs), ("fragment", fs)] {
            if source.trim().is_empty() {
                let reason = format!("the {} stage has no source", stage);
                return Err(Error::ShaderInvalid(reason));
            }
        }

        Ok(())
    }
}

/// The semantic of a vertex component. Shaders declare inputs named after the
/// variant, e.g. `attribute vec3 Position;`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Attribute {
    Position = 0,
    Normal = 1,
    Tangent = 2,
    Color0 = 3,
    Texcoord0 = 4,
    Texcoord1 = 5,
    /// Per-particle scalar, e.g. the charge or temperature of a spark point.
    Intensity = 6,
    PointSize = 7,
}

const ATTRIBUTE_NAMES: [(Attribute, &str); MAX_VERTEX_ATTRIBUTES] = [
    (Attribute::Position, "Position"),
    (Attribute::Normal, "Normal"),
    (Attribute::Tangent, "Tangent"),
    (Attribute::Color0, "Color0"),
    (Attribute::Texcoord0, "Texcoord0"),
    (Attribute::Texcoord1, "Texcoord1"),
    (Attribute::Intensity, "Intensity"),
    (Attribute::PointSize, "PointSize"),
];

impl From<Attribute> for &'static str {
    fn from(v: Attribute) -> Self {
        ATTRIBUTE_NAMES[v as usize].1
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ATTRIBUTE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(v, _)| *v)
            .ok_or_else(|| Error::AttributeUndefined(s.to_owned()))
    }
}

/// The vertex inputs of a program: per attribute, the components it reads and
/// whether meshes drawn with it must provide them.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct AttributeLayout {
    inputs: [Option<(Attribute, u8, bool)>; MAX_VERTEX_ATTRIBUTES],
}

impl AttributeLayout {
    pub fn build() -> AttributeLayoutBuilder {
        AttributeLayoutBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, u8, bool)> + '_ {
        self.inputs.iter().filter_map(|v| *v)
    }

    /// Whether `layout` provides every required input with enough components.
    pub fn is_match(&self, layout: &VertexLayout) -> bool {
        self.iter()
            .filter(|&(_, _, required)| required)
            .all(|(name, size, _)| match layout.element(name) {
                Some(element) => element.size >= size,
                None => false,
            })
    }
}

#[derive(Default)]
pub struct AttributeLayoutBuilder {
    inputs: Vec<(Attribute, u8, bool)>,
}

impl AttributeLayoutBuilder {
    #[inline]
    pub fn with(self, attribute: Attribute, size: u8) -> Self {
        self.input(attribute, size, true)
    }

    #[inline]
    pub fn with_optional(self, attribute: Attribute, size: u8) -> Self {
        self.input(attribute, size, false)
    }

    fn input(mut self, attribute: Attribute, size: u8, required: bool) -> Self {
        assert!(size >= 1 && size <= 4, "{} components of {:?}.", size, attribute);

        match self.inputs.iter_mut().find(|v| v.0 == attribute) {
            Some(v) => *v = (attribute, size, required),
            None => self.inputs.push((attribute, size, required)),
        }

        self
    }

    pub fn finish(self) -> AttributeLayout {
        let mut layout = AttributeLayout::default();
        for (slot, input) in layout.inputs.iter_mut().zip(self.inputs) {
            *slot = Some(input);
        }

        layout
    }
}

/// Which winding gets discarded before rasterization.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum CullFace {
    Nothing,
    Front,
    Back,
}

/// The winding order of front faces.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum FrontFaceOrder {
    Clockwise,
    CounterClockwise,
}

/// Depth comparison. `Always` together with disabled depth writes turns depth testing off.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Comparison {
    Never,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Always,
}

/// How a fragment (source) is combined with the framebuffer (destination).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Equation {
    /// `src * src_factor + dst * dst_factor`
    Add,
    /// Subtracts destination from source.
    Subtract,
    /// Subtracts source from destination.
    ReverseSubtract,
    /// Component-wise minimum of source and destination. Factors are ignored.
    Min,
    /// Component-wise maximum of source and destination. Factors are ignored.
    Max,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BlendValue {
    SourceColor,
    SourceAlpha,
    DestinationColor,
    DestinationAlpha,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    Value(BlendValue),
    OneMinusValue(BlendValue),
}

/// Fixed-function state a render pass applies before drawing.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct RenderState {
    pub cull_face: CullFace,
    pub front_face_order: FrontFaceOrder,
    pub depth_test: Comparison,
    pub depth_write: bool,
    pub color_blend: Option<(Equation, BlendFactor, BlendFactor)>,
    pub color_write: (bool, bool, bool, bool),
    pub wireframe: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            cull_face: CullFace::Nothing,
            front_face_order: FrontFaceOrder::CounterClockwise,
            depth_test: Comparison::Always,
            depth_write: false,
            color_blend: None,
            color_write: (true, true, true, true),
            wireframe: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformVariableType {
    I32,
    F32,
    Vector2f,
    Vector3f,
    Vector4f,
    Matrix2f,
    Matrix3f,
    Matrix4f,
}

/// Uniform variable for video program object. Matrices are stored column-major,
/// the way `cgmath` lays them out.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix2f([[f32; 2]; 2]),
    Matrix3f([[f32; 3]; 3]),
    Matrix4f([[f32; 4]; 4]),
}

impl UniformVariable {
    pub fn variable_type(&self) -> UniformVariableType {
        match *self {
            UniformVariable::I32(_) => UniformVariableType::I32,
            UniformVariable::F32(_) => UniformVariableType::F32,
            UniformVariable::Vector2f(_) => UniformVariableType::Vector2f,
            UniformVariable::Vector3f(_) => UniformVariableType::Vector3f,
            UniformVariable::Vector4f(_) => UniformVariableType::Vector4f,
            UniformVariable::Matrix2f(_) => UniformVariableType::Matrix2f,
            UniformVariable::Matrix3f(_) => UniformVariableType::Matrix3f,
            UniformVariable::Matrix4f(_) => UniformVariableType::Matrix4f,
        }
    }
}

macro_rules! impl_uniform_from {
    ($ty:ty, $variant:ident, $v:ident => $e:expr) => {
        impl From<$ty> for UniformVariable {
            fn from($v: $ty) -> Self {
                UniformVariable::$variant($e)
            }
        }
    };
}

impl_uniform_from!(i32, I32, v => v);
impl_uniform_from!(f32, F32, v => v);
impl_uniform_from!([f32; 2], Vector2f, v => v);
impl_uniform_from!([f32; 3], Vector3f, v => v);
impl_uniform_from!([f32; 4], Vector4f, v => v);
impl_uniform_from!(Vector2<f32>, Vector2f, v => v.into());
impl_uniform_from!(Vector3<f32>, Vector3f, v => v.into());
impl_uniform_from!(Vector4<f32>, Vector4f, v => v.into());
impl_uniform_from!(Matrix2<f32>, Matrix2f, v => v.into());
impl_uniform_from!(Matrix3<f32>, Matrix3f, v => v.into());
impl_uniform_from!(Matrix4<f32>, Matrix4f, v => v.into());
impl_uniform_from!(crate::math::Color, Vector4f, v => v.rgba());
