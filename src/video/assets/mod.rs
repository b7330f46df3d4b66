pub mod mesh;
pub mod shader;
pub mod surface;
pub mod texture;

pub mod prelude {
    pub use super::mesh::{
        IndexFormat, MeshData, MeshHandle, MeshHint, MeshIndex, MeshParams, MeshPrimitive,
        VertexAttribute, VertexFormat, VertexLayout,
    };

    pub use super::shader::{
        Attribute, AttributeLayout, BlendFactor, BlendValue, Comparison, CullFace, Equation,
        FrontFaceOrder, RenderState, ShaderHandle, ShaderParams, UniformVariable,
        UniformVariableType,
    };

    pub use super::surface::{SurfaceDepth, SurfaceHandle, SurfaceParams, SurfaceViewport};

    pub use super::texture::{
        RenderBufferFormat, RenderBufferHandle, RenderBufferParams, TextureFilter, TextureFormat,
        TextureHandle, TextureParams, TextureWrap,
    };
}
