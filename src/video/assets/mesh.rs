//! Vertex and index buffers, and the layout describing their contents.

use crate::video::assets::shader::Attribute;
use crate::video::errors::{Error, Result};
use crate::video::MAX_VERTEX_ATTRIBUTES;

impl_handle!(MeshHandle);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshParams {
    pub hint: MeshHint,
    pub layout: VertexLayout,
    pub index_format: IndexFormat,
    pub primitive: MeshPrimitive,
    pub num_verts: usize,
    /// Zero for non-indexed meshes, which are drawn in vertex order.
    pub num_idxes: usize,
}

impl Default for MeshParams {
    fn default() -> Self {
        MeshParams {
            hint: MeshHint::Immutable,
            layout: VertexLayout::default(),
            index_format: IndexFormat::U16,
            primitive: MeshPrimitive::Triangles,
            num_verts: 0,
            num_idxes: 0,
        }
    }
}

impl MeshParams {
    #[inline]
    pub fn vertex_buffer_len(&self) -> usize {
        self.num_verts * self.layout.stride() as usize
    }

    #[inline]
    pub fn index_buffer_len(&self) -> usize {
        self.num_idxes * self.index_format.stride()
    }

    pub fn validate(&self, data: Option<&MeshData>) -> Result<()> {
        if let Some(buf) = data {
            if buf.vptr.len() > self.vertex_buffer_len() {
                return Err(Error::OutOfBounds(buf.vptr.len(), self.vertex_buffer_len()));
            }

            if buf.iptr.len() > self.index_buffer_len() {
                return Err(Error::OutOfBounds(buf.iptr.len(), self.index_buffer_len()));
            }
        }

        Ok(())
    }
}

/// Raw bytes of the vertex buffer and the index buffer.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vptr: Vec<u8>,
    pub iptr: Vec<u8>,
}

/// How often the CPU is going to rewrite the vertex buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MeshHint {
    /// The resource is initialized with data and cannot be changed later.
    Immutable,
    /// The resource will be re-uploaded by the CPU in most frames.
    Stream,
    /// The resource will be updated by the CPU, but infrequently.
    Dynamic,
}

/// The topology vertices are assembled into.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MeshPrimitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl MeshPrimitive {
    /// The number of primitives assembled out of `indices` vertices.
    pub fn assemble(self, indices: u32) -> u32 {
        match self {
            MeshPrimitive::Points => indices,
            MeshPrimitive::Lines => indices / 2,
            MeshPrimitive::LineStrip => indices.saturating_sub(1),
            MeshPrimitive::Triangles => indices / 3,
            MeshPrimitive::TriangleStrip => indices.saturating_sub(2),
        }
    }
}

/// Specifies the range of a mesh to draw.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MeshIndex {
    /// `(from, len)` in elements.
    Ptr(usize, usize),
    All,
}

impl Default for MeshIndex {
    fn default() -> Self {
        MeshIndex::All
    }
}

/// Vertex indices can be either 16- or 32-bit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    #[inline]
    pub fn stride(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Storage type of a vertex component.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VertexFormat {
    Byte,
    UByte,
    Short,
    UShort,
    Float,
}

impl VertexFormat {
    #[inline]
    pub fn stride(self) -> u8 {
        match self {
            VertexFormat::Byte | VertexFormat::UByte => 1,
            VertexFormat::Short | VertexFormat::UShort => 2,
            VertexFormat::Float => 4,
        }
    }
}

/// One component of a vertex: which attribute it feeds and how it is stored.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VertexAttribute {
    pub name: Attribute,
    pub format: VertexFormat,
    /// Components per vertex, 1 to 4.
    pub size: u8,
    /// Integer components are mapped into [0, 1] or [-1, 1] when set.
    pub normalized: bool,
}

impl VertexAttribute {
    #[inline]
    pub fn bytes(&self) -> u8 {
        self.size * self.format.stride()
    }
}

/// The interleaved structure of a single vertex. Components are laid out in
/// the order they were first added, without padding.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct VertexLayout {
    stride: u8,
    len: u8,
    slots: [Option<(VertexAttribute, u8)>; MAX_VERTEX_ATTRIBUTES],
}

impl VertexLayout {
    #[inline]
    pub fn build() -> VertexLayoutBuilder {
        VertexLayoutBuilder::default()
    }

    /// Bytes between two consecutive vertices.
    #[inline]
    pub fn stride(&self) -> u8 {
        self.stride
    }

    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn find(&self, name: Attribute) -> Option<(VertexAttribute, u8)> {
        self.slots
            .iter()
            .filter_map(|v| *v)
            .find(|(element, _)| element.name == name)
    }

    /// Byte offset of attribute `name` inside a vertex.
    pub fn offset(&self, name: Attribute) -> Option<u8> {
        self.find(name).map(|(_, offset)| offset)
    }

    pub fn element(&self, name: Attribute) -> Option<VertexAttribute> {
        self.find(name).map(|(element, _)| element)
    }
}

#[derive(Default)]
pub struct VertexLayoutBuilder {
    elements: Vec<VertexAttribute>,
}

impl VertexLayoutBuilder {
    /// Adds a component, or redefines it in place if `attribute` is present.
    ///
    /// # Panics
    ///
    /// If `size` is not within 1..=4, or the layout is full.
    pub fn with(
        mut self,
        attribute: Attribute,
        format: VertexFormat,
        size: u8,
        normalized: bool,
    ) -> Self {
        assert!(size >= 1 && size <= 4, "{} components of {:?}.", size, attribute);

        let element = VertexAttribute {
            name: attribute,
            format,
            size,
            normalized,
        };

        match self.elements.iter_mut().find(|v| v.name == attribute) {
            Some(v) => *v = element,
            None => {
                assert!(self.elements.len() < MAX_VERTEX_ATTRIBUTES);
                self.elements.push(element);
            }
        }

        self
    }

    pub fn finish(self) -> VertexLayout {
        let mut layout = VertexLayout::default();
        for (slot, element) in layout.slots.iter_mut().zip(self.elements) {
            *slot = Some((element, layout.stride));
            layout.stride += element.bytes();
            layout.len += 1;
        }

        layout
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .with(Attribute::Texcoord0, VertexFormat::Float, 2, false)
            .finish();

        assert_eq!(layout.stride(), 20);
        assert_eq!(layout.offset(Attribute::Position), Some(0));
        assert_eq!(layout.offset(Attribute::Texcoord0), Some(12));
        assert_eq!(layout.offset(Attribute::Normal), None);
        assert_eq!(layout.element(Attribute::Normal), None);
    }

    #[test]
    fn rewrite() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Byte, 1, false)
            .with(Attribute::Color0, VertexFormat::UByte, 4, true)
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .finish();

        assert_eq!(layout.len(), 2);
        assert_eq!(layout.stride(), 16);
        assert_eq!(layout.offset(Attribute::Color0), Some(12));

        let element = layout.element(Attribute::Position).unwrap();
        assert_eq!(element.format, VertexFormat::Float);
        assert_eq!(element.size, 3);
    }

    #[test]
    fn buffer_len() {
        let params = MeshParams {
            layout: VertexLayout::build()
                .with(Attribute::Position, VertexFormat::Float, 3, false)
                .finish(),
            num_verts: 4,
            num_idxes: 6,
            ..Default::default()
        };

        assert_eq!(params.vertex_buffer_len(), 48);
        assert_eq!(params.index_buffer_len(), 12);

        let data = MeshData {
            vptr: vec![0; 49],
            iptr: vec![],
        };
        assert!(params.validate(Some(&data)).is_err());
        assert_eq!(MeshPrimitive::TriangleStrip.assemble(1), 0);
    }
}
