//! Drawable objects and the per-pass material assignment of each of them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use parking_lot::{RwLock, RwLockReadGuard};

use crate::errors::*;
use crate::math::*;
use crate::utils::hash::FastHashMap;
use crate::utils::DoubleBuf;
use crate::video::assets::prelude::*;
use crate::video::VideoSystem;

use super::material::MaterialRef;

/// Drawing code which doesn't fit into the build-in drawables.
pub trait Draw: Send + Sync {
    /// Draws with the current program `shader`.
    fn draw(&mut self, video: &mut VideoSystem, shader: ShaderHandle) -> Result<()>;

    /// Validates and attaches vertex buffers to the attributes of `shader`.
    fn attach_shader_attributes(&mut self, _: &mut VideoSystem, _: ShaderHandle) -> Result<()> {
        Ok(())
    }
}

/// A range of a mesh owned by someone else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDrawable {
    pub mesh: MeshHandle,
    pub index: MeshIndex,
}

impl MeshDrawable {
    pub fn new(mesh: MeshHandle) -> Self {
        MeshDrawable {
            mesh,
            index: MeshIndex::All,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub intensity: f32,
    pub size: f32,
}

impl PointVertex {
    pub fn layout() -> VertexLayout {
        VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .with(Attribute::Color0, VertexFormat::Float, 4, false)
            .with(Attribute::Intensity, VertexFormat::Float, 1, false)
            .with(Attribute::PointSize, VertexFormat::Float, 1, false)
            .finish()
    }
}

/// Points produced by a simulation thread and consumed by the render thread.
///
/// `publish` hands the producer the write side and swaps it with the side the
/// renderer reads once the closure returns. The write side holds the points of
/// the publish before last, so producers usually `clear` it first.
#[derive(Default)]
pub struct PointBuffer {
    points: DoubleBuf<Vec<PointVertex>>,
    generation: AtomicU64,
}

impl PointBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<Vec<PointVertex>> {
        self.points.read()
    }

    pub fn publish<F>(&self, fill: F)
    where
        F: FnOnce(&mut Vec<PointVertex>),
    {
        fill(&mut *self.points.write());
        self.points.swap();
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// The number of times `publish` has been called.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Renders the published side of a `PointBuffer` as `GL_POINTS`, re-uploading
/// it whenever a new generation has been published.
pub struct PointCloud {
    buffer: Arc<PointBuffer>,
    mesh: Option<MeshHandle>,
    capacity: usize,
    len: usize,
    uploaded: u64,
}

impl PointCloud {
    pub fn new(buffer: Arc<PointBuffer>) -> Self {
        PointCloud {
            buffer,
            mesh: None,
            capacity: 0,
            len: 0,
            uploaded: 0,
        }
    }

    #[inline]
    pub fn buffer(&self) -> &Arc<PointBuffer> {
        &self.buffer
    }

    #[inline]
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    fn upload(&mut self, video: &mut VideoSystem) -> Result<()> {
        let generation = self.buffer.generation();
        if generation == self.uploaded {
            return Ok(());
        }

        let points = self.buffer.read();
        if self.mesh.is_none() || points.len() > self.capacity {
            if let Some(mesh) = self.mesh.take() {
                video.delete_mesh(mesh)?;
            }

            let capacity = points.len().next_power_of_two().max(64);
            let params = MeshParams {
                hint: MeshHint::Stream,
                layout: PointVertex::layout(),
                primitive: MeshPrimitive::Points,
                num_verts: capacity,
                ..Default::default()
            };

            self.mesh = Some(video.create_mesh(params, None)?);
            self.capacity = capacity;
        }

        if let Some(mesh) = self.mesh {
            if !points.is_empty() {
                video.update_vertex_buffer(mesh, 0, bytemuck::cast_slice(points.as_slice()))?;
            }
        }

        self.len = points.len();
        self.uploaded = generation;
        Ok(())
    }
}

/// The closed set of things a `Renderable` can draw.
pub enum Drawable {
    Mesh(MeshDrawable),
    Points(PointCloud),
    Custom(Box<dyn Draw>),
}

impl Drawable {
    pub fn render(&mut self, video: &mut VideoSystem, shader: ShaderHandle) -> Result<()> {
        match *self {
            Drawable::Mesh(ref v) => video.draw(shader, v.mesh, v.index),
            Drawable::Points(ref mut v) => {
                let mesh = v.mesh;
                v.upload(video)?;

                match v.mesh {
                    Some(handle) if v.len > 0 => {
                        if mesh != v.mesh {
                            video.bind_attributes(shader, handle)?;
                        }

                        video.draw(shader, handle, MeshIndex::Ptr(0, v.len))
                    }
                    _ => Ok(()),
                }
            }
            Drawable::Custom(ref mut v) => v.draw(video, shader),
        }
    }

    pub fn attach_shader_attributes(
        &mut self,
        video: &mut VideoSystem,
        shader: ShaderHandle,
    ) -> Result<()> {
        match *self {
            Drawable::Mesh(ref v) => video.bind_attributes(shader, v.mesh),
            Drawable::Points(ref v) => match v.mesh {
                Some(handle) => video.bind_attributes(shader, handle),
                None => Ok(()),
            },
            Drawable::Custom(ref mut v) => v.attach_shader_attributes(video, shader),
        }
    }
}

/// A drawable object with a transform and the materials it is drawn with in
/// each render pass.
pub struct Renderable {
    name: String,
    transform: Matrix4<f32>,
    requires_explicit_material: bool,
    materials: FastHashMap<String, MaterialRef>,
    drawable: Drawable,
}

pub type RenderableRef = Arc<RwLock<Renderable>>;

impl Renderable {
    pub fn new<T: Into<String>>(name: T, drawable: Drawable) -> Self {
        Renderable {
            name: name.into(),
            transform: Matrix4::identity(),
            requires_explicit_material: false,
            materials: FastHashMap::default(),
            drawable,
        }
    }

    #[inline]
    pub fn into_ref(self) -> RenderableRef {
        Arc::new(RwLock::new(self))
    }

    /// Debug label, which is not required to be unique.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    #[inline]
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
    }

    #[inline]
    pub fn requires_explicit_material(&self) -> bool {
        self.requires_explicit_material
    }

    /// If set, the renderable is only drawn by passes it has a material for.
    #[inline]
    pub fn set_requires_explicit_material(&mut self, required: bool) {
        self.requires_explicit_material = required;
    }

    /// Assigns the material used by the render pass named `pass`.
    pub fn set_material<T: Into<String>>(&mut self, pass: T, material: MaterialRef) {
        self.materials.insert(pass.into(), material);
    }

    pub fn remove_material(&mut self, pass: &str) -> Option<MaterialRef> {
        self.materials.remove(pass)
    }

    #[inline]
    pub fn material(&self, pass: &str) -> Option<&MaterialRef> {
        self.materials.get(pass)
    }

    #[inline]
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    #[inline]
    pub fn drawable_mut(&mut self) -> &mut Drawable {
        &mut self.drawable
    }

    #[inline]
    pub fn render(&mut self, video: &mut VideoSystem, shader: ShaderHandle) -> Result<()> {
        self.drawable.render(video, shader)
    }

    #[inline]
    pub fn attach_shader_attributes(
        &mut self,
        video: &mut VideoSystem,
        shader: ShaderHandle,
    ) -> Result<()> {
        self.drawable.attach_shader_attributes(video, shader)
    }
}

/// A flat list of renderables sharing settings. Applying a setting writes it
/// into every member; there is no inheritance.
#[derive(Default, Clone)]
pub struct RenderableGroup {
    members: Vec<RenderableRef>,
}

impl RenderableGroup {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, renderable: RenderableRef) {
        self.members.push(renderable);
    }

    #[inline]
    pub fn members(&self) -> &[RenderableRef] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn set_transform(&self, transform: Matrix4<f32>) {
        for v in &self.members {
            v.write().set_transform(transform);
        }
    }

    pub fn set_material(&self, pass: &str, material: &MaterialRef) {
        for v in &self.members {
            v.write().set_material(pass, material.clone());
        }
    }

    pub fn set_requires_explicit_material(&self, required: bool) {
        for v in &self.members {
            v.write().set_requires_explicit_material(required);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::material::Material;

    #[test]
    fn point_vertex_layout() {
        let layout = PointVertex::layout();
        assert_eq!(layout.stride() as usize, ::std::mem::size_of::<PointVertex>());
        assert_eq!(layout.offset(Attribute::Intensity), Some(28));
    }

    #[test]
    fn point_buffer() {
        let buffer = PointBuffer::new();
        assert!(buffer.read().is_empty());
        assert_eq!(buffer.generation(), 0);

        buffer.publish(|points| points.push(PointVertex::default()));
        assert_eq!(buffer.read().len(), 1);
        assert_eq!(buffer.generation(), 1);

        // The write side still holds the empty set published first.
        buffer.publish(|points| {
            assert!(points.is_empty());
            points.clear();
            points.resize(3, PointVertex::default());
        });
        assert_eq!(buffer.read().len(), 3);
        assert_eq!(buffer.generation(), 2);
    }

    #[test]
    fn point_buffer_from_another_thread() {
        let buffer = Arc::new(PointBuffer::new());
        let producer = buffer.clone();

        std::thread::spawn(move || {
            for i in 0..4 {
                producer.publish(|points| {
                    points.clear();
                    points.resize(i + 1, PointVertex::default());
                });
            }
        })
        .join()
        .unwrap();

        assert_eq!(buffer.generation(), 4);
        assert_eq!(buffer.read().len(), 4);
    }

    #[test]
    fn group() {
        let a = Renderable::new("a", Drawable::Mesh(MeshDrawable::new(MeshHandle::default())));
        let b = Renderable::new("b", Drawable::Mesh(MeshDrawable::new(MeshHandle::default())));

        let mut group = RenderableGroup::new();
        group.add(a.into_ref());
        group.add(b.into_ref());

        let material = Material::new("phong").into_ref();
        group.set_material("color", &material);
        group.set_requires_explicit_material(true);
        group.set_transform(Matrix4::from_scale(2.0));

        for v in group.members() {
            let v = v.read();
            assert!(v.requires_explicit_material());
            assert!(Arc::ptr_eq(v.material("color").unwrap(), &material));
            assert_eq!(v.transform(), Matrix4::from_scale(2.0));
        }
    }
}
