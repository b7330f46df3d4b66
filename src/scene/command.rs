use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::errors::*;
use crate::math::*;
use crate::video::assets::shader::ShaderHandle;
use crate::video::VideoSystem;

use super::illumination::Illumination;
use super::material::MaterialRef;
use super::pass::RenderPassRef;
use super::projection::ProjectionRef;
use super::renderable::RenderableRef;
use super::uniforms::RenderUniform;

/// One fully resolved draw: a renderable drawn with a material by a pass.
/// Built every frame by the scene and dropped once applied.
pub struct RenderCommand {
    pass: RenderPassRef,
    projection: ProjectionRef,
    renderable: RenderableRef,
    material: MaterialRef,
    illumination: Option<Arc<Illumination>>,
    priority: i32,
    shader: Option<ShaderHandle>,
}

/// Builds the command drawing `renderable` in `pass`. Returns `None` if the
/// pass resolves no material for it, or if the pass is not initialized.
pub fn create_render_command(
    pass: &RenderPassRef,
    renderable: &RenderableRef,
) -> Option<RenderCommand> {
    let p = pass.read();
    if !p.is_initialized() {
        return None;
    }

    let material = p.material_for_renderable(&renderable.read())?;
    let projection = p.projection()?.clone();

    Some(RenderCommand {
        pass: pass.clone(),
        projection,
        renderable: renderable.clone(),
        material,
        illumination: p.illumination().cloned(),
        priority: p.priority(),
        shader: None,
    })
}

impl RenderCommand {
    #[inline]
    pub fn pass(&self) -> &RenderPassRef {
        &self.pass
    }

    #[inline]
    pub fn projection(&self) -> &ProjectionRef {
        &self.projection
    }

    #[inline]
    pub fn renderable(&self) -> &RenderableRef {
        &self.renderable
    }

    #[inline]
    pub fn material(&self) -> &MaterialRef {
        &self.material
    }

    #[inline]
    pub fn illumination(&self) -> Option<&Arc<Illumination>> {
        self.illumination.as_ref()
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The program this command has been drawn with, once applied.
    #[inline]
    pub fn shader(&self) -> Option<ShaderHandle> {
        self.shader
    }

    /// Uploads the transform, time and light uniforms into the material, binds
    /// it and draws the renderable. Vertex attributes are only re-attached if
    /// `previous` drew another renderable or used another program.
    pub fn apply(
        &mut self,
        video: &mut VideoSystem,
        time: f32,
        previous: Option<&RenderCommand>,
    ) -> Result<()> {
        let (view, projection) = {
            let p = self.projection.read();
            (p.view_matrix(), p.projection_matrix())
        };

        let mut renderable = self.renderable.write();
        let model = renderable.transform();
        let model_view = view * model;

        let shader = {
            let mut material = self.material.write();
            material.set_render_uniform(RenderUniform::Model, model);
            material.set_render_uniform(RenderUniform::View, view);
            material.set_render_uniform(RenderUniform::Projection, projection);
            material.set_render_uniform(RenderUniform::ModelView, model_view);
            material.set_render_uniform(
                RenderUniform::InverseModelView,
                model_view.invert().unwrap_or_else(Matrix4::identity),
            );
            material.set_render_uniform(
                RenderUniform::ModelViewProjection,
                projection * model_view,
            );
            material.set_render_uniform(RenderUniform::NormalMatrix, normal_matrix(model_view));
            material.set_render_uniform(RenderUniform::Time, time);

            if let Some(ref illumination) = self.illumination {
                illumination.apply(&mut material, model);
            }

            material.bind(video)?
        };

        let attach = match previous {
            Some(prev) => {
                !Arc::ptr_eq(&prev.renderable, &self.renderable) || prev.shader != Some(shader)
            }
            None => true,
        };

        if attach {
            renderable.attach_shader_attributes(video, shader)?;
        }

        self.shader = Some(shader);
        renderable.render(video, shader)
    }
}

/// The transpose of the inverse of the upper-left 3x3 of `model_view`.
pub fn normal_matrix(model_view: Matrix4<f32>) -> Matrix3<f32> {
    let m = Matrix3::from_cols(
        model_view.x.truncate(),
        model_view.y.truncate(),
        model_view.z.truncate(),
    );

    m.invert()
        .map(|v| v.transpose())
        .unwrap_or_else(Matrix3::identity)
}

struct Entry {
    priority: i32,
    sequence: u64,
    command: RenderCommand,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Render commands ordered by the priority of their pass, higher first.
/// Commands of equal priority pop in push order.
#[derive(Default)]
pub struct RenderCommandQueue {
    heap: BinaryHeap<Entry>,
    sequence: u64,
}

impl RenderCommandQueue {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        RenderCommandQueue {
            heap: BinaryHeap::with_capacity(capacity),
            sequence: 0,
        }
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.heap.push(Entry {
            priority: command.priority,
            sequence: self.sequence,
            command,
        });

        self.sequence += 1;
    }

    pub fn pop(&mut self) -> Option<RenderCommand> {
        let entry = self.heap.pop()?;
        if self.heap.is_empty() {
            self.sequence = 0;
        }

        Some(entry.command)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.sequence = 0;
    }
}
