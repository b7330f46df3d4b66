use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::*;
use crate::video::assets::shader::*;
use crate::video::VideoSystem;

use super::illumination::Illumination;
use super::material::MaterialRef;
use super::projection::ProjectionRef;
use super::renderable::Renderable;
use super::target::RenderTargetRef;

/// `(equation, source factor, destination factor)`.
pub type Blending = (Equation, BlendFactor, BlendFactor);

pub const INTERPOLATED_BLENDING: Blending = (
    Equation::Add,
    BlendFactor::Value(BlendValue::SourceAlpha),
    BlendFactor::OneMinusValue(BlendValue::SourceAlpha),
);

pub const ADDITIVE_BLENDING: Blending = (
    Equation::Add,
    BlendFactor::Value(BlendValue::SourceAlpha),
    BlendFactor::One,
);

pub const MAX_BLENDING: Blending = (Equation::Max, BlendFactor::One, BlendFactor::One);

/// One prioritized sweep over the renderables of a scene, drawing into a
/// single target with a single projection.
///
/// Passes with higher priority are executed first.
pub struct RenderPass {
    name: String,
    target: Option<RenderTargetRef>,
    projection: Option<ProjectionRef>,
    priority: i32,
    blending: Blending,
    blend_enabled: bool,
    depth_test: bool,
    depth_write: bool,
    color_write: bool,
    culling: bool,
    winding: FrontFaceOrder,
    wireframe: bool,
    default_material: Option<MaterialRef>,
    illumination: Option<Arc<Illumination>>,
}

pub type RenderPassRef = Arc<RwLock<RenderPass>>;

impl RenderPass {
    pub fn new<T: Into<String>>(name: T) -> Self {
        RenderPass {
            name: name.into(),
            target: None,
            projection: None,
            priority: 0,
            blending: INTERPOLATED_BLENDING,
            blend_enabled: true,
            depth_test: true,
            depth_write: true,
            color_write: true,
            culling: false,
            winding: FrontFaceOrder::CounterClockwise,
            wireframe: false,
            default_material: None,
            illumination: None,
        }
    }

    #[inline]
    pub fn into_ref(self) -> RenderPassRef {
        Arc::new(RwLock::new(self))
    }

    /// Binds the pass to its target and projection. Must be called before the
    /// pass produces any render command.
    pub fn initialize(&mut self, target: RenderTargetRef, projection: ProjectionRef, priority: i32) {
        self.target = Some(target);
        self.projection = Some(projection);
        self.priority = priority;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.target.is_some() && self.projection.is_some()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    #[inline]
    pub fn target(&self) -> Option<&RenderTargetRef> {
        self.target.as_ref()
    }

    #[inline]
    pub fn projection(&self) -> Option<&ProjectionRef> {
        self.projection.as_ref()
    }

    /// Sets and enables the blend function.
    pub fn set_blending(&mut self, src: BlendFactor, dst: BlendFactor, equation: Equation) {
        self.blending = (equation, src, dst);
        self.blend_enabled = true;
    }

    pub fn use_additive_blending(&mut self) {
        self.blending = ADDITIVE_BLENDING;
        self.blend_enabled = true;
    }

    pub fn use_interpolated_blending(&mut self) {
        self.blending = INTERPOLATED_BLENDING;
        self.blend_enabled = true;
    }

    pub fn use_max_blending(&mut self) {
        self.blending = MAX_BLENDING;
        self.blend_enabled = true;
    }

    /// Disables blending, keeping the blend function for `enable_blending`.
    #[inline]
    pub fn disable_blending(&mut self) {
        self.blend_enabled = false;
    }

    #[inline]
    pub fn enable_blending(&mut self) {
        self.blend_enabled = true;
    }

    /// The blend function, or `None` if blending is disabled.
    pub fn blending(&self) -> Option<Blending> {
        if self.blend_enabled {
            Some(self.blending)
        } else {
            None
        }
    }

    #[inline]
    pub fn set_depth(&mut self, test: bool, write: bool) {
        self.depth_test = test;
        self.depth_write = write;
    }

    #[inline]
    pub fn set_color_write(&mut self, write: bool) {
        self.color_write = write;
    }

    #[inline]
    pub fn set_backface_culling(&mut self, enabled: bool, winding: FrontFaceOrder) {
        self.culling = enabled;
        self.winding = winding;
    }

    #[inline]
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    /// Sets the material of renderables which have no material for this pass
    /// and don't require one. Without default material, those are not drawn.
    #[inline]
    pub fn use_default_material(&mut self, material: Option<MaterialRef>) {
        self.default_material = material;
    }

    #[inline]
    pub fn default_material(&self) -> Option<&MaterialRef> {
        self.default_material.as_ref()
    }

    #[inline]
    pub fn set_illumination(&mut self, illumination: Option<Arc<Illumination>>) {
        self.illumination = illumination;
    }

    #[inline]
    pub fn illumination(&self) -> Option<&Arc<Illumination>> {
        self.illumination.as_ref()
    }

    /// Resolves the material `renderable` is drawn with in this pass.
    pub fn material_for_renderable(&self, renderable: &Renderable) -> Option<MaterialRef> {
        if let Some(material) = renderable.material(&self.name) {
            return Some(material.clone());
        }

        if renderable.requires_explicit_material() {
            return None;
        }

        self.default_material.clone()
    }

    /// The fixed-function state this pass draws with.
    pub fn render_state(&self) -> RenderState {
        let c = self.color_write;
        RenderState {
            cull_face: if self.culling {
                CullFace::Back
            } else {
                CullFace::Nothing
            },
            front_face_order: self.winding,
            depth_test: if self.depth_test {
                Comparison::LessOrEqual
            } else {
                Comparison::Always
            },
            depth_write: self.depth_write,
            color_blend: self.blending(),
            color_write: (c, c, c, c),
            wireframe: self.wireframe,
        }
    }

    fn target_or_err(&self) -> Result<&RenderTargetRef> {
        self.target
            .as_ref()
            .ok_or_else(|| super::errors::Error::PassUninitialized(self.name.clone()).into())
    }

    /// Enters this pass: binds its target and applies its render state.
    pub fn pre_render(&self, video: &mut VideoSystem, prev: Option<&RenderPass>) -> Result<()> {
        if let Some(prev) = prev {
            trace!("Render pass {} -> {}.", prev.name, self.name);
        }

        self.target_or_err()?.write().pre_render(video)?;
        video.set_render_state(&self.render_state())
    }

    /// Leaves this pass.
    pub fn post_render(&self, video: &mut VideoSystem, _next: Option<&RenderPass>) -> Result<()> {
        self.target_or_err()?.write().post_render(video)
    }

    /// Clears the target of this pass. Called once per frame before any command
    /// is applied.
    pub fn start_frame(&self, video: &mut VideoSystem, _prev: Option<&RenderPass>) -> Result<()> {
        self.target_or_err()?.write().start_frame(video)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blending() {
        let mut pass = RenderPass::new("color");
        assert_eq!(pass.blending(), Some(INTERPOLATED_BLENDING));

        pass.disable_blending();
        pass.disable_blending();
        assert_eq!(pass.blending(), None);
        assert_eq!(pass.render_state().color_blend, None);

        pass.enable_blending();
        assert_eq!(pass.blending(), Some(INTERPOLATED_BLENDING));

        pass.use_additive_blending();
        assert_eq!(pass.blending(), Some(ADDITIVE_BLENDING));

        pass.disable_blending();
        pass.use_max_blending();
        assert_eq!(pass.blending(), Some(MAX_BLENDING));

        pass.set_blending(BlendFactor::One, BlendFactor::Zero, Equation::Subtract);
        assert_eq!(
            pass.blending(),
            Some((Equation::Subtract, BlendFactor::One, BlendFactor::Zero))
        );
    }

    #[test]
    fn render_state() {
        let mut pass = RenderPass::new("color");
        pass.set_depth(false, false);
        pass.set_color_write(false);
        pass.set_backface_culling(true, FrontFaceOrder::Clockwise);
        pass.set_wireframe(true);

        let state = pass.render_state();
        assert_eq!(state.depth_test, Comparison::Always);
        assert!(!state.depth_write);
        assert_eq!(state.color_write, (false, false, false, false));
        assert_eq!(state.cull_face, CullFace::Back);
        assert_eq!(state.front_face_order, FrontFaceOrder::Clockwise);
        assert!(state.wireframe);
    }
}
