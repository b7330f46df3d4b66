//! A device through which the scene is viewed.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::*;
use crate::math::*;
use crate::video::VideoSystem;

use super::viewport::{Viewport, ViewportSubscriber};

/// The projection funcs used when take primitives into camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    /// Orthographic projection with orthographic-size, half vertical size of
    /// camera, as payload.
    Ortho(f32),
    /// Perspective projection with the vertical field of view as payload.
    Perspective(Rad<f32>),
}

/// A camera: a projection plus the view matrix placing it in the world.
/// Mutated by camera controllers between frames.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    kind: ProjectionKind,
    aspect: f32,
    clip: Vector2<f32>,
    view: Matrix4<f32>,
}

pub type ProjectionRef = Arc<RwLock<Projection>>;

impl Default for Projection {
    fn default() -> Self {
        Projection::perspective(Deg(60.0), 1.0, 0.1, 1000.0)
    }
}

impl Projection {
    pub fn perspective<T>(fovy: T, aspect: f32, near: f32, far: f32) -> Self
    where
        T: Into<Rad<f32>>,
    {
        let projection = Projection {
            kind: ProjectionKind::Perspective(fovy.into()),
            aspect,
            clip: Vector2::new(near, far),
            view: Matrix4::identity(),
        };

        projection.validate();
        projection
    }

    pub fn ortho(width: f32, height: f32, near: f32, far: f32) -> Self {
        let projection = Projection {
            kind: ProjectionKind::Ortho(height * 0.5),
            aspect: width / height,
            clip: Vector2::new(near, far),
            view: Matrix4::identity(),
        };

        projection.validate();
        projection
    }

    #[inline]
    pub fn into_ref(self) -> ProjectionRef {
        Arc::new(RwLock::new(self))
    }

    #[inline]
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    /// Gets the aspect ratio (width divided by height).
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.validate();
    }

    #[inline]
    pub fn near_clip_plane(&self) -> f32 {
        self.clip.x
    }

    #[inline]
    pub fn far_clip_plane(&self) -> f32 {
        self.clip.y
    }

    #[inline]
    pub fn set_clip_plane(&mut self, near: f32, far: f32) {
        self.clip = Vector2::new(near.min(far), far.max(near));
        self.validate();
    }

    /// Places the camera at `eye`, looking at `center`.
    pub fn look_at(&mut self, eye: Point3<f32>, center: Point3<f32>, up: Vector3<f32>) {
        self.view = Matrix4::look_at_rh(eye, center, up);
    }

    #[inline]
    pub fn set_view_matrix(&mut self, view: Matrix4<f32>) {
        self.view = view;
    }

    #[inline]
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let (near, far) = (self.clip.x, self.clip.y);
        match self.kind {
            ProjectionKind::Ortho(vsize) => {
                let hsize = vsize * self.aspect;
                ortho(-hsize, hsize, -vsize, vsize, near, far)
            }
            ProjectionKind::Perspective(fovy) => perspective(fovy, self.aspect, near, far),
        }
    }

    fn validate(&self) {
        if let ProjectionKind::Perspective(fovy) = self.kind {
            assert!(
                fovy > Rad::zero() && fovy < Rad::turn_div_2(),
                "The vertical field of view must be in (0, PI), found: {:?}",
                fovy
            );

            assert!(
                self.clip.x > 0.0,
                "The near plane distance cannot be below zero, found: {:?}",
                self.clip.x
            );
        }

        assert!(
            self.aspect > 0.0,
            "The aspect ratio cannot be below zero, found: {:?}",
            self.aspect
        );

        assert!(
            self.clip.y > self.clip.x,
            "The far plane cannot be closer than the near plane, found: far: {:?}, near: {:?}",
            self.clip.y,
            self.clip.x
        );
    }
}

impl ViewportSubscriber for Projection {
    fn resize_viewport(&mut self, _: &mut VideoSystem, viewport: Viewport) -> Result<()> {
        if viewport.width > 0 && viewport.height > 0 {
            self.set_aspect(viewport.aspect());
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perspective_matrix() {
        let projection = Projection::perspective(Deg(90.0), 2.0, 1.0, 10.0);
        let m = projection.projection_matrix();
        assert_relative_eq!(m.x.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(m.y.y, 1.0, epsilon = 1e-5);

        // The near plane maps onto -1 in normalized device coordinates.
        let p = m * Vector4::new(0.0, 0.0, -1.0, 1.0);
        assert_relative_eq!(p.z / p.w, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn ortho_matrix() {
        let projection = Projection::ortho(4.0, 2.0, 0.0, 10.0);
        assert_relative_eq!(projection.aspect(), 2.0);

        let p = projection.projection_matrix() * Vector4::new(2.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn look_at() {
        let mut projection = Projection::default();
        projection.look_at(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );

        let p = projection.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.z, -5.0, epsilon = 1e-5);
    }

    #[test]
    #[should_panic]
    fn invalid_clip_plane() {
        Projection::perspective(Deg(60.0), 1.0, -1.0, 10.0);
    }
}
