pub use crate::errors::Result;
pub use crate::math::{self, Color, Matrix, One, SquareMatrix, Zero};
pub use crate::settings::{SceneParams, Settings, VideoParams};

pub use crate::sched::{FixedUpdateTask, Updateable, UpdateableRef};

pub use crate::scene;
pub use crate::scene::{
    Drawable, FrameStats, Illumination, Light, Material, MaterialRef, MeshDrawable, PointBuffer,
    Projection, ProjectionRef, RenderPass, RenderPassRef, RenderTarget, RenderTargetRef,
    Renderable, RenderableRef, Scene, TextureTargetKind, Viewport, ViewportSubscriber,
};

pub use crate::video;
pub use crate::video::prelude::*;
