//! # What is This?
//!
//! Spark is the rendering core of an interactive electrosurgery training simulator. It
//! decides, once per frame, *what* gets drawn, *in what order*, *to which target* and
//! *with which shader state*, and it paces the heavy simulation objects (fluid solver,
//! spark aggregation, tissue diffusion) at a fixed rate on their own threads.
//!
//! ## Render Pipeline
//!
//! A [`Scene`](scene::Scene) owns a set of [`RenderPass`](scene::RenderPass)es and a set of
//! [`Renderable`](scene::Renderable)s. Every frame it resolves a
//! [`Material`](scene::Material) for each (pass, renderable) pair, pushes the resulting
//! [`RenderCommand`](scene::RenderCommand)s into a queue ordered by pass priority, and then
//! drains that queue against the [`VideoSystem`](video::VideoSystem), bracketing runs of
//! commands with the pass' pre/post render transitions.
//!
//! ## Fixed-rate Updates
//!
//! Objects registered with `Scene::add_async_updateable` are wrapped in a
//! [`FixedUpdateTask`](sched::FixedUpdateTask) which calls them at a constant time-step on a
//! dedicated thread, independently of the frame rate.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

#[cfg(not(target_arch = "wasm32"))]
extern crate gl;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;
pub mod prelude;
pub mod sched;
pub mod scene;
pub mod settings;
pub mod video;
