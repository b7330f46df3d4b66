//! Per-object update scheduling.
//!
//! Objects are updated either on the caller's thread, once per
//! `Scene::update`, or by a `FixedUpdateTask` which calls them at a constant
//! time-step on a dedicated thread.

mod task;
mod updateable;

pub use self::task::FixedUpdateTask;
pub use self::updateable::{Updateable, UpdateableRef};
