use std::sync::Arc;

use parking_lot::Mutex;

/// Something advanced in time, e.g. a simulation.
pub trait Updateable: Send {
    /// Advances by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Advances by the fixed time-step `dt`, in seconds. This is the hook a
    /// `FixedUpdateTask` calls.
    fn fixed_update(&mut self, dt: f32) {
        self.update(dt);
    }
}

pub type UpdateableRef = Arc<Mutex<dyn Updateable>>;
