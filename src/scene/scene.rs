use std::sync::Arc;
use std::time::Instant;

use crate::errors::*;
use crate::sched::{FixedUpdateTask, UpdateableRef};
use crate::settings::SceneParams;
use crate::utils::hash::FastHashSet;
use crate::video::VideoSystem;

use super::command::{create_render_command, RenderCommand, RenderCommandQueue};
use super::pass::RenderPassRef;
use super::renderable::RenderableRef;

/// Statistics of one `Scene::render`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// The number of commands applied.
    pub commands: u32,
    /// The number of times the executing pass changed, including the first one.
    pub pass_transitions: u32,
    pub draw_calls: u32,
    pub program_switches: u32,
}

/// Orchestrates render passes against a set of renderables, and the updates of
/// the objects behind them.
///
/// Every frame, `prepare_render_commands` resolves a command for each (pass,
/// renderable) pair, and `render` executes them pass by pass in descending
/// priority. Within a pass, renderables are drawn in registration order.
///
/// Everything except the async updateables runs on the thread which owns the
/// graphics context.
pub struct Scene {
    params: SceneParams,
    passes: Vec<RenderPassRef>,
    renderables: Vec<RenderableRef>,
    updateables: Vec<UpdateableRef>,
    tasks: Vec<FixedUpdateTask>,
    queue: RenderCommandQueue,
    uninitialized: FastHashSet<String>,
    epoch: Instant,
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new(SceneParams::default())
    }
}

impl Scene {
    pub fn new(params: SceneParams) -> Self {
        Scene {
            params,
            passes: Vec::new(),
            renderables: Vec::new(),
            updateables: Vec::new(),
            tasks: Vec::new(),
            queue: RenderCommandQueue::with_capacity(params.queue_capacity),
            uninitialized: FastHashSet::default(),
            epoch: Instant::now(),
        }
    }

    #[inline]
    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    /// Registers a render pass. Registering a pass twice is permitted, but the
    /// pass will execute twice.
    pub fn add_pass(&mut self, pass: RenderPassRef) {
        if self.passes.iter().any(|v| Arc::ptr_eq(v, &pass)) {
            warn!("Render pass {} has been added already.", pass.read().name());
        }

        self.passes.push(pass);
    }

    /// Registers a renderable. Registering a renderable twice is permitted,
    /// but it will be drawn twice.
    pub fn add_renderable(&mut self, renderable: RenderableRef) {
        if self.renderables.iter().any(|v| Arc::ptr_eq(v, &renderable)) {
            warn!(
                "Renderable {} has been added already.",
                renderable.read().name()
            );
        }

        self.renderables.push(renderable);
    }

    /// Registers an object updated on the caller's thread by `update`.
    pub fn add_updateable(&mut self, updateable: UpdateableRef) {
        self.updateables.push(updateable);
    }

    /// Starts updating `updateable` at the fixed rate of the scene, on a thread
    /// of its own.
    pub fn add_async_updateable<T: Into<String>>(
        &mut self,
        name: T,
        updateable: UpdateableRef,
    ) -> Result<()> {
        let mut task = FixedUpdateTask::new(name, updateable, &self.params);
        task.start()?;
        self.tasks.push(task);
        Ok(())
    }

    /// Finds the first registered pass named `name`.
    pub fn pass(&self, name: &str) -> Option<&RenderPassRef> {
        self.passes.iter().find(|v| v.read().name() == name)
    }

    #[inline]
    pub fn passes(&self) -> &[RenderPassRef] {
        &self.passes
    }

    #[inline]
    pub fn renderables(&self) -> &[RenderableRef] {
        &self.renderables
    }

    #[inline]
    pub fn tasks(&self) -> &[FixedUpdateTask] {
        &self.tasks
    }

    #[inline]
    pub fn num_async_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// The number of commands waiting for `render`.
    #[inline]
    pub fn queued_commands(&self) -> usize {
        self.queue.len()
    }

    /// Builds the render commands of this frame. Must be called once before
    /// every `render`; calling it twice queues every command twice.
    pub fn prepare_render_commands(&mut self) {
        self.sort_passes();

        for pass in &self.passes {
            {
                let p = pass.read();
                if !p.is_initialized() {
                    if self.uninitialized.insert(p.name().to_owned()) {
                        warn!("Render pass {} is not initialized, skipped.", p.name());
                    }
                    continue;
                }
            }

            for renderable in &self.renderables {
                if let Some(command) = create_render_command(pass, renderable) {
                    self.queue.push(command);
                }
            }
        }
    }

    fn sort_passes(&mut self) {
        self.passes
            .sort_by(|lhs, rhs| rhs.read().priority().cmp(&lhs.read().priority()));
    }

    /// Executes the queued commands. Clears the target of every pass first,
    /// then applies commands in priority order, entering and leaving passes
    /// whenever the pass changes between consecutive commands. Failures are
    /// logged and never abort the frame. The queue is empty afterwards.
    pub fn render(&mut self, video: &mut VideoSystem) -> FrameStats {
        let mut stats = FrameStats::default();
        let before = video.stats();
        let time = self.epoch.elapsed().as_secs_f32();

        for pass in &self.passes {
            let p = pass.read();
            if !p.is_initialized() {
                continue;
            }

            if let Err(err) = p.start_frame(video, None) {
                error!("Failed to start render pass {}: {}", p.name(), err);
            }
        }

        let mut previous: Option<RenderCommand> = None;
        while let Some(mut command) = self.queue.pop() {
            let transition = match previous {
                Some(ref prev) => !Arc::ptr_eq(prev.pass(), command.pass()),
                None => true,
            };

            if transition {
                Self::transit(video, previous.as_ref(), &command);
                stats.pass_transitions += 1;
            }

            if let Err(err) = command.apply(video, time, previous.as_ref()) {
                error!(
                    "Failed to draw {} in render pass {}: {}",
                    command.renderable().read().name(),
                    command.pass().read().name(),
                    err
                );
            }

            stats.commands += 1;
            previous = Some(command);
        }

        if let Some(prev) = previous {
            let p = prev.pass().read();
            if let Err(err) = p.post_render(video, None) {
                error!("Failed to leave render pass {}: {}", p.name(), err);
            }
        }

        let after = video.stats();
        stats.draw_calls = after.drawcalls.saturating_sub(before.drawcalls);
        stats.program_switches = after
            .program_switches
            .saturating_sub(before.program_switches);

        stats
    }

    fn transit(video: &mut VideoSystem, prev: Option<&RenderCommand>, next: &RenderCommand) {
        let next = next.pass().read();

        if let Some(prev) = prev {
            let prev = prev.pass().read();
            if let Err(err) = prev.post_render(video, Some(&*next)) {
                error!("Failed to leave render pass {}: {}", prev.name(), err);
            }

            if let Err(err) = next.pre_render(video, Some(&*prev)) {
                error!("Failed to enter render pass {}: {}", next.name(), err);
            }
        } else if let Err(err) = next.pre_render(video, None) {
            error!("Failed to enter render pass {}: {}", next.name(), err);
        }
    }

    /// Updates every main-thread updateable, in registration order.
    pub fn update(&mut self, dt: f32) {
        for v in &self.updateables {
            v.lock().update(dt);
        }
    }

    /// Resumes every async updateable.
    pub fn activate(&mut self) {
        for v in &self.tasks {
            v.resume();
        }
    }

    /// Pauses every async updateable. Their threads keep running.
    pub fn deactivate(&mut self) {
        for v in &self.tasks {
            v.pause();
        }
    }

    /// Stops every async updateable and forgets everything registered.
    pub fn reset(&mut self) {
        self.deactivate();

        for v in &mut self.tasks {
            v.stop();
        }

        self.tasks.clear();
        self.passes.clear();
        self.renderables.clear();
        self.updateables.clear();
        self.queue.clear();
        self.uninitialized.clear();
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        for v in &mut self.tasks {
            v.stop();
        }
    }
}
