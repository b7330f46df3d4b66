use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::errors::*;
use crate::settings::SceneParams;

use super::updateable::UpdateableRef;

#[derive(Default)]
struct TaskState {
    paused: AtomicBool,
    stopped: AtomicBool,
    ticks: AtomicU64,
}

/// Calls the `fixed_update` of an updateable at a constant rate on a thread of
/// its own.
///
/// Each tick advances the reference time of the task by exactly one interval,
/// so the rate does not drift with the time an update takes. A task which falls
/// behind, e.g. after a slow update, runs the missed ticks back to back until
/// it has caught up. Pausing resets the reference time.
///
/// ```text
/// Created --start--> Running <--pause/resume--> Paused
///                       |                          |
///                       +----------stop------------+--> Stopped
/// ```
pub struct FixedUpdateTask {
    name: String,
    updateable: UpdateableRef,
    interval: Duration,
    sleep_threshold: Duration,
    stop_timeout: Duration,
    state: Arc<TaskState>,
    thread: Option<Worker>,
}

struct Worker {
    handle: JoinHandle<()>,
    done: Receiver<()>,
    wake: Sender<()>,
}

impl FixedUpdateTask {
    pub fn new<T: Into<String>>(name: T, updateable: UpdateableRef, params: &SceneParams) -> Self {
        FixedUpdateTask {
            name: name.into(),
            updateable,
            interval: params.fixed_interval(),
            sleep_threshold: params.sleep_threshold(),
            stop_timeout: params.stop_timeout(),
            state: Arc::new(TaskState::default()),
            thread: None,
        }
    }

    /// Creates a task ticking every `interval`, with default timings otherwise.
    pub fn with_interval<T: Into<String>>(
        name: T,
        updateable: UpdateableRef,
        interval: Duration,
    ) -> Self {
        let mut task = FixedUpdateTask::new(name, updateable, &SceneParams::default());
        task.interval = interval;
        task
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the thread of this task. Starting a task which has been started
    /// before has no effect.
    pub fn start(&mut self) -> Result<()> {
        if self.thread.is_some() {
            return Ok(());
        }

        if self.is_stopped() {
            warn!("Fixed update task {} has been stopped, it can not restart.", self.name);
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        let (wake, sleep) = mpsc::channel();
        let state = self.state.clone();
        let updateable = self.updateable.clone();
        let name = self.name.clone();
        let interval = self.interval;
        let threshold = self.sleep_threshold;

        let handle = thread::Builder::new()
            .name(format!("fixed-update-{}", self.name))
            .spawn(move || {
                Self::execute(&name, &state, &updateable, &sleep, interval, threshold);
                let _ = tx.send(());
            })
            .map_err(|err| format_err!("Failed to spawn task {}: {}", self.name, err))?;

        info!(
            "Fixed update task {} started at {:?} intervals.",
            self.name, self.interval
        );

        self.thread = Some(Worker {
            handle,
            done: rx,
            wake,
        });
        Ok(())
    }

    fn execute(
        name: &str,
        state: &TaskState,
        updateable: &UpdateableRef,
        sleep: &Receiver<()>,
        interval: Duration,
        threshold: Duration,
    ) {
        let dt = interval.as_secs_f32();
        let mut next = Instant::now() + interval;

        // Waits for `timeout`, returning early once `stop` has been called.
        let wait = |timeout: Duration| match sleep.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                state.stopped.store(true, Ordering::Release);
            }
        };

        loop {
            let now = Instant::now();

            if state.paused.load(Ordering::Acquire) {
                next = now + interval;
                wait(interval.min(Duration::from_millis(10)));
            } else if now >= next {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    updateable.lock().fixed_update(dt);
                }));

                if result.is_err() {
                    error!("Fixed update task {} panicked, stopping it.", name);
                    state.stopped.store(true, Ordering::Release);
                }

                state.ticks.fetch_add(1, Ordering::AcqRel);

                next += interval;
            } else {
                let remaining = next - now;
                if remaining > threshold {
                    wait(remaining);
                } else {
                    thread::yield_now();
                }
            }

            if state.stopped.load(Ordering::Acquire) {
                break;
            }
        }
    }

    /// Stops updates while keeping the thread alive.
    #[inline]
    pub fn pause(&self) {
        self.state.paused.store(true, Ordering::Release);
    }

    #[inline]
    pub fn resume(&self) {
        self.state.paused.store(false, Ordering::Release);
    }

    /// Stops the task and waits a bounded time for its thread to exit. A thread
    /// waiting for its next tick wakes up immediately, while one which is stuck
    /// in an update and does not exit in time is abandoned.
    pub fn stop(&mut self) {
        self.state.stopped.store(true, Ordering::Release);

        if let Some(worker) = self.thread.take() {
            let _ = worker.wake.send(());

            match worker.done.recv_timeout(self.stop_timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    if worker.handle.join().is_err() {
                        error!("Fixed update task {} exited abnormally.", self.name);
                    }

                    info!("Fixed update task {} stopped.", self.name);
                }
                Err(RecvTimeoutError::Timeout) => {
                    error!(
                        "Fixed update task {} did not stop within {:?}, abandoned.",
                        self.name, self.stop_timeout
                    );
                }
            }
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.thread.is_some() && !self.is_paused() && !self.is_stopped()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }

    /// The number of completed updates.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.state.ticks.load(Ordering::Acquire)
    }
}

impl Drop for FixedUpdateTask {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sched::Updateable;
    use parking_lot::Mutex;

    struct Sleeper;

    impl Updateable for Sleeper {
        fn update(&mut self, _: f32) {}
    }

    fn task() -> FixedUpdateTask {
        let updateable = Arc::new(Mutex::new(Sleeper));
        FixedUpdateTask::with_interval("sleeper", updateable, Duration::from_millis(5))
    }

    #[test]
    fn states() {
        let mut task = task();
        assert!(!task.is_running());

        task.start().unwrap();
        task.start().unwrap();
        assert!(task.is_running());

        task.pause();
        task.pause();
        assert!(task.is_paused());
        assert!(!task.is_running());

        task.resume();
        task.resume();
        assert!(task.is_running());

        task.stop();
        assert!(task.is_stopped());
        assert!(!task.is_running());

        task.start().unwrap();
        assert!(!task.is_running());
    }

    #[test]
    fn stop_wakes_a_waiting_task() {
        let updateable = Arc::new(Mutex::new(Sleeper));
        let mut task = FixedUpdateTask::with_interval("slow", updateable, Duration::from_secs(2));
        task.start().unwrap();
        thread::sleep(Duration::from_millis(50));

        let ts = Instant::now();
        task.stop();
        assert!(task.is_stopped());
        assert!(ts.elapsed() < task.stop_timeout / 2, "{:?}", ts.elapsed());
        assert_eq!(task.ticks(), 0);
    }

    #[test]
    fn stop_before_start() {
        let mut task = task();
        task.stop();
        assert!(task.is_stopped());
        assert_eq!(task.ticks(), 0);
    }
}
