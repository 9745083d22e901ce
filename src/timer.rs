//! Cancellable background tasks.
//!
//! Both periodic sources of a session (the countdown timer and the heading
//! subscription) run on their own thread and hand back a [`TaskHandle`].
//! Dropping or cancelling the handle closes its [`Gate`]; every emission a
//! task makes goes through the gate, so once `cancel` returns nothing from
//! that task reaches the display again.

use anyhow::{Context, Result};
use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Open/closed switch that serializes a task's emissions against cancellation.
#[derive(Debug)]
pub struct Gate {
    open: Mutex<bool>,
}

impl Gate {
    fn new() -> Self {
        Self {
            open: Mutex::new(true),
        }
    }

    /// Run `f` only while the gate is open.
    ///
    /// The lock is held for the duration of `f`, so [`Gate::close`] waits for
    /// an in-flight emission to finish.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        if *open { Some(f()) } else { None }
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn close(&self) {
        *self.open.lock().unwrap_or_else(|e| e.into_inner()) = false;
    }
}

/// Handle to a background task. Cancels the task when dropped.
pub struct TaskHandle {
    name: String,
    gate: Arc<Gate>,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    join_on_cancel: bool,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True until the task is cancelled or finishes on its own.
    pub fn is_active(&self) -> bool {
        self.gate.is_open()
            && self
                .thread
                .as_ref()
                .is_some_and(|thread| !thread.is_finished())
    }

    /// Stop the task. Idempotent.
    ///
    /// After this returns the task makes no further emissions. Timer threads
    /// are also joined; listener threads may be blocked on I/O and are left to
    /// exit on their next wakeup.
    pub fn cancel(&mut self) {
        self.gate.close();
        // Dropping the sender wakes a timer blocked in recv_timeout
        self.stop.take();

        if let Some(thread) = self.thread.take() {
            let is_self = thread.thread().id() == thread::current().id();
            if self.join_on_cancel && !is_self {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Run `callback` every `interval` until it breaks or the handle is cancelled.
///
/// The first call happens one interval after scheduling. Each call is
/// expected to return quickly; the timer does not catch up on missed ticks.
pub fn schedule<F>(name: &str, interval: Duration, mut callback: F) -> Result<TaskHandle>
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let gate = Arc::new(Gate::new());
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let task_gate = Arc::clone(&gate);

    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                match task_gate.run(&mut callback) {
                    Some(ControlFlow::Continue(())) => {}
                    Some(ControlFlow::Break(())) | None => break,
                }
            }
        })
        .with_context(|| format!("Failed to spawn timer thread '{name}'"))?;

    Ok(TaskHandle {
        name: name.to_string(),
        gate,
        stop: Some(stop_tx),
        thread: Some(thread),
        join_on_cancel: true,
    })
}

/// Spawn a push-driven listener.
///
/// `body` receives the task's gate and must route every emission through
/// [`Gate::run`], returning once the gate reports closed.
pub fn spawn_listener<F>(name: &str, body: F) -> Result<TaskHandle>
where
    F: FnOnce(Arc<Gate>) + Send + 'static,
{
    let gate = Arc::new(Gate::new());
    let task_gate = Arc::clone(&gate);

    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(task_gate))
        .with_context(|| format!("Failed to spawn listener thread '{name}'"))?;

    Ok(TaskHandle {
        name: name.to_string(),
        gate,
        stop: None,
        thread: Some(thread),
        join_on_cancel: false,
    })
}
