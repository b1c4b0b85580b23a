//! Named background tasks with cooperative cancellation.
//!
//! Each task runs on its own OS thread and receives a [`CancelToken`]. The
//! task polls the token between units of work and sleeps through
//! [`CancelToken::sleep`], which returns early once cancellation is
//! requested. Nothing is ever killed: a task stuck in a blocking call
//! finishes that call before it observes the token.

use parking_lot::{Condvar, Mutex};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        // Taking the lock orders this notify after any sleeper's flag check
        let _guard = self.inner.lock.lock();
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Sleep for `duration` unless cancelled first. Returns `true` if the
    /// token is cancelled when the call returns.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.inner.lock.lock();

        while !self.is_cancelled() {
            if self.inner.wake.wait_until(&mut guard, deadline).timed_out() {
                return self.is_cancelled();
            }
        }
        true
    }
}

/// Owner of one spawned task.
///
/// Dropping the handle cancels and joins the task.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    token: CancelToken,
    thread: Option<JoinHandle<()>>,
}

/// Spawn `task` on a new thread named `name`.
pub fn spawn<F>(name: impl Into<String>, task: F) -> io::Result<TaskHandle>
where
    F: FnOnce(CancelToken) + Send + 'static,
{
    let name = name.into();
    let token = CancelToken::new();
    let task_token = token.clone();

    let thread = thread::Builder::new()
        .name(name.clone())
        .spawn(move || task(task_token))?;

    Ok(TaskHandle {
        name,
        token,
        thread: Some(thread),
    })
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the task to stop. Does not wait.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Block until the task returns. `Err` carries the panic payload if the
    /// task panicked.
    pub fn join(mut self) -> thread::Result<()> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> thread::Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.cancel();
            if self.join_inner().is_err() {
                log::error!("Task '{}' panicked", self.name);
            }
        }
    }
}
