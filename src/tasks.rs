//! Dispatch of the picker's asynchronous callbacks.
//!
//! The UI thread never blocks on a callback: the future it returns is
//! spawned onto a tokio runtime and only its `JoinHandle` is kept, so the
//! owner can tell whether work is still in flight.

use std::future::Future;
use std::io;
use std::pin::Pin;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

/// Boxed future returned by the asynchronous picker callbacks.
pub type PickerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Build the runtime the demo binary spawns callbacks onto.
pub fn build_runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("livefile-task")
        .enable_all()
        .build()
        .or_else(|e| {
            tracing::error!(
                error = %e,
                "Failed to create multi-thread tokio runtime, falling back to current-thread"
            );
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
        })
}

#[derive(Debug, Clone)]
pub struct TaskSpawner {
    handle: Handle,
}

impl TaskSpawner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn spawn(&self, label: &'static str, future: PickerFuture) -> JoinHandle<()> {
        tracing::debug!(task = label, "dispatching picker task");
        self.handle.spawn(async move {
            future.await;
            tracing::debug!(task = label, "picker task settled");
        })
    }
}

/// Outstanding tasks spawned on behalf of one control.
#[derive(Debug, Default)]
pub struct PendingTasks {
    handles: Vec<JoinHandle<()>>,
}

impl PendingTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop handles of tasks that have finished.
    pub fn prune(&mut self) {
        self.handles.retain(|handle| !handle.is_finished());
    }

    pub fn push(&mut self, handle: JoinHandle<()>) {
        self.prune();
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take(&mut self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.handles)
    }
}
