use std::fmt;
use std::future::Future;

use futures::future::try_join_all;
use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;

use crate::Result;

/// Single-threaded cooperative scheduler.
///
/// Every task runs on the thread that calls [`EventLoop::gather`]. A task gives
/// up control only where it awaits, so work that never awaits runs to completion
/// before the next task starts.
pub struct EventLoop {
    runtime: Runtime,
}

impl EventLoop {
    /// Create a new event loop with I/O and timer drivers enabled
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(EventLoop { runtime })
    }

    /// Run a single future to completion on the loop
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Spawn every future as a local task, wait for all of them and return
    /// their outputs in submission order.
    pub fn gather<F, T>(&self, tasks: Vec<F>) -> Result<Vec<T>>
    where
        F: Future<Output = T> + 'static,
        T: 'static,
    {
        let local = LocalSet::new();
        let count = tasks.len();
        let outputs = local.block_on(&self.runtime, async move {
            let handles: Vec<_> = tasks.into_iter().map(tokio::task::spawn_local).collect();
            log::debug!("event loop scheduled {} tasks", count);
            try_join_all(handles).await
        })?;
        Ok(outputs)
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("flavor", &self.runtime.handle().runtime_flavor())
            .finish()
    }
}
