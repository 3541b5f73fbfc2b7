// Thin wrapper around a tokio runtime handle.
//
// Modeled on pantsbuild's `task_executor` crate, trimmed of the
// stdio/workunit-store context propagation those wrappers needed for
// pantsd: Zeus has no daemon, so a plain owned-or-borrowed `Handle` is
// enough.

use std::future::Future;
use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

/// A cloneable handle to a tokio runtime, either owned (constructed by
/// Zeus itself) or borrowed (constructed by an ambient `#[tokio::main]`).
#[derive(Clone)]
pub struct Executor {
  // Only `Some` if this `Executor` owns (and thus must eventually shut
  // down) the `Runtime` it wraps.
  runtime: Arc<Mutex<Option<Runtime>>>,
  handle: Handle,
}

impl Executor {
  /// Wrap the `Handle` of the runtime that is currently executing.
  ///
  /// Panics if called from outside the context of a running tokio runtime.
  pub fn new() -> Self {
    Self {
      runtime: Arc::new(Mutex::new(None)),
      handle: Handle::current(),
    }
  }

  /// Create a new `Executor` with its own background-thread runtime.
  pub fn new_owned(num_worker_threads: usize, max_threads: usize) -> Result<Self, String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(num_worker_threads)
      .max_blocking_threads(max_threads)
      .enable_all()
      .build()
      .map_err(|e| format!("failed to start the scheduler runtime: {e}"))?;
    let handle = runtime.handle().clone();
    Ok(Self {
      runtime: Arc::new(Mutex::new(Some(runtime))),
      handle,
    })
  }

  /// A copy of this `Executor` which does not own the underlying runtime,
  /// and so will not shut it down when dropped.
  pub fn to_borrowed(&self) -> Self {
    Self {
      runtime: Arc::new(Mutex::new(None)),
      handle: self.handle.clone(),
    }
  }

  pub fn handle(&self) -> &Handle {
    &self.handle
  }

  /// Run a `Future` to completion on this executor's threads, blocking the
  /// current thread until it completes.
  pub fn block_on<F: Future>(&self, future: F) -> F::Output {
    self.handle.block_on(future)
  }

  /// Spawn a future as a new task, returning a `JoinHandle` for it.
  pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
  where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
  {
    self.handle.spawn(future)
  }

  /// Spawn a blocking closure on tokio's dedicated blocking-thread pool.
  pub fn spawn_blocking<F, R>(&self, f: F) -> JoinHandle<R>
  where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
  {
    self.handle.spawn_blocking(f)
  }

  /// Shut down an owned runtime, waiting up to `timeout` for in-flight
  /// tasks to finish. A borrowed `Executor` is a no-op.
  pub fn shutdown(&self, timeout: std::time::Duration) {
    if let Some(runtime) = self.runtime.lock().take() {
      trace!("shutting down owned tokio runtime (timeout: {timeout:?})");
      runtime.shutdown_timeout(timeout);
    }
  }

  pub fn is_shutdown(&self) -> bool {
    self.runtime.lock().is_none()
  }
}

impl Default for Executor {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::Executor;
  use std::time::Duration;

  #[test]
  fn owned_executor_runs_and_shuts_down() {
    let executor = Executor::new_owned(1, 1).unwrap();
    let result = executor.block_on(async { 1 + 1 });
    assert_eq!(result, 2);
    executor.shutdown(Duration::from_secs(1));
    assert!(executor.is_shutdown());
  }

  #[tokio::test]
  async fn borrowed_executor_spawns() {
    let executor = Executor::new();
    let handle = executor.spawn(async { 40 + 2 });
    assert_eq!(handle.await.unwrap(), 42);
    // Borrowed executors never own a runtime to shut down.
    assert!(executor.is_shutdown());
  }
}
