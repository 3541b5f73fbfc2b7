use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use zeus_task_executor::Executor;

/// Runs `f` over every item in `items` concurrently, bounded to at most `pool_size`
/// in-flight at a time. Results are returned in the same order as `items`. A `pool_size`
/// of `0` is treated as `1` (matching the CLI's "unset pool size" default never meaning
/// "no concurrency").
///
/// Modeled on the original's `ExecUtils.ExecuteParallel`, which spread a fixed-size
/// multiprocessing pool over the same kind of per-item workhorse call; here the workhorse
/// is a future instead of a picklable callback, and the pool is a semaphore over tokio
/// tasks rather than OS processes.
pub async fn parallel_map<T, F, Fut, R>(
  executor: &Executor,
  items: Vec<T>,
  pool_size: usize,
  f: F,
) -> Vec<R>
where
  T: Send + 'static,
  F: Fn(T) -> Fut,
  Fut: Future<Output = R> + Send + 'static,
  R: Send + 'static,
{
  let semaphore = Arc::new(Semaphore::new(pool_size.max(1)));
  let handles: Vec<_> = items
    .into_iter()
    .map(|item| {
      let permit = semaphore.clone();
      let fut = f(item);
      executor.spawn(async move {
        let _permit = permit.acquire_owned().await.expect("semaphore never closed");
        fut.await
      })
    })
    .collect();

  let mut results = Vec::with_capacity(handles.len());
  for handle in handles {
    match handle.await {
      Ok(r) => results.push(r),
      Err(e) => log::error!("parallel task panicked: {e}"),
    }
  }
  results
}
