use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Broadcasts a process-level interrupt (Ctrl-C) to every in-flight task. Cloning shares the
/// same underlying flag, so every clone observes a `cancel()` made through any other clone.
#[derive(Clone)]
pub struct CancelToken {
  cancelled: Arc<AtomicBool>,
  notify: Arc<Notify>,
}

impl CancelToken {
  pub fn new() -> Self {
    Self {
      cancelled: Arc::new(AtomicBool::new(false)),
      notify: Arc::new(Notify::new()),
    }
  }

  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
    self.notify.notify_waiters();
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }

  /// Resolves immediately if already cancelled; otherwise waits for the next `cancel()`.
  /// The `Notified` future is created before the flag check so a `cancel()` landing in
  /// between the check and the await is still observed, rather than missed.
  pub async fn cancelled(&self) {
    let notified = self.notify.notified();
    if self.is_cancelled() {
      return;
    }
    notified.await;
  }
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn cancelled_resolves_once_cancel_is_called() {
    let token = CancelToken::new();
    let waiter = token.clone();
    let handle = tokio::spawn(async move {
      waiter.cancelled().await;
    });
    assert!(!token.is_cancelled());
    token.cancel();
    handle.await.unwrap();
    assert!(token.is_cancelled());
  }

  #[tokio::test]
  async fn cancelled_returns_immediately_if_already_cancelled() {
    let token = CancelToken::new();
    token.cancel();
    tokio::time::timeout(std::time::Duration::from_millis(100), token.cancelled())
      .await
      .expect("should resolve immediately");
  }
}
