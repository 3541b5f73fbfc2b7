// A child process running in its own process group, with a Drop implementation that kills
// that group. Adapted from pantsbuild's `process_execution::children::ManagedChild`: tasks
// here may fork their own subprocesses (shell scripts commonly do), so killing just the
// immediate child on timeout would leave orphans running.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{thread, time};

use nix::sys::signal;
use nix::unistd::getpgid;
use nix::unistd::Pid;
use tokio::process::{Child, Command};

const GRACEFUL_SHUTDOWN_POLL_TIME: time::Duration = time::Duration::from_millis(50);

pub struct ManagedChild {
  child: Child,
  graceful_shutdown_timeout: time::Duration,
  killed: AtomicBool,
}

impl ManagedChild {
  pub fn spawn(mut command: Command, graceful_shutdown_timeout: time::Duration) -> Result<Self, String> {
    command.kill_on_drop(true);

    // Give the child its own pgid so the whole tree it spawns can be killed by negating that id.
    unsafe {
      command.pre_exec(|| {
        nix::unistd::setsid()
          .map(|_pgid| ())
          .map_err(|e| std::io::Error::other(format!("could not create new pgid: {e}")))
      });
    };

    let child = command
      .spawn()
      .map_err(|e| format!("error executing task: {e}"))?;
    Ok(Self {
      child,
      graceful_shutdown_timeout,
      killed: AtomicBool::new(false),
    })
  }

  fn get_pgid(&self) -> Result<Pid, String> {
    let pid = self.id().ok_or_else(|| "process had no pid".to_owned())?;
    getpgid(Some(Pid::from_raw(pid as i32)))
      .map_err(|e| format!("could not get process group id of child process: {e}"))
  }

  fn signal_pg<T: Into<Option<signal::Signal>>>(&self, signal: T) -> Result<(), String> {
    let pgid = self.get_pgid()?;
    // The negative pgid signals the entire process group, not just the direct child.
    signal::kill(Pid::from_raw(-pgid.as_raw()), signal)
      .map_err(|e| format!("failed to signal child process group: {e}"))
  }

  /// Immediately SIGKILLs the whole process group and awaits reaping. Used on timeout and
  /// on a process-level interrupt, where there is no value in waiting for a graceful exit.
  pub async fn kill_tree(&mut self) -> Result<(), String> {
    let result = self.signal_pg(signal::Signal::SIGKILL);
    self.killed.store(true, Ordering::SeqCst);
    let _ = self.child.wait().await;
    result
  }

  fn check_child_has_exited(&mut self) -> Result<bool, String> {
    self.child.try_wait().map(|o| o.is_some()).map_err(|e| e.to_string())
  }

  fn wait_for_child_exit_sync(&mut self, max_wait_duration: time::Duration) -> Result<bool, String> {
    let deadline = time::Instant::now() + max_wait_duration;
    while time::Instant::now() <= deadline {
      if self.check_child_has_exited()? {
        return Ok(true);
      }
      thread::sleep(GRACEFUL_SHUTDOWN_POLL_TIME);
    }
    Ok(false)
  }

  /// Blocking graceful shutdown used only from `Drop`: SIGINT, wait a bounded time, then
  /// SIGKILL if the tree is still alive.
  fn graceful_shutdown_sync(&mut self) -> Result<(), String> {
    self.signal_pg(signal::Signal::SIGINT)?;
    match self.wait_for_child_exit_sync(self.graceful_shutdown_timeout) {
      Ok(true) => {
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
      }
      Ok(false) => {
        log::warn!("timed out waiting for graceful shutdown of process group, sending SIGKILL");
        self.kill_pgid_sync()
      }
      Err(e) => {
        log::warn!("error waiting for graceful shutdown ({e}), sending SIGKILL");
        self.kill_pgid_sync()
      }
    }
  }

  fn kill_pgid_sync(&mut self) -> Result<(), String> {
    self.signal_pg(signal::Signal::SIGKILL)?;
    self.killed.store(true, Ordering::SeqCst);
    Ok(())
  }
}

impl Deref for ManagedChild {
  type Target = Child;

  fn deref(&self) -> &Child {
    &self.child
  }
}

impl DerefMut for ManagedChild {
  fn deref_mut(&mut self) -> &mut Child {
    &mut self.child
  }
}

impl Drop for ManagedChild {
  fn drop(&mut self) {
    if !self.killed.load(Ordering::SeqCst) {
      let _ = self.graceful_shutdown_sync();
    }
  }
}
