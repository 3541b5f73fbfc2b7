use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use zeus_config::PipelineConfig;
use zeus_discovery::{ExitClass, Task, TaskOptions};

use crate::cancel::CancelToken;
use crate::managed_child::ManagedChild;
use crate::{env, timeout};

/// A small window given to a killed process group to exit on its own before `ManagedChild`'s
/// drop handler would otherwise send it a second signal.
const GRACEFUL_SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// Where a finished task's output ended up: redirected to its assigned log file, or
/// captured directly in memory because no log file is configured for this run.
pub enum CapturedOutput {
  LogFile(std::path::PathBuf),
  Captured(String),
}

pub struct ExecutionOutcome {
  pub exit_class: ExitClass,
  pub wall_time: Duration,
  pub output: CapturedOutput,
}

fn classify(success: bool, options: TaskOptions) -> ExitClass {
  if success {
    ExitClass::Success
  } else if options.abort_fail {
    ExitClass::AbortFail
  } else if options.allow_fail {
    ExitClass::AllowFail
  } else {
    ExitClass::Failure
  }
}

/// Runs one task to completion: builds its environment, resolves its timeout, spawns it in
/// its own process group, and classifies the result. Never returns an `Err` — a task that
/// can't even be spawned is itself reported as a (non-options-respecting) failure, since the
/// scheduler has no other place to put that information.
pub async fn execute_task(
  task: &Task,
  config: &PipelineConfig,
  default_timeout: Duration,
  cancel: &CancelToken,
) -> ExecutionOutcome {
  let options = zeus_discovery::options(task, config);
  let started = Instant::now();

  let env = match env::build_env(task, config, options) {
    Ok(env) => env,
    Err(e) => {
      log::error!("failed to prepare output directories for {}: {e}", task.display());
      return ExecutionOutcome {
        exit_class: classify(false, options),
        wall_time: started.elapsed(),
        output: CapturedOutput::Captured(format!("failed to prepare output directories: {e}")),
      };
    }
  };

  let log_file = zeus_discovery::log_file(task, config);
  let mut command = Command::new(task);
  command.current_dir(config.base_dir());
  command.env_clear();
  command.envs(&env);

  match &log_file {
    Some(path) => match std::fs::File::create(path) {
      Ok(file) => {
        let stderr_file = file.try_clone().unwrap_or_else(|e| {
          log::warn!("could not clone log file handle for {}: {e}", path.display());
          std::fs::File::create(path).expect("log file was just created successfully")
        });
        command.stdout(Stdio::from(file));
        command.stderr(Stdio::from(stderr_file));
      }
      Err(e) => {
        log::warn!("could not open log file {}: {e}, capturing output instead", path.display());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
      }
    },
    None => {
      command.stdout(Stdio::piped());
      command.stderr(Stdio::piped());
    }
  }

  let task_timeout = timeout::resolve_timeout(task, default_timeout);

  let mut child = match ManagedChild::spawn(command, GRACEFUL_SHUTDOWN_GRACE) {
    Ok(child) => child,
    Err(e) => {
      log::error!("failed to execute {}: {e}", task.display());
      return ExecutionOutcome {
        exit_class: classify(false, options),
        wall_time: started.elapsed(),
        output: CapturedOutput::Captured(e),
      };
    }
  };

  let mut stdout_pipe = child.stdout.take();
  let mut stderr_pipe = child.stderr.take();

  let collect = async {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let (status, _, _) = tokio::join!(
      child.wait(),
      async {
        if let Some(pipe) = stdout_pipe.as_mut() {
          let _ = pipe.read_to_end(&mut stdout).await;
        }
      },
      async {
        if let Some(pipe) = stderr_pipe.as_mut() {
          let _ = pipe.read_to_end(&mut stderr).await;
        }
      }
    );
    (status, stdout, stderr)
  };

  enum RunOutcome {
    Completed(std::io::Result<std::process::ExitStatus>, Vec<u8>, Vec<u8>),
    TimedOut,
    Cancelled,
  }

  let run_outcome = tokio::select! {
    result = tokio::time::timeout(task_timeout, collect) => match result {
      Ok((status, stdout, stderr)) => RunOutcome::Completed(status, stdout, stderr),
      Err(_elapsed) => RunOutcome::TimedOut,
    },
    _ = cancel.cancelled() => RunOutcome::Cancelled,
  };

  let (success, captured) = match run_outcome {
    RunOutcome::Completed(status, stdout, stderr) => {
      let success = status.map(|s| s.success()).unwrap_or(false);
      (success, merge_output(log_file.is_none(), stdout, stderr))
    }
    RunOutcome::TimedOut => {
      log::warn!("{} exceeded its {:?} timeout, killing", task.display(), task_timeout);
      if let Err(e) = child.kill_tree().await {
        log::warn!("failed to kill {}: {e}", task.display());
      }
      (false, None)
    }
    RunOutcome::Cancelled => {
      log::warn!("killing {} due to run cancellation", task.display());
      if let Err(e) = child.kill_tree().await {
        log::warn!("failed to kill {}: {e}", task.display());
      }
      (false, None)
    }
  };

  let output = match (log_file, captured) {
    (Some(path), _) => CapturedOutput::LogFile(path),
    (None, Some(text)) => CapturedOutput::Captured(text),
    (None, None) => CapturedOutput::Captured(String::new()),
  };

  ExecutionOutcome {
    exit_class: classify(success, options),
    wall_time: started.elapsed(),
    output,
  }
}

fn merge_output(should_capture: bool, stdout: Vec<u8>, stderr: Vec<u8>) -> Option<String> {
  if !should_capture {
    return None;
  }
  let mut combined = String::from_utf8_lossy(&stdout).into_owned();
  if !stderr.is_empty() {
    combined.push_str("\n--- stderr ---\n");
    combined.push_str(&String::from_utf8_lossy(&stderr));
  }
  Some(combined)
}
