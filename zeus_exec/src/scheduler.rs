use std::time::Duration;

use zeus_config::PipelineConfig;
use zeus_discovery::{ExitClass, PriorityMap, Task};
use zeus_notify::Notifier;
use zeus_task_executor::Executor;

use crate::cancel::CancelToken;
use crate::executor::{execute_task, CapturedOutput};
use crate::status::DirectoryStatus;

pub struct SchedulerOptions {
  pub pool_size: usize,
  pub default_timeout: Duration,
}

#[derive(Debug, Default)]
pub struct SchedulerOutcome {
  pub succeeded: Vec<Task>,
  pub failed: Vec<Task>,
  pub aborted_by: Option<Task>,
  pub cancelled: bool,
  pub directory_status: DirectoryStatus,
}

/// Removes every task already marked `SUCCESS` in all of its configured output
/// directories from `priority_map`, returning the pruned map and the tasks that were
/// skipped. A task with no configured output directories is never considered
/// already-successful, since there would be nowhere to have recorded that.
pub fn filter_already_successful(priority_map: &PriorityMap, config: &PipelineConfig) -> (PriorityMap, Vec<Task>) {
  let mut skipped = Vec::new();
  let mut filtered = PriorityMap::new();
  for (priority, group) in priority_map {
    let mut remaining = std::collections::BTreeSet::new();
    for task in group {
      if is_already_successful(task, config) {
        skipped.push(task.clone());
      } else {
        remaining.insert(task.clone());
      }
    }
    if !remaining.is_empty() {
      filtered.push((priority.clone(), remaining));
    }
  }
  (filtered, skipped)
}

fn is_already_successful(task: &Task, config: &PipelineConfig) -> bool {
  let Some(rel_dir) = zeus_discovery::output_rel_dir(task, config) else {
    return false;
  };
  let out_dirs = config.subdirs_for_path(&rel_dir);
  if out_dirs.is_empty() {
    return false;
  }
  out_dirs.values().all(|dir| dir.join("SUCCESS").is_file())
}

/// Runs every priority group in ascending order, dispatching each group's tasks to a bounded
/// worker pool and updating the two directory-status maps once the whole group has
/// completed. An `abort_fail` task seen in an earlier group short-circuits every later group
/// without running any of its tasks.
#[allow(clippy::too_many_arguments)]
pub async fn run_schedule(
  executor: &Executor,
  config: &PipelineConfig,
  priority_map: &PriorityMap,
  options: &SchedulerOptions,
  notifier: Option<&Notifier>,
  cancel: &CancelToken,
) -> SchedulerOutcome {
  let mut outcome = SchedulerOutcome::default();

  for (priority, group) in priority_map {
    if cancel.is_cancelled() {
      outcome.cancelled = true;
      break;
    }

    if outcome.aborted_by.is_some() {
      log::warn!("skipping priority group {priority} because an earlier group had an abort-fail task");
      outcome.failed.extend(group.iter().cloned());
      continue;
    }

    let mut to_run = Vec::new();
    for task in group {
      let opts = zeus_discovery::options(task, config);
      if opts.require_dir_success && outcome.directory_status.task_dir_status(task) > ExitClass::Success {
        log::warn!(
          "skipping {} because an earlier task in its directory did not succeed",
          task.display()
        );
        outcome.failed.push(task.clone());
        continue;
      }
      to_run.push(task.clone());
    }
    if to_run.is_empty() {
      continue;
    }

    let default_timeout = options.default_timeout;
    let cancel_for_group = cancel.clone();
    let config_for_closure = config.clone();
    let results = zeus_fs::parallel_map(executor, to_run, options.pool_size, move |task| {
      let config = config_for_closure.clone();
      let cancel = cancel_for_group.clone();
      async move {
        let result = execute_task(&task, &config, default_timeout, &cancel).await;
        (task, result)
      }
    })
    .await;

    for (task, result) in results {
      outcome.directory_status.record(&task, config, result.exit_class);

      if let Some(notifier) = notifier {
        let output = match &result.output {
          CapturedOutput::LogFile(path) => zeus_notify::TaskOutput::LogFile(path),
          CapturedOutput::Captured(text) => zeus_notify::TaskOutput::Message(text),
        };
        notifier.notify_task(config, &task, result.exit_class, result.wall_time, output);
      }

      match result.exit_class {
        ExitClass::Success => outcome.succeeded.push(task),
        ExitClass::Failure | ExitClass::AllowFail => outcome.failed.push(task),
        ExitClass::AbortFail => {
          outcome.aborted_by.get_or_insert_with(|| task.clone());
          outcome.failed.push(task);
        }
      }
    }

    if cancel.is_cancelled() {
      outcome.cancelled = true;
      break;
    }
  }

  outcome
}
