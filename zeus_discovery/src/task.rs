use std::path::{Path, PathBuf};

use zeus_config::PipelineConfig;

use crate::Task;

/// How a completed task's exit should be treated for scheduling and publishing purposes.
/// Ordered worst-to-best is the wrong way round for comparisons we actually want ("is this
/// at least as bad as a plain failure"), so the ordering here runs best-to-worst instead:
/// `Success < AllowFail < Failure < AbortFail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExitClass {
  Success,
  AllowFail,
  Failure,
  AbortFail,
}

impl ExitClass {
  /// Whether this counts as a failed run for reporting purposes. `AllowFail` is a failure
  /// that does not block publishing, but it is still a failure.
  pub fn is_failure(self) -> bool {
    !matches!(self, ExitClass::Success)
  }

  /// The status marker file name `StatusWriter` drops into a task's output dir.
  pub fn status_marker(self) -> &'static str {
    match self {
      ExitClass::Success | ExitClass::AllowFail => "SUCCESS",
      ExitClass::Failure => "FAILURE",
      ExitClass::AbortFail => "ABORT",
    }
  }
}

/// `(exit class, task)`, as produced by the executor and consumed by the notifier and the
/// final run summary.
pub type TaskResult = (ExitClass, Task);

/// Flags parsed out of a task's relative path by substring match, the same way the
/// original scans a task's relative name for `.abort_fail`, `.allow_fail` and
/// `.require_dir_success` markers rather than requiring a manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOptions {
  pub abort_fail: bool,
  pub allow_fail: bool,
  pub require_dir_success: bool,
}

impl TaskOptions {
  fn from_relative_name(rel: &Path) -> Self {
    let name = rel.to_string_lossy();
    Self {
      abort_fail: name.contains(".abort_fail"),
      allow_fail: name.contains(".allow_fail"),
      require_dir_success: name.contains(".require_dir_success"),
    }
  }
}

/// The task path relative to `config.base_dir()`, or `None` if it does not live under it.
pub fn relative_name(task: &Task, config: &PipelineConfig) -> Option<PathBuf> {
  task.strip_prefix(config.base_dir()).ok().map(Path::to_path_buf)
}

/// `"//" + relative_name`, falling back to the absolute path if the task escapes the base
/// dir somehow. Used for log lines and mail subjects.
pub fn display_name(task: &Task, config: &PipelineConfig) -> String {
  match relative_name(task, config) {
    Some(rel) => format!("//{}", rel.display()),
    None => format!("//{}", task.display()),
  }
}

/// Splits a single path segment into its leading digit run and the rest, the way
/// `"01_build".split('_', 1)` would. Returns `None` if there is no underscore, matching a
/// segment that does not look like a priority-prefixed name.
fn split_segment(segment: &str) -> Option<(&str, &str)> {
  segment.split_once('_')
}

/// The scheduling priority of a task: the leading digit run of every path segment in its
/// relative name, concatenated in order. A task whose relative name has any segment
/// without a digit-prefixed name (no underscore, or a non-digit prefix) has no priority
/// and is not schedulable.
pub fn priority(task: &Task, config: &PipelineConfig) -> Option<String> {
  let rel = relative_name(task, config)?;
  let mut out = String::new();
  for component in rel.components() {
    let segment = component.as_os_str().to_str()?;
    let (digits, _) = split_segment(segment)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
      return None;
    }
    out.push_str(digits);
  }
  if out.is_empty() {
    None
  } else {
    Some(out)
  }
}

/// The output directory a task's results land under, relative to a configured output
/// subdir: the numeric prefix stripped from every directory segment of the task's
/// relative name. `01_a/02_b/03_run.sh` contributes `a/b`.
pub fn output_rel_dir(task: &Task, config: &PipelineConfig) -> Option<PathBuf> {
  let rel = relative_name(task, config)?;
  let dir = rel.parent()?;
  let mut out = PathBuf::new();
  for component in dir.components() {
    let segment = component.as_os_str().to_str()?;
    let (_, name) = split_segment(segment)?;
    out.push(name);
  }
  Some(out)
}

/// Flags parsed from the task's relative name.
pub fn options(task: &Task, config: &PipelineConfig) -> TaskOptions {
  match relative_name(task, config) {
    Some(rel) => TaskOptions::from_relative_name(&rel),
    None => TaskOptions::default(),
  }
}

/// The log file a task's stdout/stderr is captured to, if logging is enabled for this run:
/// the task's relative name with `/` flattened to `.`, under `config.log_dir()`.
pub fn log_file(task: &Task, config: &PipelineConfig) -> Option<PathBuf> {
  let log_dir = config.log_dir()?;
  let rel = relative_name(task, config)?;
  let flattened = rel.to_string_lossy().replace('/', ".");
  Some(log_dir.join(format!("{flattened}.log")))
}
