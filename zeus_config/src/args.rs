use clap::Args;

fn default_date() -> String {
  chrono::Local::now().format("%Y%m%d").to_string()
}

/// Flags shared by every verb: where the pipeline lives and where its output goes.
/// Mirrors the original's global flags registered once on the top-level parser.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
  /// The id of the pipeline. e.g. "hotel", "suggest", etc.
  #[arg(long, global = true)]
  pub id: String,

  /// The root directory specifying the top level of the pipeline.
  #[arg(long, global = true)]
  pub root: std::path::PathBuf,

  /// The directory specifying where the output data is published to.
  #[arg(long, global = true)]
  pub publish_root: Option<std::path::PathBuf>,

  /// The directory specifying where pipeline specific binaries and scripts live.
  #[arg(long, global = true)]
  pub bin_root: Option<std::path::PathBuf>,

  /// The directory specifying where common pipeline utilities live.
  #[arg(long, global = true)]
  pub utils_root: Option<std::path::PathBuf>,

  /// Comma separated list of output directories the pipeline needs.
  #[arg(long, global = true, value_delimiter = ',')]
  pub out_dirs: Vec<String>,

  /// The date for the output subfolders.
  #[arg(long, global = true, default_value_t = default_date())]
  pub date: String,

  /// Do not log all the execution output to a file.
  #[arg(long, global = true, default_value_t = false)]
  pub nolog_output: bool,

  /// Logs all the execution output to the tmp dir instead of the output dir.
  #[arg(long, global = true, default_value_t = false)]
  pub log_to_tmp: bool,
}

/// Flags shared by every verb that resolves a task set via Discovery: the targets
/// themselves, plus the ignore list and debug toggle.
#[derive(Args, Debug, Clone)]
pub struct TaskSelectArgs {
  /// Files, directories, or "dir/..." recursive trees to select tasks from. Defaults to
  /// "..." (the whole pipeline root) when empty.
  pub task: Vec<String>,

  /// Comma separated list of substrings specifying tasks to ignore, e.g. "_xxx" ignores
  /// all tasks containing "_xxx". "timeout" is always implicitly ignored, since timeout
  /// side-files must never be mistaken for tasks.
  #[arg(
    long,
    value_delimiter = ',',
    default_value = "deprecated,no_exec,xxx,timeout"
  )]
  pub ignore_tasks: Vec<String>,

  /// Debug mode: emits verbose discovery and scheduling logs.
  #[arg(long, default_value_t = false)]
  pub debug: bool,
}

impl TaskSelectArgs {
  /// The targets to resolve, defaulting to the whole pipeline when none were given.
  pub fn targets(&self) -> Vec<String> {
    if self.task.is_empty() {
      vec!["...".to_string()]
    } else {
      self.task.clone()
    }
  }
}

/// Flags shared by `run` and `continue`: concurrency knobs plus the mail configuration.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
  /// Default per-task timeout in seconds, used when neither a `.timeout` side file nor a
  /// directory `timeout` side file names one.
  #[arg(short = 't', long, default_value_t = 3600)]
  pub timeout: u64,

  /// Maximum number of tasks to run concurrently within a priority group. Defaults to the
  /// number of available CPUs.
  #[arg(long)]
  pub pool_size: Option<usize>,

  /// Mail address notified of successful tasks (only sent at all when
  /// `--detailed_success_mail` is also set) and of a successful final run summary.
  #[arg(long)]
  pub success_mail: Option<String>,

  /// Mail address notified of failed tasks and of a failing final run summary.
  #[arg(long)]
  pub failure_mail: Option<String>,

  /// Also mail `--success_mail` for each individual successful task, not just the final
  /// summary.
  #[arg(long, default_value_t = false)]
  pub detailed_success_mail: bool,

  /// Domain used to build the pipeline's outgoing mail address.
  #[arg(long, default_value = "localhost")]
  pub mail_domain: String,
}

impl RunArgs {
  pub fn timeout(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.timeout)
  }

  pub fn pool_size(&self) -> usize {
    self.pool_size.unwrap_or_else(num_cpus::get)
  }
}
