mod discovery;
mod task;

pub use discovery::{discover, PriorityMap};
pub use task::{
  display_name, log_file, options, output_rel_dir, priority, relative_name, ExitClass,
  TaskOptions, TaskResult,
};

use std::path::PathBuf;

/// A task is just the absolute path to its runnable file. Everything else about it
/// (priority, display name, options, output layout) is derived on demand from that path
/// plus the active `PipelineConfig`, rather than cached on a struct: tasks are transient,
/// produced once by discovery and consumed once by the scheduler.
pub type Task = PathBuf;
