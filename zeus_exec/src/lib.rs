// The scheduling/execution subsystem: runs a priority-ordered task map with bounded
// concurrency, enforcing per-task timeouts and options, and persists per-output-directory
// status markers once a run completes.

mod cancel;
mod env;
mod executor;
mod managed_child;
mod scheduler;
mod status;
mod timeout;

pub use cancel::CancelToken;
pub use executor::{execute_task, CapturedOutput, ExecutionOutcome};
pub use managed_child::ManagedChild;
pub use scheduler::{filter_already_successful, run_schedule, SchedulerOptions, SchedulerOutcome};
pub use status::{write_status_markers, DirectoryStatus};
pub use timeout::resolve_timeout;
