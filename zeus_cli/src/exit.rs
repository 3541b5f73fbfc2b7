pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INTERRUPTED: i32 = 1;
pub const EXIT_NO_TASKS: i32 = 101;
pub const EXIT_TASKS_FAILED: i32 = 102;

/// Not part of the documented exit-code contract (only 0/1/101/102 are named); used when a
/// `ConfigError` is surfaced before Discovery runs, since no task ever got a chance to fail
/// or be interrupted. Shares `EXIT_INTERRUPTED`'s value: both mean "the run never reached
/// completion".
pub const EXIT_CONFIG_ERROR: i32 = EXIT_INTERRUPTED;
