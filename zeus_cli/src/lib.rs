// The `zeus` binary's dispatch layer: parses the CLI, picks the verb, and returns the
// process exit code. Kept as a library so `zeus_cli/tests/` can drive whole invocations
// without spawning a subprocess, the way the teacher's own binaries separate parsing from
// `main`.

pub mod cli;
mod exit;
mod verbs;

pub use exit::{EXIT_CONFIG_ERROR, EXIT_INTERRUPTED, EXIT_NO_TASKS, EXIT_SUCCESS, EXIT_TASKS_FAILED};

use cli::{Cli, Commands};

/// Dispatches a parsed [`Cli`] to its verb and returns the process exit code.
pub async fn run(cli: Cli) -> i32 {
  match cli.command {
    Commands::Run { select, run } => verbs::run_or_continue(cli.global, select, run, false).await,
    Commands::Continue { select, run } => verbs::run_or_continue(cli.global, select, run, true).await,
    Commands::Clean { select, all } => verbs::clean(cli.global, select, all),
    Commands::Publish { select, pool_size } => verbs::publish(cli.global, select, pool_size).await,
    Commands::Export { select, pool_size } => verbs::export(cli.global, select, pool_size).await,
    Commands::Import { select, pool_size } => verbs::import(cli.global, select, pool_size).await,
    Commands::Help => {
      use clap::CommandFactory;
      let _ = Cli::command().print_help();
      println!();
      EXIT_SUCCESS
    }
  }
}
