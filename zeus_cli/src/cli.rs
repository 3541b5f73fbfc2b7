use clap::{Parser, Subcommand};

use zeus_config::{GlobalArgs, RunArgs, TaskSelectArgs};

/// Zeus: a directory-driven task pipeline engine.
#[derive(Parser, Debug)]
#[command(name = "zeus")]
pub struct Cli {
  #[command(flatten)]
  pub global: GlobalArgs,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Discover and execute tasks.
  Run {
    #[command(flatten)]
    select: TaskSelectArgs,
    #[command(flatten)]
    run: RunArgs,
  },

  /// Like `run`, but skips tasks whose output directory is already marked `SUCCESS`.
  Continue {
    #[command(flatten)]
    select: TaskSelectArgs,
    #[command(flatten)]
    run: RunArgs,
  },

  /// Remove output directories without running anything.
  Clean {
    #[command(flatten)]
    select: TaskSelectArgs,

    /// Remove the entire output tree instead of walking discovered tasks.
    #[arg(long, default_value_t = false)]
    all: bool,
  },

  /// Repoint each discovered task's `current` publish symlink at its newest publishable
  /// dated directory.
  Publish {
    #[command(flatten)]
    select: TaskSelectArgs,
    #[arg(long)]
    pool_size: Option<usize>,
  },

  /// Mirror discovered tasks' output directories into the publish tree.
  Export {
    #[command(flatten)]
    select: TaskSelectArgs,
    #[arg(long)]
    pool_size: Option<usize>,
  },

  /// Copy discovered tasks' data back from the publish tree's `current` symlink.
  Import {
    #[command(flatten)]
    select: TaskSelectArgs,
    #[arg(long)]
    pool_size: Option<usize>,
  },

  /// Print usage information.
  Help,
}
