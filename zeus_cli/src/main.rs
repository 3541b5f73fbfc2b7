use std::process::ExitCode;

use clap::Parser;
use zeus_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
  env_logger::init();
  let cli = Cli::parse();
  let code = zeus_cli::run(cli).await;
  ExitCode::from(code as u8)
}
