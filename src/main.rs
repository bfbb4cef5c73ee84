use std::process::ExitCode;

use autocopyright::cli::{Cli, run};

/// Exit status for fatal errors; 0 and 1 report whether files changed.
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse_args();

  match run(cli.run_args).await {
    Ok(code) => code,
    Err(e) => {
      eprintln!("Error: {e:#}");
      ExitCode::from(EXIT_FAILURE)
    }
  }
}
