//! # Run Command
//!
//! Wires the parsed arguments to a [`Processor`] run: logging setup, config
//! merging, the run itself and the final summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::config::{CliOverrides, RunConfig, load_config};
use crate::{info_log, verbose_log};
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::processor::Processor;

/// Arguments for a run
#[derive(Args, Debug, Default)]
pub struct RunArgs {
  /// Symbol used to start a comment line (e.g. "#" or "//")
  #[arg(short = 's', long, value_name = "SYMBOL")]
  pub comment_symbol: Option<String>,

  /// Directory to search (repeatable)
  #[arg(short = 'd', long, value_name = "DIR")]
  pub directory: Vec<PathBuf>,

  /// File glob used to search the directories (repeatable)
  #[arg(short = 'g', long, value_name = "GLOB")]
  pub glob: Vec<String>,

  /// Regex of paths to exclude; may use {cwd} and {directory} (repeatable)
  #[arg(short = 'e', long, value_name = "REGEX")]
  pub exclude: Vec<String>,

  /// Path to the license template
  #[arg(short = 'l', long = "license", value_name = "FILE")]
  pub license: Option<PathBuf>,

  /// Number of files processed concurrently [default: 4]
  #[arg(short = 'p', long, value_name = "N")]
  pub pool: Option<usize>,

  /// TOML file exposed to templates as `project` (default: pyproject.toml or
  /// Cargo.toml in the working directory)
  #[arg(long, value_name = "FILE")]
  pub project_file: Option<PathBuf>,

  /// Process directories that are not inside a git repository
  #[arg(long)]
  pub allow_untracked: bool,

  /// Path to config file (default: .autocopyright.toml in the working
  /// directory)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl RunArgs {
  fn overrides(&self) -> CliOverrides {
    CliOverrides {
      comment_symbol: self.comment_symbol.clone(),
      directories: self.directory.clone(),
      globs: self.glob.clone(),
      exclude: self.exclude.clone(),
      license: self.license.clone(),
      pool: self.pool,
      project_file: self.project_file.clone(),
      allow_untracked: self.allow_untracked,
    }
  }
}

/// Runs autocopyright with the given arguments.
///
/// Returns exit code 1 if any file was modified and 0 otherwise.
pub async fn run(args: RunArgs) -> Result<ExitCode> {
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let cwd = std::env::current_dir().context("Failed to get current directory")?;

  let file_config = load_config(args.config.as_deref(), &cwd, args.no_config)?;
  if file_config.is_some() {
    debug!("Using configuration file");
  }

  let config = RunConfig::resolve(file_config, args.overrides())?;
  debug!("Resolved configuration: {:?}", config);

  verbose_log!(
    "Scanning {} director{} for {} glob(s) with pool size {}",
    config.directories.len(),
    if config.directories.len() == 1 { "y" } else { "ies" },
    config.globs.len(),
    config.pool
  );

  let start_time = Instant::now();
  let processor = Processor::with_working_dir(config, cwd);
  let report = processor.run().await?;

  debug!("Run finished in {}ms", start_time.elapsed().as_millis());
  info_log!("{}", report.summary());

  Ok(ExitCode::from(report.exit_code()))
}
