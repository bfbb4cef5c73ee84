//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing.

mod run;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
pub use run::{RunArgs, run};

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

const LONG_VERSION: &str = concat!(
  env!("CARGO_PKG_VERSION"),
  " (",
  env!("AUTOCOPYRIGHT_GIT_HASH"),
  " ",
  env!("AUTOCOPYRIGHT_GIT_DATE"),
  ")"
);

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  name = "autocopyright",
  author,
  version,
  long_version = LONG_VERSION,
  about = "Add copyright notices to all files selected by the given globs in the given directories.",
  styles = CUSTOM_STYLES,
  after_help = "Exit status is 1 if any file was modified, 0 if nothing changed and 2 on error.

Examples:
  # Add an MIT notice to every Python file in src/ and tests/
  autocopyright -s \"#\" -d src -d tests -g \"*.py\" -l LICENSE_NOTE.md.jinja2

  # Skip generated code, relative to each scanned directory
  autocopyright -s \"//\" -d src -g \"*.rs\" -e \"{directory}/generated/\" -l notice.jinja2

  # Use settings from .autocopyright.toml with extra logging
  autocopyright -vv
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(flatten)]
  pub run_args: RunArgs,
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_repeated_flags() {
    let cli = Cli::try_parse_from([
      "autocopyright",
      "-s",
      "#",
      "-d",
      "src",
      "-d",
      "tests",
      "-g",
      "*.py",
      "-e",
      "{directory}/logging/",
      "-l",
      "LICENSE.jinja2",
      "-p",
      "8",
      "-vv",
    ])
    .unwrap();

    let args = cli.run_args;
    assert_eq!(args.comment_symbol.as_deref(), Some("#"));
    assert_eq!(args.directory.len(), 2);
    assert_eq!(args.glob, vec!["*.py".to_string()]);
    assert_eq!(args.exclude, vec!["{directory}/logging/".to_string()]);
    assert_eq!(args.pool, Some(8));
    assert_eq!(args.verbose, 2);
  }

  #[test]
  fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["autocopyright", "-q", "-v"]).is_err());
  }
}
