//! # Logging Module
//!
//! This module provides logging utilities for the autocopyright tool:
//! - structured diagnostics through `tracing`, initialised by [`init_tracing`]
//! - verbose logging that can be enabled/disabled
//! - user-facing info lines with color support
//!
//! Diagnostics and verbose logs go to stderr; info lines go to stdout for
//! better pipeline integration.
//!
//! ## Example
//!
//! ```rust
//! use autocopyright::logging::{ColorMode, set_verbose};
//! use autocopyright::{info_log, verbose_log};
//!
//! // Enable verbose logging
//! set_verbose();
//!
//! // Set color mode to Auto (uses owo-colors' automatic TTY detection)
//! ColorMode::Auto.apply();
//!
//! // Log a verbose message (goes to stderr)
//! verbose_log!("Inspecting file: {}", "example.py");
//!
//! // Log an info message (goes to stdout)
//! info_log!("Updated {}", "example.py");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, level_directive, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// It uses the same format string syntax as the standard [`eprintln!`] macro.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
///
/// It uses the same format string syntax as the standard [`println!`] macro.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Prints an info line, yellow when the terminal supports it.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
