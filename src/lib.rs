//! # autocopyright
//!
//! A tool that makes sure source files start with a copyright notice.
//!
//! `autocopyright` renders a license template once, prefixes every line with
//! a comment symbol, and inserts the result at the top of every matching file
//! that does not already carry it. Files that already start with something
//! close enough to the notice (an older year, a changed author) are left
//! alone, so running the tool repeatedly is safe.
//!
//! ## Features
//!
//! * Recursive glob matching inside any number of directories
//! * Respects `.gitignore` and user supplied exclude regexes
//! * Keeps a shebang line first
//! * Atomic file replacement that preserves permissions
//! * Concurrent processing with a bounded worker pool
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use autocopyright::config::RunConfig;
//! use autocopyright::processor::Processor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig::new(
//!         "#",
//!         vec![PathBuf::from("src")],
//!         vec!["*.py".to_string()],
//!         "LICENSE_NOTE.md.jinja2",
//!     );
//!
//!     let report = Processor::new(config)?.run().await?;
//!     if report.had_changes() {
//!         println!("Added notices: {}", report.summary());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`processor`] - Candidate enumeration, the per-file reconciler and the run report
//! * [`templates`] - License template rendering and notice formatting
//! * [`exclusion`] - Git ignore, regex, `.git` and license-file exclusions
//! * [`config`] - Config file loading and run settings
//! * [`logging`] - Logging utilities for verbose output
//!
//! [`processor`]: crate::processor
//! [`templates`]: crate::templates
//! [`exclusion`]: crate::exclusion
//! [`config`]: crate::config
//! [`logging`]: crate::logging

pub mod cli;
pub mod config;
pub mod exclusion;
pub mod file_filter;
pub mod git;
pub mod logging;
pub mod processor;
pub mod project;
pub mod similarity;
pub mod templates;
