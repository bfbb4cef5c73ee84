//! # Configuration Module
//!
//! This module defines [`RunConfig`], the typed settings of one run, and the
//! optional `.autocopyright.toml` file that can provide them.
//!
//! Settings are merged in this order (later wins):
//! 1. built-in defaults (pool size 4, untracked directories skipped)
//! 2. the config file: `--config`, else `AUTOCOPYRIGHT_CONFIG`, else
//!    `.autocopyright.toml` in the working directory
//! 3. command-line flags; list flags replace the corresponding config list
//!
//! ```toml
//! comment-symbol = "#"
//! directories = ["src", "tests"]
//! globs = ["*.py"]
//! exclude = ["{directory}/generated/"]
//! license = "license.md.jinja2"
//! pool = 8
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".autocopyright.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "AUTOCOPYRIGHT_CONFIG";

/// Worker pool size used when neither the CLI nor the config sets one.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Contents of a `.autocopyright.toml` file.
///
/// Relative paths are resolved against the directory holding the file.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigFile {
  /// Symbol used to start a comment line (e.g. "#" or "//")
  pub comment_symbol: Option<String>,

  /// Directories to search
  #[serde(default)]
  pub directories: Vec<PathBuf>,

  /// File globs used to search the directories
  #[serde(default)]
  pub globs: Vec<String>,

  /// Exclude regexes, may use `{cwd}` and `{directory}`
  #[serde(default)]
  pub exclude: Vec<String>,

  /// License template path
  pub license: Option<PathBuf>,

  /// Worker pool size
  pub pool: Option<usize>,

  /// Project metadata file exposed to templates as `project`
  pub project_file: Option<PathBuf>,

  /// Process directories that are not inside a git repository
  pub allow_untracked: Option<bool>,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML or unknown keys.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A required setting was given neither on the command line nor in the
  /// config file.
  #[error("Missing required setting '{setting}' (use {flag} or set it in .autocopyright.toml)")]
  MissingSetting { setting: &'static str, flag: &'static str },
}

impl ConfigFile {
  /// Load configuration from a file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.rebase(base))
  }

  /// Resolves every relative path in the config against `base`.
  fn rebase(self, base: &Path) -> Self {
    let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
    Self {
      directories: self.directories.into_iter().map(join).collect(),
      license: self.license.map(join),
      project_file: self.project_file.map(join),
      ..self
    }
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `AUTOCOPYRIGHT_CONFIG` environment variable
/// 3. `.autocopyright.toml` in `cwd`, if it exists
pub fn discover_config_path(explicit_path: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR)
    && !env_path.is_empty()
  {
    return Some(PathBuf::from(env_path));
  }

  let default_path = cwd.join(DEFAULT_CONFIG_FILENAME);
  default_path.is_file().then_some(default_path)
}

/// Load the configuration file, if any.
///
/// An explicitly requested file (flag or environment variable) must exist;
/// the default file is optional.
pub fn load_config(explicit_path: Option<&Path>, cwd: &Path, no_config: bool) -> Result<Option<ConfigFile>> {
  if no_config {
    debug!("Config file loading disabled");
    return Ok(None);
  }

  match discover_config_path(explicit_path, cwd) {
    Some(path) => Ok(Some(ConfigFile::load(&path)?)),
    None => Ok(None),
  }
}

/// Settings given on the command line, before merging with the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
  pub comment_symbol: Option<String>,
  pub directories: Vec<PathBuf>,
  pub globs: Vec<String>,
  pub exclude: Vec<String>,
  pub license: Option<PathBuf>,
  pub pool: Option<usize>,
  pub project_file: Option<PathBuf>,
  pub allow_untracked: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
  /// Symbol prefixed to every notice line
  pub comment_symbol: String,
  /// Directories to search, in order
  pub directories: Vec<PathBuf>,
  /// Globs matched recursively inside each directory
  pub globs: Vec<String>,
  /// Raw exclude patterns
  pub exclude: Vec<String>,
  /// License template path
  pub license: PathBuf,
  /// Worker pool size; 0 and 1 mean sequential processing
  pub pool: usize,
  /// Explicit project metadata file; `None` means auto-discovery
  pub project_file: Option<PathBuf>,
  /// Process directories that are not inside a git repository
  pub allow_untracked: bool,
}

impl RunConfig {
  /// Creates a config with the required settings and default for the rest.
  pub fn new(
    comment_symbol: impl Into<String>,
    directories: Vec<PathBuf>,
    globs: Vec<String>,
    license: impl Into<PathBuf>,
  ) -> Self {
    Self {
      comment_symbol: comment_symbol.into(),
      directories,
      globs,
      exclude: Vec::new(),
      license: license.into(),
      pool: DEFAULT_POOL_SIZE,
      project_file: None,
      allow_untracked: false,
    }
  }

  /// Merges CLI values over the config file and validates the result.
  pub fn resolve(file: Option<ConfigFile>, cli: CliOverrides) -> Result<Self, ConfigError> {
    let file = file.unwrap_or_default();

    let comment_symbol = cli
      .comment_symbol
      .or(file.comment_symbol)
      .ok_or(ConfigError::MissingSetting {
        setting: "comment-symbol",
        flag: "--comment-symbol",
      })?;
    let license = cli.license.or(file.license).ok_or(ConfigError::MissingSetting {
      setting: "license",
      flag: "--license",
    })?;

    let directories = prefer_cli(cli.directories, file.directories);
    if directories.is_empty() {
      return Err(ConfigError::MissingSetting {
        setting: "directories",
        flag: "--directory",
      });
    }

    let globs = prefer_cli(cli.globs, file.globs);
    if globs.is_empty() {
      return Err(ConfigError::MissingSetting {
        setting: "globs",
        flag: "--glob",
      });
    }

    Ok(Self {
      comment_symbol,
      directories,
      globs,
      exclude: prefer_cli(cli.exclude, file.exclude),
      license,
      pool: cli.pool.or(file.pool).unwrap_or(DEFAULT_POOL_SIZE),
      project_file: cli.project_file.or(file.project_file),
      allow_untracked: cli.allow_untracked || file.allow_untracked.unwrap_or(false),
    })
  }
}

/// List flags replace config lists instead of extending them.
fn prefer_cli<T>(cli: Vec<T>, file: Vec<T>) -> Vec<T> {
  if cli.is_empty() { file } else { cli }
}
