#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use tempfile::TempDir;

/// MIT license template referencing the current year and the first author.
pub const MIT_TEMPLATE: &str = "Copyright {{ now.year }} {{ project.tool.poetry.authors[0] }}

Permission is hereby granted, free of charge, to any person obtaining a copy of this
software and associated documentation files (the “Software”), to deal in the Software
without restriction, including without limitation the rights to use, copy, modify,
merge, publish, distribute, sublicense, and/or sell copies of the Software, and to
permit persons to whom the Software is furnished to do so, subject to the following
conditions:

The above copyright notice and this permission notice shall be included in all copies
or substantial portions of the Software.

THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED,
INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT
HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF
CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
";

pub const PYPROJECT: &str = "[tool.poetry]
name=\"example\"
authors=[\"EXAMPLE_AUTHOR <examle.email@email.com>\"]
";

pub const TEMPLATE_NAME: &str = "license.md.jinja2";

/// The `#`-prefixed notice [`MIT_TEMPLATE`] renders to this year.
pub fn expected_notice() -> String {
  let year = Local::now().year();
  let body = MIT_TEMPLATE
    .trim_end_matches('\n')
    .replace("{{ now.year }}", &year.to_string())
    .replace(
      "{{ project.tool.poetry.authors[0] }}",
      "EXAMPLE_AUTHOR <examle.email@email.com>",
    );

  body
    .split('\n')
    .map(|line| format!("# {line}").trim_end().to_string())
    .collect::<Vec<_>>()
    .join("\n")
}

/// Content of an initially empty file after the notice was added.
pub fn expected_empty_file_content() -> String {
  format!("{}\n\n\n", expected_notice())
}

/// Checks if git is available on the system.
pub fn is_git_available() -> bool {
  Command::new("git").arg("--version").status().is_ok()
}

/// Runs a git command in the given directory, returning an error with stderr on
/// failure.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
  let output = Command::new("git")
    .args(args)
    .current_dir(dir)
    .output()
    .with_context(|| format!("Failed to execute git {:?}", args))?;

  if !output.status.success() {
    anyhow::bail!("git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  }
  Ok(())
}

/// Initializes a git repository in the given directory with deterministic
/// settings.
pub fn init_git_repo(dir: &Path) -> Result<()> {
  run_git(dir, &["init"])?;
  run_git(dir, &["config", "user.name", "Test User"])?;
  run_git(dir, &["config", "user.email", "test@example.com"])?;
  // Disable commit signing for test isolation
  run_git(dir, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// A temporary working directory laid out like a small Python project:
///
/// ```text
/// license.md.jinja2
/// pyproject.toml
/// test_dir/
///     __init__.py
///     log.py
///     logging/
///         __init__.py
///         log.py
/// ```
///
/// All four Python files start out empty.
pub struct Fixture {
  pub temp_dir: TempDir,
  pub root: PathBuf,
}

impl Fixture {
  /// Creates the fixture without version control.
  pub fn untracked() -> Result<Self> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path().canonicalize()?;

    std::fs::write(root.join(TEMPLATE_NAME), MIT_TEMPLATE)?;
    std::fs::write(root.join("pyproject.toml"), PYPROJECT)?;
    std::fs::create_dir_all(root.join("test_dir/logging"))?;
    for file in Self::python_files() {
      std::fs::write(root.join(file), "")?;
    }

    Ok(Self { temp_dir, root })
  }

  /// Creates the fixture inside a fresh git repository.
  pub fn with_git() -> Result<Self> {
    let fixture = Self::untracked()?;
    init_git_repo(&fixture.root)?;
    Ok(fixture)
  }

  pub const fn python_files() -> [&'static str; 4] {
    [
      "test_dir/__init__.py",
      "test_dir/log.py",
      "test_dir/logging/__init__.py",
      "test_dir/logging/log.py",
    ]
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root.join(relative)
  }

  pub fn read(&self, relative: &str) -> Result<String> {
    std::fs::read_to_string(self.path(relative)).with_context(|| format!("Failed to read {relative}"))
  }

  pub fn write(&self, relative: &str, content: &str) -> Result<()> {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {relative}"))
  }

  /// Every file and directory below `relative`, relative to the fixture root.
  pub fn tree(&self, relative: &str) -> BTreeSet<PathBuf> {
    walkdir::WalkDir::new(self.path(relative))
      .min_depth(1)
      .into_iter()
      .filter_map(Result::ok)
      .filter_map(|entry| entry.path().strip_prefix(&self.root).ok().map(Path::to_path_buf))
      .collect()
  }

  /// The paths that exist in `test_dir` right after creation.
  pub fn initial_tree() -> BTreeSet<PathBuf> {
    Self::python_files()
      .iter()
      .map(PathBuf::from)
      .chain(std::iter::once(PathBuf::from("test_dir/logging")))
      .collect()
  }
}
