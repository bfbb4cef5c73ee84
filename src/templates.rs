//! # Templates Module
//!
//! This module turns a license template into the [`Notice`] inserted into
//! files. It provides:
//! - [`TemplateManager`] for loading and rendering license templates
//! - [`RenderContext`] carrying the values templates can reference
//! - [`format_with_comment_symbol`] and [`render_notice`] producing the final,
//!   comment-prefixed notice text
//!
//! Templates use a small Jinja-compatible subset: `{{ expr }}` substitutions
//! where `expr` is a variable path such as `now.year`,
//! `project.tool.poetry.authors[0]` or `project["tool"]["poetry"]["name"]`.
//! `pyproject` is accepted as another name for `project`. Everything else is
//! copied literally. Undefined variables are errors.
//!
//! ## Example
//!
//! ```rust
//! use autocopyright::templates::{RenderContext, TemplateManager, render_notice};
//! use chrono::{Local, TimeZone};
//!
//! # fn main() -> anyhow::Result<()> {
//! let template = TemplateManager::from_source("Copyright {{ now.year }} Example\n\nAll rights reserved.\n");
//! let now = Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
//! let context = RenderContext::new(now, None);
//!
//! let notice = render_notice(&template, &context, "#")?;
//! assert_eq!(notice.as_str(), "# Copyright 2026 Example\n#\n# All rights reserved.");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, Timelike};
use tracing::debug;

use crate::project::ProjectMetadata;

/// Error type for template rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
  /// A `{{` without a matching `}}`.
  #[error("Unterminated '{{{{' at line {line}")]
  Unterminated { line: usize },

  /// The text between the braces is not a variable path.
  #[error("Invalid expression '{expr}' at line {line}: {message}")]
  InvalidExpression { expr: String, line: usize, message: String },

  /// The root variable is neither `now` nor `project`/`pyproject`.
  #[error("Undefined variable '{name}'")]
  UndefinedVariable { name: String },

  /// A key or index along the path does not exist.
  #[error("'{expr}' is undefined: no {accessor}")]
  Missing { expr: String, accessor: String },

  /// The path resolves to a table or array.
  #[error("'{expr}' is not a scalar value and cannot be rendered")]
  NotRenderable { expr: String },

  /// The template references `project` but no project file was loaded.
  #[error("'{expr}' references project metadata, but no project file was found")]
  NoProject { expr: String },

  /// The notice rendered to an empty string.
  #[error("Rendered notice is empty")]
  EmptyNotice,
}

/// Values available to templates.
///
/// Built once per run and passed explicitly to [`TemplateManager::render`].
#[derive(Debug, Clone)]
pub struct RenderContext {
  /// Timestamp exposed as `now`
  pub now: DateTime<Local>,
  /// Project metadata exposed as `project`
  pub project: Option<ProjectMetadata>,
}

impl RenderContext {
  pub const fn new(now: DateTime<Local>, project: Option<ProjectMetadata>) -> Self {
    Self { now, project }
  }

  /// Context stamped with the current local time.
  pub fn current(project: Option<ProjectMetadata>) -> Self {
    Self::new(Local::now(), project)
  }
}

/// Manager for loading and rendering a license template.
#[derive(Debug, Clone, Default)]
pub struct TemplateManager {
  /// The loaded license template content
  template: String,
  /// Where the template was loaded from, if it came from a file
  source: Option<PathBuf>,
}

impl TemplateManager {
  /// Creates an empty template manager.
  ///
  /// Call [`load_template`](Self::load_template) before rendering.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a template manager from template text.
  pub fn from_source(template: impl Into<String>) -> Self {
    Self {
      template: template.into(),
      source: None,
    }
  }

  /// Loads a license template from a file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file does not exist, cannot be read, or is not
  /// valid UTF-8.
  pub fn load_template(&mut self, path: &Path) -> Result<()> {
    debug!("Loading template from: {}", path.display());

    let template_content =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read license template file: {}", path.display()))?;

    self.template = template_content;
    self.source = Some(path.to_path_buf());

    Ok(())
  }

  pub fn source(&self) -> Option<&Path> {
    self.source.as_deref()
  }

  /// Renders the template against `context`.
  ///
  /// Line endings are normalised to `\n` and a single trailing newline of the
  /// template is dropped before substitution.
  pub fn render(&self, context: &RenderContext) -> Result<String, TemplateError> {
    let normalized = self.template.replace("\r\n", "\n").replace('\r', "\n");
    let source = normalized.strip_suffix('\n').unwrap_or(&normalized);

    let mut rendered = String::with_capacity(source.len());
    let mut rest = source;
    let mut line = 1;

    while let Some(start) = rest.find("{{") {
      let literal = &rest[..start];
      rendered.push_str(literal);
      line += literal.matches('\n').count();

      let after_open = &rest[start + 2..];
      let Some(end) = after_open.find("}}") else {
        return Err(TemplateError::Unterminated { line });
      };

      let raw_expr = &after_open[..end];
      let expr = parse_expression(raw_expr.trim(), line)?;
      rendered.push_str(&resolve(&expr, context)?);

      line += raw_expr.matches('\n').count();
      rest = &after_open[end + 2..];
    }
    rendered.push_str(rest);

    Ok(rendered)
  }
}

/// Prefixes every line of `text` with `"<symbol> "` and strips trailing
/// whitespace, so blank lines become the bare symbol.
pub fn format_with_comment_symbol(text: &str, symbol: &str) -> String {
  text
    .split('\n')
    .map(|line| format!("{symbol} {line}").trim_end().to_string())
    .collect::<Vec<_>>()
    .join("\n")
}

/// Renders the template and formats it as a comment block.
///
/// # Errors
///
/// Returns a [`TemplateError`] if rendering fails or the result is empty.
pub fn render_notice(template: &TemplateManager, context: &RenderContext, symbol: &str) -> Result<Notice, TemplateError> {
  let rendered = template.render(context)?;
  let notice = Notice::new(format_with_comment_symbol(&rendered, symbol))?;
  debug!("Rendered copyright note, {} characters", notice.char_len());
  Ok(notice)
}

/// The rendered, comment-prefixed notice shared by every file of a run.
///
/// Cloning is cheap; all clones point at the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  text: Arc<str>,
  char_len: usize,
}

impl Notice {
  /// Wraps notice text, rejecting the empty string.
  pub fn new(text: impl Into<String>) -> Result<Self, TemplateError> {
    let text: String = text.into();
    if text.is_empty() {
      return Err(TemplateError::EmptyNotice);
    }
    let char_len = text.chars().count();
    Ok(Self {
      text: Arc::from(text),
      char_len,
    })
  }

  pub fn as_str(&self) -> &str {
    &self.text
  }

  /// Length in characters, the unit the similarity check works in.
  pub const fn char_len(&self) -> usize {
    self.char_len
  }
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.text)
  }
}

impl AsRef<str> for Notice {
  fn as_ref(&self) -> &str {
    &self.text
  }
}

/// One step of a variable path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Accessor {
  Key(String),
  Index(usize),
}

impl fmt::Display for Accessor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Accessor::Key(key) => write!(f, "key '{key}'"),
      Accessor::Index(index) => write!(f, "index {index}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Expression {
  source: String,
  root: String,
  path: Vec<Accessor>,
}

fn parse_expression(source: &str, line: usize) -> Result<Expression, TemplateError> {
  let invalid = |message: &str| TemplateError::InvalidExpression {
    expr: source.to_string(),
    line,
    message: message.to_string(),
  };

  let mut chars = source.char_indices().peekable();
  let root = take_identifier(source, &mut chars).ok_or_else(|| invalid("expected a variable name"))?;

  let mut path = Vec::new();
  while let Some((_, c)) = chars.next() {
    match c {
      '.' => {
        let key = take_identifier(source, &mut chars).ok_or_else(|| invalid("expected a name after '.'"))?;
        path.push(Accessor::Key(key));
      }
      '[' => {
        let mut inner = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == ']' {
            closed = true;
            break;
          }
          inner.push(c);
        }
        if !closed {
          return Err(invalid("missing ']'"));
        }
        path.push(parse_subscript(inner.trim()).ok_or_else(|| invalid("subscript must be an integer or a quoted key"))?);
      }
      _ => return Err(invalid("only variable paths are supported")),
    }
  }

  Ok(Expression {
    source: source.to_string(),
    root,
    path,
  })
}

fn take_identifier(
  source: &str,
  chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Option<String> {
  let (start, first) = *chars.peek()?;
  if !(first.is_ascii_alphabetic() || first == '_') {
    return None;
  }
  let mut end = start;
  while let Some(&(idx, c)) = chars.peek() {
    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
      end = idx + c.len_utf8();
      chars.next();
    } else {
      break;
    }
  }
  Some(source[start..end].to_string())
}

fn parse_subscript(inner: &str) -> Option<Accessor> {
  if let Ok(index) = inner.parse::<usize>() {
    return Some(Accessor::Index(index));
  }
  for quote in ['"', '\''] {
    if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
      return Some(Accessor::Key(inner[1..inner.len() - 1].to_string()));
    }
  }
  None
}

fn resolve(expr: &Expression, context: &RenderContext) -> Result<String, TemplateError> {
  match expr.root.as_str() {
    "now" => resolve_now(expr, &context.now),
    "project" | "pyproject" => {
      let project = context.project.as_ref().ok_or_else(|| TemplateError::NoProject {
        expr: expr.source.clone(),
      })?;
      resolve_toml(expr, project.table())
    }
    other => Err(TemplateError::UndefinedVariable { name: other.to_string() }),
  }
}

fn resolve_now(expr: &Expression, now: &DateTime<Local>) -> Result<String, TemplateError> {
  match expr.path.as_slice() {
    [] => Ok(display_timestamp(now)),
    [Accessor::Key(field)] => match field.as_str() {
      "year" => Ok(now.year().to_string()),
      "month" => Ok(now.month().to_string()),
      "day" => Ok(now.day().to_string()),
      "hour" => Ok(now.hour().to_string()),
      "minute" => Ok(now.minute().to_string()),
      "second" => Ok(now.second().to_string()),
      "microsecond" => Ok((now.nanosecond() / 1_000).to_string()),
      "date" => Ok(now.format("%Y-%m-%d").to_string()),
      "iso" => Ok(now.to_rfc3339()),
      _ => Err(TemplateError::Missing {
        expr: expr.source.clone(),
        accessor: expr.path[0].to_string(),
      }),
    },
    [first, ..] => Err(TemplateError::Missing {
      expr: expr.source.clone(),
      accessor: first.to_string(),
    }),
  }
}

/// `YYYY-MM-DD HH:MM:SS[.ffffff]`, microseconds only when non-zero.
fn display_timestamp(now: &DateTime<Local>) -> String {
  let micros = now.nanosecond() / 1_000;
  if micros == 0 {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
  } else {
    format!("{}.{:06}", now.format("%Y-%m-%d %H:%M:%S"), micros)
  }
}

fn resolve_toml(expr: &Expression, table: &toml::Table) -> Result<String, TemplateError> {
  let missing = |accessor: &Accessor| TemplateError::Missing {
    expr: expr.source.clone(),
    accessor: accessor.to_string(),
  };

  let Some((first, rest)) = expr.path.split_first() else {
    return Err(TemplateError::NotRenderable {
      expr: expr.source.clone(),
    });
  };

  let mut current = match first {
    Accessor::Key(key) => table.get(key).ok_or_else(|| missing(first))?,
    Accessor::Index(_) => return Err(missing(first)),
  };

  for accessor in rest {
    current = match (accessor, current) {
      (Accessor::Key(key), toml::Value::Table(table)) => table.get(key),
      (Accessor::Index(index), toml::Value::Array(items)) => items.get(*index),
      _ => None,
    }
    .ok_or_else(|| missing(accessor))?;
  }

  match current {
    toml::Value::String(s) => Ok(s.clone()),
    toml::Value::Integer(i) => Ok(i.to_string()),
    toml::Value::Float(f) => Ok(f.to_string()),
    toml::Value::Boolean(b) => Ok(b.to_string()),
    toml::Value::Datetime(dt) => Ok(dt.to_string()),
    toml::Value::Array(_) | toml::Value::Table(_) => Err(TemplateError::NotRenderable {
      expr: expr.source.clone(),
    }),
  }
}
