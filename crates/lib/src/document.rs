//! Dashboard documents on disk.
//!
//! A dashboard is one JSON object per file, held fully in memory during a
//! run and written back in place: UTF-8, 2-space indentation, key order
//! preserved, trailing newline.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::consts::{DEPRECATED_PANEL_TYPE, MANIFEST_FILENAME};
use crate::error::NormalizeError;

/// One dashboard document.
#[derive(Debug, Clone)]
pub struct Dashboard {
  /// Absolute path of the file.
  pub path: PathBuf,
  /// Path relative to the dashboards root.
  pub rel_path: PathBuf,
  /// The parsed document. Always a JSON object.
  pub data: Value,
}

impl Dashboard {
  /// The folder (directory component) of this dashboard within the root.
  pub fn folder(&self) -> &Path {
    self.rel_path.parent().unwrap_or(Path::new(""))
  }

  pub fn uid(&self) -> Option<&str> {
    self.data.get("uid").and_then(Value::as_str)
  }

  pub fn set_uid(&mut self, uid: &str) {
    if let Some(map) = self.data.as_object_mut() {
      map.insert("uid".to_string(), Value::String(uid.to_string()));
    }
  }

  pub fn title(&self) -> Option<&str> {
    self.data.get("title").and_then(Value::as_str)
  }

  pub fn set_title(&mut self, title: &str) {
    if let Some(map) = self.data.as_object_mut() {
      map.insert("title".to_string(), Value::String(title.to_string()));
    }
  }

  /// Null the numeric database `id`. Provisioned dashboards must not pin
  /// one, or imports collide across Grafana instances.
  pub fn clear_id(&mut self) {
    if let Some(map) = self.data.as_object_mut() {
      map.insert("id".to_string(), Value::Null);
    }
  }

  /// Remove import-time `__inputs` metadata. Returns true if it was present.
  pub fn strip_inputs(&mut self) -> bool {
    self
      .data
      .as_object_mut()
      .is_some_and(|map| map.remove("__inputs").is_some())
  }

  /// True if any nested panel uses the deprecated Angular engine.
  pub fn has_deprecated_panels(&self) -> bool {
    contains_deprecated(&self.data)
  }

  /// Render the document as written to disk.
  pub fn render(&self) -> Result<String, NormalizeError> {
    let mut text = serde_json::to_string_pretty(&self.data).map_err(|e| NormalizeError::Serialize {
      path: self.path.clone(),
      source: e,
    })?;
    text.push('\n');
    Ok(text)
  }
}

fn contains_deprecated(node: &Value) -> bool {
  match node {
    Value::Object(map) => {
      map.get("type").and_then(Value::as_str) == Some(DEPRECATED_PANEL_TYPE)
        || map.values().any(contains_deprecated)
    }
    Value::Array(items) => items.iter().any(contains_deprecated),
    _ => false,
  }
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry
    .file_name()
    .to_str()
    .is_some_and(|name| name.starts_with('.'))
}

/// Enumerate and parse all dashboard documents under `root`.
///
/// Picks up every `*.json` file except the manifest and dotfiles, sorted by
/// relative path. Unparseable JSON aborts the run: a partial rewrite of the
/// sibling set would leave uid and link state inconsistent. Valid JSON that
/// is not an object is skipped and left untouched on disk.
pub fn load_tree(root: &Path) -> Result<Vec<Dashboard>, NormalizeError> {
  let mut docs = Vec::new();

  for entry in WalkDir::new(root)
    .into_iter()
    .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
  {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    let path = entry.path();
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
      continue;
    }
    let rel_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    if rel_path == Path::new(MANIFEST_FILENAME) {
      continue;
    }

    let content = fs::read_to_string(path).map_err(|e| NormalizeError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let data: Value = serde_json::from_str(&content).map_err(|e| NormalizeError::ParseDashboard {
      path: path.to_path_buf(),
      source: e,
    })?;

    if !data.is_object() {
      debug!(path = %path.display(), "skipping non-object JSON file");
      continue;
    }

    docs.push(Dashboard {
      path: path.to_path_buf(),
      rel_path,
      data,
    });
  }

  docs.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
  Ok(docs)
}

/// Write `text` to `path` atomically (temp file in the same directory, then
/// rename).
pub fn write_atomic(path: &Path, text: &str) -> Result<(), NormalizeError> {
  let temp_path = path.with_extension("json.tmp");
  fs::write(&temp_path, text).map_err(|e| NormalizeError::Write {
    path: temp_path.clone(),
    source: e,
  })?;
  fs::rename(&temp_path, path).map_err(|e| NormalizeError::Write {
    path: path.to_path_buf(),
    source: e,
  })
}
