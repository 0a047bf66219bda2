//! Path-scoped query patches for imported dashboards.
//!
//! Community dashboards are authored for other environments: Kubernetes
//! field names in LogsQL, instance selectors pinned to the author's host.
//! Each fixup is a plain `(path_suffix, find, replace)` rule applied to the
//! query strings of exactly one dashboard file; a rule must never leak into
//! other files, even when they contain identical query text.
//!
//! New fixups are data, not code: extra rules can be loaded from a JSON file
//! (an array of rule objects) and are merged after the built-ins.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::NormalizeError;

/// Keys whose string values carry query language (PromQL or LogsQL).
const QUERY_KEYS: &[&str] = &["expr", "query", "definition"];

/// One find/replace rule, scoped to documents whose root-relative path ends
/// with `path_suffix` (matched on whole path components).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPatch {
  pub path_suffix: String,
  pub find: String,
  pub replace: String,
}

impl QueryPatch {
  fn applies_to(&self, rel_path: &Path) -> bool {
    rel_path.ends_with(Path::new(&self.path_suffix))
  }
}

/// Rules compiled in for the dashboards this stack imports.
pub fn builtin_patches() -> Vec<QueryPatch> {
  let rule = |path_suffix: &str, find: &str, replace: &str| QueryPatch {
    path_suffix: path_suffix.to_string(),
    find: find.to_string(),
    replace: replace.to_string(),
  };

  const DOCKER_ENGINE: &str = "docker/docker-engine-health-21040.json";
  const LOGS_EXPLORER: &str = "victorialogs/logs-explorer.json";

  vec![
    // Imported from a Raspberry Pi hub setup: panels select the author's
    // instance label. Local panels select the vmagent scrape job instead.
    rule(DOCKER_ENGINE, r#"{instance=~"rpi-hub"}"#, r#"{job="docker-engine"}"#),
    rule(DOCKER_ENGINE, "{instance=~'rpi-hub'}", r#"{job="docker-engine"}"#),
    // The logs explorer speaks Kubernetes field names; Vector ships plain
    // container fields here.
    rule(LOGS_EXPLORER, "kubernetes.container_name", "container_name"),
    rule(LOGS_EXPLORER, "kubernetes.pod_name", "container_name"),
    // The explorer's optional-$query clause is malformed LogsQL once the
    // variable is blank. Dropping it leaves the base query intact.
    rule(LOGS_EXPLORER, r#" AND ($query != "" or 1==1)"#, ""),
    rule(LOGS_EXPLORER, " AND ($query != '' or 1==1)", ""),
  ]
}

/// Load additional rules from a JSON file: an array of
/// `{"path_suffix": ..., "find": ..., "replace": ...}` objects.
pub fn load_patches(path: &Path) -> Result<Vec<QueryPatch>, NormalizeError> {
  let content = fs::read_to_string(path).map_err(|e| NormalizeError::Read {
    path: path.to_path_buf(),
    source: e,
  })?;
  serde_json::from_str(&content).map_err(|e| NormalizeError::ParsePatches {
    path: path.to_path_buf(),
    source: e,
  })
}

/// Apply every rule matching `rel_path` to the query strings of `doc`.
///
/// Returns the number of query fields that changed.
pub fn apply_patches(rel_path: &Path, doc: &mut Value, patches: &[QueryPatch]) -> usize {
  let active: Vec<&QueryPatch> = patches.iter().filter(|p| p.applies_to(rel_path)).collect();
  if active.is_empty() {
    return 0;
  }

  let mut count = 0;
  walk(doc, &active, &mut count);
  if count > 0 {
    debug!(path = %rel_path.display(), count, "patched query expressions");
  }
  count
}

fn walk(node: &mut Value, active: &[&QueryPatch], count: &mut usize) {
  match node {
    Value::Object(map) => {
      for (key, value) in map.iter_mut() {
        if QUERY_KEYS.contains(&key.as_str()) {
          if let Value::String(s) = value {
            let mut patched = s.clone();
            for p in active {
              patched = patched.replace(&p.find, &p.replace);
            }
            if patched != *s {
              *value = Value::String(patched);
              *count += 1;
              continue;
            }
          }
        }
        walk(value, active, count);
      }
    }
    Value::Array(items) => {
      for item in items {
        walk(item, active, count);
      }
    }
    _ => {}
  }
}
