//! Datasource reference canonicalization.
//!
//! Dashboards imported from grafana.com carry datasource references in many
//! shapes: bare name strings, `${VAR}` placeholders left over from the
//! import dialog, objects with or without a `type`, stale `name` keys.
//! Provisioning wants exactly one object form per backend, so every value
//! under a key literally named `datasource` is normalized in place.
//!
//! Only positive rules exist: references that match neither backend (for
//! example a third-party plugin datasource) pass through untouched, and the
//! built-in annotations source is never rewritten.

use serde_json::{Map, Value, json};

use crate::consts::{
  INTERNAL_DS_TYPE, INTERNAL_DS_UID, LOGS_DS_ALIASES, LOGS_DS_NAME, LOGS_DS_TYPE, LOGS_DS_UID,
  METRICS_DS_ALIASES, METRICS_DS_NAME, METRICS_DS_TYPE, METRICS_DS_UID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
  Metrics,
  Logs,
}

fn canonical(backend: Backend) -> Value {
  match backend {
    Backend::Metrics => json!({ "type": METRICS_DS_TYPE, "uid": METRICS_DS_UID }),
    Backend::Logs => json!({ "type": LOGS_DS_TYPE, "uid": LOGS_DS_UID }),
  }
}

/// Normalize every datasource reference reachable from `node`.
///
/// Depth-first over objects and arrays; datasource blocks appear at panel,
/// target, annotation, and templating-variable level, so every node is
/// visited. Returns the number of references actually rewritten.
pub fn rewrite_datasources(node: &mut Value) -> usize {
  let mut count = 0;
  walk(node, &mut count);
  count
}

fn walk(node: &mut Value, count: &mut usize) {
  match node {
    Value::Object(map) => {
      if let Some(ds) = map.get_mut("datasource") {
        if let Some(replacement) = normalize_ref(ds) {
          if *ds != replacement {
            *ds = replacement;
            *count += 1;
          }
        }
      }
      for value in map.values_mut() {
        walk(value, count);
      }
    }
    Value::Array(items) => {
      for item in items {
        walk(item, count);
      }
    }
    _ => {}
  }
}

/// The canonical replacement for a reference, or `None` to leave it alone.
fn normalize_ref(ds: &Value) -> Option<Value> {
  match ds {
    Value::Object(map) => classify_object(map).map(canonical),
    Value::String(s) => classify_string(s).map(canonical),
    _ => None,
  }
}

fn classify_object(map: &Map<String, Value>) -> Option<Backend> {
  let ty = map.get("type").and_then(Value::as_str);
  let uid = map.get("uid").and_then(Value::as_str);
  let name = map.get("name").and_then(Value::as_str);

  if ty == Some(INTERNAL_DS_TYPE) || uid == Some(INTERNAL_DS_UID) {
    return None;
  }
  if ty == Some(METRICS_DS_TYPE)
    || uid.is_some_and(|u| METRICS_DS_ALIASES.contains(&u))
    || name == Some(METRICS_DS_NAME)
  {
    return Some(Backend::Metrics);
  }
  if ty == Some(LOGS_DS_TYPE)
    || uid.is_some_and(|u| LOGS_DS_ALIASES.contains(&u))
    || name == Some(LOGS_DS_NAME)
  {
    return Some(Backend::Logs);
  }
  None
}

fn classify_string(s: &str) -> Option<Backend> {
  if METRICS_DS_ALIASES.contains(&s) {
    Some(Backend::Metrics)
  } else if LOGS_DS_ALIASES.contains(&s) {
    Some(Backend::Logs)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metrics() -> Value {
    json!({ "type": "prometheus", "uid": "DS_PROMETHEUS" })
  }

  fn logs() -> Value {
    json!({ "type": "victoriametrics-logs-datasource", "uid": "victorialogs" })
  }

  #[test]
  fn prometheus_object_any_uid_is_canonicalized() {
    let mut doc = json!({ "datasource": { "type": "prometheus", "uid": "P1809F7CD0C75ACF3" } });
    assert_eq!(rewrite_datasources(&mut doc), 1);
    assert_eq!(doc["datasource"], metrics());
  }

  #[test]
  fn broken_placeholder_string_is_canonicalized() {
    let mut doc = json!({ "datasource": "${DS_PROMETHEUS}" });
    rewrite_datasources(&mut doc);
    assert_eq!(doc["datasource"], metrics());
  }

  #[test]
  fn legacy_name_string_is_canonicalized() {
    let mut doc = json!({ "datasource": "VictoriaMetrics" });
    rewrite_datasources(&mut doc);
    assert_eq!(doc["datasource"], metrics());
  }

  #[test]
  fn object_name_key_is_dropped() {
    let mut doc = json!({
      "datasource": { "type": "prometheus", "uid": "DS_PROMETHEUS", "name": "VictoriaMetrics" }
    });
    assert_eq!(rewrite_datasources(&mut doc), 1);
    assert_eq!(doc["datasource"], metrics());
  }

  #[test]
  fn logs_aliases_map_to_logs_backend() {
    let mut doc = json!({
      "a": { "datasource": "victorialogs" },
      "b": { "datasource": { "uid": "${DS_VICTORIALOGS}" } },
      "c": { "datasource": { "type": "victoriametrics-logs-datasource", "uid": "stale" } },
    });
    assert_eq!(rewrite_datasources(&mut doc), 3);
    assert_eq!(doc["a"]["datasource"], logs());
    assert_eq!(doc["b"]["datasource"], logs());
    assert_eq!(doc["c"]["datasource"], logs());
  }

  #[test]
  fn internal_annotations_source_is_never_touched() {
    let original = json!({ "type": "grafana", "uid": "-- Grafana --" });
    let mut doc = json!({ "annotations": { "list": [ { "datasource": original.clone() } ] } });
    assert_eq!(rewrite_datasources(&mut doc), 0);
    assert_eq!(doc["annotations"]["list"][0]["datasource"], original);
  }

  #[test]
  fn unknown_plugin_datasource_passes_through() {
    let original = json!({ "type": "postgres", "uid": "my-pg" });
    let mut doc = json!({ "datasource": original.clone() });
    assert_eq!(rewrite_datasources(&mut doc), 0);
    assert_eq!(doc["datasource"], original);

    let mut doc = json!({ "datasource": "SomeOtherSource" });
    assert_eq!(rewrite_datasources(&mut doc), 0);
    assert_eq!(doc["datasource"], "SomeOtherSource");
  }

  #[test]
  fn nested_panels_targets_and_templating_are_visited() {
    let mut doc = json!({
      "panels": [
        {
          "datasource": { "type": "prometheus", "uid": "old" },
          "targets": [ { "datasource": "prometheus", "expr": "up" } ],
        }
      ],
      "templating": {
        "list": [ { "type": "query", "datasource": { "uid": "victoriametrics" } } ]
      }
    });
    assert_eq!(rewrite_datasources(&mut doc), 3);
    assert_eq!(doc["panels"][0]["datasource"], metrics());
    assert_eq!(doc["panels"][0]["targets"][0]["datasource"], metrics());
    assert_eq!(doc["templating"]["list"][0]["datasource"], metrics());
  }

  #[test]
  fn already_canonical_reference_is_not_counted() {
    let mut doc = json!({ "datasource": metrics() });
    assert_eq!(rewrite_datasources(&mut doc), 0);
  }
}
