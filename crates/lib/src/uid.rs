//! UID derivation and uniqueness tracking.
//!
//! Grafana identifies a dashboard by its `uid`, and provisioning breaks when
//! two dashboards share one. Final uids are resolved with this precedence:
//!
//! 1. A manifest override for the file (sanitized if needed).
//! 2. The document's existing uid, depending on [`UidStrategy`].
//! 3. A slug derived from the file's root-relative path.
//!
//! Collisions within a run are resolved by numeric suffixing (`-2`, `-3`, …).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::consts::{UID_FALLBACK, UID_MAX_LEN};

/// How to treat a document's existing uid when no manifest override exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UidStrategy {
  /// Keep an existing valid uid unchanged. Stable across reruns; renamed
  /// files keep the uid Grafana already knows.
  #[default]
  Preserve,
  /// Always recompute the uid from the relative path, ignoring whatever the
  /// document carries. Deterministic from the tree layout alone.
  Recompute,
}

/// True if `s` is acceptable as a Grafana uid as-is.
pub fn is_valid_uid(s: &str) -> bool {
  !s.is_empty()
    && s.len() <= UID_MAX_LEN
    && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reduce an arbitrary string to a short, filesystem- and Grafana-safe slug.
///
/// Lowercases, maps runs of characters outside `[a-z0-9_-]` to single
/// hyphens, collapses repeats, trims edge hyphens, and truncates to
/// [`UID_MAX_LEN`]. An empty result falls back to `"dashboard"`.
pub fn slugify_uid(s: &str) -> String {
  let mut slug = String::with_capacity(s.len());
  for c in s.to_lowercase().chars() {
    if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
      slug.push(c);
    } else if !slug.ends_with('-') {
      slug.push('-');
    }
  }
  let slug: String = slug.trim_matches('-').chars().take(UID_MAX_LEN).collect();

  if slug.is_empty() { UID_FALLBACK.to_string() } else { slug }
}

/// Slug derived from a root-relative file path, with the `.json` suffix
/// stripped and path separators folded into the slug.
pub fn path_slug(rel_path: &Path) -> String {
  let stem = rel_path.with_extension("");
  let joined = stem
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("-");
  slugify_uid(&joined)
}

/// Accumulator for uid assignment over one run.
///
/// Owns the set of uids already handed out and the old→new rename map that
/// the cross-reference fixer consumes afterwards. Owned by the driver for
/// the duration of a run; there is no module-level state.
#[derive(Debug, Default)]
pub struct UidRegistry {
  used: HashSet<String>,
  renames: BTreeMap<String, String>,
}

impl UidRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Resolve the final uid for one document and reserve it.
  ///
  /// `existing` is the document's current uid (if any), `override_uid` the
  /// manifest entry (if any). Cannot fail: the worst case falls back to the
  /// default slug plus a numeric suffix.
  pub fn assign(
    &mut self,
    rel_path: &Path,
    existing: Option<&str>,
    override_uid: Option<&str>,
    strategy: UidStrategy,
  ) -> String {
    let candidate = match override_uid {
      Some(o) if is_valid_uid(o) => o.to_string(),
      Some(o) => slugify_uid(o),
      None => match strategy {
        UidStrategy::Recompute => path_slug(rel_path),
        UidStrategy::Preserve => match existing {
          Some(e) if is_valid_uid(e) => e.to_string(),
          Some(e) if !e.trim().is_empty() => slugify_uid(e),
          _ => path_slug(rel_path),
        },
      },
    };

    let uid = self.reserve(candidate);

    if let Some(old) = existing {
      if !old.is_empty() && old != uid {
        debug!(path = %rel_path.display(), old, new = %uid, "uid changed");
        self.renames.insert(old.to_string(), uid.clone());
      }
    }

    uid
  }

  /// Uids that changed during this run, old → new.
  pub fn renames(&self) -> &BTreeMap<String, String> {
    &self.renames
  }

  /// Reserve `candidate`, suffixing `-2`, `-3`, … until unique. The base is
  /// shortened so the suffixed uid still fits [`UID_MAX_LEN`].
  fn reserve(&mut self, candidate: String) -> String {
    let mut uid = candidate.clone();
    let mut i = 2u32;
    while self.used.contains(&uid) {
      let suffix = format!("-{i}");
      let keep = candidate.len().min(UID_MAX_LEN - suffix.len());
      uid = format!("{}{}", &candidate[..keep], suffix);
      i += 1;
    }
    self.used.insert(uid.clone());
    uid
  }
}
