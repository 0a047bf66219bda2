//! Per-folder title deduplication.
//!
//! Grafana renders one folder per directory; two dashboards with the same
//! title in one folder are indistinguishable in the UI. The first document
//! (in relative-path order) keeps its title; later ones are retitled to
//! `"{title} ({uid})"`, suffixing the uid portion while the composite still
//! collides.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::debug;

use crate::document::Dashboard;

/// Resolve title collisions within each folder.
///
/// `docs` is expected in relative-path order (as [`crate::document::load_tree`]
/// returns it), which makes "first encountered" independent of filesystem
/// enumeration order. Returns the number of retitled documents.
pub fn dedup_titles(docs: &mut [Dashboard]) -> usize {
  let mut seen: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();
  let mut retitled = 0;

  for doc in docs.iter_mut() {
    let Some(title) = doc.title().map(str::to_owned) else {
      continue;
    };
    let folder = seen.entry(doc.folder().to_path_buf()).or_default();

    if folder.insert(title.clone()) {
      continue;
    }

    let uid = doc.uid().unwrap_or("untitled").to_string();
    let mut candidate = format!("{title} ({uid})");
    let mut i = 2u32;
    while folder.contains(&candidate) {
      candidate = format!("{title} ({uid}-{i})");
      i += 1;
    }

    debug!(path = %doc.rel_path.display(), title = %candidate, "retitled duplicate");
    folder.insert(candidate.clone());
    doc.set_title(&candidate);
    retitled += 1;
  }

  retitled
}
