//! The normalization pipeline driver.
//!
//! Two passes over the dashboard tree. The first settles every uid, because
//! nothing downstream (link repair, title dedup) is safe while uids are
//! still moving. The second rewrites each document: provisioning cleanup,
//! datasource canonicalization, query patches, link repair. Title dedup
//! runs once over the whole set, then only files whose rendered bytes
//! differ from disk are written back.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::consts::{MANIFEST_FILENAME, ROOT_CANDIDATES};
use crate::datasource;
use crate::document::{self, Dashboard};
use crate::error::NormalizeError;
use crate::links;
use crate::manifest::Manifest;
use crate::patch::{self, QueryPatch};
use crate::titles;
use crate::uid::{UidRegistry, UidStrategy};

/// Options controlling a normalization run.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
  /// Dashboards root. When `None`, [`ROOT_CANDIDATES`] are tried in order.
  pub root: Option<PathBuf>,
  /// How to derive uids for files without a manifest override.
  pub strategy: UidStrategy,
  /// Keep import-time `__inputs` metadata instead of stripping it.
  pub keep_inputs: bool,
  /// Extra patch rules file, merged after the built-ins.
  pub patches_file: Option<PathBuf>,
  /// Compute everything, write nothing.
  pub dry_run: bool,
}

/// Summary of one run.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
  /// Documents processed.
  pub normalized: usize,
  /// Datasource references rewritten.
  pub datasources_rewritten: usize,
  /// Query fields patched.
  pub queries_patched: usize,
  /// Quoted uid link tokens repaired.
  pub links_fixed: usize,
  /// Files whose rendered bytes differ from disk, in relative-path order.
  /// Written back unless the run was a dry run.
  pub changed: Vec<PathBuf>,
  /// Dashboards containing deprecated Angular panels.
  pub deprecated: Vec<PathBuf>,
}

/// Locate the dashboards root: the explicit path if given, otherwise the
/// first existing candidate.
pub fn locate_root(explicit: Option<&Path>) -> Result<PathBuf, NormalizeError> {
  if let Some(root) = explicit {
    if root.is_dir() {
      return Ok(root.to_path_buf());
    }
    return Err(NormalizeError::RootNotFound {
      tried: root.display().to_string(),
    });
  }

  for candidate in ROOT_CANDIDATES {
    let path = Path::new(candidate);
    if path.is_dir() {
      return Ok(path.to_path_buf());
    }
  }
  Err(NormalizeError::RootNotFound {
    tried: ROOT_CANDIDATES.join(", "),
  })
}

/// Run the full pipeline.
pub fn run(options: &NormalizeOptions) -> Result<NormalizeReport, NormalizeError> {
  let root = locate_root(options.root.as_deref())?;
  let manifest = Manifest::load(&root.join(MANIFEST_FILENAME))?;
  let overrides = manifest.uid_overrides();

  let mut patches = patch::builtin_patches();
  if let Some(file) = &options.patches_file {
    patches.extend(patch::load_patches(file)?);
  }

  let mut docs = document::load_tree(&root)?;
  info!(root = %root.display(), count = docs.len(), "loaded dashboard tree");

  let mut registry = UidRegistry::new();
  for doc in &mut docs {
    let override_uid = overrides.get(&doc.rel_path).map(String::as_str);
    let existing = doc.uid().map(str::to_owned);
    let uid = registry.assign(&doc.rel_path, existing.as_deref(), override_uid, options.strategy);
    doc.set_uid(&uid);
  }

  let mut report = NormalizeReport::default();

  for doc in &mut docs {
    doc.clear_id();
    if !options.keep_inputs {
      doc.strip_inputs();
    }
    report.datasources_rewritten += datasource::rewrite_datasources(&mut doc.data);
    report.queries_patched += patch::apply_patches(&doc.rel_path, &mut doc.data, &patches);
    report.links_fixed += fix_document_links(doc, &registry)?;

    if doc.has_deprecated_panels() {
      warn!(path = %doc.rel_path.display(), "dashboard uses deprecated Angular panels");
      report.deprecated.push(doc.rel_path.clone());
    }
  }

  titles::dedup_titles(&mut docs);

  for doc in &docs {
    report.normalized += 1;
    let rendered = doc.render()?;
    let on_disk = fs::read_to_string(&doc.path).map_err(|e| NormalizeError::Read {
      path: doc.path.clone(),
      source: e,
    })?;
    if rendered == on_disk {
      continue;
    }
    report.changed.push(doc.rel_path.clone());
    if !options.dry_run {
      document::write_atomic(&doc.path, &rendered)?;
      debug!(path = %doc.path.display(), "rewrote dashboard");
    }
  }

  Ok(report)
}

/// Repair quoted old-uid tokens in one document's serialized text.
///
/// Two source documents can carry the same old uid; only one keeps it, so
/// the rename map may cover a uid this document still legitimately owns.
/// The document's own uid assignment is reasserted after the text pass and
/// its token is excluded from the repaired-link count.
fn fix_document_links(doc: &mut Dashboard, registry: &UidRegistry) -> Result<usize, NormalizeError> {
  let renames = registry.renames();
  if renames.is_empty() {
    return Ok(0);
  }

  let own_uid = doc.uid().map(str::to_owned);
  let own_remapped = own_uid.as_deref().is_some_and(|u| renames.contains_key(u));
  let text = serde_json::to_string(&doc.data).map_err(|e| NormalizeError::Serialize {
    path: doc.path.clone(),
    source: e,
  })?;

  let (fixed_text, mut fixed) = links::fix_links(&text, renames);
  if fixed == 0 {
    return Ok(0);
  }

  doc.data = serde_json::from_str(&fixed_text).map_err(|e| NormalizeError::ParseDashboard {
    path: doc.path.clone(),
    source: e,
  })?;
  if own_remapped {
    if let Some(uid) = &own_uid {
      doc.set_uid(uid);
      fixed -= 1;
    }
  }
  Ok(fixed)
}
