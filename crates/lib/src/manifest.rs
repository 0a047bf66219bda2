//! Dashboard manifest (`manifest.json`) loading.
//!
//! The manifest is an out-of-band declaration of desired uids per dashboard
//! file, overriding every derived value. It lives at the dashboards root:
//!
//! ```json
//! {
//!   "dashboards": [
//!     { "folder": "docker", "filename": "docker-engine-health-21040.json", "uid": "docker-engine" },
//!     { "folder": "node", "filename": "node-exporter-full.json", "uid": null }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// A single manifest entry, addressing one dashboard file by folder and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
  pub folder: String,
  pub filename: String,
  /// Desired uid, or `null` to leave derivation to the normalizer.
  #[serde(default)]
  pub uid: Option<String>,
}

/// The dashboard manifest.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  #[serde(default)]
  pub dashboards: Vec<ManifestEntry>,
}

impl Manifest {
  /// Load the manifest from `path`.
  ///
  /// A missing file is an empty manifest. A present but malformed file is a
  /// hard error: the manifest is the authority on uids and must not be
  /// silently ignored when broken.
  pub fn load(path: &Path) -> Result<Self, NormalizeError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
      Err(e) => {
        return Err(NormalizeError::Read {
          path: path.to_path_buf(),
          source: e,
        });
      }
    };

    serde_json::from_str(&content).map_err(|e| NormalizeError::ParseManifest {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// Map of root-relative dashboard path → desired uid.
  ///
  /// Entries without a uid carry no override and are skipped.
  pub fn uid_overrides(&self) -> BTreeMap<PathBuf, String> {
    self
      .dashboards
      .iter()
      .filter_map(|d| {
        d.uid
          .as_ref()
          .map(|uid| (PathBuf::from(&d.folder).join(&d.filename), uid.clone()))
      })
      .collect()
  }
}
