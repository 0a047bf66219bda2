//! Error types for dashnorm-lib.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while normalizing a dashboard tree.
#[derive(Debug, Error)]
pub enum NormalizeError {
  #[error("dashboards root not found (tried: {tried})")]
  RootNotFound { tried: String },

  #[error("failed to walk dashboards root: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON in dashboard {path}: {source}")]
  ParseDashboard {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid JSON in manifest {path}: {source}")]
  ParseManifest {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid patch rules in {path}: {source}")]
  ParsePatches {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize dashboard {path}: {source}")]
  Serialize {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
