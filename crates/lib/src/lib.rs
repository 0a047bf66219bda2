//! dashnorm-lib: Grafana dashboard tree normalization.
//!
//! This crate provides the pieces of the normalization pipeline:
//! - `manifest`: out-of-band uid declarations per dashboard file
//! - `uid`: slug derivation and run-wide uniqueness tracking
//! - `datasource`: canonical backend references (metrics and logs)
//! - `patch`: path-scoped query fixups for imported dashboards
//! - `links`: uid link repair after renames
//! - `titles`: per-folder title deduplication
//! - `normalize`: the two-pass driver tying it together

pub mod consts;
pub mod datasource;
pub mod document;
pub mod error;
pub mod links;
pub mod manifest;
pub mod normalize;
pub mod patch;
pub mod titles;
pub mod uid;

pub use error::{NormalizeError, Result};
pub use normalize::{NormalizeOptions, NormalizeReport, locate_root, run};
pub use uid::UidStrategy;
