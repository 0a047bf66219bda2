//! Implementation of the `dashnorm apply` command.
//!
//! Runs the normalization pipeline over the dashboards root and writes every
//! changed document back in place.

use anyhow::{Context, Result};

use dashnorm_lib::{NormalizeOptions, run};

use crate::cmd::print_warnings;

pub fn cmd_apply(options: &NormalizeOptions) -> Result<()> {
  let report = run(options).context("normalization failed")?;

  print_warnings(&report);

  println!("Normalized dashboards: {}", report.normalized);
  println!("Cross-references fixed: {}", report.links_fixed);
  if report.datasources_rewritten > 0 {
    println!("Datasource refs rewritten: {}", report.datasources_rewritten);
  }
  if report.queries_patched > 0 {
    println!("Query expressions patched: {}", report.queries_patched);
  }
  println!("Files rewritten: {}", report.changed.len());

  Ok(())
}
