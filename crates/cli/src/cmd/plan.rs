//! Implementation of the `dashnorm plan` command.
//!
//! Dry run: computes the full normalization in memory and reports which
//! files would change, writing nothing.

use anyhow::{Context, Result};

use dashnorm_lib::{NormalizeOptions, run};

use crate::cmd::print_warnings;
use crate::output;

pub fn cmd_plan(options: &NormalizeOptions) -> Result<()> {
  let report = run(options).context("normalization failed")?;

  print_warnings(&report);

  if report.changed.is_empty() {
    output::print_info("No changes; dashboard tree is already normalized");
    return Ok(());
  }

  for path in &report.changed {
    output::print_change(&path.display().to_string());
  }

  println!();
  println!(
    "Would rewrite {} of {} dashboard(s)",
    report.changed.len(),
    report.normalized
  );

  Ok(())
}
