//! dashnorm - Grafana dashboard tree normalizer.
//!
//! Rewrites every dashboard JSON file under the dashboards root: stable
//! unique uids, canonical datasource references, per-dashboard query fixups,
//! link repair after renames, per-folder title dedup.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use dashnorm_lib::{NormalizeError, NormalizeOptions, UidStrategy};

mod cmd;
mod output;

#[derive(Parser)]
#[command(name = "dashnorm")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Normalize dashboards and write them back in place
  Apply(NormalizeArgs),

  /// Show which dashboards would change (dry-run)
  Plan(NormalizeArgs),
}

#[derive(Args)]
struct NormalizeArgs {
  /// Dashboards root (default: first existing candidate path)
  #[arg(long)]
  root: Option<PathBuf>,

  /// How to derive uids for files without a manifest override
  #[arg(long, value_enum, default_value_t)]
  uid_strategy: UidPolicy,

  /// Keep import-time __inputs metadata
  #[arg(long)]
  keep_inputs: bool,

  /// Extra patch rules file (JSON array of {path_suffix, find, replace})
  #[arg(long)]
  patches: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum UidPolicy {
  /// Keep an existing valid uid
  #[default]
  Preserve,
  /// Always derive the uid from the file path
  Recompute,
}

impl From<UidPolicy> for UidStrategy {
  fn from(policy: UidPolicy) -> Self {
    match policy {
      UidPolicy::Preserve => UidStrategy::Preserve,
      UidPolicy::Recompute => UidStrategy::Recompute,
    }
  }
}

impl NormalizeArgs {
  fn into_options(self, dry_run: bool) -> NormalizeOptions {
    NormalizeOptions {
      root: self.root,
      strategy: self.uid_strategy.into(),
      keep_inputs: self.keep_inputs,
      patches_file: self.patches,
      dry_run,
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Apply(args) => cmd::cmd_apply(&args.into_options(false)),
    Commands::Plan(args) => cmd::cmd_plan(&args.into_options(true)),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      output::print_error(&format!("{e:#}"));
      ExitCode::from(exit_code(&e))
    }
  }
}

/// Map failures onto the exit codes callers script against: 2 when there is
/// no dashboards root to work on, 3 for unparseable input JSON.
fn exit_code(err: &anyhow::Error) -> u8 {
  match err.downcast_ref::<NormalizeError>() {
    Some(NormalizeError::RootNotFound { .. }) => 2,
    Some(
      NormalizeError::ParseDashboard { .. }
      | NormalizeError::ParseManifest { .. }
      | NormalizeError::ParsePatches { .. },
    ) => 3,
    _ => 1,
  }
}
