mod apply;
mod plan;

pub use apply::cmd_apply;
pub use plan::cmd_plan;

use dashnorm_lib::NormalizeReport;

use crate::output;

/// Print the advisory warnings shared by apply and plan.
pub(crate) fn print_warnings(report: &NormalizeReport) {
  for path in &report.deprecated {
    output::print_warning(&format!(
      "deprecated Angular panels in {}",
      path.display()
    ));
  }
}
