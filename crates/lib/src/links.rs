//! Cross-dashboard link repair after uid renames.
//!
//! Dashboard-to-dashboard navigation embeds the target uid as a bare string
//! deep inside arbitrary panel and link structures. Rather than enumerate
//! every link-bearing field, the serialized document text is rewritten:
//! every complete JSON string token holding an old uid becomes the new uid.
//! A uid embedded inside a longer string (a `/d/<uid>/...` URL, say) is left
//! alone; a string value that merely happens to equal an old uid is not
//! distinguishable from a link and will be rewritten too.

use std::collections::BTreeMap;

/// Uids that changed during assignment, old → new.
pub type UidMap = BTreeMap<String, String>;

/// Replace every quoted occurrence of a renamed uid in `text`.
///
/// Returns the rewritten text and the number of tokens replaced. Mappings
/// where old equals new are skipped.
pub fn fix_links(text: &str, renames: &UidMap) -> (String, usize) {
  let mut out = text.to_string();
  let mut fixed = 0;

  for (old, new) in renames {
    if old == new {
      continue;
    }
    let needle = format!("\"{old}\"");
    let hits = out.matches(&needle).count();
    if hits > 0 {
      out = out.replace(&needle, &format!("\"{new}\""));
      fixed += hits;
    }
  }

  (out, fixed)
}
