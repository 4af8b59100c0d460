//! Plain-text tables for the diagnosis report

use crate::analyze::UnmetDependency;

const UNMET_TITLE: &str = "Packages with unmet dependencies";
const UNNEEDED_TITLE: &str = "Unneeded packages";

/// Render the unmet-dependencies table, or nothing for an empty report
///
/// Rows are sorted by requiring package (insertion order breaks ties) and a
/// name repeated on consecutive rows prints as a blank cell.
pub fn render_unmet(unmet: &[UnmetDependency]) -> Option<String> {
    if unmet.is_empty() {
        return None;
    }

    let align_pkg = unmet
        .iter()
        .map(|u| u.package.len())
        .max()
        .unwrap_or(0)
        .max(UNMET_TITLE.len());
    let align_req = unmet
        .iter()
        .map(|u| u.requires.len())
        .max()
        .unwrap_or(0)
        .max("Requires".len());

    let mut rows: Vec<&UnmetDependency> = unmet.iter().collect();
    // stable sort keeps insertion order within one package
    rows.sort_by(|a, b| a.package.cmp(&b.package));

    let mut out = String::new();
    out.push_str(&format!(
        "{}{}  Type  Requires\n",
        UNMET_TITLE,
        " ".repeat(align_pkg - UNMET_TITLE.len())
    ));
    out.push_str(&format!(
        "{}=-=====-{}\n",
        "=".repeat(align_pkg),
        "=".repeat(align_req)
    ));

    let mut previous = "";
    for row in rows {
        let name = if row.package == previous {
            ""
        } else {
            row.package.as_str()
        };
        out.push_str(&format!(
            "{:<align_pkg$}  {}   {}\n",
            name,
            row.kind.short_code(),
            row.requires
        ));
        previous = &row.package;
    }
    Some(out)
}

/// Render the unneeded-packages table, or nothing for an empty report
///
/// `packages` must be (name, size in bytes) sorted by name; sizes print
/// right-aligned in a fixed 10-character field.
pub fn render_unneeded(packages: &[(String, u64)]) -> Option<String> {
    if packages.is_empty() {
        return None;
    }

    let align_name = packages
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        .max(UNNEEDED_TITLE.len());

    let mut out = String::new();
    out.push_str(&format!(
        "{}{}        Size\n",
        UNNEEDED_TITLE,
        " ".repeat(align_name - UNNEEDED_TITLE.len())
    ));
    out.push_str(&format!("{}=-==========\n", "=".repeat(align_name)));
    for (name, size) in packages {
        out.push_str(&format!("{name:<align_name$}  {size:>10}\n"));
    }
    Some(out)
}
