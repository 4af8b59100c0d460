use colored::Colorize;
use std::io::IsTerminal;

use crate::error::Result;
use crate::status::{Package, PackageIndex};

/// Packages removed with configuration files left behind, sorted
pub fn residual_names(index: &PackageIndex) -> Vec<String> {
    filter_names(index, |pkg| {
        pkg.state.map(|s| s.is_residual()).unwrap_or(false)
    })
}

/// Currently installed packages, sorted
pub fn installed_names(index: &PackageIndex) -> Vec<String> {
    filter_names(index, |pkg| {
        pkg.state.map(|s| s.is_installed()).unwrap_or(false)
    })
}

/// Packages in any state other than fully-installed-ok, as
/// `code  name  version` lines, sorted by name
pub fn uncommon_lines(index: &PackageIndex) -> Vec<String> {
    let mut lines: Vec<String> = index
        .iter()
        .filter_map(|(_, pkg)| {
            let state = pkg.state?;
            if state.is_fully_installed() {
                return None;
            }
            Some(match &pkg.version {
                Some(version) => format!("{}  {}  {}", state.code(), pkg.name, version),
                None => format!("{}  {}", state.code(), pkg.name),
            })
        })
        .collect();
    lines.sort_by(|a, b| a[4..].cmp(&b[4..]));
    lines
}

fn filter_names(index: &PackageIndex, keep: impl Fn(&Package) -> bool) -> Vec<String> {
    let mut names = Vec::new();
    for (_, pkg) in index.iter() {
        if keep(pkg) {
            names.push(pkg.name.clone());
        }
    }
    names.sort();
    names
}

pub fn config(index: &PackageIndex) -> Result<()> {
    print_listing(
        "==> Residual Packages",
        "(Removed packages whose configuration files remain)",
        &residual_names(index),
        "residual packages",
    );
    Ok(())
}

pub fn installed(index: &PackageIndex) -> Result<()> {
    print_listing(
        "==> Installed Packages",
        "(Packages currently unpacked and configured)",
        &installed_names(index),
        "installed packages",
    );
    Ok(())
}

pub fn uncommon(index: &PackageIndex) -> Result<()> {
    let is_tty = IsTerminal::is_terminal(&std::io::stdout());
    let lines = uncommon_lines(index);

    if is_tty {
        println!("{}", "==> Uncommon Package States".bold().green());
        println!("(Packages in any state other than installed ok)");
        println!();
    }

    if lines.is_empty() {
        if is_tty {
            println!("No packages in uncommon states");
        }
        return Ok(());
    }

    for line in &lines {
        println!("{line}");
    }

    if is_tty {
        println!();
        println!(
            "{} {} packages in uncommon states",
            "ℹ".blue(),
            lines.len().to_string().bold()
        );
    }
    Ok(())
}

/// Shared pipe-aware listing: plain names when piped, header and count
/// footer on a TTY
fn print_listing(title: &str, subtitle: &str, names: &[String], what: &str) {
    let is_tty = IsTerminal::is_terminal(&std::io::stdout());

    if is_tty {
        println!("{}", title.bold().green());
        println!("{subtitle}");
        println!();
    }

    if names.is_empty() {
        if is_tty {
            println!("No {what} found");
        }
        return;
    }

    for name in names {
        if is_tty {
            println!("{}", name.cyan());
        } else {
            // Piped: just names, no colors
            println!("{name}");
        }
    }

    if is_tty {
        println!();
        println!("{} {} {what}", "ℹ".blue(), names.len().to_string().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "\
Package: zsh
Status: install ok installed
Version: 5.9

Package: oldtool
Status: deinstall ok config-files
Version: 0.1

Package: bash
Status: install ok installed
Version: 5.2

Package: stuck
Status: install ok half-configured
Version: 2.0
";

    fn index() -> PackageIndex {
        PackageIndex::parse(STATUS, None).unwrap()
    }

    #[test]
    fn test_residual_names() {
        assert_eq!(residual_names(&index()), vec!["oldtool"]);
    }

    #[test]
    fn test_installed_names_sorted() {
        assert_eq!(installed_names(&index()), vec!["bash", "zsh"]);
    }

    #[test]
    fn test_uncommon_excludes_only_ii() {
        let lines = uncommon_lines(&index());
        assert_eq!(lines, vec!["rc  oldtool  0.1", "iF  stuck  2.0"]);
    }
}
