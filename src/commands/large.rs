use std::collections::BTreeSet;
use std::io::IsTerminal;

use anyhow::Result;
use colored::Colorize;

use crate::status::PackageIndex;

/// Threshold above which a manually installed package counts as large
pub const LARGE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Names of manually installed packages strictly larger than 10 MiB,
/// sorted and deduplicated
pub fn large_names(index: &PackageIndex) -> Vec<String> {
    let mut names = BTreeSet::new();
    for (_, pkg) in index.iter() {
        if !pkg.manually_installed() {
            continue;
        }
        if let Some(installed) = &pkg.installed
            && installed.installed_size > LARGE_THRESHOLD
        {
            names.insert(pkg.name.clone());
        }
    }
    names.into_iter().collect()
}

pub fn large(index: &PackageIndex) -> Result<()> {
    let is_tty = IsTerminal::is_terminal(&std::io::stdout());
    let names = large_names(index);

    if is_tty {
        println!("{}", "==> Large Packages".bold().green());
        println!("(Manually installed packages above 10 MiB)");
        println!();
    }

    if names.is_empty() {
        if is_tty {
            println!("No large packages found");
        }
        return Ok(());
    }

    for name in &names {
        if is_tty {
            println!("{}", name.cyan());
        } else {
            println!("{name}");
        }
    }

    if is_tty {
        println!();
        println!(
            "{} {} large packages",
            "ℹ".blue(),
            names.len().to_string().bold()
        );
    }
    Ok(())
}
