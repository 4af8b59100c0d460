use std::io::IsTerminal;

use anyhow::Result;
use colored::Colorize;

use crate::analyze::Analyzer;
use crate::report;
use crate::status::PackageIndex;

/// Run the dependency-closure diagnosis and print both reports
pub fn diagnosis(index: &PackageIndex) -> Result<()> {
    let result = Analyzer::new(index).run();

    let unmet = report::render_unmet(&result.unmet);
    let unneeded = report::render_unneeded(&result.unneeded);

    if let Some(table) = &unmet {
        print!("{table}");
    }
    if let Some(table) = &unneeded {
        // blank line before the unneeded table, whether or not the unmet
        // table was printed
        println!();
        print!("{table}");
    }

    if unmet.is_none()
        && unneeded.is_none()
        && IsTerminal::is_terminal(&std::io::stdout())
    {
        println!(
            "{} No unmet dependencies or unneeded packages found",
            "✓".green()
        );
    }

    Ok(())
}
