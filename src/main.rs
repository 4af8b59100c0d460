use clap::Parser;

use debdoctor::commands;
use debdoctor::status::PackageIndex;

#[derive(Parser)]
#[command(name = "debdoc")]
#[command(author, version, about = "Diagnostic reports over the dpkg/apt package database", long_about = None)]
struct Cli {
    /// List residual packages (removed, config remains)
    #[arg(short, long)]
    config: bool,

    /// Find unmet dependencies and unneeded packages (default)
    #[arg(short, long)]
    diagnosis: bool,

    /// List installed packages
    #[arg(short, long)]
    installed: bool,

    /// List large (>10MiB) packages installed manually
    #[arg(short, long)]
    large: bool,

    /// Show packages with uncommon state
    #[arg(short, long)]
    uncommon: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", if cli.verbose { "debug" } else { "warn" });
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // An unreadable database is fatal for every mode
    let index = PackageIndex::load()?;

    // First matching flag wins; diagnosis is the default
    if cli.config {
        commands::config(&index)?;
    } else if cli.installed {
        commands::installed(&index)?;
    } else if cli.uncommon {
        commands::uncommon(&index)?;
    } else if cli.large {
        commands::large(&index)?;
    } else if cli.diagnosis {
        commands::diagnosis(&index)?;
    } else {
        // no flag at all: diagnosis is the default mode
        commands::diagnosis(&index)?;
    }

    Ok(())
}
