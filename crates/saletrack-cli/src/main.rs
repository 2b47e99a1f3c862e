mod display;
mod history;
mod interactive;
mod scan;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "saletrack")]
#[command(about = "Report discounted items from storefront sale listings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan configured sale listings and print the discounted items (default)
    Scan(ScanArgs),
    /// List the sites configured in the sites file
    Sites,
}

#[derive(Debug, Default, Args)]
pub(crate) struct ScanArgs {
    /// Only scan the site with this name or slug
    #[arg(long)]
    site: Option<String>,

    /// Print the report and exit without prompting
    #[arg(long)]
    no_interactive: bool,

    /// Print items as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Keep items without a resolvable discount
    #[arg(long)]
    include_undiscounted: bool,

    /// Append results to this JSON history file
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = saletrack_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let sites_file = saletrack_core::load_sites(&config.sites_path).with_context(|| {
        format!(
            "failed to load sites from {}",
            config.sites_path.display()
        )
    })?;

    match cli.command {
        Some(Commands::Sites) => {
            display::print_sites(&sites_file.sites);
            Ok(())
        }
        Some(Commands::Scan(args)) => scan::run_scan(&config, &sites_file, &args).await,
        None => scan::run_scan(&config, &sites_file, &ScanArgs::default()).await,
    }
}
