mod output;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use branchscout_core::{load_regions, AppConfig};

use crate::session::Mode;

#[derive(Debug, Parser)]
#[command(name = "branchscout")]
#[command(about = "Scrape a branch directory into JSON and CSV")]
struct Cli {
    /// Run the browser without a window.
    #[arg(long, global = true)]
    headless: bool,

    /// Directory for the output files (overrides `BRANCHSCOUT_OUTPUT_DIR`).
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also write `branches_all.csv`.
    #[arg(long, global = true)]
    csv: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the region catalog through the region selector.
    Regions {
        /// Only scrape this region (label or name); repeatable.
        #[arg(long = "region", value_name = "LABEL")]
        regions: Vec<String>,
        /// Print the regions that would be scraped and exit.
        #[arg(long)]
        dry_run: bool,
    },
    /// Follow next-page controls from the start URL.
    Pages {
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,
        /// Print the start URL and page limit and exit.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the loaded region catalog.
    Catalog,
}

impl Cli {
    /// Command-line flags win over environment configuration.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if self.headless {
            config.headless = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if self.csv {
            config.write_csv = true;
        }
        if let Commands::Pages {
            max_pages: Some(n), ..
        } = self.command
        {
            config.max_pages = n;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = branchscout_core::load_app_config()?;
    cli.apply_overrides(&mut config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Catalog => {
            let catalog = load_regions(&config.regions_path)?;
            for region in &catalog {
                println!("{}", region.label());
            }
        }
        Commands::Regions { regions, dry_run } => {
            let catalog = load_regions(&config.regions_path)?;
            let catalog = if regions.is_empty() {
                catalog
            } else {
                catalog.restrict_to(&regions)?
            };

            if dry_run {
                let labels: Vec<String> = catalog.iter().map(|r| r.label()).collect();
                println!(
                    "dry-run: would scrape {} regions from {}: [{}]",
                    catalog.len(),
                    config.start_url,
                    labels.join(", ")
                );
                return Ok(());
            }
            session::run_session(&config, Mode::Regions(catalog)).await?;
        }
        Commands::Pages { dry_run, .. } => {
            if dry_run {
                println!(
                    "dry-run: would scrape up to {} pages from {}",
                    config.max_pages, config.start_url
                );
                return Ok(());
            }
            session::run_session(&config, Mode::Pages).await?;
        }
    }

    Ok(())
}
