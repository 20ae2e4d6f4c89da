//! `album-dl` command line entry point.

use std::path::PathBuf;
use std::time::Instant;

use album_dl::{Config, DownloadCoordinator, run_until_signal};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Download image albums from a paginated listing, safely re-runnable.
#[derive(Debug, Parser)]
#[command(name = "album-dl", version, about)]
struct Cli {
    /// Number of listing pages to process [default: 3]
    pages: Option<u32>,

    /// Albums processed concurrently per page [default: 10]
    workers: Option<usize>,

    /// JSON configuration file; command line values override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base directory for downloaded albums
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// SQLite metadata store path
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Listing search keyword
    #[arg(long)]
    keyword: Option<String>,
}

impl Cli {
    fn load_config(&self) -> album_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(pages) = self.pages {
            config.download.pages = pages;
        }
        if let Some(workers) = self.workers {
            config.download.workers = workers;
        }
        if let Some(dir) = &self.download_dir {
            config.download.download_dir = dir.clone();
        }
        if let Some(database) = &self.database {
            config.persistence.database_path = database.clone();
        }
        if let Some(keyword) = &self.keyword {
            config.source.keyword = keyword.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = cli.load_config()?;
    let (pages, workers) = (config.download.pages, config.download.workers);

    tracing::info!(
        pages,
        workers,
        download_dir = %config.download.download_dir.display(),
        keyword = %config.source.keyword,
        "Starting album-dl"
    );

    let started = Instant::now();
    let coordinator = DownloadCoordinator::new(config).await?;

    match run_until_signal(&coordinator, pages, workers).await {
        Some(summary) => {
            println!();
            println!("Run complete in {:.1}s:", started.elapsed().as_secs_f64());
            println!("  Albums seen:            {}", summary.albums_seen);
            println!("  Albums downloaded:      {}", summary.albums_downloaded);
            println!("  Already complete:       {}", summary.albums_complete);
            println!("  Without images:         {}", summary.albums_without_images);
            println!("  Failed albums:          {}", summary.albums_failed);
            println!("  Images saved:           {}", summary.images.saved);
            println!("  Images already on disk: {}", summary.images.existing);
            println!("  Images failed:          {}", summary.images.failed);
        }
        None => {
            println!(
                "Interrupted after {:.1}s; re-run to resume",
                started.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}
