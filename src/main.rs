mod parser;
mod playlists;
mod record;
mod report;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

const DEFAULT_HISTORY_PATH: &str = "data/watch-history.html";
const DEFAULT_PLAYLISTS_DIR: &str = "data/Playlists/";

#[derive(Parser)]
#[command(name = "takeout_history", about = "Summaries of a YouTube Takeout export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract watch-history records and list everything that was not a plain watch
    History {
        /// Path to watch-history.html
        #[arg(default_value = DEFAULT_HISTORY_PATH)]
        path: PathBuf,
        /// Print all records as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Count videos per playlist CSV
    Playlists {
        /// Directory holding *-videos.csv files
        #[arg(default_value = DEFAULT_PLAYLISTS_DIR)]
        dir: PathBuf,
        /// Number of playlists to list
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Commands::History { path, json } => {
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            info!("Parsing {} ({} bytes)", path.display(), html.len());
            let records = parser::extract_records(&html);
            info!("Extracted {} records", records.len());
            if json {
                report::write_json(&mut out, &records)
            } else {
                report::write_summary(&mut out, &records)
            }
        }
        Commands::Playlists { dir, top } => {
            let tally = playlists::tally(&dir)?;
            playlists::write_report(&mut out, &tally, top)
        }
    };
    out.flush()?;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
