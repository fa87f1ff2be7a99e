use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

const PLAYLIST_SUFFIX: &str = "-videos.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistCount {
    pub name: String,
    pub videos: usize,
}

#[derive(Debug, Default)]
pub struct Tally {
    /// Non-empty playlists, largest first.
    pub playlists: Vec<PlaylistCount>,
    /// (file name, error) for files that could not be read.
    pub failures: Vec<(String, String)>,
}

impl Tally {
    pub fn total_videos(&self) -> usize {
        self.playlists.iter().map(|p| p.videos).sum()
    }
}

/// Count data rows (lines after the header) in every `*-videos.csv` under `dir`.
pub fn tally(dir: &Path) -> Result<Tally> {
    let mut files: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(PLAYLIST_SUFFIX))
        .collect();
    files.sort();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut tally = Tally::default();
    for name in files {
        pb.set_message(name.clone());
        match count_rows(&dir.join(&name)) {
            Ok(videos) if videos > 0 => tally.playlists.push(PlaylistCount {
                name: name.trim_end_matches(PLAYLIST_SUFFIX).to_string(),
                videos,
            }),
            Ok(_) => debug!(file = %name, "Skipping empty playlist"),
            Err(e) => {
                warn!(file = %name, error = %e, "Unreadable playlist");
                tally.failures.push((name, e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    tally
        .playlists
        .sort_by(|a, b| b.videos.cmp(&a.videos).then_with(|| a.name.cmp(&b.name)));
    Ok(tally)
}

/// Lines end at `\n`, `\r\n` or a lone `\r`.
fn count_rows(path: &Path) -> std::io::Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let lines = text.replace("\r\n", "\n").split_terminator(['\n', '\r']).count();
    Ok(lines.saturating_sub(1))
}

pub fn write_report<W: Write>(out: &mut W, tally: &Tally, top: usize) -> Result<()> {
    for (name, error) in &tally.failures {
        writeln!(out, "Error reading {}: {}", name, error)?;
    }
    writeln!(out, "Total playlists: {}", tally.playlists.len())?;
    writeln!(out, "Total videos (with duplicates): {}", group_thousands(tally.total_videos()))?;
    writeln!(out)?;
    writeln!(out, "Top {} playlists by video count:", top)?;
    writeln!(out, "{}", "-".repeat(50))?;
    for p in tally.playlists.iter().take(top) {
        writeln!(out, "{:>5} - {}", group_thousands(p.videos), p.name)?;
    }
    Ok(())
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
