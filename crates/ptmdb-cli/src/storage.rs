//! Local replacement for the FASTA archive endpoint: generated databases
//! are persisted under `{root}/{year}/{month name}/{username}/{filename}`

use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};

use crate::input::ArchiveSettings;

pub fn archive_fasta(
    settings: &ArchiveSettings,
    fasta: &Path,
    filename: &str,
) -> anyhow::Result<PathBuf> {
    let now = Local::now();
    let dir = settings
        .root
        .join(now.format("%Y").to_string())
        .join(now.format("%B").to_string())
        .join(&settings.username);
    // idempotent: repeated runs land in the same directory
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create archive directory `{}`", dir.display()))?;

    let dest = dir.join(filename);
    std::fs::copy(fasta, &dest)
        .with_context(|| format!("Failed to archive `{}`", fasta.display()))?;
    Ok(dest)
}
