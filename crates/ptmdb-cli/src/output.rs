use anyhow::Context;
use ptmdb_core::report::MissingReport;
use std::path::{Path, PathBuf};

use crate::input::Settings;

/// Write the three unresolved-case tables as named TSV files in the
/// output directory
pub fn write_missing_report(dir: &Path, report: &MissingReport) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    let path = dir.join("missing_ptms.tsv");
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    wtr.write_record(["Protein ID", "Site Position", "Modification Residue"])?;
    for (accession, position, residue) in &report.ptms {
        let mut record = csv::ByteRecord::new();
        record.push_field(accession.as_bytes());
        record.push_field(itoa::Buffer::new().format(*position).as_bytes());
        record.push_field(&[*residue]);
        wtr.write_byte_record(&record)?;
    }
    wtr.flush()?;
    paths.push(path);

    let path = dir.join("missing_proteins.tsv");
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    wtr.write_record(["Missing Protein IDs"])?;
    for accession in &report.proteins {
        wtr.write_record([accession.as_str()])?;
    }
    wtr.flush()?;
    paths.push(path);

    let path = dir.join("missing_peptides.tsv");
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    wtr.write_record(["Protein ID", "Peptide Sequence"])?;
    for (accession, peptide) in &report.peptides {
        wtr.write_record([accession.as_str(), peptide.as_str()])?;
    }
    wtr.flush()?;
    paths.push(path);

    Ok(paths)
}

/// Record the resolved settings alongside the generated database
pub fn write_settings(dir: &Path, settings: &Settings) -> anyhow::Result<PathBuf> {
    let path = dir.join("ptmdb.json");
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(path)
}
