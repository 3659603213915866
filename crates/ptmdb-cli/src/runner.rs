use anyhow::Context;
use fnv::FnvHashSet;
use log::info;
use ptmdb_core::fasta::{self, PtmSequenceIndex, SequenceIndex};
use ptmdb_core::generate::{candidate_accession, Generated, Generator, PeptideObservation};
use ptmdb_core::modification::BracketParser;
use ptmdb_core::report::MissingReport;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use crate::input::Settings;
use crate::{output, storage, table};

pub struct Runner {
    pub index: SequenceIndex,
    pub settings: Settings,
    start: Instant,
}

impl Runner {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let start = Instant::now();
        let contents = std::fs::read_to_string(&settings.fasta)
            .with_context(|| format!("Failed to read FASTA from `{}`", settings.fasta))?;
        let index = SequenceIndex::parse(&contents)
            .with_context(|| format!("Failed to parse FASTA from `{}`", settings.fasta))?;
        info!(
            "loaded {} protein sequences in {:#?}",
            index.len(),
            start.elapsed()
        );
        Ok(Runner {
            index,
            settings,
            start,
        })
    }

    pub fn run(self) -> anyhow::Result<()> {
        let table_path = self.settings.peptide_table.clone();
        let file = std::fs::File::open(&table_path)
            .with_context(|| format!("Failed to open peptide table `{}`", table_path))?;
        let peptides = table::read_peptide_table(file)
            .with_context(|| format!("Failed to read peptide table `{}`", table_path))?;
        info!("read {} peptide rows from {}", peptides.len(), table_path);

        let chunk_size = self.settings.chunk_size.unwrap_or_else(|| {
            (peptides.len() / (4 * num_cpus::get().max(1))).max(1)
        });

        let generator_index = &self.index;
        let mut merged = Generated::default();
        for ptm_type in &self.settings.ptm_types {
            let library = match self.settings.ptm_libraries.get(ptm_type) {
                Some(path) => {
                    let contents = std::fs::read_to_string(path).with_context(|| {
                        format!("Failed to read {} library from `{}`", ptm_type, path)
                    })?;
                    let library = PtmSequenceIndex::parse(&contents);
                    info!("loaded {} curated {} entries", library.len(), ptm_type);
                    Some(library)
                }
                None => None,
            };

            let start = Instant::now();
            let generator = Generator::new(generator_index, library.as_ref(), BracketParser);
            let generated = generator
                .generate(&peptides, *ptm_type, chunk_size)
                .with_context(|| format!("Cannot process `{}`", ptm_type))?;
            info!(
                "{}: {} entries, {} unresolved sites, {} missing proteins, {} missing peptides ({:#?})",
                ptm_type,
                generated.entries.len(),
                generated.missing_ptms.len(),
                generated.missing_proteins.len(),
                generated.missing_peptides.len(),
                start.elapsed()
            );
            if generated.dropped_sites > 0 {
                log::warn!(
                    "{}: dropped {} unresolvable sites during synthesis",
                    ptm_type,
                    generated.dropped_sites
                );
            }
            merged = merged.merge(generated);
        }

        let selected = selected_accessions(&peptides);
        let fasta_path = self
            .settings
            .output_directory
            .join(format!("{}.fasta", stem(&table_path)));
        let file = std::fs::File::create(&fasta_path)
            .with_context(|| format!("Failed to create `{}`", fasta_path.display()))?;
        let mut writer = BufWriter::new(file);
        let written = fasta::write_fasta(
            &mut writer,
            &self.index,
            Some(&selected),
            &merged.entries,
            self.settings.include_global_entries,
        )?;
        drop(writer);
        info!("wrote {} entries to {}", written, fasta_path.display());

        let contents = std::fs::read_to_string(&fasta_path)?;
        let (entries, accessions) = fasta::count_entries(&contents)?;
        info!(
            "generated database: {} entries, {} unique protein accessions",
            entries, accessions
        );

        let report = MissingReport::from_generated(&merged);
        output::write_missing_report(&self.settings.output_directory, &report)?;
        output::write_settings(&self.settings.output_directory, &self.settings)?;

        if let Some(archive) = &self.settings.archive {
            let filename = format!("{}.fasta", stem(&table_path));
            let dest = storage::archive_fasta(archive, &fasta_path, &filename)?;
            info!("archived database to {}", dest.display());
        }

        info!("finished in {:#?}", self.start.elapsed());
        Ok(())
    }
}

/// Unique protein accessions referenced by the table, in first-seen order
fn selected_accessions(peptides: &[PeptideObservation]) -> Vec<String> {
    let mut seen = FnvHashSet::default();
    peptides
        .iter()
        .flat_map(|row| row.accessions.iter())
        .map(|entry| candidate_accession(entry))
        .filter(|acc| seen.insert(acc.to_string()))
        .map(String::from)
        .collect()
}

fn stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "database".into())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accession_selection_order() {
        let rows = vec![
            PeptideObservation {
                accessions: vec!["sp|P04637|P53_HUMAN".into(), "Q99536".into()],
                sequence: "LSQETF".into(),
                modifications: String::new(),
            },
            PeptideObservation {
                accessions: vec!["P04637".into()],
                sequence: "WWWWWW".into(),
                modifications: String::new(),
            },
        ];
        assert_eq!(
            selected_accessions(&rows),
            vec!["P04637".to_string(), "Q99536".to_string()]
        );
    }

    #[test]
    fn output_stem() {
        assert_eq!(stem("runs/peptides_2024.tsv"), "peptides_2024");
        assert_eq!(stem(""), "database");
    }
}
