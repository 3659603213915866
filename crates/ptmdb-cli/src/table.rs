use anyhow::Context;
use ptmdb_core::generate::PeptideObservation;
use std::io::Read;

const ACCESSION_COLUMN: &str = "Protein.Group.Accessions";
const SEQUENCE_COLUMN: &str = "Sequence";
const MODIFICATIONS_COLUMN: &str = "Modifications";

/// Read a tab-delimited peptide search results table into observations.
/// Candidate accessions are semicolon-joined within their column.
pub fn read_peptide_table<R: Read>(reader: R) -> anyhow::Result<Vec<PeptideObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read table header row")?;
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Peptide table is missing the `{}` column", name))
    };
    let accessions = column(ACCESSION_COLUMN)?;
    let sequence = column(SEQUENCE_COLUMN)?;
    let modifications = column(MODIFICATIONS_COLUMN)?;

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse table row {}", line + 2))?;
        let accessions = record
            .get(accessions)
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        if accessions.is_empty() {
            log::warn!("table row {} has no protein accessions, skipping", line + 2);
            continue;
        }
        rows.push(PeptideObservation {
            accessions,
            sequence: record.get(sequence).unwrap_or_default().trim().to_string(),
            modifications: record
                .get(modifications)
                .unwrap_or_default()
                .trim()
                .to_string(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_table() {
        let tsv = "Protein.Group.Accessions\tSequence\tModifications\tScore\n\
                   sp|P04637|P53_HUMAN;sp|Q99536|VAT1_HUMAN\tLSQETF\tLS[79.9663]QETF\t0.99\n\
                   P04637\tWWWWWW\t\t0.12\n";
        let rows = read_peptide_table(tsv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].accessions,
            vec!["sp|P04637|P53_HUMAN", "sp|Q99536|VAT1_HUMAN"]
        );
        assert_eq!(rows[0].modifications, "LS[79.9663]QETF");
        assert_eq!(rows[1].sequence, "WWWWWW");
        assert_eq!(rows[1].modifications, "");
    }

    #[test]
    fn missing_column_aborts() {
        let tsv = "Accessions\tSequence\nP04637\tAAK\n";
        let err = read_peptide_table(tsv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Protein.Group.Accessions"));
    }

    #[test]
    fn rows_without_accessions_are_skipped() {
        let tsv = "Protein.Group.Accessions\tSequence\tModifications\n\
                   ;\tAAK\t\n\
                   P04637\tAAK\t\n";
        let rows = read_peptide_table(tsv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
