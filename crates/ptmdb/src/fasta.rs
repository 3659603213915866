use crate::Error;
use fnv::{FnvHashMap, FnvHashSet};
use std::io::Write;

pub const LINE_WIDTH: usize = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProteinRecord {
    pub accession: String,
    /// Full FASTA description line, without the leading `>`
    pub header: String,
    pub sequence: String,
}

/// A synthetic or curated proteoform record: a protein sequence with one
/// modification annotated in place
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PtmEntry {
    pub header: String,
    pub sequence: String,
}

// Parse a FASTA string into raw (description, sequence) pairs
fn records(contents: &str) -> Vec<(String, String)> {
    let mut records = Vec::new();
    let mut last_id = "";
    let mut s = String::new();

    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        let line = line.trim();
        if let Some(id) = line.strip_prefix('>') {
            if !s.is_empty() {
                records.push((last_id.to_string(), std::mem::take(&mut s)));
            }
            last_id = id;
        } else {
            s.push_str(line);
        }
    }
    if !s.is_empty() {
        records.push((last_id.to_string(), s));
    }
    records
}

/// Extract the accession from a FASTA description line: the second
/// pipe/colon-delimited field of the identifier token
fn accession(description: &str) -> Result<&str, Error> {
    description
        .split_ascii_whitespace()
        .next()
        .and_then(|id| id.split(|c| c == '|' || c == ':').nth(1))
        .ok_or_else(|| Error::MalformedHeader(description.to_string()))
}

/// Read-only mapping of protein accession to full record, populated once
/// from a reference FASTA
#[derive(Default)]
pub struct SequenceIndex {
    records: FnvHashMap<String, ProteinRecord>,
    // Accessions in load order, for deterministic output
    order: Vec<String>,
}

impl SequenceIndex {
    pub fn parse(contents: &str) -> Result<SequenceIndex, Error> {
        let mut index = SequenceIndex::default();
        for (description, sequence) in records(contents) {
            let acc = accession(&description)?.to_string();
            let record = ProteinRecord {
                accession: acc.clone(),
                header: description,
                sequence,
            };
            // Duplicate accessions are last-write-wins
            if index.records.insert(acc.clone(), record).is_some() {
                log::warn!("duplicate accession {}: keeping the last entry", acc);
            } else {
                index.order.push(acc);
            }
        }
        Ok(index)
    }

    pub fn get(&self, accession: &str) -> Option<&ProteinRecord> {
        self.records.get(accession)
    }

    pub fn contains(&self, accession: &str) -> bool {
        self.records.contains_key(accession)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in load order
    pub fn iter(&self) -> impl Iterator<Item = &ProteinRecord> {
        self.order.iter().filter_map(|acc| self.records.get(acc))
    }
}

/// Optional precomputed library of curated proteoform records, keyed by
/// `sp|{accession}|{site annotation}|`
#[derive(Default)]
pub struct PtmSequenceIndex {
    records: FnvHashMap<String, PtmEntry>,
}

impl PtmSequenceIndex {
    pub fn parse(contents: &str) -> PtmSequenceIndex {
        let mut index = PtmSequenceIndex::default();
        for (description, sequence) in records(contents) {
            let mut key = description
                .split('|')
                .take(3)
                .collect::<Vec<_>>()
                .join("|");
            key.push('|');
            index.records.insert(
                key,
                PtmEntry {
                    header: description,
                    sequence,
                },
            );
        }
        index
    }

    pub fn get(&self, key: &str) -> Option<&PtmEntry> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Wrap a sequence at a fixed line width
pub fn wrap_sequence(sequence: &str, width: usize) -> String {
    sequence
        .as_bytes()
        .chunks(width)
        // sequences are ASCII residues plus ASCII markers
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write selected protein records followed by proteoform entries,
/// deduplicating identical (header, wrapped sequence) pairs. Returns the
/// number of entries written.
pub fn write_fasta<W: Write>(
    out: &mut W,
    index: &SequenceIndex,
    accessions: Option<&[String]>,
    entries: &[PtmEntry],
    include_global: bool,
) -> std::io::Result<usize> {
    let mut written = FnvHashSet::default();
    let mut count = 0;

    if include_global {
        let mut write_record = |record: &ProteinRecord| -> std::io::Result<()> {
            let wrapped = wrap_sequence(&record.sequence, LINE_WIDTH);
            if written.insert((record.header.clone(), wrapped.clone())) {
                writeln!(out, ">{}\n{}", record.header, wrapped)?;
                count += 1;
            }
            Ok(())
        };
        match accessions {
            Some(accessions) => {
                for acc in accessions {
                    if let Some(record) = index.get(acc) {
                        write_record(record)?;
                    }
                }
            }
            None => {
                for record in index.iter() {
                    write_record(record)?;
                }
            }
        }
    }

    for entry in entries {
        let wrapped = wrap_sequence(&entry.sequence, LINE_WIDTH);
        if written.insert((entry.header.clone(), wrapped.clone())) {
            writeln!(out, ">{}\n{}", entry.header, wrapped)?;
            count += 1;
        }
    }

    Ok(count)
}

/// Count distinct descriptions and distinct accessions in a FASTA string
pub fn count_entries(contents: &str) -> Result<(usize, usize), Error> {
    let mut descriptions = FnvHashSet::default();
    let mut accessions = FnvHashSet::default();
    for (description, _) in records(contents) {
        accessions.insert(accession(&description)?.to_string());
        descriptions.insert(description);
    }
    Ok((descriptions.len(), accessions.len()))
}

#[cfg(test)]
mod test {
    use super::*;

    const FASTA: &str = "\
>sp|P04637|P53_HUMAN Cellular tumor antigen p53 OS=Homo sapiens
MEEPQSDPSV
EPPLSQETFS
>sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein VAT-1 homolog
MSDEREVAEAATGEDASSPPPKT
";

    #[test]
    fn parse_index() {
        let index = SequenceIndex::parse(FASTA).unwrap();
        assert_eq!(index.len(), 2);
        let p53 = index.get("P04637").unwrap();
        assert_eq!(p53.sequence, "MEEPQSDPSVEPPLSQETFS");
        assert!(p53.header.starts_with("sp|P04637|P53_HUMAN"));
        assert!(index.get("P00000").is_none());
    }

    #[test]
    fn parse_rejects_malformed_header() {
        let err = SequenceIndex::parse(">P04637 no delimited fields\nMEEPQ\n");
        assert!(matches!(err, Err(Error::MalformedHeader(_))));
    }

    #[test]
    fn duplicate_accession_last_write_wins() {
        let fasta = ">sp|P1|A_HUMAN first\nAAAA\n>sp|P1|A_HUMAN second\nCCCC\n";
        let index = SequenceIndex::parse(fasta).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("P1").unwrap().sequence, "CCCC");
    }

    #[test]
    fn ptm_index_keys() {
        let fasta = ">sp|P04637|S15P|Cellular tumor antigen p53\nMEEPQS(P)DPSV\n";
        let index = PtmSequenceIndex::parse(fasta);
        let entry = index.get("sp|P04637|S15P|").unwrap();
        assert_eq!(entry.sequence, "MEEPQS(P)DPSV");
    }

    #[test]
    fn wrap_at_line_width() {
        let seq = "A".repeat(130);
        let wrapped = wrap_sequence(&seq, 60);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 60);
        assert_eq!(lines[2].len(), 10);
    }

    #[test]
    fn write_deduplicates() {
        let index = SequenceIndex::parse(FASTA).unwrap();
        let entry = PtmEntry {
            header: "sp|P04637|S6P|P53_HUMAN Cellular tumor antigen p53".into(),
            sequence: "MEEPQS(P)DPSVEPPLSQETFS".into(),
        };
        let entries = vec![entry.clone(), entry];
        let mut out = Vec::new();
        let count = write_fasta(&mut out, &index, None, &entries, true).unwrap();
        assert_eq!(count, 3);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("S6P").count(), 1);
    }

    #[test]
    fn ptm_entries_only() {
        let index = SequenceIndex::parse(FASTA).unwrap();
        let entries = vec![PtmEntry {
            header: "sp|P04637|S6P|P53_HUMAN".into(),
            sequence: "MEEPQS(P)DPSVEPPLSQETFS".into(),
        }];
        let mut out = Vec::new();
        let count = write_fasta(&mut out, &index, None, &entries, false).unwrap();
        assert_eq!(count, 1);
        assert!(!String::from_utf8(out).unwrap().contains("VAT1_HUMAN"));
    }

    #[test]
    fn round_trip() {
        let index = SequenceIndex::parse(FASTA).unwrap();
        let mut out = Vec::new();
        write_fasta(&mut out, &index, None, &[], true).unwrap();
        let reparsed = SequenceIndex::parse(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(reparsed.len(), index.len());
        for record in index.iter() {
            let other = reparsed.get(&record.accession).unwrap();
            assert_eq!(other.header, record.header);
            assert_eq!(other.sequence, record.sequence);
        }
    }

    #[test]
    fn count_entries_in_fasta() {
        let (entries, accessions) = count_entries(FASTA).unwrap();
        assert_eq!(entries, 2);
        assert_eq!(accessions, 2);
    }
}
