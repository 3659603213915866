use crate::fasta::{PtmEntry, PtmSequenceIndex, SequenceIndex};
use crate::modification::{ModificationStringParser, PtmType};
use crate::site;
use crate::Error;
use rayon::prelude::*;

/// One row of the peptide-level search results table
#[derive(Clone, Debug)]
pub struct PeptideObservation {
    /// Candidate protein accessions, in table order. Entries may be bare
    /// accessions or full `sp|P04637|P53_HUMAN` identifiers.
    pub accessions: Vec<String>,
    pub sequence: String,
    /// Inline bracket-annotated modification string
    pub modifications: String,
}

/// Accumulated output of a generation run. Resolution failures are
/// recorded here rather than raised; structural failures abort the run.
#[derive(Debug, Default)]
pub struct Generated {
    pub entries: Vec<PtmEntry>,
    /// (accession, 1-based site position, residue) with no curated entry
    pub missing_ptms: Vec<(String, usize, u8)>,
    /// Candidate accessions absent from the sequence index
    pub missing_proteins: Vec<String>,
    /// (accession, peptide) pairs where the peptide does not occur in the
    /// resolved protein sequence
    pub missing_peptides: Vec<(String, String)>,
    /// Sites dropped during synthesis (position past the end of the
    /// sequence, or protein no longer resolvable)
    pub dropped_sites: usize,
}

impl Generated {
    pub fn merge(mut self, other: Generated) -> Generated {
        self.entries.extend(other.entries);
        self.missing_ptms.extend(other.missing_ptms);
        self.missing_proteins.extend(other.missing_proteins);
        self.missing_peptides.extend(other.missing_peptides);
        self.dropped_sites += other.dropped_sites;
        self
    }
}

/// Extract the accession from a candidate entry: the second pipe-delimited
/// field if the entry is a full identifier, otherwise the entry itself
pub fn candidate_accession(entry: &str) -> &str {
    entry.split('|').nth(1).unwrap_or(entry)
}

/// Canonical site annotation token, e.g. `S42P` or `N187nG`
pub fn annotation_token(ptm_type: PtmType, residue: u8, position: usize) -> String {
    format!("{}{}{}", residue as char, position, ptm_type.token_suffix())
}

pub struct Generator<'a, P> {
    index: &'a SequenceIndex,
    ptm_index: Option<&'a PtmSequenceIndex>,
    parser: P,
}

impl<'a, P: ModificationStringParser + Sync> Generator<'a, P> {
    pub fn new(
        index: &'a SequenceIndex,
        ptm_index: Option<&'a PtmSequenceIndex>,
        parser: P,
    ) -> Self {
        Generator {
            index,
            ptm_index,
            parser,
        }
    }

    /// Generate proteoform entries for every observation in the table.
    /// Rows are independent, so chunks are processed in parallel and the
    /// per-chunk accumulators merged by concatenation; missing entries are
    /// synthesized once after the merge.
    pub fn generate(
        &self,
        peptides: &[PeptideObservation],
        ptm_type: PtmType,
        chunk_size: usize,
    ) -> Result<Generated, Error> {
        if !ptm_type.is_supported() {
            return Err(Error::UnsupportedPtm(ptm_type));
        }

        let mut generated = peptides
            .par_chunks(chunk_size.max(1))
            .map(|chunk| {
                let mut acc = Generated::default();
                for row in chunk {
                    self.process(row, ptm_type, &mut acc);
                }
                acc
            })
            .reduce(Generated::default, Generated::merge);

        self.synthesize(&mut generated, ptm_type);
        Ok(generated)
    }

    fn process(&self, row: &PeptideObservation, ptm_type: PtmType, acc: &mut Generated) {
        // First candidate present in the index wins; the rest are scanned
        // only to record absences. A deliberate tie-break: peptides shared
        // across paralogs are assigned to the first resolvable accession.
        let mut resolved = None;
        let mut last = None;
        for entry in &row.accessions {
            let accession = candidate_accession(entry);
            last = Some(accession);
            match self.index.get(accession) {
                Some(record) => {
                    if resolved.is_none() {
                        resolved = Some(record);
                    }
                }
                None => acc.missing_proteins.push(accession.to_string()),
            }
        }
        let record = match resolved {
            Some(record) => record,
            None => {
                if let Some(last) = last {
                    acc.missing_proteins.push(last.to_string());
                }
                return;
            }
        };

        let peptide = match ptm_type {
            PtmType::NLinkedGlycosylation => site::clean_peptide(&row.sequence),
            _ => row.sequence.as_str(),
        };
        let start = match site::locate(&record.sequence, peptide) {
            Some(start) => start,
            None => {
                acc.missing_peptides
                    .push((record.accession.clone(), row.sequence.clone()));
                return;
            }
        };

        let sites = match ptm_type {
            PtmType::Phosphorylation => self.parser.extract(&row.modifications, ptm_type),
            PtmType::NLinkedGlycosylation => site::find_sequons(peptide),
            _ => Vec::new(),
        };

        for s in sites {
            let position = site::absolute_position(start, s.position);
            let token = annotation_token(ptm_type, s.residue, position);
            let key = format!("sp|{}|{}|", record.accession, token);
            match self.ptm_index.and_then(|ix| ix.get(&key)) {
                Some(entry) => acc.entries.push(entry.clone()),
                None => acc
                    .missing_ptms
                    .push((record.accession.clone(), position, s.residue)),
            }
        }
    }

    /// Synthesize one proteoform entry per resolvable missing site: splice
    /// the modification marker after the residue and the annotation token
    /// into the third pipe-delimited header field
    fn synthesize(&self, generated: &mut Generated, ptm_type: PtmType) {
        let Generated {
            entries,
            missing_ptms,
            dropped_sites,
            ..
        } = generated;
        for (accession, position, residue) in missing_ptms.iter() {
            let record = match self.index.get(accession) {
                Some(record) => record,
                None => {
                    log::warn!("cannot synthesize {}: not in sequence index", accession);
                    *dropped_sites += 1;
                    continue;
                }
            };
            if *position == 0 || *position > record.sequence.len() {
                log::warn!(
                    "cannot synthesize {} site {} for {}: past end of sequence ({} aa)",
                    ptm_type,
                    position,
                    accession,
                    record.sequence.len()
                );
                *dropped_sites += 1;
                continue;
            }

            let sequence = format!(
                "{}{}{}",
                &record.sequence[..*position],
                ptm_type.sequence_marker(),
                &record.sequence[*position..]
            );
            let token = annotation_token(ptm_type, *residue, *position);
            let header = match record.header.splitn(3, '|').nth(2) {
                Some(rest) => format!("sp|{}|{}|{}", record.accession, token, rest),
                None => format!("sp|{}|{}|", record.accession, token),
            };
            entries.push(PtmEntry { header, sequence });
        }
    }
}
