use crate::generate::Generated;
use fnv::FnvHashSet;
use std::hash::Hash;

/// The three unresolved-case tables, each deduplicated independently in
/// first-seen order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MissingReport {
    /// (accession, 1-based site position, residue)
    pub ptms: Vec<(String, usize, u8)>,
    pub proteins: Vec<String>,
    /// (accession, peptide sequence)
    pub peptides: Vec<(String, String)>,
}

fn dedup<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = FnvHashSet::default();
    items
        .iter()
        .filter(|item| seen.insert((*item).clone()))
        .cloned()
        .collect()
}

impl MissingReport {
    pub fn from_generated(generated: &Generated) -> MissingReport {
        MissingReport {
            ptms: dedup(&generated.missing_ptms),
            proteins: dedup(&generated.missing_proteins),
            peptides: dedup(&generated.missing_peptides),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptms.is_empty() && self.proteins.is_empty() && self.peptides.is_empty()
    }
}
