use crate::modification::ModificationSite;

/// Find the first occurrence of a peptide within a protein sequence.
/// Returns the 0-based start index, or None if the peptide does not
/// occur verbatim.
pub fn locate(protein: &str, peptide: &str) -> Option<usize> {
    protein.find(peptide)
}

/// Strip a trailing modification delimiter from a peptide sequence,
/// e.g. `LNNSR-HexNAc` scans as `LNNSR`
pub fn clean_peptide(peptide: &str) -> &str {
    peptide.split('-').next().unwrap_or(peptide)
}

/// Scan a peptide for N-glycosylation sequons: N-X-S/T with X != P
pub fn find_sequons(peptide: &str) -> Vec<ModificationSite> {
    let bytes = peptide.as_bytes();
    let mut sites = Vec::new();
    for i in 0..bytes.len().saturating_sub(2) {
        if bytes[i] == b'N' && bytes[i + 1] != b'P' && matches!(bytes[i + 2], b'S' | b'T') {
            sites.push(ModificationSite {
                residue: b'N',
                position: i,
            });
        }
    }
    sites
}

/// 1-based position of a peptide-local site within the full protein
pub fn absolute_position(peptide_start: usize, local_position: usize) -> usize {
    peptide_start + local_position + 1
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn locate_first_occurrence() {
        assert_eq!(locate("MAKSTYNGS", "STY"), Some(3));
        assert_eq!(locate("MAKSTYNGS", "QQQ"), None);
        // repeated substring resolves to the first match
        assert_eq!(locate("AStySTYASTY", "STY"), Some(4));
    }

    #[test]
    fn sequon_scan() {
        // N-G-S qualifies
        assert_eq!(
            find_sequons("MAKNGS"),
            vec![ModificationSite {
                residue: b'N',
                position: 3
            }]
        );
        // proline at X disqualifies
        assert!(find_sequons("MAKNPS").is_empty());
        // third residue must be S or T
        assert!(find_sequons("MAKNGA").is_empty());
        // trailing N without room for a sequon
        assert!(find_sequons("NS").is_empty());
    }

    #[test]
    fn overlapping_sequons() {
        // NNSS: N at 0 (X=N, S at 2) and N at 1 (X=S, S at 3)
        let sites = find_sequons("NNSS");
        assert_eq!(sites.iter().map(|s| s.position).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn clean_peptide_truncates_at_delimiter() {
        assert_eq!(clean_peptide("LNNSR-HexNAc"), "LNNSR");
        assert_eq!(clean_peptide("LNNSR"), "LNNSR");
    }

    #[quickcheck]
    fn sequon_sites_satisfy_motif(peptide: String) {
        let peptide: String = peptide
            .chars()
            .filter(|c| c.is_ascii_uppercase())
            .collect();
        let bytes = peptide.as_bytes();
        for site in find_sequons(&peptide) {
            assert_eq!(site.residue, b'N');
            assert_eq!(bytes[site.position], b'N');
            assert_ne!(bytes[site.position + 1], b'P');
            assert!(matches!(bytes[site.position + 2], b'S' | b'T'));
        }
    }
}
