use std::{fmt::Display, str::FromStr};

use serde::{de::Visitor, Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PtmType {
    Phosphorylation,
    Acetylation,
    Ubiquitination,
    NLinkedGlycosylation,
    OLinkedGlycosylation,
}

impl PtmType {
    /// Suffix appended to `{residue}{position}` site annotation tokens,
    /// e.g. `S42P` or `N187nG`
    pub fn token_suffix(&self) -> &'static str {
        match self {
            PtmType::Phosphorylation => "P",
            PtmType::Acetylation => "A",
            PtmType::Ubiquitination => "U",
            PtmType::NLinkedGlycosylation => "nG",
            PtmType::OLinkedGlycosylation => "oG",
        }
    }

    /// Marker spliced into the protein sequence after the modified residue
    pub fn sequence_marker(&self) -> &'static str {
        match self {
            PtmType::Phosphorylation => "(P)",
            PtmType::Acetylation => "(A)",
            PtmType::Ubiquitination => "(U)",
            PtmType::NLinkedGlycosylation => "(nG)",
            PtmType::OLinkedGlycosylation => "(oG)",
        }
    }

    /// Residues on which this PTM type is chemically plausible.
    /// Acetylation, ubiquitination and O-linked glycosylation have no
    /// documented residue rules in the upstream search exports; they
    /// retain no sites here and are rejected by the generator instead.
    pub fn residue_allowed(&self, residue: u8) -> bool {
        match self {
            PtmType::Phosphorylation => matches!(residue, b'S' | b'T' | b'Y'),
            PtmType::NLinkedGlycosylation => residue == b'N',
            _ => false,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            PtmType::Phosphorylation | PtmType::NLinkedGlycosylation
        )
    }
}

impl Display for PtmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PtmType::Phosphorylation => "Phosphorylation",
            PtmType::Acetylation => "Acetylation",
            PtmType::Ubiquitination => "Ubiquitination",
            PtmType::NLinkedGlycosylation => "N-linked Glycosylation",
            PtmType::OLinkedGlycosylation => "O-linked Glycosylation",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidPtmType(String);

impl Display for InvalidPtmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized PTM type: {}", self.0)
    }
}

impl FromStr for PtmType {
    type Err = InvalidPtmType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Phosphorylation" => Ok(PtmType::Phosphorylation),
            "Acetylation" => Ok(PtmType::Acetylation),
            "Ubiquitination" => Ok(PtmType::Ubiquitination),
            "N-linked Glycosylation" => Ok(PtmType::NLinkedGlycosylation),
            "O-linked Glycosylation" => Ok(PtmType::OLinkedGlycosylation),
            _ => Err(InvalidPtmType(s.into())),
        }
    }
}

impl Serialize for PtmType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PtmType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl Visitor<'_> for V {
            type Value = PtmType;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a PTM type name, e.g. \"Phosphorylation\"")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<PtmType, E> {
                v.parse().map_err(E::custom)
            }
        }
        deserializer.deserialize_str(V)
    }
}

/// A modification site local to a peptide
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModificationSite {
    pub residue: u8,
    /// 0-based index of the annotated residue within the peptide sequence
    pub position: usize,
}

/// Parser for the inline bracket-annotated modification micro-format
/// emitted by upstream search tools. The format is undocumented and
/// version-specific, so it lives behind this seam.
pub trait ModificationStringParser {
    fn extract(&self, modifications: &str, ptm_type: PtmType) -> Vec<ModificationSite>;
}

/// Default parser for the convention inherited from FragPipe/MS-PyCloud
/// exports: each modified residue is immediately followed by a bracketed
/// annotation, e.g. `AS[79.9663]TS[79.9663]K`.
#[derive(Copy, Clone, Debug, Default)]
pub struct BracketParser;

impl ModificationStringParser for BracketParser {
    fn extract(&self, modifications: &str, ptm_type: PtmType) -> Vec<ModificationSite> {
        let mut sites = Vec::new();
        let mut rest = modifications;
        // Running offset into the peptide: bracket contents do not count,
        // so each consumed prefix advances the counter by its pre-bracket
        // length only.
        let mut offset = 0;
        while let Some(start) = rest.find('[') {
            let end = match rest.find(']') {
                Some(end) if end > start => end,
                _ => break,
            };
            if start > 0 {
                let residue = rest.as_bytes()[start - 1];
                if ptm_type.residue_allowed(residue) {
                    sites.push(ModificationSite {
                        residue,
                        position: offset + start - 1,
                    });
                }
            }
            rest = &rest[end + 1..];
            offset += start;
        }
        sites
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_ptm_types() {
        assert_eq!(
            "N-linked Glycosylation".parse(),
            Ok(PtmType::NLinkedGlycosylation)
        );
        assert_eq!("Phosphorylation".parse(), Ok(PtmType::Phosphorylation));
        assert!("phospho".parse::<PtmType>().is_err());
    }

    #[test]
    fn extract_single_site() {
        let sites = BracketParser.extract("S[79.9663]TY", PtmType::Phosphorylation);
        assert_eq!(
            sites,
            vec![ModificationSite {
                residue: b'S',
                position: 0
            }]
        );
    }

    #[test]
    fn extract_accumulates_offsets() {
        // Peptide ASTSK, phosphorylated at both serines
        let sites = BracketParser.extract("AS[79.9663]TS[79.9663]K", PtmType::Phosphorylation);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].position, 1);
        assert_eq!(sites[1].position, 3);
        assert!(sites.iter().all(|s| s.residue == b'S'));
    }

    #[test]
    fn extract_filters_residues() {
        // K is not phosphorylatable, Y is
        let sites = BracketParser.extract("K[42.0106]AY[79.9663]", PtmType::Phosphorylation);
        assert_eq!(
            sites,
            vec![ModificationSite {
                residue: b'Y',
                position: 2
            }]
        );
    }

    #[test]
    fn extract_unsupported_type_is_empty() {
        assert!(BracketParser
            .extract("K[42.0106]R", PtmType::Acetylation)
            .is_empty());
    }

    #[test]
    fn extract_tolerates_malformed_annotations() {
        assert!(BracketParser
            .extract("[79.9663]STY", PtmType::Phosphorylation)
            .is_empty());
        assert!(BracketParser
            .extract("S[79.9663", PtmType::Phosphorylation)
            .is_empty());
    }
}
