pub mod fasta;
pub mod generate;
pub mod modification;
pub mod report;
pub mod site;

#[derive(Debug)]
pub enum Error {
    /// FASTA identifier line with fewer than two delimited fields
    MalformedHeader(String),
    /// PTM type accepted as input but with no extraction/annotation logic
    UnsupportedPtm(modification::PtmType),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader(header) => {
                write!(f, "malformed FASTA header, expected `db|accession|...`: {}", header)
            }
            Self::UnsupportedPtm(ptm) => {
                write!(f, "no site extraction logic implemented for {}", ptm)
            }
        }
    }
}

impl std::error::Error for Error {}
