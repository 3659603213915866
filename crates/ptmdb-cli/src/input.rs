use anyhow::{ensure, Context};
use clap::ArgMatches;
use ptmdb_core::modification::PtmType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolved run settings - may include overrides or defaults not set by
/// the user. Serialized to the output directory as a run record.
#[derive(Serialize, Clone)]
pub struct Settings {
    pub version: String,
    pub fasta: String,
    pub peptide_table: String,
    pub ptm_types: Vec<PtmType>,
    /// Optional curated proteoform libraries, per PTM type
    pub ptm_libraries: HashMap<PtmType, String>,
    pub include_global_entries: bool,
    pub chunk_size: Option<usize>,

    #[serde(skip_serializing)]
    pub output_directory: PathBuf,

    #[serde(skip_serializing)]
    pub archive: Option<ArchiveSettings>,
}

/// Input parameters deserialized from the JSON file
#[derive(Deserialize)]
pub struct Input {
    fasta: Option<String>,
    peptide_table: Option<String>,
    ptm_types: Option<Vec<PtmType>>,
    ptm_libraries: Option<HashMap<PtmType, String>>,
    include_global_entries: Option<bool>,
    chunk_size: Option<usize>,
    output_directory: Option<String>,
    archive: Option<ArchiveOptions>,
}

#[derive(Deserialize, Debug)]
pub struct ArchiveOptions {
    root: String,
    username: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ArchiveSettings {
    pub root: PathBuf,
    pub username: String,
}

impl From<ArchiveOptions> for ArchiveSettings {
    fn from(value: ArchiveOptions) -> Self {
        ArchiveSettings {
            root: value.root.into(),
            username: value.username.unwrap_or_else(|| "anonymous".into()),
        }
    }
}

impl Input {
    pub fn from_arguments(matches: ArgMatches) -> anyhow::Result<Self> {
        let path = matches
            .get_one::<String>("parameters")
            .expect("required parameters");
        let mut input = Input::load(path)
            .with_context(|| format!("Failed to read parameters from `{path}`"))?;

        // Handle JSON configuration overrides
        if let Some(fasta) = matches.get_one::<String>("fasta") {
            log::trace!("overriding `fasta` parameter.");
            input.fasta = Some(fasta.into());
        }
        if let Some(table) = matches.get_one::<String>("peptide_table") {
            log::trace!("overriding `peptide_table` parameter.");
            input.peptide_table = Some(table.into());
        }
        if let Some(output_directory) = matches.get_one::<String>("output_directory") {
            log::trace!("overriding `output_directory` parameter.");
            input.output_directory = Some(output_directory.into());
        }

        ensure!(
            input.fasta.is_some(),
            "`fasta` must be set. For more information try '--help'"
        );
        ensure!(
            input.peptide_table.is_some(),
            "`peptide_table` must be set. For more information try '--help'"
        );
        ensure!(
            input.output_directory.is_some(),
            "`output_directory` must be set. For more information try '--help'"
        );

        Ok(input)
    }

    pub fn load<S: AsRef<str>>(path: S) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&contents).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Settings> {
        let ptm_types = self.ptm_types.unwrap_or_default();
        ensure!(
            !ptm_types.is_empty(),
            "`ptm_types` must list at least one PTM type to process"
        );
        for ptm in &ptm_types {
            if !ptm.is_supported() {
                log::warn!("{} has no site extraction logic; the run will abort", ptm);
            }
        }

        let output_directory =
            PathBuf::from(self.output_directory.expect("ensured by from_arguments"));
        std::fs::create_dir_all(&output_directory).with_context(|| {
            format!(
                "Failed to create output directory `{}`",
                output_directory.display()
            )
        })?;

        Ok(Settings {
            version: clap::crate_version!().into(),
            fasta: self.fasta.expect("ensured by from_arguments"),
            peptide_table: self.peptide_table.expect("ensured by from_arguments"),
            ptm_types,
            ptm_libraries: self.ptm_libraries.unwrap_or_default(),
            include_global_entries: self.include_global_entries.unwrap_or(false),
            chunk_size: self.chunk_size,
            output_directory,
            archive: self.archive.map(Into::into),
        })
    }
}
