use clap::{Arg, Command, ValueHint};
use ptmdb_cli::input::Input;
use ptmdb_cli::runner::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("PTMDB_LOG", "error,ptmdb=info"))
        .init();

    let matches = Command::new("ptmdb")
        .version(clap::crate_version!())
        .about("\u{1F9EC} ptmdb - generate PTM proteoform FASTA databases from peptide search results")
        .arg(
            Arg::new("parameters")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to configuration parameters (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("fasta")
                .short('f')
                .long("fasta")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the reference FASTA database. Overrides the FASTA \
                     file specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("peptide_table")
                .short('p')
                .long("peptide-table")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the peptide search results table (TSV). Overrides \
                     the table specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_directory")
                .short('o')
                .long("output_directory")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path where the generated database and missing-info report \
                     will be written. Overrides the directory specified in the \
                     configuration file.",
                )
                .value_hint(ValueHint::DirPath),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let input = Input::from_arguments(matches)?;
    let runner = input.build().and_then(Runner::new)?;
    runner.run()?;

    Ok(())
}
