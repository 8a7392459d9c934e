pub mod process;
pub mod tree;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tabgraph_core::ProvenanceDetail;

#[derive(Parser)]
#[command(
    name = "tbg",
    about = "Turn study-cohort table extractions into relation records",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write relation records
    Process(ProcessArgs),
    /// Reconstruct the table trees and write them as JSON
    Tree(TreeArgs),
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Extraction JSON produced by the upstream PDF step
    pub input: PathBuf,
    /// Output path; generated from the input name and time when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// How much cell provenance to attach to emitted nodes
    #[arg(long, value_enum, default_value_t = Provenance::Full)]
    pub provenance: Provenance,
    /// Review side file from the correction GUI to apply first
    #[arg(long)]
    pub review: Option<PathBuf>,
    /// JSON key file enabling the external concept lookup
    #[arg(long)]
    pub key_file: Option<PathBuf>,
    /// Comma-separated ontology acronyms, in ranking priority order
    #[arg(long, value_delimiter = ',')]
    pub ontologies: Vec<String>,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Extraction JSON produced by the upstream PDF step
    pub input: PathBuf,
    /// Output path; generated from the input name and time when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Review side file from the correction GUI to apply first
    #[arg(long)]
    pub review: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provenance {
    Off,
    Compact,
    Full,
}

impl From<Provenance> for ProvenanceDetail {
    fn from(p: Provenance) -> Self {
        match p {
            Provenance::Off => Self::Off,
            Provenance::Compact => Self::Compact,
            Provenance::Full => Self::Full,
        }
    }
}

/// Derive `<dir>/<prefix><stem>_<timestamp>.json` from the input path.
pub fn generated_output(input: &std::path::Path, prefix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H.%M.%S");
    let name = format!("{prefix}{stem}_{stamp}.json");
    input.with_file_name(name)
}
