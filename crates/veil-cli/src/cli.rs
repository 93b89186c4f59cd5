use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Test-set sampling and transcript anonymization for audio corpora", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "VEIL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stream a corpus and keep a uniform random test set on disk
    Sample(SampleArgs),

    /// List the artifacts currently in the test set directory
    Inspect {
        /// Test set directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Anonymize a transcript and produce its audio redaction schedule
    Redact(RedactArgs),
}

#[derive(Args)]
pub struct SampleArgs {
    /// Corpus source (dir:path, glob:pattern, or a directory path)
    #[arg(long)]
    pub source: String,

    /// Test set directory (default from config)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Number of items to keep (default from config: 5)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Random seed (default from config: 42)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum artifact size in bytes
    #[arg(long)]
    pub max_bytes: Option<u64>,

    /// Pause between items, in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Only read files with this extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Stop after this many source files
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Skip the extra trial for the last item
    #[arg(long)]
    pub no_finalize: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
#[command(group(clap::ArgGroup::new("phrase_input").required(true).args(["phrases", "detector_output"])))]
pub struct RedactArgs {
    /// Transcript JSON: [{"word", "start", "end"}, ...]
    #[arg(long)]
    pub transcript: PathBuf,

    /// File with one flagged phrase per line
    #[arg(long)]
    pub phrases: Option<PathBuf>,

    /// Raw comma-separated detector output
    #[arg(long)]
    pub detector_output: Option<String>,

    /// Directory for the anonymized text and schedule
    #[arg(long, default_value = "data/anonymized")]
    pub output: PathBuf,

    /// Recording the transcript belongs to; writes its interval file
    #[arg(long)]
    pub recording: Option<PathBuf>,

    /// Print the schedule as JSON
    #[arg(long)]
    pub json: bool,
}
