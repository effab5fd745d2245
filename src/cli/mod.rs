//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mediaseek",
    version,
    author = "neur0map",
    about = "Hybrid keyword + semantic search over media transcripts",
    long_about = "Mediaseek searches timestamped transcript segments with a blend of exact keyword \
                  matching and embedding similarity, suppresses near-duplicate hits from the same \
                  file, and prints ranked snippets with their time ranges."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/mediaseek/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply (e.g., "diagnostic")
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the corpus
    Query {
        /// Search query text
        query: String,

        /// Override the configured maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build corpus artifacts
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Measure precision@K over labelled queries
    Eval {
        /// JSON file of {"q": ..., "expect": [...]} cases
        queries: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Build the search index from transcript files
    Build {
        /// Transcript directory (defaults to corpus.transcripts_dir)
        #[arg(short, long)]
        transcripts: Option<PathBuf>,

        /// Output index file (defaults to corpus.index_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode every segment with the configured model
    Embed,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
