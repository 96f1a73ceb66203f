use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cmdforge")]
#[command(author, version, about = "Generate and run safe ffmpeg commands")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an ffmpeg command for an operation, optionally running it
    Generate {
        /// Operation: trim, convert, compress, extract_audio, scale, overlay, concat
        operation: String,

        /// Input file; repeat for concat
        #[arg(short, long = "input")]
        inputs: Vec<String>,

        /// Output file (derived from the input when omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Operation parameter as key=value; repeat a key to build a list
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Run the command after building it
        #[arg(short = 'x', long)]
        execute: bool,

        /// Execution timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Run a pre-built ffmpeg command line without a shell
    Run {
        /// Either one quoted command line or the arguments themselves
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Execution timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Look up reference documentation
    Docs {
        #[command(subcommand)]
        command: DocsCommands,
    },

    /// List operations and the parameters each accepts
    Operations,

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum DocsCommands {
    /// List documentation URLs for a category, or all of them
    Urls {
        /// ffmpeg, live_streaming, aws or all
        #[arg(default_value = "all")]
        category: String,
    },

    /// Fetch one documentation page as plain text
    Get {
        category: String,
        name: String,
    },

    /// Fetch any web page as plain text
    Fetch {
        /// Page URL
        url: String,
    },

    /// Search documentation pages for a term
    Search {
        term: String,

        /// Limit the search to one category
        #[arg(long)]
        category: Option<String>,
    },
}
