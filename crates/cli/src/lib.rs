mod generate;
mod schema;

pub use generate::Snapshot;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "xcbridge",
    version,
    about = "Generates IDE project documents from a build-tool rule graph",
    long_about = "xcbridge turns a snapshot of discovered build rules into a project document \
                  with one build target per top-level rule, source indexers, host linkage and \
                  a clean utility target."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one generation pass over a rule snapshot
    #[command(
        long_about = "Reads a JSON snapshot (generation request plus global options), runs a \
                            complete generation pass and writes the project document as JSON. \
                            Nothing is written when the pass fails."
    )]
    Generate {
        /// Path to the JSON snapshot
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Where to write the document. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also log to stderr
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the JSON Schema of the snapshot format
    Schema,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let to_stderr = matches!(cli.command, Commands::Generate { verbose: true, .. });
    let _guard = xcbridge_core::logging::init_logging("cli", to_stderr);

    match cli.command {
        Commands::Generate {
            snapshot, output, ..
        } => generate::run(&snapshot, output.as_deref()),
        Commands::Schema => schema::run(),
    }
}
