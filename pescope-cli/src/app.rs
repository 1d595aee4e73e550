use std::path::PathBuf;

use clap::Parser;

/// pescope - decode and dump Windows PE/COFF executables
#[derive(Debug, Parser)]
#[command(name = "pescope", version, about, long_about = None)]
pub struct Cli {
    /// PE files to decode, in order. Stops at the first file that fails.
    #[arg(value_name = "FILE", required = true)]
    pub paths: Vec<PathBuf>,

    /// Print a compact tabular overview instead of the full decoded structure.
    #[arg(short, long)]
    pub summary: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}
