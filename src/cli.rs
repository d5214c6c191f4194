use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "adacase",
    about = "Heuristic Ada identifier casing normalizer written in Rust"
)]
pub struct Cli {
    /// Directory containing .ada files to process when no subcommand is used
    /// Example: adacase ./sources --out-dir ./fixed
    /// Every .ada file in the directory (non-recursive) is rewritten into
    /// the output directory under the same name.
    pub source_dir: Option<PathBuf>,
    /// Output directory for rewritten files
    #[structopt(
        long = "out-dir",
        help = "Output directory for rewritten files (defaults to <source_dir>/_normalized)"
    )]
    pub out_dir: Option<PathBuf>,

    #[structopt(
        long = "quiet",
        short = "q",
        help = "Suppress per-file progress output"
    )]
    pub quiet: bool,

    #[structopt(long = "help", short = "h", help = "Show this help message")]
    pub help: bool,

    #[structopt(subcommand)]
    pub cmd: Option<Command>,

    #[structopt(long = "version", short = "v", help = "Show version information")]
    pub version: bool,
}

#[derive(Debug, StructOpt, Clone)]
pub enum Command {
    /// Lex only: dump tokens
    Lex {
        /// Input .ada file
        input: PathBuf,
    },
    /// Show the identifier mapping built for a single file
    Map {
        /// Input .ada file
        input: PathBuf,
    },
    /// Rewrite a single file and print the result to stdout
    Fix {
        /// Input .ada file
        input: PathBuf,
    },
    Help,
}
