use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn read_file_to_string(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

pub fn default_output_dir(source_dir: &Path) -> PathBuf {
    source_dir.join("_normalized")
}

/// Regular files in `dir` with the .ada suffix (case-insensitive),
/// sorted by name. Non-recursive.
pub fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("ada"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

pub fn print_help() {
    println!("Usage: adacase <SOURCE_DIR> [OPTIONS]");
    println!("       adacase <COMMAND> [ARGS]");
    println!("\nCommands:");
    println!("  lex <input>          Lex the input file and print tokens");
    println!("  map <input>          Print the identifier mapping built for the input file");
    println!("  fix <input>          Rewrite the input file and print the result");
    println!("\nOptions:");
    println!("  --out-dir <dir>      Output directory (default: <SOURCE_DIR>/_normalized)");
    println!("  --quiet              Suppress per-file progress output");
    println!("  --version            Show version information");
    println!("  --help               Show this help message");
}
