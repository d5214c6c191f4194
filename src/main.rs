use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

mod classify;
mod cli;
mod errors;
mod lexer;
mod mapping;
mod utils;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::Cli::from_args();

    if args.help {
        utils::print_help();
        return Ok(());
    }

    if args.version {
        println!("adacase version: {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match args.cmd.clone() {
        Some(cli::Command::Lex { input }) => {
            let src = utils::read_file_to_string(&input)?;
            for t in lexer::lex(&src) {
                println!("{:?}", t);
            }
        }
        Some(cli::Command::Map { input }) => {
            let src = utils::read_file_to_string(&input)?;
            let map = mapping::build_mapping(&src);
            for (canon, spelling) in map.iter_sorted() {
                println!("{} -> {}", canon, spelling);
            }
        }
        Some(cli::Command::Fix { input }) => {
            let src = utils::read_file_to_string(&input)?;
            print!("{}", mapping::normalize(&src));
        }
        Some(cli::Command::Help) => {
            utils::print_help();
        }
        None => match args.source_dir {
            Some(source_dir) => run_directory(&source_dir, args.out_dir, args.quiet)?,
            None => utils::print_help(),
        },
    }

    Ok(())
}

fn run_directory(source_dir: &Path, out_dir: Option<PathBuf>, quiet: bool) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(errors::NotADirectory::new(source_dir).into());
    }
    let out_dir = out_dir.unwrap_or_else(|| utils::default_output_dir(source_dir));
    for path in utils::list_source_files(source_dir)? {
        process_file(&path, &out_dir, quiet)?;
    }
    Ok(())
}

// Read, normalize and write a single .ada file.
fn process_file(path: &Path, out_dir: &Path, quiet: bool) -> Result<()> {
    let original = utils::read_file_to_string(path)?;
    let rewritten = mapping::normalize(&original);

    fs::create_dir_all(out_dir)?;
    let name = path
        .file_name()
        .with_context(|| format!("no file name in {}", path.display()))?;
    let out_path = out_dir.join(name);
    fs::write(&out_path, rewritten)?;
    if !quiet {
        println!("Processed {} -> {}", path.display(), out_path.display());
    }
    Ok(())
}
