//! `mkfs-adder` — append one host file to the root directory of an
//! existing MiniVSFS image, writing the result to a new image.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use minivsfs::add_file;
use minivsfs_core::MiniVsfsError;

#[derive(Parser)]
#[command(name = "mkfs-adder", about = "Add a file to a MiniVSFS image")]
struct Args {
    /// Path to the existing image to read
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Path to write the resulting image to (truncated if it already exists)
    #[arg(long, value_name = "PATH")]
    output: PathBuf,

    /// Host file to embed in the image's root directory
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

fn run(args: Args) -> Result<(), MiniVsfsError> {
    let image_bytes = std::fs::read(&args.input)?;
    let file_bytes = std::fs::read(&args.file)?;
    let name = args
        .file
        .file_name()
        .ok_or_else(|| MiniVsfsError::Configuration(format!(
            "--file {:?} has no file name component",
            args.file
        )))?
        .to_string_lossy()
        .into_owned();

    let out = add_file(image_bytes, &name, &file_bytes)?;
    std::fs::write(&args.output, &out)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{}", e);
            eprintln!("mkfs-adder: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
