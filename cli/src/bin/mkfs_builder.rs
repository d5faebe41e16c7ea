//! `mkfs-builder` — synthesize a fresh MiniVSFS image.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use minivsfs::{build, BuildParams};
use minivsfs_core::MiniVsfsError;

#[derive(Parser)]
#[command(name = "mkfs-builder", about = "Build a fresh MiniVSFS image")]
struct Args {
    /// Path to write the new image to (truncated if it already exists)
    #[arg(long, value_name = "PATH")]
    image: PathBuf,

    /// Total image size in KiB (180..=4096, multiple of 4)
    #[arg(long, value_name = "N")]
    size_kib: u64,

    /// Inode table capacity (128..=512)
    #[arg(long, value_name = "M")]
    inodes: u64,
}

fn run(args: Args) -> Result<(), MiniVsfsError> {
    let bytes = build(BuildParams {
        size_kib: args.size_kib,
        inode_count: args.inodes,
    })?;
    std::fs::write(&args.image, &bytes)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{}", e);
            eprintln!("mkfs-builder: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
