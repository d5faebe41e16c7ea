//! `mkfs-fsck` — read-only consistency inspector for a MiniVSFS image.
//! Never mutates the image and never writes an output file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use minivsfs::inspector::{inspect, Report};

#[derive(Parser)]
#[command(name = "mkfs-fsck", about = "Inspect a MiniVSFS image's consistency")]
struct Args {
    /// Path to the image to inspect
    #[arg(long, value_name = "PATH")]
    image: PathBuf,

    /// Print the decoded superblock, root directory entries, and per-inode status
    #[arg(short, long)]
    verbose: bool,
}

fn print_report(report: &Report, verbose: bool) {
    if verbose {
        println!(
            "superblock: total_blocks={} inode_count={} data_region_start={} data_region_blocks={}",
            report.superblock.total_blocks,
            report.superblock.inode_count,
            report.superblock.data_region_start,
            report.superblock.data_region_blocks,
        );
        println!(
            "free: {} inode(s), {} data block(s)",
            report.free_inodes, report.free_data_blocks
        );
        println!("root directory:");
        for entry in &report.root_entries {
            println!(
                "  inode={} type={} name={:?} checksum_ok={}",
                entry.inode_no, entry.file_type, entry.name, entry.checksum_ok
            );
        }
        println!("inodes:");
        for inode in &report.inodes {
            println!(
                "  inode={} crc_ok={} direct_ok={}",
                inode.inum, inode.crc_ok, inode.direct_ok
            );
        }
    }
    match report.first_problem() {
        Some(problem) => println!("INCONSISTENT: {}", problem),
        None => println!("OK: image is consistent"),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let bytes = match std::fs::read(&args.image) {
        Ok(b) => b,
        Err(e) => {
            error!("{}", e);
            eprintln!("mkfs-fsck: cannot read {:?}: {}", args.image, e);
            return ExitCode::from(2);
        }
    };

    let report = match inspect(bytes) {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e);
            eprintln!("mkfs-fsck: {}", e);
            return ExitCode::from(1);
        }
    };

    print_report(&report, args.verbose);
    if report.is_consistent() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}
