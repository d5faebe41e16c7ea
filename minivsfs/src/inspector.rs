//! Read-only consistency inspection: verify every checksum an image
//! carries and summarize its free space and root directory contents.
//! Never mutates the image it inspects.

use minivsfs_core::Result;

use crate::constants::*;
use crate::image::ImageBuffer;
use crate::structures::Superblock;

#[derive(Debug)]
pub struct DirentReport {
    pub name: String,
    pub inode_no: u32,
    pub file_type: u8,
    pub checksum_ok: bool,
}

#[derive(Debug)]
pub struct InodeReport {
    pub inum: u32,
    pub crc_ok: bool,
    pub direct_ok: bool,
}

#[derive(Debug)]
pub struct Report {
    pub superblock: Superblock,
    pub free_inodes: u64,
    pub free_data_blocks: u64,
    pub root_entries: Vec<DirentReport>,
    pub inodes: Vec<InodeReport>,
}

impl Report {
    /// First problem found, if any, suitable for a single-line diagnostic.
    pub fn first_problem(&self) -> Option<String> {
        for inode in &self.inodes {
            if !inode.crc_ok {
                return Some(format!("inode {} has a bad checksum", inode.inum));
            }
            if !inode.direct_ok {
                return Some(format!("inode {} references an invalid direct block", inode.inum));
            }
        }
        for entry in &self.root_entries {
            if !entry.checksum_ok {
                return Some(format!("directory entry {:?} has a bad checksum", entry.name));
            }
        }
        None
    }

    pub fn is_consistent(&self) -> bool {
        self.first_problem().is_none()
    }
}

/// Load `image_bytes` read-only and produce a full consistency report.
pub fn inspect(image_bytes: Vec<u8>) -> Result<Report> {
    let (image, sb) = ImageBuffer::load(image_bytes)?;

    let free_inodes = crate::bitmap::count_free(image.inode_bitmap(), sb.inode_count);
    let free_data_blocks = crate::bitmap::count_free(image.data_bitmap(), sb.data_region_blocks);

    let root = image.read_inode(ROOT_INODE);
    let root_dir_block = root.direct[0] as u64;
    let root_entries = image
        .list_dirents(root_dir_block, root.size_bytes)
        .into_iter()
        .map(|(entry, ok)| DirentReport {
            name: entry.name_str(),
            inode_no: entry.inode_no,
            file_type: entry.file_type,
            checksum_ok: ok,
        })
        .collect();

    let mut inodes = Vec::new();
    for i in 0..sb.inode_count {
        if !crate::bitmap::get_bit(image.inode_bitmap(), i) {
            continue;
        }
        let inum = i as u32 + 1;
        let (inode, crc_ok) = image.read_inode_checked(inum);
        let direct_ok = inode.direct.iter().take(inode.blocks_used()).all(|&addr| {
            let addr = addr as u64;
            addr >= sb.data_region_start
                && addr < sb.total_blocks
                && crate::bitmap::get_bit(image.data_bitmap(), addr - sb.data_region_start)
        });
        inodes.push(InodeReport { inum, crc_ok, direct_ok });
    }

    Ok(Report {
        superblock: sb,
        free_inodes,
        free_data_blocks,
        root_entries,
        inodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adder::add_file;
    use crate::builder::{build, BuildParams};

    #[test]
    fn fresh_image_is_consistent() {
        let bytes = build(BuildParams { size_kib: 180, inode_count: 128 }).unwrap();
        let report = inspect(bytes).unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.root_entries.len(), 2);
        assert_eq!(report.free_inodes, report.superblock.inode_count - 1);
    }

    #[test]
    fn image_with_added_file_is_consistent() {
        let bytes = build(BuildParams { size_kib: 180, inode_count: 128 }).unwrap();
        let bytes = add_file(bytes, "a.txt", b"content").unwrap();
        let report = inspect(bytes).unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.root_entries.len(), 3);
        assert_eq!(report.free_data_blocks, report.superblock.data_region_blocks - 2);
    }

    #[test]
    fn flags_a_corrupted_directory_checksum() {
        let bytes = build(BuildParams { size_kib: 180, inode_count: 128 }).unwrap();
        let mut bytes = add_file(bytes, "a.txt", b"content").unwrap();
        let (image, sb) = ImageBuffer::load(bytes.clone()).unwrap();
        let root = image.read_inode(ROOT_INODE);
        let dir_block_start = (root.direct[0] * BLOCK_SIZE as u32) as usize;
        drop(image);
        // Flip a byte inside the second dirent's name field, leaving its
        // checksum stale.
        bytes[dir_block_start + DIRENT_SIZE as usize + 10] ^= 0xFF;
        let report = inspect(bytes).unwrap();
        assert!(!report.is_consistent());
        assert!(report.first_problem().unwrap().contains("checksum"));
        let _ = sb;
    }
}
