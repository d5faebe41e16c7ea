use minivsfs_core::{MiniVsfsError, Result};

use crate::constants::*;
use crate::image::ImageBuffer;
use crate::structures::DirEntry;

/// Validate a directory-entry name: nonempty, at most 58 bytes, no NUL
/// byte, and not a reserved `.`/`..` entry.
pub fn validate_name(name: &str) -> Result<&[u8]> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(MiniVsfsError::Configuration(
            "directory entry name is empty".into(),
        ));
    }
    if bytes.len() > MAX_NAME_LEN {
        return Err(MiniVsfsError::Configuration(format!(
            "name {:?} is {} bytes, exceeds the {}-byte limit",
            name,
            bytes.len(),
            MAX_NAME_LEN
        )));
    }
    if bytes.contains(&0) {
        return Err(MiniVsfsError::Configuration(format!(
            "name {:?} contains a NUL byte",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(MiniVsfsError::Configuration(format!(
            "name {:?} is reserved",
            name
        )));
    }
    Ok(bytes)
}

impl ImageBuffer {
    /// Append one entry to a directory's data block at the next free slot.
    /// Callers are responsible for updating the parent inode's
    /// `size_bytes` afterward.
    pub fn append_dirent(
        &mut self,
        dir_block: u64,
        parent_size_bytes: u64,
        child_inum: u32,
        file_type: u8,
        name: &str,
    ) -> Result<()> {
        let slot = parent_size_bytes / DIRENT_SIZE;
        if slot as usize >= MAX_DIRENTS_PER_BLOCK {
            return Err(MiniVsfsError::DirectoryFull);
        }
        let name_bytes = validate_name(name)?;
        let entry = DirEntry::new(child_inum, file_type, name_bytes);
        let encoded = entry.encode();
        let block = self.block_mut(dir_block);
        let off = (slot * DIRENT_SIZE) as usize;
        block[off..off + DIRENT_SIZE as usize].copy_from_slice(&encoded);
        Ok(())
    }

    /// Decode every populated entry (`inode_no != 0`) in a directory block,
    /// pairing each with whether its XOR checksum verifies.
    pub fn list_dirents(&self, dir_block: u64, size_bytes: u64) -> Vec<(DirEntry, bool)> {
        let count = ((size_bytes / DIRENT_SIZE) as usize).min(MAX_DIRENTS_PER_BLOCK);
        let block = self.block(dir_block);
        let mut out = Vec::with_capacity(count);
        for slot in 0..count {
            let off = slot * DIRENT_SIZE as usize;
            let raw = &block[off..off + DIRENT_SIZE as usize];
            let entry = DirEntry::decode(raw);
            if entry.inode_no == 0 {
                continue;
            }
            let ok = DirEntry::stored_checksum(raw) == DirEntry::expected_checksum(raw);
            out.push((entry, ok));
        }
        out
    }
}
