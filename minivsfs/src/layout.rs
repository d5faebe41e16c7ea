use minivsfs_core::{MiniVsfsError, Result};

use crate::constants::*;

/// Round `a` up to the next multiple of `b`.
pub(crate) fn ceil_div(a: u64, b: u64) -> u64 {
    (a + b - 1) / b
}

/// Derived, immutable layout of a MiniVSFS image: how many blocks each
/// region occupies and where the data region begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub total_blocks: u64,
    pub inode_count: u64,
    pub inode_table_blocks: u64,
    pub data_region_start: u64,
    pub data_region_blocks: u64,
}

impl Layout {
    /// Plan a layout from a requested image size and inode capacity,
    /// rejecting anything outside the supported ranges.
    pub fn plan(size_kib: u64, inode_count: u64) -> Result<Self> {
        if size_kib < MIN_SIZE_KIB || size_kib > MAX_SIZE_KIB {
            return Err(MiniVsfsError::Configuration(format!(
                "size-kib {} out of range [{}, {}]",
                size_kib, MIN_SIZE_KIB, MAX_SIZE_KIB
            )));
        }
        if size_kib % 4 != 0 {
            return Err(MiniVsfsError::Configuration(format!(
                "size-kib {} is not a multiple of 4",
                size_kib
            )));
        }
        if inode_count < MIN_INODES || inode_count > MAX_INODES {
            return Err(MiniVsfsError::Configuration(format!(
                "inode count {} out of range [{}, {}]",
                inode_count, MIN_INODES, MAX_INODES
            )));
        }

        let total_blocks = size_kib * 1024 / BLOCK_SIZE;
        let inode_table_blocks = ceil_div(inode_count * INODE_SIZE, BLOCK_SIZE);
        let data_region_start = INODE_TABLE_START + inode_table_blocks;

        if data_region_start >= total_blocks {
            return Err(MiniVsfsError::Configuration(format!(
                "inode table of {} block(s) leaves no room for a data region in {} total blocks",
                inode_table_blocks, total_blocks
            )));
        }
        let data_region_blocks = total_blocks - data_region_start;

        Ok(Self {
            total_blocks,
            inode_count,
            inode_table_blocks,
            data_region_start,
            data_region_blocks,
        })
    }

    pub fn image_bytes(&self) -> u64 {
        self.total_blocks * BLOCK_SIZE
    }
}
