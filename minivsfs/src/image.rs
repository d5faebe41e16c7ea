use minivsfs_core::{MiniVsfsError, Result};

use crate::constants::*;
use crate::layout::Layout;
use crate::structures::{Inode, Superblock};

/// Owns an entire MiniVSFS image as one contiguous buffer. Every other
/// component borrows a short-lived view into it rather than holding its
/// own copy of any region.
pub struct ImageBuffer {
    pub(crate) layout: Layout,
    pub(crate) data: Vec<u8>,
}

impl ImageBuffer {
    /// Allocate a zeroed buffer sized to `layout.image_bytes()`.
    pub fn zeroed(layout: Layout) -> Self {
        Self {
            data: vec![0u8; layout.image_bytes() as usize],
            layout,
        }
    }

    /// Load and validate an existing image already read from disk:
    /// checks its size, magic, version, block size, and superblock checksum.
    pub fn load(data: Vec<u8>) -> Result<(Self, Superblock)> {
        if data.is_empty() || data.len() as u64 % BLOCK_SIZE != 0 {
            return Err(MiniVsfsError::BadImage(format!(
                "image size {} is not a positive multiple of {} bytes",
                data.len(),
                BLOCK_SIZE
            )));
        }
        let sb = Superblock::decode(&data[0..BLOCK_SIZE as usize]);
        if sb.magic != SUPERBLOCK_MAGIC {
            return Err(MiniVsfsError::BadImage(format!(
                "bad magic 0x{:08X}, expected 0x{:08X}",
                sb.magic, SUPERBLOCK_MAGIC
            )));
        }
        if sb.version != SUPERBLOCK_VERSION {
            return Err(MiniVsfsError::BadImage(format!(
                "unsupported superblock version {}",
                sb.version
            )));
        }
        if sb.block_size as u64 != BLOCK_SIZE {
            return Err(MiniVsfsError::BadImage(format!(
                "unexpected block size {}",
                sb.block_size
            )));
        }
        let expected = Superblock::checksum_of(&data[0..BLOCK_SIZE as usize]);
        if expected != sb.checksum {
            return Err(MiniVsfsError::BadImage(format!(
                "superblock checksum mismatch: stored 0x{:08X}, computed 0x{:08X}",
                sb.checksum, expected
            )));
        }

        let layout = Layout {
            total_blocks: sb.total_blocks,
            inode_count: sb.inode_count,
            inode_table_blocks: sb.inode_table_blocks,
            data_region_start: sb.data_region_start,
            data_region_blocks: sb.data_region_blocks,
        };
        if layout.image_bytes() != data.len() as u64 {
            return Err(MiniVsfsError::BadImage(format!(
                "superblock total_blocks implies a {}-byte image, file is {} bytes",
                layout.image_bytes(),
                data.len()
            )));
        }

        Ok((Self { layout, data }, sb))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn block(&self, n: u64) -> &[u8] {
        let start = (n * BLOCK_SIZE) as usize;
        &self.data[start..start + BLOCK_SIZE as usize]
    }

    pub fn block_mut(&mut self, n: u64) -> &mut [u8] {
        let start = (n * BLOCK_SIZE) as usize;
        &mut self.data[start..start + BLOCK_SIZE as usize]
    }

    pub fn inode_bitmap(&self) -> &[u8] {
        self.block(INODE_BITMAP_START)
    }

    pub fn inode_bitmap_mut(&mut self) -> &mut [u8] {
        self.block_mut(INODE_BITMAP_START)
    }

    pub fn data_bitmap(&self) -> &[u8] {
        self.block(DATA_BITMAP_START)
    }

    pub fn data_bitmap_mut(&mut self) -> &mut [u8] {
        self.block_mut(DATA_BITMAP_START)
    }

    /// Byte offset of a 1-based inode number's 128-byte slot.
    fn inode_slot_offset(&self, inum: u32) -> usize {
        (INODE_TABLE_START * BLOCK_SIZE) as usize + (inum as usize - 1) * INODE_SIZE as usize
    }

    pub fn read_inode(&self, inum: u32) -> Inode {
        let off = self.inode_slot_offset(inum);
        Inode::decode(&self.data[off..off + INODE_SIZE as usize])
    }

    /// Read an inode along with whether its stored CRC matches its contents.
    pub fn read_inode_checked(&self, inum: u32) -> (Inode, bool) {
        let off = self.inode_slot_offset(inum);
        let raw = &self.data[off..off + INODE_SIZE as usize];
        let ok = Inode::stored_crc(raw) == Inode::expected_crc(raw);
        (Inode::decode(raw), ok)
    }

    /// Encode `inode`, recomputing its CRC, and store it at `inum`'s slot.
    pub fn write_inode(&mut self, inum: u32, inode: &Inode) -> Result<()> {
        if inode.size_bytes > DIRECT_PER_INODE as u64 * BLOCK_SIZE {
            return Err(MiniVsfsError::Configuration(format!(
                "inode {} size {} exceeds {} direct block(s) of capacity",
                inum, inode.size_bytes, DIRECT_PER_INODE
            )));
        }
        for &addr in inode.direct.iter().filter(|&&a| a != 0) {
            let addr = addr as u64;
            if addr < self.layout.data_region_start || addr >= self.layout.total_blocks {
                return Err(MiniVsfsError::Configuration(format!(
                    "inode {} direct block {} lies outside the data region",
                    inum, addr
                )));
            }
        }
        let encoded = inode.encode();
        let off = self.inode_slot_offset(inum);
        self.data[off..off + INODE_SIZE as usize].copy_from_slice(&encoded);
        Ok(())
    }

    pub fn write_superblock(&mut self, sb: &Superblock) {
        let encoded = sb.encode_block();
        self.data[0..BLOCK_SIZE as usize].copy_from_slice(&encoded);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
