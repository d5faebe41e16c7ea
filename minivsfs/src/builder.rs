//! The builder pipeline: plan a layout, then write a superblock, bitmaps,
//! an empty inode table, and a root directory containing only `.`/`..`.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use minivsfs_core::Result;

use crate::constants::*;
use crate::image::ImageBuffer;
use crate::layout::Layout;
use crate::structures::{DirEntry, Inode, Superblock};

#[derive(Debug, Clone, Copy)]
pub struct BuildParams {
    pub size_kib: u64,
    pub inode_count: u64,
}

pub(crate) fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Run the builder pipeline and return the finished image bytes.
pub fn build(params: BuildParams) -> Result<Vec<u8>> {
    let layout = Layout::plan(params.size_kib, params.inode_count)?;
    debug!(
        "planned layout: total_blocks={} inode_table_blocks={} data_region_start={} data_region_blocks={}",
        layout.total_blocks, layout.inode_table_blocks, layout.data_region_start, layout.data_region_blocks
    );

    let mut image = ImageBuffer::zeroed(layout);
    let now = now_epoch();

    let sb = Superblock {
        magic: SUPERBLOCK_MAGIC,
        version: SUPERBLOCK_VERSION,
        block_size: BLOCK_SIZE as u32,
        total_blocks: layout.total_blocks,
        inode_count: layout.inode_count,
        inode_bitmap_start: INODE_BITMAP_START,
        inode_bitmap_blocks: INODE_BITMAP_BLOCKS,
        data_bitmap_start: DATA_BITMAP_START,
        data_bitmap_blocks: DATA_BITMAP_BLOCKS,
        inode_table_start: INODE_TABLE_START,
        inode_table_blocks: layout.inode_table_blocks,
        data_region_start: layout.data_region_start,
        data_region_blocks: layout.data_region_blocks,
        root_inode: ROOT_INODE as u64,
        mtime_epoch: now,
        flags: 0,
        checksum: 0,
    };
    image.write_superblock(&sb);
    debug!("wrote superblock, checksum computed over bytes 0..4091");

    crate::bitmap::set_bit(image.inode_bitmap_mut(), 0);
    crate::bitmap::set_bit(image.data_bitmap_mut(), 0);
    debug!("marked the root inode and its directory block allocated");

    let mut direct = [0u32; DIRECT_PER_INODE];
    direct[0] = layout.data_region_start as u32;
    let root_inode = Inode {
        mode: MODE_DIR,
        links: 2,
        uid: 0,
        gid: 0,
        size_bytes: 2 * DIRENT_SIZE,
        atime: now,
        mtime: now,
        ctime: now,
        direct,
        proj_id: 0,
        uid16_gid16: 0,
        xattr_ptr: 0,
    };
    image.write_inode(ROOT_INODE, &root_inode)?;
    debug!("wrote root inode: direct[0]={}", layout.data_region_start);

    let dot = DirEntry::new(ROOT_INODE, DIRENT_TYPE_DIR, b".");
    let dotdot = DirEntry::new(ROOT_INODE, DIRENT_TYPE_DIR, b"..");
    let block = image.block_mut(layout.data_region_start);
    block[0..DIRENT_SIZE as usize].copy_from_slice(&dot.encode());
    block[DIRENT_SIZE as usize..2 * DIRENT_SIZE as usize].copy_from_slice(&dotdot.encode());
    debug!("wrote . and .. into root directory block {}", layout.data_region_start);

    info!(
        "built {}-byte image: {} inode(s), data region starts at block {}",
        layout.image_bytes(),
        layout.inode_count,
        layout.data_region_start
    );
    Ok(image.into_bytes())
}
