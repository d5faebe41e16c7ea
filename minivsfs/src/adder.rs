//! The adder pipeline: embed one host file into the root directory of an
//! already-built image, producing a new image. The input image is never
//! mutated in place.

use log::{debug, info};
use minivsfs_core::{MiniVsfsError, Result};

use crate::builder::now_epoch;
use crate::constants::*;
use crate::image::ImageBuffer;
use crate::layout::ceil_div;
use crate::structures::{Inode, Superblock};

/// Truncate `name` to at most 58 bytes, on a UTF-8 boundary.
fn truncate_name(name: &str) -> String {
    if name.as_bytes().len() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Run the adder pipeline: load `image_bytes`, embed `file_bytes` under
/// `file_name` in the root directory, and return the mutated image.
pub fn add_file(image_bytes: Vec<u8>, file_name: &str, file_bytes: &[u8]) -> Result<Vec<u8>> {
    let (mut image, _sb) = ImageBuffer::load(image_bytes)?;
    debug!("loaded and validated input image");

    let blocks_needed = ceil_div(file_bytes.len() as u64, BLOCK_SIZE);
    if blocks_needed > DIRECT_PER_INODE as u64 {
        return Err(MiniVsfsError::FileTooLarge {
            size: file_bytes.len() as u64,
            blocks_needed,
            max_blocks: DIRECT_PER_INODE as u64,
        });
    }

    let child_inum = image.allocate_inode()?;
    debug!("allocated inode {}", child_inum);

    let addrs = image.allocate_data_blocks(blocks_needed)?;
    debug!("allocated {} data block(s): {:?}", blocks_needed, addrs);

    for (i, &addr) in addrs.iter().enumerate() {
        let start = i * BLOCK_SIZE as usize;
        let end = (start + BLOCK_SIZE as usize).min(file_bytes.len());
        let block = image.block_mut(addr);
        block[..end - start].copy_from_slice(&file_bytes[start..end]);
        if end - start < BLOCK_SIZE as usize {
            block[end - start..].fill(0);
        }
    }

    let now = now_epoch();
    let mut direct = [0u32; DIRECT_PER_INODE];
    for (slot, &addr) in addrs.iter().enumerate() {
        direct[slot] = addr as u32;
    }
    let child_inode = Inode {
        mode: MODE_REG,
        links: 1,
        uid: 0,
        gid: 0,
        size_bytes: file_bytes.len() as u64,
        atime: now,
        mtime: now,
        ctime: now,
        direct,
        proj_id: 0,
        uid16_gid16: 0,
        xattr_ptr: 0,
    };
    image.write_inode(child_inum, &child_inode)?;
    debug!(
        "wrote child inode {}: size={} direct={:?}",
        child_inum,
        file_bytes.len(),
        &direct[..blocks_needed as usize]
    );

    let name = truncate_name(file_name);
    let root = image.read_inode(ROOT_INODE);
    let root_dir_block = root.direct[0] as u64;
    image.append_dirent(root_dir_block, root.size_bytes, child_inum, DIRENT_TYPE_REG, &name)?;

    let mut root = image.read_inode(ROOT_INODE);
    root.size_bytes += DIRENT_SIZE;
    root.links += 1;
    root.mtime = now;
    root.ctime = now;
    image.write_inode(ROOT_INODE, &root)?;
    debug!(
        "appended dirent {:?} -> inode {}, root size_bytes={}",
        name, child_inum, root.size_bytes
    );

    let mut sb = Superblock::decode(&image.as_bytes()[0..BLOCK_SIZE as usize]);
    sb.mtime_epoch = now;
    sb.checksum = 0;
    image.write_superblock(&sb);
    debug!("recomputed superblock checksum");

    info!(
        "added {:?} ({} bytes, {} block(s)) as inode {}",
        name,
        file_bytes.len(),
        blocks_needed,
        child_inum
    );
    Ok(image.into_bytes())
}

impl ImageBuffer {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build, BuildParams};

    fn fresh_image() -> Vec<u8> {
        build(BuildParams { size_kib: 180, inode_count: 128 }).unwrap()
    }

    #[test]
    fn adds_small_file() {
        let image = fresh_image();
        let out = add_file(image, "hello.txt", b"hello world").unwrap();
        let (image, _) = ImageBuffer::load(out).unwrap();
        let root = image.read_inode(ROOT_INODE);
        assert_eq!(root.size_bytes, 3 * DIRENT_SIZE);
        assert_eq!(root.links, 3);

        let entries = image.list_dirents(root.direct[0] as u64, root.size_bytes);
        let added = entries.iter().find(|(e, _)| e.name_str() == "hello.txt").unwrap();
        let child = image.read_inode(added.0.inode_no);
        assert_eq!(child.mode, MODE_REG);
        assert_eq!(child.size_bytes, 11);
        assert_eq!(child.blocks_used(), 1);
    }

    #[test]
    fn truncates_long_file_names() {
        let image = fresh_image();
        let long_name = "x".repeat(100);
        let out = add_file(image, &long_name, b"data").unwrap();
        let (image, _) = ImageBuffer::load(out).unwrap();
        let root = image.read_inode(ROOT_INODE);
        let entries = image.list_dirents(root.direct[0] as u64, root.size_bytes);
        let added = entries.iter().find(|(e, _)| e.inode_no != ROOT_INODE);
        assert_eq!(added.unwrap().0.name_str().len(), MAX_NAME_LEN);
    }

    #[test]
    fn rejects_file_exceeding_direct_capacity() {
        let image = fresh_image();
        let too_big = vec![0u8; (DIRECT_PER_INODE as u64 * BLOCK_SIZE + 1) as usize];
        let err = add_file(image, "huge.bin", &too_big).unwrap_err();
        assert!(matches!(err, MiniVsfsError::FileTooLarge { .. }));
    }

    #[test]
    fn multi_block_file_gets_contiguous_direct_pointers() {
        let image = fresh_image();
        let data = vec![0xABu8; (BLOCK_SIZE * 2 + 10) as usize];
        let out = add_file(image, "two_blocks.bin", &data).unwrap();
        let (image, _) = ImageBuffer::load(out).unwrap();
        let root = image.read_inode(ROOT_INODE);
        let entries = image.list_dirents(root.direct[0] as u64, root.size_bytes);
        let added = entries.iter().find(|(e, _)| e.inode_no != ROOT_INODE).unwrap();
        let child = image.read_inode(added.0.inode_no);
        assert_eq!(child.blocks_used(), 3);
        assert_eq!(child.size_bytes, data.len() as u64);
    }
}
