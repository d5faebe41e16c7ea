//! First-fit bitmap allocation, all-or-nothing for multi-block requests.

use minivsfs_core::{MiniVsfsError, Result};

use crate::bitmap;
use crate::image::ImageBuffer;

impl ImageBuffer {
    /// Allocate the first free inode and mark it used. Returns its 1-based
    /// inode number.
    pub fn allocate_inode(&mut self) -> Result<u32> {
        let limit = self.layout.inode_count;
        let free = bitmap::iter_bits(self.inode_bitmap(), limit).find(|&(_, set)| !set);
        match free {
            Some((index, _)) => {
                bitmap::set_bit(self.inode_bitmap_mut(), index);
                Ok(index as u32 + 1)
            }
            None => Err(MiniVsfsError::NoFreeInode),
        }
    }

    /// Allocate `n` free data blocks, all-or-nothing, in first-fit order.
    /// Returns their absolute block addresses.
    pub fn allocate_data_blocks(&mut self, n: u64) -> Result<Vec<u64>> {
        let limit = self.layout.data_region_blocks;
        let indices: Vec<u64> = bitmap::iter_bits(self.data_bitmap(), limit)
            .filter(|&(_, set)| !set)
            .map(|(i, _)| i)
            .take(n as usize)
            .collect();

        if indices.len() < n as usize {
            return Err(MiniVsfsError::NoFreeSpace {
                requested: n,
                available: indices.len() as u64,
            });
        }

        let data_bitmap = self.data_bitmap_mut();
        for &i in &indices {
            bitmap::set_bit(data_bitmap, i);
        }
        Ok(indices
            .into_iter()
            .map(|i| self.layout.data_region_start + i)
            .collect())
    }
}
