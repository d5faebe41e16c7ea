//! Packed on-disk record layouts. Each type's `encode`/`decode` pair is the
//! single source of truth for field offsets; nothing else in this crate
//! computes them by hand.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::*;
use crate::crc::{crc32, xor_fold};

/// Decoded superblock (block 0, bytes 0..116, checksum over bytes 0..4091).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub magic: u32,
    pub version: u32,
    pub block_size: u32,
    pub total_blocks: u64,
    pub inode_count: u64,
    pub inode_bitmap_start: u64,
    pub inode_bitmap_blocks: u64,
    pub data_bitmap_start: u64,
    pub data_bitmap_blocks: u64,
    pub inode_table_start: u64,
    pub inode_table_blocks: u64,
    pub data_region_start: u64,
    pub data_region_blocks: u64,
    pub root_inode: u64,
    pub mtime_epoch: u64,
    pub flags: u32,
    pub checksum: u32,
}

impl Superblock {
    /// Encode into a zeroed 4096-byte block with the checksum filled in.
    pub fn encode_block(&self) -> Vec<u8> {
        let mut block = vec![0u8; BLOCK_SIZE as usize];
        self.encode_fields(&mut block);
        let checksum = crc32(&block[..4092]);
        LittleEndian::write_u32(&mut block[4092..4096], checksum);
        block
    }

    fn encode_fields(&self, block: &mut [u8]) {
        LittleEndian::write_u32(&mut block[0..4], self.magic);
        LittleEndian::write_u32(&mut block[4..8], self.version);
        LittleEndian::write_u32(&mut block[8..12], self.block_size);
        LittleEndian::write_u64(&mut block[12..20], self.total_blocks);
        LittleEndian::write_u64(&mut block[20..28], self.inode_count);
        LittleEndian::write_u64(&mut block[28..36], self.inode_bitmap_start);
        LittleEndian::write_u64(&mut block[36..44], self.inode_bitmap_blocks);
        LittleEndian::write_u64(&mut block[44..52], self.data_bitmap_start);
        LittleEndian::write_u64(&mut block[52..60], self.data_bitmap_blocks);
        LittleEndian::write_u64(&mut block[60..68], self.inode_table_start);
        LittleEndian::write_u64(&mut block[68..76], self.inode_table_blocks);
        LittleEndian::write_u64(&mut block[76..84], self.data_region_start);
        LittleEndian::write_u64(&mut block[84..92], self.data_region_blocks);
        LittleEndian::write_u64(&mut block[92..100], self.root_inode);
        LittleEndian::write_u64(&mut block[100..108], self.mtime_epoch);
        LittleEndian::write_u32(&mut block[108..112], self.flags);
        // bytes 112..116 hold the checksum; left zero here, filled by the caller.
    }

    /// Decode from a 4096-byte block without verifying the checksum.
    pub fn decode(block: &[u8]) -> Self {
        Self {
            magic: LittleEndian::read_u32(&block[0..4]),
            version: LittleEndian::read_u32(&block[4..8]),
            block_size: LittleEndian::read_u32(&block[8..12]),
            total_blocks: LittleEndian::read_u64(&block[12..20]),
            inode_count: LittleEndian::read_u64(&block[20..28]),
            inode_bitmap_start: LittleEndian::read_u64(&block[28..36]),
            inode_bitmap_blocks: LittleEndian::read_u64(&block[36..44]),
            data_bitmap_start: LittleEndian::read_u64(&block[44..52]),
            data_bitmap_blocks: LittleEndian::read_u64(&block[52..60]),
            inode_table_start: LittleEndian::read_u64(&block[60..68]),
            inode_table_blocks: LittleEndian::read_u64(&block[68..76]),
            data_region_start: LittleEndian::read_u64(&block[76..84]),
            data_region_blocks: LittleEndian::read_u64(&block[84..92]),
            root_inode: LittleEndian::read_u64(&block[92..100]),
            mtime_epoch: LittleEndian::read_u64(&block[100..108]),
            flags: LittleEndian::read_u32(&block[108..112]),
            checksum: LittleEndian::read_u32(&block[4092..4096]),
        }
    }

    /// Recompute the checksum a superblock block should carry.
    pub fn checksum_of(block: &[u8]) -> u32 {
        crc32(&block[..4092])
    }
}

/// Decoded inode record (128 bytes, CRC over bytes 0..120 stored at 120..124).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub mode: u16,
    pub links: u16,
    pub uid: u32,
    pub gid: u32,
    pub size_bytes: u64,
    pub atime: u64,
    pub mtime: u64,
    pub ctime: u64,
    pub direct: [u32; DIRECT_PER_INODE],
    pub proj_id: u32,
    pub uid16_gid16: u32,
    pub xattr_ptr: u64,
}

impl Inode {
    pub fn encode(&self) -> [u8; INODE_SIZE as usize] {
        let mut buf = [0u8; INODE_SIZE as usize];
        LittleEndian::write_u16(&mut buf[0..2], self.mode);
        LittleEndian::write_u16(&mut buf[2..4], self.links);
        LittleEndian::write_u32(&mut buf[4..8], self.uid);
        LittleEndian::write_u32(&mut buf[8..12], self.gid);
        LittleEndian::write_u64(&mut buf[12..20], self.size_bytes);
        LittleEndian::write_u64(&mut buf[20..28], self.atime);
        LittleEndian::write_u64(&mut buf[28..36], self.mtime);
        LittleEndian::write_u64(&mut buf[36..44], self.ctime);
        for (i, &addr) in self.direct.iter().enumerate() {
            let off = 44 + i * 4;
            LittleEndian::write_u32(&mut buf[off..off + 4], addr);
        }
        // bytes 92..104 are reserved and stay zero.
        LittleEndian::write_u32(&mut buf[104..108], self.proj_id);
        LittleEndian::write_u32(&mut buf[108..112], self.uid16_gid16);
        LittleEndian::write_u64(&mut buf[112..120], self.xattr_ptr);
        let crc = crc32(&buf[..120]);
        LittleEndian::write_u32(&mut buf[120..124], crc);
        // bytes 124..128 are the high CRC word, always zero for a 32-bit CRC.
        buf
    }

    pub fn decode(buf: &[u8]) -> Self {
        let mut direct = [0u32; DIRECT_PER_INODE];
        for (i, slot) in direct.iter_mut().enumerate() {
            let off = 44 + i * 4;
            *slot = LittleEndian::read_u32(&buf[off..off + 4]);
        }
        Self {
            mode: LittleEndian::read_u16(&buf[0..2]),
            links: LittleEndian::read_u16(&buf[2..4]),
            uid: LittleEndian::read_u32(&buf[4..8]),
            gid: LittleEndian::read_u32(&buf[8..12]),
            size_bytes: LittleEndian::read_u64(&buf[12..20]),
            atime: LittleEndian::read_u64(&buf[20..28]),
            mtime: LittleEndian::read_u64(&buf[28..36]),
            ctime: LittleEndian::read_u64(&buf[36..44]),
            direct,
            proj_id: LittleEndian::read_u32(&buf[104..108]),
            uid16_gid16: LittleEndian::read_u32(&buf[108..112]),
            xattr_ptr: LittleEndian::read_u64(&buf[112..120]),
        }
    }

    pub fn stored_crc(buf: &[u8]) -> u32 {
        LittleEndian::read_u32(&buf[120..124])
    }

    /// Recompute the CRC a 128-byte encoded inode record should carry.
    pub fn expected_crc(buf: &[u8]) -> u32 {
        let mut scratch = [0u8; INODE_SIZE as usize];
        scratch.copy_from_slice(&buf[..INODE_SIZE as usize]);
        scratch[120..128].fill(0);
        crc32(&scratch[..120])
    }

    /// Count of populated direct-block slots, assuming the invariant that
    /// they form a contiguous nonzero prefix.
    pub fn blocks_used(&self) -> usize {
        self.direct.iter().take_while(|&&b| b != 0).count()
    }
}

/// Decoded directory entry (64 bytes, XOR checksum over bytes 0..63 at byte 63).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode_no: u32,
    pub file_type: u8,
    pub name: [u8; MAX_NAME_LEN],
}

impl DirEntry {
    pub fn new(inode_no: u32, file_type: u8, name: &[u8]) -> Self {
        let mut padded = [0u8; MAX_NAME_LEN];
        padded[..name.len()].copy_from_slice(name);
        Self {
            inode_no,
            file_type,
            name: padded,
        }
    }

    pub fn encode(&self) -> [u8; DIRENT_SIZE as usize] {
        let mut buf = [0u8; DIRENT_SIZE as usize];
        LittleEndian::write_u32(&mut buf[0..4], self.inode_no);
        buf[4] = self.file_type;
        buf[5..63].copy_from_slice(&self.name);
        buf[63] = xor_fold(&buf[0..63]);
        buf
    }

    pub fn decode(buf: &[u8]) -> Self {
        let mut name = [0u8; MAX_NAME_LEN];
        name.copy_from_slice(&buf[5..63]);
        Self {
            inode_no: LittleEndian::read_u32(&buf[0..4]),
            file_type: buf[4],
            name,
        }
    }

    pub fn stored_checksum(buf: &[u8]) -> u8 {
        buf[63]
    }

    pub fn expected_checksum(buf: &[u8]) -> u8 {
        xor_fold(&buf[0..63])
    }

    /// Name with trailing NUL padding trimmed.
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}
