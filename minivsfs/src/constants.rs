//! On-disk layout constants for MiniVSFS images.

pub const BLOCK_SIZE: u64 = 4096;
pub const INODE_SIZE: u64 = 128;
pub const DIRENT_SIZE: u64 = 64;

pub const SUPERBLOCK_MAGIC: u32 = 0x4D56_5346; // "MVSF"
pub const SUPERBLOCK_VERSION: u32 = 1;

pub const ROOT_INODE: u32 = 1;

pub const INODE_BITMAP_START: u64 = 1;
pub const INODE_BITMAP_BLOCKS: u64 = 1;
pub const DATA_BITMAP_START: u64 = 2;
pub const DATA_BITMAP_BLOCKS: u64 = 1;
pub const INODE_TABLE_START: u64 = 3;

pub const DIRECT_PER_INODE: usize = 12;

pub const MODE_DIR: u16 = 0o040000;
pub const MODE_REG: u16 = 0o100000;

pub const DIRENT_TYPE_REG: u8 = 1;
pub const DIRENT_TYPE_DIR: u8 = 2;

pub const MAX_NAME_LEN: usize = 58;
pub const MAX_DIRENTS_PER_BLOCK: usize = (BLOCK_SIZE / DIRENT_SIZE) as usize;

pub const MIN_SIZE_KIB: u64 = 180;
pub const MAX_SIZE_KIB: u64 = 4096;
pub const MIN_INODES: u64 = 128;
pub const MAX_INODES: u64 = 512;

static_assertions::const_assert_eq!(MAX_DIRENTS_PER_BLOCK, 64);
