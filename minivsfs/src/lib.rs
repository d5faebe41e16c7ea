//! Format engine for MiniVSFS images: layout planning, checksum primitives,
//! and the builder/adder/inspector pipelines for the on-disk format (4096
//! byte blocks, 128 byte inodes, 64 byte directory entries, single root
//! directory, no subdirectories).

pub mod allocator;
pub mod bitmap;
pub mod builder;
pub mod constants;
pub mod crc;
pub mod directory;
pub mod image;
pub mod inspector;
pub mod layout;
pub mod structures;

pub mod adder;

pub use adder::add_file;
pub use builder::{build, BuildParams};
pub use image::ImageBuffer;
pub use layout::Layout;
pub use structures::{DirEntry, Inode, Superblock};
