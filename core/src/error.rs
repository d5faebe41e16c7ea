use thiserror::Error;

/// Errors produced by the MiniVSFS format engine and its CLI tools.
#[derive(Debug, Error)]
pub enum MiniVsfsError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("bad image: {0}")]
    BadImage(String),

    #[error("no free inode available")]
    NoFreeInode,

    #[error("no free space: requested {requested} block(s), {available} available")]
    NoFreeSpace { requested: u64, available: u64 },

    #[error("file needs {blocks_needed} block(s) but only {max_blocks} direct slots exist ({size} bytes)")]
    FileTooLarge {
        size: u64,
        blocks_needed: u64,
        max_blocks: u64,
    },

    #[error("root directory is full")]
    DirectoryFull,

    #[error("inconsistent image: {0}")]
    Inconsistent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MiniVsfsError {
    /// Process exit code for this error: 2 for bad input/configuration,
    /// 1 for everything else (mirrors the builder/adder/fsck CLI contract).
    pub fn exit_code(&self) -> u8 {
        match self {
            MiniVsfsError::Configuration(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, MiniVsfsError>;
