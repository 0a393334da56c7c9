//! Base types for structure of RDA file.

use std::fmt;

use binrw::{BinRead, BinWrite};
use bitflags::bitflags;
use widestring::{U16Str, U16String};

use crate::error::{Error, Result};

/// `Resource File V2.0` as UTF-16LE
pub const MAGIC_V2_0: &[u8; 36] = b"R\0e\0s\0o\0u\0r\0c\0e\0 \0F\0i\0l\0e\0 \0V\02\0.\00\0";

/// `Resource File V2.2` as plain bytes
pub const MAGIC_V2_2: &[u8; 18] = b"Resource File V2.2";

/// Size of a block header
pub const BLOCK_HEADER_SIZE: usize = 20;

/// Size of the compressed/uncompressed pair in front of a resident block header
pub const RESIDENT_SIZES_SIZE: usize = 8;

/// Size of a single file entry inside a block's file table
pub const FILE_ENTRY_SIZE: usize = 540;

/// Number of UTF-16 units reserved for a path, including its terminator
pub const PATH_CAPACITY: usize = 260;

/// Resource file version
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ArchiveVersion {
    /// `Resource File V2.0`, the only version that can be written
    #[default]
    V2_0,

    /// `Resource File V2.2`, recognized but not decodable
    V2_2,
}

impl ArchiveVersion {
    /// Classify `data` by its magic
    pub fn detect(data: &[u8]) -> Result<Self> {
        if data.starts_with(MAGIC_V2_0) {
            Ok(ArchiveVersion::V2_0)
        } else if data.starts_with(MAGIC_V2_2) {
            Ok(ArchiveVersion::V2_2)
        } else {
            Err(Error::NotAResourceFile)
        }
    }

    /// Length of the header at the start of the file
    pub const fn header_len(self) -> usize {
        match self {
            ArchiveVersion::V2_0 => 1048,
            ArchiveVersion::V2_2 => 792,
        }
    }

    /// Where the offset of the first block header is stored
    pub const fn first_block_pointer(self) -> usize {
        self.header_len() - 4
    }
}

impl fmt::Display for ArchiveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveVersion::V2_0 => f.write_str("2.0"),
            ArchiveVersion::V2_2 => f.write_str("2.2"),
        }
    }
}

/// RDA V2.0 file header
///
/// The UTF-16 magic is followed by a reserved area and the absolute offset of the first block header.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little, magic = b"R\0e\0s\0o\0u\0r\0c\0e\0 \0F\0i\0l\0e\0 \0V\02\0.\00\0")]
pub struct ArchiveHeader {
    /// Absolute offset of the first block header
    #[brw(pad_before = 1008)]
    pub first_block_offset: u32,
}

bitflags! {
    /// Storage mode of a block
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u32 {
        /// Data and file table are zlib streams
        const COMPRESSED = 0x01;
        /// Data and file table are run through [`crate::cipher`]
        const ENCRYPTED = 0x02;
        /// All file data of the block is stored as one chunk
        const RESIDENT = 0x04;
        /// Block carries no usable table
        const DELETED = 0x08;
    }
}

/// Block header
///
/// Stored at the end of the block it describes.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct BlockHeader {
    /// Storage mode of this block
    #[br(map = |bits: u32| BlockFlags::from_bits_retain(bits))]
    #[bw(map = |flags: &BlockFlags| flags.bits())]
    pub flags: BlockFlags,

    /// Number of file entries in the table
    pub file_count: u32,

    /// Size of the file table as stored
    pub compressed_table_size: u32,

    /// Size of the file table once decoded, always `file_count * 540`
    pub uncompressed_table_size: u32,

    /// Absolute offset of the next block header
    pub next_block_offset: u32,
}

/// Sizes of the data chunk of a resident block, stored right before its header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ResidentSizes {
    pub compressed: u32,
    pub uncompressed: u32,
}

/// File entry as stored in a block's file table
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[brw(little)]
pub struct FileEntry {
    /// UTF-16 path, zero padded
    pub path: [u16; PATH_CAPACITY],

    /// Offset into the resident chunk, or into the file for non resident blocks
    pub offset: u32,

    pub compressed_size: u32,

    pub uncompressed_size: u32,

    /// Unix timestamp of the last modification
    #[brw(pad_after = 4)]
    pub timestamp: u32,
}

impl Default for FileEntry {
    fn default() -> Self {
        Self {
            path: [0; PATH_CAPACITY],
            offset: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            timestamp: 0,
        }
    }
}

/// Fit a size or offset into one of the 32 bit fields of the format
pub(crate) fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::ArchiveTooLarge)
}

impl FileEntry {
    /// Decoded path, up to the first NUL
    ///
    /// The whole 520 byte field is considered, not only its first 256 bytes. Writers zero fill
    /// the field, so paths longer than 128 units read back complete.
    pub fn path(&self) -> String {
        let end = self
            .path
            .iter()
            .position(|&unit| unit == 0)
            .unwrap_or(PATH_CAPACITY);
        U16Str::from_slice(&self.path[..end]).to_string_lossy()
    }

    /// Encode `path` for the path field, leaving room for a terminator
    pub fn encode_path(path: &str) -> Result<[u16; PATH_CAPACITY]> {
        let wide = U16String::from_str(path);
        if wide.len() >= PATH_CAPACITY {
            return Err(Error::PathTooLong(path.to_owned()));
        }

        let mut field = [0; PATH_CAPACITY];
        field[..wide.len()].copy_from_slice(wide.as_slice());
        Ok(field)
    }
}
