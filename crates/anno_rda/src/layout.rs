//! Placement of the parts of a block.
//!
//! A block grows backwards from its header: the data chunk is followed by the
//! file table, the resident sizes (resident blocks only) and finally the block
//! header, all without gaps.
//!
//! ```text
//! | chunk | table | resident sizes (8) | block header (20) |
//!                                       ^ header
//! ```

use std::{io::Cursor, ops::Range};

use binrw::BinRead;

use crate::error::{Error, Result};
use crate::types::{
    BlockFlags, BlockHeader, ResidentSizes, BLOCK_HEADER_SIZE, RESIDENT_SIZES_SIZE,
};

/// Offset of `next_block_offset` inside a block header
const NEXT_BLOCK_FIELD: usize = 16;

/// Absolute ranges of the parts of one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    /// Start of the block header
    pub header: usize,

    /// File table as stored
    pub table: Range<usize>,

    /// Data chunk and its sizes, for resident blocks
    pub resident: Option<ResidentLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentLayout {
    pub sizes: ResidentSizes,

    /// Data chunk as stored
    pub chunk: Range<usize>,
}

impl BlockLayout {
    /// Layout of a block that carries no table
    pub fn inert(header: usize) -> Self {
        Self {
            header,
            table: header..header,
            resident: None,
        }
    }

    /// Derive the layout of a parsed block from the data in front of its header
    pub fn locate(data: &[u8], header: usize, block: &BlockHeader) -> Result<Self> {
        let table_end = if block.flags.contains(BlockFlags::RESIDENT) {
            header.checked_sub(RESIDENT_SIZES_SIZE).ok_or_else(|| {
                Error::corrupt(format!("block at {header} has no room for resident sizes"))
            })?
        } else {
            header
        };

        let table_start = table_end
            .checked_sub(block.compressed_table_size as usize)
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "file table of {} bytes does not fit before block at {header}",
                    block.compressed_table_size
                ))
            })?;
        let table = table_start..table_end;

        let resident = if block.flags.contains(BlockFlags::RESIDENT) {
            let raw_sizes = data.get(table_end..header).ok_or_else(|| {
                Error::corrupt(format!("resident sizes of block at {header} out of bounds"))
            })?;
            let sizes = ResidentSizes::read(&mut Cursor::new(raw_sizes))?;

            let chunk_start = table_start
                .checked_sub(sizes.compressed as usize)
                .ok_or_else(|| {
                    Error::corrupt(format!(
                        "resident chunk of {} bytes does not fit before block at {header}",
                        sizes.compressed
                    ))
                })?;

            Some(ResidentLayout {
                sizes,
                chunk: chunk_start..table_start,
            })
        } else {
            None
        };

        Ok(Self {
            header,
            table,
            resident,
        })
    }

    /// Layout of a resident block written at `start`
    pub fn stack(start: usize, sizes: ResidentSizes, table_len: usize) -> Self {
        let chunk = start..start + sizes.compressed as usize;
        let table = chunk.end..chunk.end + table_len;
        let header = table.end + RESIDENT_SIZES_SIZE;

        Self {
            header,
            table,
            resident: Some(ResidentLayout { sizes, chunk }),
        }
    }

    /// First byte after the block header
    pub fn end(&self) -> usize {
        self.header + BLOCK_HEADER_SIZE
    }

    /// Where the offset of the following block is stored
    pub fn next_block_pointer(&self) -> usize {
        self.header + NEXT_BLOCK_FIELD
    }
}
