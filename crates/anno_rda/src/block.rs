//! Blocks of the archive chain.

use std::{borrow::Cow, io::Cursor};

use binrw::{BinRead, BinWrite};
use tracing::{debug, instrument, warn};

use crate::cipher::{self, SEED};
use crate::compression;
use crate::error::{Error, Result};
use crate::layout::BlockLayout;
use crate::record::FileRecord;
use crate::types::{
    to_u32, ArchiveVersion, BlockFlags, BlockHeader, FileEntry, ResidentSizes,
    BLOCK_HEADER_SIZE, FILE_ENTRY_SIZE,
};

/// Undo encryption and compression of a stored payload according to `flags`
pub(crate) fn decode_payload(stored: &[u8], flags: BlockFlags) -> Result<Vec<u8>> {
    let decrypted = if flags.contains(BlockFlags::ENCRYPTED) {
        Cow::Owned(cipher::decrypt(stored, SEED))
    } else {
        Cow::Borrowed(stored)
    };

    if flags.contains(BlockFlags::COMPRESSED) {
        compression::decompress(&decrypted)
    } else {
        Ok(decrypted.into_owned())
    }
}

fn encode_payload(plain: &[u8], flags: BlockFlags) -> Result<Vec<u8>> {
    let mut stored = if flags.contains(BlockFlags::COMPRESSED) {
        compression::compress(plain)?
    } else {
        plain.to_vec()
    };

    if flags.contains(BlockFlags::ENCRYPTED) {
        cipher::apply_keystream(&mut stored, SEED);
    }

    Ok(stored)
}

/// One link of the block chain together with the files it holds
#[derive(Debug, Clone, Default)]
pub struct Block {
    header: BlockHeader,
    layout: Option<BlockLayout>,
    files: Vec<FileRecord>,
    chunk: Option<Vec<u8>>,
}

impl Block {
    /// Parse the block whose header starts at `offset`, including its file table
    #[instrument(skip(data), err)]
    pub(crate) fn parse(data: &[u8], offset: usize, version: ArchiveVersion) -> Result<Self> {
        if version != ArchiveVersion::V2_0 {
            return Err(Error::UnsupportedVersion(format!(
                "blocks of RDA version {version} can not be decoded yet"
            )));
        }

        let raw_header = data
            .get(offset..offset + BLOCK_HEADER_SIZE)
            .ok_or_else(|| Error::corrupt(format!("block header at {offset} is out of bounds")))?;
        let header = BlockHeader::read(&mut Cursor::new(raw_header))?;
        debug!(?header, "visiting block");

        if header.flags.contains(BlockFlags::DELETED) || header.file_count == 0 {
            return Ok(Self {
                header,
                layout: Some(BlockLayout::inert(offset)),
                ..Default::default()
            });
        }

        if u64::from(header.file_count) * FILE_ENTRY_SIZE as u64
            != u64::from(header.uncompressed_table_size)
        {
            return Err(Error::corrupt(format!(
                "file table size {} does not match {} files",
                header.uncompressed_table_size, header.file_count
            )));
        }

        let layout = BlockLayout::locate(data, offset, &header)?;
        let stored_table = data.get(layout.table.clone()).ok_or_else(|| {
            Error::corrupt(format!(
                "file table {:?} of block at {offset} is out of bounds",
                layout.table
            ))
        })?;

        let table = decode_payload(stored_table, header.flags)?;
        if table.len() != header.uncompressed_table_size as usize {
            return Err(Error::corrupt(format!(
                "file table of block at {offset} decoded to {} bytes, expected {}",
                table.len(),
                header.uncompressed_table_size
            )));
        }

        let files = table
            .chunks_exact(FILE_ENTRY_SIZE)
            .map(|raw| {
                FileEntry::read(&mut Cursor::new(raw)).map(|entry| FileRecord::from_entry(&entry))
            })
            .collect::<binrw::BinResult<Vec<_>>>()?;

        Ok(Self {
            header,
            layout: Some(layout),
            files,
            chunk: None,
        })
    }

    /// Header as read from the archive, default for blocks built in memory
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn flags(&self) -> BlockFlags {
        self.header.flags
    }

    /// Placement inside the archive this block was read from
    pub fn layout(&self) -> Option<&BlockLayout> {
        self.layout.as_ref()
    }

    /// All records of this block, including deleted ones
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Whether the resident chunk is already decoded
    pub fn is_chunk_loaded(&self) -> bool {
        self.chunk.is_some()
    }

    pub(crate) fn files_mut(&mut self) -> &mut Vec<FileRecord> {
        &mut self.files
    }

    /// Content of record `index`, decoding it from `data` on first access
    pub(crate) fn content(&mut self, index: usize, data: &[u8]) -> Result<&[u8]> {
        let Block {
            header,
            layout,
            files,
            chunk,
        } = self;
        let flags = header.flags;

        let file = files
            .get_mut(index)
            .ok_or_else(|| Error::corrupt(format!("block has no record {index}")))?;

        file.get_or_decode(|file| {
            if flags.contains(BlockFlags::RESIDENT) {
                file.slice_chunk(resident_chunk(chunk, layout.as_ref(), flags, data)?)
            } else {
                let range = file.stored_range();
                let stored = data.get(range.clone()).ok_or_else(|| {
                    Error::corrupt(format!("data {range:?} of {} is out of bounds", file.path()))
                })?;
                decode_payload(stored, flags)
            }
        })
    }

    /// Compress and optionally encrypt the live records of this block as one resident block
    ///
    /// Every live record must already hold its content.
    #[instrument(skip(self), err, fields(files = self.files.len()))]
    pub(crate) fn encode(&self, flags: BlockFlags) -> Result<EncodedBlock> {
        let live = self.files.iter().filter(|f| !f.is_deleted());

        let mut chunk = Vec::new();
        let mut table = Cursor::new(Vec::new());
        let mut count = 0usize;
        for file in live {
            let content = file
                .content()
                .ok_or_else(|| Error::corrupt(format!("content of {} is not loaded", file.path())))?;

            file.to_entry(to_u32(chunk.len())?, to_u32(content.len())?)?
                .write(&mut table)?;
            chunk.extend_from_slice(content);
            count += 1;
        }
        let table = table.into_inner();

        let stored_chunk = encode_payload(&chunk, flags)?;
        let stored_table = encode_payload(&table, flags)?;
        debug!(
            "encoded {count} files, chunk {} -> {}, table {} -> {}",
            chunk.len(),
            stored_chunk.len(),
            table.len(),
            stored_table.len()
        );

        Ok(EncodedBlock {
            header: BlockHeader {
                flags,
                file_count: to_u32(count)?,
                compressed_table_size: to_u32(stored_table.len())?,
                uncompressed_table_size: to_u32(table.len())?,
                next_block_offset: u32::MAX,
            },
            sizes: ResidentSizes {
                compressed: to_u32(stored_chunk.len())?,
                uncompressed: to_u32(chunk.len())?,
            },
            chunk: stored_chunk,
            table: stored_table,
        })
    }
}

/// Decoded resident chunk of a block, decoding it on first access
fn resident_chunk<'a>(
    slot: &'a mut Option<Vec<u8>>,
    layout: Option<&BlockLayout>,
    flags: BlockFlags,
    data: &[u8],
) -> Result<&'a [u8]> {
    if slot.is_none() {
        let resident = layout
            .and_then(|l| l.resident.as_ref())
            .ok_or_else(|| Error::corrupt("resident block without data chunk"))?;
        let stored = data.get(resident.chunk.clone()).ok_or_else(|| {
            Error::corrupt(format!("resident chunk {:?} is out of bounds", resident.chunk))
        })?;

        let decoded = decode_payload(stored, flags)?;
        if decoded.len() != resident.sizes.uncompressed as usize {
            warn!(
                "resident chunk decoded to {} bytes, header says {}",
                decoded.len(),
                resident.sizes.uncompressed
            );
        }
        debug!(len = decoded.len(), "decoded resident chunk");
        *slot = Some(decoded);
    }

    Ok(slot.as_deref().unwrap_or_default())
}

/// A block ready to be placed into an archive
#[derive(Debug)]
pub(crate) struct EncodedBlock {
    pub header: BlockHeader,
    pub sizes: ResidentSizes,
    pub chunk: Vec<u8>,
    pub table: Vec<u8>,
}

impl EncodedBlock {
    /// Append `chunk | table | sizes | header` to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.chunk);
        out.extend_from_slice(&self.table);

        let end = out.len() as u64;
        let mut cursor = Cursor::new(out);
        cursor.set_position(end);
        self.sizes.write(&mut cursor)?;
        self.header.write(&mut cursor)?;

        Ok(())
    }
}
