//! Types for writing RDA archives
//!

use std::{io::Cursor, path::Path};

use binrw::BinWrite;
use bon::Builder;
use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, instrument};

use crate::archive::RdaArchive;
use crate::block::EncodedBlock;
use crate::error::{Error, Result};
use crate::layout::BlockLayout;
use crate::types::{ArchiveHeader, ArchiveVersion, BlockFlags};

/// Options for how the RDA file should be written
///
/// Only version 2.0 with compressed, resident blocks can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct WriteOptions {
    /// The version of the resource file
    #[builder(default)]
    pub version: ArchiveVersion,

    /// Run data and file tables through the stream cipher
    #[builder(default)]
    pub encrypt: bool,

    /// Compress data and file tables
    #[builder(default = true)]
    pub compress: bool,

    /// Store all data of a block as a single chunk
    #[builder(default = true)]
    pub resident: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions::builder().build()
    }
}

impl WriteOptions {
    /// Flags every written block carries, or why these options can not be written
    pub fn block_flags(&self) -> Result<BlockFlags> {
        if self.version != ArchiveVersion::V2_0 {
            return Err(Error::UnsupportedVersion(format!(
                "writing RDA version {} is not supported yet",
                self.version
            )));
        }
        if !self.resident {
            return Err(Error::UnsupportedVersion(
                "writing non resident blocks is not supported yet".into(),
            ));
        }
        if !self.compress {
            return Err(Error::UnsupportedVersion(
                "writing uncompressed blocks is not supported yet".into(),
            ));
        }

        let mut flags = BlockFlags::COMPRESSED | BlockFlags::RESIDENT;
        if self.encrypt {
            flags |= BlockFlags::ENCRYPTED;
        }
        Ok(flags)
    }
}

impl RdaArchive {
    /// Write the whole archive into a new buffer.
    ///
    /// Every block is written with the flags derived from `options`; deleted files are left out.
    /// Files that were never read are decoded first. The bytes the archive was read from are not
    /// modified, and the archive stays usable afterwards.
    #[instrument(skip(self), err)]
    pub fn serialize(&mut self, options: WriteOptions) -> Result<Vec<u8>> {
        let flags = options.block_flags()?;

        self.load_all()?;
        let encoded = self.encode_blocks(flags)?;

        let mut out = Vec::with_capacity(
            ArchiveVersion::V2_0.header_len()
                + encoded
                    .iter()
                    .map(|b| b.chunk.len() + b.table.len() + 28)
                    .sum::<usize>(),
        );
        ArchiveHeader {
            first_block_offset: u32::MAX,
        }
        .write(&mut Cursor::new(&mut out))?;

        let mut pointer = ArchiveVersion::V2_0.first_block_pointer();
        for (i, block) in encoded.iter().enumerate() {
            let layout = BlockLayout::stack(out.len(), block.sizes, block.table.len());
            block.write_to(&mut out)?;
            debug_assert_eq!(out.len(), layout.end());

            let header = u32::try_from(layout.header).map_err(|_| Error::ArchiveTooLarge)?;
            LittleEndian::write_u32(&mut out[pointer..pointer + 4], header);
            pointer = layout.next_block_pointer();
            debug!("placed block {} at {}", i + 1, header);
        }

        debug!(len = out.len(), blocks = encoded.len(), "serialized archive");
        Ok(out)
    }

    /// Serialize and write the archive to disk.
    pub fn write_to_path(&mut self, path: impl AsRef<Path>, options: WriteOptions) -> Result<()> {
        let data = self.serialize(options)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn encode_blocks(&self, flags: BlockFlags) -> Result<Vec<EncodedBlock>> {
        use rayon::prelude::*;

        self.blocks
            .par_iter()
            .map(|block| block.encode(flags))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn encode_blocks(&self, flags: BlockFlags) -> Result<Vec<EncodedBlock>> {
        self.blocks.iter().map(|block| block.encode(flags)).collect()
    }
}
