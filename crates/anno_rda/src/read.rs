//! Reading RDA archives
//!

use std::{collections::HashSet, path::Path};

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, instrument};

use crate::{
    archive::{EntryRef, RdaArchive},
    block::Block,
    error::{Error, Result},
    types::ArchiveVersion,
};

impl RdaArchive {
    /// Read an RDA archive from memory.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<RdaArchive> {
        let mut archive = RdaArchive::new();
        archive.read_data(data)?;
        Ok(archive)
    }

    /// Read an RDA archive from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<RdaArchive> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Parse `data` into this archive, collecting the blocks and files it contains.
    ///
    /// File tables are decoded right away, file contents only once they are requested.
    /// Nothing is kept if parsing fails. An archive can only be loaded once.
    #[instrument(skip_all, err)]
    pub fn read_data(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        if self.version.is_some() || !self.blocks.is_empty() {
            return Err(Error::AlreadyLoaded);
        }

        let data = data.into();
        let version = ArchiveVersion::detect(&data)?;
        let blocks = read_chain(&data, version)?;

        let index = blocks
            .iter()
            .enumerate()
            .flat_map(|(block, b)| (0..b.files().len()).map(move |record| EntryRef { block, record }))
            .collect::<Vec<_>>();
        debug!(%version, blocks = blocks.len(), files = index.len(), "read archive");

        self.raw = data;
        self.version = Some(version);
        self.blocks = blocks;
        self.index = index;

        Ok(())
    }
}

fn read_chain(data: &[u8], version: ArchiveVersion) -> Result<Vec<Block>> {
    let pointer = version.first_block_pointer();
    let first = data
        .get(pointer..pointer + 4)
        .map(LittleEndian::read_u32)
        .ok_or_else(|| Error::corrupt(format!("header of {} bytes is truncated", data.len())))?;

    let mut blocks = Vec::new();
    let mut visited = HashSet::new();
    let mut next = first as usize;
    while next < data.len() {
        if !visited.insert(next) {
            return Err(Error::corrupt(format!("block chain loops back to {next}")));
        }

        let block = Block::parse(data, next, version)?;
        next = block.header().next_block_offset as usize;
        blocks.push(block);
    }

    Ok(blocks)
}
