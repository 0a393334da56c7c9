//! The archive and its file index

use tracing::{debug, instrument};

use crate::block::Block;
use crate::error::{Error, Result};
use crate::record::FileRecord;
use crate::types::{ArchiveVersion, FileEntry};

/// Position of a record inside the block chain
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EntryRef {
    pub block: usize,
    pub record: usize,
}

/// RDA archive
///
/// An archive is either read from bytes with [`RdaArchive::read_data`] or built in memory
/// by seeding it with [`RdaArchive::add_block`] and adding files with
/// [`RdaArchive::update_file`]. Either way it can be written with
/// [`RdaArchive::serialize`] as often as needed.
///
/// Paths are not unique: if a path shows up more than once, the first one in chain order wins.
///
/// ```
/// # fn doit() -> anno_rda::error::Result<()>
/// # {
/// use anno_rda::{RdaArchive, WriteOptions};
///
/// let mut rda = RdaArchive::new();
/// rda.add_block();
/// rda.update_file("data/hello.txt", b"Hello, World!".to_vec())?;
///
/// let bytes = rda.serialize(WriteOptions::default())?;
///
/// let mut read = RdaArchive::from_bytes(bytes)?;
/// assert_eq!(read.extract_file("data\\hello.txt")?, b"Hello, World!");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct RdaArchive {
    pub(crate) raw: Vec<u8>,
    pub(crate) version: Option<ArchiveVersion>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) index: Vec<EntryRef>,
}

/// Use `/` as separator
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

impl RdaArchive {
    /// An empty archive without any block
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the archive this was read from
    pub fn version(&self) -> Option<ArchiveVersion> {
        self.version
    }

    /// Blocks in chain order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append an empty block to the chain, returning its position
    pub fn add_block(&mut self) -> usize {
        self.blocks.push(Block::default());
        self.blocks.len() - 1
    }

    /// Number of files, counting repeated paths
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records in index order, skipping deleted ones
    pub fn entries(&self) -> impl Iterator<Item = &FileRecord> {
        self.index
            .iter()
            .filter_map(|entry| self.record(*entry))
            .filter(|record| !record.is_deleted())
    }

    /// Returns an iterator over all file names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries().map(FileRecord::path)
    }

    /// All paths in index order; may contain the same path more than once
    pub fn index(&self) -> Vec<&str> {
        self.file_names().collect()
    }

    /// Record a path resolves to
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.find(&normalize_path(path))
            .and_then(|entry| self.record(entry))
    }

    pub fn does_file_exist(&self, path: &str) -> bool {
        self.find(&normalize_path(path)).is_some()
    }

    /// Content of the first file matching `path`
    ///
    /// The content is decoded on first access and served from memory afterwards.
    #[instrument(skip(self))]
    pub fn extract_file(&mut self, path: &str) -> Result<&[u8]> {
        let path = normalize_path(path);
        let entry = self.find(&path).ok_or(Error::FileNotFound(path))?;
        self.content(entry)
    }

    /// Replace the content of `path`, or add it to the first block if it is unknown
    #[instrument(skip(self, content), err)]
    pub fn update_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = normalize_path(path);
        FileEntry::encode_path(&path)?;

        if let Some(entry) = self.find(&path) {
            debug!("overwriting");
            if let Some(record) = self.record_mut(entry) {
                record.set_content(path, content.into())?;
            }
            return Ok(());
        }

        let block = self.blocks.first_mut().ok_or(Error::NoBlockAvailable)?;
        debug!("adding to first block");
        let files = block.files_mut();
        files.push(FileRecord::new(path, content.into())?);
        self.index.push(EntryRef {
            block: 0,
            record: files.len() - 1,
        });

        Ok(())
    }

    /// Mark the first file matching `path` as deleted
    #[instrument(skip(self), err)]
    pub fn delete_file(&mut self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        let entry = self.find(&path).ok_or(Error::FileNotFound(path))?;
        if let Some(record) = self.record_mut(entry) {
            record.mark_deleted();
        }
        Ok(())
    }

    /// Total size of all files when extracted
    pub fn uncompressed_size(&self) -> u64 {
        self.entries()
            .map(|record| u64::from(record.uncompressed_size()))
            .sum()
    }

    /// Decode every file that is not yet in memory
    pub(crate) fn load_all(&mut self) -> Result<()> {
        let Self { raw, blocks, .. } = self;
        for block in blocks.iter_mut() {
            for record in 0..block.files().len() {
                if !block.files()[record].is_deleted() {
                    block.content(record, raw)?;
                }
            }
        }
        Ok(())
    }

    fn find(&self, path: &str) -> Option<EntryRef> {
        self.index.iter().copied().find(|entry| {
            self.record(*entry)
                .is_some_and(|record| !record.is_deleted() && record.path() == path)
        })
    }

    fn record(&self, entry: EntryRef) -> Option<&FileRecord> {
        self.blocks
            .get(entry.block)
            .and_then(|block| block.files().get(entry.record))
    }

    fn record_mut(&mut self, entry: EntryRef) -> Option<&mut FileRecord> {
        self.blocks
            .get_mut(entry.block)
            .and_then(|block| block.files_mut().get_mut(entry.record))
    }

    fn content(&mut self, entry: EntryRef) -> Result<&[u8]> {
        let Self { raw, blocks, .. } = self;
        blocks
            .get_mut(entry.block)
            .ok_or_else(|| Error::corrupt(format!("index points to missing block {}", entry.block)))?
            .content(entry.record, raw)
    }
}
