//! Entries of a block's file table.

use tracing::trace;

use crate::error::{Error, Result};
use crate::types::{to_u32, FileEntry};

/// A file stored in an archive
///
/// Records read from an archive only know where their data lives; the content is
/// decoded on first access and kept until the record is overwritten or deleted.
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    path: String,
    offset: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    timestamp: u32,
    content: Option<Vec<u8>>,
    modified: bool,
    deleted: bool,
}

impl FileRecord {
    pub(crate) fn new(path: String, content: Vec<u8>) -> Result<Self> {
        let mut record = Self::default();
        record.set_content(path, content)?;
        Ok(record)
    }

    pub(crate) fn from_entry(entry: &FileEntry) -> Self {
        Self {
            path: entry.path(),
            offset: entry.offset,
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            timestamp: entry.timestamp,
            ..Default::default()
        }
    }

    /// Path of the file inside the archive, using `/` as separator
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Offset of the data, relative to the resident chunk or to the start of the archive
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Size of the data as stored
    pub fn compressed_size(&self) -> u32 {
        self.compressed_size
    }

    /// Size of the file when extracted
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    /// Unix timestamp of the last modification, 0 if unknown
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Whether the content was replaced since reading the archive
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether the content is already decoded
    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Content, if already decoded
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// Replace path and content. The archive bytes are left untouched.
    ///
    /// The timestamp is cleared, new content has no known modification time.
    pub(crate) fn set_content(&mut self, path: String, content: Vec<u8>) -> Result<()> {
        self.uncompressed_size = to_u32(content.len())?;
        self.timestamp = 0;
        self.path = path;
        self.content = Some(content);
        self.modified = true;
        Ok(())
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.content = None;
        self.deleted = true;
    }

    /// Cached content, decoding it with `decode` on first access
    pub(crate) fn get_or_decode(
        &mut self,
        decode: impl FnOnce(&FileRecord) -> Result<Vec<u8>>,
    ) -> Result<&[u8]> {
        if self.deleted {
            return Err(Error::FileNotFound(self.path.clone()));
        }

        if self.content.is_none() {
            let content = decode(self)?;
            trace!(path = %self.path, len = content.len(), "decoded");
            self.content = Some(content);
        }

        Ok(self.content.as_deref().unwrap_or_default())
    }

    /// Slice this record out of a decoded resident chunk
    pub(crate) fn slice_chunk(&self, chunk: &[u8]) -> Result<Vec<u8>> {
        let start = self.offset as usize;
        chunk
            .get(start..start + self.uncompressed_size as usize)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                Error::corrupt(format!(
                    "{} lies outside of its resident chunk of {} bytes",
                    self.path,
                    chunk.len()
                ))
            })
    }

    /// Range of the stored data for records of non resident blocks
    pub(crate) fn stored_range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.compressed_size as usize
    }

    /// Table entry describing `size` bytes at `offset` of a resident chunk
    pub(crate) fn to_entry(&self, offset: u32, size: u32) -> Result<FileEntry> {
        Ok(FileEntry {
            path: FileEntry::encode_path(&self.path)?,
            offset,
            compressed_size: size,
            uncompressed_size: size,
            timestamp: self.timestamp,
        })
    }
}
