//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    ///
    /// Only produced when reading or writing archives through a filesystem path.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// data does not start with a known resource file magic
    #[error("file corrupted or not a resource file")]
    #[diagnostic(help("expected \"Resource File V2.0\" or \"Resource File V2.2\" at offset 0"))]
    NotAResourceFile,

    /// the requested version or write mode is not supported
    #[error("unsupported: {0}")]
    UnsupportedVersion(String),

    /// the archive structure is inconsistent
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    /// unable to find requested file
    #[error("file {0} not found")]
    FileNotFound(String),

    /// an entry has to be added but the archive has no block to hold it
    #[error("no block to add data to available")]
    #[diagnostic(help("seed the archive with `RdaArchive::add_block` before adding files"))]
    NoBlockAvailable,

    /// the archive already holds data
    #[error("archive is already loaded")]
    AlreadyLoaded,

    /// path does not fit into the fixed size path field of a file entry
    #[error("path {0} is too long for a file entry")]
    PathTooLong(String),

    /// an offset or size does not fit into the 32 bit fields of the format
    #[error("archive exceeds the 4 GiB limit of the format")]
    ArchiveTooLarge,
}

impl Error {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Error::CorruptArchive(message.into())
    }
}

/// Structures are only ever decoded from archive bytes held in memory.
impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        Error::CorruptArchive(value.to_string())
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
