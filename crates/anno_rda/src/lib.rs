//! This library handles reading, modifying and creating **RDA** resource files used by the *Anno* games.
//!
//! # RDA Archive Format Documentation
//!
//! An RDA file starts with a fixed header, followed by a chain of blocks. Each block describes a
//! group of files through a file table and stores the file data either next to each other or as
//! one shared chunk. Blocks are linked through offsets; the chain ends with an offset that lies
//! beyond the end of the file, usually `0xFFFFFFFF`.
//!
//! ## Header
//!
//! | Version | Magic                                            | Size (bytes) | First block offset at |
//! |---------|--------------------------------------------------|--------------|-----------------------|
//! | 2.0     | `Resource File V2.0` as 36 bytes of UTF-16LE     | 1048         | 1044                  |
//! | 2.2     | `Resource File V2.2` as 18 bytes of ASCII        | 792          | 788                   |
//!
//! Only version 2.0 archives can be read past the header and written.
//!
//! ## Block Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Flags                  | 4 bytes: see below                                         |
//! | 0x0004         | File Count             | 4 bytes: Number of entries in the file table               |
//! | 0x0008         | Table Comp. Size       | 4 bytes: Size of the file table as stored                  |
//! | 0x000C         | Table Uncomp. Size     | 4 bytes: Size of the decoded file table, File Count * 540  |
//! | 0x0010         | Next Block Offset      | 4 bytes: Absolute offset of the next block header          |
//!
//! The flags are a combination of
//!
//! - `0x1` **Compressed**: table and data are zlib streams
//! - `0x2` **Encrypted**: table and data went through the stream cipher, after compression
//! - `0x4` **Resident**: all file data of the block is stored as one chunk
//! - `0x8` **Deleted**: the block carries no files
//!
//! The stored file table sits directly before the block header. Resident blocks additionally
//! store two 4 byte sizes of their chunk (compressed, then uncompressed) in front of the table,
//! and the chunk itself in front of those.
//!
//! ## File Entry
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Path                   | 520 bytes: UTF-16LE, padded with zeroes                 |
//! | 0x0208         | Data Offset            | 4 bytes: Absolute, or relative to the resident chunk    |
//! | 0x020C         | Compressed Size        | 4 bytes: Size of the data as stored                     |
//! | 0x0210         | Uncompressed Size      | 4 bytes: Size of the extracted data                     |
//! | 0x0214         | Timestamp              | 4 bytes: Unix time of the last modification             |
//! | 0x0218         | Padding                | 4 bytes                                                 |
//!
//! ## Stream Cipher
//!
//! Encrypted data is XORed 16 bits at a time with the output of a linear congruential generator
//! seeded with `0xA2C2A`, see [`cipher`] and [`lcg`]. An odd trailing byte stays untouched.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rda`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: zlib
//!

pub mod archive;
pub mod block;
pub mod cipher;
pub mod compression;
pub mod error;
pub mod layout;
pub mod lcg;
pub mod read;
pub mod record;
pub mod types;
pub mod write;

pub use archive::RdaArchive;
pub use block::Block;
pub use record::FileRecord;
pub use types::{ArchiveVersion, BlockFlags};
pub use write::WriteOptions;
