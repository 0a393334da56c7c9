//! Block compression and decompression handling.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Compression level the format is written with
pub const LEVEL: u32 = 5;

/// Compress `data` into a zlib stream
#[instrument(skip_all, err, fields(len = data.len()))]
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(LEVEL));
    encoder
        .write_all(data)
        .map_err(|e| Error::corrupt(format!("deflate failed: {e}")))?;
    let out = encoder
        .finish()
        .map_err(|e| Error::corrupt(format!("deflate failed: {e}")))?;

    debug!("deflated {} -> {} bytes", data.len(), out.len());
    Ok(out)
}

/// Inflate a zlib stream
///
/// Any codec error is reported as [`Error::CorruptArchive`].
#[instrument(skip_all, err, fields(len = data.len()))]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::corrupt(format!("inflate failed: {e}")))?;
    debug!("inflated {} -> {} bytes", data.len(), out.len());
    Ok(out)
}
