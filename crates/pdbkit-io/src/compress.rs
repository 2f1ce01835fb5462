//! Compression/decompression support
//!
//! Provides transparent handling of gzip-compressed files. Decompression
//! happens in-process via flate2; no external decompressor is spawned and
//! no temporary spool file is created.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{IoError, IoResult};

/// gzip magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Unix compress(1) magic bytes; LZW framing has no in-process decoder here
const COMPRESS_MAGIC: [u8; 2] = [0x1f, 0x9d];

/// Compression framing recognized from the first two bytes of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No recognized compression signature
    None,
    /// gzip framing (0x1f 0x8b)
    Gzip,
    /// Unix compress/LZW framing (0x1f 0x9d)
    UnixCompress,
}

/// Classify a buffer's compression from its signature bytes
pub fn sniff_compression(bytes: &[u8]) -> Compression {
    if bytes.len() < 2 {
        return Compression::None;
    }
    match [bytes[0], bytes[1]] {
        GZIP_MAGIC => Compression::Gzip,
        COMPRESS_MAGIC => Compression::UnixCompress,
        _ => Compression::None,
    }
}

/// Read an entire stream, decompressing transparently when its signature
/// indicates gzip framing
///
/// Unix compress framing is recognized but refused with a
/// [`IoError::Decompression`]: there is no in-process LZW decoder, and the
/// library deliberately does not spawn external processes.
pub fn read_maybe_compressed<R: Read>(mut reader: R) -> IoResult<Vec<u8>> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    decompress_bytes(raw)
}

/// Decompress a buffer according to its signature, or pass it through
pub fn decompress_bytes(raw: Vec<u8>) -> IoResult<Vec<u8>> {
    match sniff_compression(&raw) {
        Compression::None => Ok(raw),
        Compression::Gzip => {
            log::debug!("gzip signature detected, decompressing in-process");
            let mut decoder = GzDecoder::new(raw.as_slice());
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| IoError::decompression(format!("gzip: {}", e)))?;
            Ok(out)
        }
        Compression::UnixCompress => Err(IoError::decompression(
            "Unix compress (.Z) input is not supported; re-compress with gzip",
        )),
    }
}
