//! Error types for coordinate file I/O
//!
//! Every failure mode is a distinct variant; "no atoms found" is not an
//! error (parsers return an empty list for it), so callers can never
//! confuse a valid empty structure with a failed read.

use thiserror::Error;

/// Errors that can occur during coordinate file I/O
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fatal PDBML document failure; the markup format has no line-granular
    /// recovery, so a broken document aborts the whole parse
    #[error("PDBML document error: {0}")]
    Xml(String),

    /// PDBML support requested but compiled out (the `pdbml` feature)
    #[error("PDBML support is not enabled in this build")]
    PdbmlUnsupported,

    /// A chain label does not fit the PDB one-character chain column;
    /// reported by the pre-write format check before any output is emitted
    #[error("Chain label {0:?} does not fit the PDB single-character chain column")]
    ChainTooLong(String),

    /// Compressed input that cannot be decompressed in-process
    #[error("Decompression error: {0}")]
    Decompression(String),
}

#[cfg(feature = "pdbml")]
impl From<quick_xml::Error> for IoError {
    fn from(err: quick_xml::Error) -> Self {
        IoError::Xml(err.to_string())
    }
}

impl IoError {
    /// Create a fatal PDBML document error
    pub fn xml(message: impl Into<String>) -> Self {
        IoError::Xml(message.into())
    }

    /// Create a decompression error
    pub fn decompression(message: impl Into<String>) -> Self {
        IoError::Decompression(message.into())
    }
}

/// Result type for coordinate file I/O operations
pub type IoResult<T> = Result<T, IoError>;
