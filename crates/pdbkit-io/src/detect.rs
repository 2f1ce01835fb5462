//! Coordinate file format detection
//!
//! Classifies a byte stream as legacy fixed-column PDB or tagged PDBML
//! without consuming it irrecoverably: the slice variants never touch a
//! stream, the seek variant rewinds to where it started.

use std::io::{BufRead, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

use crate::error::IoResult;

/// How far into the stream the detector looks for a markup signature
const DETECT_PREFIX: usize = 4096;

/// The two on-disk coordinate formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordFormat {
    /// Legacy fixed-column format
    #[default]
    Pdb,
    /// Tagged markup (PDBML/XML) format
    Pdbml,
}

impl CoordFormat {
    /// Human-readable name of the format
    pub fn name(&self) -> &'static str {
        match self {
            CoordFormat::Pdb => "PDB",
            CoordFormat::Pdbml => "PDBML",
        }
    }
}

/// Detect the format of a byte buffer
///
/// Scans a bounded prefix for an XML declaration or a recognizable root
/// tag, tolerating a UTF-8 BOM and leading whitespace. Anything else,
/// including empty input, classifies as legacy PDB: header comments of
/// arbitrary length never false-classify because none of them can open
/// an XML tag as their first non-blank byte.
pub fn detect_format(bytes: &[u8]) -> CoordFormat {
    let prefix = &bytes[..bytes.len().min(DETECT_PREFIX)];
    let prefix = prefix.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(prefix);

    let text = String::from_utf8_lossy(prefix);
    let trimmed = text.trim_start();

    if trimmed.starts_with("<?xml") {
        return CoordFormat::Pdbml;
    }
    for root in ["<PDBx:datablock", "<datablock", "<pdbx:datablock"] {
        if trimmed.starts_with(root) {
            return CoordFormat::Pdbml;
        }
    }
    CoordFormat::Pdb
}

/// Detect the format of a seekable stream, leaving it re-readable
///
/// Reads at most [`DETECT_PREFIX`] bytes and seeks back to the position the
/// stream was at when the call was made.
pub fn detect_format_seek<R: BufRead + Seek>(reader: &mut R) -> IoResult<CoordFormat> {
    let start = reader.stream_position()?;

    let mut prefix = Vec::with_capacity(DETECT_PREFIX);
    let mut remaining = DETECT_PREFIX;
    while remaining > 0 {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        let take = buf.len().min(remaining);
        prefix.extend_from_slice(&buf[..take]);
        reader.consume(take);
        remaining -= take;
    }

    reader.seek(SeekFrom::Start(start))?;
    Ok(detect_format(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn test_detect_pdb() {
        let pdb = b"HEADER    HYDROLASE                 01-JAN-99   1ABC\n\
                    ATOM      1  N   ALA A   1       0.000   0.000   0.000\n";
        assert_eq!(detect_format(pdb), CoordFormat::Pdb);
    }

    #[test]
    fn test_detect_pdbml() {
        let xml = b"<?xml version=\"1.0\"?>\n<PDBx:datablock>";
        assert_eq!(detect_format(xml), CoordFormat::Pdbml);

        let bare = b"  \n<PDBx:datablock xmlns:PDBx=\"x\">";
        assert_eq!(detect_format(bare), CoordFormat::Pdbml);
    }

    #[test]
    fn test_detect_bom_and_whitespace() {
        let mut with_bom = vec![0xEF, 0xBB, 0xBF];
        with_bom.extend_from_slice(b"\n  <?xml version=\"1.0\"?>");
        assert_eq!(detect_format(&with_bom), CoordFormat::Pdbml);
    }

    #[test]
    fn test_empty_defaults_to_pdb() {
        assert_eq!(detect_format(b""), CoordFormat::Pdb);
    }

    #[test]
    fn test_long_header_stays_pdb() {
        let mut long = String::new();
        for i in 0..200 {
            long.push_str(&format!("REMARK 999 padding line {}\n", i));
        }
        long.push_str("ATOM      1  N   ALA A   1       0.000   0.000   0.000\n");
        assert_eq!(detect_format(long.as_bytes()), CoordFormat::Pdb);
    }

    #[test]
    fn test_detect_seek_is_non_destructive() {
        let data = b"<?xml version=\"1.0\"?>\n<PDBx:datablock/>\n";
        let mut cursor = Cursor::new(&data[..]);

        assert_eq!(detect_format_seek(&mut cursor).unwrap(), CoordFormat::Pdbml);

        // The stream reads identically from its original position
        let mut replay = Vec::new();
        cursor.read_to_end(&mut replay).unwrap();
        assert_eq!(replay, data);
    }
}
