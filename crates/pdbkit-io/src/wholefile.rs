//! Whole-file reading and writing
//!
//! The body parsers and writers deal only in atom records. This layer
//! carries the rest of a coordinate file across a round trip: raw header
//! lines, raw trailer lines, and the format the data arrived in. PDBML
//! input has no raw header text, so one is synthesized from the document's
//! metadata instead.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use pdbkit_mol::AtomRecord;
use serde::{Deserialize, Serialize};

use crate::compress::read_maybe_compressed;
use crate::detect::{detect_format, CoordFormat};
use crate::error::{IoError, IoResult};
use crate::options::ReadOptions;
use crate::pdb::{PdbReader, PdbWriter, WriteOptions};

/// Output format override for [`write_whole`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceFormat {
    /// Write whatever format the data was read in
    #[default]
    None,
    /// Always write fixed-column PDB
    Pdb,
    /// Always write PDBML
    Pdbml,
}

/// Per-session I/O state
///
/// Carried explicitly by the caller rather than living in process-wide
/// globals, so concurrent sessions with different settings never race.
#[derive(Debug, Clone, Default)]
pub struct IoContext {
    /// Set by [`read_whole`] to reflect the format actually detected
    pub read_pdbml: bool,
    /// Output format override consulted by [`write_whole`]
    pub force: ForceFormat,
}

/// A coordinate file with its non-atom content preserved
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WholeFile {
    /// Raw lines preceding the first atom record (or synthesized, for PDBML)
    pub header: Vec<String>,
    pub atoms: Vec<AtomRecord>,
    /// Raw CONECT/MASTER/END lines in encounter order
    pub trailer: Vec<String>,
    /// Format the data was read in
    pub format: CoordFormat,
}

impl WholeFile {
    pub fn new(atoms: Vec<AtomRecord>) -> Self {
        WholeFile {
            atoms,
            ..WholeFile::default()
        }
    }
}

fn keyword(line: &str) -> &str {
    if line.len() < 6 {
        return line.trim_end();
    }
    // None when a multi-byte character straddles the keyword column; no
    // record keyword contains one
    line.get(..6).map_or("", str::trim_end)
}

fn is_body_start(line: &str) -> bool {
    matches!(keyword(line), "ATOM" | "HETATM" | "MODEL")
}

fn is_trailer(line: &str) -> bool {
    matches!(keyword(line), "CONECT" | "MASTER" | "END")
}

/// Read a complete coordinate file from a stream
///
/// Gzip-compressed input is decompressed transparently. The format is
/// detected from the decompressed bytes, and `ctx.read_pdbml` is updated
/// to reflect what was found.
pub fn read_whole<R: Read>(
    reader: R,
    options: ReadOptions,
    ctx: &mut IoContext,
) -> IoResult<WholeFile> {
    let bytes = read_maybe_compressed(reader)?;
    let format = detect_format(&bytes);
    log::debug!("detected {} input ({} bytes)", format.name(), bytes.len());
    ctx.read_pdbml = format == CoordFormat::Pdbml;

    match format {
        CoordFormat::Pdb => read_whole_pdb(&bytes, options),
        CoordFormat::Pdbml => read_whole_pdbml(&bytes, options),
    }
}

/// Read a complete coordinate file from a path
pub fn read_whole_file(
    path: impl AsRef<Path>,
    options: ReadOptions,
    ctx: &mut IoContext,
) -> IoResult<WholeFile> {
    let file = File::open(path)?;
    read_whole(BufReader::new(file), options, ctx)
}

fn read_whole_pdb(bytes: &[u8], options: ReadOptions) -> IoResult<WholeFile> {
    let text = String::from_utf8_lossy(bytes);
    let mut header = Vec::new();
    let mut trailer = Vec::new();
    let mut in_header = true;
    for line in text.lines() {
        if in_header {
            if is_body_start(line) {
                in_header = false;
            } else {
                header.push(line.to_string());
                continue;
            }
        }
        if is_trailer(line) {
            trailer.push(line.to_string());
        }
    }

    let atoms = PdbReader::with_options(Cursor::new(bytes), options).read()?;
    Ok(WholeFile {
        header,
        atoms,
        trailer,
        format: CoordFormat::Pdb,
    })
}

#[cfg(feature = "pdbml")]
fn read_whole_pdbml(bytes: &[u8], options: ReadOptions) -> IoResult<WholeFile> {
    use crate::pdbml::PdbmlReader;

    let doc = PdbmlReader::with_options(Cursor::new(bytes), options).read()?;
    let header = synthesize_header(&doc);
    Ok(WholeFile {
        header,
        atoms: doc.atoms,
        trailer: vec!["END".to_string()],
        format: CoordFormat::Pdbml,
    })
}

#[cfg(not(feature = "pdbml"))]
fn read_whole_pdbml(_bytes: &[u8], _options: ReadOptions) -> IoResult<WholeFile> {
    Err(IoError::PdbmlUnsupported)
}

/// Write a complete coordinate file
///
/// The output format is the one the data was read in unless `ctx.force`
/// overrides it. For fixed-column output the chain-width format check runs
/// before the header is emitted, so a failing write leaves the stream
/// untouched.
pub fn write_whole<W: Write>(writer: W, whole: &WholeFile, ctx: &IoContext) -> IoResult<()> {
    let format = match ctx.force {
        ForceFormat::Pdb => CoordFormat::Pdb,
        ForceFormat::Pdbml => CoordFormat::Pdbml,
        ForceFormat::None => whole.format,
    };
    match format {
        CoordFormat::Pdb => write_whole_pdb(writer, whole),
        CoordFormat::Pdbml => write_whole_pdbml(writer, whole),
    }
}

/// Write a complete coordinate file to a path
pub fn write_whole_file(
    path: impl AsRef<Path>,
    whole: &WholeFile,
    ctx: &IoContext,
) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_whole(&mut writer, whole, ctx)?;
    writer.flush()?;
    Ok(())
}

fn write_whole_pdb<W: Write>(mut writer: W, whole: &WholeFile) -> IoResult<()> {
    if let Some(bad) = whole.atoms.iter().find(|r| r.chain_id.chars().count() > 1) {
        return Err(IoError::ChainTooLong(bad.chain_id.clone()));
    }
    for line in &whole.header {
        writeln!(writer, "{}", line)?;
    }
    // The terminator comes after the trailer, so the writer's own END is
    // suppressed and one is appended here when the trailer lacks it (a
    // source truncated before END still gets a terminator)
    let options = WriteOptions {
        end_record: false,
        ..WriteOptions::default()
    };
    PdbWriter::with_options(&mut writer, options).write(&whole.atoms)?;
    for line in &whole.trailer {
        writeln!(writer, "{}", line)?;
    }
    if !whole.trailer.iter().any(|l| keyword(l) == "END") {
        writeln!(writer, "END")?;
    }
    Ok(())
}

#[cfg(feature = "pdbml")]
fn write_whole_pdbml<W: Write>(writer: W, whole: &WholeFile) -> IoResult<()> {
    // PDBML is self-contained; header and trailer text have no slot there
    crate::pdbml::PdbmlWriter::new(writer).write(&whole.atoms)
}

#[cfg(not(feature = "pdbml"))]
fn write_whole_pdbml<W: Write>(_writer: W, _whole: &WholeFile) -> IoResult<()> {
    Err(IoError::PdbmlUnsupported)
}

/// Classification used when the document carries no keywords
#[cfg(feature = "pdbml")]
const DEFAULT_CLASSIFICATION: &str = "Converted from PDBML";

/// Build legacy HEADER/TITLE lines from PDBML metadata
#[cfg(feature = "pdbml")]
pub fn synthesize_header(doc: &crate::pdbml::PdbmlDocument) -> Vec<String> {
    let classification = doc.keywords.as_deref().unwrap_or(DEFAULT_CLASSIFICATION);
    let classification: String = classification.chars().take(40).collect();
    let date = doc
        .revision_date
        .as_deref()
        .map(legacy_date)
        .unwrap_or_default();
    let id = doc.entry_id.as_deref().unwrap_or("");

    let mut lines = vec![format!(
        "HEADER    {:<40}{:<9}   {:<4}",
        classification, date, id
    )];
    if let Some(title) = doc.title.as_deref() {
        lines.extend(wrap_title(title));
    }
    lines
}

/// Reformat a YYYY-MM-DD date as DD-MMM-YY
///
/// Out-of-range components yield an empty string rather than an error; the
/// HEADER date field is informational and a blank beats a bogus value.
#[cfg(feature = "pdbml")]
fn legacy_date(iso: &str) -> String {
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];

    let mut parts = iso.splitn(3, '-');
    let year: u32 = match parts.next().and_then(|p| p.parse().ok()) {
        Some(y) if (1000..10000).contains(&y) => y,
        _ => return String::new(),
    };
    let month: usize = match parts.next().and_then(|p| p.parse().ok()) {
        Some(m) if (1..=12).contains(&m) => m,
        _ => return String::new(),
    };
    let day: u32 = match parts.next().and_then(|p| p.parse().ok()) {
        Some(d) if (1..=31).contains(&d) => d,
        _ => return String::new(),
    };

    format!("{:02}-{}-{:02}", day, MONTHS[month - 1], year % 100)
}

/// Wrap a title into numbered TITLE continuation lines
#[cfg(feature = "pdbml")]
fn wrap_title(title: &str) -> Vec<String> {
    const WIDTH: usize = 60;

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in title.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > WIDTH {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                format!("TITLE     {}", chunk)
            } else {
                format!("TITLE   {:>2} {}", i + 1, chunk)
            }
        })
        .collect()
}
