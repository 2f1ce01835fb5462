//! PDB file writer
//!
//! Serializes atom record lists to fixed-column text. The chain-width
//! format check runs before any output is committed: the single-character
//! chain column cannot hold multi-letter labels, and truncating them would
//! corrupt chain identity, so the write fails atomically instead.

use std::io::Write;

use pdbkit_mol::AtomRecord;

use crate::error::{IoError, IoResult};
use crate::pdb::layout;

/// Options for writing PDB output
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Frame the body in MODEL/ENDMDL markers
    pub model_records: bool,
    /// Model number for the MODEL marker
    pub model_number: usize,
    /// Emit the END terminator line after the body
    pub end_record: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            model_records: false,
            model_number: 1,
            end_record: true,
        }
    }
}

/// Check that every record fits the PDB format's constraints
///
/// The only constraint the in-memory model can violate is the chain
/// column: one character wide, while `chain_id` is an arbitrary string.
/// Callable separately so callers can pre-flight without attempting a
/// write.
pub fn format_check(records: &[AtomRecord]) -> bool {
    records.iter().all(|r| r.chain_id.chars().count() <= 1)
}

/// PDB file writer
pub struct PdbWriter<W> {
    writer: W,
    options: WriteOptions,
}

impl<W: Write> PdbWriter<W> {
    /// Create a new PDB writer with default options
    pub fn new(writer: W) -> Self {
        PdbWriter {
            writer,
            options: WriteOptions::default(),
        }
    }

    /// Create a PDB writer with explicit options
    pub fn with_options(writer: W, options: WriteOptions) -> Self {
        PdbWriter { writer, options }
    }

    /// Serialize the record list
    ///
    /// Fails with [`IoError::ChainTooLong`] before emitting a single byte
    /// when any record's chain label exceeds one character. A TER
    /// sub-record is inserted at every chain transition and after the last
    /// atom.
    pub fn write(&mut self, records: &[AtomRecord]) -> IoResult<()> {
        if let Some(bad) = records.iter().find(|r| r.chain_id.chars().count() > 1) {
            return Err(IoError::ChainTooLong(bad.chain_id.clone()));
        }

        if self.options.model_records {
            writeln!(self.writer, "MODEL     {:4}", self.options.model_number)?;
        }

        let mut previous: Option<&AtomRecord> = None;
        for record in records {
            if let Some(prev) = previous {
                if prev.chain_id != record.chain_id {
                    writeln!(self.writer, "{}", layout::format_ter_line(prev.serial + 1, prev))?;
                }
            }
            writeln!(self.writer, "{}", layout::format_atom_line(record))?;
            previous = Some(record);
        }
        if let Some(last) = previous {
            writeln!(self.writer, "{}", layout::format_ter_line(last.serial + 1, last))?;
        }

        if self.options.model_records {
            writeln!(self.writer, "ENDMDL")?;
        }
        if self.options.end_record {
            writeln!(self.writer, "END")?;
        }

        Ok(())
    }

    /// Flush any buffered output
    pub fn flush(&mut self) -> IoResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Serialize a record list to a PDB string
pub fn write_pdb_string(records: &[AtomRecord]) -> IoResult<String> {
    let mut out = Vec::new();
    PdbWriter::new(&mut out).write(records)?;
    Ok(String::from_utf8(out).expect("PDB output is ASCII"))
}
