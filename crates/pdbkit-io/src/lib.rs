//! Coordinate file I/O for macromolecular structures
//!
//! Reads and writes the two interchange formats for atomic coordinates:
//! the fixed-column PDB format and its PDBML/XML equivalent. Both map onto
//! the same in-memory [`AtomRecord`] list, so a file can be read in one
//! format and written in the other without loss of the per-atom fields.
//!
//! Gzip-compressed input is decompressed transparently, the on-disk format
//! is sniffed from content rather than file name, and the whole-file layer
//! preserves (or synthesizes) header and trailer lines across a round
//! trip.
//!
//! ```no_run
//! use pdbkit_io::{read_whole_file, write_whole_file, IoContext, ReadOptions};
//!
//! # fn main() -> pdbkit_io::IoResult<()> {
//! let mut ctx = IoContext::default();
//! let whole = read_whole_file("1abc.pdb.gz", ReadOptions::default(), &mut ctx)?;
//! println!("{} atoms", whole.atoms.len());
//! write_whole_file("out.pdb", &whole, &ctx)?;
//! # Ok(())
//! # }
//! ```
//!
//! PDBML support is behind the `pdbml` feature (enabled by default).
//! Without it, XML input and output fail with
//! [`IoError::PdbmlUnsupported`] instead of producing truncated or invalid
//! data.

pub mod compress;
pub mod detect;
pub mod error;
pub mod options;
pub mod pdb;
#[cfg(feature = "pdbml")]
pub mod pdbml;
pub mod wholefile;

pub use compress::{read_maybe_compressed, Compression};
pub use detect::{detect_format, detect_format_seek, CoordFormat};
pub use error::{IoError, IoResult};
pub use options::ReadOptions;
pub use pdb::{format_check, PdbReader, PdbWriter, WriteOptions};
#[cfg(feature = "pdbml")]
pub use pdbml::{PdbmlDocument, PdbmlReader, PdbmlWriter};
pub use wholefile::{
    read_whole, read_whole_file, write_whole, write_whole_file, ForceFormat, IoContext, WholeFile,
};

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use pdbkit_mol::AtomRecord;

/// Read just the atom records from a coordinate file
///
/// Format and compression are detected from content. Header and trailer
/// lines are discarded; use [`read_whole_file`] to keep them.
pub fn read_atoms(path: impl AsRef<Path>) -> IoResult<Vec<AtomRecord>> {
    read_atoms_with(path, ReadOptions::default())
}

/// Read atom records with explicit options
pub fn read_atoms_with(path: impl AsRef<Path>, options: ReadOptions) -> IoResult<Vec<AtomRecord>> {
    let file = File::open(path)?;
    let bytes = read_maybe_compressed(BufReader::new(file))?;
    match detect_format(&bytes) {
        CoordFormat::Pdb => pdb::PdbReader::with_options(Cursor::new(bytes), options).read(),
        #[cfg(feature = "pdbml")]
        CoordFormat::Pdbml => {
            let doc = pdbml::PdbmlReader::with_options(Cursor::new(bytes), options).read()?;
            Ok(doc.atoms)
        }
        #[cfg(not(feature = "pdbml"))]
        CoordFormat::Pdbml => Err(IoError::PdbmlUnsupported),
    }
}
