//! Fixed-column PDB format support

pub mod layout;
pub mod parser;
pub mod writer;

pub use parser::{read_pdb_str, PdbReader};
pub use writer::{format_check, write_pdb_string, PdbWriter, WriteOptions};
