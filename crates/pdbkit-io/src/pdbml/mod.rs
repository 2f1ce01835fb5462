//! PDBML/XML format support

pub mod parser;
pub mod writer;

pub use parser::{read_pdbml_str, PdbmlDocument, PdbmlReader};
pub use writer::{write_pdbml_string, PdbmlWriter};
