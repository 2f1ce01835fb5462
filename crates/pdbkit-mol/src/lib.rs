//! Atom record data model for macromolecular coordinate files
//!
//! This crate provides the canonical in-memory representation shared by the
//! PDB and PDBML readers/writers in `pdbkit-io`:
//!
//! - [`AtomRecord`] - one parsed ATOM/HETATM observation with every field
//!   either format carries (raw atom name, chain, charges, element, ...)
//! - [`RecordKind`] - standard atom vs. heteroatom
//! - [`ResidueId`] / [`Zone`] - author-numbering residue identity, ordering
//!   and inclusive zone containment
//! - element symbol inference for records that carry no explicit element
//!
//! # Architecture
//!
//! Records are kept in a flat `Vec<AtomRecord>` in source encounter order.
//! There is no residue/chain tree: residue and chain information is stored
//! inline in each record, and consumers either own the whole list or borrow
//! it for the duration of one call.
//!
//! # Example
//!
//! ```rust
//! use pdbkit_mol::{AtomRecord, AtomRecordBuilder, RecordKind};
//!
//! let ca = AtomRecordBuilder::new()
//!     .serial(1)
//!     .name("CA")
//!     .residue("ALA", 1)
//!     .chain("A")
//!     .coords(1.0, 2.0, 3.0)
//!     .element("C")
//!     .build();
//!
//! assert_eq!(ca.record_kind, RecordKind::Atom);
//! assert_eq!(ca.atom_name, "CA");
//! ```

mod charge;
mod element;
mod record;
mod residue;

pub use charge::{format_pdb_charge, parse_pdb_charge};
pub use element::{infer_element, is_element_symbol};
pub use record::{select_occupancy_rank, AtomRecord, AtomRecordBuilder, ConformerKey, RecordKind};
pub use residue::{ResidueId, Zone};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::charge::{format_pdb_charge, parse_pdb_charge};
    pub use crate::element::infer_element;
    pub use crate::record::{AtomRecord, AtomRecordBuilder, RecordKind};
    pub use crate::residue::{ResidueId, Zone};
}
