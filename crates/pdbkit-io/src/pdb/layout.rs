//! Fixed-column layout of PDB coordinate records
//!
//! One place owns the byte offsets and field widths; the parser extracts
//! with these ranges and the writer renders through [`format_atom_line`],
//! so the two sides cannot drift apart.

use std::ops::Range;

use pdbkit_mol::{format_pdb_charge, AtomRecord};

/// Record keyword, columns 1-6
pub const RECORD_NAME: Range<usize> = 0..6;
/// Atom serial number, columns 7-11
pub const SERIAL: Range<usize> = 6..11;
/// Atom name, columns 13-16
pub const ATOM_NAME: Range<usize> = 12..16;
/// Alternate location indicator, column 17
pub const ALT_LOC: usize = 16;
/// Residue name, columns 18-20 (21 for four-character names)
pub const RES_NAME: Range<usize> = 17..21;
/// Chain identifier, column 22
pub const CHAIN: Range<usize> = 21..22;
/// Residue sequence number, columns 23-26
pub const RES_SEQ: Range<usize> = 22..26;
/// Insertion code, column 27
pub const INSERT_CODE: usize = 26;
/// X coordinate, columns 31-38 (8.3)
pub const COORD_X: Range<usize> = 30..38;
/// Y coordinate, columns 39-46 (8.3)
pub const COORD_Y: Range<usize> = 38..46;
/// Z coordinate, columns 47-54 (8.3)
pub const COORD_Z: Range<usize> = 46..54;
/// Occupancy, columns 55-60 (6.2)
pub const OCCUPANCY: Range<usize> = 54..60;
/// Temperature factor, columns 61-66 (6.2)
pub const B_FACTOR: Range<usize> = 60..66;
/// Segment identifier, columns 73-76
pub const SEGMENT_ID: Range<usize> = 72..76;
/// Element symbol, columns 77-78
pub const ELEMENT: Range<usize> = 76..78;
/// Formal charge, columns 79-80
pub const CHARGE: Range<usize> = 78..80;

/// A line shorter than this cannot carry the mandatory fields through the
/// Z coordinate and is skipped by the parser
pub const MIN_ATOM_LINE: usize = COORD_Z.end;

/// Justify an atom name into its 4-character field
///
/// Names of two-letter elements are left-justified from the first column
/// of the field; single-letter element names are right-shifted by one and
/// padded. Four-character names fill the field as-is.
pub fn justify_atom_name(name: &str, element: &str) -> String {
    let name = name.trim();
    if name.len() >= 4 {
        return name[..4].to_string();
    }
    if element.trim().len() >= 2 || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{:<4}", name)
    } else {
        format!(" {:<3}", name)
    }
}

/// Render one ATOM/HETATM line (80 columns, no trailing newline)
///
/// The atom name field uses `atom_name_raw` verbatim when the record
/// preserves one, so a read-then-write round trip of legacy-origin input
/// reproduces the original bytes.
pub fn format_atom_line(rec: &AtomRecord) -> String {
    let element = rec.effective_element();

    let name = if rec.atom_name_raw.len() == 4 {
        rec.atom_name_raw.clone()
    } else {
        justify_atom_name(&rec.atom_name, &element)
    };

    let residue = if rec.residue_name.len() >= 4 {
        rec.residue_name[..4].to_string()
    } else {
        format!("{:>3} ", rec.residue_name)
    };

    let chain = rec.chain_id.chars().next().unwrap_or(' ');

    format!(
        "{}{:5} {}{}{}{}{:4}{}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}      {:<4}{:>2}{}",
        rec.record_kind.keyword(),
        rec.serial % 100000,
        name,
        rec.alt_loc,
        residue,
        chain,
        rec.residue_number,
        rec.insertion_code,
        rec.x,
        rec.y,
        rec.z,
        rec.occupancy,
        rec.b_factor,
        rec.segment_id,
        element,
        format_pdb_charge(rec.formal_charge),
    )
}

/// Render a TER sub-record terminating a chain
pub fn format_ter_line(serial: i32, rec: &AtomRecord) -> String {
    format!(
        "TER   {:5}      {:>3} {}{:4}{}",
        serial,
        if rec.residue_name.len() > 3 {
            &rec.residue_name[..3]
        } else {
            &rec.residue_name
        },
        rec.chain_id.chars().next().unwrap_or(' '),
        rec.residue_number,
        rec.insertion_code,
    )
}
