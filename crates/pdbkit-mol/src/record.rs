//! Atom record data structure
//!
//! Provides the `AtomRecord` struct holding one atom/heteroatom observation
//! from either file format, plus a fluent builder.

use serde::{Deserialize, Serialize};

use crate::element::infer_element;
use crate::residue::ResidueId;

/// Record kind distinguishing standard atoms from heteroatoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Standard polymer atom (PDB "ATOM", PDBML group_PDB "ATOM")
    Atom,
    /// Heteroatom (PDB "HETATM", PDBML group_PDB "HETATM")
    Hetatm,
}

impl RecordKind {
    /// The 6-character PDB record keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM  ",
            RecordKind::Hetatm => "HETATM",
        }
    }

    /// The PDBML group_PDB value for this kind
    pub fn group(&self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }
}

/// Identity of one physical atom, shared by its alternate-location conformers
///
/// Records with equal keys but different `alt_loc` values describe the same
/// atom in different conformations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConformerKey {
    /// Chain identifier (full string, case-sensitive)
    pub chain_id: String,
    /// Author residue number
    pub residue_number: i32,
    /// Insertion code (' ' when absent)
    pub insertion_code: char,
    /// Trimmed atom name
    pub atom_name: String,
}

/// One parsed atom/heteroatom observation
///
/// Fields mirror the union of what the PDB fixed-column format and the PDBML
/// markup format carry. Lists of records preserve source encounter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    /// Standard atom or heteroatom
    pub record_kind: RecordKind,

    /// Atom serial number (unique within a model, not globally enforced)
    pub serial: i32,

    /// Trimmed atom name (e.g. "CA", "HB2")
    pub atom_name: String,

    /// Exact original 4-character atom name field, justification preserved
    ///
    /// The PDB justification rule is format-dependent and lossy to infer
    /// from the trimmed name, so the raw field is kept separately. Empty
    /// when the record did not originate from a fixed-column file.
    pub atom_name_raw: String,

    /// Residue name (3-4 characters)
    pub residue_name: String,

    /// Chain identifier; multi-character labels are first-class
    pub chain_id: String,

    /// Author residue sequence number (signed)
    pub residue_number: i32,

    /// Insertion code, ' ' when absent
    pub insertion_code: char,

    /// X coordinate (Angstroms)
    pub x: f64,
    /// Y coordinate (Angstroms)
    pub y: f64,
    /// Z coordinate (Angstroms)
    pub z: f64,

    /// Occupancy
    pub occupancy: f64,

    /// Alternate location indicator, ' ' when no alternate conformation
    pub alt_loc: char,

    /// Temperature factor (B-value)
    pub b_factor: f64,

    /// Segment identifier (4-character legacy extension), empty when absent
    pub segment_id: String,

    /// Element symbol (1-2 characters), empty when the source carried none
    pub element: String,

    /// Formal charge
    pub formal_charge: i8,

    /// Partial charge; independent of formal charge in the model though
    /// typically equal in practice
    pub partial_charge: f64,
}

impl Default for AtomRecord {
    fn default() -> Self {
        AtomRecord {
            record_kind: RecordKind::Atom,
            serial: 0,
            atom_name: String::new(),
            atom_name_raw: String::new(),
            residue_name: String::new(),
            chain_id: " ".to_string(),
            residue_number: 0,
            insertion_code: ' ',
            x: 0.0,
            y: 0.0,
            z: 0.0,
            occupancy: 1.0,
            alt_loc: ' ',
            b_factor: 0.0,
            segment_id: String::new(),
            element: String::new(),
            formal_charge: 0,
            partial_charge: 0.0,
        }
    }
}

impl AtomRecord {
    /// Create a record with the given name and serial, everything else default
    pub fn new(serial: i32, name: impl Into<String>) -> Self {
        let name = name.into();
        AtomRecord {
            serial,
            atom_name: name,
            ..Default::default()
        }
    }

    /// Check if this record is a heteroatom
    #[inline]
    pub fn is_hetatm(&self) -> bool {
        self.record_kind == RecordKind::Hetatm
    }

    /// The alternate-location identity of this record
    ///
    /// Records sharing a key but differing in `alt_loc` are conformers of
    /// the same physical atom.
    pub fn conformer_key(&self) -> ConformerKey {
        ConformerKey {
            chain_id: self.chain_id.clone(),
            residue_number: self.residue_number,
            insertion_code: self.insertion_code,
            atom_name: self.atom_name.clone(),
        }
    }

    /// Author-numbering residue identity of this record
    pub fn residue_id(&self) -> ResidueId {
        ResidueId::new(self.residue_number, self.insertion_code)
    }

    /// The element symbol to use on output
    ///
    /// Returns the stored symbol when the record carries one; otherwise the
    /// symbol is inferred from the raw atom name (falling back to the
    /// trimmed name when no raw field was preserved).
    pub fn effective_element(&self) -> String {
        let stored = self.element.trim();
        if !stored.is_empty() {
            return stored.to_string();
        }
        let name = if self.atom_name_raw.is_empty() {
            &self.atom_name
        } else {
            &self.atom_name_raw
        };
        infer_element(name, self.record_kind)
    }
}

impl std::fmt::Display for AtomRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}{}{}/{}",
            self.chain_id,
            self.residue_name,
            self.residue_number,
            if self.insertion_code != ' ' {
                self.insertion_code.to_string()
            } else {
                String::new()
            },
            self.atom_name
        )
    }
}

/// Builder for creating atom records with a fluent interface
#[derive(Debug, Default)]
pub struct AtomRecordBuilder {
    record: AtomRecord,
}

impl AtomRecordBuilder {
    /// Create a new builder with default field values
    pub fn new() -> Self {
        AtomRecordBuilder::default()
    }

    /// Set the record kind
    pub fn kind(mut self, kind: RecordKind) -> Self {
        self.record.record_kind = kind;
        self
    }

    /// Mark the record as a heteroatom
    pub fn hetatm(mut self) -> Self {
        self.record.record_kind = RecordKind::Hetatm;
        self
    }

    /// Set the serial number
    pub fn serial(mut self, serial: i32) -> Self {
        self.record.serial = serial;
        self
    }

    /// Set the trimmed atom name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.atom_name = name.into();
        self
    }

    /// Set the exact 4-character raw atom name field
    pub fn name_raw(mut self, raw: impl Into<String>) -> Self {
        self.record.atom_name_raw = raw.into();
        self
    }

    /// Set residue name and number together
    pub fn residue(mut self, name: impl Into<String>, number: i32) -> Self {
        self.record.residue_name = name.into();
        self.record.residue_number = number;
        self
    }

    /// Set the chain identifier
    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.record.chain_id = chain.into();
        self
    }

    /// Set the insertion code
    pub fn insertion(mut self, code: char) -> Self {
        self.record.insertion_code = code;
        self
    }

    /// Set the coordinates
    pub fn coords(mut self, x: f64, y: f64, z: f64) -> Self {
        self.record.x = x;
        self.record.y = y;
        self.record.z = z;
        self
    }

    /// Set the occupancy
    pub fn occupancy(mut self, occupancy: f64) -> Self {
        self.record.occupancy = occupancy;
        self
    }

    /// Set the alternate location indicator
    pub fn alt_loc(mut self, alt: char) -> Self {
        self.record.alt_loc = alt;
        self
    }

    /// Set the temperature factor
    pub fn b_factor(mut self, b: f64) -> Self {
        self.record.b_factor = b;
        self
    }

    /// Set the segment identifier
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.record.segment_id = segment.into();
        self
    }

    /// Set the element symbol
    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.record.element = element.into();
        self
    }

    /// Set the formal charge (partial charge follows unless set separately)
    pub fn formal_charge(mut self, charge: i8) -> Self {
        self.record.formal_charge = charge;
        self.record.partial_charge = charge as f64;
        self
    }

    /// Set the partial charge
    pub fn partial_charge(mut self, charge: f64) -> Self {
        self.record.partial_charge = charge;
        self
    }

    /// Build the record
    pub fn build(self) -> AtomRecord {
        self.record
    }
}

/// Reduce alternate-location conformers to one record per atom identity
///
/// Records sharing a [`ConformerKey`] are ranked by occupancy (highest
/// first, ties kept in encounter order) and the `rank`-th one is kept
/// (1-based). A rank beyond the number of conformers keeps the last, so a
/// request never empties an identity group. Records with no alternates are
/// always kept. Encounter order of the surviving records is preserved.
pub fn select_occupancy_rank(records: Vec<AtomRecord>, rank: usize) -> Vec<AtomRecord> {
    use std::collections::HashMap;

    let rank = rank.max(1);

    let mut groups: HashMap<ConformerKey, Vec<usize>> = HashMap::new();
    for (idx, rec) in records.iter().enumerate() {
        groups.entry(rec.conformer_key()).or_default().push(idx);
    }

    let mut keep = vec![true; records.len()];
    for indices in groups.values() {
        if indices.len() < 2 {
            continue;
        }
        let mut ranked = indices.clone();
        ranked.sort_by(|&a, &b| records[b].occupancy.total_cmp(&records[a].occupancy));
        let chosen = ranked[(rank - 1).min(ranked.len() - 1)];
        for &idx in indices {
            keep[idx] = idx == chosen;
        }
    }

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(rec, k)| k.then_some(rec))
        .collect()
}
