//! Residue identity, ordering and zone containment
//!
//! Zone selection proper lives outside this library; what belongs here is
//! the author-numbering residue identity its predicates are defined over,
//! and the ordering rule the containment tests rely on.

use serde::{Deserialize, Serialize};

/// Author-numbering identity of a residue within one chain
///
/// Ordering: by residue number first, then by insertion code character.
/// A blank insertion code (' ') sorts before any letter, so residue 10
/// comes before 10A, which comes before 11. Zero and negative residue
/// numbers are ordinary signed integers with no special-casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResidueId {
    /// Author residue sequence number
    pub number: i32,
    /// Insertion code, ' ' when absent
    pub insertion: char,
}

impl ResidueId {
    /// Create a residue identity
    pub fn new(number: i32, insertion: char) -> Self {
        ResidueId { number, insertion }
    }
}

impl std::fmt::Display for ResidueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.insertion == ' ' {
            write!(f, "{}", self.number)
        } else {
            write!(f, "{}{}", self.number, self.insertion)
        }
    }
}

/// A contiguous residue range within one chain, boundaries inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Chain label; compared case-sensitively on the full string
    pub chain_id: String,
    /// First residue of the zone (inclusive)
    pub start: ResidueId,
    /// Last residue of the zone (inclusive)
    pub stop: ResidueId,
}

impl Zone {
    /// Create a zone over `[start, stop]` in the given chain
    pub fn new(chain_id: impl Into<String>, start: ResidueId, stop: ResidueId) -> Self {
        Zone {
            chain_id: chain_id.into(),
            start,
            stop,
        }
    }

    /// Check whether a residue falls inside the zone
    ///
    /// Chain comparison matches the full label, not just its first
    /// character; multi-letter chains are a first-class case.
    pub fn contains(&self, chain_id: &str, residue: ResidueId) -> bool {
        self.chain_id == chain_id && self.start <= residue && residue <= self.stop
    }
}
