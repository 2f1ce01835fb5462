//! Element symbol tables and inference
//!
//! The legacy format frequently omits the element columns (hydrogens in
//! particular), so the PDBML writer must derive a symbol from the atom name.
//! The naming convention is ambiguous without justification context: "HG11"
//! is a hydrogen, not mercury, while a heteroatom "FE" really is iron.

use phf::phf_set;

use crate::record::RecordKind;

/// Uppercase symbols of every element with a two-letter symbol
static TWO_LETTER_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "HE", "LI", "BE", "NE", "NA", "MG", "AL", "SI", "CL", "AR", "CA", "SC",
    "TI", "CR", "MN", "FE", "CO", "NI", "CU", "ZN", "GA", "GE", "AS", "SE",
    "BR", "KR", "RB", "SR", "ZR", "NB", "MO", "TC", "RU", "RH", "PD", "AG",
    "CD", "IN", "SN", "SB", "TE", "XE", "CS", "BA", "LA", "CE", "PR", "ND",
    "PM", "SM", "EU", "GD", "TB", "DY", "HO", "ER", "TM", "YB", "LU", "HF",
    "TA", "RE", "OS", "IR", "PT", "AU", "HG", "TL", "PB", "BI", "PO", "AT",
    "RN", "FR", "RA", "AC", "TH", "PA", "NP", "PU", "AM", "CM", "BK", "CF",
    "ES", "FM", "MD", "NO", "LR",
};

/// Single-letter element symbols (D kept for deuterium, PDB convention)
static ONE_LETTER_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "H", "D", "B", "C", "N", "O", "F", "P", "S", "K", "V", "Y", "I", "W", "U",
};

/// Two-character protein/nucleic-acid atom names that are single-letter
/// elements, not the metal the same two letters would name (a standard-atom
/// CA is an alpha carbon, not calcium; ND a nitrogen, not neodymium)
static COMMON_PROTEIN_NAMES: phf::Set<&'static str> = phf_set! {
    "CA", "CB", "CG", "CD", "CE", "CZ", "CH",
    "ND", "NE", "NH", "NZ",
    "OD", "OE", "OG", "OH",
    "SD", "SG",
};

/// Check whether a string is a recognized element symbol (case-insensitive)
pub fn is_element_symbol(symbol: &str) -> bool {
    let upper = symbol.trim().to_ascii_uppercase();
    match upper.len() {
        1 => ONE_LETTER_ELEMENTS.contains(upper.as_str()),
        2 => TWO_LETTER_ELEMENTS.contains(upper.as_str()),
        _ => false,
    }
}

/// Infer an element symbol from an atom name
///
/// `name` may be either the exact 4-character raw field (preferred, since
/// the justification carries information: a leading space or digit means a
/// single-letter element) or a trimmed name.
///
/// Rules, in order:
/// - names whose first alphabetic character is H or D are hydrogen or
///   deuterium, regardless of suffix ("HB2", "1HG1", "HD21"), unless the
///   record is a heteroatom whose full name is exactly a two-letter element
///   (an HG mercury ion);
/// - a left-justified two-character name matching a two-letter element is
///   that element ("FE", "ZN"), except the common protein atom names (CA,
///   CB, NE, ...) which stay single-letter for standard atoms;
/// - otherwise the first alphabetic character is taken as a single-letter
///   symbol.
///
/// Returns an empty string for names with no alphabetic character.
pub fn infer_element(name: &str, kind: RecordKind) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let start = match chars.iter().position(|c| c.is_ascii_alphabetic()) {
        Some(idx) => idx,
        None => return String::new(),
    };
    let lead = chars[start].to_ascii_uppercase();

    if lead == 'H' || lead == 'D' {
        if kind == RecordKind::Hetatm && trimmed.len() == 2 {
            let two = trimmed.to_ascii_uppercase();
            if TWO_LETTER_ELEMENTS.contains(two.as_str()) {
                return two;
            }
        }
        return lead.to_string();
    }

    // A raw field starting with a space or digit is right-shifted, which
    // marks a single-letter element (" CD1" is a carbon, "CD  " cadmium).
    let left_justified = start == 0 && !name.starts_with(' ');
    if left_justified && trimmed.len() == 2 {
        let two = trimmed.to_ascii_uppercase();
        if TWO_LETTER_ELEMENTS.contains(two.as_str())
            && (kind == RecordKind::Hetatm || !COMMON_PROTEIN_NAMES.contains(two.as_str()))
        {
            return two;
        }
    }

    lead.to_string()
}
