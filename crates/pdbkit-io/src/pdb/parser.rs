//! PDB file parser
//!
//! Parses fixed-column PDB coordinate files into atom record lists.

use std::io::{BufRead, BufReader, Read};

use nom::IResult;
use pdbkit_mol::{parse_pdb_charge, select_occupancy_rank, AtomRecord, RecordKind};

use crate::error::IoResult;
use crate::options::ReadOptions;
use crate::pdb::layout;

/// PDB file reader
pub struct PdbReader<R> {
    reader: BufReader<R>,
    line_number: usize,
    options: ReadOptions,
}

impl<R: Read> PdbReader<R> {
    /// Create a new PDB reader with default options
    pub fn new(reader: R) -> Self {
        PdbReader {
            reader: BufReader::new(reader),
            line_number: 0,
            options: ReadOptions::default(),
        }
    }

    /// Create a PDB reader with explicit read options
    pub fn with_options(reader: R, options: ReadOptions) -> Self {
        PdbReader {
            reader: BufReader::new(reader),
            line_number: 0,
            options,
        }
    }

    /// Read a single line from the file
    fn read_line(&mut self) -> IoResult<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_number += 1;
                Ok(Some(line))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse the stream into an atom record list in file order
    ///
    /// An empty list is a valid result for input with no eligible atom
    /// lines; it is not an error.
    pub fn read(&mut self) -> IoResult<Vec<AtomRecord>> {
        let mut atoms: Vec<AtomRecord> = Vec::new();

        // Model bookkeeping: block 0 is "before any MODEL record"
        let mut model_block: usize = 0;
        let mut model_number: usize = 1;

        while let Some(line) = self.read_line()? {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }

            // get() rather than slicing: a multi-byte character straddling
            // the keyword column must not abort the read
            let record_type = line.get(0..6).unwrap_or(line);

            match record_type {
                "ATOM  " | "HETATM" => {
                    if !self.in_selected_model(model_block, model_number) {
                        continue;
                    }
                    if record_type == "HETATM" && !self.options.all_atoms {
                        continue;
                    }
                    match parse_atom_record(line) {
                        Ok((_, record)) => atoms.push(record),
                        Err(_) => {
                            // Too short for the mandatory fields: skip, not fatal
                            log::warn!(
                                "skipping malformed atom line {}: {:?}",
                                self.line_number,
                                line
                            );
                        }
                    }
                }
                "MODEL " | "MODEL" => {
                    model_block += 1;
                    model_number = line
                        .get(10..14)
                        .and_then(|s| s.trim().parse().ok())
                        .unwrap_or(model_block);
                }
                "ENDMDL" => {}
                "END   " | "END" => break,
                _ => {
                    // Header, trailer and annotation records are not atoms
                }
            }
        }

        if let Some(rank) = self.options.occupancy_rank {
            atoms = select_occupancy_rank(atoms, rank);
        }
        // Blank occupancy is negative through ranking so unspecified
        // conformers rank below every measured one, including an explicit
        // 0.00; surviving records read as fully occupied
        for atom in &mut atoms {
            if atom.occupancy < 0.0 {
                atom.occupancy = 1.0;
            }
        }

        Ok(atoms)
    }

    /// Whether atoms at the current position belong to the selected model
    ///
    /// Atoms before any MODEL record belong to model 1.
    fn in_selected_model(&self, block: usize, number: usize) -> bool {
        match self.options.model {
            // Default: the first model block (or everything before one)
            None => block <= 1,
            Some(target) => {
                if block == 0 {
                    target == 1
                } else {
                    number == target
                }
            }
        }
    }
}

/// Parse an ATOM or HETATM record from one fixed-column line
///
/// Blank chain, insertion-code and alternate-location fields normalize to a
/// single blank character, never an empty string, so downstream equality
/// comparisons behave consistently.
pub fn parse_atom_record(input: &str) -> IResult<&str, AtomRecord> {
    if input.len() < layout::MIN_ATOM_LINE {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Eof,
        )));
    }

    let record_kind = if input.starts_with("HETATM") {
        RecordKind::Hetatm
    } else {
        RecordKind::Atom
    };

    let serial: i32 = input
        .get(layout::SERIAL)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);

    let atom_name_raw = format!("{:<4}", input.get(layout::ATOM_NAME).unwrap_or(""));
    let atom_name = atom_name_raw.trim().to_string();
    let alt_loc = blank_char(input, layout::ALT_LOC);

    let residue_name = input
        .get(layout::RES_NAME)
        .unwrap_or("")
        .trim()
        .to_string();
    let chain_id = {
        let c = input.get(layout::CHAIN).unwrap_or(" ").trim();
        if c.is_empty() { " ".to_string() } else { c.to_string() }
    };
    let residue_number: i32 = input
        .get(layout::RES_SEQ)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let insertion_code = blank_char(input, layout::INSERT_CODE);

    let x: f64 = parse_float(input, layout::COORD_X).unwrap_or(0.0);
    let y: f64 = parse_float(input, layout::COORD_Y).unwrap_or(0.0);
    let z: f64 = parse_float(input, layout::COORD_Z).unwrap_or(0.0);

    // A blank occupancy field is carried as -1.0 until the reader defaults
    // it, keeping it distinguishable from an explicit 0.00
    let occupancy: f64 = parse_float(input, layout::OCCUPANCY).unwrap_or(-1.0);
    let b_factor: f64 = parse_float(input, layout::B_FACTOR).unwrap_or(0.0);

    let segment_id = input
        .get(layout::SEGMENT_ID)
        .unwrap_or("")
        .trim()
        .to_string();
    let element = input.get(layout::ELEMENT).unwrap_or("").trim().to_string();
    let formal_charge = parse_pdb_charge(input.get(layout::CHARGE).unwrap_or(""));

    let record = AtomRecord {
        record_kind,
        serial,
        atom_name,
        atom_name_raw,
        residue_name,
        chain_id,
        residue_number,
        insertion_code,
        x,
        y,
        z,
        occupancy,
        alt_loc,
        b_factor,
        segment_id,
        element,
        formal_charge,
        partial_charge: formal_charge as f64,
    };

    Ok(("", record))
}

fn parse_float(input: &str, range: std::ops::Range<usize>) -> Option<f64> {
    input.get(range).and_then(|s| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            s.parse().ok()
        }
    })
}

fn blank_char(input: &str, idx: usize) -> char {
    match input.as_bytes().get(idx) {
        Some(&b) if b != b' ' => b as char,
        _ => ' ',
    }
}

/// Parse a PDB document held in a string
pub fn read_pdb_str(content: &str) -> IoResult<Vec<AtomRecord>> {
    PdbReader::new(content.as_bytes()).read()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALA_CA: &str =
        "ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00 20.00           C  ";

    #[test]
    fn test_parse_atom_record() {
        let (_, record) = parse_atom_record(ALA_CA).unwrap();

        assert_eq!(record.record_kind, RecordKind::Atom);
        assert_eq!(record.serial, 1);
        assert_eq!(record.atom_name, "CA");
        assert_eq!(record.atom_name_raw, " CA ");
        assert_eq!(record.residue_name, "ALA");
        assert_eq!(record.chain_id, "A");
        assert_eq!(record.residue_number, 1);
        assert_eq!(record.insertion_code, ' ');
        assert!((record.x - 1.0).abs() < 1e-9);
        assert!((record.y - 2.0).abs() < 1e-9);
        assert!((record.z - 3.0).abs() < 1e-9);
        assert!((record.occupancy - 1.0).abs() < 1e-9);
        assert!((record.b_factor - 20.0).abs() < 1e-9);
        assert_eq!(record.element, "C");
        assert_eq!(record.formal_charge, 0);
    }

    #[test]
    fn test_parse_hetatm_with_charge() {
        let line =
            "HETATM  500 FE   HEM A 154       8.128   7.371 -15.022  1.00 40.86          FE3+";
        let (_, record) = parse_atom_record(line).unwrap();

        assert_eq!(record.record_kind, RecordKind::Hetatm);
        assert_eq!(record.atom_name, "FE");
        assert_eq!(record.atom_name_raw, "FE  ");
        assert_eq!(record.element, "FE");
        assert_eq!(record.formal_charge, 3);
        assert_eq!(record.partial_charge, 3.0);
    }

    #[test]
    fn test_blank_fields_normalize_to_single_blank() {
        // 54-column line: no occupancy, B-value, element or chain
        let line = "ATOM      1  CA  ALA     1       1.000   2.000   3.000";
        let (_, record) = parse_atom_record(line).unwrap();

        assert_eq!(record.chain_id, " ");
        assert_eq!(record.insertion_code, ' ');
        assert_eq!(record.alt_loc, ' ');
        // Raw parse marks blank occupancy negative; read() defaults it
        assert_eq!(record.occupancy, -1.0);
        assert_eq!(record.b_factor, 0.0);
        assert_eq!(record.element, "");

        let atoms = read_pdb_str(line).unwrap();
        assert_eq!(atoms[0].occupancy, 1.0);
    }

    #[test]
    fn test_short_lines_skipped() {
        let pdb = "ATOM      1  CA\nATOM garbage\n".to_string() + ALA_CA + "\n";
        let atoms = read_pdb_str(&pdb).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].serial, 1);
    }

    #[test]
    fn test_multibyte_line_is_ignored_not_fatal() {
        // 'é' spans the keyword column boundary
        let pdb = format!("ABCDEé some annotation\n{}\n", ALA_CA);
        let atoms = read_pdb_str(&pdb).unwrap();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].atom_name, "CA");
    }

    #[test]
    fn test_empty_input_is_valid_empty_result() {
        assert!(read_pdb_str("").unwrap().is_empty());
        assert!(read_pdb_str("REMARK nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn test_atoms_only_excludes_hetatm() {
        let pdb = format!(
            "{}\nHETATM    2  O   HOH A 200      10.000  10.000  10.000  1.00 30.00           O  \n",
            ALA_CA
        );
        let all = PdbReader::new(pdb.as_bytes()).read().unwrap();
        assert_eq!(all.len(), 2);

        let atoms_only =
            PdbReader::with_options(pdb.as_bytes(), ReadOptions::new().atoms_only())
                .read()
                .unwrap();
        assert_eq!(atoms_only.len(), 1);
        assert_eq!(atoms_only[0].atom_name, "CA");
    }

    fn two_model_pdb() -> String {
        "MODEL        1\n\
         ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00 20.00           C  \n\
         ENDMDL\n\
         MODEL        2\n\
         ATOM      1  CA  ALA A   1       9.000   9.000   9.000  1.00 20.00           C  \n\
         ENDMDL\n\
         END\n"
            .to_string()
    }

    #[test]
    fn test_model_selection_defaults_to_first() {
        let atoms = read_pdb_str(&two_model_pdb()).unwrap();
        assert_eq!(atoms.len(), 1);
        assert!((atoms[0].x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_selection_by_number() {
        let pdb = two_model_pdb();
        let atoms = PdbReader::with_options(pdb.as_bytes(), ReadOptions::new().with_model(2))
            .read()
            .unwrap();
        assert_eq!(atoms.len(), 1);
        assert!((atoms[0].x - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_atoms_before_first_model_belong_to_model_one() {
        let pdb = format!(
            "ATOM      9  CA  GLY A   5      42.000   0.000   0.000  1.00 10.00           C  \n{}",
            two_model_pdb()
        );

        // Selecting model 2 discards the pre-MODEL atom
        let atoms = PdbReader::with_options(pdb.as_bytes(), ReadOptions::new().with_model(2))
            .read()
            .unwrap();
        assert_eq!(atoms.len(), 1);
        assert!((atoms[0].x - 9.0).abs() < 1e-9);

        // Selecting model 1 keeps it together with the first block
        let atoms = PdbReader::with_options(pdb.as_bytes(), ReadOptions::new().with_model(1))
            .read()
            .unwrap();
        assert_eq!(atoms.len(), 2);
        assert!((atoms[0].x - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_occupancy_rank_selection() {
        let pdb = "\
ATOM      1  CB ASER A  10       1.000   0.000   0.000  0.50 15.00           C
ATOM      2  CB BSER A  10       2.000   0.000   0.000  0.75 15.00           C
ATOM      3  CB CSER A  10       3.000   0.000   0.000                       C
ATOM      4  CB DSER A  10       4.000   0.000   0.000  0.00 15.00           C
";
        let all = read_pdb_str(pdb).unwrap();
        assert_eq!(all.len(), 4);
        // Unset rank returns every conformer; the blank one reads as 1.0
        // while the explicit 0.00 keeps its value
        assert!((all[2].occupancy - 1.0).abs() < 1e-9);
        assert!(all[3].occupancy.abs() < 1e-9);

        // The unspecified-occupancy conformer ranks below every measured
        // one, so rank 1 is the highest measured occupancy
        let ranked = PdbReader::with_options(
            pdb.as_bytes(),
            ReadOptions::new().with_occupancy_rank(1),
        )
        .read()
        .unwrap();
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].occupancy - 0.75).abs() < 1e-9);
        assert!((ranked[0].x - 2.0).abs() < 1e-9);

        let second = PdbReader::with_options(
            pdb.as_bytes(),
            ReadOptions::new().with_occupancy_rank(2),
        )
        .read()
        .unwrap();
        assert_eq!(second.len(), 1);
        assert!((second[0].occupancy - 0.5).abs() < 1e-9);
        assert!((second[0].x - 1.0).abs() < 1e-9);

        // An explicit 0.00 still outranks the blank conformer
        let third = PdbReader::with_options(
            pdb.as_bytes(),
            ReadOptions::new().with_occupancy_rank(3),
        )
        .read()
        .unwrap();
        assert_eq!(third.len(), 1);
        assert!((third[0].x - 4.0).abs() < 1e-9);

        // A rank past the group size keeps the last-ranked conformer
        let past = PdbReader::with_options(
            pdb.as_bytes(),
            ReadOptions::new().with_occupancy_rank(9),
        )
        .read()
        .unwrap();
        assert_eq!(past.len(), 1);
        assert!((past[0].x - 3.0).abs() < 1e-9);
    }
}
