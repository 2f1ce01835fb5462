//! PDBML/XML file parser
//!
//! Streams the document with [`quick_xml`] so large entries never require a
//! full in-memory text buffer. Tag prefixes are ignored and elements are
//! matched by local name, so `PDBx:atom_site`, `pdbx:atom_site` and a bare
//! `atom_site` all parse the same way.
//!
//! Unlike the fixed-column parser, a malformed document is fatal: XML has
//! no line-granularity recovery, so the first structural error aborts the
//! whole read.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use pdbkit_mol::{select_occupancy_rank, AtomRecord, RecordKind};

use crate::error::{IoError, IoResult};
use crate::options::ReadOptions;
use crate::pdb::layout;

/// A parsed PDBML document: the atom list plus the handful of header
/// fields the legacy-header synthesizer needs.
#[derive(Debug, Default, Clone)]
pub struct PdbmlDocument {
    pub atoms: Vec<AtomRecord>,
    /// Entry identifier, from the `entry` element or the datablock name
    pub entry_id: Option<String>,
    /// Free-text title from the `struct` category
    pub title: Option<String>,
    /// Classification keywords from the `struct_keywords` category
    pub keywords: Option<String>,
    /// First revision date, in the markup's YYYY-MM-DD form
    pub revision_date: Option<String>,
}

/// Accumulator for one `atom_site` element
#[derive(Debug, Default)]
struct AtomSiteFields {
    serial: Option<i32>,
    group: Option<String>,
    auth_atom: Option<String>,
    label_atom: Option<String>,
    auth_comp: Option<String>,
    label_comp: Option<String>,
    auth_asym: Option<String>,
    label_asym: Option<String>,
    auth_seq: Option<i32>,
    label_seq: Option<i32>,
    ins_code: Option<char>,
    alt_loc: Option<char>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    occupancy: Option<f64>,
    b_factor: Option<f64>,
    element: Option<String>,
    formal_charge: Option<i8>,
    partial_charge: Option<f64>,
    model_num: Option<usize>,
}

impl AtomSiteFields {
    fn assign(&mut self, tag: &str, value: &str) {
        match tag {
            "group_PDB" => self.group = Some(value.to_string()),
            "auth_atom_id" => self.auth_atom = Some(value.to_string()),
            "label_atom_id" => self.label_atom = Some(value.to_string()),
            "auth_comp_id" => self.auth_comp = Some(value.to_string()),
            "label_comp_id" => self.label_comp = Some(value.to_string()),
            "auth_asym_id" => self.auth_asym = Some(value.to_string()),
            "label_asym_id" => self.label_asym = Some(value.to_string()),
            "auth_seq_id" => self.auth_seq = value.parse().ok(),
            "label_seq_id" => self.label_seq = value.parse().ok(),
            "pdbx_PDB_ins_code" => self.ins_code = value.chars().next(),
            "label_alt_id" => self.alt_loc = value.chars().next(),
            "Cartn_x" => self.x = value.parse().ok(),
            "Cartn_y" => self.y = value.parse().ok(),
            "Cartn_z" => self.z = value.parse().ok(),
            "occupancy" => self.occupancy = value.parse().ok(),
            "B_iso_or_equiv" => self.b_factor = value.parse().ok(),
            "type_symbol" => self.element = Some(value.to_string()),
            "pdbx_formal_charge" => self.formal_charge = value.parse().ok(),
            "partial_charge" => self.partial_charge = value.parse().ok(),
            "pdbx_PDB_model_num" => self.model_num = value.parse().ok(),
            _ => {}
        }
    }

    /// Author-assigned fields take precedence over canonical ones so that
    /// downstream zone selection sees the numbering authors publish with.
    fn finalize(self) -> AtomRecord {
        let record_kind = match self.group.as_deref() {
            Some("HETATM") => RecordKind::Hetatm,
            _ => RecordKind::Atom,
        };
        let atom_name = self.auth_atom.or(self.label_atom).unwrap_or_default();
        let element = self.element.unwrap_or_default();
        let atom_name_raw = layout::justify_atom_name(&atom_name, &element);
        let chain_id = match self.auth_asym.or(self.label_asym) {
            Some(c) if !c.trim().is_empty() => c,
            _ => " ".to_string(),
        };
        let formal_charge = self.formal_charge.unwrap_or(0);

        AtomRecord {
            record_kind,
            serial: self.serial.unwrap_or(0),
            atom_name,
            atom_name_raw,
            residue_name: self.auth_comp.or(self.label_comp).unwrap_or_default(),
            chain_id,
            residue_number: self.auth_seq.or(self.label_seq).unwrap_or(0),
            insertion_code: self.ins_code.unwrap_or(' '),
            x: self.x.unwrap_or(0.0),
            y: self.y.unwrap_or(0.0),
            z: self.z.unwrap_or(0.0),
            occupancy: self.occupancy.unwrap_or(-1.0),
            alt_loc: self.alt_loc.unwrap_or(' '),
            b_factor: self.b_factor.unwrap_or(0.0),
            segment_id: String::new(),
            element,
            formal_charge,
            partial_charge: self.partial_charge.unwrap_or(formal_charge as f64),
        }
    }
}

/// PDBML file parser
pub struct PdbmlReader<R: BufRead> {
    reader: Reader<R>,
    options: ReadOptions,
}

impl<R: BufRead> PdbmlReader<R> {
    /// Create a new PDBML parser with default options
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReadOptions::default())
    }

    /// Create a PDBML parser with explicit options
    pub fn with_options(reader: R, options: ReadOptions) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(true);
        PdbmlReader { reader, options }
    }

    /// Parse the whole document
    pub fn read(&mut self) -> IoResult<PdbmlDocument> {
        let mut buf = Vec::new();
        let mut depth: Vec<String> = Vec::new();
        let mut doc = PdbmlDocument::default();
        let mut current: Option<AtomSiteFields> = None;
        let mut text = String::new();
        let mut first_model: Option<usize> = None;

        loop {
            let event = self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| IoError::xml(e.to_string()))?;
            match event {
                Event::Start(ref e) => {
                    let name = local_name(e.name());
                    match name.as_str() {
                        "atom_site" => {
                            let mut fields = AtomSiteFields::default();
                            fields.serial = id_attribute(e)?.and_then(|v| v.trim().parse().ok());
                            current = Some(fields);
                        }
                        "entry" => {
                            if let Some(id) = id_attribute(e)? {
                                doc.entry_id = Some(id);
                            }
                        }
                        "datablock" => {
                            if doc.entry_id.is_none() {
                                doc.entry_id = attribute(e, b"datablockName")?;
                            }
                        }
                        _ => {}
                    }
                    depth.push(name);
                    text.clear();
                }
                Event::Empty(ref e) => {
                    // A self-closed leaf is a present-but-blank field
                    if local_name(e.name()) == "entry" {
                        if let Some(id) = id_attribute(e)? {
                            doc.entry_id = Some(id);
                        }
                    }
                }
                Event::Text(ref t) => {
                    text.push_str(&t.unescape().map_err(|e| IoError::xml(e.to_string()))?);
                }
                Event::End(ref e) => {
                    let name = local_name(e.name());
                    depth.pop();
                    let parent = depth.last().map(String::as_str);
                    let value = text.trim().to_string();

                    if name == "atom_site" {
                        if let Some(fields) = current.take() {
                            self.keep(fields, &mut first_model, &mut doc.atoms);
                        }
                    } else if let Some(fields) = current.as_mut() {
                        fields.assign(&name, &value);
                    } else if !value.is_empty() {
                        match (name.as_str(), parent) {
                            ("title", Some("struct")) => doc.title = Some(value),
                            ("pdbx_keywords", Some("struct_keywords")) => {
                                doc.keywords = Some(value)
                            }
                            ("date", Some("database_PDB_rev")) => {
                                if doc.revision_date.is_none() {
                                    doc.revision_date = Some(value);
                                }
                            }
                            _ => {}
                        }
                    }
                    text.clear();
                }
                Event::Eof => {
                    if !depth.is_empty() {
                        return Err(IoError::xml("unexpected end of document"));
                    }
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(rank) = self.options.occupancy_rank {
            doc.atoms = select_occupancy_rank(std::mem::take(&mut doc.atoms), rank);
        }
        // Missing occupancy stays negative through ranking, below even an
        // explicit 0.00; surviving records read as fully occupied
        for atom in &mut doc.atoms {
            if atom.occupancy < 0.0 {
                atom.occupancy = 1.0;
            }
        }
        Ok(doc)
    }

    fn keep(
        &self,
        fields: AtomSiteFields,
        first_model: &mut Option<usize>,
        atoms: &mut Vec<AtomRecord>,
    ) {
        let model = fields.model_num.unwrap_or(1);
        let in_model = match self.options.model {
            Some(target) => model == target,
            None => {
                if first_model.is_none() {
                    *first_model = Some(model);
                }
                *first_model == Some(model)
            }
        };
        if !in_model {
            return;
        }
        let record = fields.finalize();
        if !self.options.all_atoms && record.record_kind == RecordKind::Hetatm {
            return;
        }
        atoms.push(record);
    }
}

/// Element name with any namespace prefix stripped; works for start and
/// end tags alike
fn local_name(name: QName) -> String {
    String::from_utf8_lossy(name.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, key: &[u8]) -> IoResult<Option<String>> {
    match e.try_get_attribute(key) {
        Ok(Some(attr)) => {
            let value = attr
                .unescape_value()
                .map_err(|err| IoError::xml(err.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        Ok(None) => Ok(None),
        Err(err) => Err(IoError::xml(err.to_string())),
    }
}

fn id_attribute(e: &BytesStart) -> IoResult<Option<String>> {
    attribute(e, b"id")
}

/// Parse PDBML from a string
pub fn read_pdbml_str(input: &str) -> IoResult<PdbmlDocument> {
    PdbmlReader::new(input.as_bytes()).read()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ATOMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<PDBx:datablock datablockName="1ABC" xmlns:PDBx="http://pdbml.pdb.org/schema/pdbx-v50.xsd">
  <PDBx:atom_siteCategory>
    <PDBx:atom_site id="1">
      <PDBx:B_iso_or_equiv>20.00</PDBx:B_iso_or_equiv>
      <PDBx:Cartn_x>1.000</PDBx:Cartn_x>
      <PDBx:Cartn_y>2.000</PDBx:Cartn_y>
      <PDBx:Cartn_z>3.000</PDBx:Cartn_z>
      <PDBx:auth_asym_id>A</PDBx:auth_asym_id>
      <PDBx:auth_atom_id>CA</PDBx:auth_atom_id>
      <PDBx:auth_comp_id>ALA</PDBx:auth_comp_id>
      <PDBx:auth_seq_id>1</PDBx:auth_seq_id>
      <PDBx:group_PDB>ATOM</PDBx:group_PDB>
      <PDBx:label_alt_id/>
      <PDBx:label_asym_id>A</PDBx:label_asym_id>
      <PDBx:label_atom_id>CA</PDBx:label_atom_id>
      <PDBx:label_comp_id>ALA</PDBx:label_comp_id>
      <PDBx:label_seq_id>1</PDBx:label_seq_id>
      <PDBx:occupancy>1.00</PDBx:occupancy>
      <PDBx:pdbx_PDB_ins_code/>
      <PDBx:pdbx_formal_charge>0</PDBx:pdbx_formal_charge>
      <PDBx:type_symbol>C</PDBx:type_symbol>
    </PDBx:atom_site>
    <PDBx:atom_site id="2">
      <PDBx:Cartn_x>8.128</PDBx:Cartn_x>
      <PDBx:Cartn_y>7.371</PDBx:Cartn_y>
      <PDBx:Cartn_z>-15.022</PDBx:Cartn_z>
      <PDBx:auth_asym_id>LONG</PDBx:auth_asym_id>
      <PDBx:auth_atom_id>FE</PDBx:auth_atom_id>
      <PDBx:auth_comp_id>HEM</PDBx:auth_comp_id>
      <PDBx:auth_seq_id>154</PDBx:auth_seq_id>
      <PDBx:group_PDB>HETATM</PDBx:group_PDB>
      <PDBx:occupancy>1.00</PDBx:occupancy>
      <PDBx:pdbx_PDB_ins_code>A</PDBx:pdbx_PDB_ins_code>
      <PDBx:pdbx_formal_charge>3</PDBx:pdbx_formal_charge>
      <PDBx:type_symbol>FE</PDBx:type_symbol>
    </PDBx:atom_site>
  </PDBx:atom_siteCategory>
</PDBx:datablock>
"#;

    #[test]
    fn test_parse_atom_sites() {
        let doc = read_pdbml_str(TWO_ATOMS).unwrap();
        assert_eq!(doc.atoms.len(), 2);
        assert_eq!(doc.entry_id.as_deref(), Some("1ABC"));

        let ca = &doc.atoms[0];
        assert_eq!(ca.record_kind, RecordKind::Atom);
        assert_eq!(ca.serial, 1);
        assert_eq!(ca.atom_name, "CA");
        assert_eq!(ca.atom_name_raw, " CA ");
        assert_eq!(ca.residue_name, "ALA");
        assert_eq!(ca.chain_id, "A");
        assert_eq!(ca.residue_number, 1);
        assert_eq!(ca.insertion_code, ' ');
        assert_eq!(ca.alt_loc, ' ');
        assert_eq!(ca.x, 1.0);
        assert_eq!(ca.b_factor, 20.0);
        assert_eq!(ca.element, "C");

        let fe = &doc.atoms[1];
        assert_eq!(fe.record_kind, RecordKind::Hetatm);
        assert_eq!(fe.chain_id, "LONG");
        assert_eq!(fe.residue_number, 154);
        assert_eq!(fe.insertion_code, 'A');
        assert_eq!(fe.formal_charge, 3);
        assert_eq!(fe.partial_charge, 3.0);
        assert_eq!(fe.element, "FE");
        assert_eq!(fe.atom_name_raw, "FE  ");
    }

    #[test]
    fn test_auth_numbering_preferred_over_label() {
        let input = r#"<datablock>
  <atom_siteCategory>
    <atom_site id="1">
      <group_PDB>ATOM</group_PDB>
      <label_atom_id>N</label_atom_id>
      <label_seq_id>7</label_seq_id>
      <auth_seq_id>42</auth_seq_id>
      <Cartn_x>0.0</Cartn_x>
      <Cartn_y>0.0</Cartn_y>
      <Cartn_z>0.0</Cartn_z>
    </atom_site>
  </atom_siteCategory>
</datablock>"#;
        let doc = read_pdbml_str(input).unwrap();
        assert_eq!(doc.atoms[0].residue_number, 42);
        assert_eq!(doc.atoms[0].atom_name, "N");
        // No chain anywhere: normalized to a single blank, never empty
        assert_eq!(doc.atoms[0].chain_id, " ");
        // No occupancy tag: defaults to fully occupied
        assert_eq!(doc.atoms[0].occupancy, 1.0);
    }

    #[test]
    fn test_header_fields_captured() {
        let input = r#"<PDBx:datablock datablockName="1XYZ" xmlns:PDBx="http://pdbml.pdb.org/schema/pdbx-v50.xsd">
  <PDBx:database_PDB_revCategory>
    <PDBx:database_PDB_rev num="1">
      <PDBx:date>1997-05-15</PDBx:date>
    </PDBx:database_PDB_rev>
    <PDBx:database_PDB_rev num="2">
      <PDBx:date>2003-01-01</PDBx:date>
    </PDBx:database_PDB_rev>
  </PDBx:database_PDB_revCategory>
  <PDBx:structCategory>
    <PDBx:struct>
      <PDBx:title>CRYSTAL STRUCTURE OF A TEST PROTEIN</PDBx:title>
    </PDBx:struct>
  </PDBx:structCategory>
  <PDBx:struct_keywordsCategory>
    <PDBx:struct_keywords>
      <PDBx:pdbx_keywords>OXYGEN TRANSPORT</PDBx:pdbx_keywords>
    </PDBx:struct_keywords>
  </PDBx:struct_keywordsCategory>
</PDBx:datablock>"#;
        let doc = read_pdbml_str(input).unwrap();
        assert!(doc.atoms.is_empty());
        assert_eq!(doc.entry_id.as_deref(), Some("1XYZ"));
        assert_eq!(doc.title.as_deref(), Some("CRYSTAL STRUCTURE OF A TEST PROTEIN"));
        assert_eq!(doc.keywords.as_deref(), Some("OXYGEN TRANSPORT"));
        // Only the first revision date is kept
        assert_eq!(doc.revision_date.as_deref(), Some("1997-05-15"));
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let input = "<datablock><atom_siteCategory><atom_site id=\"1\">";
        let err = read_pdbml_str(input).unwrap_err();
        assert!(matches!(err, IoError::Xml(_)));
    }

    #[test]
    fn test_mismatched_tags_are_fatal() {
        let input = "<datablock><atom_siteCategory></datablock>";
        assert!(read_pdbml_str(input).is_err());
    }

    #[test]
    fn test_atoms_only_skips_hetatm() {
        let doc = PdbmlReader::with_options(TWO_ATOMS.as_bytes(), ReadOptions::new().atoms_only())
            .read()
            .unwrap();
        assert_eq!(doc.atoms.len(), 1);
        assert_eq!(doc.atoms[0].atom_name, "CA");
    }

    #[test]
    fn test_model_selection() {
        let input = r#"<datablock>
  <atom_siteCategory>
    <atom_site id="1">
      <group_PDB>ATOM</group_PDB>
      <auth_atom_id>CA</auth_atom_id>
      <Cartn_x>1.0</Cartn_x><Cartn_y>0.0</Cartn_y><Cartn_z>0.0</Cartn_z>
      <pdbx_PDB_model_num>1</pdbx_PDB_model_num>
    </atom_site>
    <atom_site id="2">
      <group_PDB>ATOM</group_PDB>
      <auth_atom_id>CA</auth_atom_id>
      <Cartn_x>2.0</Cartn_x><Cartn_y>0.0</Cartn_y><Cartn_z>0.0</Cartn_z>
      <pdbx_PDB_model_num>2</pdbx_PDB_model_num>
    </atom_site>
  </atom_siteCategory>
</datablock>"#;

        let doc = read_pdbml_str(input).unwrap();
        assert_eq!(doc.atoms.len(), 1);
        assert_eq!(doc.atoms[0].x, 1.0);

        let doc = PdbmlReader::with_options(input.as_bytes(), ReadOptions::new().with_model(2))
            .read()
            .unwrap();
        assert_eq!(doc.atoms.len(), 1);
        assert_eq!(doc.atoms[0].x, 2.0);
    }

    #[test]
    fn test_empty_datablock_is_valid() {
        let doc = read_pdbml_str("<datablock></datablock>").unwrap();
        assert!(doc.atoms.is_empty());
    }
}
