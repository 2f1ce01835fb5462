//! PDBML/XML file writer
//!
//! Emits a self-contained `PDBx:datablock` holding one `atom_site` entry
//! per record. Header and trailer text belong to the whole-file layer, not
//! here. Chain identifiers pass through verbatim: this format has no
//! single-character restriction.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use pdbkit_mol::AtomRecord;

use crate::error::IoResult;

const PDBX_NAMESPACE: &str = "http://pdbml.pdb.org/schema/pdbx-v50.xsd";

/// PDBML file writer
pub struct PdbmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> PdbmlWriter<W> {
    /// Create a new PDBML writer
    pub fn new(inner: W) -> Self {
        PdbmlWriter {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    /// Serialize the record list as a complete datablock
    pub fn write(&mut self, records: &[AtomRecord]) -> IoResult<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut datablock = BytesStart::new("PDBx:datablock");
        datablock.push_attribute(("xmlns:PDBx", PDBX_NAMESPACE));
        self.writer.write_event(Event::Start(datablock))?;

        self.writer
            .write_event(Event::Start(BytesStart::new("PDBx:atom_siteCategory")))?;
        for record in records {
            self.write_atom_site(record)?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new("PDBx:atom_siteCategory")))?;

        self.writer
            .write_event(Event::End(BytesEnd::new("PDBx:datablock")))?;
        Ok(())
    }

    fn write_atom_site(&mut self, record: &AtomRecord) -> IoResult<()> {
        let mut site = BytesStart::new("PDBx:atom_site");
        site.push_attribute(("id", record.serial.to_string().as_str()));
        self.writer.write_event(Event::Start(site))?;

        self.text_element("PDBx:B_iso_or_equiv", &format!("{:.2}", record.b_factor))?;
        self.text_element("PDBx:Cartn_x", &format!("{:.3}", record.x))?;
        self.text_element("PDBx:Cartn_y", &format!("{:.3}", record.y))?;
        self.text_element("PDBx:Cartn_z", &format!("{:.3}", record.z))?;
        self.text_element("PDBx:auth_asym_id", &record.chain_id)?;
        self.text_element("PDBx:auth_atom_id", &record.atom_name)?;
        self.text_element("PDBx:auth_comp_id", &record.residue_name)?;
        self.text_element("PDBx:auth_seq_id", &record.residue_number.to_string())?;
        self.text_element("PDBx:group_PDB", record.record_kind.keyword().trim_end())?;
        self.char_element("PDBx:label_alt_id", record.alt_loc)?;
        // label_* mirrors auth_*; this writer carries no separate canonical
        // numbering
        self.text_element("PDBx:label_asym_id", &record.chain_id)?;
        self.text_element("PDBx:label_atom_id", &record.atom_name)?;
        self.text_element("PDBx:label_comp_id", &record.residue_name)?;
        self.text_element("PDBx:label_seq_id", &record.residue_number.to_string())?;
        self.text_element("PDBx:occupancy", &format!("{:.2}", record.occupancy))?;
        self.char_element("PDBx:pdbx_PDB_ins_code", record.insertion_code)?;
        self.text_element("PDBx:partial_charge", &format!("{:.2}", record.partial_charge))?;
        self.text_element("PDBx:pdbx_formal_charge", &record.formal_charge.to_string())?;
        self.text_element("PDBx:type_symbol", &record.effective_element())?;

        self.writer
            .write_event(Event::End(BytesEnd::new("PDBx:atom_site")))?;
        Ok(())
    }

    fn text_element(&mut self, tag: &str, value: &str) -> IoResult<()> {
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        self.writer.write_event(Event::Text(BytesText::new(value)))?;
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    /// Blank single-character fields become self-closed elements
    fn char_element(&mut self, tag: &str, value: char) -> IoResult<()> {
        if value == ' ' {
            self.writer.write_event(Event::Empty(BytesStart::new(tag)))?;
            Ok(())
        } else {
            self.text_element(tag, &value.to_string())
        }
    }

    /// Consume the writer, returning the underlying stream
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

/// Serialize a record list to a PDBML string
pub fn write_pdbml_string(records: &[AtomRecord]) -> IoResult<String> {
    let mut writer = PdbmlWriter::new(Vec::new());
    writer.write(records)?;
    Ok(String::from_utf8(writer.into_inner()).expect("PDBML output is UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdbml::parser::read_pdbml_str;
    use pdbkit_mol::AtomRecordBuilder;

    fn ala_ca() -> AtomRecord {
        AtomRecordBuilder::new()
            .serial(1)
            .name("CA")
            .name_raw(" CA ")
            .residue("ALA", 1)
            .chain("A")
            .coords(1.0, 2.0, 3.0)
            .occupancy(1.0)
            .b_factor(20.0)
            .element("C")
            .build()
    }

    #[test]
    fn test_atom_site_fields() {
        let out = write_pdbml_string(&[ala_ca()]).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("<PDBx:atom_site id=\"1\">"));
        assert!(out.contains("<PDBx:type_symbol>C</PDBx:type_symbol>"));
        assert!(out.contains("<PDBx:Cartn_x>1.000</PDBx:Cartn_x>"));
        assert!(out.contains("<PDBx:Cartn_y>2.000</PDBx:Cartn_y>"));
        assert!(out.contains("<PDBx:Cartn_z>3.000</PDBx:Cartn_z>"));
        assert!(out.contains("<PDBx:occupancy>1.00</PDBx:occupancy>"));
        assert!(out.contains("<PDBx:group_PDB>ATOM</PDBx:group_PDB>"));
        // Charge slots are always present, zero when unset
        assert!(out.contains("<PDBx:pdbx_formal_charge>0</PDBx:pdbx_formal_charge>"));
        assert!(out.contains("<PDBx:partial_charge>0.00</PDBx:partial_charge>"));
        // Blank alt-loc and insertion code are self-closed
        assert!(out.contains("<PDBx:label_alt_id/>"));
        assert!(out.contains("<PDBx:pdbx_PDB_ins_code/>"));
    }

    #[test]
    fn test_blank_element_is_inferred() {
        let mut atom = ala_ca();
        atom.atom_name = "HB2".to_string();
        atom.atom_name_raw = " HB2".to_string();
        atom.element = String::new();

        let out = write_pdbml_string(&[atom]).unwrap();
        assert!(out.contains("<PDBx:type_symbol>H</PDBx:type_symbol>"));
    }

    #[test]
    fn test_multi_letter_chain_passes_through() {
        let mut atom = ala_ca();
        atom.chain_id = "LONG".to_string();

        let out = write_pdbml_string(&[atom]).unwrap();
        assert!(out.contains("<PDBx:auth_asym_id>LONG</PDBx:auth_asym_id>"));
    }

    #[test]
    fn test_round_trip_through_parser() {
        let fe = AtomRecordBuilder::new()
            .hetatm()
            .serial(2)
            .name("FE")
            .name_raw("FE  ")
            .residue("HEM", 154)
            .chain("B")
            .coords(8.128, 7.371, -15.022)
            .occupancy(1.0)
            .b_factor(40.86)
            .element("FE")
            .formal_charge(3)
            .build();

        let out = write_pdbml_string(&[ala_ca(), fe.clone()]).unwrap();
        let doc = read_pdbml_str(&out).unwrap();
        assert_eq!(doc.atoms.len(), 2);
        assert_eq!(doc.atoms[0], ala_ca());
        assert_eq!(doc.atoms[1], fe);
    }
}
