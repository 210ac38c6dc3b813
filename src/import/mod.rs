//! XMI import.
//!
//! ```text
//! XMI text ──parse──▶ XmlNode ──readers──▶ IdTable ──postprocess──▶ JSON tree ──▶ Materializer
//! ```
//!
//! Top-level children of `xmi:XMI` are dispatched by tag name; everything
//! below them by `xmi:type`. Each import owns its [`Reader`] session, so
//! imports on different threads share nothing mutable.

mod postprocess;
mod reader;
mod registry;
mod uml;

use std::path::Path;

use serde_json::Value as Json;
use tracing::debug;

use crate::error::{Result, XmiError};
use crate::model::{ElementId, IdTable, Record, Value};
use crate::options::XmiOptions;
use crate::xml::parse_document;

pub use crate::model::Materializer;
pub use reader::{
    Read, ReadFn, Reader, read_boolean, read_integer, read_opt_string, read_ref, read_ref_array,
    read_string,
};
pub use registry::ReaderRegistry;

/// Convert XMI text into a normalized JSON tree rooted at a fresh
/// `UMLModel` named [`XmiOptions::imported_model_name`].
pub fn read_str(xml: &str, options: &XmiOptions) -> Result<Json> {
    let document = parse_document(xml)?;
    let xmi = document
        .find("xmi:XMI")
        .ok_or_else(|| XmiError::missing_element("xmi:XMI"))?;

    let mut reader = Reader::new(ReaderRegistry::standard(), options);
    let top_level: Vec<ElementId> = xmi
        .children
        .iter()
        .filter_map(|node| reader.read_top_level(node))
        .collect();
    let mut table = reader.into_table();
    debug!(top_level = top_level.len(), records = table.len(), "read XMI");

    postprocess::run(&mut table);
    let model = wrap_in_model(&mut table, top_level, &options.imported_model_name);
    table
        .to_json(&model)
        .ok_or_else(|| XmiError::invalid_record("imported model missing from id table"))
}

/// Read an XMI file and hand its tree to `target`.
pub fn load_from_file(
    path: impl AsRef<Path>,
    target: &mut impl Materializer,
    options: &XmiOptions,
) -> Result<ElementId> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = xml.len(), "loading XMI");
    let tree = read_str(&xml, options)?;
    target.materialize(&tree)
}

fn wrap_in_model(table: &mut IdTable, top_level: Vec<ElementId>, name: &str) -> ElementId {
    let model = Record::new(ElementId::generate())
        .typed("UMLModel")
        .with("name", name)
        .with("ownedElements", Value::OwnedList(top_level.clone()));
    let model_id = model.id.clone();
    for id in &top_level {
        if let Some(record) = table.get_mut(id) {
            record.parent = Some(model_id.clone());
        }
    }
    table.put(model);
    model_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Repository;
    use std::io::Write;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmi:version="2.1"
  xmlns:uml="http://schema.omg.org/spec/UML/2.0"
  xmlns:xmi="http://schema.omg.org/spec/XMI/2.1">
  <xmi:Documentation exporter="Someone" exporterVersion="1"/>
  <uml:Model xmi:id="m1" name="Design">
    <packagedElement xmi:type="uml:Class" xmi:id="c1" name="Order"/>
  </uml:Model>
  <custom:Tagging xmi:id="t1" base_Class="c1"/>
</xmi:XMI>"#;

    #[test]
    fn test_read_str_wraps_top_level_in_imported_model() {
        let options = XmiOptions::default().with_imported_model_name("Imported");
        let tree = read_str(MINIMAL, &options).expect("import");

        assert_eq!(tree["_type"], "UMLModel");
        assert_eq!(tree["name"], "Imported");
        let owned = tree["ownedElements"].as_array().expect("owned elements");
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0]["_id"], "m1");
        assert_eq!(owned[0]["_parent"]["$ref"], tree["_id"]);
        assert_eq!(owned[0]["ownedElements"][0]["name"], "Order");
    }

    #[test]
    fn test_missing_xmi_root_is_an_error() {
        let err = read_str(r#"<uml:Model xmi:id="m"/>"#, &XmiOptions::default()).unwrap_err();
        assert!(matches!(err, XmiError::Missing { .. }));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = read_str("<xmi:XMI><uml:Model></xmi:XMI>", &XmiOptions::default()).unwrap_err();
        assert!(matches!(err, XmiError::Xml(_)));
    }

    #[test]
    fn test_load_from_file_materializes_tree() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(MINIMAL.as_bytes()).expect("write");

        let mut repo = Repository::new();
        let root = load_from_file(file.path(), &mut repo, &XmiOptions::default()).expect("load");
        assert_eq!(repo.root_ids(), &[root.clone()]);
        let class = repo.find("UMLClass", "Order").expect("class");
        assert_eq!(class.parent, Some("m1".into()));
        assert_eq!(repo.get(&"m1".into()).and_then(|m| m.parent.clone()), Some(root));
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut repo = Repository::new();
        let err = load_from_file(dir.path().join("absent.xmi"), &mut repo, &XmiOptions::default())
            .unwrap_err();
        assert!(matches!(err, XmiError::Io(_)));
        assert!(repo.is_empty());
    }
}
