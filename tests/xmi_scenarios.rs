//! End-to-end import scenarios.
//!
//! Each test feeds a small XMI document through the public API and checks
//! the normalized tree or the materialized repository.

#![allow(clippy::unwrap_used)]

use serde_json::Value as Json;
use uml_xmi::{ElementId, ModelFormat, Repository, Xmi, XmiOptions, import};

fn document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmi:version="2.1" xmlns:uml="http://schema.omg.org/spec/UML/2.0" xmlns:xmi="http://schema.omg.org/spec/XMI/2.1">
  <xmi:Documentation exporter="Modeler" exporterVersion="3.2"/>
  <uml:Model xmi:id="m" name="Design">
{body}
  </uml:Model>
</xmi:XMI>"#
    )
}

fn read(body: &str) -> Json {
    import::read_str(&document(body), &XmiOptions::default()).expect("import")
}

fn repository(body: &str) -> Repository {
    Xmi::default().read(document(body).as_bytes()).expect("import")
}

/// Depth-first search for the object whose `_id` is `id`.
fn find<'a>(tree: &'a Json, id: &str) -> Option<&'a Json> {
    match tree {
        Json::Object(map) => {
            if map.get("_id").and_then(Json::as_str) == Some(id) {
                return Some(tree);
            }
            map.values().find_map(|v| find(v, id))
        }
        Json::Array(items) => items.iter().find_map(|v| find(v, id)),
        _ => None,
    }
}

fn owned_ids(node: &Json, field: &str) -> Vec<String> {
    node[field]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// MINIMAL CLASS DIAGRAM
// ============================================================================

const CLASS_DIAGRAM: &str = r#"
    <packagedElement xmi:type="uml:PrimitiveType" xmi:id="str" name="String"/>
    <packagedElement xmi:type="uml:Class" xmi:id="foo" name="Foo">
      <ownedAttribute xmi:type="uml:Property" xmi:id="bar" name="bar" type="str">
        <lowerValue xmi:type="uml:LiteralInteger" xmi:id="lv" value="0"/>
        <upperValue xmi:type="uml:LiteralUnlimitedNatural" xmi:id="uv" value="1"/>
      </ownedAttribute>
    </packagedElement>"#;

/// The import is wrapped in a fresh model named after the options.
#[test]
fn test_import_wraps_top_level_in_imported_model() {
    let tree = read(CLASS_DIAGRAM);

    assert_eq!(tree["_type"], "UMLModel");
    assert_eq!(tree["name"], "XMIImported");
    assert_eq!(owned_ids(&tree, "ownedElements"), ["m"]);
    assert_eq!(tree["ownedElements"][0]["_parent"]["$ref"], tree["_id"]);
}

/// A class with one bounded attribute typed by a primitive type.
#[test]
fn test_minimal_class_diagram() {
    let tree = read(CLASS_DIAGRAM);
    let model = find(&tree, "m").unwrap();
    assert_eq!(owned_ids(model, "ownedElements"), ["str", "foo"]);

    let foo = find(&tree, "foo").unwrap();
    assert_eq!(foo["_type"], "UMLClass");
    assert_eq!(foo["name"], "Foo");

    let bar = &foo["attributes"][0];
    assert_eq!(bar["_type"], "UMLAttribute");
    assert_eq!(bar["name"], "bar");
    assert_eq!(bar["multiplicity"], "0..1");
    assert_eq!(bar["type"]["$ref"], "str");
    assert_eq!(bar["_parent"]["$ref"], "foo");
}

#[test]
fn test_minimal_class_diagram_in_repository() {
    let repo = repository(CLASS_DIAGRAM);

    let foo = repo.find("UMLClass", "Foo").unwrap();
    let attributes = repo.children(foo, "attributes");
    assert_eq!(attributes.len(), 1);
    let bar = attributes[0];
    assert_eq!(bar.str("multiplicity"), "0..1");

    let string = repo.resolve(bar, "type").unwrap();
    assert_eq!(string.type_name, "UMLPrimitiveType");
    assert_eq!(string.str("name"), "String");
}

/// A type written as an href keeps the referenced name.
#[test]
fn test_href_type_becomes_type_name() {
    let tree = read(
        r#"
    <packagedElement xmi:type="uml:Class" xmi:id="foo" name="Foo">
      <ownedAttribute xmi:id="bar" name="bar">
        <type href="http://schema.omg.org/spec/UML/2.0/uml.xml#Integer"/>
      </ownedAttribute>
    </packagedElement>"#,
    );
    assert_eq!(find(&tree, "bar").unwrap()["type"], "Integer");
}

// ============================================================================
// RELATIONSHIPS
// ============================================================================

/// A generalization nested in the specific class is owned by it and points
/// from it to the general class.
#[test]
fn test_generalization_owned_by_specific_class() {
    let tree = read(
        r#"
    <packagedElement xmi:type="uml:Class" xmi:id="a" name="A">
      <generalization xmi:type="uml:Generalization" xmi:id="g" general="b"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Class" xmi:id="b" name="B"/>"#,
    );

    let a = find(&tree, "a").unwrap();
    assert_eq!(owned_ids(a, "ownedElements"), ["g"]);
    let g = find(&tree, "g").unwrap();
    assert_eq!(g["_type"], "UMLGeneralization");
    assert_eq!(g["source"]["$ref"], "a");
    assert_eq!(g["target"]["$ref"], "b");
    assert!(owned_ids(find(&tree, "b").unwrap(), "ownedElements").is_empty());
}

/// Relationships with an end that names nothing are dropped; other
/// references that do not resolve are kept as written.
#[test]
fn test_dangling_relationships_removed() {
    let repo = repository(
        r#"
    <packagedElement xmi:type="uml:Class" xmi:id="a" name="A">
      <generalization xmi:type="uml:Generalization" xmi:id="g" general="missing"/>
      <ownedAttribute xmi:id="attr" name="owner" type="nowhere"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Dependency" xmi:id="d" client="a" supplier="ghost"/>
    <packagedElement xmi:type="uml:Dependency" xmi:id="ok" client="a" supplier="a"/>"#,
    );

    assert!(repo.get(&"g".into()).is_none());
    assert!(repo.get(&"d".into()).is_none());
    assert!(repo.get(&"ok".into()).is_some());

    let a = repo.get(&"a".into()).unwrap();
    assert!(!a.ids("ownedElements").contains(&"g".into()));
    let model = repo.get(&"m".into()).unwrap();
    let owned: Vec<&str> = model.ids("ownedElements").iter().map(ElementId::as_str).collect();
    assert_eq!(owned, ["a", "ok"]);

    let attr = repo.get(&"attr".into()).unwrap();
    assert_eq!(attr.id_of("type"), Some(&"nowhere".into()));
    assert!(repo.resolve(attr, "type").is_none());
}

/// An association class becomes a class owning an association and the
/// link between the two; owned end aggregations are exchanged.
#[test]
fn test_association_class_split() {
    let repo = repository(
        r#"
    <packagedElement xmi:type="uml:Class" xmi:id="person" name="Person"/>
    <packagedElement xmi:type="uml:Class" xmi:id="company" name="Company"/>
    <packagedElement xmi:type="uml:AssociationClass" xmi:id="job" name="Job">
      <ownedAttribute xmi:id="salary" name="salary"/>
      <ownedEnd xmi:type="uml:Property" xmi:id="e1" type="person" aggregation="none"/>
      <ownedEnd xmi:type="uml:Property" xmi:id="e2" type="company" aggregation="shared"/>
      <memberEnd xmi:idref="e1"/>
      <memberEnd xmi:idref="e2"/>
    </packagedElement>"#,
    );

    let job = repo.get(&"job".into()).unwrap();
    assert_eq!(job.type_name, "UMLClass");
    assert_eq!(repo.children(job, "attributes").len(), 1);

    let owned = repo.children(job, "ownedElements");
    let association = owned.iter().find(|r| r.type_name == "UMLAssociation").unwrap();
    let link = owned
        .iter()
        .find(|r| r.type_name == "UMLAssociationClassLink")
        .unwrap();
    assert_eq!(association.str("name"), "Job");
    assert_ne!(association.id.as_str(), "job");
    assert_eq!(link.id_of("associationSide"), Some(&association.id));
    assert_eq!(link.id_of("classSide"), Some(&job.id));

    let end1 = repo.resolve(association, "end1").unwrap();
    let end2 = repo.resolve(association, "end2").unwrap();
    assert_eq!(end1.type_name, "UMLAssociationEnd");
    assert_eq!(end1.parent.as_ref(), Some(&association.id));
    assert_eq!(end1.id_of("reference"), Some(&"person".into()));
    assert_eq!(end2.id_of("reference"), Some(&"company".into()));
    assert_eq!(end1.str("aggregation"), "shared");
    assert_eq!(end2.str("aggregation"), "none");
}

/// Ends owned by the participating classes are moved under the
/// association.
#[test]
fn test_member_ends_owned_by_classes() {
    let repo = repository(
        r#"
    <packagedElement xmi:type="uml:Class" xmi:id="order" name="Order">
      <ownedAttribute xmi:id="lines" name="lines" type="line" association="as" aggregation="composite"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Class" xmi:id="line" name="Line">
      <ownedAttribute xmi:id="owner" name="order" type="order" association="as"/>
    </packagedElement>
    <packagedElement xmi:type="uml:Association" xmi:id="as">
      <memberEnd xmi:idref="lines"/>
      <memberEnd xmi:idref="owner"/>
    </packagedElement>"#,
    );

    let association = repo.get(&"as".into()).unwrap();
    let end1 = repo.resolve(association, "end1").unwrap();
    assert_eq!(end1.id.as_str(), "lines");
    assert_eq!(end1.type_name, "UMLAssociationEnd");
    assert_eq!(end1.parent.as_ref(), Some(&association.id));
    assert_eq!(end1.id_of("reference"), Some(&"line".into()));

    let order = repo.get(&"order".into()).unwrap();
    assert!(!order.ids("attributes").contains(&"lines".into()));
}

// ============================================================================
// LENIENCY
// ============================================================================

/// Unknown element types and unknown top-level tags are skipped without
/// failing the import.
#[test]
fn test_unknown_types_are_skipped() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmi:version="2.1" xmlns:uml="http://schema.omg.org/spec/UML/2.0" xmlns:xmi="http://schema.omg.org/spec/XMI/2.1">
  <uml:Model xmi:id="m" name="Design">
    <packagedElement xmi:type="uml:Frobnicator" xmi:id="x" name="Odd"/>
    <packagedElement xmi:type="uml:Class" xmi:id="c" name="Order"/>
  </uml:Model>
  <custom:Tagging xmi:id="t" base_Class="c"/>
  <uml:Diagram xmi:id="diagram"/>
</xmi:XMI>"#;

    let tree = import::read_str(xml, &XmiOptions::default()).unwrap();
    assert_eq!(owned_ids(&tree, "ownedElements"), ["m"]);
    let model = find(&tree, "m").unwrap();
    assert_eq!(owned_ids(model, "ownedElements"), ["c"]);
    assert!(find(&tree, "x").is_none());
    assert!(find(&tree, "t").is_none());
}

/// Documentation and tags from a recognized extender are read back.
#[test]
fn test_recognized_extension_content() {
    let tree = read(
        r#"
    <packagedElement xmi:type="uml:Class" xmi:id="c" name="Order">
      <xmi:Extension extender="StarUML">
        <documentation value="An order placed by a customer."/>
        <stereotype value="entity"/>
      </xmi:Extension>
      <xmi:Extension extender="OtherTool">
        <documentation value="ignored"/>
      </xmi:Extension>
    </packagedElement>"#,
    );
    let class = find(&tree, "c").unwrap();
    assert_eq!(class["documentation"], "An order placed by a customer.");
    assert_eq!(class["stereotype"], "entity");
}

#[test]
fn test_document_without_xmi_root_is_rejected() {
    let err = import::read_str(
        r#"<uml:Model xmi:id="m" name="Design"/>"#,
        &XmiOptions::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("xmi:XMI"));
}

#[test]
fn test_malformed_xml_is_rejected() {
    let err =
        import::read_str("<xmi:XMI><uml:Model></xmi:XMI>", &XmiOptions::default()).unwrap_err();
    assert!(matches!(err, uml_xmi::XmiError::Xml(_)));
}
