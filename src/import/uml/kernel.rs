//! Kernel readers: elements, features, templates, instances and the plain
//! directed relationships.

use crate::model::{ElementId, Record, Value};
use crate::multiplicity;
use crate::xml::XmlNode;

use crate::import::reader::{Read, Reader, read_boolean, read_ref, read_ref_array, read_string};
use crate::import::registry::ReaderRegistry;
use super::{Mixin, compose, concept, extension, extension_value, read_text, set_first_ref};

pub(super) fn register(registry: &mut ReaderRegistry) {
    registry.register("uml:Package", |r, n| concept(r, n, PACKAGE, "UMLPackage"));
    registry.register("uml:Model", |r, n| concept(r, n, PACKAGE, "UMLModel"));
    registry.register("uml:Constraint", |r, n| concept(r, n, CONSTRAINT, "UMLConstraint"));

    registry.register("uml:Property", |r, n| concept(r, n, PROPERTY, "UMLAttribute"));
    registry.register("uml:Parameter", |r, n| concept(r, n, PARAMETER, "UMLParameter"));
    registry.register("uml:Operation", |r, n| concept(r, n, OPERATION, "UMLOperation"));

    registry.register("uml:TemplateParameter", |r, n| {
        concept(r, n, TEMPLATE_PARAMETER, "UMLTemplateParameter")
    });
    registry.register("uml:ClassifierTemplateParameter", |r, n| {
        concept(r, n, TEMPLATE_PARAMETER, "UMLTemplateParameter")
    });

    registry.register("uml:InstanceSpecification", read_instance_specification);
    registry.register("uml:EnumerationLiteral", |r, n| {
        concept(r, n, INSTANCE, "UMLEnumerationLiteral")
    });
    registry.register("uml:Slot", |r, n| concept(r, n, SLOT, "UMLSlot"));

    registry.register("uml:Generalization", |r, n| {
        concept(r, n, GENERALIZATION, "UMLGeneralization")
    });
    registry.register("uml:Dependency", |r, n| concept(r, n, DEPENDENCY, "UMLDependency"));
    registry.register("uml:Abstraction", |r, n| concept(r, n, DEPENDENCY, "UMLAbstraction"));
    registry.register("uml:Usage", |r, n| concept(r, n, USAGE, "UMLDependency"));
    registry.register("uml:Realization", |r, n| concept(r, n, DEPENDENCY, "UMLRealization"));
    registry.register("uml:InterfaceRealization", |r, n| {
        concept(r, n, INTERFACE_REALIZATION, "UMLInterfaceRealization")
    });
}

// ============================================================================
// COMPOSITIONS
// ============================================================================

pub(super) const PACKAGE: &[Mixin] = &[named, namespace, package];
const CONSTRAINT: &[Mixin] = &[named, constraint];

pub(super) const STRUCTURAL_FEATURE: &[Mixin] =
    &[named, redefinable, feature, typed, multiplicity_element, structural_feature];
pub(super) const PROPERTY: &[Mixin] = &[
    named,
    redefinable,
    feature,
    typed,
    multiplicity_element,
    structural_feature,
    property,
];
const PARAMETER: &[Mixin] = &[named, typed, multiplicity_element, parameter];
const OPERATION: &[Mixin] = &[
    named,
    redefinable,
    feature,
    namespace,
    behavioral_feature,
    operation,
];
const TEMPLATE_PARAMETER: &[Mixin] = &[template_parameter];

const INSTANCE: &[Mixin] = &[named, instance_specification];
const SLOT: &[Mixin] = &[named, slot];

const GENERALIZATION: &[Mixin] = &[named, generalization];
const DEPENDENCY: &[Mixin] = &[named, dependency];
const USAGE: &[Mixin] = &[named, dependency, usage];
const INTERFACE_REALIZATION: &[Mixin] = &[named, dependency, interface_realization];

// ============================================================================
// ELEMENTS
// ============================================================================

/// Documentation, string stereotype and tags from a recognized extension.
pub(super) fn element(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let Some(ext) = extension(r, node) else {
        return;
    };
    if let Some(doc) = ext.child("documentation").and_then(|d| d.attr("value")) {
        record.set("documentation", doc);
    }
    if let Some(stereotype) = ext.child("stereotype").and_then(|s| s.attr("value")) {
        record.set("stereotype", stereotype);
    }

    let owner = record.id.clone();
    let mut tags = Vec::new();
    for entry in ext.children_named("tag") {
        for (name, value) in entry.attributes.iter().filter(|(k, _)| !k.starts_with("xmi:")) {
            let tag = read_tag(name, value);
            tags.push(r.adopt(tag, &owner));
        }
    }
    if !tags.is_empty() {
        record.append_to("tags", tags);
    }
}

/// Tags keep only their textual value on the wire; booleans and numbers are
/// recognized back from it.
fn read_tag(name: &str, value: &str) -> Record {
    let tag = Record::new(ElementId::generate()).typed("Tag").with("name", name);
    match value {
        "true" | "false" => tag.with("kind", "boolean").with("checked", value == "true"),
        _ => match value.parse::<i64>() {
            Ok(number) => tag.with("kind", "number").with("number", number),
            Err(_) => tag.with("kind", "string").with("value", value),
        },
    }
}

pub(super) fn named(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("name", read_string(node, "name", ""));
    let visibility = r.read_enum(node, "visibility", "uml:VisibilityKind", Some("public"));
    record.set("visibility", visibility.unwrap_or_default());
}

pub(super) fn namespace(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let members = r.read_element_array(node, "ownedMember", None);
    record.append_to("ownedElements", members);
    let rules = r.read_element_array(node, "ownedRule", Some("uml:Constraint"));
    record.append_to("ownedElements", rules);
}

fn package(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let packaged = r.read_element_array(node, "packagedElement", None);
    record.append_to("ownedElements", packaged);
    // Enterprise Architect puts connectors directly under packages
    let connectors = r.read_element_array(node, "ownedConnector", None);
    record.append_to("ownedElements", connectors);
}

fn constraint(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let specification = match node.attr("specification") {
        Some(text) => text.to_string(),
        None => read_text(r, node, "specification"),
    };
    record.set("specification", specification);
    record.set(
        "constrainedElements",
        Value::References(read_ref_array(node, "constrainedElement")),
    );
}

// ============================================================================
// FEATURES
// ============================================================================

/// A `type` reference, or the primitive name of a `<type href="...#Name"/>`.
fn read_type(node: &XmlNode) -> Value {
    if let Some(id) = read_ref(node, "type") {
        return Value::Reference(id);
    }
    node.child("type")
        .and_then(|t| t.attr("href"))
        .and_then(|href| href.rsplit('#').next())
        .filter(|name| !name.is_empty())
        .map(Value::from)
        .unwrap_or(Value::Null)
}

pub(super) fn typed(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("type", read_type(node));
}

pub(super) fn redefinable(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isLeaf", read_boolean(node, "isLeaf", false));
}

pub(super) fn multiplicity_element(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isOrdered", read_boolean(node, "isOrdered", false));
    record.set("isUnique", read_boolean(node, "isUnique", false));
    let lower = r.read_element(node, "lowerValue").and_then(|v| v.as_text());
    let upper = r.read_element(node, "upperValue").and_then(|v| v.as_text());
    if let Some(text) = multiplicity::join(lower.as_deref(), upper.as_deref()) {
        record.set("multiplicity", text);
    }
}

pub(super) fn feature(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isStatic", read_boolean(node, "isStatic", false));
}

pub(super) fn structural_feature(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isReadOnly", read_boolean(node, "isReadOnly", false));
}

pub(super) fn property(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isDerived", read_boolean(node, "isDerived", false));
    record.set("isID", read_boolean(node, "isID", false));
    let aggregation = r.read_enum(node, "aggregation", "uml:AggregationKind", Some("none"));
    record.set("aggregation", aggregation.unwrap_or_default());
    record.set("defaultValue", read_text(r, node, "defaultValue"));
    record.set("navigable", read_boolean(node, "isNavigable", false));
    let qualifiers = r.read_element_array(node, "qualifier", Some("uml:Property"));
    record.set("qualifiers", Value::OwnedList(qualifiers));
}

fn parameter(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("defaultValue", read_text(r, node, "defaultValue"));
    let direction = r
        .read_enum(node, "direction", "uml:ParameterDirectionKind", None)
        .or_else(|| r.read_enum(node, "kind", "uml:ParameterDirectionKind", None))
        .unwrap_or_else(|| "in".to_string());
    record.set("direction", direction);
}

fn behavioral_feature(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let parameters = r.read_element_array(node, "ownedParameter", Some("uml:Parameter"));
    record.set("parameters", Value::OwnedList(parameters));
    let concurrency = r.read_enum(
        node,
        "concurrency",
        "uml:CallConcurrencyKind",
        Some("sequential"),
    );
    record.set("concurrency", concurrency.unwrap_or_default());
    record.set("raisedExceptions", Value::References(read_ref_array(node, "raisedException")));
}

fn operation(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isQuery", read_boolean(node, "isQuery", false));
    record.set("isAbstract", read_boolean(node, "isAbstract", false));
    if let Some(specification) = extension_value(r, node, "specification") {
        record.set("specification", specification);
    }
    for (tag, field) in [
        ("precondition", "preconditions"),
        ("postcondition", "postconditions"),
        ("bodyCondition", "bodyConditions"),
    ] {
        let conditions = r.read_element_array(node, tag, Some("uml:Constraint"));
        if !conditions.is_empty() {
            record.set(field, Value::OwnedList(conditions));
        }
    }
}

// ============================================================================
// TEMPLATES
// ============================================================================

/// Template parameters are hoisted out of `ownedTemplateSignature`; the
/// signature itself is not kept.
pub(super) fn templateable(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let Some(signature) = node.child("ownedTemplateSignature") else {
        return;
    };
    let mut parameters = Vec::new();
    for child in signature.children_named("ownedParameter") {
        let type_name = child.attr("xmi:type").unwrap_or("uml:TemplateParameter");
        if let Some(Read::Record(parameter)) = r.dispatch(child, type_name) {
            parameters.push(r.adopt(parameter, &record.id));
        }
    }
    if !parameters.is_empty() {
        record.append_to("templateParameters", parameters);
    }
}

fn template_parameter(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let name = node
        .child("ownedParameteredElement")
        .and_then(|pe| pe.attr("name"))
        .filter(|n| !n.is_empty())
        .or_else(|| node.attr("name"))
        .unwrap_or_default();
    record.set("name", name);
    record.set("defaultValue", read_text(r, node, "defaultValue"));
}

// ============================================================================
// INSTANCES
// ============================================================================

fn instance_specification(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("specification", read_text(r, node, "specification"));
    record.set_ref("classifier", read_ref(node, "classifier"));
    let slots = r.read_element_array(node, "slot", Some("uml:Slot"));
    record.set("slots", Value::OwnedList(slots));
}

fn slot(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("value", read_text(r, node, "value"));
    record.set_ref("definingFeature", read_ref(node, "definingFeature"));
}

/// An instance specification, or a link when it carries link ends in its
/// extension block.
fn read_instance_specification(r: &mut Reader<'_>, node: &XmlNode) -> Option<Read> {
    let ends = (
        extension_value(r, node, "linkEnd1"),
        extension_value(r, node, "linkEnd2"),
    );
    let (Some(end1), Some(end2)) = ends else {
        return concept(r, node, INSTANCE, "UMLObject");
    };

    let mut link = compose(r, node, &[named]);
    link.type_name = "UMLLink".to_string();
    link.set_ref("association", read_ref(node, "classifier"));
    for (field, target) in [("end1", end1), ("end2", end2)] {
        let end = Record::new(ElementId::generate())
            .typed("UMLLinkEnd")
            .with_ref("reference", target);
        let id = r.adopt(end, &link.id);
        link.set(field, Value::Owned(id));
    }
    Some(Read::Record(link))
}

// ============================================================================
// RELATIONSHIPS
// ============================================================================

fn generalization(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("source", read_ref(node, "specific"));
    record.set_ref("target", read_ref(node, "general"));
}

pub(super) fn dependency(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("source", read_ref(node, "client"));
    record.set_ref("target", read_ref(node, "supplier"));
    if let Some(role) = extension_value(r, node, "roleName") {
        record.set("roleName", role);
    }
}

fn usage(_: &mut Reader<'_>, _: &XmlNode, record: &mut Record) {
    record.set("stereotype", "use");
}

/// Source and target from dialect-specific attributes when `client` and
/// `supplier` are absent.
pub(super) fn fallback_ends(record: &mut Record, node: &XmlNode, source: &str, target: &str) {
    if record.id_of("source").is_none() {
        set_first_ref(record, "source", [read_ref(node, source)]);
    }
    if record.id_of("target").is_none() {
        set_first_ref(record, "target", [read_ref(node, target)]);
    }
}

fn interface_realization(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    fallback_ends(record, node, "implementingClassifier", "contract");
}
