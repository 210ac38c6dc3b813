//! Classifier writers, associations, composite structure, components,
//! deployments, use cases and profiles.

use crate::model::metamodel;
use crate::model::{ElementId, ElementKind, Record, Repository};
use crate::xml::WireNode;

use crate::export::writer::{
    Writer, set_type, write_boolean, write_constraint, write_ref, write_ref_array, write_string,
};
use super::kernel::{DEPENDENCY, attribute, feature, structural_feature};
use super::{Mixin, concept};

/// Metaclass references in a profile point into the UML metamodel document.
const METACLASS_HREF: &str = "http://schema.omg.org/spec/UML/2.0/uml.xml#";

// ============================================================================
// COMPOSITIONS
// ============================================================================

pub(super) const CLASSIFIER: &[Mixin] = &[classifier];
const CLASS: &[Mixin] = &[classifier, class];
const ENUMERATION: &[Mixin] = &[classifier, enumeration];
const PORT: &[Mixin] = &[feature, structural_feature, attribute, port];
const ASSOCIATION_END: &[Mixin] = &[feature, structural_feature, attribute, association_end];
const CONNECTOR_END: &[Mixin] = &[feature, structural_feature, attribute, connector_end];
const COMPONENT: &[Mixin] = &[classifier, class, component];
const NODE: &[Mixin] = &[classifier, class, node];
const USE_CASE: &[Mixin] = &[classifier, use_case];
const STEREOTYPE: &[Mixin] = &[classifier, class, metaclass_extensions];

// ============================================================================
// CLASSIFIERS
// ============================================================================

/// Relationships of `record` of type `type_name` that name it on `end`.
fn relationships<'a>(
    repository: &'a Repository,
    record: &Record,
    type_name: &str,
    end: &str,
) -> Vec<&'a Record> {
    repository.relationships_of(
        &record.id,
        |r| r.type_name == type_name && r.id_of(end) == Some(&record.id),
    )
}

/// Attributes and ports apart, operations, connectors owned by ports, the
/// relationships the classifier is the source of, and owned behaviors.
pub(super) fn classifier(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let repository = w.repository();
    let (ports, attributes): (Vec<&Record>, Vec<&Record>) = repository
        .children(record, "attributes")
        .into_iter()
        .partition(|a| a.type_name == "UMLPort");
    w.write_element_array(json, "ownedAttribute", attributes);
    w.write_element_array(json, "ownedPort", ports.iter().copied());
    w.write_owned(json, "ownedOperation", record, "operations");

    let connectors: Vec<&Record> = ports
        .iter()
        .flat_map(|port| repository.children(port, "ownedElements"))
        .filter(|c| metamodel::is_kind_of(&c.type_name, ElementKind::UmlConnector))
        .collect();
    w.write_element_array(json, "ownedConnector", connectors);

    write_boolean(json, "isAbstract", record.bool("isAbstract"));
    write_boolean(json, "isFinalSpecialization", record.bool("isFinalSpecialization"));
    write_boolean(json, "isLeaf", record.bool("isLeaf"));

    let generalizations = relationships(repository, record, "UMLGeneralization", "source");
    w.write_element_array(json, "generalization", generalizations);
    let realizations = relationships(repository, record, "UMLInterfaceRealization", "source");
    w.write_element_array(json, "interfaceRealization", realizations);

    w.write_owned(json, "ownedBehavior", record, "behaviors");
}

fn class(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isActive", record.bool("isActive"));
}

/// A class joined to an association by a class link is written as one
/// `uml:AssociationClass` carrying the association's ends.
pub(super) fn write_class(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, CLASS, "uml:Class")?;
    let repository = w.repository();
    let association = repository
        .children(record, "ownedElements")
        .into_iter()
        .filter(|c| c.type_name == "UMLAssociationClassLink")
        .find_map(|link| repository.resolve(link, "associationSide"));
    if let Some(association) = association {
        set_type(&mut json, "uml:AssociationClass");
        association_ends(w, association, &mut json);
    }
    Some(json)
}

fn enumeration(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    w.write_owned(json, "ownedLiteral", record, "literals");
}

pub(super) fn write_enumeration(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, ENUMERATION, "uml:Enumeration")
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

/// Copies of the two ends with their aggregations exchanged, the wire
/// recording each aggregation at the opposite end.
///
/// With fewer than two resolvable ends, the ends are copied as they are.
fn swapped_ends(repository: &Repository, record: &Record) -> Vec<Record> {
    let mut ends: Vec<Record> = ["end1", "end2"]
        .iter()
        .filter_map(|field| repository.resolve(record, field))
        .cloned()
        .collect();
    if let [first, second] = ends.as_mut_slice() {
        let aggregation = first.remove("aggregation");
        if let Some(other) = second.remove("aggregation") {
            first.set("aggregation", other);
        }
        if let Some(aggregation) = aggregation {
            second.set("aggregation", aggregation);
        }
    }
    ends
}

fn association_ends(w: &mut Writer<'_>, association: &Record, json: &mut WireNode) {
    write_boolean(json, "isDerived", association.bool("isDerived"));
    let ends = swapped_ends(w.repository(), association);
    w.write_element_array(json, "ownedEnd", &ends);
    write_ref_array(json, "memberEnd", ends.iter().map(|end| &end.id));
}

pub(super) fn write_association(
    w: &mut Writer<'_>,
    record: &Record,
    wire_type: &str,
) -> Option<WireNode> {
    let mut json = concept(w, record, &[], wire_type)?;
    association_ends(w, record, &mut json);
    Some(json)
}

fn association_end(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_ref(json, "type", record.id_of("reference"));
    write_boolean(json, "isNavigable", record.bool("navigable"));
}

pub(super) fn write_association_end(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, ASSOCIATION_END, "uml:Property")
}

// ============================================================================
// COMPOSITE STRUCTURE
// ============================================================================

fn port(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isBehavior", record.bool("isBehavior"));
    write_boolean(json, "isService", record.bool("isService"));
    write_boolean(json, "isConjugated", record.bool("isConjugated"));
}

pub(super) fn write_port(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, PORT, "uml:Port")
}

fn connector_end(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_ref(json, "role", record.id_of("reference"));
    write_boolean(json, "isNavigable", record.bool("navigable"));
}

pub(super) fn write_connector_end(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, CONNECTOR_END, "uml:ConnectorEnd")
}

pub(super) fn write_connector(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Connector")?;
    write_ref(&mut json, "type", record.id_of("type"));
    let ends = swapped_ends(w.repository(), record);
    w.write_element_array(&mut json, "end", &ends);
    Some(json)
}

pub(super) fn write_collaboration_use(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:CollaborationUse")?;
    write_ref(&mut json, "type", record.id_of("type"));
    Some(json)
}

/// Role bindings travel as dependencies carrying the role name.
pub(super) fn write_role_binding(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, DEPENDENCY, "uml:Dependency")?;
    let role = record.str("roleName");
    if !role.is_empty() {
        w.write_extension(&mut json, "roleName", role);
    }
    Some(json)
}

// ============================================================================
// COMPONENTS AND DEPLOYMENTS
// ============================================================================

pub(super) fn write_artifact(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, CLASSIFIER, "uml:Artifact")?;
    write_string(&mut json, "fileName", record.str("fileName"));
    Some(json)
}

fn component(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isIndirectlyInstantiated", record.bool("isIndirectlyInstantiated"));
    let realizations = relationships(w.repository(), record, "UMLComponentRealization", "target");
    w.write_element_array(json, "realization", realizations);
}

pub(super) fn write_component(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, COMPONENT, "uml:Component")
}

pub(super) fn write_subsystem(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, COMPONENT, "uml:Component")?;
    w.write_extension(&mut json, "stereotype", "subsystem");
    Some(json)
}

fn node(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let deployments = relationships(w.repository(), record, "UMLDeployment", "target");
    w.write_element_array(json, "deployment", deployments);
}

pub(super) fn write_node(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, NODE, "uml:Node")
}

pub(super) fn write_deployment(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Deployment")?;
    write_ref(&mut json, "deployedArtifact", record.id_of("source"));
    write_ref(&mut json, "location", record.id_of("target"));
    Some(json)
}

// ============================================================================
// USE CASES
// ============================================================================

fn use_case(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let repository = w.repository();
    w.write_owned(json, "extensionPoint", record, "extensionPoints");
    let extends = relationships(repository, record, "UMLExtend", "source");
    w.write_element_array(json, "extend", extends);
    let includes = relationships(repository, record, "UMLInclude", "source");
    w.write_element_array(json, "include", includes);
}

pub(super) fn write_use_case(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, USE_CASE, "uml:UseCase")
}

pub(super) fn write_extend(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Extend")?;
    write_ref(&mut json, "extension", record.id_of("source"));
    write_ref(&mut json, "extendedCase", record.id_of("target"));
    write_ref_array(&mut json, "extensionLocation", record.ids("extensionLocations"));
    write_constraint(&mut json, "condition", record.str("condition"));
    Some(json)
}

pub(super) fn write_include(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Include")?;
    write_ref(&mut json, "includingCase", record.id_of("source"));
    write_ref(&mut json, "addition", record.id_of("target"));
    Some(json)
}

// ============================================================================
// PROFILES
// ============================================================================

/// A stereotype extending metaclasses gets one `uml:Extension` owning an
/// extension end, and a `base_<Metaclass>` attribute per extended
/// metaclass.
fn metaclass_extensions(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let repository = w.repository();
    let extensions = relationships(repository, record, "UMLExtension", "source");
    if extensions.is_empty() {
        return;
    }

    let extension_id = ElementId::generate();
    let mut extension = WireNode::with_attr("xmi:id", extension_id.as_str());
    set_type(&mut extension, "uml:Extension");
    let mut end = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    set_type(&mut end, "uml:ExtensionEnd");
    end.set_attr("type", record.id.as_str());
    extension.add_child("ownedEnd", end);
    write_ref_array(&mut extension, "memberEnd", extensions.iter().map(|e| &e.id));

    for relationship in &extensions {
        let metaclass = repository
            .resolve(relationship, "target")
            .and_then(|target| target.str("name").strip_prefix("UML"))
            .filter(|name| !name.is_empty())
            .unwrap_or("Class");
        let mut base = WireNode::with_attr("xmi:id", relationship.id.as_str());
        set_type(&mut base, "uml:Property");
        base.set_attr("name", format!("base_{metaclass}"));
        base.set_attr("association", extension_id.as_str());
        base.set_child("type", WireNode::with_attr("href", format!("{METACLASS_HREF}{metaclass}")));
        json.add_child("ownedAttribute", base);
    }
    json.add_child("ownedMember", extension);
}

pub(super) fn write_stereotype(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, STEREOTYPE, "uml:Stereotype")
}
