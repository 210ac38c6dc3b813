//! Classifier readers, associations, composite structure, components,
//! deployments, use cases and profiles.

use crate::model::{ElementId, Record, Value};
use crate::xml::XmlNode;

use crate::import::reader::{Read, Reader, read_boolean, read_ref, read_ref_array, read_string};
use crate::import::registry::ReaderRegistry;

use super::kernel::{
    PACKAGE, dependency, fallback_ends, feature, multiplicity_element, named, namespace, property,
    redefinable, structural_feature, templateable, typed,
};
use super::{Mixin, compose, concept, swap_field};

pub(super) fn register(registry: &mut ReaderRegistry) {
    registry.register("uml:Class", |r, n| concept(r, n, CLASS, "UMLClass"));
    registry.register("uml:Interface", |r, n| concept(r, n, CLASSIFIER, "UMLInterface"));
    registry.register("uml:Signal", |r, n| concept(r, n, CLASSIFIER, "UMLSignal"));
    registry.register("uml:DataType", |r, n| concept(r, n, CLASSIFIER, "UMLDataType"));
    registry.register("uml:PrimitiveType", |r, n| concept(r, n, CLASSIFIER, "UMLPrimitiveType"));
    registry.register("uml:Enumeration", |r, n| concept(r, n, ENUMERATION, "UMLEnumeration"));

    registry.register("uml:Association", |r, n| concept(r, n, ASSOCIATION, "UMLAssociation"));
    registry.register("uml:AssociationClass", read_association_class);

    registry.register("uml:Port", |r, n| concept(r, n, PORT, "UMLPort"));
    registry.register("uml:ConnectorEnd", |r, n| concept(r, n, CONNECTOR_END, "UMLConnectorEnd"));
    registry.register("uml:Connector", |r, n| concept(r, n, CONNECTOR, "UMLConnector"));
    registry.register("uml:Collaboration", |r, n| concept(r, n, COLLABORATION, "UMLCollaboration"));
    registry.register("uml:CollaborationUse", |r, n| {
        concept(r, n, COLLABORATION_USE, "UMLCollaborationUse")
    });

    registry.register("uml:Component", read_component);
    registry.register("uml:ComponentRealization", |r, n| {
        concept(r, n, COMPONENT_REALIZATION, "UMLComponentRealization")
    });
    registry.register("uml:Artifact", |r, n| concept(r, n, ARTIFACT, "UMLArtifact"));
    registry.register("uml:Node", |r, n| concept(r, n, NODE, "UMLNode"));
    registry.register("uml:Device", |r, n| concept(r, n, DEVICE, "UMLNode"));
    registry.register("uml:ExecutionEnvironment", |r, n| {
        concept(r, n, EXECUTION_ENVIRONMENT, "UMLNode")
    });
    registry.register("uml:CommunicationPath", |r, n| {
        concept(r, n, ASSOCIATION, "UMLCommunicationPath")
    });
    registry.register("uml:Deployment", |r, n| concept(r, n, DEPLOYMENT, "UMLDeployment"));

    registry.register("uml:Actor", |r, n| concept(r, n, ACTOR, "UMLActor"));
    registry.register("uml:UseCase", |r, n| concept(r, n, USE_CASE, "UMLUseCase"));
    registry.register("uml:ExtensionPoint", |r, n| {
        concept(r, n, EXTENSION_POINT, "UMLExtensionPoint")
    });
    registry.register("uml:Extend", |r, n| concept(r, n, EXTEND, "UMLExtend"));
    registry.register("uml:Include", |r, n| concept(r, n, INCLUDE, "UMLInclude"));

    registry.register("uml:Profile", |r, n| concept(r, n, PACKAGE, "UMLProfile"));
    registry.register("uml:Stereotype", |r, n| concept(r, n, STEREOTYPE, "UMLStereotype"));
}

// ============================================================================
// COMPOSITIONS
// ============================================================================

const CLASSIFIER: &[Mixin] = &[named, namespace, redefinable, templateable, classifier];
pub(super) const CLASS: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    structured_classifier,
    encapsulated_classifier,
    behaviored_classifier,
    class,
];
const ENUMERATION: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    enumeration,
];
const ASSOCIATION: &[Mixin] = &[named, association];

const PORT: &[Mixin] = &[
    named,
    redefinable,
    feature,
    typed,
    multiplicity_element,
    structural_feature,
    property,
    port,
];
const CONNECTOR_END: &[Mixin] = &[named, multiplicity_element, connector_end];
const CONNECTOR: &[Mixin] = &[named, redefinable, feature, connector];
const COLLABORATION: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    behaviored_classifier,
];
const COLLABORATION_USE: &[Mixin] = &[named, collaboration_use];

const COMPONENT: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    structured_classifier,
    encapsulated_classifier,
    behaviored_classifier,
    class,
    component,
];
const COMPONENT_REALIZATION: &[Mixin] = &[named, dependency, component_realization];
const ARTIFACT: &[Mixin] = &[named, namespace, redefinable, templateable, classifier, artifact];
const NODE: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    structured_classifier,
    encapsulated_classifier,
    behaviored_classifier,
    class,
    deployment_target,
];
const DEVICE: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    structured_classifier,
    encapsulated_classifier,
    behaviored_classifier,
    class,
    deployment_target,
    device,
];
const EXECUTION_ENVIRONMENT: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    structured_classifier,
    encapsulated_classifier,
    behaviored_classifier,
    class,
    deployment_target,
    execution_environment,
];
const DEPLOYMENT: &[Mixin] = &[named, dependency, deployment];

const ACTOR: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    behaviored_classifier,
];
const USE_CASE: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    behaviored_classifier,
    use_case,
];
const EXTENSION_POINT: &[Mixin] = &[named, redefinable];
const EXTEND: &[Mixin] = &[named, extend];
const INCLUDE: &[Mixin] = &[named, include];

const STEREOTYPE: &[Mixin] = &[
    named,
    namespace,
    redefinable,
    templateable,
    classifier,
    structured_classifier,
    encapsulated_classifier,
    behaviored_classifier,
    class,
    stereotype,
];

// ============================================================================
// CLASSIFIERS
// ============================================================================

/// Read relationship children of a classifier, make it their source and add
/// them to its owned elements.
fn read_sourced(
    r: &mut Reader<'_>,
    node: &XmlNode,
    record: &mut Record,
    tag: &str,
    default_type: &str,
) {
    let relationships = r.read_element_array(node, tag, Some(default_type));
    for id in &relationships {
        if let Some(relationship) = r.table.get_mut(id) {
            relationship.set_ref("source", Some(record.id.clone()));
        }
    }
    record.append_to("ownedElements", relationships);
}

fn classifier(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isAbstract", read_boolean(node, "isAbstract", false));
    record.set("isFinalSpecialization", read_boolean(node, "isFinalSpecialization", false));
    let attributes = r.read_element_array(node, "ownedAttribute", Some("uml:Property"));
    record.set("attributes", Value::OwnedList(attributes));
    let operations = r.read_element_array(node, "ownedOperation", Some("uml:Operation"));
    record.set("operations", Value::OwnedList(operations));

    read_sourced(r, node, record, "generalization", "uml:Generalization");
    read_sourced(r, node, record, "interfaceRealization", "uml:InterfaceRealization");

    let uses = r.read_element_array(node, "collaborationUse", Some("uml:CollaborationUse"));
    record.append_to("ownedElements", uses);
    let nested = r.read_element_array(node, "nestedClassifier", None);
    record.append_to("ownedElements", nested);
}

fn structured_classifier(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let connectors = r.read_element_array(node, "ownedConnector", Some("uml:Connector"));
    record.append_to("ownedElements", connectors);
}

fn encapsulated_classifier(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let ports = r.read_element_array(node, "ownedPort", Some("uml:Port"));
    record.append_to("attributes", ports);
}

fn behaviored_classifier(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let behaviors = r.read_element_array(node, "ownedBehavior", None);
    record.set("behaviors", Value::OwnedList(behaviors));
}

fn class(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isActive", read_boolean(node, "isActive", false));
}

fn enumeration(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let literals = r.read_element_array(node, "ownedLiteral", Some("uml:EnumerationLiteral"));
    record.set("literals", Value::OwnedList(literals));
}

// ============================================================================
// ASSOCIATIONS
// ============================================================================

/// Re-tag a property record as an association end referencing its type.
pub(crate) fn association_end(record: &mut Record) {
    record.type_name = "UMLAssociationEnd".to_string();
    let reference = record.remove("type").unwrap_or(Value::Null);
    record.set("reference", reference);
}

/// Ends come from `ownedEnd` children first and `memberEnd` references
/// second. Owned end pairs have their aggregation exchanged: the wire
/// records it from the opposite end.
fn association(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isDerived", read_boolean(node, "isDerived", false));
    let ends = r.read_element_array(node, "ownedEnd", Some("uml:Property"));
    let member_ends = read_ref_array(node, "memberEnd");

    for id in ends.iter().take(2) {
        if let Some(end) = r.table.get_mut(id) {
            association_end(end);
        }
    }
    match ends.as_slice() {
        [first, second, ..] => {
            swap_field(&mut r.table, first, second, "aggregation");
            record.set("end1", Value::Owned(first.clone()));
            record.set("end2", Value::Owned(second.clone()));
        }
        [only] => {
            record.set("end1", Value::Owned(only.clone()));
            if let Some(other) = member_ends.iter().find(|id| *id != only) {
                record.set("end2", Value::Reference(other.clone()));
            }
        }
        [] => {
            if let [first, second, ..] = member_ends.as_slice() {
                record.set("end1", Value::Reference(first.clone()));
                record.set("end2", Value::Reference(second.clone()));
            }
        }
    }
}

/// One wire element becomes three records: the class (returned), an
/// association with a fresh id owned by the class, and a link joining them.
fn read_association_class(r: &mut Reader<'_>, node: &XmlNode) -> Option<Read> {
    let mut class = compose(r, node, CLASS);
    class.type_name = "UMLClass".to_string();

    let mut association_record = Record::new(ElementId::generate()).typed("UMLAssociation");
    named(r, node, &mut association_record);
    association(r, node, &mut association_record);
    association_record.parent = Some(class.id.clone());
    let association_id = association_record.id.clone();
    for field in ["end1", "end2"] {
        if let Some(Value::Owned(end)) = association_record.get(field) {
            if let Some(end) = r.table.get_mut(end) {
                end.parent = Some(association_id.clone());
            }
        }
    }
    r.table.put(association_record);

    let link = Record::new(ElementId::generate())
        .typed("UMLAssociationClassLink")
        .with_ref("associationSide", association_id.clone())
        .with_ref("classSide", class.id.clone());
    let link_id = r.adopt(link, &class.id);

    class.add_to("ownedElements", association_id);
    class.add_to("ownedElements", link_id);
    Some(Read::Record(class))
}

// ============================================================================
// COMPOSITE STRUCTURE
// ============================================================================

fn port(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isBehavior", read_boolean(node, "isBehavior", false));
    record.set("isService", read_boolean(node, "isService", false));
    record.set("isConjugated", read_boolean(node, "isConjugated", false));
}

fn connector_end(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("reference", read_ref(node, "role"));
    let aggregation = r.read_enum(node, "aggregation", "uml:AggregationKind", Some("none"));
    record.set("aggregation", aggregation.unwrap_or_default());
    record.set("navigable", read_boolean(node, "isNavigable", false));
}

/// Connector ends get the same aggregation exchange as association ends.
fn connector(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("type", read_ref(node, "type"));
    let ends = r.read_element_array(node, "end", Some("uml:ConnectorEnd"));
    if let [first, second, ..] = ends.as_slice() {
        swap_field(&mut r.table, first, second, "aggregation");
        record.set("end1", Value::Owned(first.clone()));
        record.set("end2", Value::Owned(second.clone()));
    }
}

fn collaboration_use(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("type", read_ref(node, "type"));
}

// ============================================================================
// COMPONENTS AND DEPLOYMENTS
// ============================================================================

fn component(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set(
        "isIndirectlyInstantiated",
        read_boolean(node, "isIndirectlyInstantiated", false),
    );
    let realizations = r.read_element_array(node, "realization", Some("uml:ComponentRealization"));
    for id in &realizations {
        if let Some(realization) = r.table.get_mut(id) {
            if realization.id_of("target").is_none() {
                realization.set_ref("target", Some(record.id.clone()));
            }
        }
    }
    record.append_to("ownedElements", realizations);
}

/// Subsystems are written as components stereotyped `subsystem`.
fn read_component(r: &mut Reader<'_>, node: &XmlNode) -> Option<Read> {
    let mut record = compose(r, node, COMPONENT);
    record.type_name = if record.str("stereotype") == "subsystem" {
        record.remove("stereotype");
        "UMLSubsystem".to_string()
    } else {
        "UMLComponent".to_string()
    };
    Some(Read::Record(record))
}

fn component_realization(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    fallback_ends(record, node, "realizingClassifier", "abstraction");
}

fn artifact(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("fileName", read_string(node, "fileName", ""));
}

fn deployment_target(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let deployments = r.read_element_array(node, "deployment", Some("uml:Deployment"));
    record.append_to("ownedElements", deployments);
}

fn device(_: &mut Reader<'_>, _: &XmlNode, record: &mut Record) {
    record.set("stereotype", "device");
}

fn execution_environment(_: &mut Reader<'_>, _: &XmlNode, record: &mut Record) {
    record.set("stereotype", "executionEnvironment");
}

/// `client` is the location on the wire; the deployment pass swaps the
/// ends afterwards, so the fallback attributes are read in wire polarity.
fn deployment(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    fallback_ends(record, node, "location", "deployedArtifact");
}

// ============================================================================
// USE CASES
// ============================================================================

fn use_case(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let points = r.read_element_array(node, "extensionPoint", Some("uml:ExtensionPoint"));
    record.set("extensionPoints", Value::OwnedList(points));
    read_sourced(r, node, record, "include", "uml:Include");
    read_sourced(r, node, record, "extend", "uml:Extend");
}

fn extend(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("source", read_ref(node, "extension"));
    record.set_ref("target", read_ref(node, "extendedCase"));
    record.set("extensionLocations", Value::References(read_ref_array(node, "extensionLocation")));
    let condition = r.read_constraint_text(node, "condition").unwrap_or_default();
    record.set("condition", condition);
}

fn include(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("source", read_ref(node, "includingCase"));
    record.set_ref("target", read_ref(node, "addition"));
}

// ============================================================================
// PROFILES
// ============================================================================

/// `base_<Metaclass>` properties belong to the stereotype's metaclass
/// extension, not to its attribute list.
fn stereotype(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let extension_ends = node
        .children_named("ownedAttribute")
        .filter(|a| a.attr("association").is_some())
        .filter(|a| a.attr("name").is_some_and(|n| n.starts_with("base_")))
        .filter_map(|a| a.attr("xmi:id"));
    for id in extension_ends.map(ElementId::from) {
        record.remove_from("attributes", &id);
        r.table.remove(&id);
    }
}
