//! Kernel writers: elements, features, templates, instances and the plain
//! directed relationships.

use crate::model::metamodel::{self, literals};
use crate::model::{ElementId, ElementKind, Record, Value};
use crate::multiplicity;
use crate::xml::WireNode;

use crate::export::writer::{
    Writer, set_type, write_boolean, write_enum, write_ref, write_ref_array, write_string,
    write_value_spec,
};
use super::{Mixin, concept};

// ============================================================================
// COMPOSITIONS
// ============================================================================

pub(super) const STRUCTURAL_FEATURE: &[Mixin] = &[feature, structural_feature];
pub(super) const PROPERTY: &[Mixin] = &[feature, structural_feature, attribute];
pub(super) const PARAMETER: &[Mixin] = &[feature, structural_feature, parameter];
pub(super) const OPERATION: &[Mixin] = &[feature, behavioral_feature, operation];
pub(super) const DEPENDENCY: &[Mixin] = &[dependency];

// ============================================================================
// ELEMENTS
// ============================================================================

/// Relationships written by the element at their source or target rather
/// than by their owner.
const REDERIVED: &[ElementKind] = &[
    ElementKind::UmlGeneralization,
    ElementKind::UmlComponentRealization,
    ElementKind::UmlInterfaceRealization,
    ElementKind::UmlDeployment,
    ElementKind::UmlExtend,
    ElementKind::UmlInclude,
];

/// Name, owned elements, extension block, stereotype, visibility and
/// template signature.
pub(super) fn element(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_string(json, "name", record.str("name"));
    owned_elements(w, record, json);
    extension(w, record, json);
    stereotype(w, record, json);
    if record.get("visibility").is_some() {
        write_enum(json, "visibility", record.str("visibility"), literals::VISIBILITY);
    }
    template_signature(w, record, json);
}

fn owned_elements(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let repository = w.repository();
    let children = repository.children(record, "ownedElements");
    // The association of an association class is inlined into the class
    let joined: Vec<&ElementId> = children
        .iter()
        .filter(|c| c.type_name == "UMLAssociationClassLink")
        .filter_map(|link| link.id_of("associationSide"))
        .collect();
    let slot = if metamodel::is_kind_of(&record.type_name, ElementKind::UmlPackage) {
        "packagedElement"
    } else {
        "ownedMember"
    };
    let in_port = record.type_name == "UMLPort";

    for child in children.iter().copied() {
        if REDERIVED.iter().any(|kind| metamodel::is_kind_of(&child.type_name, *kind))
            || joined.contains(&&child.id)
        {
            continue;
        }
        if child.type_name == "UMLConstraint" {
            w.write_element(json, "ownedRule", child);
        } else if in_port && metamodel::is_kind_of(&child.type_name, ElementKind::UmlConnector) {
            continue;
        } else {
            w.write_element(json, slot, child);
        }
    }
}

fn extension(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let documentation = record.str("documentation").trim();
    if !documentation.is_empty() {
        w.write_extension(json, "documentation", documentation);
    }

    let repository = w.repository();
    for tag in repository.children(record, "tags") {
        let name = tag.str("name");
        if name.is_empty() {
            continue;
        }
        let value = match tag.str("kind") {
            "reference" => tag.id_of("reference").map(|id| id.to_string()),
            "boolean" => Some(tag.bool("checked").to_string()),
            "number" => tag.int("number").map(|n| n.to_string()),
            // string and hidden
            _ => Some(tag.str("value").to_string()),
        };
        if let Some(value) = value {
            w.extension(json).add_child("tag", WireNode::with_attr(name, value));
        }
    }
}

fn stereotype(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    match record.get("stereotype") {
        Some(Value::Reference(id)) => w.write_extension(json, "stereotype", id.as_str()),
        Some(Value::String(name)) if !name.is_empty() => {
            w.write_extension(json, "stereotype", name)
        }
        _ => {}
    }
}

fn template_signature(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    if record.ids("templateParameters").is_empty() {
        return;
    }
    let mut signature = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    let signature_type = if metamodel::is_kind_of(&record.type_name, ElementKind::UmlClassifier) {
        "uml:RedefinableTemplateSignature"
    } else {
        "uml:TemplateSignature"
    };
    set_type(&mut signature, signature_type);
    w.write_owned(&mut signature, "ownedParameter", record, "templateParameters");
    json.set_child("ownedTemplateSignature", signature);
}

pub(super) fn write_template_parameter(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let repository = w.repository();
    let in_classifier = record
        .parent
        .as_ref()
        .and_then(|id| repository.get(id))
        .is_some_and(|p| metamodel::is_kind_of(&p.type_name, ElementKind::UmlClassifier));
    let wire_type = if in_classifier {
        "uml:ClassifierTemplateParameter"
    } else {
        "uml:TemplateParameter"
    };
    let mut json = concept(w, record, &[], wire_type)?;
    let mut element = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    set_type(&mut element, "uml:Class");
    element.set_attr("name", record.str("name"));
    json.set_child("ownedParameteredElement", element);
    write_value_spec(&mut json, "defaultValue", "uml:LiteralString", record.str("defaultValue"));
    Some(json)
}

/// Constrained elements default to the owner.
pub(super) fn write_constraint(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Constraint")?;
    let constrained = record.ids("constrainedElements");
    if constrained.is_empty() {
        write_ref_array(&mut json, "constrainedElement", record.parent.as_ref());
    } else {
        write_ref_array(&mut json, "constrainedElement", constrained);
    }
    write_value_spec(
        &mut json,
        "specification",
        "uml:OpaqueExpression",
        record.str("specification"),
    );
    Some(json)
}

// ============================================================================
// FEATURES
// ============================================================================

pub(super) fn feature(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isStatic", record.bool("isStatic"));
    write_boolean(json, "isLeaf", record.bool("isLeaf"));
}

pub(super) fn structural_feature(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    w.write_type(json, "type", record.get("type"));
    multiplicity_bounds(json, record.str("multiplicity"));
    write_value_spec(json, "defaultValue", "uml:LiteralString", record.str("defaultValue"));
    write_boolean(json, "isReadOnly", record.bool("isReadOnly"));
    write_boolean(json, "isOrdered", record.bool("isOrdered"));
    write_boolean(json, "isUnique", record.bool("isUnique"));
}

fn multiplicity_bounds(json: &mut WireNode, text: &str) {
    let Some((lower, upper)) = multiplicity::split(text) else {
        return;
    };
    for (name, bound) in [("lowerValue", lower), ("upperValue", upper)] {
        let value_type = if bound == multiplicity::UNLIMITED {
            "uml:LiteralUnlimitedNatural"
        } else {
            "uml:LiteralInteger"
        };
        write_value_spec(json, name, value_type, &bound);
    }
}

pub(super) fn attribute(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_enum(json, "aggregation", record.str("aggregation"), literals::AGGREGATION);
    write_boolean(json, "isDerived", record.bool("isDerived"));
    write_boolean(json, "isID", record.bool("isID"));
    w.write_owned(json, "qualifier", record, "qualifiers");
}

fn parameter(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_enum(json, "direction", record.str("direction"), literals::DIRECTION);
}

fn behavioral_feature(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    w.write_owned(json, "ownedParameter", record, "parameters");
    write_enum(json, "concurrency", record.str("concurrency"), literals::CONCURRENCY);
    write_ref_array(json, "raisedException", record.ids("raisedExceptions"));
}

fn operation(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isQuery", record.bool("isQuery"));
    write_boolean(json, "isAbstract", record.bool("isAbstract"));
    let specification = record.str("specification");
    if !specification.is_empty() {
        w.write_extension(json, "specification", specification);
    }
    for (field, name) in [
        ("preconditions", "precondition"),
        ("postconditions", "postcondition"),
        ("bodyConditions", "bodyCondition"),
    ] {
        w.write_owned(json, name, record, field);
    }
}

// ============================================================================
// INSTANCES
// ============================================================================

pub(super) fn write_slot(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Slot")?;
    write_ref(&mut json, "definingFeature", record.id_of("definingFeature"));
    write_value_spec(&mut json, "value", "uml:OpaqueExpression", record.str("value"));
    Some(json)
}

/// Objects and the artifact, component and node instances share one wire
/// concept; the classifier tells them apart again on import.
pub(super) fn write_instance(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:InstanceSpecification")?;
    w.write_owned(&mut json, "slot", record, "slots");
    write_ref_array(&mut json, "classifier", record.id_of("classifier"));
    write_value_spec(
        &mut json,
        "specification",
        "uml:OpaqueExpression",
        record.str("specification"),
    );
    Some(json)
}

/// A link is an instance of its association whose ends ride in the
/// extension block.
pub(super) fn write_link(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:InstanceSpecification")?;
    write_ref_array(&mut json, "classifier", record.id_of("association"));
    let repository = w.repository();
    for (field, key) in [("end1", "linkEnd1"), ("end2", "linkEnd2")] {
        if let Some(reference) = repository
            .resolve(record, field)
            .and_then(|end| end.id_of("reference"))
        {
            w.write_extension(&mut json, key, reference.as_str());
        }
    }
    Some(json)
}

// ============================================================================
// RELATIONSHIPS
// ============================================================================

fn dependency(_: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_ref(json, "client", record.id_of("source"));
    write_ref(json, "supplier", record.id_of("target"));
}

pub(super) fn write_interface_realization(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:InterfaceRealization")?;
    write_ref(&mut json, "implementingClassifier", record.id_of("source"));
    write_ref(&mut json, "contract", record.id_of("target"));
    Some(json)
}

pub(super) fn write_component_realization(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:ComponentRealization")?;
    write_ref(&mut json, "realizingClassifier", record.id_of("source"));
    write_ref(&mut json, "abstraction", record.id_of("target"));
    Some(json)
}

pub(super) fn write_generalization(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Generalization")?;
    write_ref(&mut json, "specific", record.id_of("source"));
    write_ref(&mut json, "general", record.id_of("target"));
    Some(json)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{child, idrefs, write};
    use crate::model::{Record, Repository, Value};
    use rstest::rstest;

    fn class_with_attribute(attribute: Record) -> Repository {
        let mut repository = Repository::new();
        repository.add_root(Record::new("c").typed("UMLClass").with("name", "C"));
        child(&mut repository, "c", "attributes", attribute);
        repository
    }

    #[test]
    fn test_attribute_fields() {
        let repository = class_with_attribute(
            Record::new("a")
                .typed("UMLAttribute")
                .with("name", "items")
                .with("visibility", "private")
                .with("aggregation", "composite")
                .with("multiplicity", "0..*")
                .with("isOrdered", true)
                .with("defaultValue", "none")
                .with_ref("type", "t"),
        );
        let (node, _) = write(&repository, "a");

        assert_eq!(node.attr("xmi:id"), Some("a"));
        assert_eq!(node.attr("xmi:type"), Some("uml:Property"));
        assert_eq!(node.attr("visibility"), Some("private"));
        assert_eq!(node.attr("aggregation"), Some("composite"));
        assert_eq!(node.attr("type"), Some("t"));
        assert_eq!(node.attr("isOrdered"), Some("true"));
        assert_eq!(node.attr("isStatic"), Some("false"));
        assert_eq!(node.children("lowerValue")[0].attr("xmi:type"), Some("uml:LiteralInteger"));
        assert_eq!(node.children("lowerValue")[0].attr("value"), Some("0"));
        assert_eq!(
            node.children("upperValue")[0].attr("xmi:type"),
            Some("uml:LiteralUnlimitedNatural"),
        );
        assert_eq!(node.children("upperValue")[0].attr("value"), Some("*"));
        assert_eq!(node.children("defaultValue")[0].attr("value"), Some("none"));
    }

    #[rstest]
    #[case("", None, None)]
    #[case("1", Some("1"), Some("1"))]
    #[case("*", Some("*"), Some("*"))]
    #[case("1..5", Some("1"), Some("5"))]
    fn test_multiplicity_bounds(
        #[case] multiplicity: &str,
        #[case] lower: Option<&str>,
        #[case] upper: Option<&str>,
    ) {
        let repository = class_with_attribute(
            Record::new("a").typed("UMLAttribute").with("multiplicity", multiplicity),
        );
        let (node, _) = write(&repository, "a");
        let bound = |name: &str| {
            node.children(name)
                .first()
                .and_then(|b| b.attr("value").map(str::to_string))
        };
        assert_eq!(bound("lowerValue").as_deref(), lower);
        assert_eq!(bound("upperValue").as_deref(), upper);
    }

    #[test]
    fn test_primitive_type_deferred() {
        let repository = class_with_attribute(
            Record::new("a").typed("UMLAttribute").with("type", "String"),
        );
        let (node, deferred) = write(&repository, "a");
        assert_eq!(node.attr("type"), Some("String_id"));
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].attr("name"), Some("String"));
    }

    #[test]
    fn test_package_members_and_rules() {
        let mut repository = Repository::new();
        repository.add_root(Record::new("p").typed("UMLPackage").with("name", "P"));
        child(
            &mut repository,
            "p",
            "ownedElements",
            Record::new("c").typed("UMLClass").with("name", "C"),
        );
        child(
            &mut repository,
            "p",
            "ownedElements",
            Record::new("k").typed("UMLConstraint").with("specification", "x > 0"),
        );
        child(&mut repository, "p", "ownedElements", Record::new("g").typed("UMLGeneralization"));
        child(
            &mut repository,
            "p",
            "ownedElements",
            Record::new("t").typed("Tag").with("name", "t"),
        );

        let (node, _) = write(&repository, "p");
        let packaged: Vec<_> = node
            .children("packagedElement")
            .iter()
            .filter_map(|n| n.attr("xmi:id"))
            .collect();
        assert_eq!(packaged, ["c"]);
        let rule = &node.children("ownedRule")[0];
        assert_eq!(rule.attr("xmi:type"), Some("uml:Constraint"));
        assert_eq!(idrefs(rule, "constrainedElement"), ["p"]);
        assert_eq!(rule.children("specification")[0].attr("body"), Some("x > 0"));
    }

    #[test]
    fn test_non_package_owner_uses_owned_member() {
        let mut repository = Repository::new();
        repository.add_root(Record::new("c").typed("UMLClass"));
        child(
            &mut repository,
            "c",
            "ownedElements",
            Record::new("d").typed("UMLDependency").with_ref("source", "c"),
        );
        let (node, _) = write(&repository, "c");
        assert_eq!(node.children("ownedMember")[0].attr("client"), Some("c"));
        assert!(node.children("packagedElement").is_empty());
    }

    #[test]
    fn test_documentation_stereotype_and_tags_in_extension() {
        let mut repository = Repository::new();
        repository.add_root(
            Record::new("c")
                .typed("UMLClass")
                .with("documentation", "  Orders.  ")
                .with("stereotype", "entity"),
        );
        for tag in [
            Record::new("t1")
                .typed("Tag")
                .with("name", "owner")
                .with("kind", "string")
                .with("value", "team"),
            Record::new("t2")
                .typed("Tag")
                .with("name", "reviewed")
                .with("kind", "boolean")
                .with("checked", true),
            Record::new("t3")
                .typed("Tag")
                .with("name", "priority")
                .with("kind", "number")
                .with("number", 3i64),
            Record::new("t4")
                .typed("Tag")
                .with("name", "link")
                .with("kind", "reference")
                .with_ref("reference", "x"),
        ] {
            child(&mut repository, "c", "tags", tag);
        }

        let (node, _) = write(&repository, "c");
        let ext = &node.children("xmi:Extension")[0];
        assert_eq!(ext.attr("extender"), Some("uml-xmi"));
        assert_eq!(ext.children("documentation")[0].attr("value"), Some("Orders."));
        assert_eq!(ext.children("stereotype")[0].attr("value"), Some("entity"));
        let tags: Vec<_> = ext
            .children("tag")
            .iter()
            .flat_map(|t| t.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect();
        assert_eq!(
            tags,
            [("owner", "team"), ("reviewed", "true"), ("priority", "3"), ("link", "x")],
        );
    }

    #[test]
    fn test_stereotype_reference_written_as_id() {
        let mut repository = Repository::new();
        repository.add_root(
            Record::new("c").typed("UMLClass").with("stereotype", Value::Reference("s".into())),
        );
        let (node, _) = write(&repository, "c");
        assert_eq!(
            node.children("xmi:Extension")[0].children("stereotype")[0].attr("value"),
            Some("s"),
        );
    }

    #[test]
    fn test_template_signature() {
        let mut repository = Repository::new();
        repository.add_root(Record::new("c").typed("UMLClass"));
        child(
            &mut repository,
            "c",
            "templateParameters",
            Record::new("tp").typed("UMLTemplateParameter").with("name", "T"),
        );

        let (node, _) = write(&repository, "c");
        let signature = &node.children("ownedTemplateSignature")[0];
        assert_eq!(signature.attr("xmi:type"), Some("uml:RedefinableTemplateSignature"));
        let parameter = &signature.children("ownedParameter")[0];
        assert_eq!(parameter.attr("xmi:type"), Some("uml:ClassifierTemplateParameter"));
        assert_eq!(parameter.children("ownedParameteredElement")[0].attr("name"), Some("T"));
    }

    #[test]
    fn test_operation_parameters_and_conditions() {
        let mut repository = Repository::new();
        repository.add_root(Record::new("c").typed("UMLClass"));
        child(
            &mut repository,
            "c",
            "operations",
            Record::new("o")
                .typed("UMLOperation")
                .with("name", "run")
                .with("specification", "run()")
                .with("raisedExceptions", Value::References(vec!["e".into()])),
        );
        child(
            &mut repository,
            "o",
            "parameters",
            Record::new("p").typed("UMLParameter").with("direction", "return"),
        );
        child(
            &mut repository,
            "o",
            "preconditions",
            Record::new("k").typed("UMLConstraint").with("specification", "ready"),
        );

        let (node, _) = write(&repository, "o");
        assert_eq!(node.attr("concurrency"), Some("sequential"));
        assert_eq!(node.children("ownedParameter")[0].attr("direction"), Some("return"));
        assert_eq!(idrefs(&node, "raisedException"), ["e"]);
        assert_eq!(node.children("precondition")[0].attr("xmi:id"), Some("k"));
        assert_eq!(
            node.children("xmi:Extension")[0].children("specification")[0].attr("value"),
            Some("run()"),
        );
    }

    #[test]
    fn test_link_ends_in_extension() {
        let mut repository = Repository::new();
        repository.add_root(Record::new("l").typed("UMLLink").with_ref("association", "as"));
        child(
            &mut repository,
            "l",
            "end1",
            Record::new("e1").typed("UMLLinkEnd").with_ref("reference", "o1"),
        );
        child(
            &mut repository,
            "l",
            "end2",
            Record::new("e2").typed("UMLLinkEnd").with_ref("reference", "o2"),
        );

        let (node, _) = write(&repository, "l");
        assert_eq!(node.attr("xmi:type"), Some("uml:InstanceSpecification"));
        assert_eq!(idrefs(&node, "classifier"), ["as"]);
        let ext = &node.children("xmi:Extension")[0];
        assert_eq!(ext.children("linkEnd1")[0].attr("value"), Some("o1"));
        assert_eq!(ext.children("linkEnd2")[0].attr("value"), Some("o2"));
    }

    #[test]
    fn test_instance_slots_and_classifier() {
        let mut repository = Repository::new();
        repository.add_root(Record::new("i").typed("UMLNodeInstance").with_ref("classifier", "n"));
        child(
            &mut repository,
            "i",
            "slots",
            Record::new("s").typed("UMLSlot").with("value", "42").with_ref("definingFeature", "f"),
        );

        let (node, _) = write(&repository, "i");
        assert_eq!(node.attr("xmi:type"), Some("uml:InstanceSpecification"));
        assert_eq!(idrefs(&node, "classifier"), ["n"]);
        let slot = &node.children("slot")[0];
        assert_eq!(slot.attr("definingFeature"), Some("f"));
        assert_eq!(slot.children("value")[0].attr("body"), Some("42"));
    }

    #[rstest]
    #[case("UMLGeneralization", "specific", "general")]
    #[case("UMLDependency", "client", "supplier")]
    #[case("UMLInterfaceRealization", "implementingClassifier", "contract")]
    #[case("UMLComponentRealization", "realizingClassifier", "abstraction")]
    fn test_relationship_ends(#[case] type_name: &str, #[case] source: &str, #[case] target: &str) {
        let mut repository = Repository::new();
        repository.add_root(
            Record::new("r").typed(type_name).with_ref("source", "a").with_ref("target", "b"),
        );
        let (node, _) = write(&repository, "r");
        assert_eq!(node.attr(source), Some("a"));
        assert_eq!(node.attr(target), Some("b"));
    }
}
