//! Graph repair passes run once over the whole table after the parse.
//!
//! Each pass looks at one record at a time and mutates it (and its
//! neighbours) in place. Passes run in a fixed order over a snapshot of the
//! table's ids, so records added by a pass are only seen by later passes.
//! A pass that cannot complete its repair leaves the record as it was.
//!
//! Ordering constraints:
//! - association ends are repaired (2) before anything inspects ends;
//! - interactions are restructured (7) before relationship cleanup (10),
//!   which relies on messages having concrete `source`/`target`;
//! - gate promotion (8) needs operands still under their combined fragment.

use tracing::{trace, warn};

use crate::model::metamodel::{ElementKind, is_kind_of};
use crate::model::{ElementId, IdTable, Record, Value};

use super::uml::association_end;

/// Wire-only fragment types dropped once messages are resolved.
const OCCURRENCE: &str = "OccurrenceSpecification";
const EXECUTION: &str = "ExecutionSpecification";

/// Sequence fields a relationship can be owned through.
const RELATIONSHIP_SLOTS: &[&str] = &["ownedElements", "edges", "messages", "transitions"];

type Pass = fn(&mut IdTable, &ElementId);

/// Named passes in run order.
pub(crate) const PASSES: &[(&str, Pass)] = &[
    ("specialize-realizations", specialize_realization),
    ("repair-association-ends", repair_member_ends),
    ("detect-role-bindings", detect_role_binding),
    ("swap-deployment-ends", swap_deployment_ends),
    ("specialize-instances", specialize_instance),
    ("default-slot-names", default_slot_name),
    ("restructure-interactions", restructure_interaction),
    ("promote-formal-gates", promote_formal_gates),
    ("synthesize-regions", synthesize_region),
    ("remove-dangling-relationships", remove_dangling_relationship),
    ("resolve-stereotypes", resolve_stereotype),
];

/// Run every pass over the table.
pub fn run(table: &mut IdTable) {
    for (name, pass) in PASSES {
        trace!(pass = name, records = table.len(), "postprocessing");
        for id in table.ids() {
            pass(table, &id);
        }
    }
}

fn retype(table: &mut IdTable, id: &ElementId, type_name: &str) {
    if let Some(record) = table.get_mut(id) {
        record.type_name = type_name.to_string();
    }
}

// ============================================================================
// RELATIONSHIPS AND INSTANCES
// ============================================================================

/// A generic realization targeting a component or interface becomes the
/// specific realization.
fn specialize_realization(table: &mut IdTable, id: &ElementId) {
    let Some(record) = table.get(id) else {
        return;
    };
    if record.type_name != "UMLRealization" {
        return;
    }
    let Some(target) = table.resolve(record, "target") else {
        warn!(%id, "realization target not found, left unspecialized");
        return;
    };
    let specialized = if is_kind_of(&target.type_name, ElementKind::UmlComponent) {
        "UMLComponentRealization"
    } else if is_kind_of(&target.type_name, ElementKind::UmlInterface) {
        "UMLInterfaceRealization"
    } else {
        return;
    };
    retype(table, id, specialized);
}

/// An association end given only as a reference to a classifier's attribute
/// is moved under the association.
fn repair_member_ends(table: &mut IdTable, id: &ElementId) {
    let Some(association) = table.get(id) else {
        return;
    };
    if !is_kind_of(&association.type_name, ElementKind::UmlAssociation) {
        return;
    }
    let referenced: Vec<(&str, ElementId)> = ["end1", "end2"]
        .into_iter()
        .filter_map(|field| match association.get(field) {
            Some(Value::Reference(end)) => Some((field, end.clone())),
            _ => None,
        })
        .collect();

    for (field, end_id) in referenced {
        let Some(end) = table.get_mut(&end_id) else {
            warn!(association = %id, end = %end_id, "association end not found");
            continue;
        };
        let owner = end.parent.replace(id.clone());
        association_end(end);
        end.set("navigable", false);
        if let Some(owner) = owner.and_then(|owner| table.get_mut(&owner)) {
            owner.remove_from("attributes", &end_id);
        }
        if let Some(association) = table.get_mut(id) {
            association.set(field, Value::Owned(end_id));
        }
    }
}

/// Only collaboration-use to attribute dependencies are recognized, ports
/// included since they are attributes.
fn detect_role_binding(table: &mut IdTable, id: &ElementId) {
    let Some(record) = table.get(id) else {
        return;
    };
    if record.type_name != "UMLDependency" {
        return;
    }
    let source = table.resolve(record, "source");
    let target = table.resolve(record, "target");
    let binds = match (source, target) {
        (Some(source), Some(target)) => {
            is_kind_of(&source.type_name, ElementKind::UmlCollaborationUse)
                && is_kind_of(&target.type_name, ElementKind::UmlAttribute)
        }
        _ => false,
    };
    if binds {
        retype(table, id, "UMLRoleBinding");
    }
}

/// Client/supplier polarity of a deployment is the reverse of
/// source/target.
fn swap_deployment_ends(table: &mut IdTable, id: &ElementId) {
    let Some(record) = table.get_mut(id).filter(|r| r.type_name == "UMLDeployment") else {
        return;
    };
    let source = record.remove("source").unwrap_or(Value::Null);
    let target = record.remove("target").unwrap_or(Value::Null);
    record.set("source", target);
    record.set("target", source);
}

fn specialize_instance(table: &mut IdTable, id: &ElementId) {
    let Some(record) = table.get(id) else {
        return;
    };
    if record.type_name != "UMLObject" || record.id_of("classifier").is_none() {
        return;
    }
    let Some(classifier) = table.resolve(record, "classifier") else {
        warn!(%id, "instance classifier not found");
        return;
    };
    let specialized = match classifier.type_name.as_str() {
        "UMLNode" => "UMLNodeInstance",
        "UMLComponent" => "UMLComponentInstance",
        "UMLArtifact" => "UMLArtifactInstance",
        _ => return,
    };
    retype(table, id, specialized);
}

fn default_slot_name(table: &mut IdTable, id: &ElementId) {
    let Some(slot) = table.get(id) else {
        return;
    };
    if slot.type_name != "UMLSlot"
        || !slot.str("name").trim().is_empty()
        || slot.id_of("definingFeature").is_none()
    {
        return;
    }
    let Some(feature) = table.resolve(slot, "definingFeature") else {
        warn!(%id, "slot defining feature not found");
        return;
    };
    let name = feature.str("name").to_string();
    if let Some(slot) = table.get_mut(id) {
        slot.set("name", name);
    }
}

// ============================================================================
// INTERACTIONS
// ============================================================================

fn restructure_interaction(table: &mut IdTable, id: &ElementId) {
    if table.type_of(id) != Some("UMLInteraction") {
        return;
    }
    relocate_features(table, id);
    let messages = table.get(id).map(|i| i.ids("messages").to_vec()).unwrap_or_default();
    for message in &messages {
        resolve_message_ends(table, id, message);
    }
    prune_occurrences(table, id);
}

/// Attributes and operations of an interaction belong to a classifier: the
/// parent when it is one, otherwise a collaboration inserted between the
/// parent and the interaction.
fn relocate_features(table: &mut IdTable, id: &ElementId) {
    let Some(interaction) = table.get(id) else {
        return;
    };
    let Some(parent_id) = interaction.parent.clone() else {
        return;
    };
    let attributes = interaction.ids("attributes").to_vec();
    let operations = interaction.ids("operations").to_vec();
    let Some(parent) = table.get(&parent_id) else {
        warn!(interaction = %id, parent = %parent_id, "interaction parent not found");
        return;
    };

    let owner = if is_kind_of(&parent.type_name, ElementKind::UmlClassifier) {
        parent_id
    } else if parent.get("ownedElements").is_some() {
        wrap_in_collaboration(table, id, &parent_id)
    } else {
        return;
    };

    for (field, features) in [("attributes", attributes), ("operations", operations)] {
        for feature in features {
            if let Some(record) = table.get_mut(&feature) {
                record.parent = Some(owner.clone());
            }
            if let Some(owner) = table.get_mut(&owner) {
                owner.add_to(field, feature);
            }
        }
    }
    if let Some(interaction) = table.get_mut(id) {
        interaction.set("attributes", Value::OwnedList(Vec::new()));
        interaction.set("operations", Value::OwnedList(Vec::new()));
    }
}

fn wrap_in_collaboration(table: &mut IdTable, id: &ElementId, parent_id: &ElementId) -> ElementId {
    let mut collaboration = Record::new(ElementId::generate())
        .typed("UMLCollaboration")
        .with("ownedElements", Value::OwnedList(vec![id.clone()]))
        .with("attributes", Value::OwnedList(Vec::new()))
        .with("operations", Value::OwnedList(Vec::new()));
    collaboration.parent = Some(parent_id.clone());
    let collaboration_id = collaboration.id.clone();
    table.put(collaboration);

    if let Some(parent) = table.get_mut(parent_id) {
        parent.remove_from("ownedElements", id);
        parent.add_to("ownedElements", collaboration_id.clone());
    }
    if let Some(interaction) = table.get_mut(id) {
        interaction.parent = Some(collaboration_id.clone());
    }
    collaboration_id
}

/// What a message's send or receive event resolved to.
enum MessageEnd {
    Occurrence(Value),
    Element(ElementId),
    Missing,
}

/// `sendEvent`/`receiveEvent` become `source`/`target`: the lifeline an
/// occurrence covers, the gate itself, or a fresh endpoint when the event
/// is missing (found and lost messages).
fn resolve_message_ends(table: &mut IdTable, interaction_id: &ElementId, message_id: &ElementId) {
    for (event_field, end_field) in [("sendEvent", "source"), ("receiveEvent", "target")] {
        let Some(message) = table.get(message_id) else {
            return;
        };
        let end = match table.resolve(message, event_field) {
            Some(event) if event.type_name == OCCURRENCE => {
                MessageEnd::Occurrence(event.get("covered").cloned().unwrap_or(Value::Null))
            }
            Some(event) => MessageEnd::Element(event.id.clone()),
            None => MessageEnd::Missing,
        };
        let end = match end {
            MessageEnd::Occurrence(covered) => covered,
            MessageEnd::Element(element) => Value::Reference(element),
            MessageEnd::Missing => Value::Reference(add_endpoint(table, interaction_id)),
        };
        if let Some(message) = table.get_mut(message_id) {
            message.remove(event_field);
            message.set(end_field, end);
        }
    }
}

fn add_endpoint(table: &mut IdTable, interaction_id: &ElementId) -> ElementId {
    let mut endpoint = Record::new(ElementId::generate()).typed("UMLEndpoint");
    endpoint.parent = Some(interaction_id.clone());
    let endpoint_id = endpoint.id.clone();
    table.put(endpoint);
    if let Some(interaction) = table.get_mut(interaction_id) {
        interaction.add_to("participants", endpoint_id.clone());
    }
    endpoint_id
}

/// Only the interaction's own `fragments` are pruned. Occurrences nested in
/// combined-fragment operands keep their intermediate type and are dropped
/// by the materializer.
fn prune_occurrences(table: &mut IdTable, id: &ElementId) {
    let fragments = table.get(id).map(|i| i.ids("fragments").to_vec()).unwrap_or_default();
    let (pruned, kept): (Vec<_>, Vec<_>) = fragments
        .into_iter()
        .partition(|f| matches!(table.type_of(f), Some(OCCURRENCE | EXECUTION)));
    if let Some(interaction) = table.get_mut(id) {
        interaction.set("fragments", Value::OwnedList(kept));
    }
    for fragment in &pruned {
        table.remove(fragment);
    }
}

/// Formal gates some tools nest under an operand belong to the enclosing
/// interaction's participants.
fn promote_formal_gates(table: &mut IdTable, id: &ElementId) {
    let Some(operand) = table.get(id) else {
        return;
    };
    if operand.type_name != "UMLInteractionOperand" || operand.ids("_formalGates").is_empty() {
        return;
    }
    let gates = operand.ids("_formalGates").to_vec();
    let interaction_id = operand
        .parent
        .as_ref()
        .and_then(|fragment| table.get(fragment))
        .and_then(|fragment| fragment.parent.clone())
        .filter(|interaction| table.type_of(interaction) == Some("UMLInteraction"));
    let Some(interaction_id) = interaction_id else {
        warn!(operand = %id, "no enclosing interaction for formal gates");
        return;
    };

    for gate in gates {
        if let Some(record) = table.get_mut(&gate) {
            record.parent = Some(interaction_id.clone());
        }
        if let Some(interaction) = table.get_mut(&interaction_id) {
            interaction.add_to("participants", gate);
        }
    }
    if let Some(operand) = table.get_mut(id) {
        operand.remove("_formalGates");
    }
}

// ============================================================================
// STATE MACHINES
// ============================================================================

/// Vertices and transitions owned directly by an element other than a
/// region move into a state machine created for that owner on first use.
fn synthesize_region(table: &mut IdTable, id: &ElementId) {
    let Some(record) = table.get(id) else {
        return;
    };
    let field = if is_kind_of(&record.type_name, ElementKind::UmlVertex) {
        "vertices"
    } else if is_kind_of(&record.type_name, ElementKind::UmlTransition) {
        "transitions"
    } else {
        return;
    };
    let Some(parent_id) = record.parent.clone() else {
        return;
    };
    let Some(parent) = table.get(&parent_id) else {
        return;
    };
    if parent.type_name == "UMLRegion" || !parent.ids("ownedElements").contains(id) {
        return;
    }

    let existing = parent
        .id_of("_stateMachine")
        .and_then(|machine| table.get(machine))
        .and_then(|machine| machine.ids("regions").first().cloned());
    let region_id = match existing {
        Some(region) => region,
        None => add_state_machine(table, &parent_id),
    };

    if let Some(parent) = table.get_mut(&parent_id) {
        parent.remove_from("ownedElements", id);
    }
    if let Some(region) = table.get_mut(&region_id) {
        region.add_to(field, id.clone());
    }
    if let Some(record) = table.get_mut(id) {
        record.parent = Some(region_id);
    }
}

/// Add a state machine with one empty region under `owner`; returns the
/// region.
fn add_state_machine(table: &mut IdTable, owner: &ElementId) -> ElementId {
    let machine_id = ElementId::generate();
    let mut region = Record::new(ElementId::generate())
        .typed("UMLRegion")
        .with("vertices", Value::OwnedList(Vec::new()))
        .with("transitions", Value::OwnedList(Vec::new()));
    region.parent = Some(machine_id.clone());
    let region_id = region.id.clone();

    let mut machine = Record::new(machine_id.clone())
        .typed("UMLStateMachine")
        .with("regions", Value::OwnedList(vec![region_id.clone()]));
    machine.parent = Some(owner.clone());

    table.put(region);
    table.put(machine);
    if let Some(owner) = table.get_mut(owner) {
        owner.add_to("ownedElements", machine_id.clone());
        owner.set("_stateMachine", Value::Reference(machine_id));
    }
    region_id
}

// ============================================================================
// CLEANUP
// ============================================================================

/// A directed relationship with an unresolved end is removed from its owner
/// and from the table. Parentless records are left alone.
fn remove_dangling_relationship(table: &mut IdTable, id: &ElementId) {
    let Some(record) = table.get(id) else {
        return;
    };
    if !is_kind_of(&record.type_name, ElementKind::DirectedRelationship) {
        return;
    }
    let resolved = ["source", "target"].iter().all(|end| table.resolve(record, end).is_some());
    if resolved {
        return;
    }
    let Some(parent_id) = record.parent.clone() else {
        return;
    };
    warn!(%id, type_name = %record.type_name, "dropping relationship with an unresolved end");

    if let Some(parent) = table.get_mut(&parent_id) {
        for slot in RELATIONSHIP_SLOTS {
            if parent.remove_from(slot, id) {
                break;
            }
        }
    }
    table.remove(id);
}

/// A string stereotype naming the id of a stereotype in the table becomes a
/// reference to it.
fn resolve_stereotype(table: &mut IdTable, id: &ElementId) {
    let Some(Value::String(stereotype)) = table.get(id).and_then(|r| r.get("stereotype")) else {
        return;
    };
    let target = ElementId::from(stereotype.as_str());
    if table.type_of(&target) != Some("UMLStereotype") {
        return;
    }
    if let Some(record) = table.get_mut(id) {
        record.set("stereotype", Value::Reference(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: impl IntoIterator<Item = Record>) -> IdTable {
        let mut table = IdTable::new();
        for record in records {
            table.put(record);
        }
        table
    }

    fn owned(id: &str, type_name: &str, parent: &str) -> Record {
        let mut record = Record::new(id).typed(type_name);
        record.parent = Some(parent.into());
        record
    }

    fn run_pass(table: &mut IdTable, pass: Pass) {
        for id in table.ids() {
            pass(table, &id);
        }
    }

    fn type_of<'t>(table: &'t IdTable, id: &str) -> Option<&'t str> {
        table.type_of(&id.into())
    }

    #[test]
    fn test_realization_specialized_by_target() {
        let mut t = table([
            Record::new("comp").typed("UMLSubsystem"),
            Record::new("iface").typed("UMLInterface"),
            Record::new("cls").typed("UMLClass"),
            Record::new("r1").typed("UMLRealization").with_ref("target", "comp"),
            Record::new("r2").typed("UMLRealization").with_ref("target", "iface"),
            Record::new("r3").typed("UMLRealization").with_ref("target", "cls"),
            Record::new("r4").typed("UMLRealization").with_ref("target", "gone"),
        ]);
        run_pass(&mut t, specialize_realization);
        assert_eq!(type_of(&t, "r1"), Some("UMLComponentRealization"));
        assert_eq!(type_of(&t, "r2"), Some("UMLInterfaceRealization"));
        assert_eq!(type_of(&t, "r3"), Some("UMLRealization"));
        assert_eq!(type_of(&t, "r4"), Some("UMLRealization"));
    }

    #[test]
    fn test_referenced_member_end_moves_under_association() {
        let mut t = table([
            Record::new("c")
                .typed("UMLClass")
                .with("attributes", Value::OwnedList(vec!["p".into(), "q".into()])),
            owned("p", "UMLAttribute", "c").with_ref("type", "t").with("navigable", true),
            owned("q", "UMLAttribute", "c"),
            Record::new("a")
                .typed("UMLAssociation")
                .with_ref("end1", "p")
                .with("end2", Value::Owned("e2".into())),
            owned("e2", "UMLAssociationEnd", "a"),
        ]);
        run_pass(&mut t, repair_member_ends);

        let end = t.get(&"p".into()).expect("end");
        assert_eq!(end.type_name, "UMLAssociationEnd");
        assert_eq!(end.parent, Some("a".into()));
        assert_eq!(end.id_of("reference"), Some(&"t".into()));
        assert!(!end.bool("navigable"));
        assert_eq!(
            t.get(&"c".into()).map(|c| c.ids("attributes").to_vec()),
            Some(vec!["q".into()]),
        );
        assert_eq!(t.get(&"a".into()).and_then(|a| a.get("end1")), Some(&Value::Owned("p".into())));
    }

    #[test]
    fn test_role_binding_detection() {
        let mut t = table([
            Record::new("cu").typed("UMLCollaborationUse"),
            Record::new("attr").typed("UMLAttribute"),
            Record::new("port").typed("UMLPort"),
            Record::new("cls").typed("UMLClass"),
            Record::new("d1")
                .typed("UMLDependency")
                .with_ref("source", "cu")
                .with_ref("target", "attr"),
            Record::new("d2")
                .typed("UMLDependency")
                .with_ref("source", "cu")
                .with_ref("target", "port"),
            Record::new("d3")
                .typed("UMLDependency")
                .with_ref("source", "cu")
                .with_ref("target", "cls"),
            Record::new("d4")
                .typed("UMLDependency")
                .with_ref("source", "attr")
                .with_ref("target", "cu"),
        ]);
        run_pass(&mut t, detect_role_binding);
        assert_eq!(type_of(&t, "d1"), Some("UMLRoleBinding"));
        assert_eq!(type_of(&t, "d2"), Some("UMLRoleBinding"));
        assert_eq!(type_of(&t, "d3"), Some("UMLDependency"));
        assert_eq!(type_of(&t, "d4"), Some("UMLDependency"));
    }

    #[test]
    fn test_deployment_ends_swapped() {
        let mut t = table([
            Record::new("d")
                .typed("UMLDeployment")
                .with_ref("source", "node")
                .with_ref("target", "artifact"),
            Record::new("x").typed("UMLDependency").with_ref("source", "a").with_ref("target", "b"),
        ]);
        run_pass(&mut t, swap_deployment_ends);
        let d = t.get(&"d".into()).expect("deployment");
        assert_eq!(d.id_of("source"), Some(&"artifact".into()));
        assert_eq!(d.id_of("target"), Some(&"node".into()));
        assert_eq!(t.get(&"x".into()).and_then(|x| x.id_of("source")), Some(&"a".into()));
    }

    #[test]
    fn test_instances_specialized_by_classifier() {
        let mut t = table([
            Record::new("n").typed("UMLNode"),
            Record::new("a").typed("UMLArtifact"),
            Record::new("c").typed("UMLClass"),
            Record::new("o1").typed("UMLObject").with_ref("classifier", "n"),
            Record::new("o2").typed("UMLObject").with_ref("classifier", "a"),
            Record::new("o3").typed("UMLObject").with_ref("classifier", "c"),
            Record::new("o4").typed("UMLObject"),
        ]);
        run_pass(&mut t, specialize_instance);
        assert_eq!(type_of(&t, "o1"), Some("UMLNodeInstance"));
        assert_eq!(type_of(&t, "o2"), Some("UMLArtifactInstance"));
        assert_eq!(type_of(&t, "o3"), Some("UMLObject"));
        assert_eq!(type_of(&t, "o4"), Some("UMLObject"));
    }

    #[test]
    fn test_slot_name_defaults_to_feature_name() {
        let mut t = table([
            Record::new("f").typed("UMLAttribute").with("name", "age"),
            Record::new("s1").typed("UMLSlot").with("name", " ").with_ref("definingFeature", "f"),
            Record::new("s2")
                .typed("UMLSlot")
                .with("name", "kept")
                .with_ref("definingFeature", "f"),
        ]);
        run_pass(&mut t, default_slot_name);
        assert_eq!(t.get(&"s1".into()).map(|s| s.str("name")), Some("age"));
        assert_eq!(t.get(&"s2".into()).map(|s| s.str("name")), Some("kept"));
    }

    fn interaction_table(parent_type: &str) -> IdTable {
        table([
            Record::new("pkg")
                .typed(parent_type)
                .with("ownedElements", Value::OwnedList(vec!["i".into()]))
                .with("attributes", Value::OwnedList(Vec::new()))
                .with("operations", Value::OwnedList(Vec::new())),
            owned("i", "UMLInteraction", "pkg")
                .with("attributes", Value::OwnedList(vec!["role".into()]))
                .with("operations", Value::OwnedList(Vec::new()))
                .with("participants", Value::OwnedList(vec!["l1".into(), "l2".into()]))
                .with(
                    "fragments",
                    Value::OwnedList(vec!["s".into(), "r".into(), "x".into(), "cf".into()]),
                )
                .with("messages", Value::OwnedList(vec!["m1".into(), "m2".into()])),
            owned("role", "UMLAttribute", "i"),
            owned("l1", "UMLLifeline", "i"),
            owned("l2", "UMLLifeline", "i"),
            owned("s", OCCURRENCE, "i").with_ref("covered", "l1"),
            owned("r", OCCURRENCE, "i").with_ref("covered", "l2"),
            owned("x", EXECUTION, "i"),
            owned("cf", "UMLCombinedFragment", "i"),
            owned("m1", "UMLMessage", "i").with_ref("sendEvent", "s").with_ref("receiveEvent", "r"),
            owned("m2", "UMLMessage", "i")
                .with("sendEvent", Value::Null)
                .with_ref("receiveEvent", "r"),
        ])
    }

    #[test]
    fn test_interaction_under_package_gets_collaboration() {
        let mut t = interaction_table("UMLPackage");
        run_pass(&mut t, restructure_interaction);

        let pkg = t.get(&"pkg".into()).expect("package");
        let children = pkg.ids("ownedElements");
        assert_eq!(children.len(), 1);
        let collaboration = t.get(&children[0]).expect("collaboration");
        assert_eq!(collaboration.type_name, "UMLCollaboration");
        assert_eq!(collaboration.ids("ownedElements"), &[ElementId::from("i")]);
        assert_eq!(collaboration.ids("attributes"), &[ElementId::from("role")]);
        assert_eq!(
            t.get(&"role".into()).and_then(|r| r.parent.clone()),
            Some(collaboration.id.clone()),
        );
        assert_eq!(
            t.get(&"i".into()).and_then(|i| i.parent.clone()),
            Some(collaboration.id.clone()),
        );
        assert!(t.get(&"i".into()).is_some_and(|i| i.ids("attributes").is_empty()));
    }

    #[test]
    fn test_interaction_under_classifier_moves_features_to_it() {
        let mut t = interaction_table("UMLClass");
        run_pass(&mut t, restructure_interaction);
        let class = t.get(&"pkg".into()).expect("class");
        assert_eq!(class.ids("ownedElements"), &[ElementId::from("i")]);
        assert_eq!(class.ids("attributes"), &[ElementId::from("role")]);
    }

    #[test]
    fn test_messages_resolved_and_occurrences_pruned() {
        let mut t = interaction_table("UMLPackage");
        run_pass(&mut t, restructure_interaction);

        let m1 = t.get(&"m1".into()).expect("m1");
        assert_eq!(m1.id_of("source"), Some(&"l1".into()));
        assert_eq!(m1.id_of("target"), Some(&"l2".into()));
        assert!(m1.get("sendEvent").is_none());

        let interaction = t.get(&"i".into()).expect("interaction");
        let m2 = t.get(&"m2".into()).expect("m2");
        let endpoint = m2.id_of("source").expect("endpoint");
        assert_eq!(t.type_of(endpoint), Some("UMLEndpoint"));
        assert!(interaction.ids("participants").contains(endpoint));
        assert_eq!(interaction.ids("fragments"), &[ElementId::from("cf")]);
        assert!(t.get(&"s".into()).is_none());
        assert!(t.get(&"x".into()).is_none());
    }

    #[test]
    fn test_occurrences_in_operands_are_not_pruned() {
        let mut t = interaction_table("UMLPackage");
        if let Some(cf) = t.get_mut(&"cf".into()) {
            cf.set("operands", Value::OwnedList(vec!["op".into()]));
        }
        t.put(
            owned("op", "UMLInteractionOperand", "cf")
                .with("fragments", Value::OwnedList(vec!["inner".into()])),
        );
        t.put(owned("inner", OCCURRENCE, "op").with_ref("covered", "l1"));
        run_pass(&mut t, restructure_interaction);

        let interaction = t.get(&"i".into()).expect("interaction");
        assert_eq!(interaction.ids("fragments"), &[ElementId::from("cf")]);
        let operand = t.get(&"op".into()).expect("operand");
        assert_eq!(operand.ids("fragments"), &[ElementId::from("inner")]);
        assert_eq!(t.type_of(&"inner".into()), Some(OCCURRENCE));
    }

    #[test]
    fn test_formal_gates_promoted_to_interaction() {
        let mut t = table([
            Record::new("i")
                .typed("UMLInteraction")
                .with("participants", Value::OwnedList(Vec::new())),
            owned("cf", "UMLCombinedFragment", "i"),
            owned("op", "UMLInteractionOperand", "cf")
                .with("_formalGates", Value::OwnedList(vec!["g".into()])),
            owned("g", "UMLGate", "op"),
        ]);
        run_pass(&mut t, promote_formal_gates);
        assert_eq!(
            t.get(&"i".into()).map(|i| i.ids("participants").to_vec()),
            Some(vec!["g".into()]),
        );
        assert_eq!(t.get(&"g".into()).and_then(|g| g.parent.clone()), Some("i".into()));
        assert!(t.get(&"op".into()).is_some_and(|op| op.get("_formalGates").is_none()));
    }

    #[test]
    fn test_vertices_outside_regions_share_one_synthesized_region() {
        let mut t = table([
            Record::new("c")
                .typed("UMLClass")
                .with(
                    "ownedElements",
                    Value::OwnedList(vec!["s1".into(), "s2".into(), "t".into()]),
                ),
            owned("s1", "UMLState", "c"),
            owned("s2", "UMLPseudostate", "c"),
            owned("t", "UMLTransition", "c"),
            Record::new("r")
                .typed("UMLRegion")
                .with("vertices", Value::OwnedList(vec!["s3".into()])),
            owned("s3", "UMLState", "r"),
        ]);
        run_pass(&mut t, synthesize_region);

        let class = t.get(&"c".into()).expect("class");
        assert_eq!(class.ids("ownedElements").len(), 1);
        let machine = t.get(&class.ids("ownedElements")[0]).expect("machine");
        assert_eq!(machine.type_name, "UMLStateMachine");
        let region = t.get(&machine.ids("regions")[0]).expect("region");
        assert_eq!(region.ids("vertices"), &[ElementId::from("s1"), ElementId::from("s2")]);
        assert_eq!(region.ids("transitions"), &[ElementId::from("t")]);
        assert_eq!(t.get(&"s2".into()).and_then(|s| s.parent.clone()), Some(region.id.clone()));
        assert_eq!(t.get(&"s3".into()).and_then(|s| s.parent.clone()), Some("r".into()));
    }

    #[test]
    fn test_dangling_relationships_removed() {
        let mut t = table([
            Record::new("a")
                .typed("UMLClass")
                .with("ownedElements", Value::OwnedList(vec!["g1".into(), "g2".into()])),
            Record::new("b").typed("UMLClass"),
            owned("g1", "UMLGeneralization", "a").with_ref("source", "a").with_ref("target", "b"),
            owned("g2", "UMLGeneralization", "a")
                .with_ref("source", "a")
                .with_ref("target", "gone"),
            Record::new("act")
                .typed("UMLActivity")
                .with("edges", Value::OwnedList(vec!["e".into()])),
            owned("e", "UMLControlFlow", "act").with_ref("source", "a").with("target", Value::Null),
            Record::new("loose").typed("UMLDependency").with_ref("source", "gone"),
        ]);
        run_pass(&mut t, remove_dangling_relationship);
        assert_eq!(
            t.get(&"a".into()).map(|a| a.ids("ownedElements").to_vec()),
            Some(vec!["g1".into()]),
        );
        assert!(t.get(&"g2".into()).is_none());
        assert!(t.get(&"act".into()).is_some_and(|a| a.ids("edges").is_empty()));
        assert!(t.get(&"loose".into()).is_some());
    }

    #[test]
    fn test_stereotype_ids_become_references() {
        let mut t = table([
            Record::new("st").typed("UMLStereotype"),
            Record::new("c1").typed("UMLClass").with("stereotype", "st"),
            Record::new("c2").typed("UMLClass").with("stereotype", "entity"),
        ]);
        run_pass(&mut t, resolve_stereotype);
        assert_eq!(
            t.get(&"c1".into()).and_then(|c| c.get("stereotype")),
            Some(&Value::Reference("st".into())),
        );
        assert_eq!(t.get(&"c2".into()).map(|c| c.str("stereotype")), Some("entity"));
    }

    #[test]
    fn test_run_applies_passes_in_order() {
        let mut t = table([
            Record::new("n").typed("UMLNode"),
            Record::new("art").typed("UMLArtifact"),
            Record::new("pkg")
                .typed("UMLPackage")
                .with("ownedElements", Value::OwnedList(vec!["d".into()])),
            owned("d", "UMLDeployment", "pkg").with_ref("source", "n").with_ref("target", "art"),
        ]);
        run(&mut t);
        let d = t.get(&"d".into()).expect("deployment kept");
        assert_eq!(d.id_of("source"), Some(&"art".into()));
        assert_eq!(PASSES.len(), 11);
        assert_eq!(PASSES[6].0, "restructure-interactions");
    }
}
