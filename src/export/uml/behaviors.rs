//! Behavior writers: events and actions, interactions, state machines and
//! activities.

use crate::model::metamodel::literals;
use crate::model::{ElementId, Record};
use crate::xml::WireNode;

use crate::export::writer::{
    Writer, set_type, write_boolean, write_constraint, write_enum, write_ref, write_ref_array,
    write_string, write_value_spec,
};
use super::classifiers::classifier;
use super::{Mixin, concept};

/// Behaviors carry classifier features on the wire.
const BEHAVIOR: &[Mixin] = &[classifier, behavior];
const STATE_MACHINE: &[Mixin] = &[classifier, behavior, state_machine];
const ACTIVITY: &[Mixin] = &[classifier, behavior, activity];
const INTERACTION: &[Mixin] = &[classifier, behavior, interaction];

fn behavior(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isReentrant", record.bool("isReentrant"));
    w.write_owned(json, "ownedParameter", record, "parameters");
}

pub(super) fn write_opaque_behavior(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, BEHAVIOR, "uml:OpaqueBehavior")
}

// ============================================================================
// EVENTS AND ACTIONS
// ============================================================================

/// Wire concept per event kind; unknown kinds are written as signal events.
fn event_concept(kind: &str) -> &'static str {
    match kind {
        "call" => "uml:CallEvent",
        "change" => "uml:ChangeEvent",
        "time" => "uml:TimeEvent",
        "anyReceive" => "uml:AnyReceiveEvent",
        _ => "uml:SignalEvent",
    }
}

pub(super) fn write_event(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], event_concept(record.str("kind")))?;
    match record.str("kind") {
        "call" => write_ref(&mut json, "operation", record.id_of("targetOperation")),
        "change" => write_value_spec(
            &mut json,
            "changeExpression",
            "uml:OpaqueExpression",
            record.str("expression"),
        ),
        "time" => write_value_spec(
            &mut json,
            "when",
            "uml:OpaqueExpression",
            record.str("expression"),
        ),
        "anyReceive" => {}
        _ => write_ref(&mut json, "signal", record.id_of("targetSignal")),
    }
    Some(json)
}

/// Wire concept and target attribute per action kind.
const ACTION_CONCEPTS: &[(&str, &str, Option<&str>)] = &[
    ("opaque", "uml:OpaqueAction", None),
    ("callBehavior", "uml:CallBehaviorAction", Some("behavior")),
    ("callOperation", "uml:CallOperationAction", Some("operation")),
    ("sendSignal", "uml:SendSignalAction", Some("signal")),
    ("create", "uml:CreateObjectAction", Some("classifier")),
    ("destroy", "uml:DestroyObjectAction", Some("target")),
    ("read", "uml:ReadStructuralFeatureAction", Some("structuralFeature")),
    ("write", "uml:WriteStructuralFeatureAction", Some("structuralFeature")),
    ("acceptEvent", "uml:AcceptEventAction", None),
    ("structured", "uml:StructuredActivityNode", None),
];

fn action(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    w.write_owned(json, "input", record, "inputs");
    w.write_owned(json, "output", record, "outputs");
    write_boolean(json, "isLocallyReentrant", record.bool("isLocallyReentrant"));
    write_boolean(json, "isSynchronous", record.bool("isSynchronous"));
    write_string(json, "language", record.str("language"));
    write_string(json, "body", record.str("body"));
    w.write_owned(json, "localPrecondition", record, "localPreconditions");
    w.write_owned(json, "localPostcondition", record, "localPostconditions");
}

pub(super) fn write_action(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let (wire_type, target) = ACTION_CONCEPTS
        .iter()
        .find(|(kind, _, _)| *kind == record.str("kind"))
        .map(|(_, wire_type, target)| (*wire_type, *target))
        .unwrap_or(("uml:OpaqueAction", None));
    let mut json = concept(w, record, &[action], wire_type)?;
    if let Some(attr) = target {
        write_ref(&mut json, attr, record.id_of("target"));
    }
    Some(json)
}

// ============================================================================
// INTERACTIONS
// ============================================================================

fn is_endpoint(record: Option<&Record>) -> bool {
    record.is_some_and(|r| r.type_name == "UMLEndpoint")
}

/// An occurrence specification with a fresh id on `covered`.
fn occurrence(covered: Option<&ElementId>) -> WireNode {
    let mut node = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    set_type(&mut node, "uml:OccurrenceSpecification");
    write_ref(&mut node, "covered", covered);
    node
}

/// Lifelines and gates by kind, then each message with the occurrence
/// specifications that anchor its ends, then the fragments.
///
/// A message from an endpoint (found) gets only a receive event, one to an
/// endpoint (lost) only a send event.
fn interaction(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    let repository = w.repository();
    for participant in repository.children(record, "participants") {
        match participant.type_name.as_str() {
            "UMLLifeline" => {
                w.write_element(json, "lifeline", participant);
            }
            "UMLGate" => {
                w.write_element(json, "formalGate", participant);
            }
            _ => {}
        }
    }

    for message in repository.children(record, "messages") {
        let Some(mut node) = w.write_node(message) else {
            continue;
        };
        let source = repository.resolve(message, "source");
        let target = repository.resolve(message, "target");
        let (send, receive) = match (is_endpoint(source), is_endpoint(target)) {
            (true, _) => (false, true),
            (_, true) => (true, false),
            _ => (true, true),
        };
        let ends = [
            (send, "sendEvent", message.id_of("source")),
            (receive, "receiveEvent", message.id_of("target")),
        ];
        for (present, attr, covered) in ends {
            if present {
                let occurrence = occurrence(covered);
                if let Some(id) = occurrence.attr("xmi:id") {
                    node.set_attr(attr, id);
                }
                json.add_child("fragment", occurrence);
            }
        }
        json.add_child("message", node);
    }

    w.write_owned(json, "fragment", record, "fragments");
}

pub(super) fn write_interaction(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, INTERACTION, "uml:Interaction")
}

pub(super) fn write_lifeline(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Lifeline")?;
    write_value_spec(&mut json, "selector", "uml:LiteralString", record.str("selector"));
    write_ref(&mut json, "represents", record.id_of("represent"));
    Some(json)
}

pub(super) fn write_message(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Message")?;
    write_enum(&mut json, "messageSort", record.str("messageSort"), literals::MESSAGE_SORT);
    let repository = w.repository();
    let kind = if is_endpoint(repository.resolve(record, "source")) {
        "found"
    } else if is_endpoint(repository.resolve(record, "target")) {
        "lost"
    } else {
        "complete"
    };
    json.set_attr("messageKind", kind);
    write_ref(&mut json, "signature", record.id_of("signature"));
    write_ref(&mut json, "connector", record.id_of("connector"));
    write_value_spec(&mut json, "argument", "uml:LiteralString", record.str("arguments"));
    let assignment = record.str("assignmentTarget");
    if !assignment.is_empty() {
        w.write_extension(&mut json, "assignmentTarget", assignment);
    }
    Some(json)
}

pub(super) fn write_state_invariant(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:StateInvariant")?;
    write_ref(&mut json, "covered", record.id_of("covered"));
    write_constraint(&mut json, "invariant", record.str("invariant"));
    Some(json)
}

pub(super) fn write_continuation(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Continuation")?;
    write_boolean(&mut json, "setting", record.bool("setting"));
    Some(json)
}

pub(super) fn write_interaction_operand(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:InteractionOperand")?;
    write_constraint(&mut json, "guard", record.str("guard"));
    Some(json)
}

pub(super) fn write_combined_fragment(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:CombinedFragment")?;
    write_enum(
        &mut json,
        "interactionOperator",
        record.str("interactionOperator"),
        literals::INTERACTION_OPERATOR,
    );
    w.write_owned(&mut json, "operand", record, "operands");
    Some(json)
}

pub(super) fn write_interaction_use(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:InteractionUse")?;
    write_ref(&mut json, "refersTo", record.id_of("refersTo"));
    Some(json)
}

// ============================================================================
// STATE MACHINES
// ============================================================================

fn state_machine(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    w.write_owned(json, "region", record, "regions");
}

pub(super) fn write_state_machine(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, STATE_MACHINE, "uml:StateMachine")
}

pub(super) fn write_region(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Region")?;
    w.write_owned(&mut json, "subvertex", record, "vertices");
    w.write_owned(&mut json, "transition", record, "transitions");
    Some(json)
}

pub(super) fn write_pseudostate(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Pseudostate")?;
    write_enum(&mut json, "kind", record.str("kind"), literals::PSEUDOSTATE);
    Some(json)
}

pub(super) fn write_connection_point_reference(
    w: &mut Writer<'_>,
    record: &Record,
) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:ConnectionPointReference")?;
    write_ref_array(&mut json, "entry", record.ids("entry"));
    write_ref_array(&mut json, "exit", record.ids("exit"));
    Some(json)
}

pub(super) fn write_state(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:State")?;
    w.write_owned(&mut json, "region", record, "regions");
    for (field, name) in [
        ("entryActivities", "entry"),
        ("doActivities", "doActivity"),
        ("exitActivities", "exit"),
    ] {
        w.write_owned(&mut json, name, record, field);
    }
    write_ref(&mut json, "submachine", record.id_of("submachine"));
    w.write_owned(&mut json, "connection", record, "connections");
    Some(json)
}

/// Each trigger event is written as a member of the transition, with a
/// `uml:Trigger` pointing at it.
pub(super) fn write_transition(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:Transition")?;
    write_ref(&mut json, "source", record.id_of("source"));
    write_ref(&mut json, "target", record.id_of("target"));
    write_enum(&mut json, "kind", record.str("kind"), literals::TRANSITION);
    write_constraint(&mut json, "guard", record.str("guard"));

    let repository = w.repository();
    for event in repository.children(record, "triggers") {
        if !w.write_element(&mut json, "ownedMember", event) {
            continue;
        }
        let mut trigger = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
        set_type(&mut trigger, "uml:Trigger");
        write_string(&mut trigger, "name", event.str("name"));
        trigger.set_attr("event", event.id.as_str());
        json.add_child("trigger", trigger);
    }
    w.write_owned(&mut json, "effect", record, "effects");
    Some(json)
}

// ============================================================================
// ACTIVITIES
// ============================================================================

fn activity(w: &mut Writer<'_>, record: &Record, json: &mut WireNode) {
    write_boolean(json, "isReadOnly", record.bool("isReadOnly"));
    write_boolean(json, "isSingleExecution", record.bool("isSingleExecution"));
    w.write_owned(json, "group", record, "groups");
    w.write_owned(json, "node", record, "nodes");
    w.write_owned(json, "edge", record, "edges");
}

pub(super) fn write_activity(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    concept(w, record, ACTIVITY, "uml:Activity")
}

pub(super) fn write_object_node(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:ObjectNode")?;
    w.write_type(&mut json, "type", record.get("type"));
    write_boolean(&mut json, "isControlType", record.bool("isControlType"));
    write_enum(&mut json, "ordering", record.str("ordering"), literals::OBJECT_NODE_ORDERING);
    Some(json)
}

/// Partitions reference their nodes and edges; nested partitions are
/// owned.
pub(super) fn write_activity_partition(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    let mut json = concept(w, record, &[], "uml:ActivityPartition")?;
    write_ref_array(&mut json, "node", record.ids("nodes"));
    write_ref_array(&mut json, "edge", record.ids("edges"));
    w.write_owned(&mut json, "subpartition", record, "subgroups");
    Some(json)
}

pub(super) fn write_activity_edge(
    w: &mut Writer<'_>,
    record: &Record,
    wire_type: &str,
) -> Option<WireNode> {
    let mut json = concept(w, record, &[], wire_type)?;
    write_ref(&mut json, "source", record.id_of("source"));
    write_ref(&mut json, "target", record.id_of("target"));
    write_value_spec(&mut json, "guard", "uml:LiteralString", record.str("guard"));
    let weight = record.str("weight");
    let weight_type = if weight.parse::<i64>().is_ok() {
        "uml:LiteralInteger"
    } else {
        "uml:LiteralString"
    };
    write_value_spec(&mut json, "weight", weight_type, weight);
    Some(json)
}
