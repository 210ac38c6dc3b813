//! Behavior readers: events, actions, interactions, state machines and
//! activities.

use crate::model::{ElementId, Record, Value};
use crate::xml::XmlNode;

use crate::import::reader::{Read, Reader, read_boolean, read_ref, read_ref_array, read_string};
use crate::import::registry::ReaderRegistry;

use super::classifiers::CLASS;
use super::kernel::{STRUCTURAL_FEATURE, named, namespace, redefinable, typed};
use super::{Mixin, compose, concept, extension_value, read_text};

pub(super) fn register(registry: &mut ReaderRegistry) {
    register_common(registry);
    register_interactions(registry);
    register_state_machines(registry);
    register_activities(registry);
}

/// Compose a behavior: a class plus the behavior fields, then `mixins`.
fn behavior_concept(
    r: &mut Reader<'_>,
    node: &XmlNode,
    mixins: &[Mixin],
    type_name: &str,
) -> Option<Read> {
    let mut record = compose(r, node, CLASS);
    behavior(r, node, &mut record);
    for mixin in mixins {
        mixin(r, node, &mut record);
    }
    record.type_name = type_name.to_string();
    Some(Read::Record(record))
}

fn behavior(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isReentrant", read_boolean(node, "isReentrant", false));
    let parameters = r.read_element_array(node, "ownedParameter", Some("uml:Parameter"));
    record.set("parameters", Value::OwnedList(parameters));
}

/// An attribute holding an expression, or the text of a nested value
/// specification of the same name.
fn read_expression(r: &mut Reader<'_>, node: &XmlNode, name: &str) -> String {
    match node.attr(name) {
        Some(text) => text.to_string(),
        None => read_text(r, node, name),
    }
}

// ============================================================================
// COMMON BEHAVIORS
// ============================================================================

fn register_common(registry: &mut ReaderRegistry) {
    registry.register("uml:OpaqueBehavior", |r, n| {
        behavior_concept(r, n, &[], "UMLOpaqueBehavior")
    });

    registry.register("uml:Event", |r, n| read_event(r, n, "signal"));
    registry.register("uml:MessageEvent", |r, n| read_event(r, n, "signal"));
    registry.register("uml:SignalEvent", |r, n| read_event(r, n, "signal"));
    registry.register("uml:CallEvent", |r, n| read_event(r, n, "call"));
    registry.register("uml:ChangeEvent", |r, n| read_event(r, n, "change"));
    registry.register("uml:TimeEvent", |r, n| read_event(r, n, "time"));
    registry.register("uml:AnyReceiveEvent", |r, n| read_event(r, n, "anyReceive"));

    registry.register("uml:Action", |r, n| read_action(r, n, "opaque", None));
    registry.register("uml:OpaqueAction", |r, n| read_action(r, n, "opaque", None));
    registry.register("uml:BroadcastSignalAction", |r, n| read_action(r, n, "opaque", None));
    registry.register("uml:SendObjectAction", |r, n| read_action(r, n, "opaque", None));
    registry.register("uml:ClearStructuralFeatureAction", |r, n| {
        read_action(r, n, "opaque", None)
    });
    registry.register("uml:CallBehaviorAction", |r, n| {
        read_action(r, n, "callBehavior", Some("behavior"))
    });
    registry.register("uml:CallOperationAction", |r, n| {
        read_action(r, n, "callOperation", Some("operation"))
    });
    registry.register("uml:SendSignalAction", |r, n| {
        read_action(r, n, "sendSignal", Some("signal"))
    });
    registry.register("uml:CreateObjectAction", |r, n| {
        read_action(r, n, "create", Some("classifier"))
    });
    registry.register("uml:DestroyObjectAction", |r, n| {
        read_action(r, n, "destroy", Some("target"))
    });
    registry.register("uml:ReadStructuralFeatureAction", |r, n| {
        read_action(r, n, "read", Some("structuralFeature"))
    });
    for write in [
        "uml:WriteStructuralFeatureAction",
        "uml:AddStructuralFeatureAction",
        "uml:RemoveStructuralFeatureAction",
    ] {
        registry.register(write, |r, n| read_action(r, n, "write", Some("structuralFeature")));
    }
    registry.register("uml:AcceptEventAction", |r, n| read_action(r, n, "acceptEvent", None));
    registry.register("uml:StructuredActivityNode", |r, n| {
        read_action(r, n, "structured", None)
    });
}

/// Every wire event concept becomes one `UMLEvent` carrying its `kind`.
fn read_event(r: &mut Reader<'_>, node: &XmlNode, kind: &str) -> Option<Read> {
    let mut record = compose(r, node, &[named]);
    record.type_name = "UMLEvent".to_string();
    record.set("kind", kind);
    match kind {
        "signal" => record.set_ref("targetSignal", read_ref(node, "signal")),
        "call" => record.set_ref("targetOperation", read_ref(node, "operation")),
        "change" => {
            let expression = read_expression(r, node, "changeExpression");
            record.set("expression", expression);
        }
        "time" => {
            let expression = read_expression(r, node, "when");
            record.set("expression", expression);
        }
        _ => {}
    }
    Some(Read::Record(record))
}

const ACTION: &[Mixin] = &[named, action];

fn action(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isLocallyReentrant", read_boolean(node, "isLocallyReentrant", false));
    record.set("isSynchronous", read_boolean(node, "isSynchronous", false));
    record.set("language", read_string(node, "language", ""));
    record.set("body", read_string(node, "body", ""));

    let mut inputs = r.read_element_array(node, "argument", Some("uml:InputPin"));
    inputs.extend(r.read_element_array(node, "input", Some("uml:InputPin")));
    record.set("inputs", Value::OwnedList(inputs));
    let mut outputs = r.read_element_array(node, "result", Some("uml:OutputPin"));
    outputs.extend(r.read_element_array(node, "output", Some("uml:OutputPin")));
    record.set("outputs", Value::OwnedList(outputs));

    for (tag, field) in [
        ("localPrecondition", "localPreconditions"),
        ("localPostcondition", "localPostconditions"),
    ] {
        let conditions = r.read_element_array(node, tag, Some("uml:Constraint"));
        if !conditions.is_empty() {
            record.set(field, Value::OwnedList(conditions));
        }
    }
}

/// Every wire action concept becomes one `UMLAction`; `target_attr` names
/// the reference that becomes its `target`.
fn read_action(
    r: &mut Reader<'_>,
    node: &XmlNode,
    kind: &str,
    target_attr: Option<&str>,
) -> Option<Read> {
    let mut record = compose(r, node, ACTION);
    record.type_name = "UMLAction".to_string();
    record.set("kind", kind);
    if let Some(attr) = target_attr {
        record.set_ref("target", read_ref(node, attr));
    }
    Some(Read::Record(record))
}

// ============================================================================
// INTERACTIONS
// ============================================================================

fn register_interactions(registry: &mut ReaderRegistry) {
    registry.register("uml:Interaction", |r, n| {
        behavior_concept(r, n, &[interaction], "UMLInteraction")
    });
    registry.register("uml:Lifeline", |r, n| concept(r, n, LIFELINE, "UMLLifeline"));
    registry.register("uml:Gate", |r, n| concept(r, n, &[named], "UMLGate"));
    registry.register("uml:Message", |r, n| concept(r, n, MESSAGE, "UMLMessage"));

    registry.register("uml:OccurrenceSpecification", |r, n| {
        concept(r, n, OCCURRENCE, "OccurrenceSpecification")
    });
    registry.register("uml:ExecutionSpecification", |r, n| {
        concept(r, n, &[named], "ExecutionSpecification")
    });
    registry.register("uml:CombinedFragment", |r, n| {
        concept(r, n, COMBINED_FRAGMENT, "UMLCombinedFragment")
    });
    registry.register("uml:InteractionOperand", |r, n| {
        concept(r, n, INTERACTION_OPERAND, "UMLInteractionOperand")
    });
    registry.register("uml:InteractionUse", |r, n| {
        concept(r, n, INTERACTION_USE, "UMLInteractionUse")
    });
    registry.register("uml:Continuation", |r, n| concept(r, n, CONTINUATION, "UMLContinuation"));
    registry.register("uml:StateInvariant", |r, n| {
        concept(r, n, STATE_INVARIANT, "UMLStateInvariant")
    });
}

const LIFELINE: &[Mixin] = &[named, lifeline];
const MESSAGE: &[Mixin] = &[named, message];
const OCCURRENCE: &[Mixin] = &[named, occurrence_specification];
const COMBINED_FRAGMENT: &[Mixin] = &[named, combined_fragment];
const INTERACTION_OPERAND: &[Mixin] = &[named, interaction_operand];
const INTERACTION_USE: &[Mixin] = &[named, interaction_use];
const CONTINUATION: &[Mixin] = &[named, continuation];
const STATE_INVARIANT: &[Mixin] = &[named, state_invariant];

/// Lifelines and formal gates both become participants.
fn interaction(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let lifelines = r.read_element_array(node, "lifeline", Some("uml:Lifeline"));
    record.append_to("participants", lifelines);
    let gates = r.read_element_array(node, "formalGate", Some("uml:Gate"));
    record.append_to("participants", gates);
    let fragments = r.read_element_array(node, "fragment", None);
    record.set("fragments", Value::OwnedList(fragments));
    let messages = r.read_element_array(node, "message", Some("uml:Message"));
    record.set("messages", Value::OwnedList(messages));
}

fn lifeline(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("selector", read_text(r, node, "selector"));
    record.set_ref("represent", read_ref(node, "represents"));
}

/// `sendEvent`/`receiveEvent` only live until the interaction pass turns
/// them into `source`/`target`.
fn message(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let sort = r.read_enum(node, "messageSort", "uml:MessageSort", Some("synchCall"));
    record.set("messageSort", sort.unwrap_or_default());
    record.set_ref("sendEvent", read_ref(node, "sendEvent"));
    record.set_ref("receiveEvent", read_ref(node, "receiveEvent"));
    record.set_ref("connector", read_ref(node, "connector"));
    let signature = read_ref(node, "signature").or_else(|| signature_from_action(r, node));
    record.set_ref("signature", signature);
    record.set("arguments", read_text(r, node, "argument"));
    if let Some(target) = extension_value(r, node, "assignmentTarget") {
        record.set("assignmentTarget", target);
    }
}

/// Some tools nest a call-operation or send-signal action as the message
/// signature; its target is the signature. The action itself is not kept.
fn signature_from_action(r: &mut Reader<'_>, node: &XmlNode) -> Option<ElementId> {
    let child = node.child("signature")?;
    let type_name = child.attr("xmi:type")?;
    match r.dispatch(child, type_name)? {
        Read::Record(action) if matches!(action.str("kind"), "callOperation" | "sendSignal") => {
            action.id_of("target").cloned()
        }
        _ => None,
    }
}

/// `covered` may list several lifelines; the first is the one the message
/// attaches to.
fn occurrence_specification(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let covered = read_ref_array(node, "covered").into_iter().next();
    record.set_ref("covered", covered);
}

fn combined_fragment(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let operator = r.read_enum(
        node,
        "interactionOperator",
        "uml:InteractionOperatorKind",
        Some("seq"),
    );
    record.set("interactionOperator", operator.unwrap_or_default());
    // Visual Paradigm writes operands as ownedMember
    let mut operands = r.read_element_array(node, "ownedMember", Some("uml:InteractionOperand"));
    operands.extend(r.read_element_array(node, "operand", Some("uml:InteractionOperand")));
    record.set("operands", Value::OwnedList(operands));
}

/// Formal gates under an operand are kept aside for the gate promotion pass.
fn interaction_operand(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let guard = r.read_constraint_text(node, "guard").unwrap_or_default();
    record.set("guard", guard);
    let gates = r.read_element_array(node, "formalGate", Some("uml:Gate"));
    if !gates.is_empty() {
        record.set("_formalGates", Value::OwnedList(gates));
    }
}

fn interaction_use(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("refersTo", read_ref(node, "refersTo"));
}

fn continuation(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("setting", read_boolean(node, "setting", true));
}

fn state_invariant(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    occurrence_specification(r, node, record);
    let invariant = r.read_constraint_text(node, "invariant").unwrap_or_default();
    record.set("invariant", invariant);
}

// ============================================================================
// STATE MACHINES
// ============================================================================

fn register_state_machines(registry: &mut ReaderRegistry) {
    registry.register("uml:StateMachine", |r, n| {
        behavior_concept(r, n, &[state_machine], "UMLStateMachine")
    });
    registry.register("uml:Region", |r, n| concept(r, n, REGION, "UMLRegion"));
    registry.register("uml:Pseudostate", |r, n| concept(r, n, PSEUDOSTATE, "UMLPseudostate"));
    registry.register("uml:ConnectionPointReference", |r, n| {
        concept(r, n, CONNECTION_POINT_REFERENCE, "UMLConnectionPointReference")
    });
    registry.register("uml:State", |r, n| concept(r, n, STATE, "UMLState"));
    registry.register("uml:FinalState", |r, n| concept(r, n, STATE, "UMLFinalState"));
    registry.register("uml:Transition", |r, n| concept(r, n, TRANSITION, "UMLTransition"));
}

const REGION: &[Mixin] = &[named, region];
const PSEUDOSTATE: &[Mixin] = &[named, pseudostate];
const CONNECTION_POINT_REFERENCE: &[Mixin] = &[named, connection_point_reference];
const STATE: &[Mixin] = &[named, namespace, state];
const TRANSITION: &[Mixin] = &[named, namespace, transition];

fn state_machine(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let regions = r.read_element_array(node, "region", Some("uml:Region"));
    record.set("regions", Value::OwnedList(regions));
}

/// Vertices come from `subvertex`, `vertex` and `ownedMember`, whichever
/// the writing tool used.
fn region(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let mut vertices = Vec::new();
    for tag in ["vertex", "ownedMember", "subvertex"] {
        vertices.extend(r.read_element_array(node, tag, None));
    }
    record.set("vertices", Value::OwnedList(vertices));
    let transitions = r.read_element_array(node, "transition", Some("uml:Transition"));
    record.set("transitions", Value::OwnedList(transitions));
}

fn pseudostate(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let kind = r.read_enum(node, "kind", "uml:PseudostateKind", Some("initial"));
    record.set("kind", kind.unwrap_or_default());
}

fn connection_point_reference(_: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("entry", Value::References(read_ref_array(node, "entry")));
    record.set("exit", Value::References(read_ref_array(node, "exit")));
}

fn state(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let regions = r.read_element_array(node, "region", Some("uml:Region"));
    record.set("regions", Value::OwnedList(regions));
    for (tag, field) in [
        ("entry", "entryActivities"),
        ("doActivity", "doActivities"),
        ("exit", "exitActivities"),
    ] {
        let activities = r.read_element_array(node, tag, Some("uml:OpaqueBehavior"));
        record.set(field, Value::OwnedList(activities));
    }
    record.set_ref("submachine", read_ref(node, "submachine"));
    let connections = r.read_element_array(
        node,
        "connection",
        Some("uml:ConnectionPointReference"),
    );
    record.set("connections", Value::OwnedList(connections));
}

/// Triggers reference events the transition owns as members; those events
/// move from `ownedElements` to `triggers`. A trigger whose event is not
/// owned here becomes a fresh event named after the trigger.
fn transition(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    let kind = r.read_enum(node, "kind", "uml:TransitionKind", Some("internal"));
    record.set("kind", kind.unwrap_or_default());
    record.set_ref("source", read_ref(node, "source"));
    record.set_ref("target", read_ref(node, "target"));
    let guard = r.read_constraint_text(node, "guard").unwrap_or_default();
    record.set("guard", guard);

    let mut triggers = Vec::new();
    for trigger in node.children_named("trigger") {
        let event = match read_ref(trigger, "event") {
            Some(id) if record.remove_from("ownedElements", &id) => id,
            _ => {
                let event = Record::new(r.id_of(trigger))
                    .typed("UMLEvent")
                    .with("name", read_string(trigger, "name", ""))
                    .with("visibility", "public")
                    .with("kind", "signal");
                r.adopt(event, &record.id)
            }
        };
        triggers.push(event);
    }
    record.set("triggers", Value::OwnedList(triggers));

    let effects = r.read_element_array(node, "effect", Some("uml:OpaqueBehavior"));
    record.set("effects", Value::OwnedList(effects));
}

// ============================================================================
// ACTIVITIES
// ============================================================================

fn register_activities(registry: &mut ReaderRegistry) {
    registry.register("uml:Activity", |r, n| behavior_concept(r, n, &[activity], "UMLActivity"));

    registry.register("uml:Pin", |r, n| concept(r, n, STRUCTURAL_FEATURE, "UMLPin"));
    registry.register("uml:InputPin", |r, n| concept(r, n, STRUCTURAL_FEATURE, "UMLInputPin"));
    registry.register("uml:OutputPin", |r, n| concept(r, n, STRUCTURAL_FEATURE, "UMLOutputPin"));

    registry.register("uml:ActivityNode", |r, n| concept(r, n, &[named], "UMLActivityNode"));
    for object_node in [
        "uml:ObjectNode",
        "uml:CentralBufferNode",
        "uml:DataStoreNode",
        "uml:ActivityParameterNode",
    ] {
        registry.register(object_node, |r, n| concept(r, n, OBJECT_NODE, "UMLObjectNode"));
    }
    registry.register("uml:InitialNode", |r, n| concept(r, n, &[named], "UMLInitialNode"));
    registry.register("uml:ActivityFinalNode", |r, n| {
        concept(r, n, &[named], "UMLActivityFinalNode")
    });
    registry.register("uml:FlowFinalNode", |r, n| concept(r, n, &[named], "UMLFlowFinalNode"));
    registry.register("uml:ForkNode", |r, n| concept(r, n, &[named], "UMLForkNode"));
    registry.register("uml:JoinNode", |r, n| concept(r, n, &[named], "UMLJoinNode"));
    registry.register("uml:MergeNode", |r, n| concept(r, n, &[named], "UMLMergeNode"));
    registry.register("uml:DecisionNode", |r, n| concept(r, n, &[named], "UMLDecisionNode"));

    registry.register("uml:ActivityPartition", |r, n| {
        concept(r, n, ACTIVITY_PARTITION, "UMLActivityPartition")
    });
    registry.register("uml:ControlFlow", |r, n| concept(r, n, ACTIVITY_EDGE, "UMLControlFlow"));
    registry.register("uml:ObjectFlow", |r, n| concept(r, n, ACTIVITY_EDGE, "UMLObjectFlow"));
}

const OBJECT_NODE: &[Mixin] = &[named, typed, object_node];
const ACTIVITY_PARTITION: &[Mixin] = &[named, activity_partition];
const ACTIVITY_EDGE: &[Mixin] = &[named, redefinable, activity_edge];

/// Partitions may sit under `group` or, in older files, `partition`.
fn activity(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isReadOnly", read_boolean(node, "isReadOnly", false));
    record.set("isSingleExecution", read_boolean(node, "isSingleExecution", false));
    let nodes = r.read_element_array(node, "node", None);
    record.set("nodes", Value::OwnedList(nodes));
    let edges = r.read_element_array(node, "edge", None);
    record.set("edges", Value::OwnedList(edges));
    let mut groups = r.read_element_array(node, "group", None);
    groups.extend(r.read_element_array(node, "partition", Some("uml:ActivityPartition")));
    record.set("groups", Value::OwnedList(groups));
}

fn object_node(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("isControlType", read_boolean(node, "isControlType", false));
    let ordering = r.read_enum(node, "ordering", "uml:ObjectNodeOrderingKind", Some("FIFO"));
    record.set("ordering", ordering.unwrap_or_default());
}

fn activity_partition(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set("nodes", Value::References(read_ref_array(node, "node")));
    record.set("edges", Value::References(read_ref_array(node, "edge")));
    let subgroups = r.read_element_array(node, "subpartition", Some("uml:ActivityPartition"));
    record.set("subgroups", Value::OwnedList(subgroups));
}

fn activity_edge(r: &mut Reader<'_>, node: &XmlNode, record: &mut Record) {
    record.set_ref("source", read_ref(node, "source"));
    record.set_ref("target", read_ref(node, "target"));
    record.set("guard", read_text(r, node, "guard"));
    record.set("weight", read_text(r, node, "weight"));
}
