//! UML concept writers.
//!
//! The mirror of the reader side: a concept writer is a list of mixins
//! applied in order to one wire node, after the element mixin. The set of
//! target concepts is closed, so dispatch is an exhaustive `match` on
//! [`ElementKind`] instead of a registry.

mod behaviors;
mod classifiers;
mod kernel;

use tracing::trace;

use crate::model::{ElementKind, Record};
use crate::xml::WireNode;

use super::writer::{Writer, set_type};

/// Contribution of one metamodel supertype to a wire node.
pub(super) type Mixin = fn(&mut Writer<'_>, &Record, &mut WireNode);

/// A wire node of `wire_type` built by the element mixin and then
/// `mixins`, in order.
///
/// The type is set first so it sits next to the id; a mixin may still
/// replace it.
pub(super) fn concept(
    w: &mut Writer<'_>,
    record: &Record,
    mixins: &[Mixin],
    wire_type: &str,
) -> Option<WireNode> {
    let mut json = WireNode::with_attr("xmi:id", record.id.as_str());
    set_type(&mut json, wire_type);
    kernel::element(w, record, &mut json);
    for mixin in mixins {
        mixin(w, record, &mut json);
    }
    Some(json)
}

/// The wire node of a record, by its concept.
///
/// Abstract kinds and kinds with no wire form of their own yield nothing,
/// as do type tags outside the metamodel.
pub fn write(w: &mut Writer<'_>, record: &Record) -> Option<WireNode> {
    use ElementKind as K;

    let Some(kind) = ElementKind::from_name(&record.type_name) else {
        trace!(type_name = %record.type_name, id = %record.id, "no writer for type, skipping");
        return None;
    };

    match kind {
        K::Element
        | K::Model
        | K::ExtensibleModel
        | K::Relationship
        | K::DirectedRelationship
        | K::RelationshipEnd
        | K::UndirectedRelationship
        | K::UmlModelElement
        | K::UmlFeature
        | K::UmlStructuralFeature
        | K::UmlBehavioralFeature
        | K::UmlClassifier
        | K::UmlDirectedRelationship
        | K::UmlRelationshipEnd
        | K::UmlUndirectedRelationship
        | K::UmlInstance
        | K::UmlBehavior
        | K::UmlInteractionFragment
        | K::UmlMessageEndpoint
        | K::UmlVertex
        | K::UmlControlNode
        | K::UmlFinalNode => None,

        // Written as part of their owner, or not at all
        K::Tag
        | K::UmlMetaClass
        | K::UmlAssociationClassLink
        | K::UmlExtension
        | K::UmlLinkEnd
        | K::UmlEndpoint => None,

        // Kernel
        K::UmlPackage => concept(w, record, &[], "uml:Package"),
        K::UmlModel => concept(w, record, &[], "uml:Model"),
        K::UmlProfile => concept(w, record, &[], "uml:Profile"),
        K::UmlConstraint => kernel::write_constraint(w, record),
        K::UmlTemplateParameter => kernel::write_template_parameter(w, record),
        K::UmlAttribute => concept(w, record, kernel::PROPERTY, "uml:Property"),
        K::UmlParameter => concept(w, record, kernel::PARAMETER, "uml:Parameter"),
        K::UmlOperation => concept(w, record, kernel::OPERATION, "uml:Operation"),
        K::UmlDependency => concept(w, record, kernel::DEPENDENCY, "uml:Dependency"),
        K::UmlAbstraction => concept(w, record, kernel::DEPENDENCY, "uml:Abstraction"),
        K::UmlRealization => concept(w, record, kernel::DEPENDENCY, "uml:Realization"),
        K::UmlInterfaceRealization => kernel::write_interface_realization(w, record),
        K::UmlComponentRealization => kernel::write_component_realization(w, record),
        K::UmlGeneralization => kernel::write_generalization(w, record),
        K::UmlSlot => kernel::write_slot(w, record),
        K::UmlObject | K::UmlArtifactInstance | K::UmlComponentInstance | K::UmlNodeInstance => {
            kernel::write_instance(w, record)
        }
        K::UmlLink => kernel::write_link(w, record),

        // Classifiers
        K::UmlClass => classifiers::write_class(w, record),
        K::UmlStereotype => classifiers::write_stereotype(w, record),
        K::UmlDataType => concept(w, record, classifiers::CLASSIFIER, "uml:DataType"),
        K::UmlPrimitiveType => concept(w, record, classifiers::CLASSIFIER, "uml:PrimitiveType"),
        K::UmlEnumeration => classifiers::write_enumeration(w, record),
        K::UmlEnumerationLiteral => concept(w, record, &[], "uml:EnumerationLiteral"),
        K::UmlInterface => concept(w, record, classifiers::CLASSIFIER, "uml:Interface"),
        K::UmlSignal => concept(w, record, classifiers::CLASSIFIER, "uml:Signal"),
        K::UmlAssociation => classifiers::write_association(w, record, "uml:Association"),
        K::UmlCommunicationPath => {
            classifiers::write_association(w, record, "uml:CommunicationPath")
        }
        K::UmlAssociationEnd => classifiers::write_association_end(w, record),
        K::UmlPort => classifiers::write_port(w, record),
        K::UmlConnectorEnd => classifiers::write_connector_end(w, record),
        K::UmlConnector => classifiers::write_connector(w, record),
        K::UmlCollaboration => concept(w, record, classifiers::CLASSIFIER, "uml:Collaboration"),
        K::UmlCollaborationUse => classifiers::write_collaboration_use(w, record),
        K::UmlRoleBinding => classifiers::write_role_binding(w, record),
        K::UmlArtifact => classifiers::write_artifact(w, record),
        K::UmlComponent => classifiers::write_component(w, record),
        K::UmlSubsystem => classifiers::write_subsystem(w, record),
        K::UmlNode => classifiers::write_node(w, record),
        K::UmlDeployment => classifiers::write_deployment(w, record),
        K::UmlActor => concept(w, record, classifiers::CLASSIFIER, "uml:Actor"),
        K::UmlUseCase => classifiers::write_use_case(w, record),
        K::UmlExtensionPoint => concept(w, record, &[], "uml:ExtensionPoint"),
        K::UmlExtend => classifiers::write_extend(w, record),
        K::UmlInclude => classifiers::write_include(w, record),

        // Behaviors
        K::UmlOpaqueBehavior => behaviors::write_opaque_behavior(w, record),
        K::UmlEvent => behaviors::write_event(w, record),
        K::UmlInteraction => behaviors::write_interaction(w, record),
        K::UmlStateInvariant => behaviors::write_state_invariant(w, record),
        K::UmlContinuation => behaviors::write_continuation(w, record),
        K::UmlInteractionOperand => behaviors::write_interaction_operand(w, record),
        K::UmlCombinedFragment => behaviors::write_combined_fragment(w, record),
        K::UmlInteractionUse => behaviors::write_interaction_use(w, record),
        K::UmlLifeline => behaviors::write_lifeline(w, record),
        K::UmlGate => concept(w, record, &[], "uml:Gate"),
        K::UmlMessage => behaviors::write_message(w, record),
        K::UmlStateMachine => behaviors::write_state_machine(w, record),
        K::UmlRegion => behaviors::write_region(w, record),
        K::UmlPseudostate => behaviors::write_pseudostate(w, record),
        K::UmlConnectionPointReference => behaviors::write_connection_point_reference(w, record),
        K::UmlState => behaviors::write_state(w, record),
        K::UmlFinalState => concept(w, record, &[], "uml:FinalState"),
        K::UmlTransition => behaviors::write_transition(w, record),
        K::UmlActivity => behaviors::write_activity(w, record),
        K::UmlPin => concept(w, record, kernel::STRUCTURAL_FEATURE, "uml:Pin"),
        K::UmlInputPin => concept(w, record, kernel::STRUCTURAL_FEATURE, "uml:InputPin"),
        K::UmlOutputPin => concept(w, record, kernel::STRUCTURAL_FEATURE, "uml:OutputPin"),
        K::UmlActivityNode => concept(w, record, &[], "uml:ActivityNode"),
        K::UmlAction => behaviors::write_action(w, record),
        K::UmlObjectNode => behaviors::write_object_node(w, record),
        K::UmlInitialNode => concept(w, record, &[], "uml:InitialNode"),
        K::UmlActivityFinalNode => concept(w, record, &[], "uml:ActivityFinalNode"),
        K::UmlFlowFinalNode => concept(w, record, &[], "uml:FlowFinalNode"),
        K::UmlForkNode => concept(w, record, &[], "uml:ForkNode"),
        K::UmlJoinNode => concept(w, record, &[], "uml:JoinNode"),
        K::UmlMergeNode => concept(w, record, &[], "uml:MergeNode"),
        K::UmlDecisionNode => concept(w, record, &[], "uml:DecisionNode"),
        // No reader knows a bare group; groups are written as partitions
        K::UmlActivityGroup | K::UmlActivityPartition => {
            behaviors::write_activity_partition(w, record)
        }
        K::UmlActivityEdge | K::UmlControlFlow => {
            behaviors::write_activity_edge(w, record, "uml:ControlFlow")
        }
        K::UmlObjectFlow => behaviors::write_activity_edge(w, record, "uml:ObjectFlow"),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Repository, Value};
    use crate::options::XmiOptions;

    #[test]
    fn test_every_concrete_kind_except_embedded_has_a_writer() {
        let embedded = [
            ElementKind::Tag,
            ElementKind::UmlMetaClass,
            ElementKind::UmlAssociationClassLink,
            ElementKind::UmlExtension,
            ElementKind::UmlLinkEnd,
            ElementKind::UmlEndpoint,
        ];
        let mut repository = Repository::new();
        for kind in ElementKind::ALL {
            let record = Record::new(kind.name()).typed(kind.name()).with("name", "x");
            repository.add_root(record);
        }
        let options = XmiOptions::default();
        let mut writer = Writer::new(&repository, &options);
        for kind in ElementKind::ALL {
            let record = repository.get(&kind.name().into()).expect("record");
            let written = write(&mut writer, record).is_some();
            let expected = !kind.is_abstract() && !embedded.contains(kind);
            assert_eq!(written, expected, "{}", kind.name());
        }
    }

    #[test]
    fn test_unknown_type_writes_nothing() {
        let mut repository = Repository::new();
        let id = repository.add_root(
            Record::new("x").typed("OccurrenceSpecification").with("name", Value::from("o")),
        );
        let options = XmiOptions::default();
        let mut writer = Writer::new(&repository, &options);
        let record = repository.get(&id).expect("record");
        assert!(writer.write_node(record).is_none());
        assert_eq!(writer.written(), 0);
    }
}
