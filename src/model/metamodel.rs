//! Target metamodel: concept names, supertypes and the `kind-of` predicate.
//!
//! The reader produces records tagged with these names and the writer
//! dispatches on them. Everything else about the concepts (fields, defaults)
//! lives in the mapping functions.

macro_rules! element_kinds {
    (@parent Root) => { None };
    (@parent $parent:ident) => { Some(ElementKind::$parent) };
    (@abstract abstract) => { true };
    (@abstract) => { false };
    ($( $variant:ident => $name:literal : $parent:ident $(, $abs:tt)? ;)*) => {
        /// A concept of the target object model.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ElementKind {
            $($variant,)*
        }

        impl ElementKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ElementKind] = &[$(ElementKind::$variant,)*];

            /// The type tag used in `_type`.
            pub fn name(self) -> &'static str {
                match self {
                    $(ElementKind::$variant => $name,)*
                }
            }

            /// Look up a kind by its type tag.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ElementKind::$variant),)*
                    _ => None,
                }
            }

            /// Direct supertype; `None` only for `Element`.
            pub fn parent(self) -> Option<Self> {
                match self {
                    $(ElementKind::$variant => element_kinds!(@parent $parent),)*
                }
            }

            /// Abstract kinds never appear as `_type` of a finished record.
            pub fn is_abstract(self) -> bool {
                match self {
                    $(ElementKind::$variant => element_kinds!(@abstract $($abs)?),)*
                }
            }
        }
    };
}

element_kinds! {
    Element => "Element" : Root, abstract;
    Tag => "Tag" : Element;
    Model => "Model" : Element, abstract;
    ExtensibleModel => "ExtensibleModel" : Model, abstract;
    Relationship => "Relationship" : ExtensibleModel, abstract;
    DirectedRelationship => "DirectedRelationship" : Relationship, abstract;
    RelationshipEnd => "RelationshipEnd" : ExtensibleModel, abstract;
    UndirectedRelationship => "UndirectedRelationship" : Relationship, abstract;

    // Kernel
    UmlModelElement => "UMLModelElement" : ExtensibleModel, abstract;
    UmlConstraint => "UMLConstraint" : UmlModelElement;
    UmlTemplateParameter => "UMLTemplateParameter" : UmlModelElement;
    UmlFeature => "UMLFeature" : UmlModelElement, abstract;
    UmlStructuralFeature => "UMLStructuralFeature" : UmlFeature, abstract;
    UmlAttribute => "UMLAttribute" : UmlStructuralFeature;
    UmlParameter => "UMLParameter" : UmlStructuralFeature;
    UmlBehavioralFeature => "UMLBehavioralFeature" : UmlFeature, abstract;
    UmlOperation => "UMLOperation" : UmlBehavioralFeature;
    UmlClassifier => "UMLClassifier" : UmlModelElement, abstract;
    UmlDirectedRelationship => "UMLDirectedRelationship" : DirectedRelationship, abstract;
    UmlRelationshipEnd => "UMLRelationshipEnd" : RelationshipEnd, abstract;
    UmlUndirectedRelationship => "UMLUndirectedRelationship" : UndirectedRelationship, abstract;
    UmlMetaClass => "UMLMetaClass" : UmlModelElement;

    // Packages and classifiers
    UmlPackage => "UMLPackage" : UmlModelElement;
    UmlModel => "UMLModel" : UmlPackage;
    UmlProfile => "UMLProfile" : UmlPackage;
    UmlClass => "UMLClass" : UmlClassifier;
    UmlStereotype => "UMLStereotype" : UmlClass;
    UmlDataType => "UMLDataType" : UmlClassifier;
    UmlPrimitiveType => "UMLPrimitiveType" : UmlDataType;
    UmlEnumeration => "UMLEnumeration" : UmlDataType;
    UmlEnumerationLiteral => "UMLEnumerationLiteral" : UmlModelElement;
    UmlInterface => "UMLInterface" : UmlClassifier;
    UmlSignal => "UMLSignal" : UmlClassifier;

    // Relationships
    UmlDependency => "UMLDependency" : UmlDirectedRelationship;
    UmlAbstraction => "UMLAbstraction" : UmlDependency;
    UmlRealization => "UMLRealization" : UmlAbstraction;
    UmlInterfaceRealization => "UMLInterfaceRealization" : UmlRealization;
    UmlComponentRealization => "UMLComponentRealization" : UmlRealization;
    UmlGeneralization => "UMLGeneralization" : UmlDirectedRelationship;
    UmlAssociationEnd => "UMLAssociationEnd" : UmlRelationshipEnd;
    UmlAssociation => "UMLAssociation" : UmlUndirectedRelationship;
    UmlAssociationClassLink => "UMLAssociationClassLink" : UmlModelElement;
    UmlExtension => "UMLExtension" : UmlDirectedRelationship;

    // Instances
    UmlSlot => "UMLSlot" : UmlModelElement;
    UmlInstance => "UMLInstance" : UmlModelElement, abstract;
    UmlObject => "UMLObject" : UmlInstance;
    UmlArtifactInstance => "UMLArtifactInstance" : UmlInstance;
    UmlComponentInstance => "UMLComponentInstance" : UmlInstance;
    UmlNodeInstance => "UMLNodeInstance" : UmlInstance;
    UmlLinkEnd => "UMLLinkEnd" : UmlRelationshipEnd;
    UmlLink => "UMLLink" : UmlUndirectedRelationship;

    // Composite structure
    UmlPort => "UMLPort" : UmlAttribute;
    UmlConnectorEnd => "UMLConnectorEnd" : UmlRelationshipEnd;
    UmlConnector => "UMLConnector" : UmlUndirectedRelationship;
    UmlCollaboration => "UMLCollaboration" : UmlClassifier;
    UmlCollaborationUse => "UMLCollaborationUse" : UmlModelElement;
    UmlRoleBinding => "UMLRoleBinding" : UmlDependency;

    // Components and deployments
    UmlArtifact => "UMLArtifact" : UmlClassifier;
    UmlComponent => "UMLComponent" : UmlClassifier;
    UmlSubsystem => "UMLSubsystem" : UmlComponent;
    UmlNode => "UMLNode" : UmlClassifier;
    UmlCommunicationPath => "UMLCommunicationPath" : UmlAssociation;
    UmlDeployment => "UMLDeployment" : UmlDependency;

    // Use cases
    UmlActor => "UMLActor" : UmlClassifier;
    UmlUseCase => "UMLUseCase" : UmlClassifier;
    UmlExtensionPoint => "UMLExtensionPoint" : UmlModelElement;
    UmlExtend => "UMLExtend" : UmlDependency;
    UmlInclude => "UMLInclude" : UmlDependency;

    // Common behaviors
    UmlBehavior => "UMLBehavior" : UmlModelElement, abstract;
    UmlOpaqueBehavior => "UMLOpaqueBehavior" : UmlBehavior;
    UmlEvent => "UMLEvent" : UmlModelElement;

    // Interactions
    UmlInteractionFragment => "UMLInteractionFragment" : UmlBehavior, abstract;
    UmlInteraction => "UMLInteraction" : UmlInteractionFragment;
    UmlStateInvariant => "UMLStateInvariant" : UmlInteractionFragment;
    UmlContinuation => "UMLContinuation" : UmlInteractionFragment;
    UmlInteractionOperand => "UMLInteractionOperand" : UmlInteractionFragment;
    UmlCombinedFragment => "UMLCombinedFragment" : UmlInteractionFragment;
    UmlInteractionUse => "UMLInteractionUse" : UmlInteractionFragment;
    UmlMessageEndpoint => "UMLMessageEndpoint" : UmlModelElement, abstract;
    UmlLifeline => "UMLLifeline" : UmlMessageEndpoint;
    UmlGate => "UMLGate" : UmlMessageEndpoint;
    UmlEndpoint => "UMLEndpoint" : UmlMessageEndpoint;
    UmlMessage => "UMLMessage" : UmlDirectedRelationship;

    // State machines
    UmlStateMachine => "UMLStateMachine" : UmlBehavior;
    UmlRegion => "UMLRegion" : UmlModelElement;
    UmlVertex => "UMLVertex" : UmlModelElement, abstract;
    UmlPseudostate => "UMLPseudostate" : UmlVertex;
    UmlConnectionPointReference => "UMLConnectionPointReference" : UmlVertex;
    UmlState => "UMLState" : UmlVertex;
    UmlFinalState => "UMLFinalState" : UmlState;
    UmlTransition => "UMLTransition" : UmlDirectedRelationship;

    // Activities
    UmlActivity => "UMLActivity" : UmlBehavior;
    UmlPin => "UMLPin" : UmlStructuralFeature;
    UmlInputPin => "UMLInputPin" : UmlPin;
    UmlOutputPin => "UMLOutputPin" : UmlPin;
    UmlActivityNode => "UMLActivityNode" : UmlModelElement;
    UmlAction => "UMLAction" : UmlActivityNode;
    UmlObjectNode => "UMLObjectNode" : UmlActivityNode;
    UmlControlNode => "UMLControlNode" : UmlActivityNode, abstract;
    UmlInitialNode => "UMLInitialNode" : UmlControlNode;
    UmlFinalNode => "UMLFinalNode" : UmlControlNode, abstract;
    UmlActivityFinalNode => "UMLActivityFinalNode" : UmlFinalNode;
    UmlFlowFinalNode => "UMLFlowFinalNode" : UmlFinalNode;
    UmlForkNode => "UMLForkNode" : UmlControlNode;
    UmlJoinNode => "UMLJoinNode" : UmlControlNode;
    UmlMergeNode => "UMLMergeNode" : UmlControlNode;
    UmlDecisionNode => "UMLDecisionNode" : UmlControlNode;
    UmlActivityGroup => "UMLActivityGroup" : UmlModelElement;
    UmlActivityPartition => "UMLActivityPartition" : UmlActivityGroup;
    UmlActivityEdge => "UMLActivityEdge" : UmlDirectedRelationship;
    UmlControlFlow => "UMLControlFlow" : UmlActivityEdge;
    UmlObjectFlow => "UMLObjectFlow" : UmlActivityEdge;
}

impl ElementKind {
    /// True if `self` is `ancestor` or inherits from it.
    pub fn is_kind_of(self, ancestor: ElementKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

/// `kind-of` over a type tag. Unknown tags (including wire intermediates
/// such as `OccurrenceSpecification`) are never a kind of anything.
pub fn is_kind_of(type_name: &str, ancestor: ElementKind) -> bool {
    ElementKind::from_name(type_name).is_some_and(|k| k.is_kind_of(ancestor))
}

/// True for type tags naming a concrete target concept.
pub fn is_concrete(type_name: &str) -> bool {
    ElementKind::from_name(type_name).is_some_and(|k| !k.is_abstract())
}

// ============================================================================
// ENUMERATION LITERALS
// ============================================================================

/// Literal sets of the enumerations carried by model fields.
///
/// Model values use the wire spelling, so the first entry of each set is also
/// the value written when a field holds something outside the set.
pub mod literals {
    pub const VISIBILITY: &[&str] = &["public", "protected", "private", "package"];
    pub const AGGREGATION: &[&str] = &["none", "shared", "composite"];
    pub const DIRECTION: &[&str] = &["in", "inout", "out", "return"];
    pub const CONCURRENCY: &[&str] = &["sequential", "guarded", "concurrent"];
    pub const MESSAGE_SORT: &[&str] = &[
        "synchCall",
        "asynchCall",
        "asynchSignal",
        "createMessage",
        "deleteMessage",
        "reply",
    ];
    pub const INTERACTION_OPERATOR: &[&str] = &[
        "seq", "alt", "opt", "par", "loop", "critical", "neg", "assert", "strict", "ignore",
        "consider", "break",
    ];
    pub const PSEUDOSTATE: &[&str] = &[
        "initial",
        "deepHistory",
        "shallowHistory",
        "join",
        "fork",
        "junction",
        "choice",
        "entryPoint",
        "exitPoint",
        "terminate",
    ];
    pub const TRANSITION: &[&str] = &["external", "internal", "local"];
    pub const OBJECT_NODE_ORDERING: &[&str] = &["FIFO", "unordered", "ordered", "LIFO"];

    /// `UMLEvent.kind`, one per wire event concept.
    pub const EVENT_KIND: &[&str] = &["signal", "call", "change", "time", "anyReceive"];
    /// `UMLAction.kind`, one per wire action concept.
    pub const ACTION_KIND: &[&str] = &[
        "opaque",
        "callBehavior",
        "callOperation",
        "sendSignal",
        "create",
        "destroy",
        "read",
        "write",
        "acceptEvent",
        "structured",
    ];
}
