//! Vendor dialect aliases.
//!
//! Registered after the standard readers, so an alias also replaces any
//! standard reader of the same name.

use crate::import::registry::ReaderRegistry;

/// `(alias, standard type)`.
const ALIASES: &[(&str, &str)] = &[
    // Visual Paradigm
    ("collaborationOccurrence", "uml:CollaborationUse"),
    ("uml:InteractionOccurrence", "uml:InteractionUse"),
    ("uml:EventOccurrence", "uml:OccurrenceSpecification"),
    // UML 2.2+ occurrence and execution specializations
    ("uml:MessageOccurrenceSpecification", "uml:OccurrenceSpecification"),
    ("uml:DestructionOccurrenceSpecification", "uml:OccurrenceSpecification"),
    ("uml:ExecutionOccurrenceSpecification", "uml:OccurrenceSpecification"),
    ("uml:BehaviorExecutionSpecification", "uml:ExecutionSpecification"),
    ("uml:ActionExecutionSpecification", "uml:ExecutionSpecification"),
    ("uml:InteractionConstraint", "uml:Constraint"),
    ("uml:ValuePin", "uml:InputPin"),
    ("uml:ActionInputPin", "uml:InputPin"),
];

pub(super) fn register(registry: &mut ReaderRegistry) {
    for (alias, standard) in ALIASES {
        match registry.element(standard) {
            Some(read) => registry.register(alias, read),
            None => tracing::warn!(alias, standard, "dialect alias targets an unregistered type"),
        }
    }
}
