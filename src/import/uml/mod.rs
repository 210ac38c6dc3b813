//! UML concept readers.
//!
//! Every concept reader is a list of mixins applied in order to one record,
//! mirroring the metamodel's supertypes. The element mixin always runs first,
//! each mixin writes only its own fields, and the concept's `_type` is set
//! after the last mixin so no ancestor default survives.
//!
//! Registration order matters: [`dialects`] runs last so its aliases override
//! the standard mapping for the same type name.

mod behaviors;
mod classifiers;
mod dialects;
mod kernel;

use crate::model::metamodel::literals;
use crate::model::{ElementId, IdTable, Record, Value};
use crate::xml::XmlNode;

use super::reader::{Read, Reader, read_boolean, read_integer, read_string};
use super::registry::ReaderRegistry;

pub(crate) use classifiers::association_end;

/// Contribution of one metamodel supertype to a record.
pub(super) type Mixin = fn(&mut Reader<'_>, &XmlNode, &mut Record);

/// Apply the element mixin and then `mixins`, in order, to a fresh record.
pub(super) fn compose(r: &mut Reader<'_>, node: &XmlNode, mixins: &[Mixin]) -> Record {
    let mut record = Record::new(r.id_of(node));
    kernel::element(r, node, &mut record);
    for mixin in mixins {
        mixin(r, node, &mut record);
    }
    record
}

/// Compose a record and stamp its concept type.
pub(super) fn concept(
    r: &mut Reader<'_>,
    node: &XmlNode,
    mixins: &[Mixin],
    type_name: &str,
) -> Option<Read> {
    let mut record = compose(r, node, mixins);
    record.type_name = type_name.to_string();
    Some(Read::Record(record))
}

/// Register every standard reader, enumeration and dialect alias.
pub fn register(registry: &mut ReaderRegistry) {
    register_enumerations(registry);
    register_literals(registry);
    kernel::register(registry);
    classifiers::register(registry);
    behaviors::register(registry);
    dialects::register(registry);
}

fn register_enumerations(registry: &mut ReaderRegistry) {
    let identity = |values: &[&'static str]| values.iter().map(|v| (*v, *v)).collect::<Vec<_>>();

    registry.register_enum("uml:VisibilityKind", &identity(literals::VISIBILITY));
    registry.register_enum("uml:AggregationKind", &identity(literals::AGGREGATION));
    registry.register_enum("uml:ParameterDirectionKind", &identity(literals::DIRECTION));
    registry.register_enum("uml:CallConcurrencyKind", &identity(literals::CONCURRENCY));
    registry.register_enum("uml:MessageSort", &identity(literals::MESSAGE_SORT));
    registry.register_enum(
        "uml:InteractionOperatorKind",
        &identity(literals::INTERACTION_OPERATOR),
    );
    registry.register_enum("uml:TransitionKind", &identity(literals::TRANSITION));
    registry.register_enum("uml:ObjectNodeOrderingKind", &identity(literals::OBJECT_NODE_ORDERING));

    let mut pseudostates = identity(literals::PSEUDOSTATE);
    // Visual Paradigm writes terminate pseudostates as "final"
    pseudostates.push(("final", "terminate"));
    registry.register_enum("uml:PseudostateKind", &pseudostates);
}

// ============================================================================
// VALUE SPECIFICATIONS
// ============================================================================

fn register_literals(registry: &mut ReaderRegistry) {
    registry.register("uml:LiteralBoolean", |_, node| {
        Some(Read::Value(Value::Boolean(read_boolean(node, "value", false))))
    });
    registry.register("uml:LiteralInteger", |_, node| {
        Some(Read::Value(Value::Integer(read_integer(node, "value", 0))))
    });
    registry.register("uml:LiteralReal", |_, node| {
        Some(Read::Value(Value::String(read_string(node, "value", "0"))))
    });
    registry.register("uml:LiteralString", |_, node| {
        Some(Read::Value(Value::String(read_string(node, "value", ""))))
    });
    registry.register("uml:LiteralUnlimitedNatural", |_, node| {
        let value = read_string(node, "value", "");
        // Enterprise Architect encodes unbounded as -1
        let value = if value == "-1" { "*".to_string() } else { value };
        Some(Read::Value(Value::String(value)))
    });
    registry.register("uml:LiteralNull", |_, _| Some(Read::Value(Value::Null)));
    registry.register("uml:OpaqueExpression", |_, node| {
        Some(Read::Value(Value::String(read_string(node, "body", ""))))
    });
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// The node's `xmi:Extension` block, if written by a recognized extender.
pub(super) fn extension<'n>(r: &Reader<'_>, node: &'n XmlNode) -> Option<&'n XmlNode> {
    node.children_named("xmi:Extension").find(|ext| {
        ext.attr("extender")
            .is_some_and(|extender| r.options().recognizes_extender(extender))
    })
}

/// `value` of the `key` entry of a recognized extension block.
pub(super) fn extension_value(r: &Reader<'_>, node: &XmlNode, key: &str) -> Option<String> {
    extension(r, node)?
        .child(key)
        .and_then(|entry| entry.attr("value"))
        .map(str::to_string)
}

/// Text of a scalar child such as `defaultValue`, empty when absent.
pub(super) fn read_text(r: &mut Reader<'_>, node: &XmlNode, name: &str) -> String {
    r.read_element(node, name)
        .and_then(|v| v.as_text())
        .unwrap_or_default()
}

/// Set `field` from the first present reference.
pub(super) fn set_first_ref(
    record: &mut Record,
    field: &str,
    candidates: impl IntoIterator<Item = Option<ElementId>>,
) {
    let id = candidates.into_iter().flatten().next();
    record.set_ref(field, id);
}

/// Exchange one field between two records in the table.
pub(super) fn swap_field(table: &mut IdTable, a: &ElementId, b: &ElementId, field: &str) {
    let first = table.get_mut(a).and_then(|r| r.remove(field));
    let second = table.get_mut(b).and_then(|r| r.remove(field));
    if let (Some(record), Some(value)) = (table.get_mut(a), second) {
        record.set(field, value);
    }
    if let (Some(record), Some(value)) = (table.get_mut(b), first) {
        record.set(field, value);
    }
}
