use std::collections::HashMap;
use std::sync::OnceLock;

use super::reader::ReadFn;
use super::uml;

/// Reader dispatch tables: concept readers by wire type name and
/// enumerations by enumeration name.
///
/// Registration overwrites, so dialect-specific readers registered after the
/// standard ones take precedence. Lookups of unknown names return `None`.
#[derive(Debug, Clone, Default)]
pub struct ReaderRegistry {
    elements: HashMap<String, ReadFn>,
    enumerations: HashMap<String, HashMap<String, String>>,
}

impl ReaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the standard UML mappings and dialect overrides.
    pub fn with_uml() -> Self {
        let mut registry = Self::new();
        uml::register(&mut registry);
        registry
    }

    /// Shared instance of [`ReaderRegistry::with_uml`].
    pub fn standard() -> &'static ReaderRegistry {
        static STANDARD: OnceLock<ReaderRegistry> = OnceLock::new();
        STANDARD.get_or_init(Self::with_uml)
    }

    pub fn register(&mut self, type_name: &str, read: ReadFn) {
        self.elements.insert(type_name.to_string(), read);
    }

    pub fn register_enum(&mut self, enum_name: &str, literals: &[(&str, &str)]) {
        let mapping = literals
            .iter()
            .map(|(literal, value)| (literal.to_string(), value.to_string()))
            .collect();
        self.enumerations.insert(enum_name.to_string(), mapping);
    }

    pub fn element(&self, type_name: &str) -> Option<ReadFn> {
        self.elements.get(type_name).copied()
    }

    pub fn enum_value(&self, enum_name: &str, literal: &str) -> Option<&str> {
        self.enumerations
            .get(enum_name)
            .and_then(|m| m.get(literal))
            .map(String::as_str)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.elements.contains_key(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::reader::{Read, Reader};
    use crate::model::Value;
    use crate::xml::XmlNode;

    fn marker(_: &mut Reader<'_>, _: &XmlNode) -> Option<Read> {
        Some(Read::Value(Value::from("override")))
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ReaderRegistry::with_uml();
        assert!(registry.contains("uml:Class"));
        registry.register("uml:Class", marker);
        let read = registry.element("uml:Class").expect("registered");
        let options = crate::options::XmiOptions::default();
        let mut reader = Reader::new(&registry, &options);
        let node = XmlNode::new("packagedElement", 0);
        assert_eq!(read(&mut reader, &node), Some(Read::Value(Value::from("override"))));
    }

    #[test]
    fn test_unknown_lookups_yield_none() {
        let registry = ReaderRegistry::standard();
        assert!(registry.element("uml:Nothing").is_none());
        assert!(registry.enum_value("uml:Nothing", "x").is_none());
        assert!(registry.enum_value("uml:AggregationKind", "partial").is_none());
    }

    #[test]
    fn test_pseudostate_final_maps_to_terminate() {
        let registry = ReaderRegistry::standard();
        assert_eq!(registry.enum_value("uml:PseudostateKind", "final"), Some("terminate"));
        assert_eq!(
            registry.enum_value("uml:PseudostateKind", "shallowHistory"),
            Some("shallowHistory"),
        );
    }
}
