//! Conversion options

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options shared by the import and export pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XmiOptions {
    /// Tool name written on `xmi:Documentation` and as `extender` of every `xmi:Extension`
    pub exporter: String,
    /// Version written on `xmi:Documentation`
    pub exporter_version: String,
    /// Extenders whose `xmi:Extension` content is read back on import
    pub recognized_extenders: Vec<String>,
    /// Name of the model that wraps everything produced by one import
    pub imported_model_name: String,
    /// Name of the root model written by export
    pub root_model_name: String,
    /// Number of indentation characters per level (tab width if using tabs)
    pub tab_size: usize,
    /// Use spaces for indentation (false = use tabs)
    pub insert_spaces: bool,
    /// Value of `xmi:version` on the `xmi:XMI` root
    pub xmi_version: String,
    /// Namespace bound to the `uml` prefix
    pub uml_namespace: String,
    /// Namespace bound to the `xmi` prefix
    pub xmi_namespace: String,
}

impl Default for XmiOptions {
    fn default() -> Self {
        Self {
            exporter: "uml-xmi".to_string(),
            exporter_version: env!("CARGO_PKG_VERSION").to_string(),
            recognized_extenders: vec!["uml-xmi".to_string(), "StarUML".to_string()],
            imported_model_name: "XMIImported".to_string(),
            root_model_name: "RootModel".to_string(),
            tab_size: 1,
            insert_spaces: false,
            xmi_version: "2.1".to_string(),
            uml_namespace: "http://schema.omg.org/spec/UML/2.0".to_string(),
            xmi_namespace: "http://schema.omg.org/spec/XMI/2.1".to_string(),
        }
    }
}

impl XmiOptions {
    /// Load options from a JSON document; absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the exporter name, also registering it as a recognized extender.
    pub fn with_exporter(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.exporter = name.into();
        self.exporter_version = version.into();
        if !self.recognized_extenders.contains(&self.exporter) {
            self.recognized_extenders.push(self.exporter.clone());
        }
        self
    }

    pub fn with_indent(mut self, tab_size: usize, insert_spaces: bool) -> Self {
        self.tab_size = tab_size;
        self.insert_spaces = insert_spaces;
        self
    }

    pub fn with_imported_model_name(mut self, name: impl Into<String>) -> Self {
        self.imported_model_name = name.into();
        self
    }

    pub fn with_root_model_name(mut self, name: impl Into<String>) -> Self {
        self.root_model_name = name.into();
        self
    }

    /// Indentation byte handed to the XML writer
    pub fn indent_char(&self) -> u8 {
        if self.insert_spaces { b' ' } else { b'\t' }
    }

    pub fn recognizes_extender(&self, extender: &str) -> bool {
        self.recognized_extenders.iter().any(|e| e == extender)
    }
}
