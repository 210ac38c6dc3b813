//! # uml-xmi
//!
//! Bidirectional mapping between an in-memory UML object model and XMI 2.1.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! format    → ModelFormat trait, Xmi format value
//!   ↓
//! import    → Reader session, concept readers, postprocess passes
//! export    → Writer session, concept writers
//!   ↓
//! model     → Records, IdTable, Repository, metamodel
//!   ↓
//! xml       → XmlNode DOM, WireNode tree and serializer
//!   ↓
//! error, options, multiplicity
//! ```
//!
//! ## Round trip
//!
//! ```no_run
//! use uml_xmi::{Repository, XmiOptions, export, import};
//!
//! let options = XmiOptions::default();
//! let mut repository = Repository::new();
//! import::load_from_file("design.xmi", &mut repository, &options)?;
//! export::save_to_file("copy.xmi", &repository, &options)?;
//! # Ok::<(), uml_xmi::XmiError>(())
//! ```

// ============================================================================
// MODULES (dependency order: error → xml → model → import/export → format)
// ============================================================================

/// Error type and crate `Result` alias
pub mod error;

/// Conversion options shared by import and export
pub mod options;

/// Multiplicity strings and their wire bounds
pub mod multiplicity;

/// XML primitives: DOM for reading, wire tree for writing
pub mod xml;

/// Normalized records, the id table and the in-memory repository
pub mod model;

/// XMI → normalized JSON tree → model
pub mod import;

/// Model → wire tree → XMI
pub mod export;

/// Interchange format trait and the XMI format
pub mod format;

// Re-export commonly needed items
pub use error::{Result, XmiError};
pub use format::{FormatCapability, ModelFormat, Xmi};
pub use model::{ElementId, ElementKind, IdTable, Materializer, Record, Repository, Value};
pub use options::XmiOptions;
