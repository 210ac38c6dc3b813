//! Normalized element records and the in-memory model.
//!
//! ```text
//! Record
//! ├── id: ElementId           (_id)
//! ├── type_name: String       (_type)
//! ├── parent: Option<ElementId> (_parent)
//! └── fields: IndexMap<String, Value>
//! ```
//!
//! Import produces records into an [`IdTable`], repairs them, and emits a
//! JSON tree. Export reads records from a [`Repository`].

pub mod metamodel;
mod record;
mod repository;
mod table;

pub use metamodel::ElementKind;
pub use record::{ElementId, Record, Value};
pub use repository::{Materializer, Repository};
pub use table::IdTable;
