//! XMI export.
//!
//! ```text
//! Repository ──concept writers──▶ WireNode tree ──serialize──▶ XMI text
//! ```
//!
//! Every root of the repository becomes a `packagedElement` of one
//! synthesized `uml:Model`. Placeholder data types created for bare type
//! names are appended after the roots.

mod uml;
mod writer;

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::{ElementId, Repository};
use crate::options::XmiOptions;
use crate::xml::{WireNode, write_document};

pub use writer::Writer;

use writer::set_type;

/// Serialize the repository as an XMI document.
pub fn write_string(repository: &Repository, options: &XmiOptions) -> Result<String> {
    let mut writer = Writer::new(repository, options);

    let mut root = WireNode::with_attr("xmi:id", ElementId::generate().as_str());
    set_type(&mut root, "uml:Model");
    root.set_attr("name", options.root_model_name.as_str());
    for record in repository.roots() {
        writer.write_element(&mut root, "packagedElement", record);
    }

    let written = writer.written();
    let deferred = writer.into_deferred();
    debug!(
        roots = repository.root_ids().len(),
        written,
        deferred = deferred.len(),
        "wrote XMI tree",
    );
    for node in deferred {
        root.add_child("packagedElement", node);
    }
    write_document(&root, options)
}

/// Write the repository to `path` as XMI.
pub fn save_to_file(
    path: impl AsRef<Path>,
    repository: &Repository,
    options: &XmiOptions,
) -> Result<()> {
    let path = path.as_ref();
    let xml = write_string(repository, options)?;
    std::fs::write(path, &xml)?;
    debug!(path = %path.display(), bytes = xml.len(), "saved XMI");
    Ok(())
}
