//! Common trait for model interchange formats.

use crate::error::{Result, XmiError};
use crate::model::Repository;
use crate::options::XmiOptions;
use crate::{export, import};

/// Capabilities supported by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapability {
    /// Can read/import models.
    pub read: bool,
    /// Can write/export models.
    pub write: bool,
    /// Preserves all semantic information.
    pub lossless: bool,
}

impl FormatCapability {
    /// Read and write, with information lost on the way.
    pub const LOSSY: Self = Self {
        read: true,
        write: true,
        lossless: false,
    };
}

/// Trait for model interchange formats.
///
/// Implementations convert between raw file content and a [`Repository`].
pub trait ModelFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    /// MIME type for this format.
    fn mime_type(&self) -> &'static str;

    /// Capabilities of this format implementation.
    fn capabilities(&self) -> FormatCapability;

    /// Read a model from bytes into a fresh repository.
    fn read(&self, input: &[u8]) -> Result<Repository>;

    /// Write a model to bytes.
    fn write(&self, repository: &Repository) -> Result<Vec<u8>>;

    /// Quick check that the input looks like this format, without reading
    /// it.
    fn validate(&self, input: &[u8]) -> Result<()> {
        let _ = input;
        Ok(())
    }
}

/// XMI 2.1 as written by UML modeling tools.
///
/// Lossy: diagram data and unrecognized tool extensions are dropped on
/// read.
#[derive(Debug, Clone, Default)]
pub struct Xmi {
    pub options: XmiOptions,
}

impl Xmi {
    pub fn new(options: XmiOptions) -> Self {
        Self { options }
    }
}

impl ModelFormat for Xmi {
    fn name(&self) -> &'static str {
        "XMI"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xmi", "xml", "uml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/xmi+xml"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::LOSSY
    }

    fn read(&self, input: &[u8]) -> Result<Repository> {
        let text = std::str::from_utf8(input)
            .map_err(|e| XmiError::xml(format!("Invalid UTF-8: {e}")))?;
        let tree = import::read_str(text, &self.options)?;
        let mut repository = Repository::new();
        import::Materializer::materialize(&mut repository, &tree)?;
        Ok(repository)
    }

    fn write(&self, repository: &Repository) -> Result<Vec<u8>> {
        export::write_string(repository, &self.options).map(String::into_bytes)
    }

    fn validate(&self, input: &[u8]) -> Result<()> {
        let head = &input[..input.len().min(4096)];
        let text = String::from_utf8_lossy(head);
        if text.contains("XMI") {
            Ok(())
        } else {
            Err(XmiError::missing_element("xmi:XMI"))
        }
    }
}
