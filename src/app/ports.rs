use std::path::{Path, PathBuf};

use crate::domain::{EntityKind, Table};
use crate::error::Result;

/// A loaded table plus the number of rows skipped as malformed
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Table,
    pub malformed: usize,
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub rows: usize,
    /// Hex SHA-256 of the written bytes
    pub checksum: String,
}

/// Where a stage reads its entity tables from
pub trait TableSource {
    /// Load one entity. A missing source is an error.
    fn load(&self, entity: EntityKind) -> Result<LoadOutcome>;

    /// Location the entity would be read from, for logs and reports
    fn location(&self, entity: EntityKind) -> PathBuf;
}

/// Where a stage writes its entity tables to
pub trait TableSink {
    /// Replace any previous output for the table's entity
    fn write(&self, table: &Table) -> Result<WriteOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfOutcome {
    Exported,
    /// No backend is available in this build or configuration
    Unavailable,
}

/// Optional capability to turn the HTML report into a PDF
pub trait PdfExporter {
    fn name(&self) -> &'static str;
    fn export(&self, html: &Path, pdf: &Path) -> Result<PdfOutcome>;
}
