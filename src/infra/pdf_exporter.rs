use std::path::Path;

use tracing::debug;

use crate::app::ports::{PdfExporter, PdfOutcome};
use crate::config::PdfExport;
use crate::error::Result;

/// Exporter used when no PDF backend is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPdfExporter;

impl PdfExporter for NoPdfExporter {
    fn name(&self) -> &'static str {
        "none"
    }

    fn export(&self, html: &Path, _pdf: &Path) -> Result<PdfOutcome> {
        debug!("No PDF backend configured; leaving {} as HTML only", html.display());
        Ok(PdfOutcome::Unavailable)
    }
}

/// Select the exporter named in the configuration
pub fn exporter_for(choice: PdfExport) -> Box<dyn PdfExporter> {
    match choice {
        PdfExport::None => Box::new(NoPdfExporter),
    }
}
