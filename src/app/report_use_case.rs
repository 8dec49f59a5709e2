use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, info_span, warn};

use crate::app::ports::{PdfExporter, PdfOutcome, TableSource};
use crate::config::PipelineConfig;
use crate::constants::{CORRECTED_SUFFIX, REPORT_HTML_FILE, REPORT_PDF_FILE, VALIDATION_RESULT_PREFIX};
use crate::domain::EntityKind;
use crate::error::Result;
use crate::infra::artifacts;
use crate::infra::csv_source::CsvTableSource;
use crate::infra::pdf_exporter::exporter_for;
use crate::infra::report_renderer::{HtmlReportRenderer, ReportContext, ValidationLink};
use crate::pipeline::processing::metrics::{compute_metrics, DatasetMetrics};
use crate::pipeline::processing::normalize::apply_declared_types;

pub const STAGE_NAME: &str = "report";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub html: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Use case for the executive quality report. Never fails the run:
/// problems are logged as warnings and reflected in the outcome.
pub struct ReportUseCase {
    source: Box<dyn TableSource>,
    pdf_exporter: Box<dyn PdfExporter>,
    report_dir: PathBuf,
}

impl ReportUseCase {
    pub fn new(
        source: Box<dyn TableSource>,
        pdf_exporter: Box<dyn PdfExporter>,
        report_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            pdf_exporter,
            report_dir,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            Box::new(CsvTableSource::new(&config.corrected_dir, CORRECTED_SUFFIX)),
            exporter_for(config.pdf_export),
            config.report_dir.clone(),
        )
    }

    pub fn run(&self) -> ReportOutcome {
        let span = info_span!("stage", stage = STAGE_NAME);
        let _enter = span.enter();

        let context = ReportContext {
            generated_at: Utc::now(),
            datasets: self.collect_metrics(),
            validations: collect_validations(&self.report_dir),
        };

        let html = match self.render(&context) {
            Ok(path) => {
                info!("Report written to {}", path.display());
                path
            }
            Err(e) => {
                warn!(error = %e, "Failed to render the quality report");
                return ReportOutcome { html: None, pdf: None };
            }
        };

        let pdf_path = self.report_dir.join(REPORT_PDF_FILE);
        let pdf = match self.pdf_exporter.export(&html, &pdf_path) {
            Ok(PdfOutcome::Exported) => {
                info!(exporter = self.pdf_exporter.name(), "PDF written to {}", pdf_path.display());
                Some(pdf_path)
            }
            Ok(PdfOutcome::Unavailable) => {
                warn!("PDF export unavailable; only the HTML report was produced");
                None
            }
            Err(e) => {
                warn!(exporter = self.pdf_exporter.name(), error = %e, "PDF export failed");
                None
            }
        };

        ReportOutcome {
            html: Some(html),
            pdf,
        }
    }

    fn render(&self, context: &ReportContext) -> Result<PathBuf> {
        HtmlReportRenderer::new()?.write(context, &self.report_dir, REPORT_HTML_FILE)
    }

    fn collect_metrics(&self) -> Vec<DatasetMetrics> {
        let mut datasets = Vec::new();
        for entity in EntityKind::PIPELINE_ORDER {
            match self.source.load(entity) {
                Ok(outcome) => {
                    let file = self
                        .source
                        .location(entity)
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    datasets.push(compute_metrics(&apply_declared_types(outcome.table), &file));
                }
                Err(e) => warn!(entity = %entity, error = %e, "Dataset left out of the report"),
            }
        }
        datasets
    }
}

/// Pass/fail status of every validation artifact in `dir`, by file name
fn collect_validations(dir: &Path) -> Vec<ValidationLink> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(VALIDATION_RESULT_PREFIX) && name.ends_with(".json"))
        })
        .collect();
    paths.sort();

    let mut links = Vec::with_capacity(paths.len());
    for path in paths {
        let result: serde_json::Value = match artifacts::read_json(&path) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable validation artifact {}", path.display());
                continue;
            }
        };
        let count = |field: &str| result[field].as_u64().unwrap_or(0) as usize;
        links.push(ValidationLink {
            suite_name: result["suite_name"].as_str().unwrap_or_default().to_string(),
            success: result["success"].as_bool().unwrap_or(false),
            evaluated: count("evaluated_expectations"),
            failed: count("unsuccessful_expectations"),
            artifact: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        });
    }
    links
}
