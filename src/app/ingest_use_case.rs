use std::path::PathBuf;

use crate::app::cleaning::CleaningStage;
use crate::app::ports::{TableSink, TableSource};
use crate::config::PipelineConfig;
use crate::constants::PROCESSED_SUFFIX;
use crate::error::Result;
use crate::infra::csv_sink::CsvTableSink;
use crate::infra::csv_source::CsvTableSource;
use crate::pipeline::processing::normalize::{NormalizeMode, Normalizer, SchemaNormalizer};
use crate::pipeline::StageReport;

pub const STAGE_NAME: &str = "ingest";

/// Use case for turning the raw extracts into processed tables:
/// strict normalization and referential filtering, no repair.
pub struct IngestUseCase {
    source: Box<dyn TableSource>,
    sink: Box<dyn TableSink>,
    normalizer: Box<dyn Normalizer>,
    summary_dir: PathBuf,
}

impl IngestUseCase {
    pub fn new(
        source: Box<dyn TableSource>,
        sink: Box<dyn TableSink>,
        normalizer: Box<dyn Normalizer>,
        summary_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            sink,
            normalizer,
            summary_dir,
        }
    }

    /// Create a use case reading `raw_dir` and writing `processed_dir`
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            Box::new(CsvTableSource::new(&config.raw_dir, "")),
            Box::new(CsvTableSink::new(&config.processed_dir, PROCESSED_SUFFIX)),
            Box::new(SchemaNormalizer::new(NormalizeMode::Ingest, config.dedup_policy)),
            config.processed_dir.clone(),
        )
    }

    pub fn run(&self) -> Result<StageReport> {
        CleaningStage {
            name: STAGE_NAME,
            source: self.source.as_ref(),
            sink: self.sink.as_ref(),
            normalizer: self.normalizer.as_ref(),
            repair: false,
            summary_dir: &self.summary_dir,
        }
        .run()
    }
}
