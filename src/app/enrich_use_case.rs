use std::path::PathBuf;

use tracing::{info, info_span};

use crate::app::cleaning::load_tables;
use crate::app::ports::{TableSink, TableSource};
use crate::config::PipelineConfig;
use crate::constants::{CORRECTED_SUFFIX, ENRICHED_SUFFIX, RUN_SUMMARY_FILE};
use crate::error::Result;
use crate::infra::artifacts;
use crate::infra::csv_sink::CsvTableSink;
use crate::infra::csv_source::CsvTableSource;
use crate::pipeline::processing::enrich::{DefaultEnricher, Enricher};
use crate::pipeline::{EntityReport, StageReport};

pub const STAGE_NAME: &str = "enrich";

/// Use case for adding derived columns to the corrected tables
pub struct EnrichUseCase {
    enricher: Box<dyn Enricher>,
    source: Box<dyn TableSource>,
    sink: Box<dyn TableSink>,
    summary_dir: PathBuf,
}

impl EnrichUseCase {
    pub fn new(
        enricher: Box<dyn Enricher>,
        source: Box<dyn TableSource>,
        sink: Box<dyn TableSink>,
        summary_dir: PathBuf,
    ) -> Self {
        Self {
            enricher,
            source,
            sink,
            summary_dir,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            Box::new(DefaultEnricher::new(config.reference_date())),
            Box::new(CsvTableSource::new(&config.corrected_dir, CORRECTED_SUFFIX)),
            Box::new(CsvTableSink::new(&config.enriched_dir, ENRICHED_SUFFIX)),
            config.enriched_dir.clone(),
        )
    }

    pub fn run(&self) -> Result<StageReport> {
        let span = info_span!("stage", stage = STAGE_NAME);
        let _enter = span.enter();
        info!("Starting enrichment");

        let mut report = StageReport::new(STAGE_NAME);
        let tables = load_tables(self.source.as_ref())?;
        for (entity, table) in tables {
            let rows_loaded = table.len();
            let enriched = self.enricher.enrich(table);
            let written = self.sink.write(&enriched)?;
            report.entities.insert(
                entity,
                EntityReport {
                    rows_loaded,
                    rows_written: written.rows,
                    output_file: written.path.display().to_string(),
                    checksum: written.checksum,
                    ..EntityReport::default()
                },
            );
            info!(entity = %entity, columns = enriched.columns.len(), "Enriched {} rows", written.rows);
        }

        report.finish();
        artifacts::write_json(&self.summary_dir, RUN_SUMMARY_FILE, &report)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{raw_tables, MockSink};
    use crate::constants::{COL_AUTO_CATEGORY, COL_LATITUDE, COL_QUALITY_FLAG};
    use crate::domain::{EntityKind, Value};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn enriched_tables_carry_derived_columns() {
        let dir = tempdir().unwrap();
        let sink = MockSink::default();
        let enricher = DefaultEnricher::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let report = EnrichUseCase::new(
            Box::new(enricher),
            Box::new(raw_tables()),
            Box::new(sink.clone()),
            dir.path().to_path_buf(),
        )
        .run()
        .unwrap();

        assert_eq!(sink.count(), 5);
        assert_eq!(report.entity(EntityKind::Sale).unwrap().rows_written, 2);

        let customers = sink.table(EntityKind::Customer).unwrap();
        assert!(customers.column_index(COL_LATITUDE).is_some());
        assert!(customers.column_index(COL_QUALITY_FLAG).is_some());

        let products = sink.table(EntityKind::Product).unwrap();
        let category = products.column_index(COL_AUTO_CATEGORY).unwrap();
        assert_eq!(products.rows[0][category], Value::from("Eletronicos"));
        assert!(dir.path().join("run_summary.json").exists());
    }
}
