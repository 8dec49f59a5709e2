use std::path::PathBuf;

use crate::app::cleaning::CleaningStage;
use crate::app::ports::{TableSink, TableSource};
use crate::config::PipelineConfig;
use crate::constants::{CORRECTED_SUFFIX, PROCESSED_SUFFIX};
use crate::error::Result;
use crate::infra::csv_sink::CsvTableSink;
use crate::infra::csv_source::CsvTableSource;
use crate::pipeline::processing::normalize::{NormalizeMode, Normalizer, SchemaNormalizer};
use crate::pipeline::StageReport;

pub const STAGE_NAME: &str = "correct";

/// Use case for the automatic correction of processed tables: lenient
/// normalization with defaults, referential filtering and repair.
pub struct CorrectUseCase {
    source: Box<dyn TableSource>,
    sink: Box<dyn TableSink>,
    normalizer: Box<dyn Normalizer>,
    summary_dir: PathBuf,
}

impl CorrectUseCase {
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

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            Box::new(CsvTableSource::new(&config.processed_dir, PROCESSED_SUFFIX)),
            Box::new(CsvTableSink::new(&config.corrected_dir, CORRECTED_SUFFIX)),
            Box::new(SchemaNormalizer::new(NormalizeMode::Correct, config.dedup_policy)),
            config.corrected_dir.clone(),
        )
    }

    pub fn run(&self) -> Result<StageReport> {
        CleaningStage {
            name: STAGE_NAME,
            source: self.source.as_ref(),
            sink: self.sink.as_ref(),
            normalizer: self.normalizer.as_ref(),
            repair: true,
            summary_dir: &self.summary_dir,
        }
        .run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{raw_tables, table, MockSink, MockSource};
    use crate::config::DedupPolicy;
    use crate::domain::{EntityKind, Value};
    use tempfile::tempdir;

    fn run(source: MockSource) -> (StageReport, MockSink) {
        let dir = tempdir().unwrap();
        let sink = MockSink::default();
        let report = CorrectUseCase::new(
            Box::new(source),
            Box::new(sink.clone()),
            Box::new(SchemaNormalizer::new(NormalizeMode::Correct, DedupPolicy::KeepLast)),
            dir.path().to_path_buf(),
        )
        .run()
        .unwrap();
        (report, sink)
    }

    #[test]
    fn delivery_before_shipping_is_nulled_not_dropped() {
        let (report, sink) = run(raw_tables());

        let logistics = report.entity(EntityKind::Logistics).unwrap();
        assert_eq!(logistics.values_repaired, 1);
        assert_eq!(logistics.rows_written, 1);

        let table = sink.table(EntityKind::Logistics).unwrap();
        let delivered = table.column_index("data_entrega_real").unwrap();
        assert_eq!(table.rows[0][0], Value::from("E1"));
        assert!(table.rows[0][delivered].is_null());
    }

    #[test]
    fn missing_optional_values_are_filled() {
        let source = raw_tables().with(table(
            EntityKind::Customer,
            &["id_cliente", "nome", "email", "telefone", "data_nascimento", "data_cadastro", "cidade", "estado"],
            &[
                &["C1", "", "c1@x.com", "11999990000", "1990-01-01", "2023-01-01", "", ""],
                &["C2", "Ana", "ana@y.com", "21988887777", "nao e data", "2023-02-01", "Rio", "RJ"],
            ],
        ));

        let (report, sink) = run(source);

        let customers = report.entity(EntityKind::Customer).unwrap();
        assert_eq!(customers.normalize.values_filled, 3);
        assert_eq!(customers.normalize.dates_cleared, 1);
        assert_eq!(customers.rows_written, 2);

        let table = sink.table(EntityKind::Customer).unwrap();
        assert_eq!(table.rows[0][1], Value::from("Desconhecido"));
        assert_eq!(table.rows[0][6], Value::from("Sao Paulo"));
        assert_eq!(table.rows[0][7], Value::from("SP"));
        assert!(table.rows[1][4].is_null());
    }
}
