use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, info_span};

use crate::app::ports::{LoadOutcome, TableSink, TableSource};
use crate::constants::RUN_SUMMARY_FILE;
use crate::domain::{EntityKind, Table};
use crate::error::Result;
use crate::infra::artifacts;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::{apply_declared_types, Normalizer};
use crate::pipeline::processing::referential::{retain_referenced, ParentKeys};
use crate::pipeline::processing::repair::repair_table;
use crate::pipeline::{EntityReport, StageReport};

/// Shared flow of the ingestion and correction stages.
///
/// Every entity is loaded and cleaned before anything is written, so a
/// missing input or key column leaves previous outputs untouched.
pub(crate) struct CleaningStage<'a> {
    pub name: &'static str,
    pub source: &'a dyn TableSource,
    pub sink: &'a dyn TableSink,
    pub normalizer: &'a dyn Normalizer,
    pub repair: bool,
    pub summary_dir: &'a Path,
}

impl CleaningStage<'_> {
    pub fn run(&self) -> Result<StageReport> {
        let span = info_span!("stage", stage = self.name);
        let _enter = span.enter();
        info!("Starting {} stage", self.name);

        let mut report = StageReport::new(self.name);
        let loaded = self.load_all(&mut report)?;

        let mut parents = ParentKeys::new();
        let mut cleaned: Vec<Table> = Vec::with_capacity(loaded.len());
        for outcome in loaded {
            let entity = outcome.table.entity;
            let stem = entity.file_stem();
            let entry = report.entities.entry(entity).or_default();

            let (mut table, normalized) = self.normalizer.normalize(outcome.table)?;
            for (reason, rows) in &normalized.dropped {
                metrics::normalize::rows_dropped(stem, reason, *rows);
            }
            metrics::normalize::duplicates_removed(stem, normalized.duplicates_removed);
            metrics::normalize::values_filled(stem, normalized.values_filled);
            entry.normalize = normalized;

            entry.orphans_removed = retain_referenced(&mut table, &parents)?;
            metrics::referential::orphans_removed(stem, entry.orphans_removed);
            parents.register(&table)?;

            if self.repair {
                entry.values_repaired = repair_table(&mut table)?;
                metrics::repair::values_cleared(stem, entry.values_repaired);
            }
            cleaned.push(table);
        }

        for table in &cleaned {
            let written = self.sink.write(table)?;
            let entry = report.entities.entry(table.entity).or_default();
            entry.rows_written = written.rows;
            entry.output_file = written.path.display().to_string();
            entry.checksum = written.checksum;
            entry.log(table.entity);
        }

        report.finish();
        let summary = artifacts::write_json(self.summary_dir, RUN_SUMMARY_FILE, &report)?;
        info!(
            written = report.total_written(),
            "{} stage complete, summary at {}",
            self.name,
            summary.display()
        );
        Ok(report)
    }

    fn load_all(&self, report: &mut StageReport) -> Result<Vec<LoadOutcome>> {
        let mut loaded = Vec::with_capacity(EntityKind::PIPELINE_ORDER.len());
        for entity in EntityKind::PIPELINE_ORDER {
            let outcome = self.source.load(entity)?;
            info!(
                entity = %entity,
                rows = outcome.table.len(),
                malformed = outcome.malformed,
                "Loaded {}",
                self.source.location(entity).display()
            );
            report.entities.insert(
                entity,
                EntityReport {
                    rows_loaded: outcome.table.len(),
                    malformed_skipped: outcome.malformed,
                    ..EntityReport::default()
                },
            );
            loaded.push(outcome);
        }
        Ok(loaded)
    }
}

/// Typed output tables of an earlier stage, keyed by entity
pub(crate) fn load_tables(source: &dyn TableSource) -> Result<BTreeMap<EntityKind, Table>> {
    EntityKind::PIPELINE_ORDER
        .into_iter()
        .map(|entity| {
            source
                .load(entity)
                .map(|outcome| (entity, apply_declared_types(outcome.table)))
        })
        .collect()
}
