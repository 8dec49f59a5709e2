use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::EntityKind;
use crate::pipeline::processing::normalize::NormalizeReport;

/// Record-count deltas of one entity through one stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityReport {
    pub rows_loaded: usize,
    pub malformed_skipped: usize,
    pub normalize: NormalizeReport,
    pub orphans_removed: usize,
    pub values_repaired: usize,
    pub rows_written: usize,
    pub output_file: String,
    /// SHA-256 of the written file
    pub checksum: String,
}

impl EntityReport {
    pub fn log(&self, entity: EntityKind) {
        info!(
            entity = %entity,
            loaded = self.rows_loaded,
            malformed = self.malformed_skipped,
            filtered = self.normalize.total_dropped(),
            duplicates = self.normalize.duplicates_removed,
            filled = self.normalize.values_filled,
            dates_cleared = self.normalize.dates_cleared,
            orphans = self.orphans_removed,
            repaired = self.values_repaired,
            written = self.rows_written,
            "{} - final records: {}", entity, self.rows_written
        );
    }
}

/// Result of a complete stage run, persisted as the run summary
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub run_id: Uuid,
    pub stage: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entities: BTreeMap<EntityKind, EntityReport>,
}

impl StageReport {
    pub fn new(stage: &str) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            stage: stage.to_string(),
            started_at: now,
            finished_at: now,
            entities: BTreeMap::new(),
        }
    }

    pub fn entity(&self, kind: EntityKind) -> Option<&EntityReport> {
        self.entities.get(&kind)
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn total_written(&self) -> usize {
        self.entities.values().map(|e| e.rows_written).sum()
    }
}
