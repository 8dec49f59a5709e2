//! Stage counters for the quality pipeline
//!
//! Counters go through the `metrics` facade and are no-ops until a recorder
//! is installed by the host process.

use std::fmt;

/// Enum representing all metric names used in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Loader
    LoaderRowsRead,
    LoaderRowsMalformed,

    // Normalizer
    NormalizeRowsDropped,
    NormalizeDuplicatesRemoved,
    NormalizeValuesFilled,

    // Referential validator
    ReferentialOrphansRemoved,

    // Repairer
    RepairValuesCleared,

    // Writer
    WriterRowsWritten,

    // Validation runner
    ValidationExpectationsPassed,
    ValidationExpectationsFailed,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LoaderRowsRead => "dq_loader_rows_read_total",
            MetricName::LoaderRowsMalformed => "dq_loader_rows_malformed_total",
            MetricName::NormalizeRowsDropped => "dq_normalize_rows_dropped_total",
            MetricName::NormalizeDuplicatesRemoved => "dq_normalize_duplicates_removed_total",
            MetricName::NormalizeValuesFilled => "dq_normalize_values_filled_total",
            MetricName::ReferentialOrphansRemoved => "dq_referential_orphans_removed_total",
            MetricName::RepairValuesCleared => "dq_repair_values_cleared_total",
            MetricName::WriterRowsWritten => "dq_writer_rows_written_total",
            MetricName::ValidationExpectationsPassed => "dq_validation_expectations_passed_total",
            MetricName::ValidationExpectationsFailed => "dq_validation_expectations_failed_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn count(name: MetricName, entity: &str, value: usize) {
    if value == 0 {
        return;
    }
    ::metrics::counter!(name.as_str(), "entity" => entity.to_string()).increment(value as u64);
}

// ============================================================================
// Loader
// ============================================================================

pub mod loader {
    use super::{count, MetricName};

    pub fn rows_read(entity: &str, rows: usize) {
        count(MetricName::LoaderRowsRead, entity, rows);
    }

    pub fn rows_malformed(entity: &str, rows: usize) {
        count(MetricName::LoaderRowsMalformed, entity, rows);
    }
}

// ============================================================================
// Normalizer
// ============================================================================

pub mod normalize {
    use super::{count, MetricName};

    /// Rows dropped by a domain filter; `reason` names the filter
    pub fn rows_dropped(entity: &str, reason: &str, rows: usize) {
        if rows == 0 {
            return;
        }
        ::metrics::counter!(
            MetricName::NormalizeRowsDropped.as_str(),
            "entity" => entity.to_string(),
            "reason" => reason.to_string()
        )
        .increment(rows as u64);
    }

    pub fn duplicates_removed(entity: &str, rows: usize) {
        count(MetricName::NormalizeDuplicatesRemoved, entity, rows);
    }

    pub fn values_filled(entity: &str, values: usize) {
        count(MetricName::NormalizeValuesFilled, entity, values);
    }
}

// ============================================================================
// Referential validator and repairer
// ============================================================================

pub mod referential {
    use super::{count, MetricName};

    pub fn orphans_removed(entity: &str, rows: usize) {
        count(MetricName::ReferentialOrphansRemoved, entity, rows);
    }
}

pub mod repair {
    use super::{count, MetricName};

    pub fn values_cleared(entity: &str, values: usize) {
        count(MetricName::RepairValuesCleared, entity, values);
    }
}

// ============================================================================
// Writer and validation
// ============================================================================

pub mod writer {
    use super::{count, MetricName};

    pub fn rows_written(entity: &str, rows: usize) {
        count(MetricName::WriterRowsWritten, entity, rows);
    }
}

pub mod validation {
    use super::{count, MetricName};

    pub fn suite_evaluated(suite: &str, passed: usize, failed: usize) {
        count(MetricName::ValidationExpectationsPassed, suite, passed);
        count(MetricName::ValidationExpectationsFailed, suite, failed);
    }
}
