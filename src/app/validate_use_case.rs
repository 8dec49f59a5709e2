use std::path::PathBuf;

use tracing::{info, info_span, warn};

use crate::app::ports::TableSource;
use crate::config::PipelineConfig;
use crate::constants::{CORRECTED_SUFFIX, VALIDATION_RESULT_PREFIX};
use crate::domain::EntityKind;
use crate::error::Result;
use crate::infra::artifacts;
use crate::infra::csv_source::CsvTableSource;
use crate::observability::metrics;
use crate::pipeline::processing::expectations::{
    builtin_suites, load_suites, DefaultValidationRunner, ExpectationSuite, SuiteResult,
    ValidationRunner,
};
use crate::pipeline::processing::normalize::apply_declared_types;

pub const STAGE_NAME: &str = "validate";

/// File name of the JSON artifact for a suite
pub fn artifact_name(suite_name: &str) -> String {
    format!("{VALIDATION_RESULT_PREFIX}{suite_name}.json")
}

/// Use case for running expectation suites against the corrected tables
pub struct ValidateUseCase {
    runner: Box<dyn ValidationRunner>,
    source: Box<dyn TableSource>,
    suites: Vec<ExpectationSuite>,
    report_dir: PathBuf,
}

impl ValidateUseCase {
    pub fn new(
        runner: Box<dyn ValidationRunner>,
        source: Box<dyn TableSource>,
        suites: Vec<ExpectationSuite>,
        report_dir: PathBuf,
    ) -> Self {
        Self {
            runner,
            source,
            suites,
            report_dir,
        }
    }

    /// Suites come from `suites_file` when configured, else the built-ins
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let suites = match &config.suites_file {
            Some(path) => load_suites(path)?,
            None => builtin_suites(),
        };
        Ok(Self::new(
            Box::new(DefaultValidationRunner::new()),
            Box::new(CsvTableSource::new(&config.corrected_dir, CORRECTED_SUFFIX)),
            suites,
            config.report_dir.clone(),
        ))
    }

    /// Evaluate every suite whose dataset can be loaded. Unreadable
    /// datasets and artifact write failures are logged and skipped.
    pub fn run(&self) -> Vec<SuiteResult> {
        let span = info_span!("stage", stage = STAGE_NAME);
        let _enter = span.enter();

        let mut results = Vec::with_capacity(self.suites.len());
        for suite in &self.suites {
            let Some(entity) = EntityKind::from_stem(suite.dataset()) else {
                warn!(suite = %suite.name, "No dataset named '{}'; suite skipped", suite.dataset());
                continue;
            };
            let table = match self.source.load(entity) {
                Ok(outcome) => apply_declared_types(outcome.table),
                Err(e) => {
                    warn!(suite = %suite.name, error = %e, "Dataset unavailable; suite skipped");
                    continue;
                }
            };

            let result = self.runner.validate(suite, &table);
            metrics::validation::suite_evaluated(
                &suite.name,
                result.successful_expectations,
                result.unsuccessful_expectations,
            );
            info!(
                suite = %suite.name,
                success = result.success,
                passed = result.successful_expectations,
                failed = result.unsuccessful_expectations,
                "Validated {}",
                entity
            );

            if let Err(e) = artifacts::write_json(&self.report_dir, &artifact_name(&suite.name), &result) {
                warn!(suite = %suite.name, error = %e, "Failed to write validation artifact");
            }
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{table, MockSource};
    use crate::pipeline::processing::expectations::Expectation;
    use tempfile::tempdir;

    fn customers() -> MockSource {
        MockSource::default().with(table(
            EntityKind::Customer,
            &["id_cliente", "email", "estado"],
            &[&["C1", "a@x.com", "SP"], &["C2", "b@x.com", "rj"]],
        ))
    }

    #[test]
    fn results_are_written_per_suite() {
        let dir = tempdir().unwrap();
        let suite = ExpectationSuite::new(
            "clientes_suite",
            vec![
                Expectation::Unique { column: "id_cliente".into() },
                Expectation::MatchRegex {
                    column: "estado".into(),
                    regex: "^[A-Z]{2}$".into(),
                },
            ],
        );

        let results = ValidateUseCase::new(
            Box::new(DefaultValidationRunner::new()),
            Box::new(customers()),
            vec![suite],
            dir.path().to_path_buf(),
        )
        .run();

        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].unsuccessful_expectations, 1);
        assert!(dir.path().join("validation_result_clientes_suite.json").exists());
    }

    #[test]
    fn suites_without_data_are_skipped() {
        let dir = tempdir().unwrap();
        let suites = vec![
            ExpectationSuite::new("vendas_suite", vec![]),
            ExpectationSuite::new("desconhecido_suite", vec![]),
        ];

        let results = ValidateUseCase::new(
            Box::new(DefaultValidationRunner::new()),
            Box::new(customers()),
            suites,
            dir.path().to_path_buf(),
        )
        .run();

        assert!(results.is_empty());
    }
}
