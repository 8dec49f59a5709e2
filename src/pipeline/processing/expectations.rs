//! Declarative expectation suites evaluated against cleaned tables.
//!
//! A suite is a named list of column expectations. Suites are keyed by
//! `<file stem>_suite`, so `clientes_suite` validates `clientes`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::domain::Table;
use crate::error::Result;

/// Number of offending values kept in a result for inspection
const UNEXPECTED_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expectation_type", rename_all = "snake_case")]
pub enum Expectation {
    /// Every value in the column is present
    NotNull { column: String },
    /// No non-null value appears twice
    Unique { column: String },
    /// Every non-null value matches the pattern
    MatchRegex { column: String, regex: String },
    /// Every non-null value is numeric and within the inclusive bounds
    Between {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl Expectation {
    pub fn column(&self) -> &str {
        match self {
            Expectation::NotNull { column }
            | Expectation::Unique { column }
            | Expectation::MatchRegex { column, .. }
            | Expectation::Between { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSuite {
    pub name: String,
    pub expectations: Vec<Expectation>,
}

impl ExpectationSuite {
    pub fn new(name: impl Into<String>, expectations: Vec<Expectation>) -> Self {
        Self {
            name: name.into(),
            expectations,
        }
    }

    /// File stem of the dataset this suite validates
    pub fn dataset(&self) -> &str {
        stem_for_suite(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpectationResult {
    pub expectation: Expectation,
    pub success: bool,
    pub element_count: usize,
    pub unexpected_count: usize,
    pub unexpected_sample: Vec<String>,
    /// Set when the expectation could not be evaluated at all
    pub exception: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub suite_name: String,
    pub dataset: String,
    pub success: bool,
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    pub results: Vec<ExpectationResult>,
    pub run_at: DateTime<Utc>,
}

/// Trait for evaluating a suite against a table
pub trait ValidationRunner {
    fn validate(&self, suite: &ExpectationSuite, table: &Table) -> SuiteResult;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValidationRunner;

impl DefaultValidationRunner {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(&self, expectation: &Expectation, table: &Table) -> ExpectationResult {
        let element_count = table.len();
        let Some(idx) = table.column_index(expectation.column()) else {
            return ExpectationResult {
                expectation: expectation.clone(),
                success: false,
                element_count,
                unexpected_count: 0,
                unexpected_sample: Vec::new(),
                exception: Some(format!("column '{}' not found", expectation.column())),
            };
        };
        let values = table.rows.iter().map(|row| &row[idx]);

        let unexpected: Vec<String> = match expectation {
            Expectation::NotNull { .. } => values
                .filter(|v| v.is_null())
                .map(|_| String::new())
                .collect(),
            Expectation::Unique { .. } => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for key in values.clone().filter_map(|v| v.key()) {
                    *counts.entry(key).or_insert(0) += 1;
                }
                values
                    .filter_map(|v| v.key())
                    .filter(|key| counts.get(key).copied().unwrap_or(0) > 1)
                    .collect()
            }
            Expectation::MatchRegex { regex, .. } => match Regex::new(regex) {
                Ok(re) => values
                    .filter_map(|v| v.key())
                    .filter(|text| !re.is_match(text))
                    .collect(),
                Err(e) => {
                    return ExpectationResult {
                        expectation: expectation.clone(),
                        success: false,
                        element_count,
                        unexpected_count: 0,
                        unexpected_sample: Vec::new(),
                        exception: Some(e.to_string()),
                    };
                }
            },
            Expectation::Between { min, max, .. } => values
                .filter(|v| !v.is_null())
                .filter(|v| match v.as_f64() {
                    Some(n) => min.is_some_and(|lo| n < lo) || max.is_some_and(|hi| n > hi),
                    None => true,
                })
                .map(|v| v.to_string())
                .collect(),
        };

        ExpectationResult {
            expectation: expectation.clone(),
            success: unexpected.is_empty(),
            element_count,
            unexpected_count: unexpected.len(),
            unexpected_sample: unexpected.into_iter().take(UNEXPECTED_SAMPLE_SIZE).collect(),
            exception: None,
        }
    }
}

impl ValidationRunner for DefaultValidationRunner {
    fn validate(&self, suite: &ExpectationSuite, table: &Table) -> SuiteResult {
        let results: Vec<ExpectationResult> = suite
            .expectations
            .iter()
            .map(|e| self.evaluate(e, table))
            .collect();
        let successful = results.iter().filter(|r| r.success).count();

        SuiteResult {
            suite_name: suite.name.clone(),
            dataset: suite.dataset().to_string(),
            success: successful == results.len(),
            evaluated_expectations: results.len(),
            successful_expectations: successful,
            unsuccessful_expectations: results.len() - successful,
            results,
            run_at: Utc::now(),
        }
    }
}

fn not_null(column: &str) -> Expectation {
    Expectation::NotNull { column: column.to_string() }
}

fn unique(column: &str) -> Expectation {
    Expectation::Unique { column: column.to_string() }
}

fn matches(column: &str, regex: &str) -> Expectation {
    Expectation::MatchRegex {
        column: column.to_string(),
        regex: regex.to_string(),
    }
}

fn between(column: &str, min: Option<f64>, max: Option<f64>) -> Expectation {
    Expectation::Between { column: column.to_string(), min, max }
}

/// Suites used when no suites file is configured
pub fn builtin_suites() -> Vec<ExpectationSuite> {
    vec![
        ExpectationSuite::new(
            suite_name_for(CUSTOMERS_STEM),
            vec![
                // Completeness
                not_null(COL_CUSTOMER_ID),
                not_null(COL_NAME),
                not_null(COL_EMAIL),
                // Uniqueness
                unique(COL_CUSTOMER_ID),
                unique(COL_EMAIL),
                // Validity
                matches(COL_EMAIL, r"^[\w\.-]+@[\w\.-]+\.\w+$"),
                matches(COL_PHONE, r"^\d{10,11}$"),
                // Consistency
                matches(COL_STATE, r"^[A-Z]{2}$"),
            ],
        ),
        ExpectationSuite::new(
            suite_name_for(LAB_CUSTOMERS_STEM),
            vec![
                not_null(COL_CUSTOMER_ID),
                unique(COL_CUSTOMER_ID),
                between(COL_AGE, Some(0.0), Some(119.0)),
                not_null(COL_STATUS),
            ],
        ),
        ExpectationSuite::new(
            suite_name_for(PRODUCTS_STEM),
            vec![
                not_null(COL_PRODUCT_ID),
                unique(COL_PRODUCT_ID),
                between(COL_PRICE, Some(0.0), None),
                between(COL_STOCK, Some(0.0), None),
                not_null(COL_CREATED_AT),
            ],
        ),
        ExpectationSuite::new(
            suite_name_for(SALES_STEM),
            vec![
                not_null(COL_SALE_ID),
                unique(COL_SALE_ID),
                not_null(COL_CUSTOMER_ID),
                not_null(COL_PRODUCT_ID),
                between(COL_QUANTITY, Some(1.0), None),
                between(COL_UNIT_VALUE, Some(0.0), None),
                between(COL_TOTAL_VALUE, Some(0.0), None),
            ],
        ),
        ExpectationSuite::new(
            suite_name_for(LOGISTICS_STEM),
            vec![
                not_null(COL_DELIVERY_ID),
                unique(COL_DELIVERY_ID),
                not_null(COL_SALE_ID),
            ],
        ),
    ]
}

/// Load suites from a JSON array, checking every pattern compiles
pub fn load_suites(path: &Path) -> Result<Vec<ExpectationSuite>> {
    let content = fs::read_to_string(path)?;
    let suites: Vec<ExpectationSuite> = serde_json::from_str(&content)?;
    for suite in &suites {
        for expectation in &suite.expectations {
            if let Expectation::MatchRegex { regex, .. } = expectation {
                Regex::new(regex)?;
            }
        }
    }
    Ok(suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityKind, Value};

    fn customers() -> Table {
        let mut t = Table::new(
            EntityKind::Customer,
            vec!["id_cliente".into(), "email".into(), "estado".into()],
        );
        t.push_row(vec![Value::from("C1"), Value::from("ana@x.com"), Value::from("SP")]);
        t.push_row(vec![Value::from("C2"), Value::from("ana@x.com"), Value::from("sp")]);
        t.push_row(vec![Value::from("C3"), Value::Null, Value::from("RJ")]);
        t
    }

    #[test]
    fn reports_failures_per_expectation() {
        let suite = ExpectationSuite::new(
            "clientes_suite",
            vec![
                not_null("id_cliente"),
                not_null("email"),
                unique("email"),
                matches("estado", r"^[A-Z]{2}$"),
            ],
        );

        let result = DefaultValidationRunner::new().validate(&suite, &customers());

        assert_eq!(result.dataset, "clientes");
        assert!(!result.success);
        assert_eq!(result.evaluated_expectations, 4);
        assert_eq!(result.successful_expectations, 1);
        assert_eq!(result.results[1].unexpected_count, 1);
        assert_eq!(result.results[2].unexpected_count, 2);
        assert_eq!(result.results[3].unexpected_sample, vec!["sp".to_string()]);
    }

    #[test]
    fn missing_column_fails_without_aborting() {
        let suite = ExpectationSuite::new("clientes_suite", vec![not_null("telefone"), not_null("id_cliente")]);

        let result = DefaultValidationRunner::new().validate(&suite, &customers());

        assert!(!result.results[0].success);
        assert!(result.results[0].exception.is_some());
        assert!(result.results[1].success);
    }

    #[test]
    fn between_checks_numeric_bounds() {
        let mut t = Table::new(EntityKind::Product, vec!["preco".into()]);
        t.push_row(vec![Value::Decimal(10.0)]);
        t.push_row(vec![Value::Decimal(-1.0)]);
        t.push_row(vec![Value::Null]);
        let suite = ExpectationSuite::new("produtos_suite", vec![between("preco", Some(0.0), None)]);

        let result = DefaultValidationRunner::new().validate(&suite, &t);
        assert_eq!(result.results[0].unexpected_count, 1);
    }

    #[test]
    fn suites_deserialize_from_json() {
        let json = r#"[{"name": "vendas_suite", "expectations": [
            {"expectation_type": "not_null", "column": "id_venda"},
            {"expectation_type": "between", "column": "quantidade", "min": 1.0, "max": null}
        ]}]"#;
        let suites: Vec<ExpectationSuite> = serde_json::from_str(json).unwrap();
        assert_eq!(suites[0].dataset(), "vendas");
        assert_eq!(suites[0].expectations[1], between("quantidade", Some(1.0), None));
    }

    #[test]
    fn builtin_suites_cover_every_entity() {
        let suites = builtin_suites();
        for kind in EntityKind::PIPELINE_ORDER {
            assert!(suites.iter().any(|s| s.dataset() == kind.file_stem()));
        }
    }
}
