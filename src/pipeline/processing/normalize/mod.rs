//! Per-entity normalization.
//!
//! Every entity is cleaned by the same schema-driven routine: the schema
//! names each column's type and rules, so nothing is inferred from column
//! names. Two modes exist:
//!
//! * `Ingest` drops rows whose required dates are missing or unparseable.
//! * `Correct` clears unparseable dates instead, and fills the entity's
//!   default values before filtering.
//!
//! Both modes drop rows without a natural key, deduplicate on that key and
//! only then apply the remaining row rules.

pub mod dates;
pub mod dedup;
pub mod text;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::DedupPolicy;
use crate::domain::{EntitySchema, FieldSpec, FieldType, FillValue, Row, Rule, Table, Value};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
    Ingest,
    Correct,
}

/// Row and value counts produced by one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeReport {
    pub rows_in: usize,
    /// Rows dropped per `column:rule` reason
    pub dropped: BTreeMap<String, usize>,
    pub duplicates_removed: usize,
    /// Empty cells given their entity default (correction only)
    pub values_filled: usize,
    /// Unparseable dates cleared instead of dropping the row (correction only)
    pub dates_cleared: usize,
    pub rows_out: usize,
}

impl NormalizeReport {
    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Trait for normalizing a loaded entity table
pub trait Normalizer {
    fn normalize(&self, table: Table) -> Result<(Table, NormalizeReport)>;
}

/// Default normalizer driven by the entity's declared schema
#[derive(Debug, Clone, Copy)]
pub struct SchemaNormalizer {
    pub mode: NormalizeMode,
    pub policy: DedupPolicy,
}

impl SchemaNormalizer {
    pub fn new(mode: NormalizeMode, policy: DedupPolicy) -> Self {
        Self { mode, policy }
    }

    /// Declared fields present in the table, with their column index.
    /// Key and required columns must be present.
    fn bound_fields(&self, table: &Table) -> Result<Vec<(usize, &'static FieldSpec)>> {
        let schema = table.schema();
        let mut bound = Vec::new();
        for spec in schema.fields {
            let idx = if spec.name == schema.key || spec.is_required() {
                Some(table.require_column(spec.name)?)
            } else {
                table.column_index(spec.name)
            };
            if let Some(idx) = idx {
                bound.push((idx, spec));
            }
        }
        Ok(bound)
    }

    fn coerce_row(&self, row: &mut Row, fields: &[(usize, &FieldSpec)], report: &mut NormalizeReport) {
        for (idx, spec) in fields {
            let original = std::mem::replace(&mut row[*idx], Value::Null);
            let had_value = !original.is_null();
            let coerced = coerce_value(original, spec);
            if self.mode == NormalizeMode::Correct
                && spec.field_type == FieldType::Date
                && had_value
                && coerced.is_null()
            {
                report.dates_cleared += 1;
            }
            row[*idx] = coerced;
        }
    }

    fn fill_defaults(&self, row: &mut Row, table: &Table, schema: &EntitySchema) -> usize {
        let mut filled = 0;
        for (column, fill) in schema.fill_defaults {
            if let Some(idx) = table.column_index(column) {
                if row[idx].is_null() {
                    row[idx] = match fill {
                        FillValue::Text(text) => Value::Text((*text).to_string()),
                        FillValue::Boolean(flag) => Value::Boolean(*flag),
                    };
                    filled += 1;
                }
            }
        }
        filled
    }

    /// First rule the row violates, as a `column:rule` reason
    fn rejection(&self, row: &Row, fields: &[(usize, &FieldSpec)]) -> Option<String> {
        for (idx, spec) in fields {
            let value = &row[*idx];
            for rule in spec.rules {
                if !self.passes(*rule, spec, value) {
                    return Some(format!("{}:{}", spec.name, rule_label(*rule)));
                }
            }
        }
        None
    }

    fn passes(&self, rule: Rule, spec: &FieldSpec, value: &Value) -> bool {
        match rule {
            Rule::Transliterate | Rule::Phone => true,
            Rule::Required => {
                // Correction keeps rows whose dates could not be parsed
                if self.mode == NormalizeMode::Correct && spec.field_type == FieldType::Date {
                    true
                } else {
                    !value.is_null()
                }
            }
            Rule::Email => value.as_text().is_some_and(text::is_valid_email),
            Rule::NonNegative => value.as_f64().is_some_and(|v| v >= 0.0),
            Rule::Positive => value.as_f64().is_some_and(|v| v > 0.0),
            Rule::Range { min, max } => value.as_f64().is_some_and(|v| v >= min && v <= max),
        }
    }
}

impl Normalizer for SchemaNormalizer {
    fn normalize(&self, mut table: Table) -> Result<(Table, NormalizeReport)> {
        let schema = table.schema();
        let key_idx = table.require_column(schema.key)?;
        let fields = self.bound_fields(&table)?;

        let mut report = NormalizeReport {
            rows_in: table.len(),
            ..Default::default()
        };

        let rows = std::mem::take(&mut table.rows);
        let mut keyed = Vec::with_capacity(rows.len());
        for mut row in rows {
            self.coerce_row(&mut row, &fields, &mut report);
            if self.mode == NormalizeMode::Correct {
                report.values_filled += self.fill_defaults(&mut row, &table, schema);
            }
            if row[key_idx].is_null() {
                let reason = format!("{}:{}", schema.key, rule_label(Rule::Required));
                *report.dropped.entry(reason).or_insert(0) += 1;
            } else {
                keyed.push(row);
            }
        }

        // Duplicates are resolved before the row filters, so an invalid
        // later occurrence removes the key rather than reviving an earlier one.
        let (rows, duplicates) = dedup::deduplicate(keyed, key_idx, self.policy);
        report.duplicates_removed = duplicates;

        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            match self.rejection(&row, &fields) {
                Some(reason) => *report.dropped.entry(reason).or_insert(0) += 1,
                None => kept.push(row),
            }
        }
        report.rows_out = kept.len();
        table.rows = kept;

        debug!(
            entity = %table.entity,
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            "normalized table"
        );
        Ok((table, report))
    }
}

/// Give declared columns of an already-cleaned table their schema types,
/// without filtering or deduplicating. Used when a stage reads the CSV
/// output of an earlier stage.
pub fn apply_declared_types(mut table: Table) -> Table {
    let schema = table.schema();
    let fields: Vec<(usize, &FieldSpec)> = schema
        .fields
        .iter()
        .filter_map(|spec| table.column_index(spec.name).map(|idx| (idx, spec)))
        .collect();
    for row in &mut table.rows {
        for (idx, spec) in &fields {
            let value = std::mem::replace(&mut row[*idx], Value::Null);
            row[*idx] = coerce_value(value, spec);
        }
    }
    table
}

fn rule_label(rule: Rule) -> &'static str {
    match rule {
        Rule::Transliterate => "transliterate",
        Rule::Email => "email",
        Rule::Phone => "phone",
        Rule::Required => "required",
        Rule::NonNegative => "non_negative",
        Rule::Positive => "positive",
        Rule::Range { .. } => "range",
    }
}

/// Convert a cell to the declared type and apply the text rules.
/// Values that cannot be converted become `Null`.
fn coerce_value(value: Value, spec: &FieldSpec) -> Value {
    match spec.field_type {
        FieldType::Text => match value {
            Value::Null => Value::Null,
            other => clean_text(other.to_string(), spec),
        },
        FieldType::Integer => match value {
            Value::Integer(_) | Value::Null => value,
            Value::Decimal(d) => whole_number(d).map_or(Value::Null, Value::Integer),
            Value::Text(s) => parse_integer(&s).map_or(Value::Null, Value::Integer),
            _ => Value::Null,
        },
        FieldType::Decimal => match value {
            Value::Decimal(_) | Value::Null => value,
            Value::Integer(i) => Value::Decimal(i as f64),
            Value::Text(s) => parse_decimal(&s).map_or(Value::Null, Value::Decimal),
            _ => Value::Null,
        },
        FieldType::Boolean => match value {
            Value::Boolean(_) | Value::Null => value,
            Value::Integer(i) => Value::Boolean(i != 0),
            Value::Text(s) => parse_boolean(&s).map_or(Value::Null, Value::Boolean),
            _ => Value::Null,
        },
        FieldType::Date => match value {
            Value::Timestamp(_) | Value::Null => value,
            Value::Text(s) => dates::parse_timestamp(&s).map_or(Value::Null, Value::Timestamp),
            _ => Value::Null,
        },
    }
}

fn clean_text(raw: String, spec: &FieldSpec) -> Value {
    let mut text = Some(raw.trim().to_string()).filter(|s| !s.is_empty());
    if spec.has_rule(Rule::Transliterate) {
        text = text.and_then(|s| text::transliterate(&s));
    }
    if spec.has_rule(Rule::Email) {
        text = text.map(|s| text::normalize_email(&s));
    }
    if spec.has_rule(Rule::Phone) {
        text = text.and_then(|s| text::normalize_phone(&s));
    }
    text.map_or(Value::Null, Value::Text)
}

fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| parse_decimal(raw).and_then(whole_number))
}

/// Integral decimals that fit in an `i64`; anything else has no integer form
fn whole_number(d: f64) -> Option<i64> {
    if d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 {
        Some(d as i64)
    } else {
        None
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .ok()
        .or_else(|| raw.replace(',', ".").parse::<f64>().ok())
        .filter(|d| d.is_finite())
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "1.0" | "yes" | "y" | "sim" | "s" => Some(true),
        "false" | "f" | "0" | "0.0" | "no" | "n" | "nao" | "não" => Some(false),
        _ => None,
    }
}
