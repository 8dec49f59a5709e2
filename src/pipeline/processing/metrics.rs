use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::constants::{COL_CUSTOMER_ID, COL_PRICE};
use crate::domain::Table;

/// Summary statistics of one dataset, as shown in the quality report
#[derive(Debug, Clone, Serialize)]
pub struct DatasetMetrics {
    pub dataset: String,
    pub file: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub nulls_per_column: BTreeMap<String, usize>,
    /// Rows identical to an earlier row in every column
    pub duplicates: usize,
    pub unique_customers: Option<usize>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

pub fn compute_metrics(table: &Table, file: &str) -> DatasetMetrics {
    let nulls_per_column = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let nulls = table.rows.iter().filter(|row| row[idx].is_null()).count();
            (name.clone(), nulls)
        })
        .collect();

    let mut seen = HashSet::new();
    let duplicates = table
        .rows
        .iter()
        .filter(|row| {
            let fingerprint: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            !seen.insert(fingerprint)
        })
        .count();

    let unique_customers = table.column_index(COL_CUSTOMER_ID).map(|idx| {
        table
            .rows
            .iter()
            .filter_map(|row| row[idx].key())
            .collect::<HashSet<_>>()
            .len()
    });

    let prices: Vec<f64> = table
        .column_index(COL_PRICE)
        .map(|idx| table.rows.iter().filter_map(|row| row[idx].as_f64()).collect())
        .unwrap_or_default();
    let price_min = prices.iter().copied().reduce(f64::min);
    let price_max = prices.iter().copied().reduce(f64::max);

    DatasetMetrics {
        dataset: table.entity.to_string(),
        file: file.to_string(),
        rows: table.len(),
        columns: table.columns.len(),
        column_names: table.columns.clone(),
        nulls_per_column,
        duplicates,
        unique_customers,
        price_min,
        price_max,
    }
}
