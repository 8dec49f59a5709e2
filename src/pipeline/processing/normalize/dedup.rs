use std::collections::{HashMap, HashSet};

use crate::config::DedupPolicy;
use crate::domain::Row;

/// Drop rows sharing a natural key, keeping the first or last occurrence.
/// Surviving rows stay in source order; rows with a null key are dropped
/// by the `Required` rule before this runs and are kept untouched here.
pub fn deduplicate(rows: Vec<Row>, key_idx: usize, policy: DedupPolicy) -> (Vec<Row>, usize) {
    let before = rows.len();

    let kept: Vec<Row> = match policy {
        DedupPolicy::KeepFirst => {
            let mut seen = HashSet::new();
            rows.into_iter()
                .filter(|row| match row[key_idx].key() {
                    Some(key) => seen.insert(key),
                    None => true,
                })
                .collect()
        }
        DedupPolicy::KeepLast => {
            let mut last_seen: HashMap<String, usize> = HashMap::new();
            for (pos, row) in rows.iter().enumerate() {
                if let Some(key) = row[key_idx].key() {
                    last_seen.insert(key, pos);
                }
            }
            rows.into_iter()
                .enumerate()
                .filter(|(pos, row)| match row[key_idx].key() {
                    Some(key) => last_seen.get(&key) == Some(pos),
                    None => true,
                })
                .map(|(_, row)| row)
                .collect()
        }
    };

    let removed = before - kept.len();
    (kept, removed)
}
