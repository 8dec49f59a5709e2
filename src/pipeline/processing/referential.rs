use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::domain::{EntityKind, Table};
use crate::error::{PipelineError, Result};

/// Natural-key sets of already-cleaned parent tables
#[derive(Debug, Default)]
pub struct ParentKeys {
    keys: HashMap<EntityKind, HashSet<String>>,
}

impl ParentKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the key set of a cleaned table so its children can be checked
    pub fn register(&mut self, table: &Table) -> Result<()> {
        let keys = table.key_set(table.schema().key)?;
        self.keys.insert(table.entity, keys);
        Ok(())
    }

    pub fn get(&self, entity: EntityKind) -> Option<&HashSet<String>> {
        self.keys.get(&entity)
    }
}

/// Keep only child rows whose foreign keys all exist in the parent key sets.
/// Returns the number of rows removed. Every parent named by the child's
/// schema must already be registered.
pub fn retain_referenced(table: &mut Table, parents: &ParentKeys) -> Result<usize> {
    let schema = table.schema();
    if schema.foreign_keys.is_empty() {
        return Ok(0);
    }

    let mut checks = Vec::with_capacity(schema.foreign_keys.len());
    for fk in schema.foreign_keys {
        let idx = table.require_column(fk.column)?;
        let keys = parents.get(fk.parent).ok_or_else(|| {
            PipelineError::Config(format!(
                "{} must be cleaned before {} is validated",
                fk.parent, table.entity
            ))
        })?;
        checks.push((idx, keys));
    }

    let removed = table.retain_rows(|row| {
        checks.iter().all(|(idx, keys)| {
            row[*idx]
                .key()
                .is_some_and(|key| keys.contains(&key))
        })
    });

    if removed > 0 {
        info!(entity = %table.entity, removed, "Removed rows with invalid foreign keys");
    }
    Ok(removed)
}
