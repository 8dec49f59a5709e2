use std::path::PathBuf;

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::app::ports::{LoadOutcome, TableSource};
use crate::constants::CSV_EXTENSION;
use crate::domain::{EntityKind, Table, Value};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;

/// Reads `<dir>/<stem><suffix>.csv` for each entity
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    dir: PathBuf,
    suffix: String,
}

impl CsvTableSource {
    pub fn new(dir: impl Into<PathBuf>, suffix: &str) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.to_string(),
        }
    }
}

impl TableSource for CsvTableSource {
    fn location(&self, entity: EntityKind) -> PathBuf {
        self.dir
            .join(format!("{}{}", entity.file_stem(), self.suffix))
            .with_extension(CSV_EXTENSION)
    }

    fn load(&self, entity: EntityKind) -> Result<LoadOutcome> {
        let path = self.location(entity);
        if !path.is_file() {
            return Err(PipelineError::MissingInput {
                entity: entity.to_string(),
                path,
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(&path)?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let mut table = Table::new(entity, columns);
        let mut malformed = 0;

        for (line, result) in reader.byte_records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if matches!(e.kind(), ErrorKind::UnequalLengths { .. }) => {
                    debug!(entity = %entity, line = line + 2, "Skipping row with wrong column count");
                    malformed += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            match StringRecord::from_byte_record(record) {
                Ok(record) => table.push_row(record.iter().map(Value::from_raw).collect()),
                Err(_) => {
                    debug!(entity = %entity, line = line + 2, "Skipping row with invalid UTF-8");
                    malformed += 1;
                }
            }
        }

        if malformed > 0 {
            warn!(entity = %entity, malformed, "Skipped malformed rows in {}", path.display());
        }
        metrics::loader::rows_read(entity.file_stem(), table.len());
        metrics::loader::rows_malformed(entity.file_stem(), malformed);

        Ok(LoadOutcome { table, malformed })
    }
}
