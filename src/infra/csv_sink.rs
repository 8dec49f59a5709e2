use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::app::ports::{TableSink, WriteOutcome};
use crate::constants::CSV_EXTENSION;
use crate::domain::Table;
use crate::error::{PipelineError, Result};
use crate::observability::metrics;

/// Writes `<dir>/<stem><suffix>.csv`, replacing earlier output
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    dir: PathBuf,
    suffix: String,
}

impl CsvTableSink {
    pub fn new(dir: impl Into<PathBuf>, suffix: &str) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.to_string(),
        }
    }

    pub fn path_for(&self, table: &Table) -> PathBuf {
        self.dir
            .join(format!("{}{}", table.entity.file_stem(), self.suffix))
            .with_extension(CSV_EXTENSION)
    }
}

/// Serialize a table to CSV bytes with a header row
pub fn encode_table(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

impl TableSink for CsvTableSink {
    fn write(&self, table: &Table) -> Result<WriteOutcome> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(table);
        let bytes = encode_table(table)?;
        fs::write(&path, &bytes)?;

        let checksum = hex::encode(Sha256::digest(&bytes));
        metrics::writer::rows_written(table.entity.file_stem(), table.len());
        info!(
            entity = %table.entity,
            rows = table.len(),
            checksum = %checksum,
            "Wrote {}",
            path.display()
        );

        Ok(WriteOutcome {
            path,
            rows: table.len(),
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityKind, Value};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn products() -> Table {
        let mut table = Table::new(
            EntityKind::Product,
            vec!["id_produto".into(), "nome_produto".into(), "preco".into(), "ativo".into()],
        );
        table.push_row(vec![
            Value::from("P1"),
            Value::from("TV, 50 pol"),
            Value::Decimal(1999.9),
            Value::Boolean(true),
        ]);
        table.push_row(vec![Value::from("P2"), Value::Null, Value::Decimal(10.0), Value::Boolean(false)]);
        table
    }

    #[test]
    fn writes_header_and_quotes_embedded_commas() {
        let dir = tempdir().unwrap();
        let sink = CsvTableSink::new(dir.path().join("out"), "_corrigido");

        let outcome = sink.write(&products()).unwrap();

        assert_eq!(outcome.path, dir.path().join("out").join("produtos_corrigido.csv"));
        assert_eq!(outcome.rows, 2);
        let content = fs::read_to_string(&outcome.path).unwrap();
        assert_eq!(
            content,
            "id_produto,nome_produto,preco,ativo\nP1,\"TV, 50 pol\",1999.9,True\nP2,,10,False\n"
        );
    }

    #[test]
    fn rewriting_replaces_previous_output() {
        let dir = tempdir().unwrap();
        let sink = CsvTableSink::new(dir.path(), "");
        let first = sink.write(&products()).unwrap();

        let mut smaller = products();
        smaller.rows.truncate(1);
        let second = sink.write(&smaller).unwrap();

        assert_ne!(first.checksum, second.checksum);
        let content = fs::read_to_string(&second.path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn checksum_matches_file_bytes() {
        let dir = tempdir().unwrap();
        let mut table = Table::new(EntityKind::Logistics, vec!["data_envio".into()]);
        let shipped = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        table.push_row(vec![Value::Timestamp(shipped)]);

        let outcome = CsvTableSink::new(dir.path(), "").write(&table).unwrap();

        let bytes = fs::read(&outcome.path).unwrap();
        assert_eq!(outcome.checksum, hex::encode(Sha256::digest(&bytes)));
        assert_eq!(String::from_utf8(bytes).unwrap(), "data_envio\n2024-01-10\n");
    }
}
