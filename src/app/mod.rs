pub mod ports;
pub mod ingest_use_case;
pub mod correct_use_case;
pub mod enrich_use_case;
pub mod validate_use_case;
pub mod report_use_case;

mod cleaning;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use crate::app::ports::{LoadOutcome, TableSink, TableSource, WriteOutcome};
    use crate::domain::{EntityKind, Table, Value};
    use crate::error::{PipelineError, Result};

    /// In-memory source; entities without a table behave like missing files
    #[derive(Default)]
    pub struct MockSource {
        pub tables: HashMap<EntityKind, Table>,
    }

    impl MockSource {
        pub fn with(mut self, table: Table) -> Self {
            self.tables.insert(table.entity, table);
            self
        }
    }

    impl TableSource for MockSource {
        fn load(&self, entity: EntityKind) -> Result<LoadOutcome> {
            match self.tables.get(&entity) {
                Some(table) => Ok(LoadOutcome {
                    table: table.clone(),
                    malformed: 0,
                }),
                None => Err(PipelineError::MissingInput {
                    entity: entity.to_string(),
                    path: self.location(entity),
                }),
            }
        }

        fn location(&self, entity: EntityKind) -> PathBuf {
            PathBuf::from(format!("memory/{}.csv", entity.file_stem()))
        }
    }

    #[derive(Clone, Default)]
    pub struct MockSink {
        pub written: Arc<Mutex<Vec<Table>>>,
    }

    impl MockSink {
        pub fn table(&self, entity: EntityKind) -> Option<Table> {
            self.written
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.entity == entity)
                .cloned()
        }

        pub fn count(&self) -> usize {
            self.written.lock().unwrap().len()
        }
    }

    impl TableSink for MockSink {
        fn write(&self, table: &Table) -> Result<WriteOutcome> {
            self.written.lock().unwrap().push(table.clone());
            Ok(WriteOutcome {
                path: PathBuf::from(format!("memory/{}.csv", table.entity.file_stem())),
                rows: table.len(),
                checksum: "0".repeat(64),
            })
        }
    }

    pub fn table(entity: EntityKind, columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(entity, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|raw| Value::from_raw(raw)).collect());
        }
        table
    }

    /// A small, fully consistent set of the five raw tables
    pub fn raw_tables() -> MockSource {
        MockSource::default()
            .with(table(
                EntityKind::Customer,
                &["id_cliente", "nome", "email", "telefone", "data_nascimento", "data_cadastro", "cidade", "estado"],
                &[
                    &["C1", "José", "JOSE@X.COM", "(11) 99999-0000", "1990-05-01", "2023-01-01", "São Paulo", "SP"],
                    &["C2", "Ana", "ana@y.com", "21988887777", "1985-12-31", "2023-02-01", "Rio", "RJ"],
                ],
            ))
            .with(table(
                EntityKind::LabCustomer,
                &["id_cliente", "nome", "email", "idade", "status", "data_cadastro"],
                &[&["L1", "Bia", "bia@z.com", "30", "ativo", "2023-03-01"]],
            ))
            .with(table(
                EntityKind::Product,
                &["id_produto", "nome_produto", "categoria", "preco", "estoque", "data_criacao", "ativo"],
                &[
                    &["P1", "Smart TV", "Eletronicos", "1999.90", "5", "2023-01-01", "true"],
                    &["P2", "Camisa", "Vestuario", "-5", "3", "2023-01-01", "true"],
                ],
            ))
            .with(table(
                EntityKind::Sale,
                &["id_venda", "id_cliente", "id_produto", "quantidade", "valor_unitario", "valor_total", "data_venda"],
                &[
                    &["V1", "C1", "P1", "1", "1999.90", "1999.90", "2024-01-02"],
                    &["V2", "C9", "P1", "1", "1999.90", "1999.90", "2024-01-03"],
                ],
            ))
            .with(table(
                EntityKind::Logistics,
                &["id_entrega", "id_venda", "data_envio", "data_entrega_prevista", "data_entrega_real"],
                &[
                    &["E1", "V1", "2024-01-10", "2024-01-12", "2024-01-05"],
                    &["E2", "V2", "2024-01-10", "2024-01-12", "2024-01-11"],
                ],
            ))
    }
}
