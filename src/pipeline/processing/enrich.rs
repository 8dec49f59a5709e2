use chrono::{Datelike, NaiveDate};

use crate::constants::*;
use crate::domain::{EntityKind, Row, Table, Value};

pub const FLAG_OK: &str = "OK";
pub const FLAG_CHECK: &str = "VERIFICAR";
pub const FLAG_INVALID_PRICE: &str = "PRECO_INVALIDO";
pub const FLAG_INVALID_QUANTITY: &str = "QUANTIDADE_INVALIDA";
pub const FLAG_PENDING_DELIVERY: &str = "ENTREGA_PENDENTE";

/// Minimum phone length for a customer to be considered reachable
const MIN_PHONE_LEN: usize = 10;

/// Approximate state capitals used in place of a real geocoder
const STATE_COORDINATES: &[(&str, (f64, f64))] = &[
    ("SP", (-23.55, -46.63)),
    ("RJ", (-22.90, -43.20)),
    ("MG", (-19.92, -43.94)),
    ("PR", (-25.42, -49.27)),
];

/// Keyword table for automatic product categories, checked in order
const CATEGORY_KEYWORDS: &[(&[&str], &str)] = &[
    (&["tv", "smart"], "Eletronicos"),
    (&["notebook", "computador"], "Informatica"),
    (&["camisa", "calca"], "Vestuario"),
];
const FALLBACK_CATEGORY: &str = "Outros";

/// Trait for adding derived columns to a cleaned table
pub trait Enricher {
    fn enrich(&self, table: Table) -> Table;
}

/// Default enricher: simulated geocoding, keyword categories, derived
/// durations and a per-row quality flag.
#[derive(Debug, Clone)]
pub struct DefaultEnricher {
    /// Date ages are measured against
    pub reference_date: NaiveDate,
}

impl DefaultEnricher {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    fn enrich_customers(&self, mut table: Table) -> Table {
        table.add_column(COL_LATITUDE, |t, row| Value::Decimal(geocode(t, row).0));
        table.add_column(COL_LONGITUDE, |t, row| Value::Decimal(geocode(t, row).1));

        let today = self.reference_date;
        table.add_column(COL_AGE, |t, row| {
            t.value(row, COL_BIRTH_DATE)
                .and_then(Value::as_timestamp)
                .and_then(|birth| whole_years_between(birth.date(), today))
                .map_or(Value::Null, Value::Integer)
        });

        table.add_column(COL_QUALITY_FLAG, |t, row| {
            let has_email = t.value(row, COL_EMAIL).is_some_and(|v| !v.is_null());
            let phone_ok = t
                .value(row, COL_PHONE)
                .is_some_and(|v| v.to_string().len() >= MIN_PHONE_LEN);
            flag(has_email && phone_ok, FLAG_CHECK)
        });
        table
    }

    fn enrich_lab_customers(&self, mut table: Table) -> Table {
        table.add_column(COL_QUALITY_FLAG, |t, row| {
            let has_email = t.value(row, COL_EMAIL).is_some_and(|v| !v.is_null());
            flag(has_email, FLAG_CHECK)
        });
        table
    }

    fn enrich_products(&self, mut table: Table) -> Table {
        table.add_column(COL_AUTO_CATEGORY, |t, row| {
            let name = t.value(row, COL_PRODUCT_NAME).map(Value::to_string).unwrap_or_default();
            Value::from(categorize(&name))
        });
        table.add_column(COL_QUALITY_FLAG, |t, row| {
            let price_ok = t
                .value(row, COL_PRICE)
                .and_then(Value::as_f64)
                .is_some_and(|p| p > 0.0);
            flag(price_ok, FLAG_INVALID_PRICE)
        });
        table
    }

    fn enrich_sales(&self, mut table: Table) -> Table {
        table.add_column(COL_QUALITY_FLAG, |t, row| {
            let quantity_ok = t
                .value(row, COL_QUANTITY)
                .and_then(Value::as_f64)
                .is_some_and(|q| q > 0.0);
            flag(quantity_ok, FLAG_INVALID_QUANTITY)
        });
        table
    }

    fn enrich_logistics(&self, mut table: Table) -> Table {
        table.add_column(COL_DELIVERY_DAYS, |t, row| {
            let shipped = t.value(row, COL_SHIPPED_AT).and_then(Value::as_timestamp);
            let delivered = t.value(row, COL_DELIVERED_AT).and_then(Value::as_timestamp);
            match (shipped, delivered) {
                (Some(s), Some(d)) => Value::Integer((d - s).num_days()),
                _ => Value::Null,
            }
        });
        table.add_column(COL_QUALITY_FLAG, |t, row| {
            let known = t.value(row, COL_DELIVERY_DAYS).is_some_and(|v| !v.is_null());
            flag(known, FLAG_PENDING_DELIVERY)
        });
        table
    }
}

impl Enricher for DefaultEnricher {
    fn enrich(&self, table: Table) -> Table {
        match table.entity {
            EntityKind::Customer => self.enrich_customers(table),
            EntityKind::LabCustomer => self.enrich_lab_customers(table),
            EntityKind::Product => self.enrich_products(table),
            EntityKind::Sale => self.enrich_sales(table),
            EntityKind::Logistics => self.enrich_logistics(table),
        }
    }
}

fn flag(ok: bool, failure: &str) -> Value {
    Value::from(if ok { FLAG_OK } else { failure })
}

fn geocode(table: &Table, row: &Row) -> (f64, f64) {
    let state = table.value(row, COL_STATE).and_then(Value::as_text).unwrap_or_default();
    STATE_COORDINATES
        .iter()
        .find(|(code, _)| *code == state)
        .map(|(_, coords)| *coords)
        .unwrap_or((0.0, 0.0))
}

/// Keyword-based category for a product name
pub fn categorize(product_name: &str) -> &'static str {
    let name = product_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Completed years between two dates; `None` when `to` precedes `from`
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> Option<i64> {
    if to < from {
        return None;
    }
    let mut years = i64::from(to.year() - from.year());
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    Some(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::dates::parse_timestamp;

    fn date(raw: &str) -> Value {
        parse_timestamp(raw).map_or(Value::Null, Value::Timestamp)
    }

    fn enricher() -> DefaultEnricher {
        DefaultEnricher::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    #[test]
    fn customers_get_coordinates_age_and_flag() {
        let mut table = Table::new(
            EntityKind::Customer,
            vec!["id_cliente".into(), "email".into(), "telefone".into(), "data_nascimento".into(), "estado".into()],
        );
        table.push_row(vec![
            Value::from("C1"),
            Value::from("ana@x.com"),
            Value::from("11987654321"),
            date("1990-06-16"),
            Value::from("RJ"),
        ]);
        table.push_row(vec![
            Value::from("C2"),
            Value::Null,
            Value::from("11987654321"),
            date("1990-06-15"),
            Value::from("BA"),
        ]);

        let enriched = enricher().enrich(table);

        let lat = enriched.column_index("latitude").unwrap();
        let age = enriched.column_index("idade").unwrap();
        let flag = enriched.column_index("flag_qualidade").unwrap();
        assert_eq!(enriched.rows[0][lat], Value::Decimal(-22.90));
        assert_eq!(enriched.rows[1][lat], Value::Decimal(0.0));
        assert_eq!(enriched.rows[0][age], Value::Integer(34));
        assert_eq!(enriched.rows[1][age], Value::Integer(35));
        assert_eq!(enriched.rows[0][flag], Value::from("OK"));
        assert_eq!(enriched.rows[1][flag], Value::from("VERIFICAR"));
    }

    #[test]
    fn product_categories_by_keyword() {
        assert_eq!(categorize("Smart TV 50\""), "Eletronicos");
        assert_eq!(categorize("Notebook Gamer"), "Informatica");
        assert_eq!(categorize("Calca Jeans"), "Vestuario");
        assert_eq!(categorize("Cafeteira"), "Outros");
    }

    #[test]
    fn zero_price_is_flagged() {
        let mut table = Table::new(
            EntityKind::Product,
            vec!["id_produto".into(), "nome_produto".into(), "preco".into()],
        );
        table.push_row(vec![Value::from("P1"), Value::from("Camisa"), Value::Decimal(0.0)]);

        let enriched = enricher().enrich(table);
        assert_eq!(enriched.rows[0][3], Value::from("Vestuario"));
        assert_eq!(enriched.rows[0][4], Value::from(FLAG_INVALID_PRICE));
    }

    #[test]
    fn delivery_time_in_days() {
        let mut table = Table::new(
            EntityKind::Logistics,
            vec!["id_entrega".into(), "data_envio".into(), "data_entrega_real".into()],
        );
        table.push_row(vec![Value::from("E1"), date("2024-01-10"), date("2024-01-14")]);
        table.push_row(vec![Value::from("E2"), date("2024-01-10"), Value::Null]);

        let enriched = enricher().enrich(table);
        assert_eq!(enriched.rows[0][3], Value::Integer(4));
        assert_eq!(enriched.rows[0][4], Value::from("OK"));
        assert!(enriched.rows[1][3].is_null());
        assert_eq!(enriched.rows[1][4], Value::from(FLAG_PENDING_DELIVERY));
    }

    #[test]
    fn years_between_respects_birthdays() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(whole_years_between(d(2000, 2, 29), d(2025, 2, 28)), Some(24));
        assert_eq!(whole_years_between(d(2000, 2, 29), d(2025, 3, 1)), Some(25));
        assert_eq!(whole_years_between(d(2030, 1, 1), d(2025, 1, 1)), None);
    }
}
