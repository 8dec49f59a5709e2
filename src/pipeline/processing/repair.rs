use serde::Serialize;
use tracing::info;

use crate::constants::{COL_DELIVERED_AT, COL_SHIPPED_AT};
use crate::domain::{EntityKind, Table, Value};
use crate::error::Result;

/// A temporal ordering between two date columns of one entity.
/// When `later` precedes `earlier`, `later` is cleared.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemporalRule {
    pub entity: EntityKind,
    pub earlier: &'static str,
    pub later: &'static str,
}

/// Every repair the pipeline performs
pub const REPAIR_RULES: &[TemporalRule] = &[TemporalRule {
    entity: EntityKind::Logistics,
    earlier: COL_SHIPPED_AT,
    later: COL_DELIVERED_AT,
}];

pub fn rules_for(entity: EntityKind) -> impl Iterator<Item = &'static TemporalRule> {
    REPAIR_RULES.iter().filter(move |rule| rule.entity == entity)
}

/// Clear values that break the rule, keeping the rows. Returns how many
/// values were cleared. Tables of other entities are left alone.
pub fn apply_rule(table: &mut Table, rule: &TemporalRule) -> Result<usize> {
    if table.entity != rule.entity {
        return Ok(0);
    }
    let earlier_idx = table.require_column(rule.earlier)?;
    let later_idx = table.require_column(rule.later)?;

    let mut repaired = 0;
    for row in &mut table.rows {
        let violates = match (row[earlier_idx].as_timestamp(), row[later_idx].as_timestamp()) {
            (Some(earlier), Some(later)) => later < earlier,
            _ => false,
        };
        if violates {
            row[later_idx] = Value::Null;
            repaired += 1;
        }
    }

    if repaired > 0 {
        info!(
            entity = %table.entity,
            column = rule.later,
            repaired,
            "Cleared {} values preceding {}", rule.later, rule.earlier
        );
    }
    Ok(repaired)
}

/// Apply every rule registered for the table's entity
pub fn repair_table(table: &mut Table) -> Result<usize> {
    let mut total = 0;
    for rule in rules_for(table.entity) {
        total += apply_rule(table, rule)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::dates::parse_timestamp;

    fn logistics(rows: &[(&str, &str, &str)]) -> Table {
        let mut t = Table::new(
            EntityKind::Logistics,
            vec!["id_entrega".into(), "data_envio".into(), "data_entrega_real".into()],
        );
        for (id, shipped, delivered) in rows {
            let ts = |raw: &str| parse_timestamp(raw).map_or(Value::Null, Value::Timestamp);
            t.push_row(vec![Value::from(*id), ts(shipped), ts(delivered)]);
        }
        t
    }

    #[test]
    fn delivery_before_shipping_is_cleared_not_dropped() {
        let mut table = logistics(&[("E1", "2024-01-10", "2024-01-05")]);

        let repaired = repair_table(&mut table).unwrap();

        assert_eq!(repaired, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][1].to_string(), "2024-01-10");
        assert!(table.rows[0][2].is_null());
    }

    #[test]
    fn ordered_and_missing_dates_are_kept() {
        let mut table = logistics(&[
            ("E1", "2024-01-10", "2024-01-10"),
            ("E2", "2024-01-10", "2024-01-12"),
            ("E3", "", "2024-01-01"),
            ("E4", "2024-01-10", ""),
        ]);

        assert_eq!(repair_table(&mut table).unwrap(), 0);
        assert_eq!(table.rows[2][2].to_string(), "2024-01-01");
    }

    #[test]
    fn other_entities_have_no_rules() {
        assert_eq!(rules_for(EntityKind::Sale).count(), 0);
        assert_eq!(rules_for(EntityKind::Logistics).count(), 1);
    }

    #[test]
    fn repair_is_idempotent() {
        let mut table = logistics(&[("E1", "2024-01-10", "2024-01-05")]);
        repair_table(&mut table).unwrap();
        assert_eq!(repair_table(&mut table).unwrap(), 0);
    }
}
