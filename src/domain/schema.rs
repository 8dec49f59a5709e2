use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// The five record types handled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    LabCustomer,
    Product,
    Sale,
    Logistics,
}

impl EntityKind {
    /// Processing order. Every parent precedes the children that reference it.
    pub const PIPELINE_ORDER: [EntityKind; 5] = [
        EntityKind::Customer,
        EntityKind::LabCustomer,
        EntityKind::Product,
        EntityKind::Sale,
        EntityKind::Logistics,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            EntityKind::Customer => CUSTOMERS_STEM,
            EntityKind::LabCustomer => LAB_CUSTOMERS_STEM,
            EntityKind::Product => PRODUCTS_STEM,
            EntityKind::Sale => SALES_STEM,
            EntityKind::Logistics => LOGISTICS_STEM,
        }
    }

    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::PIPELINE_ORDER
            .into_iter()
            .find(|kind| kind.file_stem() == stem)
    }

    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            EntityKind::Customer => &CUSTOMER_SCHEMA,
            EntityKind::LabCustomer => &LAB_CUSTOMER_SCHEMA,
            EntityKind::Product => &PRODUCT_SCHEMA,
            EntityKind::Sale => &SALE_SCHEMA,
            EntityKind::Logistics => &LOGISTICS_SCHEMA,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Semantic type of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
}

/// Cleaning or filtering rule attached to a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Strip diacritics and drop anything outside ASCII
    Transliterate,
    /// Lower-case, trim, and drop rows that do not look like `local@domain.tld`
    Email,
    /// Digits only, left-padded with zeros to eleven characters
    Phone,
    /// Drop rows where the value is missing
    Required,
    /// Drop rows where the value is missing or below zero
    NonNegative,
    /// Drop rows where the value is missing or not above zero
    Positive,
    /// Drop rows outside `[min, max]`
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub rules: &'static [Rule],
}

impl FieldSpec {
    const fn new(name: &'static str, field_type: FieldType, rules: &'static [Rule]) -> Self {
        Self { name, field_type, rules }
    }

    pub fn has_rule(&self, rule: Rule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn is_required(&self) -> bool {
        self.has_rule(Rule::Required)
    }
}

/// A foreign-key column and the entity whose natural key it references
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent: EntityKind,
}

/// Default written into a column when it is empty during correction
#[derive(Debug, Clone, Copy)]
pub enum FillValue {
    Text(&'static str),
    Boolean(bool),
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub key: &'static str,
    pub fields: &'static [FieldSpec],
    pub foreign_keys: &'static [ForeignKey],
    pub fill_defaults: &'static [(&'static str, FillValue)],
}

impl EntitySchema {
    /// Exact-name lookup of a declared column
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

use FieldType::{Boolean, Date, Decimal, Integer, Text};

pub static CUSTOMER_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Customer,
    key: COL_CUSTOMER_ID,
    fields: &[
        FieldSpec::new(COL_CUSTOMER_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_NAME, Text, &[Rule::Transliterate, Rule::Required]),
        FieldSpec::new(COL_EMAIL, Text, &[Rule::Email]),
        FieldSpec::new(COL_PHONE, Text, &[Rule::Phone, Rule::Required]),
        FieldSpec::new(COL_BIRTH_DATE, Date, &[Rule::Required]),
        FieldSpec::new(COL_REGISTERED_AT, Date, &[Rule::Required]),
        FieldSpec::new(COL_CITY, Text, &[Rule::Transliterate]),
        FieldSpec::new(COL_STATE, Text, &[]),
    ],
    foreign_keys: &[],
    fill_defaults: &[
        (COL_STATE, FillValue::Text("SP")),
        (COL_CITY, FillValue::Text("Sao Paulo")),
        (COL_NAME, FillValue::Text("Desconhecido")),
    ],
};

pub static LAB_CUSTOMER_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::LabCustomer,
    key: COL_CUSTOMER_ID,
    fields: &[
        FieldSpec::new(COL_CUSTOMER_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_NAME, Text, &[Rule::Transliterate]),
        FieldSpec::new(COL_EMAIL, Text, &[Rule::Email]),
        FieldSpec::new(COL_AGE, Integer, &[Rule::Range { min: 0.0, max: 119.0 }]),
        FieldSpec::new(COL_STATUS, Text, &[Rule::Required]),
        FieldSpec::new(COL_REGISTERED_AT, Date, &[Rule::Required]),
    ],
    foreign_keys: &[],
    fill_defaults: &[],
};

pub static PRODUCT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Product,
    key: COL_PRODUCT_ID,
    fields: &[
        FieldSpec::new(COL_PRODUCT_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_PRODUCT_NAME, Text, &[Rule::Transliterate]),
        FieldSpec::new(COL_CATEGORY, Text, &[Rule::Transliterate]),
        FieldSpec::new(COL_PRICE, Decimal, &[Rule::NonNegative]),
        FieldSpec::new(COL_STOCK, Integer, &[Rule::NonNegative]),
        FieldSpec::new(COL_CREATED_AT, Date, &[Rule::Required]),
        FieldSpec::new(COL_ACTIVE, Boolean, &[]),
    ],
    foreign_keys: &[],
    fill_defaults: &[
        (COL_CATEGORY, FillValue::Text("Outros")),
        (COL_ACTIVE, FillValue::Boolean(true)),
    ],
};

pub static SALE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Sale,
    key: COL_SALE_ID,
    fields: &[
        FieldSpec::new(COL_SALE_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_CUSTOMER_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_PRODUCT_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_QUANTITY, Integer, &[Rule::Positive]),
        FieldSpec::new(COL_UNIT_VALUE, Decimal, &[Rule::NonNegative]),
        FieldSpec::new(COL_TOTAL_VALUE, Decimal, &[Rule::NonNegative]),
        FieldSpec::new(COL_SOLD_AT, Date, &[Rule::Required]),
        FieldSpec::new(COL_STATUS, Text, &[]),
    ],
    foreign_keys: &[
        ForeignKey { column: COL_CUSTOMER_ID, parent: EntityKind::Customer },
        ForeignKey { column: COL_PRODUCT_ID, parent: EntityKind::Product },
    ],
    fill_defaults: &[(COL_STATUS, FillValue::Text("Pendente"))],
};

pub static LOGISTICS_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Logistics,
    key: COL_DELIVERY_ID,
    fields: &[
        FieldSpec::new(COL_DELIVERY_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_SALE_ID, Text, &[Rule::Required]),
        FieldSpec::new(COL_SHIPPED_AT, Date, &[]),
        FieldSpec::new(COL_EXPECTED_DELIVERY, Date, &[]),
        FieldSpec::new(COL_DELIVERED_AT, Date, &[]),
        FieldSpec::new(COL_DELIVERY_STATUS, Text, &[]),
    ],
    foreign_keys: &[ForeignKey { column: COL_SALE_ID, parent: EntityKind::Sale }],
    fill_defaults: &[(COL_DELIVERY_STATUS, FillValue::Text("Em transito"))],
};
