// Domain data shapes shared across layers

pub mod schema;
pub mod table;
pub mod value;

pub use schema::{EntityKind, EntitySchema, FieldSpec, FieldType, FillValue, ForeignKey, Rule};
pub use table::{Row, Table};
pub use value::Value;
