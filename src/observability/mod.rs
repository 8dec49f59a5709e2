// Observability: stage counters (logging setup lives in crate::logging)

pub mod metrics;
