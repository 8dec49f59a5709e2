// Pipeline processing: cleaning, reconciliation, repair, enrichment and checks

pub mod normalize;
pub mod referential;
pub mod repair;
pub mod enrich;
pub mod expectations;
pub mod metrics;
