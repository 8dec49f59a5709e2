// Data processing pipeline: stage processing and run reports

pub mod processing;
pub mod report;

pub use report::{EntityReport, StageReport};
