// Adapters for the application ports: CSV files, JSON artifacts, report rendering

pub mod artifacts;
pub mod csv_sink;
pub mod csv_source;
pub mod pdf_exporter;
pub mod report_renderer;
