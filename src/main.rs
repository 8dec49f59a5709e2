use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use commerce_quality::app::correct_use_case::CorrectUseCase;
use commerce_quality::app::enrich_use_case::EnrichUseCase;
use commerce_quality::app::ingest_use_case::IngestUseCase;
use commerce_quality::app::report_use_case::ReportUseCase;
use commerce_quality::app::validate_use_case::ValidateUseCase;
use commerce_quality::config::PipelineConfig;
use commerce_quality::logging;
use commerce_quality::pipeline::StageReport;

#[derive(Parser)]
#[command(name = "commerce_quality")]
#[command(about = "Data quality pipeline for the e-commerce datasets")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw extracts into the processed directory
    Ingest,
    /// Correct the processed tables: defaults, repair, referential filter
    Correct,
    /// Add derived columns to the corrected tables
    Enrich,
    /// Run expectation suites against the corrected tables
    Validate,
    /// Render the executive quality report
    Report,
    /// Run every stage in order
    Run,
}

fn print_stage(report: &StageReport) {
    println!("\n📊 {} results (run {}):", report.stage, report.run_id);
    for (entity, counts) in &report.entities {
        println!(
            "   {:<13} loaded {:>6}  written {:>6}  -> {}",
            entity.to_string(),
            counts.rows_loaded,
            counts.rows_written,
            counts.output_file
        );
    }
}

fn ingest(config: &PipelineConfig) -> Result<()> {
    println!("📥 Running ingestion...");
    let report = IngestUseCase::from_config(config)
        .run()
        .context("ingestion failed")?;
    print_stage(&report);
    Ok(())
}

fn correct(config: &PipelineConfig) -> Result<()> {
    println!("🔧 Running automatic correction...");
    let report = CorrectUseCase::from_config(config)
        .run()
        .context("correction failed")?;
    print_stage(&report);
    Ok(())
}

fn enrich(config: &PipelineConfig) -> Result<()> {
    println!("✨ Running enrichment...");
    let report = EnrichUseCase::from_config(config)
        .run()
        .context("enrichment failed")?;
    print_stage(&report);
    Ok(())
}

fn validate(config: &PipelineConfig) -> Result<()> {
    println!("🔍 Running validation suites...");
    let results = ValidateUseCase::from_config(config)
        .context("failed to load expectation suites")?
        .run();
    for result in &results {
        let status = if result.success { "✅" } else { "❌" };
        println!(
            "   {} {} ({}/{} expectations passed)",
            status, result.suite_name, result.successful_expectations, result.evaluated_expectations
        );
    }
    Ok(())
}

fn report(config: &PipelineConfig) -> Result<()> {
    println!("📝 Rendering quality report...");
    let outcome = ReportUseCase::from_config(config).run();
    match outcome.html {
        Some(path) => println!("   HTML: {}", path.display()),
        None => println!("⚠️  Report could not be rendered, see the log"),
    }
    if let Some(path) = outcome.pdf {
        println!("   PDF: {}", path.display());
    }
    Ok(())
}

fn execute(command: &Commands, config: &PipelineConfig) -> Result<()> {
    match command {
        Commands::Ingest => ingest(config),
        Commands::Correct => correct(config),
        Commands::Enrich => enrich(config),
        Commands::Validate => validate(config),
        Commands::Report => report(config),
        Commands::Run => {
            println!("🚀 Running full pipeline...");
            ingest(config)?;
            correct(config)?;
            enrich(config)?;
            validate(config)?;
            report(config)?;
            println!("\n✅ Full pipeline completed successfully!");
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match PipelineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = logging::init_logging(&config.log_dir);
    info!(?config, "Configuration loaded");

    match execute(&cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            println!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
