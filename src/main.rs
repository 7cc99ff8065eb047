use anyhow::Context;
use clap::Parser;
use immo_sheets_export::core::{ExportReport, TableSink};
use immo_sheets_export::utils::error::ErrorSeverity;
use immo_sheets_export::utils::{logger, validation::Validate};
use immo_sheets_export::{
    CliArgs, CsvTableSink, EtlEngine, ExportConfig, ExportPipeline, GoogleSheetsSink,
    ImmoApiClient, ServiceAccountTokens,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            ExportConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path.display()))?
        }
        None => ExportConfig::default(),
    }
    .with_env_credentials();

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    let validation = match args.output_csv {
        Some(_) => config.api.validate(),
        None => config.validate(),
    };
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if args.verbose {
        tracing::debug!("Effective config: {:?}", config.redacted());
    }

    let result = match &args.output_csv {
        Some(path) => {
            tracing::info!("🔍 Dry run: writing to {} instead of the spreadsheet", path.display());
            let sink = CsvTableSink::new(path, config.sheet.meta_label.clone());
            run_export(&config, sink).await
        }
        None => {
            let tokens = ServiceAccountTokens::new(config.sheet.credential_path.clone());
            match GoogleSheetsSink::new(&config.sheet, tokens) {
                Ok(sink) => run_export(&config, sink).await,
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(report) => {
            println!("✅ Export finished: {} rows x {} columns", report.rows, report.columns);
            println!("📁 Destination: {}", report.destination);
            println!("🕒 Exported at: {}", report.exported_at);
        }
        Err(e) => {
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run_export<K: TableSink>(
    config: &ExportConfig,
    sink: K,
) -> immo_sheets_export::Result<ExportReport> {
    let source = ImmoApiClient::new(&config.api)?;
    let pipeline = ExportPipeline::new(source, sink, config.columns.normalizer());
    EtlEngine::new(pipeline).run().await
}
