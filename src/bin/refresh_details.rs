use chrono::Utc;
use clap::Parser;
use descuentos_uy::config::cli::RefreshArgs;
use descuentos_uy::core::refresh::{write_report, RefreshStatus};
use descuentos_uy::domain::ports::BranchDetailsStore;
use descuentos_uy::utils::{logger, validation::Validate};
use descuentos_uy::{
    AppConfig, GooglePlacesClient, LocalStorage, PostgrestClient, RefreshEngine, RefreshPipeline,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = RefreshArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting branch details refresh");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if config.backend.service_key().is_none() {
        tracing::warn!("⚠️ No service key configured; writes use the anonymous key and may be rejected");
    }

    let backend = Arc::new(PostgrestClient::from_config(&config.backend)?);
    let places = Arc::new(GooglePlacesClient::from_config(&config.places)?);
    let pipeline = RefreshPipeline::new(backend.clone(), places, config.refresh.max_age_months);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(backend.as_ref(), &pipeline).await?;
        return Ok(());
    }

    if config.refresh.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = RefreshEngine::new_with_monitoring(pipeline, config.refresh.monitor);
    let run_at = Utc::now();

    match engine.run().await {
        Ok(report) => {
            let storage = LocalStorage::new(config.refresh.output_path.clone());
            let written = write_report(&storage, &report, &config.refresh.output_formats, run_at).await?;

            println!("✅ {}", report.message);
            println!(
                "  Updated: {}  Skipped: {}  Failed: {}",
                report.count(RefreshStatus::CoordinatesAndDetailsUpdated)
                    + report.count(RefreshStatus::DetailsUpdated),
                report.count(RefreshStatus::Skipped),
                report.failures()
            );
            for name in written {
                println!("📁 Report saved to: {}", storage.resolve(&name).display());
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Refresh failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &AppConfig, args: &RefreshArgs) {
    println!("📋 Configuration Summary:");
    println!("  Backend: {}", config.backend.url);
    println!("  Places API key: {}", if config.places.api_key().is_some() { "set" } else { "missing" });
    println!("  Max age: {} months", config.refresh.max_age_months);
    println!("  Output: {}", config.refresh.output_path);
    println!("  Formats: {}", config.refresh.output_formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
}

async fn perform_dry_run(
    backend: &PostgrestClient,
    pipeline: &RefreshPipeline,
) -> anyhow::Result<()> {
    let branches = backend.place_linked_branches().await?;
    let stale: Vec<_> = branches.iter().filter(|b| !pipeline.is_fresh(b)).collect();

    println!("🔍 {} branches with a place id, {} would be refreshed", branches.len(), stale.len());
    for branch in stale {
        let last = branch
            .details_updated_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!("  - {} (place {}, last update: {})", branch.id, branch.google_place_id, last);
    }

    Ok(())
}
