use clap::Parser;
use descuentos_uy::config::cli::ServeArgs;
use descuentos_uy::utils::logger::{self, LogFormat};
use descuentos_uy::utils::validation::Validate;
use descuentos_uy::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();

    // 載入 TOML 配置
    let mut config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    // 初始化日誌
    logger::init_logger(LogFormat::from_flag(config.server.log_json), args.verbose);

    tracing::info!("🚀 Starting DescuentosUY server");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    tracing::info!("  Backend: {}", config.backend.url);
    tracing::info!("  Public URL: {}", config.public_base_url());
    tracing::info!("  Admin panel: {}", if config.admin.enabled { "enabled" } else { "disabled" });

    if let Err(e) = descuentos_uy::start_server(config).await {
        tracing::error!(
            "❌ Server stopped: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
