use crate::config::AppConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "descuentos-uy")]
#[command(about = "Directory of card-linked discounts by store and branch")]
pub struct ServeArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "descuentos.toml")]
    pub config: String,

    /// Override the bind address from config (e.g. 127.0.0.1:8080)
    #[arg(long)]
    pub bind: Option<String>,

    /// Emit JSON log lines instead of the compact format
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// 套用命令列覆蓋設定
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if self.log_json {
            config.server.log_json = true;
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "refresh-details")]
#[command(about = "Refresh cached place details (hours, rating, phone) for every branch")]
pub struct RefreshArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "descuentos.toml")]
    pub config: String,

    /// Override the report directory from config
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override monitoring setting from config
    #[arg(long)]
    pub monitor: Option<bool>,

    /// List the branches that would be refreshed without calling the places provider
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl RefreshArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.output_path {
            config.refresh.output_path = path.clone();
        }
        if let Some(monitor) = self.monitor {
            config.refresh.monitor = monitor;
        }
    }
}
