// src/main.rs

use std::sync::Arc;

use clap::Parser;

use fundtrack_backend::config::{default_organizations, AppConfig};
use fundtrack_backend::tracker_service::TrackerService;
use fundtrack_backend::web::run_web_server;

/// Основная команда
#[derive(clap::Parser)]
#[command(name = "fundtrack")]
#[command(about = "Трекер сборов некоммерческих организаций", long_about = None)]
struct Args {
    /// Адрес для веб-сервера (например, 127.0.0.1:8080)
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    let service = Arc::new(TrackerService::new(config, default_organizations())?);

    println!("🚀 Запуск веб-API на http://{}", args.addr);
    run_web_server(service, &args.addr).await?;

    Ok(())
}
