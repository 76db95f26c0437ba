// --- Planificador de malla - Archivo principal ---

use log::info;
use mallaplan::config::{AppConfig, APP_NAME, APP_VERSION};
use mallaplan::run_server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    info!("=== {} {} ===", APP_NAME, APP_VERSION);
    run_server(config).await
}
