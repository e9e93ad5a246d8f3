mod agent;
mod config_manager;
mod conversations;
mod handlers;
mod routes;
mod state;
mod utils;
mod websocket;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config_manager::utils::load_first_existing;
use config_manager::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_agent_backend=debug,tower_http=debug")),
        )
        .init();

    // Load configuration - try multiple paths
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.jsonld".to_string()),
        exe_dir.join("conf.jsonld").to_str().map(|s| s.to_string()),
        Some("conf.yaml".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let config = match load_first_existing(&config_paths)? {
        Some((config, path)) => {
            info!("Loaded configuration from: {}", path);
            config
        }
        None => {
            warn!(
                "No configuration file found (tried {:?}), using defaults",
                config_paths
            );
            Config::default()
        }
    };

    let app_state = AppState::new(config.clone());
    let app = routes::build_app(app_state);

    let addr = config.system_config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
