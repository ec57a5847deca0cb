use tokio::time;

use medialist_server::config::ServerConfig;
use medialist_server::handlers::VERSION;
use medialist_server::http::HttpRestServer;
use medialist_server::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting media list server {}...", VERSION);

    // Load configuration
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "server/config/server.toml".to_string());

    let mut config = ServerConfig::load_from_file(&config_path).unwrap_or_else(|e| {
        log::warn!(
            "Failed to load server configuration from '{}': {}. Falling back to defaults.",
            config_path,
            e
        );
        ServerConfig::default()
    });
    config.apply_env_overrides();

    log::info!(
        "Session timeout set to {} minutes",
        config.sessions.timeout_minutes
    );

    let state = AppState::new(&config);

    // Lookups sweep too; this covers servers with no traffic.
    let sessions = state.sessions.clone();
    let sweep_interval = config.sweep_interval();
    tokio::spawn(async move {
        let mut interval = time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let removed = sessions.sweep();
            if removed > 0 {
                log::info!("Background cleanup: removed {} expired sessions", removed);
            }
        }
    });

    log::info!(
        "Starting HTTP server at {}:{}...",
        config.http.host,
        config.http.port
    );

    let server = HttpRestServer::new(config.http.clone(), state.handler_chain(), state.sessions);
    server.run().await
}
