use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use complaint_desk::api::HttpComplaintApi;
use complaint_desk::config::{Cli, Config};
use complaint_desk::controller::PageController;
use complaint_desk::state::AppState;
use complaint_desk::{db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Browser storage lives in SQLite
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    let api = HttpComplaintApi::new(&config.api)?;
    tracing::info!("Complaint API: {}", api.base_url());

    let state = AppState {
        db: pool,
        config: config.clone(),
        controller: Arc::new(PageController::new(Arc::new(api))),
    };

    let app = routes::app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
