//! Ledger server: reads settings, opens the database, creates ledger tables, serves the API.

use ledger_sdk::{apply_migrations, build_app, load, open_pool, resolve, AppState, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_directive())),
        )
        .init();

    let pool = open_pool(&settings).await?;
    let config = load(&settings).await?;
    let model = resolve(&config)?;
    apply_migrations(&pool, &model).await?;
    tracing::info!(ledgers = model.ledgers.len(), database = %settings.database_url, "ledger table resolved");

    let app = build_app(AppState::new(pool, model), settings.body_limit_bytes);
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
