use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use status_notice_api::{
    config::Config, db, routes, services::notifier::NotifierService, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let notifier = Arc::new(NotifierService::new(config.notifier.clone())?);
    info!(endpoint = %config.notifier.endpoint, "Status notifier configured");

    let state = AppState {
        db: pool,
        config: config.clone(),
        notifier,
    };

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("status notice API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
