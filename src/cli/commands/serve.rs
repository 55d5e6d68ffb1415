use anyhow::Context;
use std::sync::Arc;

use crate::auth::HttpCredentialVerifier;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgRepository};
use crate::router;
use crate::state::AppState;

pub async fn handle(config: AppConfig, migrate: bool) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    if migrate {
        DatabaseManager::migrate(&pool).await?;
    }

    let verifier = HttpCredentialVerifier::new(&config.provider)?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(
        config,
        Arc::new(PgRepository::new(pool.clone())),
        Arc::new(verifier),
    );
    let app = router::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Trail Service listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Trail Service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
