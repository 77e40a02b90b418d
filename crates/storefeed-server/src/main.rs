mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use storefeed_store::{CatalogStore, UploadHistory};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(storefeed_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        env = %config.env,
        catalog = %config.catalog_path.display(),
        "starting storefeed server"
    );

    let store = CatalogStore::new(&config.catalog_path, config.normalization.clone());
    let uploads = UploadHistory::new(&config.upload_history_path);

    let sync = match storefeed_sync::build_catalog_sync(&config, store.clone()) {
        Ok(sync) => Some(Arc::new(sync)),
        Err(e) => {
            tracing::warn!(error = %e, "supplier sync disabled");
            None
        }
    };

    let _scheduler = match &sync {
        Some(sync) => {
            scheduler::spawn_startup_sync(Arc::clone(sync));
            Some(scheduler::build_scheduler(Arc::clone(sync), config.sync_interval_hours).await?)
        }
        None => None,
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        storefeed_core::Environment::Development
    ))?;
    let bind_addr = config.bind_addr;
    let app = build_app(
        AppState {
            store,
            uploads,
            config,
            sync,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
