// --- File: crates/services/salon_backend/src/main.rs ---
mod app;

use app::{build_app, seed_schedule};
use salon_agenda::{AgendaService, InMemoryAgendaStore};
use salon_common::logging;
use salon_common::services::AgendaStore;
use salon_config::{load_config, AppConfig};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    logging::init_with_level(logging::level_from_str(&config.log_level));

    if let Err(e) = run(config).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    #[cfg(feature = "database")]
    if config.use_database {
        use salon_db::{AgendaStoreFactory, DbClientFactory, RepositoryFactory};

        let db_client = DbClientFactory::new().from_app_config(&config).await?;
        let store = AgendaStoreFactory::new().create_repository(db_client);
        store.init_schema().await?;
        info!("Using SQL agenda store");
        return serve(&config, Arc::new(store)).await;
    }

    if config.use_database {
        warn!("use_database is set but the database feature is disabled; using memory store");
    }
    info!("Using in-memory agenda store");
    serve(&config, Arc::new(InMemoryAgendaStore::new())).await
}

async fn serve<S: AgendaStore + 'static>(config: &AppConfig, store: Arc<S>) -> Result<(), BoxError> {
    let service = AgendaService::from_config(store, config);
    seed_schedule(&service).await?;

    let app = build_app(service);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
