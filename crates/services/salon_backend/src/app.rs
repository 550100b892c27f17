// --- File: crates/services/salon_backend/src/app.rs ---
use axum::{routing::get, Router};
use salon_agenda::routes::routes as agenda_routes;
use salon_agenda::service::AgendaResult;
use salon_agenda::{AgendaError, AgendaService};
use salon_common::services::AgendaStore;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Seed the stored schedule from configuration on first start.
///
/// The configured schedule must be valid even when a saved one exists, since
/// it is what the agenda falls back to. A saved schedule always wins.
pub async fn seed_schedule<S: AgendaStore>(service: &AgendaService<S>) -> AgendaResult<(), S> {
    let configured = service.default_schedule();
    configured.validate().map_err(AgendaError::InvalidSchedule)?;
    if service
        .store()
        .get_schedule()
        .await
        .map_err(AgendaError::Store)?
        .is_some()
    {
        return Ok(());
    }
    service.update_schedule(configured.clone()).await?;
    info!("Seeded schedule from configuration");
    Ok(())
}

/// The full HTTP application: agenda routes under `/api`, request tracing,
/// and Swagger UI at `/api/docs` when built with `openapi`.
pub fn build_app<S: AgendaStore + 'static>(service: AgendaService<S>) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Salon agenda API" }))
        .merge(agenda_routes(service));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use salon_agenda::doc::AgendaApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", AgendaApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    app.layer(TraceLayer::new_for_http())
}
