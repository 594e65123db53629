use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use movies_api_core::{
    Config,
    services::MovieService,
    store::{MovieStore, open_store},
};

pub mod error;
pub mod routes;

pub use error::ApiError;

use routes::movies;

pub struct AppState {
    pub movie_service: MovieService,
}

impl AppState {
    pub fn new(store: Arc<dyn MovieStore>) -> Arc<Self> {
        Arc::new(Self {
            movie_service: MovieService::new(store),
        })
    }
}

/// Creates the application state with the configured store backend
pub async fn create_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = open_store(config).await?;
    Ok(AppState::new(store))
}

/// Creates the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(movies::list).post(movies::create))
        .route(
            "/movies/{id}",
            get(movies::detail)
                .patch(movies::update)
                .delete(movies::remove),
        )
}

async fn health_check() -> &'static str {
    "OK"
}

/// Starts the server and blocks until shutdown.
///
/// In the `test` environment the application is assembled but no listener is
/// bound, so callers can drive the router in-process instead.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting movies API server...");

    let state = create_app_state(&config).await?;
    let app = create_router(state);

    if config.is_test() {
        tracing::info!("APP_ENV=test, not binding a listener");
        return Ok(());
    }

    let addr = config.server_addr();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
