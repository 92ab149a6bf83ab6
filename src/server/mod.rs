pub mod api;

use crate::models::FetchConfig;
use crate::services::{DashboardService, PagedSource, SimulatedSource};
use axum::{extract::FromRef, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

pub type SharedSource = Arc<SimulatedSource>;
pub type SharedDashboard = Arc<DashboardService<dyn PagedSource>>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: SharedSource,
    pub dashboard: SharedDashboard,
    pub started_at: Instant,
}

impl AppState {
    /// Build state where the dashboard fetches from the same simulated source
    /// that `/sim/coins` serves
    pub fn new(source: SimulatedSource, fetch_config: FetchConfig) -> Self {
        let source = Arc::new(source);
        let dashboard_source: Arc<dyn PagedSource> = source.clone();
        Self::with_dashboard_source(source, dashboard_source, fetch_config)
    }

    /// Build state where `/summary` fetches from `dashboard_source` instead,
    /// e.g. a remote server
    pub fn with_dashboard_source(
        source: SharedSource,
        dashboard_source: Arc<dyn PagedSource>,
        fetch_config: FetchConfig,
    ) -> Self {
        let dashboard = Arc::new(DashboardService::from_shared(dashboard_source, fetch_config));
        Self {
            source,
            dashboard,
            started_at: Instant::now(),
        }
    }
}

// FromRef implementations to extract specific state components
impl FromRef<AppState> for SharedSource {
    fn from_ref(app_state: &AppState) -> SharedSource {
        app_state.source.clone()
    }
}

impl FromRef<AppState> for SharedDashboard {
    fn from_ref(app_state: &AppState) -> SharedDashboard {
        app_state.dashboard.clone()
    }
}

/// Build the router with all routes and layers
pub fn router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health_handler))
        .route("/sim/coins", get(api::sim_page_handler))
        .route("/summary", get(api::summary_handler))
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET /health");
    tracing::info!("  GET /sim/coins?page=1&size=100");
    tracing::info!("  GET /summary?top=50&agg=mean&metric=perf_7d");

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
