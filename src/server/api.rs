use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_TOP_N};
use crate::models::{Metric, OthersAggregation};
use crate::server::{AppState, SharedDashboard, SharedSource};
use crate::services::PagedSource;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: usize,
    pub uptime_secs: u64,
    pub current_system_time: String,
}

/// GET /health - liveness plus dataset size
#[instrument(skip(app_state))]
pub async fn health_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok",
        records: app_state.source.len(),
        uptime_secs: app_state.started_at.elapsed().as_secs(),
        current_system_time: Utc::now().to_rfc3339(),
    };

    // No logging for /health endpoint (too noisy)

    (StatusCode::OK, Json(health)).into_response()
}

/// Query parameters for /sim/coins
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 1-based page number (default: 1)
    pub page: Option<u32>,

    /// Page size (default: 100, clamped by the source)
    pub size: Option<u32>,
}

/// GET /sim/coins - one page of the simulated dataset
#[instrument(skip(source))]
pub async fn sim_page_handler(
    State(source): State<SharedSource>,
    Query(params): Query<PageQuery>,
) -> impl IntoResponse {
    let page = params.page.unwrap_or(1);
    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);

    match source.get_page(page, size).await {
        Ok(page) => {
            debug!(page = page.page, items = page.items.len(), "Serving simulated page");
            (StatusCode::OK, Json(page)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Simulated page failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Query parameters for /summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Ranked entries per series (default: 50)
    pub top: Option<usize>,

    /// Restrict to one aggregation mode: sumPositive, sumAll, mean
    pub agg: Option<String>,

    /// Restrict to one metric: perf_24h, perf_7d, perf_30d, perf_90d
    pub metric: Option<String>,
}

/// GET /summary - fetch everything and return precomputed Top-N series
///
/// Without `agg` the full bundle (every mode) is returned. A failed fetch
/// yields 502 and no partial data.
#[instrument(skip(dashboard))]
pub async fn summary_handler(
    State(dashboard): State<SharedDashboard>,
    Query(params): Query<SummaryQuery>,
) -> Response {
    let top = params.top.unwrap_or(DEFAULT_TOP_N);

    let agg = match params.agg.as_deref().map(OthersAggregation::from_str).transpose() {
        Ok(agg) => agg,
        Err(e) => {
            warn!(agg = ?params.agg, "Invalid agg parameter");
            return bad_request(e);
        }
    };

    let metric = match params.metric.as_deref().map(Metric::from_str).transpose() {
        Ok(metric) => metric,
        Err(e) => {
            warn!(metric = ?params.metric, "Invalid metric parameter");
            return bad_request(e);
        }
    };

    let result = match agg {
        Some(agg) => dashboard.summary(top, agg).await.map(|summary| {
            let summary = match metric {
                Some(metric) => summary.only(metric),
                None => summary,
            };
            serde_json::to_value(summary)
        }),
        None => dashboard.bundle(top).await.map(|mut bundle| {
            if let Some(metric) = metric {
                bundle.by_agg = bundle
                    .by_agg
                    .into_iter()
                    .map(|(agg, summary)| (agg, summary.only(metric)))
                    .collect();
            }
            serde_json::to_value(bundle)
        }),
    };

    match result {
        Ok(Ok(body)) => {
            info!(top, agg = ?agg, metric = ?metric, "Returning summary");
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "Failed to serialize summary");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to serialize summary" })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Dataset fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
