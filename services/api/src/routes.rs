use crate::demo::{rank_document, RankingDocument, RankingOutcome};
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tenderchain::error::AppError;
use tenderchain::workflows::tender::bids::{
    tender_router, NotificationPublisher, TenderRepository, TenderService,
};

pub(crate) fn with_tender_routes<R, N>(service: Arc<TenderService<R, N>>) -> axum::Router
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    tender_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/rankings/offline",
            axum::routing::post(offline_ranking_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Score and rank a bid set posted inline, without touching the service's storage.
pub(crate) async fn offline_ranking_endpoint(
    Json(document): Json<RankingDocument>,
) -> Result<Json<RankingOutcome>, AppError> {
    rank_document(document).map(Json)
}
