use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::super::domain::{ProjectDraft, ProjectId};
use super::domain::{BidId, BidSubmission};
use super::repository::{NotificationPublisher, RepositoryError, TenderRepository};
use super::service::{
    BidStatusChange, ProjectStatusChange, TenderService, TenderServiceError,
};

/// Router builder exposing the tender, bid, and ranking endpoints.
pub fn tender_router<R, N>(service: Arc<TenderService<R, N>>) -> Router
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/projects", post(create_project_handler::<R, N>))
        .route("/api/v1/projects/:project_id", get(project_handler::<R, N>))
        .route(
            "/api/v1/projects/:project_id/status",
            patch(project_status_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/bids",
            get(project_bids_handler::<R, N>).post(submit_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/analysis",
            post(analysis_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/rankings",
            get(rankings_handler::<R, N>),
        )
        .route(
            "/api/v1/projects/:project_id/rankings/export",
            get(rankings_export_handler::<R, N>),
        )
        .route("/api/v1/bids/:bid_id", get(bid_handler::<R, N>))
        .route(
            "/api/v1/bids/:bid_id/status",
            patch(bid_status_handler::<R, N>),
        )
        .with_state(service)
}

/// Map service failures onto HTTP status codes with a `{"error": ...}` body.
pub(crate) fn error_response(error: TenderServiceError) -> Response {
    let status = match &error {
        TenderServiceError::Intake(violation) if violation.is_validation() => {
            StatusCode::BAD_REQUEST
        }
        TenderServiceError::Intake(_) => StatusCode::CONFLICT,
        TenderServiceError::ProjectNotFound(_)
        | TenderServiceError::BidNotFound(_)
        | TenderServiceError::NoBids(_) => StatusCode::NOT_FOUND,
        TenderServiceError::InvalidBidTransition(_) => StatusCode::BAD_REQUEST,
        TenderServiceError::InvalidProjectTransition { .. }
        | TenderServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        TenderServiceError::Repository(_) | TenderServiceError::Export(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_project_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    axum::Json(draft): axum::Json<ProjectDraft>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.create_project(draft) {
        Ok(project) => (StatusCode::CREATED, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn project_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.project(&ProjectId(project_id)) {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn project_status_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
    axum::Json(change): axum::Json<ProjectStatusChange>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.update_project_status(&ProjectId(project_id), change) {
        Ok(update) => (StatusCode::OK, axum::Json(update)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BidListQuery {
    #[serde(default)]
    bidder_id: Option<String>,
}

pub(crate) async fn project_bids_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
    Query(query): Query<BidListQuery>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.project_bids(&ProjectId(project_id)) {
        Ok(mut bids) => {
            if let Some(bidder_id) = query.bidder_id {
                bids.retain(|bid| bid.bidder_id == bidder_id);
            }
            (StatusCode::OK, axum::Json(json!({ "bids": bids }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
    axum::Json(submission): axum::Json<BidSubmission>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit_bid(&ProjectId(project_id), submission) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analysis_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.reanalyze_project(&ProjectId(project_id)) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rankings_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.rankings(&ProjectId(project_id)) {
        Ok(rankings) => (StatusCode::OK, axum::Json(rankings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rankings_export_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.export_rankings_csv(&ProjectId(project_id)) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bid_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(bid_id): Path<String>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.bid(&BidId(bid_id)) {
        Ok(bid) => (StatusCode::OK, axum::Json(bid)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn bid_status_handler<R, N>(
    State(service): State<Arc<TenderService<R, N>>>,
    Path(bid_id): Path<String>,
    axum::Json(change): axum::Json<BidStatusChange>,
) -> Response
where
    R: TenderRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.update_bid_status(&BidId(bid_id), change.status) {
        Ok(bid) => (StatusCode::OK, axum::Json(bid)).into_response(),
        Err(error) => error_response(error),
    }
}
