//! Controller for the review pipeline: submission, listing and the
//! human-in-the-loop approval/rejection operations.

use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::review_item::SubmitParams;
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::review_item as ReviewItemApi;
use domain::{review_items, summaries, transcripts, Id};
use log::*;
use serde::Serialize;
use service::config::ApiVersion;
use utoipa::ToSchema;

/// Body returned by a submission: the id of the placeholder item.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub id: Id,
}

/// POST raw call input into the pipeline
///
/// Registers a placeholder item and returns immediately; transcript
/// generation proceeds in the background.
#[utoipa::path(
    post,
    path = "/review-items/{tenant_id}",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to submit the item under"),
    ),
    request_body = SubmitParams,
    responses(
        (status = 202, description = "Item registered, transcript generation in flight", body = SubmitResponse),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn submit(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(params): Json<SubmitParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST submit review item for tenant {tenant_id}");

    let id = ReviewItemApi::submit(
        app_state.pipeline_ref(),
        &tenant_id,
        params.raw_transcript,
        params.audio_ref,
    )?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            StatusCode::ACCEPTED.into(),
            SubmitResponse { id },
        )),
    ))
}

/// GET all review items for a tenant
#[utoipa::path(
    get,
    path = "/review-items/{tenant_id}",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to list review items for"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved all review items", body = [review_items::Model]),
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all review items for tenant {tenant_id}");

    let review_items = ReviewItemApi::list(app_state.pipeline_ref(), &tenant_id);

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), review_items)))
}

/// GET a single review item
#[utoipa::path(
    get,
    path = "/review-items/{tenant_id}/{id}",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant the item belongs to"),
        ("id" = Id, Path, description = "Review item id"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the review item", body = review_items::Model),
        (status = 404, description = "Review item not found"),
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Id)>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET review item {id} for tenant {tenant_id}");

    let review_item = ReviewItemApi::find_by_id(app_state.pipeline_ref(), &tenant_id, &id)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), review_item)))
}

/// PUT the human-edited transcript, approving it for summarization
#[utoipa::path(
    put,
    path = "/review-items/{tenant_id}/{id}/transcript",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant the item belongs to"),
        ("id" = Id, Path, description = "Review item id"),
    ),
    request_body = transcripts::Model,
    responses(
        (status = 200, description = "Transcript approved, summarization in flight", body = review_items::Model),
        (status = 404, description = "Review item not found"),
        (status = 409, description = "Item is not awaiting transcript review"),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn approve_transcript(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Id)>,
    Json(edited): Json<transcripts::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT approve transcript for review item {id} (tenant {tenant_id})");

    let review_item =
        ReviewItemApi::approve_transcript(app_state.pipeline_ref(), &tenant_id, &id, edited)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), review_item)))
}

/// PUT the human-edited summary, approving the item into the knowledge bank
#[utoipa::path(
    put,
    path = "/review-items/{tenant_id}/{id}/summary",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant the item belongs to"),
        ("id" = Id, Path, description = "Review item id"),
    ),
    request_body = summaries::Model,
    responses(
        (status = 200, description = "Item approved and committed to the knowledge bank", body = review_items::Model),
        (status = 404, description = "Review item not found"),
        (status = 409, description = "Item is not awaiting summary review"),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn approve_summary(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Id)>,
    Json(edited): Json<summaries::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT approve summary for review item {id} (tenant {tenant_id})");

    let review_item =
        ReviewItemApi::approve_summary(app_state.pipeline_ref(), &tenant_id, &id, edited)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), review_item)))
}

/// PUT a human rejection of a reviewable item
#[utoipa::path(
    put,
    path = "/review-items/{tenant_id}/{id}/reject",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant the item belongs to"),
        ("id" = Id, Path, description = "Review item id"),
    ),
    responses(
        (status = 200, description = "Item rejected", body = review_items::Model),
        (status = 404, description = "Review item not found"),
        (status = 409, description = "Item is not in a reviewable state"),
    )
)]
pub async fn reject(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path((tenant_id, id)): Path<(String, Id)>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT reject review item {id} (tenant {tenant_id})");

    let review_item = ReviewItemApi::reject(app_state.pipeline_ref(), &tenant_id, &id)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), review_item)))
}
