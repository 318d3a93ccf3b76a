//! Controller for the tenant knowledge bank.
//!
//! The read/write endpoints speak the bare knowledge-bank interchange format
//! (a flat JSON array / a single record), not the enveloped API shape, so
//! that any conforming knowledge bank client can consume them directly.

use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::knowledge_bank as KnowledgeBankApi;
use domain::sync as SyncApi;
use domain::{knowledge_bank_items, Id};
use log::*;
use serde::Serialize;
use service::config::ApiVersion;
use utoipa::ToSchema;

/// Body returned by a bulk import.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Number of records newly created by this import.
    pub created: usize,
}

/// Body returned by a retry-sync pass.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub synced: Vec<Id>,
    pub pending: Vec<Id>,
}

/// GET all knowledge bank items for a tenant
///
/// An unseeded tenant yields an empty array, never a 404.
#[utoipa::path(
    get,
    path = "/knowledge-bank/{tenant_id}",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to read the knowledge bank for"),
    ),
    responses(
        (status = 200, description = "The tenant's knowledge bank records", body = [knowledge_bank_items::Model]),
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET knowledge bank for tenant {tenant_id}");

    let items = KnowledgeBankApi::find_by_tenant(app_state.pipeline_ref(), &tenant_id);

    Ok(Json(items))
}

/// POST a knowledge bank item for a tenant
///
/// Idempotent on `id`: storing an id the tenant already holds returns the
/// existing record with a 200 instead of creating a duplicate.
#[utoipa::path(
    post,
    path = "/knowledge-bank/{tenant_id}",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to store the item under"),
    ),
    request_body = knowledge_bank_items::Model,
    responses(
        (status = 201, description = "Item stored", body = knowledge_bank_items::Model),
        (status = 200, description = "Item already present; existing record returned", body = knowledge_bank_items::Model),
        (status = 422, description = "Unprocessable Entity"),
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(item): Json<knowledge_bank_items::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST knowledge bank item {} for tenant {tenant_id}", item.id);

    let (stored, created) = KnowledgeBankApi::create(app_state.pipeline_ref(), &tenant_id, item)?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(stored)))
}

/// GET the full local view as a flat interchange array
#[utoipa::path(
    get,
    path = "/knowledge-bank/{tenant_id}/export",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to export"),
    ),
    responses(
        (status = 200, description = "Flat array of every local record", body = [knowledge_bank_items::Model]),
    )
)]
pub async fn export(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET knowledge bank export for tenant {tenant_id}");

    let items = SyncApi::export(app_state.pipeline_ref(), &tenant_id);

    Ok(Json(items))
}

/// POST a flat interchange array into the tenant's knowledge bank
///
/// All-or-nothing: if any element lacks an id or a usable summary the whole
/// batch is refused.
#[utoipa::path(
    post,
    path = "/knowledge-bank/{tenant_id}/import",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to import into"),
    ),
    responses(
        (status = 200, description = "Batch accepted", body = ImportResponse),
        (status = 422, description = "Batch refused; local view unchanged"),
    )
)]
pub async fn import(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST knowledge bank import for tenant {tenant_id}");

    let created = SyncApi::import(app_state.pipeline_ref(), &tenant_id, &payload)?;

    Ok(Json(ImportResponse { created }))
}

/// POST a refresh of the local view from the remote knowledge bank
#[utoipa::path(
    post,
    path = "/knowledge-bank/{tenant_id}/refresh",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to refresh"),
    ),
    responses(
        (status = 200, description = "The refreshed local view", body = [knowledge_bank_items::Model]),
        (status = 502, description = "Remote store unreachable or returned a malformed payload"),
    )
)]
pub async fn refresh(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    info!("POST knowledge bank refresh for tenant {tenant_id}");

    let items = SyncApi::refresh(app_state.pipeline_ref(), &tenant_id).await?;

    Ok(Json(items))
}

/// POST a retry-sync pass for writes that failed after approval
#[utoipa::path(
    post,
    path = "/knowledge-bank/{tenant_id}/sync",
    params(
        ApiVersion,
        ("tenant_id" = String, Path, description = "Tenant to sync"),
    ),
    responses(
        (status = 200, description = "Outcome of the retry-sync pass", body = SyncResponse),
    )
)]
pub async fn sync(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    info!("POST knowledge bank sync for tenant {tenant_id}");

    let report = SyncApi::flush_pending(app_state.pipeline_ref(), &tenant_id).await?;

    Ok(Json(SyncResponse {
        synced: report.synced,
        pending: report.pending,
    }))
}
