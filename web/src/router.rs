use crate::controller::health_check_controller;
use crate::params;
use crate::AppState;
use axum::http::HeaderValue;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::controller::{knowledge_bank_controller, review_item_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "CallBank API"
        ),
        paths(
            review_item_controller::submit,
            review_item_controller::index,
            review_item_controller::read,
            review_item_controller::approve_transcript,
            review_item_controller::approve_summary,
            review_item_controller::reject,
            knowledge_bank_controller::index,
            knowledge_bank_controller::create,
            knowledge_bank_controller::export,
            knowledge_bank_controller::import,
            knowledge_bank_controller::refresh,
            knowledge_bank_controller::sync,
        ),
        components(
            schemas(
                domain::dialogue_entries::Model,
                domain::knowledge_bank_items::Model,
                domain::rejection_reason::RejectionReason,
                domain::review_items::Model,
                domain::review_status::ReviewStatus,
                domain::speaker::Speaker,
                domain::summaries::CustomerProfile,
                domain::summaries::Model,
                domain::transcripts::Model,
                params::review_item::SubmitParams,
                review_item_controller::SubmitResponse,
                knowledge_bank_controller::ImportResponse,
                knowledge_bank_controller::SyncResponse,
            )
        ),
        tags(
            (name = "callbank", description = "Call review pipeline & tenant knowledge bank API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(review_item_routes(app_state.clone()))
        .merge(knowledge_bank_routes(app_state.clone()))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors_layer(&app_state))
}

fn review_item_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/review-items/:tenant_id",
            post(review_item_controller::submit),
        )
        .route(
            "/review-items/:tenant_id",
            get(review_item_controller::index),
        )
        .route(
            "/review-items/:tenant_id/:id",
            get(review_item_controller::read),
        )
        .route(
            "/review-items/:tenant_id/:id/transcript",
            put(review_item_controller::approve_transcript),
        )
        .route(
            "/review-items/:tenant_id/:id/summary",
            put(review_item_controller::approve_summary),
        )
        .route(
            "/review-items/:tenant_id/:id/reject",
            put(review_item_controller::reject),
        )
        .with_state(app_state)
}

fn knowledge_bank_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/knowledge-bank/:tenant_id",
            get(knowledge_bank_controller::index),
        )
        .route(
            "/knowledge-bank/:tenant_id",
            post(knowledge_bank_controller::create),
        )
        .route(
            "/knowledge-bank/:tenant_id/export",
            get(knowledge_bank_controller::export),
        )
        .route(
            "/knowledge-bank/:tenant_id/import",
            post(knowledge_bank_controller::import),
        )
        .route(
            "/knowledge-bank/:tenant_id/refresh",
            post(knowledge_bank_controller::refresh),
        )
        .route(
            "/knowledge-bank/:tenant_id/sync",
            post(knowledge_bank_controller::sync),
        )
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
