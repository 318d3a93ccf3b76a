//! Extractor enforcing the `x-version` API version header.
//!
//! Endpoints are versioned as a whole: a request must name a version this
//! build still serves, otherwise it is refused before any handler runs.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use log::*;
use service::config::ApiVersion;

pub(crate) struct CompareApiVersion(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ApiVersion::field_name())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("missing {} header", ApiVersion::field_name()),
                )
            })?
            .to_str()
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("invalid {} header", ApiVersion::field_name()),
                )
            })?;

        if ApiVersion::versions().iter().any(|version| *version == header) {
            Ok(CompareApiVersion(header.to_string()))
        } else {
            warn!("Rejecting request with unsupported API version {header}");
            Err((
                StatusCode::BAD_REQUEST,
                format!("unsupported API version {header}"),
            ))
        }
    }
}
