use serde::Deserialize;
use utoipa::ToSchema;

/// Body of a review item submission.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitParams {
    /// Raw transcript text of the call recording.
    pub(crate) raw_transcript: String,
    /// Opaque URI of the source recording, if any.
    pub(crate) audio_ref: Option<String>,
}
