use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a review item ended up `Rejected`.
///
/// Callers must be able to distinguish "rejected by a human reviewer" from
/// "rejected because the pipeline failed to generate content", so the reason
/// is recorded explicitly instead of overloading the status.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum RejectionReason {
    /// A human reviewer discarded the item.
    Human,
    /// Transcript generation failed before the item ever became reviewable.
    /// Carries the diagnostic message.
    PipelineFailure(String),
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::Human => write!(fmt, "rejected by reviewer"),
            RejectionReason::PipelineFailure(msg) => write!(fmt, "pipeline failure: {msg}"),
        }
    }
}
