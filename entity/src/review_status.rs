use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a review item through its lifecycle.
///
/// `Summarizing` is the single "AI gateway call outstanding" state and covers
/// both transcript generation (right after submit) and summarization (right
/// after transcript approval). An item in `Summarizing` accepts no operations.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ReviewStatus {
    /// Awaiting human review of a machine-generated transcript.
    PendingTranscript,
    /// An asynchronous AI gateway call is in flight.
    #[default]
    Summarizing,
    /// Awaiting human review of a machine-generated summary.
    PendingSummary,
    /// Terminal: the item was approved and committed to the knowledge bank.
    Approved,
    /// Terminal: the item was rejected by a human or by a pipeline failure.
    Rejected,
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::PendingTranscript => write!(fmt, "pendingTranscript"),
            ReviewStatus::Summarizing => write!(fmt, "summarizing"),
            ReviewStatus::PendingSummary => write!(fmt, "pendingSummary"),
            ReviewStatus::Approved => write!(fmt, "approved"),
            ReviewStatus::Rejected => write!(fmt, "rejected"),
        }
    }
}
