//! A unit of work moving through the transcript → summary → approval pipeline.

use crate::rejection_reason::RejectionReason;
use crate::review_status::ReviewStatus;
use crate::{summaries, transcripts, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An in-flight review item. Created when raw input is submitted, mutated in
/// place by state transitions, never deleted; terminal items stay visible so
/// a reviewer can see why they ended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::review_items::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique per tenant.
    pub id: Id,

    /// Opaque URI of the source recording, if any.
    pub audio_ref: Option<String>,

    pub transcript: transcripts::Model,

    pub status: ReviewStatus,

    /// Present from `PendingSummary` onward.
    pub summary: Option<summaries::Model>,

    /// Set when (and only when) the item is `Rejected`.
    pub rejection_reason: Option<RejectionReason>,

    /// Diagnostic from the most recent failed gateway call; cleared by the
    /// next successful transition.
    pub last_error: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// A fresh placeholder item awaiting its machine transcript.
    pub fn placeholder(id: Id, audio_ref: Option<String>) -> Self {
        Self {
            id,
            audio_ref,
            transcript: transcripts::Model::placeholder(),
            status: ReviewStatus::Summarizing,
            summary: None,
            rejection_reason: None,
            last_error: None,
            created_at: Utc::now(),
        }
    }
}
