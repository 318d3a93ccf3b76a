//! The immutable, finalized projection of an approved review item.

use crate::{summaries, transcripts, Id};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A finalized knowledge bank record, keyed by `(tenant_id, id)`. Created
/// exactly once per review item approval and never mutated afterwards;
/// corrections require a new record.
///
/// The `summary` field is not optional: a knowledge bank item without a
/// summary must not exist, and remote records violating this are dropped on
/// read rather than propagated to downstream consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::knowledge_bank_items::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Id,

    pub audio_ref: Option<String>,

    pub transcript: transcripts::Model,

    pub summary: summaries::Model,
}

impl Model {
    /// Whether this record is safe to hand to downstream consumers.
    pub fn is_wellformed(&self) -> bool {
        !self.id.trim().is_empty() && self.summary.is_wellformed()
    }
}
