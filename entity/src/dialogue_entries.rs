//! A single attributed line of call dialogue.

use crate::speaker::Speaker;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One line of dialogue within a detailed transcript. Immutable once authored
/// except through an explicit human edit at transcript review time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::dialogue_entries::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub speaker: Speaker,

    /// Offset into the recording, formatted "MM:SS".
    pub timestamp: String,

    pub text: String,
}
