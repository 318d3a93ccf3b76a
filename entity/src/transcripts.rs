//! Machine-generated detailed transcript of a call recording.

use crate::dialogue_entries;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A detailed transcript as produced by the AI gateway. Produced once, then
/// owned exclusively by its review item until approval; human edits replace
/// individual dialogue entries but never reorder them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::transcripts::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Model confidence in [0.0, 1.0].
    pub confidence_score: f64,

    /// Ordered dialogue lines.
    pub dialogue: Vec<dialogue_entries::Model>,
}

impl Model {
    /// An empty placeholder used while transcript generation is in flight.
    pub fn placeholder() -> Self {
        Self {
            confidence_score: 0.0,
            dialogue: Vec::new(),
        }
    }

    /// The `"Speaker: text"` concatenation, in dialogue order, that is fed to
    /// the summarization model.
    pub fn speaker_lines(&self) -> String {
        self.dialogue
            .iter()
            .map(|entry| format!("{}: {}", entry.speaker, entry.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
