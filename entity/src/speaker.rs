use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who is talking in a dialogue entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Agent,
    Customer,
    /// Diarization could not attribute the line to either side of the call.
    #[default]
    Unknown,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Agent => write!(fmt, "Agent"),
            Speaker::Customer => write!(fmt, "Customer"),
            Speaker::Unknown => write!(fmt, "Unknown"),
        }
    }
}
