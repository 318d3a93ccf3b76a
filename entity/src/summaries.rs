//! AI-generated, human-editable call summary.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Customer identity block extracted from the call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub name: String,
    pub account_number: String,
}

/// A structured summary as produced by the AI gateway from the approved
/// transcript text, subsequently human-editable during summary review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::summaries::Model)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub customer_profile: CustomerProfile,
    pub product_information: String,
    pub problem: String,
    pub solution: String,
    pub resolution: String,
}

impl Model {
    /// A summary is usable downstream only if its `problem` field carries
    /// content. Records failing this check are dropped on read.
    pub fn is_wellformed(&self) -> bool {
        !self.problem.trim().is_empty()
    }
}
