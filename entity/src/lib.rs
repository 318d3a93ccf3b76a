// Core entities
pub mod dialogue_entries;
pub mod knowledge_bank_items;
pub mod rejection_reason;
pub mod review_items;
pub mod review_status;
pub mod speaker;
pub mod summaries;
pub mod transcripts;

/// A type alias that represents any Entity's internal id field data type.
/// Review item and knowledge bank ids are caller-assigned strings, unique per
/// tenant. Aliased so that it's easy to change the underlying type if necessary.
pub type Id = String;
