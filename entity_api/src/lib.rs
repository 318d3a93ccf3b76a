pub use entity::{
    dialogue_entries, knowledge_bank_items, rejection_reason, review_items, review_status,
    speaker, summaries, transcripts, Id,
};

pub mod error;
pub mod knowledge_bank;
pub mod review_item;
pub mod sync_queue;
