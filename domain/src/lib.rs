//! Core pipeline layer: review item state machine, orchestration of the
//! AI-assisted transcription/summarization flow, knowledge bank access and
//! remote reconciliation.
//!
//! Re-exports the entity modules so that consumers of the `domain` crate do
//! not need to directly depend on the `entity`/`entity_api` crates.

pub use entity_api::{
    dialogue_entries, knowledge_bank_items, rejection_reason, review_items, review_status,
    speaker, summaries, transcripts, Id,
};

// Re-exports from the store layer so `web` can assemble a pipeline without
// depending on `entity_api` directly.
pub use entity_api::knowledge_bank::{InMemoryKnowledgeBank, KnowledgeBank};
pub use entity_api::review_item::ReviewItemStore;
pub use entity_api::sync_queue::SyncQueue;

pub mod error;
pub mod gateway;
pub mod knowledge_bank;
pub mod review_item;
pub mod sync;

use gateway::ai::AiGateway;
use gateway::knowledge_bank::KnowledgeBankClient;
use std::sync::Arc;

/// Shared handles for one running pipeline: the review item store, the local
/// knowledge bank view, the AI gateway and the remote knowledge bank client.
/// Cheap to clone; cloned into every spawned background task.
#[derive(Clone)]
pub struct PipelineContext {
    pub review_items: Arc<ReviewItemStore>,
    pub knowledge_bank: Arc<dyn KnowledgeBank>,
    pub ai: Arc<dyn AiGateway>,
    pub remote: Arc<KnowledgeBankClient>,
    pub resync: Arc<SyncQueue>,
}

impl PipelineContext {
    pub fn new(
        knowledge_bank: Arc<dyn KnowledgeBank>,
        ai: Arc<dyn AiGateway>,
        remote: Arc<KnowledgeBankClient>,
    ) -> Self {
        Self {
            review_items: Arc::new(ReviewItemStore::new()),
            knowledge_bank,
            ai,
            remote,
            resync: Arc::new(SyncQueue::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use entity::summaries::{self, CustomerProfile};
    use entity::transcripts;
    use entity::{dialogue_entries, speaker::Speaker};
    use entity_api::knowledge_bank::InMemoryKnowledgeBank;
    use std::time::Duration;

    /// Builds a context around the given gateway and a remote knowledge bank
    /// rooted at `remote_base` (typically a mockito server URL).
    pub fn context(ai: Arc<dyn AiGateway>, remote_base: &str) -> PipelineContext {
        let remote = Arc::new(
            KnowledgeBankClient::new(remote_base, Duration::from_secs(2))
                .expect("remote client should build"),
        );
        PipelineContext::new(Arc::new(InMemoryKnowledgeBank::new()), ai, remote)
    }

    pub fn two_line_transcript() -> transcripts::Model {
        transcripts::Model {
            confidence_score: 0.9,
            dialogue: vec![
                dialogue_entries::Model {
                    speaker: Speaker::Agent,
                    timestamp: "00:01".to_string(),
                    text: "hi".to_string(),
                },
                dialogue_entries::Model {
                    speaker: Speaker::Customer,
                    timestamp: "00:04".to_string(),
                    text: "my modem is broken".to_string(),
                },
            ],
        }
    }

    pub fn modem_summary() -> summaries::Model {
        summaries::Model {
            customer_profile: CustomerProfile {
                name: "Dana".to_string(),
                account_number: "AC-100".to_string(),
            },
            product_information: "CableCo 500 modem".to_string(),
            problem: "modem broken".to_string(),
            solution: "replaced modem".to_string(),
            resolution: "resolved".to_string(),
        }
    }
}
