//! Pipeline orchestration for review items.
//!
//! Public operations are synchronous: every local state transition is applied
//! atomically under the store lock before the caller gets its answer, and the
//! AI gateway / remote persistence work is spawned onto the runtime. A
//! spawned completion carries the revision it was started from, so a result
//! arriving after the item has moved on is discarded instead of applied.

use crate::error::Error;
use crate::PipelineContext;
use entity::rejection_reason::RejectionReason;
use entity::review_items::Model;
use entity::review_status::ReviewStatus;
use entity::speaker::Speaker;
use entity::{dialogue_entries, summaries, transcripts, Id};
use log::*;
use uuid::Uuid;

/// Registers raw call input and kicks off transcript generation without
/// blocking the caller. The returned id identifies the placeholder item,
/// which sits in `Summarizing` until the gateway answers.
pub fn submit(
    ctx: &PipelineContext,
    tenant_id: &str,
    raw_transcript: String,
    audio_ref: Option<String>,
) -> Result<Id, Error> {
    if raw_transcript.trim().is_empty() {
        return Err(Error::validation("raw transcript must not be empty"));
    }

    let id = Uuid::new_v4().to_string();
    let (_, revision) = ctx
        .review_items
        .create(tenant_id, Model::placeholder(id.clone(), audio_ref))?;

    info!("Submitted review item {id} for tenant {tenant_id}");

    let task_ctx = ctx.clone();
    let task_tenant = tenant_id.to_string();
    let task_id = id.clone();
    tokio::spawn(async move {
        run_transcript_generation(task_ctx, task_tenant, task_id, revision, raw_transcript).await;
    });

    Ok(id)
}

/// Accepts the human-edited transcript and kicks off summarization. Valid
/// only from `PendingTranscript`; an item with a gateway call already in
/// flight fails fast with an invalid-transition error.
pub fn approve_transcript(
    ctx: &PipelineContext,
    tenant_id: &str,
    id: &str,
    edited: transcripts::Model,
) -> Result<Model, Error> {
    let current = ctx.review_items.find_by_id(tenant_id, id)?;
    if current.status == ReviewStatus::PendingTranscript {
        validate_edited_dialogue(&current.transcript, &edited)?;
    }

    let (model, revision) = ctx.review_items.transition(
        tenant_id,
        id,
        &[ReviewStatus::PendingTranscript],
        |item| {
            item.transcript = edited;
            item.status = ReviewStatus::Summarizing;
            item.last_error = None;
        },
    )?;

    info!("Transcript approved for review item {id} (tenant {tenant_id}); summarizing");

    let transcript_text = model.transcript.speaker_lines();
    let task_ctx = ctx.clone();
    let task_tenant = tenant_id.to_string();
    let task_id = id.to_string();
    tokio::spawn(async move {
        run_summarization(task_ctx, task_tenant, task_id, revision, transcript_text).await;
    });

    Ok(model)
}

/// Accepts the human-edited summary, commits the finalized record to the
/// local knowledge bank optimistically, and persists it to the remote store
/// in the background. The approval is final: a remote failure is recorded as
/// pending-resync, never rolled back.
pub fn approve_summary(
    ctx: &PipelineContext,
    tenant_id: &str,
    id: &str,
    edited: summaries::Model,
) -> Result<Model, Error> {
    if !edited.is_wellformed() {
        return Err(Error::validation(
            "summary must include a problem statement",
        ));
    }

    let (model, _) = ctx.review_items.transition(
        tenant_id,
        id,
        &[ReviewStatus::PendingSummary],
        |item| {
            item.summary = Some(edited.clone());
            item.status = ReviewStatus::Approved;
            item.last_error = None;
        },
    )?;

    let bank_item = entity::knowledge_bank_items::Model {
        id: model.id.clone(),
        audio_ref: model.audio_ref.clone(),
        transcript: model.transcript.clone(),
        summary: edited,
    };

    // Phase 1: synchronous local apply, visible immediately.
    ctx.knowledge_bank.put(tenant_id, bank_item.clone());
    info!("Approved review item {id} into the knowledge bank (tenant {tenant_id})");

    // Phase 2: asynchronous remote confirmation.
    let task_ctx = ctx.clone();
    let task_tenant = tenant_id.to_string();
    tokio::spawn(async move {
        run_remote_persist(task_ctx, task_tenant, bank_item).await;
    });

    Ok(model)
}

/// Human rejection. Valid only from the two reviewable states; terminal
/// items and items with a gateway call in flight are refused.
pub fn reject(ctx: &PipelineContext, tenant_id: &str, id: &str) -> Result<Model, Error> {
    let (model, _) = ctx.review_items.transition(
        tenant_id,
        id,
        &[ReviewStatus::PendingTranscript, ReviewStatus::PendingSummary],
        |item| {
            item.status = ReviewStatus::Rejected;
            item.rejection_reason = Some(RejectionReason::Human);
        },
    )?;

    info!("Review item {id} rejected by reviewer (tenant {tenant_id})");
    Ok(model)
}

/// Snapshot of the tenant's review items, newest first.
pub fn list(ctx: &PipelineContext, tenant_id: &str) -> Vec<Model> {
    ctx.review_items.list(tenant_id)
}

pub fn find_by_id(ctx: &PipelineContext, tenant_id: &str, id: &str) -> Result<Model, Error> {
    Ok(ctx.review_items.find_by_id(tenant_id, id)?)
}

/// Human edits replace individual dialogue entries but never add, remove or
/// reorder them: the edited dialogue must line up entry-for-entry with the
/// machine transcript.
fn validate_edited_dialogue(
    machine: &transcripts::Model,
    edited: &transcripts::Model,
) -> Result<(), Error> {
    if edited.dialogue.len() != machine.dialogue.len() {
        return Err(Error::validation(format!(
            "edited transcript has {} dialogue entries, expected {}",
            edited.dialogue.len(),
            machine.dialogue.len()
        )));
    }

    for (position, (edited_entry, machine_entry)) in
        edited.dialogue.iter().zip(machine.dialogue.iter()).enumerate()
    {
        if edited_entry.timestamp != machine_entry.timestamp {
            return Err(Error::validation(format!(
                "dialogue entry {position} changed timestamp from {} to {}; entries cannot be reordered",
                machine_entry.timestamp, edited_entry.timestamp
            )));
        }
    }

    Ok(())
}

async fn run_transcript_generation(
    ctx: PipelineContext,
    tenant_id: String,
    id: Id,
    revision: u64,
    raw_transcript: String,
) {
    match ctx.ai.generate_detailed_transcript(&raw_transcript).await {
        Ok(transcript) => {
            let applied = ctx.review_items.resolve(
                &tenant_id,
                &id,
                revision,
                ReviewStatus::Summarizing,
                |item| {
                    item.transcript = transcript;
                    item.status = ReviewStatus::PendingTranscript;
                    item.last_error = None;
                },
            );
            if applied.is_some() {
                info!("Review item {id} is ready for transcript review (tenant {tenant_id})");
            }
        }
        Err(e) => {
            warn!("Transcript generation failed for item {id} (tenant {tenant_id}): {e:?}");
            let message = format!("Transcript generation failed: {}", describe(&e));
            ctx.review_items.resolve(
                &tenant_id,
                &id,
                revision,
                ReviewStatus::Summarizing,
                |item| {
                    item.status = ReviewStatus::Rejected;
                    item.rejection_reason =
                        Some(RejectionReason::PipelineFailure(message.clone()));
                    // Leave the failure in the item content so a reviewer sees
                    // what happened, not just a bare terminal status.
                    item.transcript.dialogue.push(dialogue_entries::Model {
                        speaker: Speaker::Unknown,
                        timestamp: "00:00".to_string(),
                        text: message.clone(),
                    });
                    item.last_error = Some(message.clone());
                },
            );
        }
    }
}

async fn run_summarization(
    ctx: PipelineContext,
    tenant_id: String,
    id: Id,
    revision: u64,
    transcript_text: String,
) {
    match ctx.ai.summarize(&transcript_text).await {
        Ok(summary) => {
            let applied = ctx.review_items.resolve(
                &tenant_id,
                &id,
                revision,
                ReviewStatus::Summarizing,
                |item| {
                    item.summary = Some(summary);
                    item.status = ReviewStatus::PendingSummary;
                    item.last_error = None;
                },
            );
            if applied.is_some() {
                info!("Review item {id} is ready for summary review (tenant {tenant_id})");
            }
        }
        Err(e) => {
            warn!("Summarization failed for item {id} (tenant {tenant_id}): {e:?}");
            let message = format!("Summarization failed: {}", describe(&e));
            // The edited transcript is retained; only the status reverts.
            ctx.review_items.resolve(
                &tenant_id,
                &id,
                revision,
                ReviewStatus::Summarizing,
                |item| {
                    item.status = ReviewStatus::PendingTranscript;
                    item.last_error = Some(message.clone());
                },
            );
        }
    }
}

async fn run_remote_persist(
    ctx: PipelineContext,
    tenant_id: String,
    item: entity::knowledge_bank_items::Model,
) {
    match ctx.remote.put(&tenant_id, &item).await {
        Ok(_) => {
            debug!("Remote knowledge bank confirmed item {} (tenant {tenant_id})", item.id);
        }
        Err(e) => {
            // The human approval is authoritative: the local view keeps the
            // record and the id is parked for a later retry-sync.
            warn!(
                "Remote persist failed for approved item {} (tenant {tenant_id}): {e:?}",
                item.id
            );
            ctx.resync.enqueue(&tenant_id, &item.id);
        }
    }
}

fn describe(error: &Error) -> String {
    match &error.error_kind {
        crate::error::DomainErrorKind::External(crate::error::ExternalErrorKind::Gateway(msg)) => {
            msg.clone()
        }
        crate::error::DomainErrorKind::External(crate::error::ExternalErrorKind::Network) => {
            "gateway unreachable".to_string()
        }
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind, StoreErrorKind};
    use crate::gateway::ai::{AiGateway, MockAiGateway};
    use crate::test_support::{context, modem_summary, two_line_transcript};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn assert_invalid_transition(error: Error) {
        assert_eq!(
            error.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Store(StoreErrorKind::InvalidTransition))
        );
    }

    async fn wait_for(
        ctx: &crate::PipelineContext,
        tenant_id: &str,
        id: &str,
        pred: impl Fn(&Model) -> bool,
    ) -> Model {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(item) = find_by_id(ctx, tenant_id, id) {
                    if pred(&item) {
                        return item;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for review item state")
    }

    fn happy_gateway() -> Arc<MockAiGateway> {
        let mut ai = MockAiGateway::new();
        ai.expect_generate_detailed_transcript()
            .returning(|_| Ok(two_line_transcript()));
        ai.expect_summarize().returning(|_| Ok(modem_summary()));
        Arc::new(ai)
    }

    /// Gateway whose summarize call blocks until released, so tests can
    /// observe the item while its async call is in flight.
    struct GatedGateway {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AiGateway for GatedGateway {
        async fn generate_detailed_transcript(
            &self,
            _raw_transcript: &str,
        ) -> Result<transcripts::Model, Error> {
            Ok(two_line_transcript())
        }

        async fn summarize(&self, _transcript_text: &str) -> Result<summaries::Model, Error> {
            self.gate.notified().await;
            Ok(modem_summary())
        }
    }

    #[tokio::test]
    async fn full_pipeline_reaches_the_knowledge_bank() {
        let mut server = mockito::Server::new_async().await;
        let stored_body = serde_json::to_string(&entity::knowledge_bank_items::Model {
            id: "call-1".to_string(),
            audio_ref: None,
            transcript: two_line_transcript(),
            summary: modem_summary(),
        })
        .unwrap();
        let remote_mock = server
            .mock("POST", "/knowledge-bank/acme")
            .with_status(201)
            .with_body(stored_body)
            .create_async()
            .await;

        let ctx = context(happy_gateway(), &server.url());

        let id = submit(
            &ctx,
            "acme",
            "Agent: hi. Customer: my modem is broken.".to_string(),
            Some("s3://calls/42.wav".to_string()),
        )
        .unwrap();

        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingTranscript
        })
        .await;
        assert_eq!(item.transcript.confidence_score, 0.9);
        assert_eq!(item.transcript.dialogue.len(), 2);

        let mut edited = item.transcript.clone();
        edited.dialogue[1].text = "my modem is broken again".to_string();
        let in_flight = approve_transcript(&ctx, "acme", &id, edited).unwrap();
        assert_eq!(in_flight.status, ReviewStatus::Summarizing);

        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingSummary
        })
        .await;
        let summary = item.summary.clone().unwrap();
        assert_eq!(summary.problem, "modem broken");

        let approved = approve_summary(&ctx, "acme", &id, summary).unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);
        // The edit survived approval into the finalized record.
        let records = ctx.knowledge_bank.get("acme");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(
            records[0].transcript.dialogue[1].text,
            "my modem is broken again"
        );

        // The remote persist happens in the background; wait for it.
        tokio::time::timeout(Duration::from_secs(5), async {
            while !remote_mock.matched_async().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("remote persist never happened");
        assert!(ctx.resync.pending("acme").is_empty());
    }

    #[tokio::test]
    async fn failed_generation_rejects_with_visible_diagnostic() {
        let mut ai = MockAiGateway::new();
        ai.expect_generate_detailed_transcript()
            .returning(|_| Err(Error::gateway("stt backend down")));
        let server = mockito::Server::new_async().await;
        let ctx = context(Arc::new(ai), &server.url());

        let id = submit(&ctx, "acme", "Agent: hi.".to_string(), None).unwrap();

        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::Rejected
        })
        .await;

        match item.rejection_reason {
            Some(RejectionReason::PipelineFailure(ref msg)) => {
                assert!(msg.contains("stt backend down"))
            }
            other => panic!("expected pipeline failure reason, got {other:?}"),
        }
        // The diagnostic is embedded in the item content, not just the status.
        assert!(item
            .transcript
            .dialogue
            .iter()
            .any(|entry| entry.text.contains("stt backend down")));
    }

    #[tokio::test]
    async fn failed_summarization_reverts_and_keeps_the_edit() {
        let mut ai = MockAiGateway::new();
        ai.expect_generate_detailed_transcript()
            .returning(|_| Ok(two_line_transcript()));
        ai.expect_summarize()
            .returning(|_| Err(Error::gateway("analysis model overloaded")));
        let server = mockito::Server::new_async().await;
        let ctx = context(Arc::new(ai), &server.url());

        let id = submit(&ctx, "acme", "Agent: hi.".to_string(), None).unwrap();
        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingTranscript
        })
        .await;

        let mut edited = item.transcript.clone();
        edited.dialogue[0].text = "hello there".to_string();
        approve_transcript(&ctx, "acme", &id, edited).unwrap();

        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingTranscript && item.last_error.is_some()
        })
        .await;

        assert!(item.last_error.unwrap().contains("analysis model overloaded"));
        assert_eq!(item.transcript.dialogue[0].text, "hello there");
        assert!(item.summary.is_none());
    }

    #[tokio::test]
    async fn operations_fail_fast_while_a_gateway_call_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let ai = Arc::new(GatedGateway { gate: gate.clone() });
        let server = mockito::Server::new_async().await;
        let ctx = context(ai, &server.url());

        let id = submit(&ctx, "acme", "Agent: hi.".to_string(), None).unwrap();
        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingTranscript
        })
        .await;

        approve_transcript(&ctx, "acme", &id, item.transcript.clone()).unwrap();

        // The summarize call is now parked on the gate: the item is busy.
        assert_invalid_transition(
            approve_transcript(&ctx, "acme", &id, item.transcript.clone()).unwrap_err(),
        );
        assert_invalid_transition(reject(&ctx, "acme", &id).unwrap_err());
        assert_invalid_transition(
            approve_summary(&ctx, "acme", &id, modem_summary()).unwrap_err(),
        );

        gate.notify_one();
        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingSummary
        })
        .await;

        let rejected = reject(&ctx, "acme", &id).unwrap();
        assert_eq!(rejected.status, ReviewStatus::Rejected);
        assert_eq!(rejected.rejection_reason, Some(RejectionReason::Human));
        assert!(item.summary.is_some());

        // Terminal: nothing else is legal.
        assert_invalid_transition(
            approve_summary(&ctx, "acme", &id, modem_summary()).unwrap_err(),
        );
        assert_invalid_transition(reject(&ctx, "acme", &id).unwrap_err());
    }

    #[tokio::test]
    async fn remote_failure_never_rolls_back_an_approval() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/knowledge-bank/acme")
            .with_status(500)
            .with_body("storage offline")
            .create_async()
            .await;

        let ctx = context(happy_gateway(), &server.url());

        let id = submit(&ctx, "acme", "Agent: hi.".to_string(), None).unwrap();
        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingTranscript
        })
        .await;
        approve_transcript(&ctx, "acme", &id, item.transcript).unwrap();
        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingSummary
        })
        .await;

        let approved = approve_summary(&ctx, "acme", &id, item.summary.unwrap()).unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);

        // The failed write parks the id for resync without touching the
        // local state.
        tokio::time::timeout(Duration::from_secs(5), async {
            while ctx.resync.pending("acme").is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("remote failure was never recorded");

        assert_eq!(ctx.resync.pending("acme"), vec![id.clone()]);
        assert_eq!(
            find_by_id(&ctx, "acme", &id).unwrap().status,
            ReviewStatus::Approved
        );
        assert_eq!(ctx.knowledge_bank.get("acme").len(), 1);
    }

    #[tokio::test]
    async fn edited_transcript_must_line_up_with_the_machine_transcript() {
        let server = mockito::Server::new_async().await;
        let ctx = context(happy_gateway(), &server.url());

        let id = submit(&ctx, "acme", "Agent: hi.".to_string(), None).unwrap();
        let item = wait_for(&ctx, "acme", &id, |item| {
            item.status == ReviewStatus::PendingTranscript
        })
        .await;

        // Dropping an entry is not an edit.
        let mut truncated = item.transcript.clone();
        truncated.dialogue.pop();
        let error = approve_transcript(&ctx, "acme", &id, truncated).unwrap_err();
        assert_eq!(
            error.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Store(StoreErrorKind::Validation))
        );

        // Swapping entries is not an edit either.
        let mut reordered = item.transcript.clone();
        reordered.dialogue.swap(0, 1);
        assert!(approve_transcript(&ctx, "acme", &id, reordered).is_err());

        // The item is untouched by the failed attempts.
        assert_eq!(
            find_by_id(&ctx, "acme", &id).unwrap().status,
            ReviewStatus::PendingTranscript
        );
    }

    #[tokio::test]
    async fn submit_rejects_blank_input() {
        let server = mockito::Server::new_async().await;
        let ctx = context(Arc::new(MockAiGateway::new()), &server.url());

        assert!(submit(&ctx, "acme", "   ".to_string(), None).is_err());
        assert!(list(&ctx, "acme").is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_tenant_scoped() {
        let server = mockito::Server::new_async().await;
        let ctx = context(happy_gateway(), &server.url());

        let first = submit(&ctx, "acme", "Agent: one.".to_string(), None).unwrap();
        let second = submit(&ctx, "acme", "Agent: two.".to_string(), None).unwrap();
        submit(&ctx, "globex", "Agent: three.".to_string(), None).unwrap();

        let items = list(&ctx, "acme");
        assert_eq!(items.len(), 2);
        assert!(items.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(items.iter().any(|item| item.id == first));
        assert!(items.iter().any(|item| item.id == second));
    }
}
