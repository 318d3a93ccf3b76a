//! Local knowledge bank operations exposed to the web layer.

use crate::error::Error;
use crate::PipelineContext;
use entity::knowledge_bank_items::Model;
use log::*;

/// Full scan of the tenant's local view. An unseeded tenant is an empty
/// collection, never an error.
pub fn find_by_tenant(ctx: &PipelineContext, tenant_id: &str) -> Vec<Model> {
    ctx.knowledge_bank.get(tenant_id)
}

/// Idempotent insert into the tenant's local view. Returns the stored record
/// and whether this call created it. A record without a usable summary never
/// enters the bank.
pub fn create(ctx: &PipelineContext, tenant_id: &str, item: Model) -> Result<(Model, bool), Error> {
    if !item.is_wellformed() {
        return Err(Error::validation(
            "knowledge bank items require an id and a summary with a problem statement",
        ));
    }

    let (stored, created) = ctx.knowledge_bank.put(tenant_id, item);
    if created {
        debug!("Stored knowledge bank item {} for tenant {tenant_id}", stored.id);
    }
    Ok((stored, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ai::MockAiGateway;
    use crate::test_support::{context, modem_summary};
    use entity::transcripts;
    use std::sync::Arc;

    fn bank_item(id: &str) -> Model {
        Model {
            id: id.to_string(),
            audio_ref: None,
            transcript: transcripts::Model::placeholder(),
            summary: modem_summary(),
        }
    }

    #[tokio::test]
    async fn create_is_idempotent_and_scoped() {
        let server = mockito::Server::new_async().await;
        let ctx = context(Arc::new(MockAiGateway::new()), &server.url());

        let (first, created) = create(&ctx, "acme", bank_item("call-1")).unwrap();
        assert!(created);
        let (second, created_again) = create(&ctx, "acme", bank_item("call-1")).unwrap();
        assert!(!created_again);
        assert_eq!(first, second);

        assert!(find_by_tenant(&ctx, "globex").is_empty());
    }

    #[tokio::test]
    async fn create_refuses_summaryless_records() {
        let server = mockito::Server::new_async().await;
        let ctx = context(Arc::new(MockAiGateway::new()), &server.url());

        let mut item = bank_item("call-1");
        item.summary.problem = String::new();
        assert!(create(&ctx, "acme", item).is_err());
        assert!(find_by_tenant(&ctx, "acme").is_empty());
    }
}
