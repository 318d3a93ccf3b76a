//! Reconciliation between the local knowledge bank view and the remote
//! store: pull-on-demand refresh, retry-sync of writes that failed after
//! approval, and flat-file import/export.

use crate::error::Error;
use crate::PipelineContext;
use entity::knowledge_bank_items::Model;
use entity::Id;
use log::*;
use serde::Serialize;

/// Outcome of a retry-sync pass.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Ids confirmed by the remote store during this pass.
    pub synced: Vec<Id>,
    /// Ids still awaiting a successful remote write.
    pub pending: Vec<Id>,
}

/// Pulls the tenant's full remote set through the validating client and
/// atomically replaces the local view with it. Never a partial merge: readers
/// observe either the previous set or the refreshed one.
pub async fn refresh(ctx: &PipelineContext, tenant_id: &str) -> Result<Vec<Model>, Error> {
    let items = ctx.remote.get(tenant_id).await?;
    info!(
        "Refreshed {} knowledge bank record(s) for tenant {tenant_id}",
        items.len()
    );
    ctx.knowledge_bank.replace_all(tenant_id, items.clone());
    Ok(items)
}

/// Re-attempts the remote persist for every approved item whose write failed.
/// Ids that fail again go back on the queue; the local view is never touched.
pub async fn flush_pending(ctx: &PipelineContext, tenant_id: &str) -> Result<SyncReport, Error> {
    let ids = ctx.resync.drain(tenant_id);
    let mut synced = Vec::with_capacity(ids.len());

    for id in ids {
        let record = ctx
            .knowledge_bank
            .get(tenant_id)
            .into_iter()
            .find(|item| item.id == id);

        match record {
            Some(item) => match ctx.remote.put(tenant_id, &item).await {
                Ok(_) => synced.push(id),
                Err(e) => {
                    warn!("Retry-sync failed for item {id} (tenant {tenant_id}): {e:?}");
                    ctx.resync.enqueue(tenant_id, &id);
                }
            },
            None => {
                // The id was parked but the record is gone from the local
                // view (e.g. a refresh replaced it); nothing left to sync.
                warn!("Dropping pending resync for item {id} (tenant {tenant_id}): not in local view");
            }
        }
    }

    Ok(SyncReport {
        synced,
        pending: ctx.resync.pending(tenant_id),
    })
}

/// Serializes the full local view, with no filtering.
pub fn export(ctx: &PipelineContext, tenant_id: &str) -> Vec<Model> {
    ctx.knowledge_bank.get(tenant_id)
}

/// Bulk import of a flat JSON array of knowledge bank items. All-or-nothing:
/// every element must parse and carry an id and a summary with a problem
/// statement, otherwise the whole batch is refused and the local view is
/// unchanged. Accepted items are put idempotently; the count of newly created
/// records is returned.
pub fn import(
    ctx: &PipelineContext,
    tenant_id: &str,
    payload: &serde_json::Value,
) -> Result<usize, Error> {
    let records = payload
        .as_array()
        .ok_or_else(|| Error::validation("import payload must be a JSON array"))?;

    let mut items = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let item: Model = serde_json::from_value(record.clone()).map_err(|e| {
            Error::validation(format!("import record {position} is not a knowledge bank item: {e}"))
        })?;
        if !item.is_wellformed() {
            return Err(Error::validation(format!(
                "import record {position} is missing an id or a usable summary"
            )));
        }
        items.push(item);
    }

    let mut created = 0;
    for item in items {
        if ctx.knowledge_bank.put(tenant_id, item).1 {
            created += 1;
        }
    }

    info!("Imported {created} knowledge bank record(s) for tenant {tenant_id}");
    Ok(created)
}
