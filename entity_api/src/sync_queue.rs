//! Records of approved items whose remote persist has not succeeded yet.
//!
//! A failed remote write never rolls back a local approval; instead the item
//! id is parked here until a later sync pass re-attempts the write.

use entity::Id;
use log::*;
use std::collections::HashMap;
use std::sync::RwLock;

/// Per-tenant queue of item ids awaiting a retry-sync to the remote store.
#[derive(Debug, Default)]
pub struct SyncQueue {
    tenants: RwLock<HashMap<String, Vec<Id>>>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks an item id for retry. Enqueuing an id already present is a no-op.
    pub fn enqueue(&self, tenant_id: &str, id: &str) {
        let mut tenants = self.tenants.write().expect("sync queue poisoned");
        let bucket = tenants.entry(tenant_id.to_string()).or_default();
        if !bucket.iter().any(|queued| queued == id) {
            warn!("Recording pending resync for item {id} (tenant {tenant_id})");
            bucket.push(id.to_string());
        }
    }

    /// Takes all pending ids for a tenant, leaving the queue empty. Ids that
    /// still fail should be re-enqueued by the caller.
    pub fn drain(&self, tenant_id: &str) -> Vec<Id> {
        let mut tenants = self.tenants.write().expect("sync queue poisoned");
        tenants.remove(tenant_id).unwrap_or_default()
    }

    /// Snapshot of pending ids without consuming them.
    pub fn pending(&self, tenant_id: &str) -> Vec<Id> {
        let tenants = self.tenants.read().expect("sync queue poisoned");
        tenants.get(tenant_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_deduplicates_ids() {
        let queue = SyncQueue::new();
        queue.enqueue("acme", "call-1");
        queue.enqueue("acme", "call-1");
        assert_eq!(queue.pending("acme"), vec!["call-1".to_string()]);
    }

    #[test]
    fn drain_empties_only_the_given_tenant() {
        let queue = SyncQueue::new();
        queue.enqueue("acme", "call-1");
        queue.enqueue("globex", "call-2");

        assert_eq!(queue.drain("acme"), vec!["call-1".to_string()]);
        assert!(queue.pending("acme").is_empty());
        assert_eq!(queue.pending("globex"), vec!["call-2".to_string()]);
    }
}
