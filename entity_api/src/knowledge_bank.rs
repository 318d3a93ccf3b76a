//! Local knowledge bank view: injected store capability plus the in-memory
//! implementation used in production and in tests.

use entity::knowledge_bank_items::Model;
use log::*;
use std::collections::HashMap;
use std::sync::RwLock;

/// Store capability for finalized knowledge bank records, keyed by tenant.
/// Injected so the persistence backend is swappable and testable via a fake.
pub trait KnowledgeBank: Send + Sync {
    /// Full scan of a tenant's records. A missing tenant bucket is "empty",
    /// not an error.
    fn get(&self, tenant_id: &str) -> Vec<Model>;

    /// Idempotent insert on `item.id`. If a record with the same id already
    /// exists for the tenant the call is a no-op returning the existing
    /// record and `false`; otherwise the item is stored and `true` returned.
    fn put(&self, tenant_id: &str, item: Model) -> (Model, bool);

    /// Atomically replaces the tenant's entire local view. Never a partial
    /// merge: readers see either the old set or the new set.
    fn replace_all(&self, tenant_id: &str, items: Vec<Model>);
}

/// In-memory knowledge bank, insertion-ordered per tenant.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBank {
    tenants: RwLock<HashMap<String, Vec<Model>>>,
}

impl InMemoryKnowledgeBank {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KnowledgeBank for InMemoryKnowledgeBank {
    fn get(&self, tenant_id: &str) -> Vec<Model> {
        let tenants = self.tenants.read().expect("knowledge bank poisoned");
        tenants.get(tenant_id).cloned().unwrap_or_default()
    }

    fn put(&self, tenant_id: &str, item: Model) -> (Model, bool) {
        let mut tenants = self.tenants.write().expect("knowledge bank poisoned");
        let bucket = tenants.entry(tenant_id.to_string()).or_default();

        if let Some(existing) = bucket.iter().find(|stored| stored.id == item.id) {
            debug!(
                "Idempotent put for existing knowledge bank item {} (tenant {tenant_id})",
                item.id
            );
            return (existing.clone(), false);
        }

        bucket.push(item.clone());
        (item, true)
    }

    fn replace_all(&self, tenant_id: &str, items: Vec<Model>) {
        let mut tenants = self.tenants.write().expect("knowledge bank poisoned");
        debug!(
            "Replacing local knowledge bank view for tenant {tenant_id} with {} record(s)",
            items.len()
        );
        tenants.insert(tenant_id.to_string(), items);
    }
}
