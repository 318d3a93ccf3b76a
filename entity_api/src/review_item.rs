//! In-memory store for in-flight review items.
//!
//! Items are partitioned per tenant and keyed by id. Every stored item
//! carries a revision counter that is bumped on each applied transition;
//! asynchronous completions present the revision they were spawned with and
//! are discarded if the item has moved since. All mutation happens
//! synchronously under the store lock; no lock is held across an `.await`.

use super::error::Error;
use entity::review_items::Model;
use entity::review_status::ReviewStatus;
use entity::Id;
use log::*;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug)]
struct StoredItem {
    model: Model,
    revision: u64,
}

/// Per-tenant collection of review items tracked through the state machine.
#[derive(Debug, Default)]
pub struct ReviewItemStore {
    tenants: RwLock<HashMap<String, HashMap<Id, StoredItem>>>,
}

impl ReviewItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new item and returns it with its initial revision.
    /// The id must be unique within the tenant.
    pub fn create(&self, tenant_id: &str, model: Model) -> Result<(Model, u64), Error> {
        debug!("Creating review item {} for tenant {tenant_id}", model.id);

        let mut tenants = self.tenants.write().expect("review item store poisoned");
        let bucket = tenants.entry(tenant_id.to_string()).or_default();

        if bucket.contains_key(&model.id) {
            return Err(Error::validation(format!(
                "review item id {} already exists for tenant {tenant_id}",
                model.id
            )));
        }

        let stored = StoredItem {
            model: model.clone(),
            revision: 0,
        };
        bucket.insert(model.id.clone(), stored);

        Ok((model, 0))
    }

    pub fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Model, Error> {
        let tenants = self.tenants.read().expect("review item store poisoned");
        tenants
            .get(tenant_id)
            .and_then(|bucket| bucket.get(id))
            .map(|stored| stored.model.clone())
            .ok_or_else(Error::record_not_found)
    }

    /// Snapshot of all items for a tenant, newest first. A missing tenant
    /// bucket is treated as empty, not an error.
    pub fn list(&self, tenant_id: &str) -> Vec<Model> {
        let tenants = self.tenants.read().expect("review item store poisoned");
        let mut items: Vec<Model> = tenants
            .get(tenant_id)
            .map(|bucket| bucket.values().map(|stored| stored.model.clone()).collect())
            .unwrap_or_default();

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }

    /// Applies a synchronous state transition, guarded by the set of legal
    /// source states. An item whose current status is not in `from` (notably
    /// one in `Summarizing`, i.e. with an async operation in flight) fails
    /// fast with `InvalidStateTransition` and is left unchanged.
    ///
    /// Returns the updated item and its new revision.
    pub fn transition<F>(
        &self,
        tenant_id: &str,
        id: &str,
        from: &[ReviewStatus],
        mutate: F,
    ) -> Result<(Model, u64), Error>
    where
        F: FnOnce(&mut Model),
    {
        let mut tenants = self.tenants.write().expect("review item store poisoned");
        let stored = tenants
            .get_mut(tenant_id)
            .and_then(|bucket| bucket.get_mut(id))
            .ok_or_else(Error::record_not_found)?;

        if !from.contains(&stored.model.status) {
            debug!(
                "Rejecting transition for item {id}: status {} not in {:?}",
                stored.model.status, from
            );
            return Err(Error::invalid_state_transition());
        }

        mutate(&mut stored.model);
        stored.revision += 1;

        Ok((stored.model.clone(), stored.revision))
    }

    /// Applies the result of an asynchronous completion. The completion must
    /// present the revision it observed when it was spawned and the in-flight
    /// status it expects to resolve; if the item has since moved (superseded,
    /// rejected, or already resolved) the completion is discarded and
    /// `None` is returned. A discarded completion never resurrects a
    /// terminal item.
    pub fn resolve<F>(
        &self,
        tenant_id: &str,
        id: &str,
        expected_revision: u64,
        expected_status: ReviewStatus,
        mutate: F,
    ) -> Option<Model>
    where
        F: FnOnce(&mut Model),
    {
        let mut tenants = self.tenants.write().expect("review item store poisoned");
        let stored = match tenants.get_mut(tenant_id).and_then(|bucket| bucket.get_mut(id)) {
            Some(stored) => stored,
            None => {
                warn!("Discarding async completion for unknown item {id} (tenant {tenant_id})");
                return None;
            }
        };

        if stored.revision != expected_revision || stored.model.status != expected_status {
            debug!(
                "Discarding superseded completion for item {id}: revision {} (expected {}), status {}",
                stored.revision, expected_revision, stored.model.status
            );
            return None;
        }

        mutate(&mut stored.model);
        stored.revision += 1;

        Some(stored.model.clone())
    }
}
