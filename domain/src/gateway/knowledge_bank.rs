//! HTTP client for the remote knowledge bank service.
//!
//! The remote store is untrusted: reads pass through a validation boundary
//! that drops malformed records instead of propagating a corrupted view, and
//! writes carry idempotent semantics (a 200 "already stored" reply is as good
//! as a 201).

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use entity::knowledge_bank_items::Model;
use log::*;
use std::time::Duration;

/// Remote knowledge bank API client
pub struct KnowledgeBankClient {
    client: reqwest::Client,
    base_url: String,
}

impl KnowledgeBankClient {
    /// Create a new client with the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full scan of a tenant's remote records, filtered down to the valid
    /// subset. A record that does not parse as a knowledge bank item, or
    /// whose summary lacks a problem statement, is dropped and counted; the
    /// mismatch is logged rather than surfaced as an error. Only a payload
    /// that is not a JSON array at all fails the whole read.
    pub async fn get(&self, tenant_id: &str) -> Result<Vec<Model>, Error> {
        let url = format!("{}/knowledge-bank/{}", self.base_url, tenant_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to reach knowledge bank at {url}: {e:?}");
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Knowledge bank {url} returned {status}: {error_text}");
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            });
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            warn!("Failed to parse knowledge bank response from {url}: {e:?}");
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::MalformedPayload(
                    "knowledge bank response is not valid JSON".to_string(),
                )),
            }
        })?;

        let records = payload.as_array().ok_or_else(|| {
            warn!("Knowledge bank {url} returned a non-array payload");
            Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::MalformedPayload(
                    "knowledge bank response is not a JSON array".to_string(),
                )),
            }
        })?;

        let items: Vec<Model> = records
            .iter()
            .filter_map(|record| match serde_json::from_value::<Model>(record.clone()) {
                Ok(item) if item.is_wellformed() => Some(item),
                Ok(item) => {
                    debug!("Dropping knowledge bank record {} without a usable summary", item.id);
                    None
                }
                Err(e) => {
                    debug!("Dropping unparseable knowledge bank record: {e}");
                    None
                }
            })
            .collect();

        if items.len() != records.len() {
            warn!(
                "Dropped {} of {} knowledge bank record(s) for tenant {tenant_id} as malformed",
                records.len() - items.len(),
                records.len()
            );
        }

        Ok(items)
    }

    /// Persist one record for a tenant. Returns the stored record and whether
    /// the remote actually created it (`true` for 201) or already had it
    /// (`false` for 200).
    pub async fn put(&self, tenant_id: &str, item: &Model) -> Result<(Model, bool), Error> {
        let url = format!("{}/knowledge-bank/{}", self.base_url, tenant_id);

        let response = self.client.post(&url).json(item).send().await.map_err(|e| {
            warn!("Failed to reach knowledge bank at {url}: {e:?}");
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            let stored: Model = response.json().await.map_err(|e| {
                warn!("Failed to parse knowledge bank response from {url}: {e:?}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::MalformedPayload(
                        "knowledge bank returned an unparseable record".to_string(),
                    )),
                }
            })?;
            let created = status == reqwest::StatusCode::CREATED;
            if created {
                info!("Persisted knowledge bank item {} for tenant {tenant_id}", stored.id);
            } else {
                debug!(
                    "Knowledge bank already held item {} for tenant {tenant_id}",
                    stored.id
                );
            }
            Ok((stored, created))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Knowledge bank {url} returned {status}: {error_text}");
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            })
        }
    }
}
