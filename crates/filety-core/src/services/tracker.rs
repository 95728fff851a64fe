//! Cached usage records
//!
//! Holds the last known anonymous identity and user, and refreshes them
//! from the server on demand. Refreshes may run in the background; the
//! records are replaced piecewise so a partial failure keeps the older
//! value of the part that failed.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::identity_store::IdentityStore;
use super::usage::UsageSnapshot;
use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{AnonymousIdentity, AuthenticatedUser};

/// Last known quota records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageRecords {
    pub anon: Option<AnonymousIdentity>,
    pub user: Option<AuthenticatedUser>,
}

impl UsageRecords {
    pub fn snapshot(&self) -> Option<UsageSnapshot> {
        UsageSnapshot::compute(self.anon.as_ref(), self.user.as_ref())
    }
}

#[derive(Clone)]
pub struct UsageTracker {
    client: ApiClient,
    store: Arc<dyn IdentityStore>,
    records: Arc<RwLock<UsageRecords>>,
}

impl UsageTracker {
    pub fn new(client: ApiClient, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            client,
            store,
            records: Arc::new(RwLock::new(UsageRecords::default())),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn records(&self) -> UsageRecords {
        self.records.read().await.clone()
    }

    pub async fn snapshot(&self) -> Option<UsageSnapshot> {
        self.records.read().await.snapshot()
    }

    /// Id of the cached identity, falling back to the persisted one
    pub async fn anon_id(&self) -> Option<String> {
        if let Some(anon) = &self.records.read().await.anon {
            return Some(anon.id.clone());
        }
        self.stored_id()
    }

    /// Refetch both records from the server
    ///
    /// Each part that succeeds replaces its cached value. The first
    /// failure is returned after both parts were attempted.
    pub async fn refresh(&self) -> Result<UsageRecords> {
        let mut first_error = None;

        let existing = self.stored_id();
        match self.client.establish_anonymous(existing.as_deref()).await {
            Ok(identity) => {
                if existing.as_deref() != Some(identity.id.as_str()) {
                    if let Err(e) = self.store.save(&identity.id) {
                        log::warn!("[usage] Could not persist anonymous id: {}", e);
                    }
                }
                self.records.write().await.anon = Some(identity);
            }
            Err(e) => first_error = Some(e),
        }

        if self.client.is_authenticated().await {
            match self.client.try_current_user().await {
                Ok(user) => self.records.write().await.user = user,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        } else {
            self.records.write().await.user = None;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(self.records().await),
        }
    }

    /// Refresh in a detached task; failures are only logged
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            if let Err(e) = tracker.refresh().await {
                log::warn!("[usage] Background usage refresh failed: {}", e);
            }
        })
    }

    /// Forget the cached user, e.g. after a logout
    pub async fn clear_user(&self) {
        self.records.write().await.user = None;
    }

    fn stored_id(&self) -> Option<String> {
        match self.store.load() {
            Ok(id) => id,
            Err(e) => {
                log::warn!("[usage] Could not read stored anonymous id: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_empty_records_have_no_snapshot() {
        assert!(UsageRecords::default().snapshot().is_none());
    }

    #[test]
    fn test_records_snapshot() {
        let records = UsageRecords {
            anon: Some(AnonymousIdentity {
                id: "a".to_string(),
                created_at: Utc::now(),
                used_seconds: 120,
                limit_seconds: 600,
            }),
            user: None,
        };
        let snapshot = records.snapshot().unwrap();
        assert_eq!(snapshot.remaining_seconds, Some(480));
    }
}
