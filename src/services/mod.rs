//! Business logic services

pub mod auth;
pub mod records;

use std::sync::Arc;

use tracing::warn;

use crate::{persistence::SnapshotStore, repository::Repository, repository::StoreSnapshot};

/// Container for all services
pub struct Services {
    pub auth: auth::AuthService,
    pub records: records::RecordsService,
}

impl Services {
    /// Create all services over the shared repository and snapshot store
    pub fn new(repository: Arc<Repository>, store: Arc<SnapshotStore>) -> Self {
        Self {
            auth: auth::AuthService::new(Arc::clone(&repository), Arc::clone(&store)),
            records: records::RecordsService::new(repository, store),
        }
    }
}

/// Write a committed snapshot. A failed write is logged and serving
/// continues; the in-memory repository stays authoritative, and the previous
/// durable snapshot is untouched thanks to atomic replace.
pub(crate) async fn persist_snapshot(store: &SnapshotStore, snapshot: StoreSnapshot) {
    if let Err(err) = store.persist(&snapshot).await {
        warn!(version = snapshot.version, error = %err, "snapshot write failed");
    }
}
