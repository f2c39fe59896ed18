//! Durable snapshots of the repository
//!
//! Two independent stores under the data directory: `users.json` and
//! `records.json`, each holding its complete collection in insertion order.
//! Every write goes to a temporary file first, is fsynced, then atomically
//! renamed over the durable file, so a crash mid-write can never corrupt an
//! existing snapshot. Snapshots carry the repository version; a writer mutex
//! serializes file writes and drops any snapshot older than the last one
//! written, so durable state never goes backwards.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    models::{Record, User},
    repository::StoreSnapshot,
};

const USERS_FILE: &str = "users.json";
const RECORDS_FILE: &str = "records.json";

/// Snapshot store bound to one data directory
pub struct SnapshotStore {
    users_path: PathBuf,
    records_path: PathBuf,
    /// Version of the last snapshot durably written
    last_written: Mutex<u64>,
}

impl SnapshotStore {
    /// Open the store, creating the data directory if needed
    pub async fn open(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(SnapshotStore {
            users_path: data_dir.join(USERS_FILE),
            records_path: data_dir.join(RECORDS_FILE),
            last_written: Mutex::new(0),
        })
    }

    /// Load both collections. A missing or unreadable store is an empty
    /// starting set, never an error.
    pub async fn load(&self) -> (Vec<User>, Vec<Record>) {
        let users = load_collection(&self.users_path).await;
        let records = load_collection(&self.records_path).await;
        info!(
            users = users.len(),
            records = records.len(),
            "loaded persisted state"
        );
        (users, records)
    }

    /// Durably write the snapshot, unless a newer one has already been
    /// written. Both stores are rewritten in full via atomic replace.
    pub async fn persist(&self, snapshot: &StoreSnapshot) -> AppResult<()> {
        let mut last = self.last_written.lock().await;
        if snapshot.version <= *last {
            return Ok(());
        }

        write_collection(&self.users_path, &snapshot.users).await?;
        write_collection(&self.records_path, &snapshot.records).await?;
        *last = snapshot.version;
        Ok(())
    }
}

async fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no existing snapshot, starting fresh");
            return Vec::new();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unreadable snapshot, starting fresh");
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => items,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt snapshot, starting fresh");
            Vec::new()
        }
    }
}

async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> AppResult<()> {
    let json = serde_json::to_vec_pretty(items)
        .map_err(|err| AppError::Persistence(err.to_string()))?;

    // Temporary file in the same directory so the rename stays atomic
    let tmp_path = path.with_extension("json.tmp");
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
