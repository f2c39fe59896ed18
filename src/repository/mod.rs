//! Shared in-memory repository of users and records
//!
//! The repository is the only shared mutable state in the process. One
//! `RwLock` guards a single inner store; every mutating operation performs
//! its uniqueness/status check and its mutation inside one lock acquisition,
//! and record-id assignment goes through the same critical section as the
//! insert. The lock is never held across socket or file I/O.

pub mod records;
pub mod users;

use indexmap::IndexMap;
use parking_lot::RwLock;
use snowflaked::Generator;

use crate::models::{Record, RecordType, User};

/// Filter for record listings, evaluated in insertion order
#[derive(Debug, Clone)]
pub enum RecordFilter {
    All,
    CreatedBy(String),
    AssignedTo(String),
    /// Borrow requests still awaiting assignment
    PendingRequests,
}

impl RecordFilter {
    fn matches(&self, record: &Record) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::CreatedBy(id) => record.creator_id == *id,
            RecordFilter::AssignedTo(id) => record.assigned_librarian_id == *id,
            RecordFilter::PendingRequests => {
                record.is_borrow_request()
                    && record.status == crate::models::RecordStatus::Requested
            }
        }
    }
}

/// A complete, self-consistent copy of the store, captured under the lock.
/// The version increases with every mutation; the persistence layer uses it
/// to keep durable state strictly ordered.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub version: u64,
    pub users: Vec<User>,
    pub records: Vec<Record>,
}

struct StoreInner {
    users: IndexMap<String, User>,
    records: IndexMap<String, Record>,
    record_ids: Generator,
    version: u64,
}

impl StoreInner {
    /// Record ids combine a type prefix with a snowflake suffix, so the two
    /// record kinds can never collide and no id is ever reused. Generation
    /// happens inside the write lock, serialized with the insert.
    fn next_record_id(&mut self, record_type: RecordType) -> String {
        let suffix: u64 = self.record_ids.generate();
        format!("{}-{}", record_type.id_prefix(), suffix)
    }

    /// Bump the version and capture the snapshot for this mutation
    fn committed(&mut self) -> StoreSnapshot {
        self.version += 1;
        self.capture()
    }

    fn capture(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: self.version,
            users: self.users.values().cloned().collect(),
            records: self.records.values().cloned().collect(),
        }
    }
}

/// The shared, lock-protected store of users and records
pub struct Repository {
    inner: RwLock<StoreInner>,
}

impl Repository {
    pub fn new() -> Self {
        Self::with_data(Vec::new(), Vec::new())
    }

    /// Build the repository from persisted collections, preserving order
    pub fn with_data(users: Vec<User>, records: Vec<Record>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        let records = records
            .into_iter()
            .map(|r| (r.record_id.clone(), r))
            .collect();
        Repository {
            inner: RwLock::new(StoreInner {
                users,
                records,
                record_ids: Generator::new(0),
                version: 0,
            }),
        }
    }

    /// Current full snapshot (used for the final shutdown flush)
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().capture()
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
