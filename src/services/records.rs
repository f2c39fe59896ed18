//! Record management flows

use std::sync::Arc;

use tracing::info;

use crate::{
    error::AppResult,
    models::{BookDetails, Record, User},
    persistence::SnapshotStore,
    repository::{RecordFilter, Repository},
};

pub struct RecordsService {
    repository: Arc<Repository>,
    store: Arc<SnapshotStore>,
}

impl RecordsService {
    pub fn new(repository: Arc<Repository>, store: Arc<SnapshotStore>) -> Self {
        Self { repository, store }
    }

    /// Student flow: open a new borrow request
    pub async fn create_borrow_request(&self, creator: &User) -> Record {
        let (record, snapshot) = self.repository.create_borrow_request(&creator.id);
        super::persist_snapshot(&self.store, snapshot).await;
        info!(record_id = %record.record_id, creator = %creator.id, "borrow request created");
        record
    }

    /// Librarian flow: catalogue a new book
    pub async fn create_book_entry(&self, creator: &User, book: BookDetails) -> Record {
        let (record, snapshot) = self.repository.create_book_entry(&creator.id, book);
        super::persist_snapshot(&self.store, snapshot).await;
        info!(record_id = %record.record_id, creator = %creator.id, "book entry created");
        record
    }

    /// Records created by the given user, in insertion order
    pub fn records_created_by(&self, user_id: &str) -> Vec<Record> {
        self.repository
            .records_matching(&RecordFilter::CreatedBy(user_id.to_string()))
    }

    /// Every record in the store, in insertion order
    pub fn all_records(&self) -> Vec<Record> {
        self.repository.records_matching(&RecordFilter::All)
    }

    /// Records assigned to the given librarian
    pub fn records_assigned_to(&self, user_id: &str) -> Vec<Record> {
        self.repository
            .records_matching(&RecordFilter::AssignedTo(user_id.to_string()))
    }

    /// Borrow requests still awaiting assignment
    pub fn pending_requests(&self) -> Vec<Record> {
        self.repository
            .records_matching(&RecordFilter::PendingRequests)
    }

    /// Librarian flow: claim a pending borrow request
    pub async fn assign(&self, record_id: &str, librarian: &User) -> AppResult<Record> {
        let (record, snapshot) = self
            .repository
            .assign_borrow_request(record_id, &librarian.id)?;
        super::persist_snapshot(&self.store, snapshot).await;
        info!(record_id = %record.record_id, librarian = %librarian.id, "borrow request assigned");
        Ok(record)
    }

    /// Librarian flow: mark a borrowed record as returned
    pub async fn mark_returned(&self, record_id: &str) -> AppResult<Record> {
        let (record, snapshot) = self.repository.mark_returned(record_id)?;
        super::persist_snapshot(&self.store, snapshot).await;
        info!(record_id = %record.record_id, "record returned");
        Ok(record)
    }
}
