//! Record operations on the shared store

use crate::{
    error::{AppError, AppResult},
    models::{BookDetails, Record, RecordStatus, RecordType},
};

use super::{Repository, RecordFilter, StoreSnapshot};

impl Repository {
    /// Create a borrow request for a student. Id generation and insert share
    /// the write lock.
    pub fn create_borrow_request(&self, creator_id: &str) -> (Record, StoreSnapshot) {
        let mut inner = self.inner.write();
        let record_id = inner.next_record_id(RecordType::BorrowRequest);
        let record = Record::borrow_request(record_id, creator_id.to_string());
        inner.records.insert(record.record_id.clone(), record.clone());
        let snapshot = inner.committed();
        (record, snapshot)
    }

    /// Create a book entry for a librarian; the creator is also the assignee
    pub fn create_book_entry(
        &self,
        creator_id: &str,
        book: BookDetails,
    ) -> (Record, StoreSnapshot) {
        let mut inner = self.inner.write();
        let record_id = inner.next_record_id(RecordType::NewBookEntry);
        let record = Record::book_entry(record_id, creator_id.to_string(), book);
        inner.records.insert(record.record_id.clone(), record.clone());
        let snapshot = inner.committed();
        (record, snapshot)
    }

    pub fn find_record(&self, record_id: &str) -> Option<Record> {
        self.inner.read().records.get(record_id).cloned()
    }

    /// All records matching the filter, in insertion order. Returns an owned
    /// snapshot so callers never iterate the live store outside the lock.
    pub fn records_matching(&self, filter: &RecordFilter) -> Vec<Record> {
        let inner = self.inner.read();
        inner
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Atomically claim a borrow request for a librarian: the type and status
    /// checks and the transition to Borrowed happen in one critical section.
    pub fn assign_borrow_request(
        &self,
        record_id: &str,
        librarian_id: &str,
    ) -> AppResult<(Record, StoreSnapshot)> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(record_id)
            .ok_or_else(|| AppError::RecordNotFound(record_id.to_string()))?;

        if !record.is_borrow_request() {
            return Err(AppError::WrongRecordType(record_id.to_string()));
        }
        if record.status != RecordStatus::Requested {
            return Err(AppError::AlreadyProcessed(record_id.to_string()));
        }

        record.status = RecordStatus::Borrowed;
        record.assigned_librarian_id = librarian_id.to_string();
        let record = record.clone();
        let snapshot = inner.committed();
        Ok((record, snapshot))
    }

    /// Complete the borrow flow: a Borrowed request becomes Returned
    pub fn mark_returned(&self, record_id: &str) -> AppResult<(Record, StoreSnapshot)> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(record_id)
            .ok_or_else(|| AppError::RecordNotFound(record_id.to_string()))?;

        if !record.is_borrow_request() {
            return Err(AppError::WrongRecordType(record_id.to_string()));
        }
        match record.status {
            RecordStatus::Borrowed => {}
            RecordStatus::Returned => {
                return Err(AppError::AlreadyProcessed(record_id.to_string()))
            }
            _ => return Err(AppError::RecordNotBorrowed(record_id.to_string())),
        }

        record.status = RecordStatus::Returned;
        let record = record.clone();
        let snapshot = inner.committed();
        Ok((record, snapshot))
    }

    pub fn record_count(&self) -> usize {
        self.inner.read().records.len()
    }
}
