//! Library record model: book entries and borrow requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record kinds. Both kinds share one id space; the id prefix keeps them
/// visually distinct and collision-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    NewBookEntry,
    BorrowRequest,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::NewBookEntry => "NEW_BOOK_ENTRY",
            RecordType::BorrowRequest => "BORROW_REQUEST",
        }
    }

    /// Prefix for generated record ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RecordType::NewBookEntry => "BK",
            RecordType::BorrowRequest => "BR",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record lifecycle. Status only ever advances:
/// Requested -> Borrowed (assignment) -> Returned; it never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Available,
    Requested,
    Borrowed,
    Returned,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Available => "AVAILABLE",
            RecordStatus::Requested => "REQUESTED",
            RecordStatus::Borrowed => "BORROWED",
            RecordStatus::Returned => "RETURNED",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Book fields, present only on NEW_BOOK_ENTRY records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// A library record: either a catalogued book entry or a borrow request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub record_id: String,
    pub record_type: RecordType,
    pub created_at: DateTime<Utc>,
    pub creator_id: String,
    pub status: RecordStatus,
    /// Empty until a librarian claims the request; set exactly once
    pub assigned_librarian_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<BookDetails>,
}

impl Record {
    /// A fresh borrow request: Requested, nobody assigned yet
    pub fn borrow_request(record_id: String, creator_id: String) -> Self {
        Record {
            record_id,
            record_type: RecordType::BorrowRequest,
            created_at: Utc::now(),
            creator_id,
            status: RecordStatus::Requested,
            assigned_librarian_id: String::new(),
            book: None,
        }
    }

    /// A fresh book entry: Available, assigned to its creating librarian
    pub fn book_entry(record_id: String, creator_id: String, book: BookDetails) -> Self {
        Record {
            record_id,
            record_type: RecordType::NewBookEntry,
            created_at: Utc::now(),
            creator_id: creator_id.clone(),
            status: RecordStatus::Available,
            assigned_librarian_id: creator_id,
            book: Some(book),
        }
    }

    pub fn is_borrow_request(&self) -> bool {
        self.record_type == RecordType::BorrowRequest
    }

    /// Creation timestamp in a readable format
    pub fn formatted_date(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// One-line listing representation; book fields appear only for
    /// NEW_BOOK_ENTRY records.
    pub fn summary(&self) -> String {
        let assignee = if self.assigned_librarian_id.is_empty() {
            "-"
        } else {
            self.assigned_librarian_id.as_str()
        };
        let mut line = format!(
            "[{}] {} | created {} by {} | status {} | assignee {}",
            self.record_id,
            self.record_type,
            self.formatted_date(),
            self.creator_id,
            self.status,
            assignee,
        );
        if let Some(book) = &self.book {
            line.push_str(&format!(
                " | \"{}\" by {} (ISBN {})",
                book.title, book.author, book.isbn
            ));
        }
        line
    }
}
