//! Error types for the Libris server

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("duplicate user id: {0}")]
    DuplicateId(String),

    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("invalid role selection: {0}")]
    InvalidRoleSelection(String),

    #[error("authentication failure")]
    AuthenticationFailure,

    #[error("password mismatch")]
    PasswordMismatch,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("wrong record type: {0}")]
    WrongRecordType(String),

    #[error("already processed: {0}")]
    AlreadyProcessed(String),

    #[error("record not borrowed: {0}")]
    RecordNotBorrowed(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("client disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Whether this error is a validation failure the session reports to the
    /// client before re-offering the current menu. Anything else ends the
    /// session.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::DuplicateId(_)
                | AppError::DuplicateEmail(_)
                | AppError::InvalidRoleSelection(_)
                | AppError::AuthenticationFailure
                | AppError::PasswordMismatch
                | AppError::UserNotFound(_)
                | AppError::RecordNotFound(_)
                | AppError::WrongRecordType(_)
                | AppError::AlreadyProcessed(_)
                | AppError::RecordNotBorrowed(_)
        )
    }

    /// Client-facing response string for validation errors.
    pub fn client_message(&self) -> String {
        match self {
            AppError::DuplicateId(id) => {
                format!("Registration failed: a user with ID '{}' already exists.", id)
            }
            AppError::DuplicateEmail(email) => {
                format!("Registration failed: the email '{}' is already registered.", email)
            }
            AppError::InvalidRoleSelection(choice) => format!(
                "Registration failed: '{}' is not a valid role selection. Enter 1 for Student or 2 for Librarian.",
                choice
            ),
            AppError::AuthenticationFailure => "Invalid email or password.".to_string(),
            AppError::PasswordMismatch => "Password mismatch. Password was not changed.".to_string(),
            AppError::UserNotFound(id) => format!("No user found with ID '{}'.", id),
            AppError::RecordNotFound(id) => format!("No record found with ID '{}'.", id),
            AppError::WrongRecordType(id) => {
                format!("Record '{}' is not a borrow request.", id)
            }
            AppError::AlreadyProcessed(id) => {
                format!("Record '{}' has already been processed.", id)
            }
            AppError::RecordNotBorrowed(id) => {
                format!("Record '{}' is not currently borrowed.", id)
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
