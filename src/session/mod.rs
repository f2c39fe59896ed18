//! Session: the per-connection protocol state machine
//!
//! Each accepted connection gets one `Session`, which owns nothing beyond
//! the currently authenticated user. The conversation moves between three
//! states (pre-login, student menu, librarian menu) until the client exits
//! or the transport fails; validation failures are reported and the current
//! menu re-offered without any state change.

pub mod menu;
pub mod wire;

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{BookDetails, NewUser, Record, Role, User},
    services::Services,
};

use menu::{LibrarianCommand, PreLoginCommand, StudentCommand};

pub const WELCOME: &str = "Welcome to the Library Management System!";
pub const GOODBYE: &str = "Goodbye! Thank you for using the Library Management System.";
const INVALID_OPTION: &str = "Invalid option, please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unauthenticated,
    StudentMenu,
    LibrarianMenu,
    Terminated,
}

/// One client conversation over a buffered reader/writer pair
pub struct Session<R, W> {
    reader: R,
    writer: W,
    services: Arc<Services>,
    user: Option<User>,
    peer: String,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, services: Arc<Services>, peer: String) -> Self {
        Self {
            reader,
            writer,
            services,
            user: None,
            peer,
        }
    }

    /// Drive the conversation until termination. A client that disconnects
    /// (cleanly or by reset) ends the session gracefully; only unexpected
    /// failures surface as errors.
    pub async fn run(mut self) -> AppResult<()> {
        debug!(peer = %self.peer, "session started");
        match self.converse().await {
            Ok(()) => {
                debug!(peer = %self.peer, "session finished");
                Ok(())
            }
            Err(AppError::Disconnected) => {
                debug!(peer = %self.peer, "client disconnected");
                Ok(())
            }
            Err(AppError::Io(ref err)) if is_disconnect(err.kind()) => {
                debug!(peer = %self.peer, error = %err, "connection lost");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn converse(&mut self) -> AppResult<()> {
        self.send(WELCOME).await?;

        let mut state = SessionState::Unauthenticated;
        while state != SessionState::Terminated {
            state = match state {
                SessionState::Unauthenticated => self.unauthenticated_step().await?,
                SessionState::StudentMenu => self.student_step().await?,
                SessionState::LibrarianMenu => self.librarian_step().await?,
                SessionState::Terminated => SessionState::Terminated,
            };
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Menu steps
    // -----------------------------------------------------------------------

    async fn unauthenticated_step(&mut self) -> AppResult<SessionState> {
        let choice = self.prompt(PreLoginCommand::MENU).await?;
        match PreLoginCommand::parse(&choice) {
            Some(PreLoginCommand::Register) => {
                let outcome = self.register_flow().await;
                self.report(outcome).await?;
                Ok(SessionState::Unauthenticated)
            }
            Some(PreLoginCommand::Login) => self.login_step().await,
            Some(PreLoginCommand::Exit) => self.exit_step().await,
            None => {
                self.send(INVALID_OPTION).await?;
                Ok(SessionState::Unauthenticated)
            }
        }
    }

    async fn student_step(&mut self) -> AppResult<SessionState> {
        let Some(user) = self.user.clone() else {
            return Ok(SessionState::Unauthenticated);
        };

        let choice = self.prompt(StudentCommand::MENU).await?;
        match StudentCommand::parse(&choice) {
            Some(StudentCommand::CreateBorrowRequest) => {
                let record = self.services.records.create_borrow_request(&user).await;
                self.send(&format!(
                    "Borrow request {} created with status {}.",
                    record.record_id, record.status
                ))
                .await?;
                Ok(SessionState::StudentMenu)
            }
            Some(StudentCommand::ViewMyRecords) => {
                let records = self.services.records.records_created_by(&user.id);
                self.send_records("Your records", &records).await?;
                Ok(SessionState::StudentMenu)
            }
            Some(StudentCommand::UpdatePassword) => {
                let outcome = self.update_password_flow(&user).await;
                self.report(outcome).await?;
                Ok(SessionState::StudentMenu)
            }
            Some(StudentCommand::Logout) => self.logout_step().await,
            Some(StudentCommand::Exit) => self.exit_step().await,
            None => {
                self.send(INVALID_OPTION).await?;
                Ok(SessionState::StudentMenu)
            }
        }
    }

    async fn librarian_step(&mut self) -> AppResult<SessionState> {
        let Some(user) = self.user.clone() else {
            return Ok(SessionState::Unauthenticated);
        };

        let choice = self.prompt(LibrarianCommand::MENU).await?;
        match LibrarianCommand::parse(&choice) {
            Some(LibrarianCommand::AddBookEntry) => {
                let outcome = self.add_book_entry_flow(&user).await;
                self.report(outcome).await?;
                Ok(SessionState::LibrarianMenu)
            }
            Some(LibrarianCommand::ViewAllRecords) => {
                let records = self.services.records.all_records();
                self.send_records("All records", &records).await?;
                Ok(SessionState::LibrarianMenu)
            }
            Some(LibrarianCommand::AssignBorrowRequest) => {
                let outcome = self.assign_flow(&user).await;
                self.report(outcome).await?;
                Ok(SessionState::LibrarianMenu)
            }
            Some(LibrarianCommand::ViewAssignedToMe) => {
                let records = self.services.records.records_assigned_to(&user.id);
                self.send_records("Records assigned to you", &records).await?;
                Ok(SessionState::LibrarianMenu)
            }
            Some(LibrarianCommand::MarkReturned) => {
                let outcome = self.mark_returned_flow().await;
                self.report(outcome).await?;
                Ok(SessionState::LibrarianMenu)
            }
            Some(LibrarianCommand::UpdatePassword) => {
                let outcome = self.update_password_flow(&user).await;
                self.report(outcome).await?;
                Ok(SessionState::LibrarianMenu)
            }
            Some(LibrarianCommand::Logout) => self.logout_step().await,
            Some(LibrarianCommand::Exit) => self.exit_step().await,
            None => {
                self.send(INVALID_OPTION).await?;
                Ok(SessionState::LibrarianMenu)
            }
        }
    }

    async fn login_step(&mut self) -> AppResult<SessionState> {
        let email = self.prompt("Enter your email:").await?;
        let password = self.prompt("Enter your password:").await?;

        match self.services.auth.login(&email, &password) {
            Ok(user) => {
                self.send(&format!(
                    "Login successful! Welcome, {} ({}).",
                    user.name, user.role
                ))
                .await?;
                let next = if user.is_librarian() {
                    SessionState::LibrarianMenu
                } else {
                    SessionState::StudentMenu
                };
                self.user = Some(user);
                Ok(next)
            }
            Err(err) if err.is_validation() => {
                self.send(&err.client_message()).await?;
                Ok(SessionState::Unauthenticated)
            }
            Err(err) => Err(err),
        }
    }

    async fn logout_step(&mut self) -> AppResult<SessionState> {
        self.user = None;
        self.send("Logged out successfully.").await?;
        Ok(SessionState::Unauthenticated)
    }

    async fn exit_step(&mut self) -> AppResult<SessionState> {
        self.send(GOODBYE).await?;
        Ok(SessionState::Terminated)
    }

    // -----------------------------------------------------------------------
    // Guided flows
    // -----------------------------------------------------------------------

    async fn register_flow(&mut self) -> AppResult<()> {
        let name = self.prompt("Enter your name:").await?;
        let id = self.prompt("Enter your ID:").await?;
        let email = self.prompt("Enter your email:").await?;
        let password = self.prompt("Enter your password:").await?;
        let department = self.prompt("Enter your department:").await?;
        let selector = self
            .prompt("Select a role - [1] Student  [2] Librarian:")
            .await?;

        // An invalid selector fails the attempt and discards every field above
        let role = Role::from_selector(&selector)?;

        self.services
            .auth
            .register(NewUser {
                name,
                id,
                email,
                password,
                department,
                role,
            })
            .await?;
        self.send("Registration successful! You can now log in.")
            .await?;
        Ok(())
    }

    async fn add_book_entry_flow(&mut self, user: &User) -> AppResult<()> {
        let title = self.prompt("Enter the book title:").await?;
        let author = self.prompt("Enter the book author:").await?;
        let isbn = self.prompt("Enter the book ISBN:").await?;

        let record = self
            .services
            .records
            .create_book_entry(user, BookDetails { title, author, isbn })
            .await;
        self.send(&format!("Book entry {} created.", record.record_id))
            .await?;
        self.send(&record.summary()).await?;
        Ok(())
    }

    async fn assign_flow(&mut self, user: &User) -> AppResult<()> {
        let pending = self.services.records.pending_requests();
        if pending.is_empty() {
            self.send("No pending borrow requests.").await?;
            return Ok(());
        }

        self.send_records("Pending borrow requests", &pending).await?;
        let record_id = self.prompt("Enter the record ID to assign:").await?;

        let record = self.services.records.assign(record_id.trim(), user).await?;
        self.send(&format!(
            "Record {} is now {}, assigned to {}.",
            record.record_id, record.status, record.assigned_librarian_id
        ))
        .await?;
        Ok(())
    }

    async fn mark_returned_flow(&mut self) -> AppResult<()> {
        let record_id = self.prompt("Enter the record ID to mark returned:").await?;

        let record = self.services.records.mark_returned(record_id.trim()).await?;
        self.send(&format!(
            "Record {} is now {}.",
            record.record_id, record.status
        ))
        .await?;
        Ok(())
    }

    async fn update_password_flow(&mut self, user: &User) -> AppResult<()> {
        let current = self.prompt("Enter your current password:").await?;
        if current != user.password {
            return Err(AppError::PasswordMismatch);
        }

        let new_password = self.prompt("Enter your new password:").await?;
        let confirmation = self.prompt("Confirm your new password:").await?;
        if new_password != confirmation {
            return Err(AppError::PasswordMismatch);
        }

        self.services
            .auth
            .change_password(user, &current, &new_password)
            .await?;
        if let Some(user) = self.user.as_mut() {
            user.password = new_password;
        }
        self.send("Password updated successfully.").await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Conversation helpers
    // -----------------------------------------------------------------------

    /// Report a flow outcome: validation failures go to the client and the
    /// menu is re-offered; anything else ends the session.
    async fn report(&mut self, outcome: AppResult<()>) -> AppResult<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if err.is_validation() => {
                self.send(&err.client_message()).await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn send_records(&mut self, heading: &str, records: &[Record]) -> AppResult<()> {
        if records.is_empty() {
            self.send("No records found.").await?;
            return Ok(());
        }
        self.send(&format!("{} - {} record(s)", heading, records.len()))
            .await?;
        for record in records {
            self.send(&record.summary()).await?;
        }
        Ok(())
    }

    async fn send(&mut self, message: &str) -> AppResult<()> {
        wire::send_message(&mut self.writer, message).await?;
        Ok(())
    }

    /// Send a prompt and wait for exactly one reply line
    async fn prompt(&mut self, text: &str) -> AppResult<String> {
        debug_assert!(wire::is_prompt(text), "prompts must end with ':'");
        wire::send_message(&mut self.writer, text).await?;
        match wire::read_reply(&mut self.reader).await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(AppError::Disconnected),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                Err(AppError::Protocol("reply is not valid UTF-8".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}
