//! User model and related types

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// User roles (students request books, librarians manage them)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Librarian,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Librarian => "Librarian",
        }
    }

    /// Parse the registration role selector: "1" = Student, "2" = Librarian.
    /// Any other value fails the whole registration attempt.
    pub fn from_selector(choice: &str) -> Result<Self, AppError> {
        match choice.trim() {
            "1" => Ok(Role::Student),
            "2" => Ok(Role::Librarian),
            other => Err(AppError::InvalidRoleSelection(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registration payload collected field by field from a session
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub id: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub role: Role,
}

/// A registered user. Created only via registration; the password is the
/// only field that may change afterwards, and users are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Stored verbatim; credential hashing is out of scope
    pub password: String,
    pub department: String,
    pub role: Role,
}

impl User {
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_librarian(&self) -> bool {
        self.role == Role::Librarian
    }

    /// Emails compare case-insensitively everywhere
    pub fn email_matches(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

impl From<NewUser> for User {
    fn from(new_user: NewUser) -> Self {
        User {
            id: new_user.id,
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            department: new_user.department,
            role: new_user.role,
        }
    }
}
