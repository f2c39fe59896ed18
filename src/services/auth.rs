//! Registration, login, and password management

use std::sync::Arc;

use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{NewUser, User},
    persistence::SnapshotStore,
    repository::Repository,
};

pub struct AuthService {
    repository: Arc<Repository>,
    store: Arc<SnapshotStore>,
}

impl AuthService {
    pub fn new(repository: Arc<Repository>, store: Arc<SnapshotStore>) -> Self {
        Self { repository, store }
    }

    /// Register a new user and persist the result. The repository performs
    /// the uniqueness checks and the insert atomically.
    pub async fn register(&self, new_user: NewUser) -> AppResult<User> {
        let (user, snapshot) = self.repository.try_register(new_user)?;
        super::persist_snapshot(&self.store, snapshot).await;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Authenticate by case-insensitive email and exact password
    pub fn login(&self, email: &str, password: &str) -> AppResult<User> {
        self.repository
            .find_user_by_credentials(email, password)
            .ok_or(AppError::AuthenticationFailure)
    }

    /// Change a password after verifying the current one. The current-password
    /// check is conversational (against the session's authenticated user), per
    /// the protocol; the update itself is atomic in the repository.
    pub async fn change_password(
        &self,
        user: &User,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if user.password != current {
            return Err(AppError::PasswordMismatch);
        }
        let snapshot = self.repository.update_password(&user.id, new_password)?;
        super::persist_snapshot(&self.store, snapshot).await;
        info!(user_id = %user.id, "password updated");
        Ok(())
    }
}
