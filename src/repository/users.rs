//! User operations on the shared store

use crate::{
    error::{AppError, AppResult},
    models::{NewUser, User},
};

use super::{Repository, StoreSnapshot};

impl Repository {
    /// Register a new user. The uniqueness checks (exact id, case-insensitive
    /// email) and the insert happen inside one write-lock acquisition, so two
    /// concurrent registrations can never both pass the check.
    pub fn try_register(&self, new_user: NewUser) -> AppResult<(User, StoreSnapshot)> {
        let mut inner = self.inner.write();

        if inner.users.contains_key(&new_user.id) {
            return Err(AppError::DuplicateId(new_user.id));
        }
        if inner
            .users
            .values()
            .any(|u| u.email_matches(&new_user.email))
        {
            return Err(AppError::DuplicateEmail(new_user.email));
        }

        let user = User::from(new_user);
        inner.users.insert(user.id.clone(), user.clone());
        let snapshot = inner.committed();
        Ok((user, snapshot))
    }

    /// Case-insensitive email match, exact password match
    pub fn find_user_by_credentials(&self, email: &str, password: &str) -> Option<User> {
        let inner = self.inner.read();
        inner
            .users
            .values()
            .find(|u| u.email_matches(email) && u.password == password)
            .cloned()
    }

    /// Change a user's password in place
    pub fn update_password(&self, user_id: &str, new_password: &str) -> AppResult<StoreSnapshot> {
        let mut inner = self.inner.write();
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        user.password = new_password.to_string();
        Ok(inner.committed())
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }
}
