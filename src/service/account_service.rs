//! Account use-case service.
//!
//! # Responsibility
//! - Register accounts and serve/update profile data.
//! - Enforce email uniqueness on top of the storage constraint.
//!
//! # Invariants
//! - Emails are stored in canonical lowercase form.
//! - Accounts are never deleted; there is no removal API.

use crate::model::user::{NewUser, ProfileUpdate, User, UserId, UserValidationError};
use crate::repo::user_repo::UserRepository;
use crate::repo::{now_epoch_ms, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AccountError {
    /// Registration input failed shape validation.
    Validation(UserValidationError),
    /// Another account already owns this email.
    EmailTaken(String),
    /// Target account does not exist.
    UserNotFound(UserId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmailTaken(email) => write!(f, "email already registered: {email}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for AccountError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Account service facade over the user repository.
pub struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new account.
    ///
    /// # Contract
    /// - Input shape is validated before any storage call.
    /// - Role defaults to `user` when absent.
    /// - A taken email fails with [`AccountError::EmailTaken`], whether it
    ///   is caught by the pre-check or by the storage constraint.
    pub fn register(&self, new_user: &NewUser) -> Result<User, AccountError> {
        new_user.validate()?;
        let email = new_user.normalized_email();

        if self.repo.find_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken(email));
        }

        let now = now_epoch_ms();
        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            role: new_user.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        match self.repo.create_user(&user) {
            Ok(_) => {}
            // Lost a race against a concurrent registration for the same
            // email; the unique index is the source of truth.
            Err(RepoError::Conflict(_)) => return Err(AccountError::EmailTaken(email)),
            Err(err) => return Err(err.into()),
        }

        info!(
            "event=account_registered module=service status=ok user_id={} role={}",
            user.id,
            user.role.as_str()
        );
        Ok(user)
    }

    /// Gets one account's profile by id.
    pub fn get_profile(&self, user_id: UserId) -> Result<User, AccountError> {
        self.repo
            .get_user(user_id)?
            .ok_or(AccountError::UserNotFound(user_id))
    }

    /// Applies a partial profile update and bumps the updated-at stamp.
    ///
    /// Absent fields are left untouched.
    pub fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, AccountError> {
        let mut user = self
            .repo
            .get_user(user_id)?
            .ok_or(AccountError::UserNotFound(user_id))?;

        if let Some(first_name) = update.first_name.as_ref() {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = update.last_name.as_ref() {
            user.last_name = last_name.clone();
        }
        user.updated_at = now_epoch_ms();

        self.repo.update_profile(&user)?;
        Ok(user)
    }
}
