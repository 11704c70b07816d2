//! Account domain model.
//!
//! # Responsibility
//! - Define the user record owning all notes and drafts.
//! - Validate registration input shape (email, names, role).
//!
//! # Invariants
//! - `email` is unique across all accounts (enforced by storage).
//! - The core never sees plaintext credentials; `password_hash` is an
//!   opaque string supplied by the authentication collaborator.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an account.
pub type UserId = Uuid;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Access role attached to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular account; the default at registration.
    #[default]
    User,
    /// Elevated account used by admin-only surfaces.
    Admin,
}

impl UserRole {
    /// Storage representation of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parses a storage/transport role value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable account id.
    pub id: UserId,
    /// Unique login email, stored lowercase.
    pub email: String,
    /// Opaque credential hash produced by the auth collaborator.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    /// Registration instant in epoch milliseconds.
    pub created_at: i64,
    /// Last profile change in epoch milliseconds.
    pub updated_at: i64,
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to [`UserRole::User`] when absent.
    pub role: Option<UserRole>,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Field-level validation failure for account input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Email does not match the accepted shape.
    InvalidEmail(String),
    /// A required field is empty or whitespace-only.
    EmptyField(&'static str),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email format: `{value}`"),
            Self::EmptyField(field) => write!(f, "required field `{field}` is empty"),
        }
    }
}

impl Error for UserValidationError {}

impl NewUser {
    /// Validates registration input shape.
    ///
    /// # Invariants
    /// - Email must match the accepted address shape.
    /// - Names and the credential hash must be non-blank.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyField("email"));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(UserValidationError::InvalidEmail(email.to_string()));
        }
        if self.password_hash.trim().is_empty() {
            return Err(UserValidationError::EmptyField("password_hash"));
        }
        if self.first_name.trim().is_empty() {
            return Err(UserValidationError::EmptyField("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(UserValidationError::EmptyField("last_name"));
        }
        Ok(())
    }

    /// Canonical lowercase email used for storage and uniqueness.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, UserRole, UserValidationError};

    fn input() -> NewUser {
        NewUser {
            email: "Ada.Lovelace@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: None,
        }
    }

    #[test]
    fn valid_input_passes_and_email_normalizes_lowercase() {
        let new_user = input();
        assert!(new_user.validate().is_ok());
        assert_eq!(new_user.normalized_email(), "ada.lovelace@example.com");
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut new_user = input();
        new_user.email = "not-an-email".to_string();
        assert!(matches!(
            new_user.validate(),
            Err(UserValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut new_user = input();
        new_user.first_name = "   ".to_string();
        assert_eq!(
            new_user.validate(),
            Err(UserValidationError::EmptyField("first_name"))
        );
    }

    #[test]
    fn role_parse_roundtrip() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("root"), None);
    }
}
