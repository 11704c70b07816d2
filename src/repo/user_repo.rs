//! Account repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist account rows and enforce email uniqueness at write time.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `users.email` is unique; a duplicate insert surfaces as
//!   `RepoError::Conflict("users.email")`.
//! - Accounts are never hard-deleted; no delete API exists.

use crate::model::user::{User, UserId, UserRole};
use crate::repo::{is_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    password_hash,
    first_name,
    last_name,
    role,
    created_at,
    updated_at
FROM users";

/// Repository interface for account persistence.
pub trait UserRepository {
    /// Inserts one account row. Fails with `Conflict` on a taken email.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    /// Looks an account up by canonical (lowercase) email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Gets one account by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Writes profile fields and the updated-at stamp for one account.
    fn update_profile(&self, user: &User) -> RepoResult<()>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        let inserted = self.conn.execute(
            "INSERT INTO users (
                id,
                email,
                password_hash,
                first_name,
                last_name,
                role,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                user.id.to_string(),
                user.email.as_str(),
                user.password_hash.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.role.as_str(),
                user.created_at,
                user.updated_at,
            ],
        );

        match inserted {
            Ok(_) => Ok(user.id),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict("users.email")),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn update_profile(&self, user: &User) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                first_name = ?2,
                last_name = ?3,
                updated_at = ?4
             WHERE id = ?1;",
            params![
                user.id.to_string(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.updated_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(user.id));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "users.id")?;

    let role_text: String = row.get("role")?;
    let role = UserRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        role,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
