//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist and query the participant registry.
//! - Provide the membership probe used by event participant validation.
//!
//! # Invariants
//! - Users are insert-only; no update or delete statement exists here.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::user::{User, UserId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT uuid, name FROM users";

/// Repository interface for the participant registry.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (uuid, name) VALUES (?1, ?2);",
            params![user.uuid.to_string(), user.name.as_str()],
        )?;
        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY name ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

/// Returns the first participant id that does not exist in `users`,
/// or `None` when every id is registered. Runs against the caller's
/// connection so it can participate in an open transaction.
pub(crate) fn missing_participant(
    conn: &Connection,
    participants: &BTreeSet<UserId>,
) -> RepoResult<Option<UserId>> {
    let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM users WHERE uuid = ?1);")?;

    for id in participants {
        let exists: i64 = stmt.query_row([id.to_string()], |row| row.get(0))?;
        if exists == 0 {
            return Ok(Some(*id));
        }
    }

    Ok(None)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in users.uuid"))
    })?;

    Ok(User {
        uuid,
        name: row.get("name")?,
    })
}
