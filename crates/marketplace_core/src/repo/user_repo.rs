//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create, lookup and partial-update APIs over `users`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `create_user` never opens a session for input that fails validation.
//! - `update_user` reads, merges and writes inside one transaction.
//! - Read paths reject invalid persisted rows instead of masking them.

use super::{log_operation, log_patch, parse_uuid, EntityKind, RepoError, RepoResult};
use crate::db::ConnectionManager;
use crate::model::user::{NewUser, User, UserId, UserPatch};
use log::warn;
use rusqlite::{params, Connection, Row};
use std::time::Instant;

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    surname,
    email,
    password,
    location,
    ranking
FROM users";

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Validates `fields`, assigns a fresh id and persists the user.
    fn create_user(&self, fields: NewUser) -> RepoResult<User>;
    /// Loads one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Loads one user by exact email.
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Merges `patch` into the stored user and persists the result.
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User>;
    /// Counts persisted users.
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'m> {
    manager: &'m ConnectionManager,
}

impl<'m> SqliteUserRepository<'m> {
    pub fn new(manager: &'m ConnectionManager) -> Self {
        Self { manager }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, fields: NewUser) -> RepoResult<User> {
        let started_at = Instant::now();
        let user = User::create(fields).map_err(|err| {
            warn!(
                "event=user_create module=repo status=rejected error_code=validation_failed field={}",
                err.field()
            );
            RepoError::from(err)
        })?;

        let mut session = self.manager.session()?;
        let result = session.write(|tx| insert_user(tx, &user));
        log_operation("user_create", user.id, &result, started_at);
        result.map(|()| user)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let session = self.manager.session()?;
        session.read(|conn| select_user(conn, "id", &id.to_string()))
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let session = self.manager.session()?;
        session.read(|conn| select_user(conn, "email", email))
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        let started_at = Instant::now();
        let mut session = self.manager.session()?;
        let result = session.write(|tx| {
            let mut user = select_user(tx, "id", &id.to_string())?
                .ok_or_else(|| RepoError::not_found(EntityKind::User, id))?;

            let outcome = user.apply_patch(patch);
            log_patch("user_update", id, &outcome);
            if !outcome.is_noop() {
                write_user(tx, &user)?;
            }
            Ok(user)
        });
        log_operation("user_update", id, &result, started_at);
        result
    }

    fn count_users(&self) -> RepoResult<u64> {
        let session = self.manager.session()?;
        session.read(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
            u64::try_from(count)
                .map_err(|_| RepoError::InvalidData(format!("negative user count {count}")))
        })
    }
}

fn insert_user(conn: &Connection, user: &User) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO users (
            id,
            name,
            surname,
            email,
            password,
            location,
            ranking
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            user.id.to_string(),
            user.name.as_str(),
            user.surname.as_str(),
            user.email.as_str(),
            user.password.as_str(),
            user.location.as_str(),
            user.ranking,
        ],
    )?;
    Ok(())
}

fn write_user(conn: &Connection, user: &User) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE users
         SET
            name = ?2,
            surname = ?3,
            email = ?4,
            password = ?5,
            location = ?6,
            ranking = ?7
         WHERE id = ?1;",
        params![
            user.id.to_string(),
            user.name.as_str(),
            user.surname.as_str(),
            user.email.as_str(),
            user.password.as_str(),
            user.location.as_str(),
            user.ranking,
        ],
    )?;

    if changed == 0 {
        return Err(RepoError::not_found(EntityKind::User, user.id));
    }
    Ok(())
}

/// `column` is always a literal from this module, never caller input.
fn select_user(conn: &Connection, column: &str, value: &str) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE {column} = ?1;"))?;
    let mut rows = stmt.query([value])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_user_row(row)?));
    }
    Ok(None)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "users.id")?;

    let fields = NewUser {
        name: row.get("name")?,
        surname: row.get("surname")?,
        email: row.get("email")?,
        password: row.get("password")?,
        location: row.get("location")?,
        ranking: row.get("ranking")?,
    };

    User::with_id(id, fields)
        .map_err(|err| RepoError::InvalidData(format!("user {id} fails validation: {err}")))
}
