//! Account storage keyed by e-mail.

use super::{bool_to_int, ensure_connection_ready, parse_bool, RepoError, RepoResult};
use crate::model::user::UserRecord;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const USER_COLUMNS: &[&str] = &[
    "email",
    "display_name",
    "first_name",
    "last_name",
    "photo_url",
    "password_hash",
    "is_google_user",
    "registration_date",
];

/// Repository interface for accounts.
pub trait UserRepository {
    /// Inserts a new account. `registration_date` is assigned by the store.
    ///
    /// Returns `RepoError::Duplicate` when the e-mail is already registered.
    fn insert_user(&self, user: &UserRecord) -> RepoResult<UserRecord>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &UserRecord) -> RepoResult<UserRecord> {
        let inserted = self.conn.execute(
            "INSERT INTO users (
                email,
                display_name,
                first_name,
                last_name,
                photo_url,
                password_hash,
                is_google_user
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                user.email.as_str(),
                user.display_name.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.photo_url.as_deref(),
                user.password_hash.as_deref(),
                bool_to_int(user.is_google_user),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(RepoError::Duplicate(user.email.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        self.find_by_email(&user.email)?
            .ok_or_else(|| RepoError::InvalidData("inserted account not found".to_string()))
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        self.conn
            .query_row(
                "SELECT
                    email,
                    display_name,
                    first_name,
                    last_name,
                    photo_url,
                    password_hash,
                    is_google_user,
                    registration_date
                 FROM users
                 WHERE email = ?1;",
                [email],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    Ok(UserRecord {
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        photo_url: row.get("photo_url")?,
        password_hash: row.get("password_hash")?,
        is_google_user: parse_bool(row.get("is_google_user")?, "users.is_google_user")?,
        registration_date: row.get("registration_date")?,
    })
}
