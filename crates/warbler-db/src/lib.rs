pub mod migrations;
pub mod models;
pub mod password;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use models::{AuthoredMessage, MessageRow, ProfileUpdate, UserCounts, UserRow};

pub const MAX_MESSAGE_LEN: usize = 140;

/// Failures callers are expected to tell apart. Everything else travels as a
/// plain `anyhow::Error`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DbError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already taken")]
    EmailTaken,

    #[error("Messages are limited to 140 characters")]
    MessageTooLong,

    #[error("Not found")]
    NotFound,
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::init(conn)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self::init(Connection::open_in_memory()?)?;
        info!("In-memory database opened");
        Ok(db)
    }

    /// Opens the database named by a `DATABASE_URL` value: a bare path,
    /// `sqlite://path`, or `:memory:`.
    pub fn connect(url: &str) -> Result<Self> {
        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        if path == ":memory:" {
            Self::open_in_memory()
        } else {
            Self::open(Path::new(path))
        }
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_accepts_memory_urls() {
        assert!(Database::connect(":memory:").is_ok());
        assert!(Database::connect("sqlite://:memory:").is_ok());
    }

    #[test]
    fn migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| migrations::run(conn)).unwrap();
    }
}
