//! SQLite connection handling.
//!
//! Writes go through a single-connection pool so that every read-modify-write
//! transaction runs alone: two reservations for the same donation queue on
//! the writer and the second one observes the first one's commit. Reads use a
//! separate pool and, with the WAL journal, never wait on the writer.
//!
//! Write transactions start with `BEGIN IMMEDIATE`, taking the database write
//! lock before their first read. A writer in another process (the
//! `--expire-overdue` run mode) therefore makes them wait on the busy timeout
//! instead of invalidating a snapshot they already read from.

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::{str::FromStr, time::Duration};
use tracing::debug;

const READER_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the relational store, injected into every service.
#[derive(Clone, Debug)]
pub struct Database {
    reader: SqlitePool,
    writer: SqlitePool,
}

impl Database {
    /// Connect using a `sqlite://` URL.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        debug!("Connecting to {}", url);
        Self::connect_with(SqliteConnectOptions::from_str(url)?).await
    }

    /// Connect using explicit options. WAL, foreign keys and a busy timeout
    /// are always applied on top of what the caller passes.
    pub async fn connect_with(options: SqliteConnectOptions) -> Result<Self, sqlx::Error> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options)
            .await?;

        Ok(Self { reader, writer })
    }

    /// Apply the embedded migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.writer).await
    }

    /// Pool for read-only queries.
    pub fn reader(&self) -> &SqlitePool {
        &self.reader
    }

    /// Pool for transactions that mutate state.
    pub fn writer(&self) -> &SqlitePool {
        &self.writer
    }

    /// Open a transaction on the writer that holds the write lock from its
    /// first statement.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.writer.begin_with("BEGIN IMMEDIATE").await
    }

    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}
