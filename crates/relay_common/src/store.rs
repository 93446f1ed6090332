//! Durable ticket storage.
//!
//! SQLite-backed table of tickets keyed by an auto-incrementing id. The
//! store exclusively owns persistence and id assignment; no other
//! component mutates tickets directly. The schema is provisioned
//! idempotently at open time, so a missing table is a startup failure
//! rather than a request-time one.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::ticket::Ticket;

/// Ticket store over a single SQLite connection.
///
/// All SQLite work runs on the blocking pool; the connection mutex keeps
/// insert-and-fetch-id a single critical section, so no two concurrent
/// creates can observe the same rowid.
#[derive(Clone)]
pub struct TicketStore {
    conn: Arc<Mutex<Connection>>,
}

impl TicketStore {
    /// Open or create the ticket database at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let db_path: PathBuf = path.into();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        info!("Opening ticket database at: {}", db_path.display());

        let conn = tokio::task::spawn_blocking(move || -> Result<Connection> {
            let conn = Connection::open(&db_path).context("Failed to open SQLite database")?;

            // WAL keeps reads from blocking the write path
            conn.pragma_update(None, "journal_mode", "WAL")
                .context("Failed to enable WAL mode")?;
            conn.pragma_update(None, "synchronous", "NORMAL")
                .context("Failed to set synchronous mode")?;

            Ok(conn)
        })
        .await??;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.initialize_schema().await?;

        Ok(store)
    }

    /// Provision the tickets table. Idempotent; safe on every startup.
    async fn initialize_schema(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = conn.blocking_lock();

            conn.execute(
                "CREATE TABLE IF NOT EXISTS tickets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    question TEXT NOT NULL,
                    answered BOOLEAN NOT NULL DEFAULT 0,
                    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )?;

            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_tickets_answered
                 ON tickets(answered)",
                [],
            )?;

            debug!("Ticket schema initialized");
            Ok(())
        })
        .await??;

        info!("Ticket database schema ready");
        Ok(())
    }

    /// Insert a new unanswered ticket and return its id.
    ///
    /// Insert and id retrieval happen under one connection lock, which is
    /// what makes id assignment atomic across concurrent intakes.
    pub async fn create(&self, user_id: i64, question: &str) -> Result<i64> {
        let conn = Arc::clone(&self.conn);
        let question = question.to_string();

        let id = tokio::task::spawn_blocking(move || -> Result<i64> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tickets (user_id, question, answered) VALUES (?1, ?2, 0)",
                params![user_id, question],
            )
            .context("Failed to insert ticket")?;
            Ok(conn.last_insert_rowid())
        })
        .await??;

        debug!("Created ticket {} for user {}", id, user_id);
        Ok(id)
    }

    /// Look up a ticket by id, only while it is still unanswered.
    pub async fn find_open(&self, id: i64) -> Result<Option<Ticket>> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || -> Result<Option<Ticket>> {
            let conn = conn.blocking_lock();
            let ticket = conn
                .query_row(
                    "SELECT id, user_id, question, answered, created_at
                     FROM tickets WHERE id = ?1 AND answered = 0",
                    params![id],
                    |row| {
                        Ok(Ticket {
                            id: row.get(0)?,
                            user_id: row.get(1)?,
                            question: row.get(2)?,
                            answered: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()
                .context("Failed to query ticket")?;
            Ok(ticket)
        })
        .await?
    }

    /// Flip the answered flag for an open ticket.
    ///
    /// The update is conditional on `answered = 0`, so the single-answer
    /// invariant holds even if two replies for the same id race past the
    /// `find_open` check. Returns whether a row actually changed.
    pub async fn mark_answered(&self, id: i64) -> Result<bool> {
        let conn = Arc::clone(&self.conn);

        let changed = tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = conn.blocking_lock();
            conn.execute(
                "UPDATE tickets SET answered = 1 WHERE id = ?1 AND answered = 0",
                params![id],
            )
            .context("Failed to update ticket")
        })
        .await??;

        Ok(changed > 0)
    }
}
