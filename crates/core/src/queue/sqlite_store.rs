//! SQLite-backed queue store implementation.
//!
//! The one-active-download-per-scene invariant is a partial unique index
//! over the occupancy statuses, so a concurrent duplicate accept loses at
//! the INSERT rather than in a racy check.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, ErrorCode};

use super::store::QueueStore;
use super::types::{
    AcceptRequest, DownloadQueueItem, DownloadStatus, QueueError, RetryPolicy, RetryState,
};

/// SQLite-backed queue store.
pub struct SqliteQueueStore {
    conn: Mutex<Connection>,
}

const ITEM_COLUMNS: &str = "id, scene_id, title, size_bytes, seeders, quality, status, info_hash, link, client_handle, added_at, completed_at, attempts, last_attempt_at, last_error";

impl SqliteQueueStore {
    /// Open (and initialize) a queue store at the given path.
    pub fn new(path: &Path) -> Result<Self, QueueError> {
        let conn = Connection::open(path).map_err(|e| QueueError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory queue store (useful for testing).
    pub fn in_memory() -> Result<Self, QueueError> {
        let conn = Connection::open_in_memory().map_err(|e| QueueError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), QueueError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS download_queue (
                id TEXT PRIMARY KEY,
                scene_id TEXT NOT NULL,
                title TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                seeders INTEGER NOT NULL,
                quality TEXT NOT NULL,
                status TEXT NOT NULL,
                info_hash TEXT,
                link TEXT,
                client_handle TEXT,
                added_at TEXT NOT NULL,
                completed_at TEXT,
                attempts INTEGER NOT NULL DEFAULT 0,
                last_attempt_at TEXT,
                last_error TEXT
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_active_scene
                ON download_queue(scene_id)
                WHERE status IN ('queued', 'downloading', 'paused');

            CREATE INDEX IF NOT EXISTS idx_queue_status ON download_queue(status);
            "#,
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<DownloadQueueItem> {
        let status_str: String = row.get(6)?;
        let added_at_str: String = row.get(10)?;
        let completed_at_str: Option<String> = row.get(11)?;
        let last_attempt_at_str: Option<String> = row.get(13)?;

        Ok(DownloadQueueItem {
            id: row.get(0)?,
            scene_id: row.get(1)?,
            title: row.get(2)?,
            size_bytes: row.get(3)?,
            seeders: row.get(4)?,
            quality: row.get(5)?,
            status: DownloadStatus::parse(&status_str).unwrap_or(DownloadStatus::Failed),
            info_hash: row.get(7)?,
            link: row.get(8)?,
            client_handle: row.get(9)?,
            added_at: parse_timestamp(&added_at_str),
            completed_at: completed_at_str.as_deref().map(parse_timestamp),
            retry: RetryState {
                attempts: row.get(12)?,
                last_attempt_at: last_attempt_at_str.as_deref().map(parse_timestamp),
                last_error: row.get(14)?,
            },
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<DownloadQueueItem>, QueueError> {
        let result = conn.query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM download_queue WHERE id = ?"),
            params![id],
            Self::row_to_item,
        );

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(QueueError::Database(e.to_string())),
        }
    }

    fn require(conn: &Connection, id: &str) -> Result<DownloadQueueItem, QueueError> {
        Self::fetch(conn, id)?.ok_or_else(|| QueueError::NotFound(id.to_string()))
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl QueueStore for SqliteQueueStore {
    fn accept(&self, request: AcceptRequest) -> Result<DownloadQueueItem, QueueError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO download_queue (id, scene_id, title, size_bytes, seeders, quality, status, info_hash, link, added_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.scene_id,
                request.title,
                request.size_bytes,
                request.seeders,
                request.quality,
                DownloadStatus::Queued.as_str(),
                request.info_hash,
                request.link,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                QueueError::Duplicate(request.scene_id.clone())
            } else {
                QueueError::Database(e.to_string())
            }
        })?;

        Ok(DownloadQueueItem {
            id,
            scene_id: request.scene_id,
            title: request.title,
            size_bytes: request.size_bytes,
            seeders: request.seeders,
            quality: request.quality,
            status: DownloadStatus::Queued,
            info_hash: request.info_hash,
            link: request.link,
            client_handle: None,
            added_at: now,
            completed_at: None,
            retry: RetryState::default(),
        })
    }

    fn get(&self, id: &str) -> Result<Option<DownloadQueueItem>, QueueError> {
        let conn = self.conn.lock().unwrap();
        Self::fetch(&conn, id)
    }

    fn get_active_for_scene(
        &self,
        scene_id: &str,
    ) -> Result<Option<DownloadQueueItem>, QueueError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM download_queue WHERE scene_id = ? AND status IN ('queued', 'downloading', 'paused')"),
            params![scene_id],
            Self::row_to_item,
        );

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(QueueError::Database(e.to_string())),
        }
    }

    fn list_by_status(&self, status: DownloadStatus) -> Result<Vec<DownloadQueueItem>, QueueError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM download_queue WHERE status = ? ORDER BY added_at ASC, id ASC"
            ))
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![status.as_str()], Self::row_to_item)
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| QueueError::Database(e.to_string()))?);
        }
        Ok(items)
    }

    fn count_by_status(&self, status: DownloadStatus) -> Result<i64, QueueError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT COUNT(*) FROM download_queue WHERE status = ?",
            params![status.as_str()],
            |row| row.get(0),
        )
        .map_err(|e| QueueError::Database(e.to_string()))
    }

    fn update_status(
        &self,
        id: &str,
        new_status: DownloadStatus,
    ) -> Result<DownloadQueueItem, QueueError> {
        let conn = self.conn.lock().unwrap();
        let current = Self::require(&conn, id)?;

        if !current.status.can_transition_to(new_status) {
            return Err(QueueError::InvalidTransition {
                item_id: id.to_string(),
                from: current.status.as_str(),
                to: new_status.as_str(),
            });
        }

        let completed_at = if new_status == DownloadStatus::Completed {
            Some(Utc::now())
        } else {
            current.completed_at
        };

        conn.execute(
            "UPDATE download_queue SET status = ?, completed_at = ? WHERE id = ?",
            params![
                new_status.as_str(),
                completed_at.map(|t| t.to_rfc3339()),
                id
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                QueueError::Duplicate(current.scene_id.clone())
            } else {
                QueueError::Database(e.to_string())
            }
        })?;

        Ok(DownloadQueueItem {
            status: new_status,
            completed_at,
            ..current
        })
    }

    fn set_client_handle(&self, id: &str, handle: Option<&str>) -> Result<(), QueueError> {
        let conn = self.conn.lock().unwrap();
        Self::require(&conn, id)?;

        conn.execute(
            "UPDATE download_queue SET client_handle = ? WHERE id = ?",
            params![handle, id],
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;

        Ok(())
    }

    fn record_add_failure(&self, id: &str, error: &str) -> Result<DownloadQueueItem, QueueError> {
        let conn = self.conn.lock().unwrap();
        let current = Self::require(&conn, id)?;

        // Only a pending add (Queued) or a previous failure can fail again.
        if !matches!(
            current.status,
            DownloadStatus::Queued | DownloadStatus::AddFailed
        ) {
            return Err(QueueError::InvalidTransition {
                item_id: id.to_string(),
                from: current.status.as_str(),
                to: DownloadStatus::AddFailed.as_str(),
            });
        }

        let now = Utc::now();
        let attempts = current.retry.attempts + 1;

        conn.execute(
            "UPDATE download_queue SET status = ?, attempts = ?, last_attempt_at = ?, last_error = ? WHERE id = ?",
            params![
                DownloadStatus::AddFailed.as_str(),
                attempts,
                now.to_rfc3339(),
                error,
                id
            ],
        )
        .map_err(|e| QueueError::Database(e.to_string()))?;

        Ok(DownloadQueueItem {
            status: DownloadStatus::AddFailed,
            retry: RetryState {
                attempts,
                last_attempt_at: Some(now),
                last_error: Some(error.to_string()),
            },
            ..current
        })
    }

    fn retry_eligible(&self, policy: &RetryPolicy) -> Result<Vec<DownloadQueueItem>, QueueError> {
        let conn = self.conn.lock().unwrap();

        // RFC3339 UTC timestamps compare lexicographically, so the backoff
        // cutoff is a plain string comparison.
        let cutoff =
            (Utc::now() - Duration::minutes(i64::from(policy.retry_after_minutes))).to_rfc3339();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM download_queue WHERE status = 'add_failed' AND attempts < ? AND (last_attempt_at IS NULL OR last_attempt_at <= ?) ORDER BY added_at ASC"
            ))
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![policy.max_attempts, cutoff], Self::row_to_item)
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| QueueError::Database(e.to_string()))?);
        }
        Ok(items)
    }

    fn list_exhausted_add_failures(
        &self,
        policy: &RetryPolicy,
    ) -> Result<Vec<DownloadQueueItem>, QueueError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM download_queue WHERE status = 'add_failed' AND attempts >= ? ORDER BY added_at ASC"
            ))
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![policy.max_attempts], Self::row_to_item)
            .map_err(|e| QueueError::Database(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| QueueError::Database(e.to_string()))?);
        }
        Ok(items)
    }
}
