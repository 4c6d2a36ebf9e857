// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, FlagStore};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tutorswap_model::{Appointment, Message, RecordId, User};

/// Marker key under which the signed-in user's id is kept.
pub const LOGGED_IN_USER_MARKER: &str = "loggedInUser";

pub(crate) type SharedConn = Arc<Mutex<Connection>>;

/// Runs a closure against the mirror connection on the blocking pool.
pub(crate) async fn with_conn<T, F>(conn: &SharedConn, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
{
    let conn = Arc::clone(conn);
    tokio::task::spawn_blocking(move || {
        let guard = conn
            .lock()
            .map_err(|_| ApiError::mirror("mirror connection lock poisoned"))?;
        op(&guard)
    })
    .await
    .map_err(|e| ApiError::mirror(e.to_string()))?
}

/// Entity buckets of the mirror. Singleton markers live in their own table,
/// not in a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Users,
    Appointments,
    Messages,
}

impl Bucket {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Appointments => "appointments",
            Self::Messages => "messages",
        }
    }
}

/// A record the mirror can hold: which bucket it lives in and how it is
/// keyed.
pub trait MirrorRecord: Serialize + DeserializeOwned + Send + 'static {
    const BUCKET: Bucket;

    fn record_id(&self) -> &RecordId;
}

impl MirrorRecord for User {
    const BUCKET: Bucket = Bucket::Users;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl MirrorRecord for Appointment {
    const BUCKET: Bucket = Bucket::Appointments;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl MirrorRecord for Message {
    const BUCKET: Bucket = Bucket::Messages;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MirrorConfig {
    /// Mirror database path; `None` keeps the mirror in memory.
    pub path: Option<PathBuf>,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        bucket TEXT NOT NULL,
        id     TEXT NOT NULL,
        body   TEXT NOT NULL,
        PRIMARY KEY (bucket, id)
    );
    CREATE TABLE IF NOT EXISTS markers (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS flags (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Per-browsing-context cache of previously seen remote records. Bodies are
/// stored verbatim, so the revision token a record arrived with is the one
/// it keeps; the mirror never fabricates one.
#[derive(Clone)]
pub struct LocalMirror {
    conn: SharedConn,
}

impl LocalMirror {
    pub async fn open(config: &MirrorConfig) -> Result<Self, ApiError> {
        let path = config.path.clone();
        let conn = tokio::task::spawn_blocking(move || {
            let conn = match path {
                Some(path) => Connection::open(path),
                None => Connection::open_in_memory(),
            }
            .map_err(|e| ApiError::mirror(e.to_string()))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok::<_, ApiError>(conn)
        })
        .await
        .map_err(|e| ApiError::mirror(e.to_string()))??;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Durable flag storage sharing the mirror's database file but living
    /// outside the record buckets.
    #[must_use]
    pub fn flags(&self) -> FlagStore {
        FlagStore::new(Arc::clone(&self.conn))
    }

    /// Insert-or-replace. A record whose id is empty is not addressable and
    /// is skipped silently. When the incoming copy carries no revision token
    /// but the stored one does, the stored token is kept.
    pub async fn put<T: MirrorRecord>(&self, record: &T) -> Result<(), ApiError> {
        let body = serde_json::to_value(record).map_err(|e| ApiError::mirror(e.to_string()))?;
        with_conn(&self.conn, move |conn| put_value(conn, T::BUCKET, body)).await
    }

    pub async fn put_many<T: MirrorRecord>(&self, records: &[T]) -> Result<(), ApiError> {
        let mut bodies = Vec::with_capacity(records.len());
        for record in records {
            bodies.push(serde_json::to_value(record).map_err(|e| ApiError::mirror(e.to_string()))?);
        }
        with_conn(&self.conn, move |conn| {
            for body in bodies {
                put_value(conn, T::BUCKET, body)?;
            }
            Ok(())
        })
        .await
    }

    pub async fn get<T: MirrorRecord>(&self, id: &RecordId) -> Result<Option<T>, ApiError> {
        let id = id.as_str().to_string();
        let raw = with_conn(&self.conn, move |conn| {
            conn.query_row(
                "SELECT body FROM records WHERE bucket = ?1 AND id = ?2",
                params![T::BUCKET.as_str(), id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ApiError::mirror(e.to_string()))
        })
        .await?;
        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| ApiError::mirror(e.to_string())),
            None => Ok(None),
        }
    }

    /// Linear scan of one bucket in id order, keeping records the predicate
    /// accepts. Rows that no longer decode are skipped with a warning.
    pub async fn find<T, P>(&self, predicate: P) -> Result<Vec<T>, ApiError>
    where
        T: MirrorRecord,
        P: Fn(&T) -> bool + Send + 'static,
    {
        with_conn(&self.conn, move |conn| {
            let mut stmt = conn
                .prepare("SELECT body FROM records WHERE bucket = ?1 ORDER BY id")
                .map_err(|e| ApiError::mirror(e.to_string()))?;
            let rows = stmt
                .query_map([T::BUCKET.as_str()], |row| row.get::<_, String>(0))
                .map_err(|e| ApiError::mirror(e.to_string()))?;
            let mut out = Vec::new();
            for raw in rows {
                let raw = raw.map_err(|e| ApiError::mirror(e.to_string()))?;
                match serde_json::from_str::<T>(&raw) {
                    Ok(record) => {
                        if predicate(&record) {
                            out.push(record);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            bucket = T::BUCKET.as_str(),
                            error = %err,
                            "skipping mirrored record that no longer decodes"
                        );
                    }
                }
            }
            Ok(out)
        })
        .await
    }

    pub async fn find_first<T, P>(&self, predicate: P) -> Result<Option<T>, ApiError>
    where
        T: MirrorRecord,
        P: Fn(&T) -> bool + Send + 'static,
    {
        Ok(self.find(predicate).await?.into_iter().next())
    }

    pub async fn remove<T: MirrorRecord>(&self, id: &RecordId) -> Result<(), ApiError> {
        let id = id.as_str().to_string();
        with_conn(&self.conn, move |conn| {
            conn.execute(
                "DELETE FROM records WHERE bucket = ?1 AND id = ?2",
                params![T::BUCKET.as_str(), id],
            )
            .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok(())
        })
        .await
    }

    /// Wipes every entity bucket. Markers and flags survive, so settings
    /// like the deferred-logout flag outlive a sign-out wipe.
    pub async fn clear_records(&self) -> Result<(), ApiError> {
        with_conn(&self.conn, |conn| {
            conn.execute("DELETE FROM records", [])
                .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok(())
        })
        .await
    }

    pub async fn marker(&self, key: &str) -> Result<Option<String>, ApiError> {
        let key = key.to_string();
        with_conn(&self.conn, move |conn| {
            conn.query_row(
                "SELECT value FROM markers WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ApiError::mirror(e.to_string()))
        })
        .await
    }

    pub async fn set_marker(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let key = key.to_string();
        let value = value.to_string();
        with_conn(&self.conn, move |conn| {
            conn.execute(
                "INSERT INTO markers(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok(())
        })
        .await
    }

    pub async fn remove_marker(&self, key: &str) -> Result<(), ApiError> {
        let key = key.to_string();
        with_conn(&self.conn, move |conn| {
            conn.execute("DELETE FROM markers WHERE key = ?1", params![key])
                .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok(())
        })
        .await
    }
}

fn put_value(conn: &Connection, bucket: Bucket, mut body: serde_json::Value) -> Result<(), ApiError> {
    if !body.is_object() {
        return Err(ApiError::mirror("mirrored records must be objects"));
    }
    let id = body
        .get("_id")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    if id.trim().is_empty() {
        return Ok(());
    }
    if body.get("_rev").is_none() {
        let stored: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE bucket = ?1 AND id = ?2",
                params![bucket.as_str(), id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ApiError::mirror(e.to_string()))?;
        if let Some(raw) = stored {
            if let Ok(prev) = serde_json::from_str::<serde_json::Value>(&raw) {
                if let Some(rev) = prev.get("_rev") {
                    body["_rev"] = rev.clone();
                }
            }
        }
    }
    let raw = serde_json::to_string(&body).map_err(|e| ApiError::mirror(e.to_string()))?;
    conn.execute(
        "INSERT INTO records(bucket, id, body) VALUES(?1, ?2, ?3)
         ON CONFLICT(bucket, id) DO UPDATE SET body = excluded.body",
        params![bucket.as_str(), id, raw],
    )
    .map_err(|e| ApiError::mirror(e.to_string()))?;
    Ok(())
}
