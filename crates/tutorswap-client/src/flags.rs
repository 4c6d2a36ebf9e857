// SPDX-License-Identifier: Apache-2.0

use crate::mirror::{with_conn, SharedConn};
use crate::ApiError;
use rusqlite::{params, OptionalExtension};

/// Flag marking a sign-out that could not reach the server and must be
/// replayed on the next startup.
pub const FORCE_LOGOUT_FLAG: &str = "logOut";

const TRUE_VALUE: &str = "true";

/// Durable key/value flags sharing the mirror's database file. Flags are
/// deliberately outside the record buckets so a cache wipe cannot lose them.
#[derive(Clone)]
pub struct FlagStore {
    conn: SharedConn,
}

impl FlagStore {
    pub(crate) fn new(conn: SharedConn) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let key = key.to_string();
        with_conn(&self.conn, move |conn| {
            conn.query_row(
                "SELECT value FROM flags WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ApiError::mirror(e.to_string()))
        })
        .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let key = key.to_string();
        let value = value.to_string();
        with_conn(&self.conn, move |conn| {
            conn.execute(
                "INSERT INTO flags(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok(())
        })
        .await
    }

    pub async fn remove(&self, key: &str) -> Result<(), ApiError> {
        let key = key.to_string();
        with_conn(&self.conn, move |conn| {
            conn.execute("DELETE FROM flags WHERE key = ?1", params![key])
                .map_err(|e| ApiError::mirror(e.to_string()))?;
            Ok(())
        })
        .await
    }

    /// True only when the flag holds the literal `"true"`; any other value
    /// or absence reads as unset.
    pub async fn is_set(&self, key: &str) -> Result<bool, ApiError> {
        Ok(self.get(key).await?.as_deref() == Some(TRUE_VALUE))
    }

    pub async fn set_true(&self, key: &str) -> Result<(), ApiError> {
        self.set(key, TRUE_VALUE).await
    }
}
