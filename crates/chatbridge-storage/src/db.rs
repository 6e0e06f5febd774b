use rusqlite::OptionalExtension;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chatbridge_core::error::ChatBridgeError;

/// Persisted per-user preferences. One row per user, written on demand; a
/// user without a row simply has no stored preference.
pub trait PreferenceStore: Send + Sync {
    fn get_style(&self, user_id: i64) -> Result<Option<String>, ChatBridgeError>;
    fn set_style(&self, user_id: i64, style: &str) -> Result<(), ChatBridgeError>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

/// Runs a synchronous store operation on the blocking thread pool so async
/// tasks never park on the connection mutex.
pub async fn call_blocking<T, F>(
    store: Arc<dyn PreferenceStore>,
    f: F,
) -> Result<T, ChatBridgeError>
where
    T: Send + 'static,
    F: FnOnce(&dyn PreferenceStore) -> Result<T, ChatBridgeError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| ChatBridgeError::Internal(format!("DB task join error: {e}")))?
}

impl Database {
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn new(data_dir: &str) -> Result<Self, ChatBridgeError> {
        let db_path = Path::new(data_dir).join("chatbridge.db");
        std::fs::create_dir_all(data_dir)?;

        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_styles (
                user_id INTEGER PRIMARY KEY,
                style TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }
}

impl PreferenceStore for Database {
    fn get_style(&self, user_id: i64) -> Result<Option<String>, ChatBridgeError> {
        let conn = self.lock_conn();
        let style = conn
            .query_row(
                "SELECT style FROM user_styles WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(style)
    }

    fn set_style(&self, user_id: i64, style: &str) -> Result<(), ChatBridgeError> {
        let conn = self.lock_conn();
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO user_styles (user_id, style, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET style = ?2, updated_at = ?3",
            params![user_id, style, now],
        )?;
        Ok(())
    }
}
