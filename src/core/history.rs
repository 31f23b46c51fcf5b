use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::warn;

use crate::core::document::PatentDocument;

/// Storage key for the serialized history list.
const HISTORY_KEY: &str = "patent_history";

/// Owns the list of previously generated documents and keeps it durable
/// across sessions. The whole list is serialized as one JSON array under a
/// single key; a missing or corrupt value is treated as an empty history.
pub struct HistoryStore {
    db: Arc<Mutex<Connection>>,
    entries: Mutex<Vec<PatentDocument>>,
}

impl HistoryStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Connection::open(path)?;
        Self::with_connection(db)
    }

    /// Build a store over an existing connection. Tests use this with an
    /// in-memory database.
    pub fn with_connection(db: Connection) -> Result<Self> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        let entries = load_entries(&db);
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            entries: Mutex::new(entries),
        })
    }

    /// Prepend a completed document and persist the whole list immediately.
    pub async fn record(&self, doc: PatentDocument) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(0, doc);
        let serialized = serde_json::to_string(&*entries)?;

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![HISTORY_KEY, serialized],
        )?;
        Ok(())
    }

    /// Current history, most-recent-first.
    pub async fn list(&self) -> Vec<PatentDocument> {
        self.entries.lock().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<PatentDocument> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }
}

fn load_entries(db: &Connection) -> Vec<PatentDocument> {
    let raw: Option<String> = match db
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![HISTORY_KEY],
            |row| row.get(0),
        )
        .optional()
    {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read stored history, starting empty: {}", e);
            return Vec::new();
        }
    };

    match raw {
        Some(value) => serde_json::from_str(&value).unwrap_or_else(|e| {
            warn!("Stored history is corrupt, starting empty: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}
