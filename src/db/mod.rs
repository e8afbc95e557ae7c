pub mod queries;
pub mod schema;

use std::path::Path;

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Handle to the embedding cache database.
///
/// Keyed by (content fingerprint, model identifier); records are written
/// once and never updated, so concurrent readers are always safe. WAL
/// mode keeps two simultaneous invocations from corrupting the file.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the cache database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Store(format!("cannot create directory {:?}: {}", parent, e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Store(format!("cannot open cache at {:?}: {}", path, e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::create_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens an in-memory cache (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Looks up a cached vector for (fingerprint, model). `None` is a miss.
    pub fn lookup_embedding(&self, fingerprint: &str, model: &str) -> Result<Option<Vec<f32>>> {
        queries::lookup_embedding(&self.conn, fingerprint, model)
    }

    /// Stores a freshly computed vector. A concurrent writer that got
    /// there first wins; the existing record is kept.
    pub fn store_embedding(&self, fingerprint: &str, model: &str, vector: &[f32]) -> Result<()> {
        queries::store_embedding(&self.conn, fingerprint, model, vector)
    }

    /// Number of cached records, across all models
    pub fn count_embeddings(&self) -> Result<usize> {
        queries::count_embeddings(&self.conn)
    }
}
