use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: &str = "1";

/// Creates the embedding cache tables
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- One record per unique (content fingerprint, model) pair.
        -- Vectors are little-endian f32 blobs; rows are never updated.
        CREATE TABLE IF NOT EXISTS embeddings (
            fingerprint TEXT NOT NULL,
            model TEXT NOT NULL,
            vector BLOB NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (fingerprint, model)
        );

        CREATE TABLE IF NOT EXISTS cache_meta (
            key TEXT PRIMARY KEY,
            value TEXT
        );
        ",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO cache_meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}
