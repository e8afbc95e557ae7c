use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Looks up a cached vector by its composite key
pub fn lookup_embedding(
    conn: &Connection,
    fingerprint: &str,
    model: &str,
) -> Result<Option<Vec<f32>>> {
    let mut stmt =
        conn.prepare("SELECT vector FROM embeddings WHERE fingerprint = ?1 AND model = ?2")?;

    let blob: Option<Vec<u8>> = stmt
        .query_row(params![fingerprint, model], |row| row.get(0))
        .optional()?;

    Ok(blob.map(|b| bytes_to_vector(&b)))
}

/// Inserts a vector under (fingerprint, model). The insert is a single
/// atomic statement; an existing record for the same key is kept as-is.
pub fn store_embedding(
    conn: &Connection,
    fingerprint: &str,
    model: &str,
    vector: &[f32],
) -> Result<()> {
    let bytes = vector_to_bytes(vector);
    let created_at = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO embeddings (fingerprint, model, vector, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![fingerprint, model, bytes, created_at],
    )?;
    Ok(())
}

pub fn count_embeddings(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Converts f32 slice to little-endian bytes for storage
fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Converts little-endian bytes back to an f32 vector
fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_lookup_miss_then_hit() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.lookup_embedding("fp1", "model-a").unwrap().is_none());

        db.store_embedding("fp1", "model-a", &[0.25, -1.5, 3.0]).unwrap();
        let cached = db.lookup_embedding("fp1", "model-a").unwrap().unwrap();
        assert_eq!(cached, vec![0.25, -1.5, 3.0]);
    }

    #[test]
    fn test_cache_partitioned_by_model() {
        let db = Database::open_in_memory().unwrap();

        db.store_embedding("fp1", "model-a", &[1.0]).unwrap();

        // Same content under a different model is a miss
        assert!(db.lookup_embedding("fp1", "model-b").unwrap().is_none());

        db.store_embedding("fp1", "model-b", &[2.0]).unwrap();
        assert_eq!(db.lookup_embedding("fp1", "model-a").unwrap().unwrap(), vec![1.0]);
        assert_eq!(db.lookup_embedding("fp1", "model-b").unwrap().unwrap(), vec![2.0]);
    }

    #[test]
    fn test_records_are_never_updated() {
        let db = Database::open_in_memory().unwrap();

        db.store_embedding("fp1", "model-a", &[1.0, 2.0]).unwrap();
        db.store_embedding("fp1", "model-a", &[9.0, 9.0]).unwrap();

        // First write wins
        let cached = db.lookup_embedding("fp1", "model-a").unwrap().unwrap();
        assert_eq!(cached, vec![1.0, 2.0]);
        assert_eq!(db.count_embeddings().unwrap(), 1);
    }

    #[test]
    fn test_vector_bytes_roundtrip() {
        let v = vec![0.0f32, 1.5, -2.25, f32::MIN_POSITIVE];
        assert_eq!(bytes_to_vector(&vector_to_bytes(&v)), v);
    }
}
