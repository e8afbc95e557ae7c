use std::path::{Path, PathBuf};

use crate::error::Error;

/// A loaded document, scoped to one run. The fingerprint is the blake3
/// hash of the content and serves as the embedding cache key.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
    pub fingerprint: String,
}

/// Content fingerprint: lowercase-hex blake3 of the raw bytes
pub fn fingerprint(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Loads each path as a UTF-8 document. Unreadable, undecodable, or
/// oversized files are skipped with a warning; the rest of the corpus
/// still gets searched.
pub fn load_documents(paths: &[PathBuf], max_file_bytes: u64) -> Vec<Document> {
    let mut docs = Vec::with_capacity(paths.len());

    for path in paths {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > max_file_bytes => {
                log::warn!(
                    "Skipping {:?}: {} bytes exceeds limit of {}",
                    path,
                    meta.len(),
                    max_file_bytes
                );
                continue;
            }
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
            Ok(_) => {}
        }

        match read_document(path) {
            Ok(doc) => docs.push(doc),
            Err(e) => log::warn!("Skipping file: {}", e),
        }
    }

    docs
}

fn read_document(path: &Path) -> Result<Document, Error> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let fingerprint = fingerprint(&content);
    Ok(Document {
        path: path.to_path_buf(),
        content,
        fingerprint,
    })
}
